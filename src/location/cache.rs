//! Coordinate cache, by default at ~/.georegion/cache.json.
//!
//! File format: a JSON object mapping the exact search string to
//! `[lat, lon]`, or `null` for a place the provider confirmed it cannot find.
//! Every persist rewrites the whole file. There is no file locking, so two
//! runs sharing one cache file race and the last writer wins.

use super::types::Coordinate;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Result of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cached {
    /// Previously resolved.
    Hit(Coordinate),
    /// Previously confirmed as not found by the provider.
    NotFound,
    /// Never seen.
    Absent,
}

impl Cached {
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cannot read cache {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Cache {path} is not valid JSON: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("Cannot write cache {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Key-value storage for resolved coordinates.
pub trait CoordinateStore {
    fn get(&self, key: &str) -> Cached;

    /// Record a resolution. `None` marks the key as confirmed not found.
    fn put(&mut self, key: &str, coordinate: Option<Coordinate>);

    /// Make all entries durable.
    fn persist(&self) -> Result<(), CacheError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The file-backed coordinate cache.
pub struct JsonFileCache {
    path: PathBuf,
    entries: BTreeMap<String, Option<[f64; 2]>>,
}

impl JsonFileCache {
    /// Load the cache from a specific path. A missing file is an empty cache.
    pub fn load_from(path: PathBuf) -> Result<Self, CacheError> {
        let entries = Self::read_file(&path)?.unwrap_or_default();
        Ok(Self { path, entries })
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".georegion")
            .join("cache.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> Result<Option<BTreeMap<String, Option<[f64; 2]>>>, CacheError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|source| CacheError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl CoordinateStore for JsonFileCache {
    fn get(&self, key: &str) -> Cached {
        match self.entries.get(key) {
            Some(Some(pair)) => Cached::Hit(Coordinate::from_pair(*pair)),
            Some(None) => Cached::NotFound,
            None => Cached::Absent,
        }
    }

    fn put(&mut self, key: &str, coordinate: Option<Coordinate>) {
        self.entries
            .insert(key.to_string(), coordinate.map(Coordinate::to_pair));
    }

    fn persist(&self) -> Result<(), CacheError> {
        let write_err = |source: io::Error| CacheError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        fs::write(&self.path, json).map_err(write_err)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Non-persistent store for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Option<Coordinate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CoordinateStore for MemoryStore {
    fn get(&self, key: &str) -> Cached {
        match self.entries.get(key) {
            Some(Some(c)) => Cached::Hit(*c),
            Some(None) => Cached::NotFound,
            None => Cached::Absent,
        }
    }

    fn put(&mut self, key: &str, coordinate: Option<Coordinate>) {
        self.entries.insert(key.to_string(), coordinate);
    }

    fn persist(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
