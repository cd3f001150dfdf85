//! Run configuration.
//!
//! Precedence: built-in defaults, then the optional JSON config file, then
//! command-line flags (applied by the binary).

use crate::location::cache::JsonFileCache;
use crate::location::pacing::DEFAULT_DELAY;
use crate::location::providers::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::region::LANDMARK_COUNT;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Cannot parse config {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// A named boundary landmark and the query used to geocode it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: String,
    pub search: String,
}

impl Landmark {
    pub fn new(name: &str, search: &str) -> Self {
        Self {
            name: name.to_string(),
            search: search.to_string(),
        }
    }
}

/// Default landmarks spanning central London.
pub fn default_landmarks() -> Vec<Landmark> {
    vec![
        Landmark::new("British Museum", "British Museum, London"),
        Landmark::new("Hyde Park", "Hyde Park, London"),
        Landmark::new("Tower Bridge", "Tower Bridge, London"),
        Landmark::new("Lambeth", "Lambeth, London"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache file; `None` means ~/.georegion/cache.json.
    pub cache_path: Option<PathBuf>,
    /// Delay before each provider request, in milliseconds.
    pub delay_ms: u64,
    pub offline: bool,
    pub provider: ProviderConfig,
    pub landmarks: Vec<Landmark>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: None,
            delay_ms: DEFAULT_DELAY.as_millis() as u64,
            offline: false,
            provider: ProviderConfig::default(),
            landmarks: default_landmarks(),
        }
    }
}

impl Config {
    /// Load and validate a JSON config file. Missing keys take defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.landmarks.len() != LANDMARK_COUNT {
            return Err(ConfigError::Invalid(format!(
                "expected exactly {} landmarks, got {}",
                LANDMARK_COUNT,
                self.landmarks.len()
            )));
        }
        let mut names = HashSet::new();
        for landmark in &self.landmarks {
            if landmark.name.trim().is_empty() || landmark.search.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "landmark name and search must not be empty".into(),
                ));
            }
            if !names.insert(landmark.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate landmark '{}'",
                    landmark.name
                )));
            }
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("provider base_url must not be empty".into()));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(JsonFileCache::default_path)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
