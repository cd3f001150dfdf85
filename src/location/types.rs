//! Core types for the location subsystem.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// A resolved latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// The `[lat, lon]` pair used by the cache file.
    pub fn to_pair(self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }

    pub fn from_pair([latitude, longitude]: [f64; 2]) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}\u{00B0}{}, {:.4}\u{00B0}{}",
            self.latitude.abs(),
            ns,
            self.longitude.abs(),
            ew
        )
    }
}

/// The declared type of an input location.
///
/// Only [`LocationKind::Place`] is classified against the region. Unknown
/// type strings are kept verbatim so reports can group by them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LocationKind {
    Place,
    Landmark,
    Other(String),
}

impl LocationKind {
    pub fn is_place(&self) -> bool {
        matches!(self, Self::Place)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Place => "place",
            Self::Landmark => "landmark",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for LocationKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "place" => Self::Place,
            "landmark" => Self::Landmark,
            _ => Self::Other(s),
        }
    }
}

impl From<LocationKind> for String {
    fn from(kind: LocationKind) -> Self {
        match kind {
            LocationKind::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// A missing `type` reads like the other missing fields.
impl Default for LocationKind {
    fn default() -> Self {
        Self::Other(not_available())
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn not_available() -> String {
    "N/A".to_string()
}

/// One entry of the input location list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Query sent to the geocoder, also the cache key.
    #[serde(default = "not_available")]
    pub search_string: String,
    #[serde(rename = "type", default)]
    pub kind: LocationKind,
    /// Display label used in reports.
    #[serde(default = "not_available")]
    pub label: String,
}

impl Location {
    pub fn new(search_string: &str, kind: LocationKind, label: &str) -> Self {
        Self {
            search_string: search_string.to_string(),
            kind,
            label: label.to_string(),
        }
    }

    pub fn place(search_string: &str, label: &str) -> Self {
        Self::new(search_string, LocationKind::Place, label)
    }
}

/// Load the location list from a JSON array file.
pub fn load_locations(path: &Path) -> Result<Vec<Location>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read locations file {}", path.display()))?;
    let locations = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse locations file {}", path.display()))?;
    Ok(locations)
}

/// Location resolution errors.
///
/// Everything except [`LocationError::NotFound`] is transient: it is counted
/// but never written to the cache, so the next run retries the lookup.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Provider returned HTTP {status} for '{query}'")]
    Status { query: String, status: u16 },
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("Location not found: '{0}'")]
    NotFound(String),
    #[error("Offline mode: '{0}' is not cached")]
    Offline(String),
}

impl LocationError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}
