//! Geocoding providers: the [`Geocoder`] seam and the Nominatim client.

use super::types::{Coordinate, LocationError};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = concat!("georegion/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that can turn a free-form place name into a coordinate.
///
/// Implementations return [`LocationError::NotFound`] when the provider
/// answered but had no candidate, and a transient error for anything else.
pub trait Geocoder {
    fn lookup(&self, query: &str) -> Result<Coordinate, LocationError>;
}

/// Raw Nominatim search result. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
pub struct NominatimResult {
    pub lat: String,
    pub lon: String,
}

/// Blocking client for the Nominatim `/search` endpoint.
pub struct NominatimProvider {
    agent: ureq::Agent,
    base_url: String,
}

impl NominatimProvider {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for NominatimProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }
}

impl Geocoder for NominatimProvider {
    fn lookup(&self, query: &str) -> Result<Coordinate, LocationError> {
        let url = format!("{}/search", self.base_url);
        let response = match self
            .agent
            .get(&url)
            .query("q", query)
            .query("format", "json")
            .query("limit", "1")
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(LocationError::Status {
                    query: query.to_string(),
                    status,
                })
            }
            Err(e) => return Err(LocationError::Network(e.to_string())),
        };

        let results: Vec<NominatimResult> = response
            .into_json()
            .map_err(|e| LocationError::InvalidResponse(e.to_string()))?;

        first_candidate(query, &results)
    }
}

/// Take the first candidate and parse its coordinates.
pub fn first_candidate(query: &str, results: &[NominatimResult]) -> Result<Coordinate, LocationError> {
    let top = results
        .first()
        .ok_or_else(|| LocationError::NotFound(query.to_string()))?;

    let lat: f64 = top
        .lat
        .trim()
        .parse()
        .map_err(|_| LocationError::InvalidResponse(format!("bad latitude '{}'", top.lat)))?;
    let lon: f64 = top
        .lon
        .trim()
        .parse()
        .map_err(|_| LocationError::InvalidResponse(format!("bad longitude '{}'", top.lon)))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(LocationError::InvalidResponse(format!(
            "coordinates out of range: {}, {}",
            lat, lon
        )));
    }

    Ok(Coordinate::new(lat, lon))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Geocoder;
    use crate::location::types::{Coordinate, LocationError};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted provider answer.
    #[derive(Debug, Clone, Copy)]
    pub enum Answer {
        Found(f64, f64),
        Empty,
        Down,
    }

    /// In-memory geocoder that records every query it receives.
    /// Unknown queries behave like an empty result.
    #[derive(Debug, Default)]
    pub struct FakeGeocoder {
        answers: HashMap<String, Answer>,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeGeocoder {
        pub fn with(mut self, query: &str, answer: Answer) -> Self {
            self.answers.insert(query.to_string(), answer);
            self
        }

        pub fn calls_for(&self, query: &str) -> usize {
            self.calls.borrow().iter().filter(|q| *q == query).count()
        }

        pub fn total_calls(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl Geocoder for FakeGeocoder {
        fn lookup(&self, query: &str) -> Result<Coordinate, LocationError> {
            self.calls.borrow_mut().push(query.to_string());
            match self.answers.get(query).copied().unwrap_or(Answer::Empty) {
                Answer::Found(lat, lon) => Ok(Coordinate::new(lat, lon)),
                Answer::Empty => Err(LocationError::NotFound(query.to_string())),
                Answer::Down => Err(LocationError::Network("connection refused".into())),
            }
        }
    }
}
