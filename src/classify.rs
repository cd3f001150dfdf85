//! Place classification against a [`Region`].

use crate::location::{Coordinate, Location, LocationKind};
use crate::region::Region;
use serde::Serialize;
use std::fmt;

/// Where a location stands relative to the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlaceStatus {
    Inside,
    Outside,
    /// A place whose coordinates could not be resolved.
    NotFound,
    /// Not a place; never tested against the region.
    NotApplicable,
}

impl PlaceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Inside => "Inside",
            Self::Outside => "Outside",
            Self::NotFound => "Not Found",
            Self::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for PlaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify(kind: &LocationKind, coordinate: Option<Coordinate>, region: &Region) -> PlaceStatus {
    if !kind.is_place() {
        return PlaceStatus::NotApplicable;
    }
    match coordinate {
        None => PlaceStatus::NotFound,
        Some(c) if region.contains(c) => PlaceStatus::Inside,
        Some(_) => PlaceStatus::Outside,
    }
}

/// A location with its resolved coordinate and status for this run.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedPlace {
    pub location: Location,
    pub coordinate: Option<Coordinate>,
    pub status: PlaceStatus,
}

impl ClassifiedPlace {
    pub fn new(location: &Location, coordinate: Option<Coordinate>, region: &Region) -> Self {
        Self {
            status: classify(&location.kind, coordinate, region),
            location: location.clone(),
            coordinate,
        }
    }
}
