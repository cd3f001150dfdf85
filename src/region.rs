//! Elliptical region derived from four boundary landmarks.
//!
//! The ellipse is axis-aligned and sized from the landmarks' bounding box,
//! not fitted through them. Containment is tested against a fixed polygon
//! approximation built once per region and shared by every consumer.
//! Polygon x is latitude and y is longitude.

use crate::location::Coordinate;
use geo::{Contains, LineString, Point, Polygon};
use serde::Serialize;
use std::f64::consts::TAU;

/// Number of landmarks a region is built from.
pub const LANDMARK_COUNT: usize = 4;

/// Vertices of the polygon approximating the ellipse.
pub const POLYGON_VERTICES: usize = 100;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegionError {
    #[error(
        "Only {resolved} of {} boundary landmarks could be resolved (missing: {})",
        LANDMARK_COUNT,
        .missing.join(", ")
    )]
    InsufficientLandmarks {
        resolved: usize,
        missing: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    center: Coordinate,
    radius_lat: f64,
    radius_lon: f64,
    #[serde(skip)]
    polygon: Polygon<f64>,
}

impl Region {
    pub fn new(center: Coordinate, radius_lat: f64, radius_lon: f64) -> Self {
        let polygon = approximate_ellipse(center, radius_lat, radius_lon);
        Self {
            center,
            radius_lat,
            radius_lon,
            polygon,
        }
    }

    /// Build the region from named landmark coordinates.
    ///
    /// Center is the mean of the landmark coordinates. Each radius is half
    /// the landmarks' extent along that axis. Fails if fewer than
    /// [`LANDMARK_COUNT`] landmarks have coordinates.
    pub fn build(landmarks: &[(String, Option<Coordinate>)]) -> Result<Self, RegionError> {
        let resolved: Vec<Coordinate> = landmarks.iter().filter_map(|(_, c)| *c).collect();
        if resolved.len() < LANDMARK_COUNT {
            return Err(RegionError::InsufficientLandmarks {
                resolved: resolved.len(),
                missing: landmarks
                    .iter()
                    .filter(|(_, c)| c.is_none())
                    .map(|(name, _)| name.clone())
                    .collect(),
            });
        }

        let n = resolved.len() as f64;
        let mean_lat = resolved.iter().map(|c| c.latitude).sum::<f64>() / n;
        let mean_lon = resolved.iter().map(|c| c.longitude).sum::<f64>() / n;

        let (min_lat, max_lat) = extent(resolved.iter().map(|c| c.latitude));
        let (min_lon, max_lon) = extent(resolved.iter().map(|c| c.longitude));

        Ok(Self::new(
            Coordinate::new(mean_lat, mean_lon),
            (max_lat - min_lat) / 2.0,
            (max_lon - min_lon) / 2.0,
        ))
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    /// North-south semi-axis in degrees.
    pub fn radius_lat(&self) -> f64 {
        self.radius_lat
    }

    /// East-west semi-axis in degrees.
    pub fn radius_lon(&self) -> f64 {
        self.radius_lon
    }

    /// The polygon every containment test and plot uses.
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Polygon vertices as coordinates, without the closing repeat.
    pub fn vertices(&self) -> Vec<Coordinate> {
        self.polygon
            .exterior()
            .0
            .iter()
            .take(POLYGON_VERTICES)
            .map(|c| Coordinate::new(c.x, c.y))
            .collect()
    }

    /// Strict interior test: points on the polygon boundary are outside.
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.polygon
            .contains(&Point::new(coordinate.latitude, coordinate.longitude))
    }
}

fn approximate_ellipse(center: Coordinate, radius_lat: f64, radius_lon: f64) -> Polygon<f64> {
    let step = TAU / POLYGON_VERTICES as f64;
    let ring: Vec<(f64, f64)> = (0..POLYGON_VERTICES)
        .map(|k| {
            let theta = k as f64 * step;
            (
                center.latitude + radius_lat * theta.cos(),
                center.longitude + radius_lon * theta.sin(),
            )
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}
