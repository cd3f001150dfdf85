//! Data handed to an external plotting surface.
//!
//! Points are given as lon/lat so a plotter can use them as x/y directly.
//! The outline is the region's own polygon, never a separately sampled one.

use crate::location::Coordinate;
use crate::region::Region;
use crate::report::Report;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Margin around the landmarks for the plot window, in degrees.
pub const BOUNDS_MARGIN: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

impl PlotPoint {
    fn new(label: &str, c: Coordinate) -> Self {
        Self {
            label: label.to_string(),
            x: c.longitude,
            y: c.latitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlotData {
    pub title: String,
    pub places: Vec<PlotPoint>,
    pub landmarks: Vec<PlotPoint>,
    pub outline: Vec<[f64; 2]>,
    pub bounds: PlotBounds,
    /// Center and radii of the ellipse the outline approximates.
    pub region: Region,
}

impl PlotData {
    pub fn new(report: &Report, landmarks: &[(String, Coordinate)], region: &Region) -> Self {
        let places = report
            .places
            .iter()
            .filter(|p| p.location.kind.is_place())
            .filter_map(|p| p.coordinate.map(|c| PlotPoint::new(&p.location.label, c)))
            .collect();

        let landmarks: Vec<PlotPoint> = landmarks
            .iter()
            .map(|(name, c)| PlotPoint::new(name, *c))
            .collect();

        let outline = region
            .vertices()
            .into_iter()
            .map(|c| [c.longitude, c.latitude])
            .collect();

        Self {
            title: "Places and region of interest".to_string(),
            places,
            bounds: bounds_around(&landmarks),
            landmarks,
            outline,
            region: region.clone(),
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write plot data to {}", path.display()))
    }
}

fn bounds_around(points: &[PlotPoint]) -> PlotBounds {
    let mut b = PlotBounds {
        min_x: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        min_y: f64::INFINITY,
        max_y: f64::NEG_INFINITY,
    };
    for p in points {
        b.min_x = b.min_x.min(p.x);
        b.max_x = b.max_x.max(p.x);
        b.min_y = b.min_y.min(p.y);
        b.max_y = b.max_y.max(p.y);
    }
    PlotBounds {
        min_x: b.min_x - BOUNDS_MARGIN,
        max_x: b.max_x + BOUNDS_MARGIN,
        min_y: b.min_y - BOUNDS_MARGIN,
        max_y: b.max_y + BOUNDS_MARGIN,
    }
}
