//! Report aggregation and text rendering.
//!
//! Groups keep the first-seen order of location types and the input order
//! within each type. Nothing is sorted, deduplicated or filtered.

use crate::classify::{ClassifiedPlace, PlaceStatus};
use crate::location::{Coordinate, Location, LocationKind, ResolveStats};
use crate::region::Region;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub label: String,
    pub status: PlaceStatus,
}

/// All entries of one location type, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeGroup {
    #[serde(rename = "type")]
    pub kind: LocationKind,
    pub entries: Vec<ReportEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub total_places: usize,
    pub inside_count: usize,
    pub outside_count: usize,
    pub not_found_count: usize,
    /// Labels of places that could not be resolved, in input order.
    pub not_found: Vec<String>,
    /// Resolutions that failed during this run.
    pub failed_resolutions: usize,
    /// Search strings behind `failed_resolutions`.
    pub failed_names: Vec<String>,
    pub places: Vec<ClassifiedPlace>,
    pub groups: Vec<TypeGroup>,
}

impl Report {
    /// Classify every location and build the summary.
    ///
    /// `coordinates` is keyed by search string; a missing key counts as
    /// unresolved.
    pub fn aggregate(
        locations: &[Location],
        coordinates: &HashMap<String, Option<Coordinate>>,
        region: &Region,
    ) -> Self {
        let places: Vec<ClassifiedPlace> = locations
            .iter()
            .map(|loc| {
                let coordinate = coordinates.get(&loc.search_string).copied().flatten();
                ClassifiedPlace::new(loc, coordinate, region)
            })
            .collect();

        let count = |status: PlaceStatus| places.iter().filter(|p| p.status == status).count();
        let not_found = places
            .iter()
            .filter(|p| p.status == PlaceStatus::NotFound)
            .map(|p| p.location.label.clone())
            .collect();

        let mut groups: Vec<TypeGroup> = Vec::new();
        for place in &places {
            let entry = ReportEntry {
                label: place.location.label.clone(),
                status: place.status,
            };
            match groups.iter_mut().find(|g| g.kind == place.location.kind) {
                Some(group) => group.entries.push(entry),
                None => groups.push(TypeGroup {
                    kind: place.location.kind.clone(),
                    entries: vec![entry],
                }),
            }
        }

        Self {
            generated_at: Utc::now(),
            total_places: locations.iter().filter(|l| l.kind.is_place()).count(),
            inside_count: count(PlaceStatus::Inside),
            outside_count: count(PlaceStatus::Outside),
            not_found_count: count(PlaceStatus::NotFound),
            not_found,
            failed_resolutions: 0,
            failed_names: Vec::new(),
            places,
            groups,
        }
    }

    pub fn with_resolve_stats(mut self, stats: &ResolveStats) -> Self {
        self.failed_resolutions = stats.failures;
        self.failed_names = stats.failed.clone();
        self
    }

    /// Places with a coordinate, whether inside or outside.
    pub fn resolved_count(&self) -> usize {
        self.inside_count + self.outside_count
    }

    /// Split the groups into pages: first half and second half of the types
    /// when there is more than one type, a single page otherwise.
    pub fn pages(&self) -> Vec<&[TypeGroup]> {
        if self.groups.len() > 1 {
            let (first, second) = self.groups.split_at(self.groups.len() / 2);
            vec![first, second]
        } else {
            vec![&self.groups[..]]
        }
    }

    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Places not found:")?;
        for label in &self.not_found {
            writeln!(f, "  {}", label)?;
        }
        for place in &self.places {
            match place.status {
                PlaceStatus::Inside => writeln!(f, "{} lies inside the region.", place.location.label)?,
                PlaceStatus::Outside => writeln!(f, "{} lies outside the region.", place.location.label)?,
                _ => {}
            }
        }

        writeln!(f)?;
        writeln!(f, "Result:")?;
        writeln!(f, "  Total places:        {}", self.total_places)?;
        writeln!(f, "  Inside the region:   {}", self.inside_count)?;
        writeln!(f, "  Outside the region:  {}", self.outside_count)?;
        writeln!(f, "  Places resolved:     {}", self.resolved_count())?;
        writeln!(f, "  Not found:           {}", self.not_found_count)?;
        writeln!(f, "  Failed resolutions:  {}", self.failed_resolutions)?;
        for name in &self.failed_names {
            writeln!(f, "    {}", name)?;
        }

        for (i, page) in self.pages().iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "\u{2500}\u{2500} Page {} \u{2500}\u{2500}", i + 1)?;
            for group in page.iter() {
                writeln!(f)?;
                writeln!(f, "{}", capitalize(group.kind.as_str()))?;
                for entry in &group.entries {
                    match entry.status {
                        PlaceStatus::NotApplicable => writeln!(f, "  {}", entry.label)?,
                        status => writeln!(f, "  {} ({})", entry.label, status)?,
                    }
                }
            }
        }
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> Region {
        Region::new(Coordinate::new(1.0, 1.0), 1.0, 1.0)
    }

    fn fixture() -> (Vec<Location>, HashMap<String, Option<Coordinate>>) {
        let locations = vec![
            Location::place("p", "P"),
            Location::new("cafe", LocationKind::Other("restaurant".into()), "Cafe"),
            Location::place("q", "Q"),
            Location::new("bm", LocationKind::Landmark, "British Museum"),
            Location::place("lost", "Lost"),
            Location::new("deli", LocationKind::Other("restaurant".into()), "Deli"),
        ];
        let mut coords = HashMap::new();
        coords.insert("p".to_string(), Some(Coordinate::new(1.0, 1.0)));
        coords.insert("q".to_string(), Some(Coordinate::new(5.0, 5.0)));
        coords.insert("lost".to_string(), None);
        (locations, coords)
    }

    #[test]
    fn test_counts() {
        let (locations, coords) = fixture();
        let report = Report::aggregate(&locations, &coords, &region());
        assert_eq!(report.total_places, 3);
        assert_eq!(report.inside_count, 1);
        assert_eq!(report.outside_count, 1);
        assert_eq!(report.not_found_count, 1);
        assert_eq!(report.resolved_count(), 2);
        assert_eq!(report.not_found, vec!["Lost".to_string()]);
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let (locations, coords) = fixture();
        let report = Report::aggregate(&locations, &coords, &region());

        let kinds: Vec<&str> = report.groups.iter().map(|g| g.kind.as_str()).collect();
        assert_eq!(kinds, vec!["place", "restaurant", "landmark"]);

        let places: Vec<(&str, PlaceStatus)> = report.groups[0]
            .entries
            .iter()
            .map(|e| (e.label.as_str(), e.status))
            .collect();
        assert_eq!(
            places,
            vec![
                ("P", PlaceStatus::Inside),
                ("Q", PlaceStatus::Outside),
                ("Lost", PlaceStatus::NotFound),
            ]
        );
        let restaurants: Vec<&str> = report.groups[1].entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(restaurants, vec!["Cafe", "Deli"]);
        assert_eq!(report.groups[1].entries[0].status, PlaceStatus::NotApplicable);
    }

    #[test]
    fn test_missing_coordinate_key_is_not_found() {
        let locations = vec![Location::place("never-resolved", "Never")];
        let report = Report::aggregate(&locations, &HashMap::new(), &region());
        assert_eq!(report.not_found_count, 1);
        assert_eq!(report.not_found, vec!["Never".to_string()]);
    }

    #[test]
    fn test_pages_split_types_in_half() {
        let (locations, coords) = fixture();
        let report = Report::aggregate(&locations, &coords, &region());
        let pages = report.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 1);
        assert_eq!(pages[1].len(), 2);

        let single = Report::aggregate(&locations[..1], &coords, &region());
        assert_eq!(single.pages().len(), 1);
    }

    #[test]
    fn test_render_text() {
        let (locations, coords) = fixture();
        let stats = ResolveStats {
            failures: 1,
            failed: vec!["lost".to_string()],
            ..Default::default()
        };
        let text = Report::aggregate(&locations, &coords, &region())
            .with_resolve_stats(&stats)
            .render_text();

        assert!(text.contains("Places not found:\n  Lost\n"));
        assert!(text.contains("P lies inside the region."));
        assert!(text.contains("Q lies outside the region."));
        assert!(text.contains("Failed resolutions:  1\n    lost\n"));
        assert!(text.contains("Restaurant\n  Cafe\n  Deli\n"));
        assert!(text.contains("  Lost (Not Found)"));
        assert!(text.contains("  British Museum\n"));
    }

    #[test]
    fn test_json_shape() {
        let (locations, coords) = fixture();
        let stats = ResolveStats {
            failures: 1,
            failed: vec!["lost".to_string()],
            ..Default::default()
        };
        let report = Report::aggregate(&locations, &coords, &region()).with_resolve_stats(&stats);
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["insideCount"], 1);
        assert_eq!(json["notFound"], serde_json::json!(["Lost"]));
        assert_eq!(json["failedNames"], serde_json::json!(["lost"]));
        assert_eq!(json["groups"][1]["type"], "restaurant");
        assert_eq!(json["groups"][0]["entries"][2]["status"], "NotFound");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("place"), "Place");
        assert_eq!(capitalize("BOUNDARY"), "Boundary");
        assert_eq!(capitalize(""), "");
    }
}
