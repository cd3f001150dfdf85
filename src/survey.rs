//! One run of the pipeline: resolve, build the region, classify, report.

use crate::config::Landmark;
use crate::location::{Clock, Coordinate, CoordinateStore, Geocoder, Location, LocationResolver};
use crate::plot::PlotData;
use crate::region::{Region, RegionError};
use crate::report::Report;
use std::collections::HashMap;
use tracing::{error, info};

pub struct SurveyOutcome {
    pub region: Region,
    pub report: Report,
    /// Landmark names with their resolved coordinates, in configured order.
    pub landmarks: Vec<(String, Coordinate)>,
}

impl SurveyOutcome {
    pub fn plot_data(&self) -> PlotData {
        PlotData::new(&self.report, &self.landmarks, &self.region)
    }
}

pub struct Survey<'a> {
    locations: &'a [Location],
    landmarks: &'a [Landmark],
}

impl<'a> Survey<'a> {
    pub fn new(locations: &'a [Location], landmarks: &'a [Landmark]) -> Self {
        Self { locations, landmarks }
    }

    /// Run the survey.
    ///
    /// Landmarks are resolved first so a run that cannot build its region
    /// fails before spending provider requests on places. A landmark
    /// failure is the only fatal error; place failures end up in the report.
    pub fn run<S, G, C>(&self, resolver: &mut LocationResolver<S, G, C>) -> Result<SurveyOutcome, RegionError>
    where
        S: CoordinateStore,
        G: Geocoder,
        C: Clock,
    {
        let named: Vec<(String, Option<Coordinate>)> = self
            .landmarks
            .iter()
            .map(|l| (l.name.clone(), resolver.resolve(&l.search)))
            .collect();

        let region = Region::build(&named).map_err(|e| {
            error!("{}", e);
            e
        })?;
        info!(
            "Region center {} with radii {:.5}\u{00B0} lat, {:.5}\u{00B0} lon",
            region.center(),
            region.radius_lat(),
            region.radius_lon()
        );

        let mut coordinates: HashMap<String, Option<Coordinate>> = HashMap::new();
        for location in self.locations.iter().filter(|l| l.kind.is_place()) {
            if !coordinates.contains_key(&location.search_string) {
                let resolved = resolver.resolve(&location.search_string);
                coordinates.insert(location.search_string.clone(), resolved);
            }
        }

        let report = Report::aggregate(self.locations, &coordinates, &region)
            .with_resolve_stats(resolver.stats());
        info!(
            "{} places: {} inside, {} outside, {} not found",
            report.total_places, report.inside_count, report.outside_count, report.not_found_count
        );

        let landmarks = named
            .into_iter()
            .filter_map(|(name, c)| c.map(|c| (name, c)))
            .collect();

        Ok(SurveyOutcome {
            region,
            report,
            landmarks,
        })
    }
}
