//! georegion: resolve named places to coordinates, derive an elliptical
//! region from four boundary landmarks, and report which places fall inside.

pub mod classify;
pub mod config;
pub mod location;
pub mod plot;
pub mod region;
pub mod report;
pub mod survey;

pub use classify::{classify, PlaceStatus};
pub use config::Config;
pub use region::{Region, RegionError};
pub use report::Report;
pub use survey::{Survey, SurveyOutcome};
