//! Location subsystem for georegion.
//!
//! Provides the input location list, coordinate caching, provider access,
//! request pacing and the resolver that ties them together.

pub mod cache;
pub mod pacing;
pub mod providers;
pub mod resolver;
pub mod types;

pub use cache::{CacheError, Cached, CoordinateStore, JsonFileCache, MemoryStore};
pub use pacing::{Clock, FixedDelay, SystemClock};
pub use providers::{Geocoder, NominatimProvider};
pub use resolver::{LocationResolver, ResolveStats};
pub use types::{load_locations, Coordinate, Location, LocationError, LocationKind};
