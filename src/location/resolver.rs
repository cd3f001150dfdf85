//! Location resolver: cache first, then the provider.
//!
//! Flow: cache hit (coordinate or confirmed null) → pacing delay → provider
//! lookup → cache write + persist. Failures never abort the caller; they
//! degrade to `None` and are counted in [`ResolveStats`].

use super::cache::{Cached, CoordinateStore};
use super::pacing::{Clock, FixedDelay, SystemClock};
use super::providers::Geocoder;
use super::types::{Coordinate, LocationError};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Per-run resolution counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    pub cache_hits: usize,
    /// Requests actually sent to the provider.
    pub lookups: usize,
    /// Names that failed this run, confirmed not found or transient.
    pub failures: usize,
    pub failed: Vec<String>,
}

/// Resolves place names to coordinates with caching and pacing.
pub struct LocationResolver<S, G, C = SystemClock>
where
    S: CoordinateStore,
    G: Geocoder,
    C: Clock,
{
    store: S,
    geocoder: G,
    pacer: FixedDelay<C>,
    offline: bool,
    // Transient failures are not cached but are not retried within a run.
    transient: HashSet<String>,
    stats: ResolveStats,
}

impl<S: CoordinateStore, G: Geocoder, C: Clock> LocationResolver<S, G, C> {
    pub fn new(store: S, geocoder: G, pacer: FixedDelay<C>) -> Self {
        Self {
            store,
            geocoder,
            pacer,
            offline: false,
            transient: HashSet::new(),
            stats: ResolveStats::default(),
        }
    }

    /// Set offline mode: only the cache is consulted.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn stats(&self) -> &ResolveStats {
        &self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn pacer(&self) -> &FixedDelay<C> {
        &self.pacer
    }

    /// Resolve a place name. Returns `None` if it cannot be resolved.
    pub fn resolve(&mut self, query: &str) -> Option<Coordinate> {
        match self.store.get(query) {
            Cached::Hit(coordinate) => {
                self.stats.cache_hits += 1;
                debug!("Cache hit for '{}': {}", query, coordinate);
                return Some(coordinate);
            }
            Cached::NotFound => {
                self.stats.cache_hits += 1;
                debug!("Cache hit for '{}': previously not found", query);
                return None;
            }
            Cached::Absent => {}
        }

        if self.transient.contains(query) {
            return None;
        }

        let result = if self.offline {
            Err(LocationError::Offline(query.to_string()))
        } else {
            self.pacer.wait();
            self.stats.lookups += 1;
            self.geocoder.lookup(query)
        };

        match result {
            Ok(coordinate) => {
                info!("Resolved '{}' to {}", query, coordinate);
                self.store.put(query, Some(coordinate));
                self.persist();
                Some(coordinate)
            }
            Err(LocationError::NotFound(_)) => {
                warn!("No coordinates found for '{}'", query);
                self.store.put(query, None);
                self.persist();
                self.record_failure(query);
                None
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", query, e);
                self.transient.insert(query.to_string());
                self.record_failure(query);
                None
            }
        }
    }

    fn record_failure(&mut self, query: &str) {
        self.stats.failures += 1;
        self.stats.failed.push(query.to_string());
    }

    fn persist(&self) {
        if let Err(e) = self.store.persist() {
            warn!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::cache::{JsonFileCache, MemoryStore};
    use crate::location::pacing::testing::RecordingClock;
    use crate::location::providers::testing::{Answer, FakeGeocoder};
    use std::time::Duration;
    use tempfile::TempDir;

    fn resolver(geocoder: FakeGeocoder) -> LocationResolver<MemoryStore, FakeGeocoder, RecordingClock> {
        LocationResolver::new(
            MemoryStore::new(),
            geocoder,
            FixedDelay::with_clock(Duration::from_secs(1), RecordingClock::default()),
        )
    }

    #[test]
    fn test_resolve_twice_single_lookup() {
        let mut r = resolver(FakeGeocoder::default().with("Hyde Park, London", Answer::Found(51.5, -0.16)));

        let first = r.resolve("Hyde Park, London");
        let second = r.resolve("Hyde Park, London");

        assert_eq!(first, Some(Coordinate::new(51.5, -0.16)));
        assert_eq!(first, second);
        assert_eq!(r.geocoder().calls_for("Hyde Park, London"), 1);
        assert_eq!(r.stats().lookups, 1);
        assert_eq!(r.stats().cache_hits, 1);
    }

    #[test]
    fn test_cache_hit_never_waits() {
        let mut store = MemoryStore::new();
        store.put("Lambeth, London", Some(Coordinate::new(51.49, -0.11)));
        let mut r = LocationResolver::new(
            store,
            FakeGeocoder::default(),
            FixedDelay::with_clock(Duration::from_secs(1), RecordingClock::default()),
        );

        assert!(r.resolve("Lambeth, London").is_some());
        assert_eq!(r.pacer().clock().count(), 0);
        assert_eq!(r.geocoder().total_calls(), 0);
    }

    #[test]
    fn test_each_lookup_waits_delay() {
        let mut r = resolver(
            FakeGeocoder::default()
                .with("a", Answer::Found(1.0, 1.0))
                .with("b", Answer::Found(2.0, 2.0)),
        );
        r.resolve("a");
        r.resolve("b");
        r.resolve("a");
        assert_eq!(r.pacer().clock().count(), 2);
        assert_eq!(r.pacer().clock().total(), Duration::from_secs(2));
    }

    #[test]
    fn test_not_found_cached_as_null() {
        let mut r = resolver(FakeGeocoder::default().with("Atlantis", Answer::Empty));

        assert_eq!(r.resolve("Atlantis"), None);
        assert_eq!(r.store().get("Atlantis"), Cached::NotFound);
        assert_eq!(r.stats().failures, 1);
        assert_eq!(r.stats().failed, vec!["Atlantis".to_string()]);

        // Confirmed not found is a cache hit from now on.
        assert_eq!(r.resolve("Atlantis"), None);
        assert_eq!(r.geocoder().calls_for("Atlantis"), 1);
        assert_eq!(r.stats().failures, 1);
    }

    #[test]
    fn test_transient_failure_not_cached() {
        let mut r = resolver(FakeGeocoder::default().with("Tower Bridge, London", Answer::Down));

        assert_eq!(r.resolve("Tower Bridge, London"), None);
        assert_eq!(r.store().get("Tower Bridge, London"), Cached::Absent);
        assert_eq!(r.stats().failures, 1);

        // Not retried within the same run, and counted once.
        assert_eq!(r.resolve("Tower Bridge, London"), None);
        assert_eq!(r.geocoder().calls_for("Tower Bridge, London"), 1);
        assert_eq!(r.stats().failures, 1);
    }

    #[test]
    fn test_transient_failure_retried_next_run() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let clock = || FixedDelay::with_clock(Duration::ZERO, RecordingClock::default());

        {
            let cache = JsonFileCache::load_from(path.clone()).unwrap();
            let mut r = LocationResolver::new(cache, FakeGeocoder::default().with("x", Answer::Down), clock());
            assert_eq!(r.resolve("x"), None);
        }

        let cache = JsonFileCache::load_from(path).unwrap();
        let mut r = LocationResolver::new(cache, FakeGeocoder::default().with("x", Answer::Found(3.0, 4.0)), clock());
        assert_eq!(r.resolve("x"), Some(Coordinate::new(3.0, 4.0)));
        assert_eq!(r.geocoder().calls_for("x"), 1);
    }

    #[test]
    fn test_success_persisted_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let cache = JsonFileCache::load_from(path.clone()).unwrap();
        let mut r = LocationResolver::new(
            cache,
            FakeGeocoder::default().with("British Museum, London", Answer::Found(51.5194, -0.127)),
            FixedDelay::with_clock(Duration::ZERO, RecordingClock::default()),
        );
        r.resolve("British Museum, London");

        let reloaded = JsonFileCache::load_from(path).unwrap();
        assert_eq!(
            reloaded.get("British Museum, London"),
            Cached::Hit(Coordinate::new(51.5194, -0.127))
        );
    }

    #[test]
    fn test_offline_skips_provider() {
        let mut r = resolver(FakeGeocoder::default().with("a", Answer::Found(1.0, 1.0)));
        r.set_offline(true);

        assert_eq!(r.resolve("a"), None);
        assert_eq!(r.geocoder().total_calls(), 0);
        assert_eq!(r.pacer().clock().count(), 0);
        assert_eq!(r.store().get("a"), Cached::Absent);
        assert_eq!(r.stats().failures, 1);
    }
}
