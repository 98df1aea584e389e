//! Time-bounded memo of aggregation results.
//!
//! Backed by `DashMap` so concurrent requests for different fingerprints never
//! contend on a single lock.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use common::{AggregateResult, QuakeQuery};
use dashmap::DashMap;
use tokio::time::Instant;

/// Cache key derived from every query parameter that shapes the result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(query: &QuakeQuery) -> Self {
        Self(format!(
            "earthquakes_{}_{}_{}_{}",
            query.lookback_hours, query.min_magnitude, query.limit, query.mode
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&QuakeQuery> for Fingerprint {
    fn from(query: &QuakeQuery) -> Self {
        Self::of(query)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
struct CacheEntry {
    result: Arc<AggregateResult>,
    inserted_at: Instant,
}

/// Fingerprint-keyed cache with a fixed time-to-live.
///
/// Expired entries are removed lazily on lookup; there is no sweeper and no
/// size bound.
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<Fingerprint, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `fingerprint`, if any.
    ///
    /// An entry is fresh while its age is strictly below the TTL.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<AggregateResult>> {
        // The read guard must be released before `remove_if` takes the shard lock.
        let hit = self.entries.get(fingerprint).map(|entry| {
            (entry.inserted_at.elapsed() < self.ttl).then(|| Arc::clone(&entry.result))
        })?;

        if hit.is_none() {
            self.entries
                .remove_if(fingerprint, |_, entry| entry.inserted_at.elapsed() >= self.ttl);
        }
        hit
    }

    /// Store `result`, replacing any previous entry for `fingerprint`.
    pub fn put(&self, fingerprint: Fingerprint, result: AggregateResult) -> Arc<AggregateResult> {
        let result = Arc::new(result);
        self.entries.insert(
            fingerprint,
            CacheEntry {
                result: Arc::clone(&result),
                inserted_at: Instant::now(),
            },
        );
        result
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::SourceMode;

    fn query(hours: u32, mode: SourceMode) -> QuakeQuery {
        QuakeQuery::new(hours, 2.5, 100, mode).expect("valid query")
    }

    fn result(total: usize) -> AggregateResult {
        let mut r = AggregateResult::new(Vec::new(), Utc::now());
        r.total_count = total;
        r
    }

    #[test]
    fn test_fingerprint_covers_every_parameter() {
        let base = Fingerprint::of(&query(24, SourceMode::Hybrid));
        assert_eq!(base.as_str(), "earthquakes_24_2.5_100_hybrid");

        assert_ne!(base, Fingerprint::of(&query(48, SourceMode::Hybrid)));
        assert_ne!(base, Fingerprint::of(&query(24, SourceMode::Usgs)));
        assert_ne!(
            base,
            Fingerprint::of(&QuakeQuery::new(24, 3.0, 100, SourceMode::Hybrid).unwrap())
        );
        assert_ne!(
            base,
            Fingerprint::of(&QuakeQuery::new(24, 2.5, 50, SourceMode::Hybrid).unwrap())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(120));
        let fp = Fingerprint::of(&query(24, SourceMode::Hybrid));

        cache.put(fp.clone(), result(7));
        tokio::time::advance(Duration::from_secs(119)).await;

        let hit = cache.get(&fp).expect("entry should still be fresh");
        assert_eq!(hit.total_count, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_evicted() {
        let cache = ResponseCache::new(Duration::from_secs(120));
        let fp = Fingerprint::of(&query(24, SourceMode::Hybrid));

        cache.put(fp.clone(), result(7));
        tokio::time::advance(Duration::from_secs(120)).await;

        assert!(cache.get(&fp).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_replaces_and_resets_age() {
        let cache = ResponseCache::new(Duration::from_secs(120));
        let fp = Fingerprint::of(&query(24, SourceMode::Hybrid));

        cache.put(fp.clone(), result(1));
        tokio::time::advance(Duration::from_secs(100)).await;
        cache.put(fp.clone(), result(2));
        tokio::time::advance(Duration::from_secs(100)).await;

        assert_eq!(cache.get(&fp).map(|r| r.total_count), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_miss_and_clear() {
        let cache = ResponseCache::new(Duration::from_secs(120));
        let fp = Fingerprint::of(&query(24, SourceMode::Kandilli));
        assert!(cache.get(&fp).is_none());

        cache.put(fp.clone(), result(3));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.get(&fp).is_none());
    }
}
