//! Cached query entry point used by the HTTP layer and the CLI.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{
    AggregateResult, EarthquakeSource, Error, QuakeQuery, QuakeStats, SourceMode, MAX_LIMIT,
};
use tracing::{debug, error};

use crate::cache::{Fingerprint, ResponseCache};
use crate::engine::Aggregator;
use crate::fallback;
use crate::stats::summarize;

const STATS_LOOKBACK_HOURS: u32 = 24;
const STATS_MIN_MAGNITUDE: f64 = 2.0;

/// Summary over the last day of activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsReport {
    pub success: bool,
    pub stats: QuakeStats,
    pub generated_at: DateTime<Utc>,
}

/// Query the stats endpoint runs for `mode`.
pub fn stats_query(mode: SourceMode) -> QuakeQuery {
    QuakeQuery {
        lookback_hours: STATS_LOOKBACK_HOURS,
        min_magnitude: STATS_MIN_MAGNITUDE,
        limit: MAX_LIMIT,
        mode,
    }
}

/// Aggregator plus response cache.
///
/// Concurrent misses on the same fingerprint each run the pipeline; the last
/// writer wins.
pub struct QuakeService<R, G> {
    aggregator: Arc<Aggregator<R, G>>,
    cache: ResponseCache,
}

impl<R: EarthquakeSource, G: EarthquakeSource> QuakeService<R, G> {
    pub fn new(aggregator: Aggregator<R, G>, cache: ResponseCache) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            cache,
        }
    }

    pub fn aggregator(&self) -> &Aggregator<R, G> {
        &self.aggregator
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Cached or fresh result for `query`.
    ///
    /// Never fails: if the pipeline task dies the degraded sample is returned
    /// and nothing is cached.
    pub async fn earthquakes(&self, query: &QuakeQuery) -> Arc<AggregateResult> {
        let fingerprint = Fingerprint::of(query);
        if let Some(hit) = self.cache.get(&fingerprint) {
            debug!("Cache hit for {}", fingerprint);
            return hit;
        }
        debug!("Cache miss for {}", fingerprint);

        let aggregator = Arc::clone(&self.aggregator);
        let query = *query;
        let outcome = tokio::spawn(async move { aggregator.aggregate(&query).await })
            .await
            .map_err(|e| Error::Pipeline(e.to_string()));

        self.settle(fingerprint, outcome)
    }

    /// Stats over the last 24 hours at a 2.0 floor.
    pub async fn stats(&self, mode: SourceMode) -> StatsReport {
        let result = self.earthquakes(&stats_query(mode)).await;
        StatsReport {
            success: result.success,
            stats: summarize(&result.records),
            generated_at: result.generated_at,
        }
    }

    fn settle(
        &self,
        fingerprint: Fingerprint,
        outcome: Result<AggregateResult, Error>,
    ) -> Arc<AggregateResult> {
        match outcome {
            Ok(result) => self.cache.put(fingerprint, result),
            Err(e) => {
                error!("{} for {}; serving sample data", e, fingerprint);
                Arc::new(fallback::degraded_result(Utc::now()))
            }
        }
    }
}
