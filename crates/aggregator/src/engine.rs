//! Fan-out/fan-in over the upstream sources.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::{AggregateResult, EarthquakeRecord, EarthquakeSource, QuakeQuery, SourceFetch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::plan::FetchPlan;

/// Runs the sources a query asks for and merges what they return.
///
/// Each source runs as its own task under a per-call timeout. A branch that
/// reports failure, times out, or panics contributes no records and never
/// aborts the other branch.
#[derive(Debug)]
pub struct Aggregator<R, G> {
    regional: Arc<R>,
    global: Arc<G>,
    fetch_timeout: Duration,
}

impl<R: EarthquakeSource, G: EarthquakeSource> Aggregator<R, G> {
    pub fn new(regional: R, global: G, fetch_timeout: Duration) -> Self {
        Self {
            regional: Arc::new(regional),
            global: Arc::new(global),
            fetch_timeout,
        }
    }

    pub fn regional(&self) -> &R {
        &self.regional
    }

    pub fn global(&self) -> &G {
        &self.global
    }

    /// Fetch, merge, sort newest first, and truncate to `query.limit`.
    pub async fn aggregate(&self, query: &QuakeQuery) -> AggregateResult {
        let plan = FetchPlan::from(query.mode);

        // Both branches are spawned before either is awaited.
        let regional = plan
            .regional
            .then(|| spawn_fetch(Arc::clone(&self.regional), query, self.fetch_timeout));
        let global = plan
            .global
            .then(|| spawn_fetch(Arc::clone(&self.global), query, self.fetch_timeout));

        let regional = join_branch(regional, self.regional.source().label()).await;
        let global = join_branch(global, self.global.source().label()).await;

        let regional_count = regional.as_ref().map(SourceFetch::len);
        let global_count = global.as_ref().map(SourceFetch::len);

        let records = merge([regional, global].into_iter().flatten(), query.limit);
        let result = AggregateResult::new(records, Utc::now());

        info!(
            "Aggregated {} earthquakes (mode={}, kandilli={}, usgs={}, limit={})",
            result.total_count,
            query.mode,
            describe(regional_count),
            describe(global_count),
            query.limit
        );

        result
    }
}

/// Concatenate every available contribution, sort newest first, truncate.
pub fn merge(
    fetches: impl IntoIterator<Item = SourceFetch>,
    limit: usize,
) -> Vec<EarthquakeRecord> {
    let mut records: Vec<EarthquakeRecord> = fetches
        .into_iter()
        .flat_map(SourceFetch::into_records)
        .collect();
    records.sort_by(EarthquakeRecord::newest_first);
    records.truncate(limit);
    records
}

fn spawn_fetch<S: EarthquakeSource>(
    source: Arc<S>,
    query: &QuakeQuery,
    fetch_timeout: Duration,
) -> JoinHandle<SourceFetch> {
    let QuakeQuery {
        lookback_hours,
        min_magnitude,
        limit,
        ..
    } = *query;

    tokio::spawn(async move {
        let fetch = source.fetch(lookback_hours, min_magnitude, limit);
        match tokio::time::timeout(fetch_timeout, fetch).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    "{} fetch timed out after {}s",
                    source.source().label(),
                    fetch_timeout.as_secs()
                );
                SourceFetch::unavailable(format!(
                    "timed out after {}s",
                    fetch_timeout.as_secs()
                ))
            }
        }
    })
}

async fn join_branch(handle: Option<JoinHandle<SourceFetch>>, label: &str) -> Option<SourceFetch> {
    let handle = handle?;
    match handle.await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            warn!("{} fetch task failed: {}", label, e);
            Some(SourceFetch::unavailable(format!("fetch task failed: {e}")))
        }
    }
}

fn describe(count: Option<usize>) -> String {
    count.map_or_else(|| "skipped".to_string(), |n| n.to_string())
}
