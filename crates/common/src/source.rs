//! The seam between the aggregator and the upstream clients.

use std::future::Future;

use crate::{EarthquakeRecord, Source};

/// Outcome of one upstream fetch.
///
/// Clients never return errors to the aggregator; a failed fetch becomes
/// `Unavailable` with a human-readable reason.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceFetch {
    Fetched(Vec<EarthquakeRecord>),
    Unavailable { reason: String },
}

impl SourceFetch {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        SourceFetch::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SourceFetch::Fetched(_))
    }

    pub fn len(&self) -> usize {
        match self {
            SourceFetch::Fetched(records) => records.len(),
            SourceFetch::Unavailable { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records to merge; an unavailable source contributes nothing.
    pub fn into_records(self) -> Vec<EarthquakeRecord> {
        match self {
            SourceFetch::Fetched(records) => records,
            SourceFetch::Unavailable { .. } => Vec::new(),
        }
    }
}

/// An upstream that can be asked for recent earthquakes.
pub trait EarthquakeSource: Send + Sync + 'static {
    /// Which provenance tag this source stamps on its records.
    fn source(&self) -> Source;

    /// Fetch events from the last `lookback_hours` at or above `min_magnitude`.
    ///
    /// `limit` is the caller's final result size; sources that cap results
    /// server-side size their request from it.
    fn fetch(
        &self,
        lookback_hours: u32,
        min_magnitude: f64,
        limit: usize,
    ) -> impl Future<Output = SourceFetch> + Send;
}
