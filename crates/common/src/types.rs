//! Domain types shared across the workspace.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

// ── Query bounds ──────────────────────────────────────────────────────

pub const MIN_LOOKBACK_HOURS: u32 = 1;
pub const MAX_LOOKBACK_HOURS: u32 = 720;
pub const MIN_MAGNITUDE_FLOOR: f64 = 0.0;
pub const MAX_MAGNITUDE_FLOOR: f64 = 10.0;
pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 2000;

// ── Records ───────────────────────────────────────────────────────────

/// Provenance of an earthquake record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Kandilli Observatory live feed.
    #[serde(rename = "Kandilli")]
    RegionalObservatory,
    /// USGS FDSN event catalog.
    #[serde(rename = "USGS")]
    GlobalCatalog,
    /// Hardcoded fallback data.
    Sample,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Source::RegionalObservatory => "Kandilli",
            Source::GlobalCatalog => "USGS",
            Source::Sample => "Sample",
        }
    }

    /// Secondary sort key when two events share a timestamp.
    pub fn rank(self) -> u8 {
        match self {
            Source::RegionalObservatory => 0,
            Source::GlobalCatalog => 1,
            Source::Sample => 2,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One seismic event, normalized across sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthquakeRecord {
    /// Source-provided id. Unique only within one source.
    pub id: String,
    pub magnitude: f64,
    pub location: String,
    pub occurred_at: DateTime<Utc>,
    pub coordinates: Coordinates,
    /// Hypocenter depth in km (0 when the source omits it).
    pub depth_km: f64,
    pub source: Source,
}

impl EarthquakeRecord {
    /// Newest first; equal instants fall back to source rank, then id.
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then_with(|| a.source.rank().cmp(&b.source.rank()))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// A merged, sorted, truncated batch of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    /// False only when the degraded-data fallback was substituted.
    pub success: bool,
    pub records: Vec<EarthquakeRecord>,
    pub generated_at: DateTime<Utc>,
    pub total_count: usize,
}

impl AggregateResult {
    pub fn new(records: Vec<EarthquakeRecord>, generated_at: DateTime<Utc>) -> Self {
        let total_count = records.len();
        Self {
            success: true,
            records,
            generated_at,
            total_count,
        }
    }

    pub fn degraded(records: Vec<EarthquakeRecord>, generated_at: DateTime<Utc>) -> Self {
        Self {
            success: false,
            ..Self::new(records, generated_at)
        }
    }
}

// ── Query ─────────────────────────────────────────────────────────────

/// Which upstream sources a query draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    #[serde(alias = "regional", alias = "regional-only")]
    Kandilli,
    #[serde(alias = "global", alias = "global-only")]
    Usgs,
    #[default]
    Hybrid,
}

impl SourceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceMode::Kandilli => "kandilli",
            SourceMode::Usgs => "usgs",
            SourceMode::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceMode {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "kandilli" | "regional" | "regional-only" => Ok(SourceMode::Kandilli),
            "usgs" | "global" | "global-only" => Ok(SourceMode::Usgs),
            "hybrid" | "both" => Ok(SourceMode::Hybrid),
            other => Err(Error::InvalidQuery(format!(
                "source must be one of: kandilli, usgs, hybrid (got '{other}')"
            ))),
        }
    }
}

/// Validated query parameters for one aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuakeQuery {
    pub lookback_hours: u32,
    pub min_magnitude: f64,
    pub limit: usize,
    pub mode: SourceMode,
}

impl QuakeQuery {
    /// Build a query, rejecting values outside the public bounds.
    pub fn new(
        lookback_hours: u32,
        min_magnitude: f64,
        limit: usize,
        mode: SourceMode,
    ) -> Result<Self, Error> {
        let mut issues: Vec<String> = Vec::new();

        if !(MIN_LOOKBACK_HOURS..=MAX_LOOKBACK_HOURS).contains(&lookback_hours) {
            issues.push(format!(
                "hours_back must be in [{MIN_LOOKBACK_HOURS}, {MAX_LOOKBACK_HOURS}]"
            ));
        }
        if !min_magnitude.is_finite()
            || !(MIN_MAGNITUDE_FLOOR..=MAX_MAGNITUDE_FLOOR).contains(&min_magnitude)
        {
            issues.push(format!(
                "min_magnitude must be in [{MIN_MAGNITUDE_FLOOR}, {MAX_MAGNITUDE_FLOOR}]"
            ));
        }
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            issues.push(format!("limit must be in [{MIN_LIMIT}, {MAX_LIMIT}]"));
        }

        if !issues.is_empty() {
            return Err(Error::InvalidQuery(issues.join("; ")));
        }

        Ok(Self {
            lookback_hours,
            min_magnitude,
            limit,
            mode,
        })
    }
}

// ── Stats ─────────────────────────────────────────────────────────────

/// Summary statistics over a record set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct QuakeStats {
    pub total: usize,
    pub max_magnitude: f64,
    pub min_magnitude: f64,
    pub avg_magnitude: f64,
    pub magnitude_3_plus: usize,
    pub magnitude_4_plus: usize,
    pub magnitude_5_plus: usize,
}
