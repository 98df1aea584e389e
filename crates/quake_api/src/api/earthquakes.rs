//! Earthquake feed and stats endpoints.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use common::config::QueryConfig;
use common::{
    time_ago, AggregateResult, EarthquakeRecord, Error, Locale, QuakeQuery, SourceMode, Source,
};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::AppState;

/// Query parameters for GET /api/earthquakes. Omitted values use the
/// configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct EarthquakeParams {
    pub hours_back: Option<u32>,
    pub min_magnitude: Option<f64>,
    pub limit: Option<usize>,
    /// kandilli, usgs or hybrid.
    pub source: Option<String>,
}

impl EarthquakeParams {
    pub fn into_query(self, defaults: &QueryConfig) -> Result<QuakeQuery, Error> {
        let mode = parse_mode(self.source.as_deref(), defaults.default_mode)?;
        QuakeQuery::new(
            self.hours_back.unwrap_or(defaults.default_hours_back),
            self.min_magnitude.unwrap_or(defaults.default_min_magnitude),
            self.limit.unwrap_or(defaults.default_limit),
            mode,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    pub source: Option<String>,
}

fn parse_mode(raw: Option<&str>, default: SourceMode) -> Result<SourceMode, Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw.parse(),
    }
}

#[derive(Debug, Serialize)]
pub struct CoordinatesView {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct EarthquakeView {
    pub id: String,
    pub magnitude: f64,
    pub location: String,
    pub time: DateTime<Utc>,
    pub time_ago: String,
    pub coordinates: CoordinatesView,
    pub depth: f64,
    pub source: Source,
}

impl EarthquakeView {
    fn render(record: &EarthquakeRecord, now: DateTime<Utc>, locale: Locale) -> Self {
        Self {
            id: record.id.clone(),
            magnitude: record.magnitude,
            location: record.location.clone(),
            time: record.occurred_at,
            time_ago: time_ago(record.occurred_at, now, locale),
            coordinates: CoordinatesView {
                lat: record.coordinates.latitude,
                lng: record.coordinates.longitude,
            },
            depth: record.depth_km,
            source: record.source,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EarthquakesResponse {
    pub success: bool,
    pub data: Vec<EarthquakeView>,
    pub last_update: DateTime<Utc>,
    pub last_update_ago: String,
    pub total_count: usize,
}

impl EarthquakesResponse {
    /// Relative times are computed against `now`, so a cached batch still
    /// reports how old it is.
    pub fn render(result: &AggregateResult, now: DateTime<Utc>, locale: Locale) -> Self {
        Self {
            success: result.success,
            data: result
                .records
                .iter()
                .map(|r| EarthquakeView::render(r, now, locale))
                .collect(),
            last_update: result.generated_at,
            last_update_ago: time_ago(result.generated_at, now, locale),
            total_count: result.total_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsView {
    pub total_earthquakes: usize,
    pub max_magnitude: f64,
    pub min_magnitude: f64,
    pub avg_magnitude: f64,
    pub magnitude_3_plus: usize,
    pub magnitude_4_plus: usize,
    pub magnitude_5_plus: usize,
    pub last_update: DateTime<Utc>,
    pub last_update_ago: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatsView,
}

/// GET /api/earthquakes
pub async fn list_earthquakes(
    State(state): State<AppState>,
    params: Result<Query<EarthquakeParams>, QueryRejection>,
) -> Result<Json<EarthquakesResponse>, ApiError> {
    let Query(params) = params?;
    let query = params.into_query(&state.config.query)?;

    let result = state.service.earthquakes(&query).await;

    Ok(Json(EarthquakesResponse::render(
        &result,
        Utc::now(),
        state.config.query.locale,
    )))
}

/// GET /api/earthquakes/stats
pub async fn earthquake_stats(
    State(state): State<AppState>,
    params: Result<Query<StatsParams>, QueryRejection>,
) -> Result<Json<StatsResponse>, ApiError> {
    let Query(params) = params?;
    let mode = parse_mode(params.source.as_deref(), state.config.query.default_mode)?;

    let report = state.service.stats(mode).await;
    let stats = report.stats;

    Ok(Json(StatsResponse {
        success: report.success,
        stats: StatsView {
            total_earthquakes: stats.total,
            max_magnitude: stats.max_magnitude,
            min_magnitude: stats.min_magnitude,
            avg_magnitude: stats.avg_magnitude,
            magnitude_3_plus: stats.magnitude_3_plus,
            magnitude_4_plus: stats.magnitude_4_plus,
            magnitude_5_plus: stats.magnitude_5_plus,
            last_update: report.generated_at,
            last_update_ago: time_ago(report.generated_at, Utc::now(), state.config.query.locale),
        },
    }))
}
