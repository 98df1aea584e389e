//! Kandilli Observatory live feed client.
//!
//! The feed endpoint ignores query parameters and always returns its full
//! current window, so time and magnitude filtering happen locally after the
//! whole payload is scanned.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use common::config::SourcesConfig;
use common::{Coordinates, EarthquakeRecord, EarthquakeSource, Error, Source, SourceFetch};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Timestamp layouts seen in the feed, tried in this order.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y.%m.%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Feed timestamps are observatory local time (TRT, UTC+03:00, no DST).
const OBSERVATORY_UTC_OFFSET_SECS: i32 = 3 * 3600;

const UNKNOWN_LOCATION: &str = "Unknown location";

/// Kandilli live feed client.
#[derive(Debug, Clone)]
pub struct KandilliClient {
    client: reqwest::Client,
    url: String,
}

// ── Feed response types ───────────────────────────────────────────────

/// The feed is served either wrapped in `{"result": [...]}` or as a bare array.
///
/// Items stay untyped here so one malformed item cannot fail the batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LiveFeedResponse {
    Bare(Vec<Value>),
    Wrapped {
        #[serde(default)]
        result: Vec<Value>,
    },
}

impl LiveFeedResponse {
    pub fn into_items(self) -> Vec<Value> {
        match self {
            LiveFeedResponse::Bare(items) => items,
            LiveFeedResponse::Wrapped { result } => result,
        }
    }
}

/// One earthquake as published by the feed.
#[derive(Debug, Deserialize)]
pub struct LiveQuake {
    #[serde(default)]
    pub earthquake_id: String,
    #[serde(default)]
    pub mag: f64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub geojson: Option<GeoJsonPoint>,
    /// Loosely structured; only `closestCity.name` is read.
    #[serde(default)]
    pub location_properties: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct GeoJsonPoint {
    /// `[lng, lat, depth?]`
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl LiveQuake {
    fn raw_timestamp(&self) -> Option<&str> {
        [self.date.as_deref(), self.date_time.as_deref()]
            .into_iter()
            .flatten()
            .find(|raw| !raw.trim().is_empty())
    }

    fn closest_city(&self) -> Option<&str> {
        self.location_properties
            .as_ref()?
            .get("closestCity")?
            .get("name")?
            .as_str()
            .filter(|name| !name.is_empty())
    }

    fn location(&self) -> String {
        let title = self
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(UNKNOWN_LOCATION);
        match self.closest_city() {
            Some(city) => format!("{title} ({city})"),
            None => title.to_string(),
        }
    }
}

// ── Implementation ────────────────────────────────────────────────────

impl KandilliClient {
    pub fn new(sources: &SourcesConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(sources.user_agent.as_str())
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(sources.timeout_secs))
            .build()
            .map_err(|e| Error::Http(format!("failed to build Kandilli HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: sources.kandilli_url.clone(),
        })
    }

    /// Fetch the raw item list from the live feed.
    pub async fn fetch_live_feed(&self) -> Result<Vec<Value>, Error> {
        debug!("Fetching Kandilli live feed: {}", self.url);

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Kandilli(format!("HTTP error: {e}")))?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Kandilli(format!(
                "Kandilli returned {}: {}",
                status,
                truncate(&body, 500)
            )));
        }

        let payload: LiveFeedResponse = resp
            .json()
            .await
            .map_err(|e| Error::Kandilli(format!("JSON parse error: {e}")))?;

        Ok(payload.into_items())
    }

    /// Fetch the feed and keep events inside the window at or above the floor.
    pub async fn get_earthquakes(
        &self,
        lookback_hours: u32,
        min_magnitude: f64,
    ) -> Result<Vec<EarthquakeRecord>, Error> {
        let items = self.fetch_live_feed().await?;
        let scanned = items.len();
        let records = normalize_feed(items, Utc::now(), lookback_hours, min_magnitude);

        debug!(
            "Kandilli: kept {} / {} feed items (window={}h, min_mag={})",
            records.len(),
            scanned,
            lookback_hours,
            min_magnitude
        );

        Ok(records)
    }
}

impl EarthquakeSource for KandilliClient {
    fn source(&self) -> Source {
        Source::RegionalObservatory
    }

    async fn fetch(&self, lookback_hours: u32, min_magnitude: f64, _limit: usize) -> SourceFetch {
        match self.get_earthquakes(lookback_hours, min_magnitude).await {
            Ok(records) => {
                info!("Kandilli returned {} earthquakes", records.len());
                SourceFetch::Fetched(records)
            }
            Err(e) => {
                warn!("Kandilli fetch failed: {}", e);
                SourceFetch::unavailable(e.to_string())
            }
        }
    }
}

/// Parse a feed timestamp with the known layouts, as observatory local time.
pub fn parse_feed_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let naive = TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?;

    let offset = FixedOffset::east_opt(OBSERVATORY_UTC_OFFSET_SECS)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert feed items to records, dropping anything malformed, too old, or
/// below `min_magnitude`.
pub fn normalize_feed(
    items: Vec<Value>,
    now: DateTime<Utc>,
    lookback_hours: u32,
    min_magnitude: f64,
) -> Vec<EarthquakeRecord> {
    let cutoff = now - chrono::Duration::hours(i64::from(lookback_hours));

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<LiveQuake>(item).ok())
        .filter_map(|quake| {
            let occurred_at = quake.raw_timestamp().and_then(parse_feed_timestamp)?;
            if occurred_at < cutoff || quake.mag < min_magnitude {
                return None;
            }
            Some(to_record(quake, occurred_at))
        })
        .collect()
}

fn to_record(quake: LiveQuake, occurred_at: DateTime<Utc>) -> EarthquakeRecord {
    let coords = quake
        .geojson
        .as_ref()
        .map(|g| g.coordinates.as_slice())
        .unwrap_or_default();
    let longitude = coords.first().copied().unwrap_or(0.0);
    let latitude = coords.get(1).copied().unwrap_or(0.0);
    let depth_km = quake
        .depth
        .or_else(|| coords.get(2).copied())
        .unwrap_or(0.0);
    let location = quake.location();

    EarthquakeRecord {
        id: quake.earthquake_id,
        magnitude: quake.mag,
        location,
        occurred_at,
        coordinates: Coordinates::new(latitude, longitude),
        depth_km,
        source: Source::RegionalObservatory,
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_feed() -> &'static str {
        r#"{
            "status": true,
            "result": [
                {
                    "earthquake_id": "eq-1",
                    "title": "AKDENIZ",
                    "mag": 3.4,
                    "depth": 7.2,
                    "date": "2026.10.18 11:30:00",
                    "geojson": {"type": "Point", "coordinates": [28.5, 36.1]},
                    "location_properties": {"closestCity": {"name": "Mugla", "cityCode": 48}}
                },
                {
                    "earthquake_id": "eq-2",
                    "title": "ELAZIG",
                    "mag": 2.1,
                    "date_time": "2026-10-18 11:00:00",
                    "geojson": {"type": "Point", "coordinates": [39.2, 38.6, 11.0]}
                },
                {
                    "earthquake_id": "eq-3",
                    "title": "VAN",
                    "mag": 4.6,
                    "date": "18/10/2026 10:00",
                    "geojson": {"type": "Point", "coordinates": [43.4, 38.5]}
                },
                {
                    "earthquake_id": "eq-4",
                    "title": "DUZCE",
                    "mag": 5.0,
                    "date": "2026.10.16 10:00:00"
                },
                {
                    "earthquake_id": "eq-5",
                    "mag": "not a number",
                    "date": "2026.10.18 11:00:00"
                }
            ]
        }"#
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T09:00:00Z")
            .expect("valid now")
            .with_timezone(&Utc)
    }

    fn parse_items(raw: &str) -> Vec<Value> {
        serde_json::from_str::<LiveFeedResponse>(raw)
            .expect("feed should deserialize")
            .into_items()
    }

    #[test]
    fn test_wrapped_and_bare_payloads() {
        assert_eq!(parse_items(sample_feed()).len(), 5);
        assert_eq!(parse_items(r#"[{"mag": 1.0}, {"mag": 2.0}]"#).len(), 2);
        assert!(parse_items(r#"{"status": false}"#).is_empty());
    }

    #[test]
    fn test_timestamp_formats_in_priority_order() {
        let dotted = parse_feed_timestamp("2026.10.18 11:30:00").expect("dotted format");
        let dashed = parse_feed_timestamp("2026-10-18 11:30:00").expect("dashed format");
        assert_eq!(dotted, dashed);
        // 11:30 TRT is 08:30 UTC.
        assert_eq!(dotted.to_rfc3339(), "2026-10-18T08:30:00+00:00");
        assert!(parse_feed_timestamp("18/10/2026 10:00").is_none());
        assert!(parse_feed_timestamp("").is_none());
    }

    #[test]
    fn test_normalize_filters_window_magnitude_and_garbage() {
        let records = normalize_feed(parse_items(sample_feed()), now(), 24, 2.0);

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        // eq-3 has an unknown timestamp format, eq-4 is two days old,
        // eq-5 fails to deserialize.
        assert_eq!(ids, vec!["eq-1", "eq-2"]);

        let floor_applied = normalize_feed(parse_items(sample_feed()), now(), 24, 3.0);
        assert_eq!(floor_applied.len(), 1);
        assert_eq!(floor_applied[0].id, "eq-1");
    }

    #[test]
    fn test_record_fields() {
        let records = normalize_feed(parse_items(sample_feed()), now(), 24, 2.0);

        let first = &records[0];
        assert_eq!(first.location, "AKDENIZ (Mugla)");
        assert!((first.coordinates.latitude - 36.1).abs() < 1e-9);
        assert!((first.coordinates.longitude - 28.5).abs() < 1e-9);
        assert!((first.depth_km - 7.2).abs() < 1e-9);
        assert_eq!(first.source, Source::RegionalObservatory);

        // No depth field: falls back to the third coordinate.
        let second = &records[1];
        assert_eq!(second.location, "ELAZIG");
        assert!((second.depth_km - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_geometry_defaults_to_zero() {
        let items = parse_items(r#"[{"earthquake_id": "x", "mag": 3.0, "date": "2026.10.18 11:59:00"}]"#);
        let records = normalize_feed(items, now(), 1, 0.0);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].coordinates, Coordinates::new(0.0, 0.0));
        assert_eq!(records[0].depth_km, 0.0);
        assert_eq!(records[0].location, "Unknown location");
    }

    #[test]
    fn test_empty_date_falls_back_to_date_time() {
        let items = parse_items(
            r#"[{"earthquake_id": "y", "mag": 3.0, "date": "", "date_time": "2026-10-18 11:00:00"}]"#,
        );
        assert_eq!(normalize_feed(items, now(), 24, 0.0).len(), 1);
    }
}
