//! USGS FDSN event catalog client.
//!
//! Queries the worldwide catalog with server-side filters, then drops events
//! inside the Kandilli geo-fence so the regional feed stays the single
//! reporter for that area.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use common::config::SourcesConfig;
use common::{
    Coordinates, EarthquakeRecord, EarthquakeSource, Error, GeoFence, Source, SourceFetch,
    KANDILLI_REGION,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Below this the catalog is mostly noise for our use; requests never go lower.
pub const PRACTICAL_MIN_MAGNITUDE: f64 = 2.5;

/// Bounds on the provider-side result cap.
const MIN_PROVIDER_CAP: usize = 200;
const MAX_PROVIDER_CAP: usize = 20_000;
/// Headroom over the final limit, since geo-fencing drops rows after retrieval.
const CAP_MULTIPLIER: usize = 4;

const UNKNOWN_LOCATION: &str = "Unknown location";

/// USGS catalog client.
#[derive(Debug, Clone)]
pub struct UsgsClient {
    client: reqwest::Client,
    url: String,
    fence: GeoFence,
}

// ── Catalog response types ────────────────────────────────────────────

/// GeoJSON feature collection. Features stay untyped so one bad feature
/// cannot fail the batch.
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub id: String,
    pub properties: FeatureProperties,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default)]
    pub place: Option<String>,
    /// Event time in epoch milliseconds.
    #[serde(default)]
    pub time: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// `[lng, lat, depth]`; depth is occasionally null.
    #[serde(default)]
    pub coordinates: Vec<Option<f64>>,
}

/// Result of normalizing one catalog response.
#[derive(Debug, Default)]
pub struct Normalized {
    pub records: Vec<EarthquakeRecord>,
    /// Events dropped because the regional feed covers them.
    pub excluded_in_region: usize,
}

// ── Implementation ────────────────────────────────────────────────────

impl UsgsClient {
    pub fn new(sources: &SourcesConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(sources.user_agent.as_str())
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(sources.timeout_secs))
            .build()
            .map_err(|e| Error::Http(format!("failed to build USGS HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: sources.usgs_url.clone(),
            fence: KANDILLI_REGION,
        })
    }

    /// Query the catalog and return the raw feature list.
    pub async fn fetch_features(
        &self,
        start: DateTime<Utc>,
        min_magnitude: f64,
        provider_cap: usize,
    ) -> Result<Vec<Value>, Error> {
        let query = vec![
            ("format", "geojson".to_string()),
            ("starttime", start.format("%Y-%m-%dT%H:%M:%S").to_string()),
            ("minmagnitude", min_magnitude.to_string()),
            ("orderby", "time".to_string()),
            ("limit", provider_cap.to_string()),
        ];

        debug!(
            "Fetching USGS catalog: {} start={} minmag={} limit={}",
            self.url, query[1].1, query[2].1, provider_cap
        );

        let resp = self
            .client
            .get(&self.url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Usgs(format!("HTTP error: {e}")))?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Usgs(format!(
                "USGS returned {}: {}",
                status,
                body.chars().take(500).collect::<String>()
            )));
        }

        let payload: FeatureCollection = resp
            .json()
            .await
            .map_err(|e| Error::Usgs(format!("JSON parse error: {e}")))?;

        Ok(payload.features)
    }

    /// Fetch non-regional events inside the window at or above the floor.
    pub async fn get_earthquakes(
        &self,
        lookback_hours: u32,
        min_magnitude: f64,
        limit: usize,
    ) -> Result<Normalized, Error> {
        let now = Utc::now();
        let start = now - chrono::Duration::hours(i64::from(lookback_hours));
        let features = self
            .fetch_features(start, server_min_magnitude(min_magnitude), provider_cap(limit))
            .await?;

        Ok(normalize_features(
            features,
            now,
            lookback_hours,
            min_magnitude,
            &self.fence,
        ))
    }
}

impl EarthquakeSource for UsgsClient {
    fn source(&self) -> Source {
        Source::GlobalCatalog
    }

    async fn fetch(&self, lookback_hours: u32, min_magnitude: f64, limit: usize) -> SourceFetch {
        match self.get_earthquakes(lookback_hours, min_magnitude, limit).await {
            Ok(normalized) => {
                info!(
                    "USGS returned {} earthquakes ({} inside the Kandilli region excluded)",
                    normalized.records.len(),
                    normalized.excluded_in_region
                );
                SourceFetch::Fetched(normalized.records)
            }
            Err(e) => {
                warn!("USGS fetch failed: {}", e);
                SourceFetch::unavailable(e.to_string())
            }
        }
    }
}

/// Magnitude floor sent to the catalog.
pub fn server_min_magnitude(requested: f64) -> f64 {
    requested.max(PRACTICAL_MIN_MAGNITUDE)
}

/// Provider-side row cap for a given final limit.
pub fn provider_cap(limit: usize) -> usize {
    limit
        .saturating_mul(CAP_MULTIPLIER)
        .clamp(MIN_PROVIDER_CAP, MAX_PROVIDER_CAP)
}

/// Convert catalog features to records.
///
/// Features without a magnitude or time, outside the window, below the floor,
/// or inside `fence` are dropped; only the fence drops are counted.
pub fn normalize_features(
    features: Vec<Value>,
    now: DateTime<Utc>,
    lookback_hours: u32,
    min_magnitude: f64,
    fence: &GeoFence,
) -> Normalized {
    let cutoff = now - chrono::Duration::hours(i64::from(lookback_hours));
    let mut out = Normalized::default();

    for feature in features {
        let Ok(feature) = serde_json::from_value::<Feature>(feature) else {
            continue;
        };
        let Some(record) = to_record(feature) else {
            continue;
        };
        if record.occurred_at < cutoff || record.magnitude < min_magnitude {
            continue;
        }
        if fence.contains(record.coordinates.latitude, record.coordinates.longitude) {
            out.excluded_in_region += 1;
            continue;
        }
        out.records.push(record);
    }

    out
}

fn to_record(feature: Feature) -> Option<EarthquakeRecord> {
    let magnitude = feature.properties.mag?;
    let occurred_at = Utc.timestamp_millis_opt(feature.properties.time?).single()?;

    let coords = feature
        .geometry
        .map(|g| g.coordinates)
        .unwrap_or_default();
    let axis = |i: usize| coords.get(i).copied().flatten().unwrap_or(0.0);

    Some(EarthquakeRecord {
        id: feature.id,
        magnitude,
        location: feature
            .properties
            .place
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        occurred_at,
        coordinates: Coordinates::new(axis(1), axis(0)),
        depth_km: axis(2),
        source: Source::GlobalCatalog,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2026-10-18T08:00:00Z
    const BASE_MS: i64 = 1_792_310_400_000;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(BASE_MS + 3_600_000).unwrap()
    }

    fn sample_response() -> String {
        format!(
            r#"{{
                "type": "FeatureCollection",
                "metadata": {{"count": 5}},
                "features": [
                    {{
                        "id": "us7000abcd",
                        "properties": {{"mag": 5.4, "place": "120 km S of Tokyo, Japan", "time": {t0}}},
                        "geometry": {{"type": "Point", "coordinates": [139.7, 34.6, 35.0]}}
                    }},
                    {{
                        "id": "us7000turk",
                        "properties": {{"mag": 4.1, "place": "5 km E of Malatya, Turkey", "time": {t1}}},
                        "geometry": {{"type": "Point", "coordinates": [38.4, 38.3, 10.0]}}
                    }},
                    {{
                        "id": "nc7300nomag",
                        "properties": {{"mag": null, "place": "Somewhere", "time": {t1}}},
                        "geometry": {{"type": "Point", "coordinates": [-122.0, 37.0, 2.0]}}
                    }},
                    {{
                        "id": "ak0200nodepth",
                        "properties": {{"mag": 3.0, "place": "", "time": {t2}}},
                        "geometry": {{"type": "Point", "coordinates": [-150.0, 61.0, null]}}
                    }},
                    {{
                        "id": "us7000old",
                        "properties": {{"mag": 6.0, "place": "Chile", "time": {old}}},
                        "geometry": {{"type": "Point", "coordinates": [-70.0, -30.0, 20.0]}}
                    }}
                ]
            }}"#,
            t0 = BASE_MS,
            t1 = BASE_MS - 60_000,
            t2 = BASE_MS - 120_000,
            old = BASE_MS - 48 * 3_600_000,
        )
    }

    fn features() -> Vec<Value> {
        serde_json::from_str::<FeatureCollection>(&sample_response())
            .expect("response should deserialize")
            .features
    }

    #[test]
    fn test_geofence_exclusion_is_counted() {
        let out = normalize_features(features(), now(), 24, 2.5, &KANDILLI_REGION);

        let ids: Vec<&str> = out.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["us7000abcd", "ak0200nodepth"]);
        assert_eq!(out.excluded_in_region, 1);
    }

    #[test]
    fn test_record_fields() {
        let out = normalize_features(features(), now(), 24, 2.5, &KANDILLI_REGION);

        let tokyo = &out.records[0];
        assert_eq!(tokyo.location, "120 km S of Tokyo, Japan");
        assert!((tokyo.coordinates.latitude - 34.6).abs() < 1e-9);
        assert!((tokyo.coordinates.longitude - 139.7).abs() < 1e-9);
        assert!((tokyo.depth_km - 35.0).abs() < 1e-9);
        assert_eq!(tokyo.occurred_at.timestamp_millis(), BASE_MS);
        assert_eq!(tokyo.source, Source::GlobalCatalog);

        let alaska = &out.records[1];
        assert_eq!(alaska.location, "Unknown location");
        assert_eq!(alaska.depth_km, 0.0);
    }

    #[test]
    fn test_local_floor_applies() {
        let out = normalize_features(features(), now(), 24, 5.0, &KANDILLI_REGION);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].id, "us7000abcd");
        // The fenced event is below the floor, so it is not counted either.
        assert_eq!(out.excluded_in_region, 0);
    }

    #[test]
    fn test_server_side_parameters() {
        assert_eq!(server_min_magnitude(1.0), 2.5);
        assert_eq!(server_min_magnitude(4.5), 4.5);
        assert_eq!(provider_cap(1), 200);
        assert_eq!(provider_cap(100), 400);
        assert_eq!(provider_cap(2000), 8000);
        assert_eq!(provider_cap(usize::MAX), 20_000);
    }

    #[test]
    fn test_empty_collection() {
        let parsed: FeatureCollection =
            serde_json::from_str(r#"{"type": "FeatureCollection"}"#).expect("should deserialize");
        assert!(parsed.features.is_empty());
    }
}
