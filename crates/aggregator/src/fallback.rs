//! Sample data served when the aggregation pipeline itself breaks.

use chrono::{DateTime, Duration, Utc};
use common::{AggregateResult, Coordinates, EarthquakeRecord, Source};

/// Three fixed events with times relative to `now`.
pub fn sample_records(now: DateTime<Utc>) -> Vec<EarthquakeRecord> {
    vec![
        sample("sample1", 4.2, "Ankara, Türkiye", now - Duration::hours(1), (39.92, 32.85), 10.0),
        sample("sample2", 3.5, "İzmir, Türkiye", now - Duration::hours(2), (38.42, 27.14), 8.0),
        sample(
            "sample3",
            5.1,
            "Kahramanmaraş, Türkiye",
            now - Duration::hours(4),
            (37.58, 36.95),
            15.0,
        ),
    ]
}

/// Degraded result: the sample records with `success` cleared.
pub fn degraded_result(now: DateTime<Utc>) -> AggregateResult {
    AggregateResult::degraded(sample_records(now), now)
}

fn sample(
    id: &str,
    magnitude: f64,
    location: &str,
    occurred_at: DateTime<Utc>,
    (latitude, longitude): (f64, f64),
    depth_km: f64,
) -> EarthquakeRecord {
    EarthquakeRecord {
        id: id.to_string(),
        magnitude,
        location: location.to_string(),
        occurred_at,
        coordinates: Coordinates::new(latitude, longitude),
        depth_km,
        source: Source::Sample,
    }
}
