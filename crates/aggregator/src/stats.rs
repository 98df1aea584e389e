//! Summary statistics over a record set.

use common::{EarthquakeRecord, QuakeStats};

/// Count, magnitude range and mean, and threshold counts.
///
/// An empty set yields all zeros.
pub fn summarize(records: &[EarthquakeRecord]) -> QuakeStats {
    if records.is_empty() {
        return QuakeStats::default();
    }

    let magnitudes = records.iter().map(|r| r.magnitude);
    let max = magnitudes.clone().fold(f64::NEG_INFINITY, f64::max);
    let min = magnitudes.clone().fold(f64::INFINITY, f64::min);
    let avg = magnitudes.clone().sum::<f64>() / records.len() as f64;
    let at_least = |threshold: f64| magnitudes.clone().filter(|m| *m >= threshold).count();

    QuakeStats {
        total: records.len(),
        max_magnitude: max,
        min_magnitude: min,
        avg_magnitude: avg,
        magnitude_3_plus: at_least(3.0),
        magnitude_4_plus: at_least(4.0),
        magnitude_5_plus: at_least(5.0),
    }
}
