//! Rectangular geo-fence used to keep the two sources from reporting the
//! same physical event twice.
//!
//! The box is a rough outline of the area the Kandilli network covers. It is
//! not a territorial polygon, so events just across a border may be treated
//! as regional and events in the box corners as covered.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFence {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Area served by the regional observatory feed.
pub const KANDILLI_REGION: GeoFence = GeoFence {
    north: 42.0,
    south: 35.8,
    east: 45.0,
    west: 25.7,
};

impl GeoFence {
    /// Inclusive on every edge. NaN coordinates are never inside.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south && lat <= self.north && lng >= self.west && lng <= self.east
    }
}

/// True when the coordinate lies inside the regional observatory's area.
pub fn in_region(lat: f64, lng: f64) -> bool {
    KANDILLI_REGION.contains(lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inside_and_outside() {
        assert!(in_region(39.0, 35.0));
        assert!(!in_region(0.0, 0.0));
        // Athens sits west of the box.
        assert!(!in_region(37.98, 23.72));
        // Tehran sits east of the box.
        assert!(!in_region(35.69, 51.39));
    }

    #[test]
    fn test_edges_are_inclusive() {
        assert!(in_region(42.0, 45.0));
        assert!(in_region(35.8, 25.7));
        assert!(!in_region(42.0001, 30.0));
        assert!(!in_region(38.0, 25.6999));
    }

    #[test]
    fn test_nan_is_outside() {
        assert!(!in_region(f64::NAN, 35.0));
        assert!(!in_region(39.0, f64::NAN));
    }
}
