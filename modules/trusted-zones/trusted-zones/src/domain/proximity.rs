//! Geo proximity matching.
//!
//! Two points are the same location when they differ by less than
//! [`PROXIMITY_EPSILON_DEG`] on both axes. This is a per-axis comparison in
//! raw degrees, not a great-circle distance: about 11 m at the equator and
//! narrower in longitude towards the poles. Stored zones were matched this way
//! from the start, so the metric must not change.

/// Degree distance below which two coordinates are considered equal.
pub const PROXIMITY_EPSILON_DEG: f64 = 0.0001;

pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Whether `a` and `b` denote the same location.
///
/// Commutative, and true for a point compared with itself. Callers that edit
/// a zone in place must skip the zone's own entry.
#[must_use]
pub fn same_location(a: Coordinates, b: Coordinates) -> bool {
    (a.latitude - b.latitude).abs() < PROXIMITY_EPSILON_DEG
        && (a.longitude - b.longitude).abs() < PROXIMITY_EPSILON_DEG
}
