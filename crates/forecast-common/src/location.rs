//! Geographic location types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Round a coordinate to 4 decimal places (~11m) so repeated lookups of the
/// same place collapse to one canonical value.
pub fn canonical_coordinate(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// A canonicalized geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Create coordinates, canonicalizing to fixed precision.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: canonical_coordinate(lat),
            lon: canonical_coordinate(lon),
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    /// True when both points fall within the storage matching tolerance.
    pub fn within_tolerance(&self, other: &Coordinates, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lon - other.lon).abs() <= tolerance
    }
}

/// Result of a geocoding lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodedPlace {
    pub name: String,
    pub coords: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// A persisted location row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub coords: Coordinates,
    pub last_accessed: DateTime<Utc>,
}
