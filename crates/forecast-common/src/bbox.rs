//! Geographic bounding box.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees (EPSG:4326).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    pub fn is_valid(&self) -> bool {
        self.min_lon < self.max_lon
            && self.min_lat < self.max_lat
            && self.min_lat >= -90.0
            && self.max_lat <= 90.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        // North America per the dashboard's region table
        let na = BoundingBox::new(-130.0, 25.0, -60.0, 60.0);
        assert!(na.contains(40.7128, -74.0060));
        assert!(!na.contains(51.5, -0.12));
    }

    #[test]
    fn test_validity() {
        assert!(BoundingBox::new(-10.0, 35.0, 30.0, 65.0).is_valid());
        assert!(!BoundingBox::new(30.0, 35.0, -10.0, 65.0).is_valid());
    }
}
