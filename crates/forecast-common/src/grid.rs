//! Gridded forecast snapshots for map rendering.

use serde::{Deserialize, Serialize};

use crate::parameter::ParameterCode;

/// A 2-D forecast field over a regular lat/lon grid at one forecast hour.
///
/// `data` is row-major: `data[i][j]` is the value at `lats[i]`, `lons[j]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub parameter: ParameterCode,
    pub forecast_hour: u32,
    pub data: Vec<Vec<f64>>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
}

impl GridSnapshot {
    /// Check that the data array matches the declared axes.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.lats.len()
            && self.data.iter().all(|row| row.len() == self.lons.len())
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.lats.len(), self.lons.len())
    }
}
