//! Vertical sounding profiles and analysis summaries.
//!
//! The analysis itself is performed by an external package treated as a black
//! box; these types define the contract at that boundary.

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};

/// A vertical atmospheric profile, surface upward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundingProfile {
    /// Pressure levels in hPa, strictly decreasing with height
    pub pressure_hpa: Vec<f64>,
    /// Temperature in °C at each level
    pub temperature_c: Vec<f64>,
    /// Dew point in °C at each level
    pub dewpoint_c: Vec<f64>,
    /// Wind speed in knots at each level
    pub wind_speed_kt: Vec<f64>,
    /// Wind direction in degrees at each level
    pub wind_dir_deg: Vec<f64>,
}

impl SoundingProfile {
    /// Validate array shapes and the pressure ordering invariant.
    ///
    /// Schema mismatches fail fast here rather than propagating partial
    /// profiles into the analysis package.
    pub fn validate(&self) -> ForecastResult<()> {
        let n = self.pressure_hpa.len();
        if n < 2 {
            return Err(ForecastError::InvalidProfile(format!(
                "Profile needs at least 2 levels, got {}",
                n
            )));
        }
        for (name, len) in [
            ("temperature_c", self.temperature_c.len()),
            ("dewpoint_c", self.dewpoint_c.len()),
            ("wind_speed_kt", self.wind_speed_kt.len()),
            ("wind_dir_deg", self.wind_dir_deg.len()),
        ] {
            if len != n {
                return Err(ForecastError::InvalidProfile(format!(
                    "{} has {} levels, expected {}",
                    name, len, n
                )));
            }
        }
        if !self.pressure_hpa.windows(2).all(|w| w[0] > w[1]) {
            return Err(ForecastError::InvalidProfile(
                "Pressure levels must be strictly decreasing".to_string(),
            ));
        }
        Ok(())
    }

    pub fn levels(&self) -> usize {
        self.pressure_hpa.len()
    }
}

/// CAPE/CIN/LCL for the three standard lifted parcels, in J/kg and metres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParcelSet {
    pub surface: f64,
    pub mixed_layer: f64,
    pub most_unstable: f64,
}

/// Bulk wind shear magnitudes in knots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShearSet {
    #[serde(rename = "0_1km")]
    pub sfc_1km: f64,
    #[serde(rename = "0_3km")]
    pub sfc_3km: f64,
    #[serde(rename = "0_6km")]
    pub sfc_6km: f64,
}

/// Storm-relative helicity in m²/s².
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HelicitySet {
    #[serde(rename = "0_1km")]
    pub sfc_1km: f64,
    #[serde(rename = "0_3km")]
    pub sfc_3km: f64,
}

/// Composite severe-weather indices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndexSet {
    /// Significant Tornado Parameter
    pub stp: f64,
    /// Supercell Composite Parameter
    pub scp: f64,
    /// Lifted Index
    pub lifted_index: f64,
    pub k_index: f64,
    pub total_totals: f64,
}

/// Full analysis summary returned by the sounding package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundingSummary {
    pub cape: ParcelSet,
    pub cin: ParcelSet,
    pub lcl_height_m: ParcelSet,
    pub shear_kt: ShearSet,
    pub helicity: HelicitySet,
    pub indices: IndexSet,
    /// Precipitable water in mm
    pub pwat_mm: f64,
}
