//! Forecast parameter codes and units.
//!
//! Parameter codes follow the GDPS naming convention used by the model-grid
//! provider (e.g. "TMP_TGL_2" for 2m temperature). Every series flowing
//! through the pipeline is tagged with one of these codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Weather parameter identifiers used across providers and storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterCode {
    /// Temperature at 2m above ground
    #[serde(rename = "TMP_TGL_2")]
    Temperature2m,
    /// Total precipitation at surface
    #[serde(rename = "APCP_SFC")]
    Precipitation,
    /// Wind speed at 10m above ground
    #[serde(rename = "WIND_TGL_10")]
    WindSpeed10m,
    /// Wind direction at 10m above ground
    #[serde(rename = "WDIR_TGL_10")]
    WindDirection10m,
    /// Wind gust at 10m above ground
    #[serde(rename = "GUST_TGL_10")]
    WindGust10m,
    /// Relative humidity at 2m above ground
    #[serde(rename = "RH_TGL_2")]
    RelativeHumidity2m,
    /// Dew point at 2m above ground
    #[serde(rename = "DPT_TGL_2")]
    DewPoint2m,
    /// Mean sea level pressure
    #[serde(rename = "PRMSL_MSL")]
    PressureMsl,
    /// Surface-based convective available potential energy
    #[serde(rename = "CAPE_SFC")]
    CapeSurface,
    /// Surface-based convective inhibition
    #[serde(rename = "CIN_SFC")]
    CinSurface,
    /// Total cloud cover
    #[serde(rename = "TCDC_SFC")]
    CloudCover,
}

impl ParameterCode {
    /// All known parameter codes.
    pub fn all() -> &'static [ParameterCode] {
        use ParameterCode::*;
        &[
            Temperature2m,
            Precipitation,
            WindSpeed10m,
            WindDirection10m,
            WindGust10m,
            RelativeHumidity2m,
            DewPoint2m,
            PressureMsl,
            CapeSurface,
            CinSurface,
            CloudCover,
        ]
    }

    /// Wire/storage code string.
    pub fn code(&self) -> &'static str {
        match self {
            ParameterCode::Temperature2m => "TMP_TGL_2",
            ParameterCode::Precipitation => "APCP_SFC",
            ParameterCode::WindSpeed10m => "WIND_TGL_10",
            ParameterCode::WindDirection10m => "WDIR_TGL_10",
            ParameterCode::WindGust10m => "GUST_TGL_10",
            ParameterCode::RelativeHumidity2m => "RH_TGL_2",
            ParameterCode::DewPoint2m => "DPT_TGL_2",
            ParameterCode::PressureMsl => "PRMSL_MSL",
            ParameterCode::CapeSurface => "CAPE_SFC",
            ParameterCode::CinSurface => "CIN_SFC",
            ParameterCode::CloudCover => "TCDC_SFC",
        }
    }

    /// Human-readable description for display.
    pub fn description(&self) -> &'static str {
        match self {
            ParameterCode::Temperature2m => "Temperature at 2m",
            ParameterCode::Precipitation => "Precipitation",
            ParameterCode::WindSpeed10m => "Wind Speed at 10m",
            ParameterCode::WindDirection10m => "Wind Direction at 10m",
            ParameterCode::WindGust10m => "Wind Gust at 10m",
            ParameterCode::RelativeHumidity2m => "Relative Humidity at 2m",
            ParameterCode::DewPoint2m => "Dew Point at 2m",
            ParameterCode::PressureMsl => "Mean Sea Level Pressure",
            ParameterCode::CapeSurface => "Surface CAPE",
            ParameterCode::CinSurface => "Surface CIN",
            ParameterCode::CloudCover => "Total Cloud Cover",
        }
    }

    /// Unit the pipeline stores and displays this parameter in.
    pub fn display_unit(&self) -> ValueUnit {
        match self {
            ParameterCode::Temperature2m | ParameterCode::DewPoint2m => ValueUnit::Celsius,
            ParameterCode::Precipitation => ValueUnit::Millimetres,
            ParameterCode::WindSpeed10m | ParameterCode::WindGust10m => ValueUnit::KmPerHour,
            ParameterCode::WindDirection10m => ValueUnit::Degrees,
            ParameterCode::RelativeHumidity2m | ParameterCode::CloudCover => ValueUnit::Percent,
            ParameterCode::PressureMsl => ValueUnit::HectoPascals,
            ParameterCode::CapeSurface | ParameterCode::CinSurface => ValueUnit::JoulesPerKg,
        }
    }
}

impl fmt::Display for ParameterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown parameter code: {0}")]
pub struct ParameterParseError(String);

impl FromStr for ParameterCode {
    type Err = ParameterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParameterCode::all()
            .iter()
            .find(|p| p.code().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ParameterParseError(s.to_string()))
    }
}

/// Physical units carried alongside raw provider values.
///
/// Adapters tag each fetched series with the provider's native unit so the
/// normalizer can convert without guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueUnit {
    Celsius,
    Kelvin,
    Millimetres,
    /// kg/m^2 of water equivalent, numerically identical to mm
    KgPerSquareMetre,
    KmPerHour,
    MetresPerSecond,
    Knots,
    HectoPascals,
    Pascals,
    Percent,
    JoulesPerKg,
    Degrees,
}
