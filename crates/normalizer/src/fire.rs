//! Simplified fire-weather index, a reduced form of the Canadian FWI system.

use serde::{Deserialize, Serialize};

/// Fire danger bands, each with a fixed display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireCategory {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl FireCategory {
    fn from_value(value: f64) -> Self {
        if value < 20.0 {
            FireCategory::Low
        } else if value < 40.0 {
            FireCategory::Moderate
        } else if value < 60.0 {
            FireCategory::High
        } else if value < 80.0 {
            FireCategory::VeryHigh
        } else {
            FireCategory::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FireCategory::Low => "Low",
            FireCategory::Moderate => "Moderate",
            FireCategory::High => "High",
            FireCategory::VeryHigh => "Very High",
            FireCategory::Extreme => "Extreme",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            FireCategory::Low => "green",
            FireCategory::Moderate => "blue",
            FireCategory::High => "yellow",
            FireCategory::VeryHigh => "orange",
            FireCategory::Extreme => "red",
        }
    }
}

/// Computed fire-weather index with its display band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireWeatherIndex {
    pub value: f64,
    pub category: FireCategory,
    pub color: &'static str,
}

/// Compute the fire-weather index from current conditions.
///
/// Weighted composite: 0.3 temperature, 0.3 humidity, 0.2 wind, 0.2 rainfall
/// decay. Rain in the last 24h suppresses the index, from a multiplier of 1.0
/// with no rain down to 0.2 at 10 mm and above. Result clamped to [0, 100].
pub fn fire_weather_index(
    temperature_c: f64,
    humidity_pct: f64,
    wind_kmh: f64,
    rain_24h_mm: f64,
) -> FireWeatherIndex {
    let temp_factor = ((temperature_c - 10.0) / 30.0).max(0.0);
    let humidity_factor = ((100.0 - humidity_pct) / 100.0).max(0.0);
    let wind_factor = (wind_kmh / 40.0).min(1.0);
    let rain_factor = (1.0 - 0.8 * (rain_24h_mm / 10.0)).clamp(0.2, 1.0);

    let value = (100.0
        * (0.3 * temp_factor + 0.3 * humidity_factor + 0.2 * wind_factor + 0.2 * rain_factor))
        .clamp(0.0, 100.0);
    let value = (value * 10.0).round() / 10.0;

    let category = FireCategory::from_value(value);
    FireWeatherIndex {
        value,
        category,
        color: category.color(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hot_dry_windy_is_extreme() {
        let fwi = fire_weather_index(35.0, 10.0, 30.0, 0.0);
        assert_eq!(fwi.category, FireCategory::Extreme);
        assert!(fwi.value <= 100.0);
        assert_eq!(fwi.color, "red");
    }

    #[test]
    fn test_cool_humid_rained_is_low() {
        let fwi = fire_weather_index(15.0, 80.0, 5.0, 20.0);
        assert_eq!(fwi.category, FireCategory::Low);
    }

    #[test]
    fn test_rain_factor_floor() {
        // Heavy rain floors the decay factor at 0.2 rather than zeroing the
        // whole index.
        let soaked = fire_weather_index(35.0, 10.0, 30.0, 50.0);
        let dry = fire_weather_index(35.0, 10.0, 30.0, 0.0);
        assert!(soaked.value < dry.value);
        assert!(soaked.value > 0.0);
    }

    #[test]
    fn test_value_clamped() {
        let fwi = fire_weather_index(100.0, 0.0, 200.0, 0.0);
        assert!(fwi.value <= 100.0);
        let cold = fire_weather_index(-30.0, 100.0, 0.0, 50.0);
        assert!(cold.value >= 0.0);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(FireCategory::from_value(19.9), FireCategory::Low);
        assert_eq!(FireCategory::from_value(20.0), FireCategory::Moderate);
        assert_eq!(FireCategory::from_value(59.9), FireCategory::High);
        assert_eq!(FireCategory::from_value(80.0), FireCategory::Extreme);
    }
}
