//! Raw unit conversions applied at the adapter/normalizer boundary.

use forecast_common::{TimeSeries, ValueUnit};
use tracing::warn;

const KELVIN_OFFSET: f64 = 273.15;

/// Threshold for the Kelvin magnitude heuristic used on untagged series.
const KELVIN_HEURISTIC_MEAN: f64 = 100.0;

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Normalize a temperature series to Celsius.
///
/// An explicit unit hint from the adapter always wins. Without a hint the
/// original magnitude heuristic is preserved: a mean above 100 is assumed to
/// be Kelvin. Known limitation: an untagged, very hot Celsius series or a
/// sparse sub-100K slice of a Kelvin series would misclassify; the built-in
/// adapters always tag, so the heuristic only guards foreign data.
pub fn normalize_temperature(series: &TimeSeries, unit_hint: Option<ValueUnit>) -> TimeSeries {
    if series.is_empty() {
        return series.clone();
    }

    let is_kelvin = match unit_hint {
        Some(ValueUnit::Kelvin) => true,
        Some(ValueUnit::Celsius) => false,
        Some(other) => {
            warn!(unit = ?other, "Unexpected temperature unit hint, leaving series unchanged");
            return series.clone();
        }
        None => series.mean().is_some_and(|m| m > KELVIN_HEURISTIC_MEAN),
    };

    if is_kelvin {
        series.map_values(|v| round1(v - KELVIN_OFFSET))
    } else {
        series.map_values(round1)
    }
}

/// Normalize a wind speed series to km/h.
pub fn normalize_wind_speed(series: &TimeSeries, unit: ValueUnit) -> TimeSeries {
    match unit {
        ValueUnit::MetresPerSecond => series.map_values(|v| round1(v * 3.6)),
        ValueUnit::Knots => series.map_values(|v| round1(v * 1.852)),
        ValueUnit::KmPerHour => series.map_values(round1),
        other => {
            warn!(unit = ?other, "Unexpected wind speed unit, leaving series unchanged");
            series.clone()
        }
    }
}

/// Normalize a pressure series to hPa.
pub fn normalize_pressure(series: &TimeSeries, unit: ValueUnit) -> TimeSeries {
    match unit {
        ValueUnit::Pascals => series.map_values(|v| round1(v / 100.0)),
        ValueUnit::HectoPascals => series.map_values(round1),
        other => {
            warn!(unit = ?other, "Unexpected pressure unit, leaving series unchanged");
            series.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use forecast_common::SeriesPoint;

    fn series(values: &[f64]) -> TimeSeries {
        values
            .iter()
            .enumerate()
            .map(|(h, v)| {
                SeriesPoint::new(
                    Utc.with_ymd_and_hms(2024, 6, 1, h as u32, 0, 0).unwrap(),
                    *v,
                )
            })
            .collect()
    }

    #[test]
    fn test_kelvin_hint_converts() {
        let out = normalize_temperature(&series(&[288.15, 290.15]), Some(ValueUnit::Kelvin));
        assert_eq!(out.points()[0].value, 15.0);
        assert_eq!(out.points()[1].value, 17.0);
    }

    #[test]
    fn test_celsius_hint_bypasses_heuristic() {
        // Values above 100 stay put when the adapter says Celsius.
        let out = normalize_temperature(&series(&[120.0]), Some(ValueUnit::Celsius));
        assert_eq!(out.points()[0].value, 120.0);
    }

    #[test]
    fn test_untagged_uses_magnitude_heuristic() {
        let kelvin = normalize_temperature(&series(&[288.15, 290.15]), None);
        assert_eq!(kelvin.points()[0].value, 15.0);

        let celsius = normalize_temperature(&series(&[15.0, 17.0]), None);
        assert_eq!(celsius.points()[0].value, 15.0);
    }

    #[test]
    fn test_wind_speed_conversions() {
        let ms = normalize_wind_speed(&series(&[10.0]), ValueUnit::MetresPerSecond);
        assert_eq!(ms.points()[0].value, 36.0);

        let kt = normalize_wind_speed(&series(&[10.0]), ValueUnit::Knots);
        assert_eq!(kt.points()[0].value, 18.5);

        let kmh = normalize_wind_speed(&series(&[10.0]), ValueUnit::KmPerHour);
        assert_eq!(kmh.points()[0].value, 10.0);
    }

    #[test]
    fn test_pressure_conversion() {
        let pa = normalize_pressure(&series(&[101_325.0]), ValueUnit::Pascals);
        assert_eq!(pa.points()[0].value, 1013.3);
    }

    #[test]
    fn test_empty_series_unchanged() {
        let empty = TimeSeries::default();
        assert!(normalize_temperature(&empty, None).is_empty());
    }
}
