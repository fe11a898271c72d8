//! Derived thermodynamic parameters: wind chill, heat index, dew point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use forecast_common::{SeriesPoint, TimeSeries};

/// A derived value at one forecast time; `None` where the formula is
/// undefined for the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedPoint {
    pub time: DateTime<Utc>,
    pub value: Option<f64>,
}

/// Output of a derived-parameter calculation over aligned inputs.
pub type DerivedSeries = Vec<DerivedPoint>;

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Wind chill in Celsius from temperature (°C) and wind speed (km/h).
///
/// Defined only for T ≤ 10 °C and V ≥ 5 km/h; `None` outside that domain.
/// Formula: 13.12 + 0.6215·T − 11.37·V^0.16 + 0.3965·T·V^0.16
pub fn wind_chill(temperature: &TimeSeries, wind_speed: &TimeSeries) -> DerivedSeries {
    if temperature.is_empty() || wind_speed.is_empty() {
        warn!("Wind chill requires both temperature and wind speed series");
        return Vec::new();
    }

    temperature
        .align(wind_speed)
        .into_iter()
        .map(|(time, t, v)| {
            let value = if t <= 10.0 && v >= 5.0 {
                let v016 = v.powf(0.16);
                Some(round1(13.12 + 0.6215 * t - 11.37 * v016 + 0.3965 * t * v016))
            } else {
                None
            };
            DerivedPoint { time, value }
        })
        .collect()
}

/// Heat index in Celsius from temperature (°C) and relative humidity (%).
///
/// Defined only for T ≥ 27 °C; computed via the Rothfusz regression in
/// Fahrenheit and converted back.
pub fn heat_index(temperature: &TimeSeries, humidity: &TimeSeries) -> DerivedSeries {
    if temperature.is_empty() || humidity.is_empty() {
        warn!("Heat index requires both temperature and humidity series");
        return Vec::new();
    }

    temperature
        .align(humidity)
        .into_iter()
        .map(|(time, t, rh)| {
            let value = if t >= 27.0 {
                let tf = t * 9.0 / 5.0 + 32.0;
                let hi_f = -42.379 + 2.04901523 * tf + 10.14333127 * rh
                    - 0.22475541 * tf * rh
                    - 0.00683783 * tf * tf
                    - 0.05481717 * rh * rh
                    + 0.00122874 * tf * tf * rh
                    + 0.00085282 * tf * rh * rh
                    - 0.00000199 * tf * tf * rh * rh;
                Some(round1((hi_f - 32.0) * 5.0 / 9.0))
            } else {
                None
            };
            DerivedPoint { time, value }
        })
        .collect()
}

/// Dew point in Celsius from temperature (°C) and relative humidity (%)
/// via the Magnus approximation. Total over physical inputs (RH > 0).
pub fn dew_point(temperature: &TimeSeries, humidity: &TimeSeries) -> TimeSeries {
    if temperature.is_empty() || humidity.is_empty() {
        warn!("Dew point requires both temperature and humidity series");
        return TimeSeries::default();
    }

    temperature
        .align(humidity)
        .into_iter()
        .filter_map(|(time, t, rh)| {
            if rh <= 0.0 {
                return None;
            }
            let gamma = (rh / 100.0).ln() + (17.62 * t) / (243.12 + t);
            let td = 243.12 * gamma / (17.62 - gamma);
            Some(SeriesPoint::new(time, round1(td)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn series(values: &[f64]) -> TimeSeries {
        values
            .iter()
            .enumerate()
            .map(|(h, v)| {
                SeriesPoint::new(
                    Utc.with_ymd_and_hms(2024, 1, 10, h as u32, 0, 0).unwrap(),
                    *v,
                )
            })
            .collect()
    }

    #[test]
    fn test_wind_chill_above_threshold_undefined() {
        // 15°C is above the 10°C domain bound regardless of wind.
        let out = wind_chill(&series(&[15.0]), &series(&[40.0]));
        assert_eq!(out[0].value, None);
    }

    #[test]
    fn test_wind_chill_calm_wind_undefined() {
        let out = wind_chill(&series(&[0.0]), &series(&[3.0]));
        assert_eq!(out[0].value, None);
    }

    #[test]
    fn test_wind_chill_formula_value() {
        // 0°C at 20 km/h sits in the -5 to -6 band.
        let out = wind_chill(&series(&[0.0]), &series(&[20.0]));
        let wc = out[0].value.unwrap();
        assert!(wc < -5.0 && wc > -6.0, "wind chill {} out of range", wc);
    }

    #[test]
    fn test_wind_chill_missing_input() {
        let out = wind_chill(&series(&[0.0]), &TimeSeries::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_heat_index_domain() {
        let cool = heat_index(&series(&[20.0]), &series(&[80.0]));
        assert_eq!(cool[0].value, None);

        let hot = heat_index(&series(&[32.0]), &series(&[70.0]));
        let hi = hot[0].value.unwrap();
        // 32°C at 70% RH feels considerably hotter than the air temperature.
        assert!(hi > 32.0, "heat index {} should exceed temperature", hi);
    }

    #[test]
    fn test_dew_point_saturated_air() {
        // At 100% RH the dew point equals the temperature.
        let out = dew_point(&series(&[20.0]), &series(&[100.0]));
        assert!((out.points()[0].value - 20.0).abs() < 0.1);
    }

    #[test]
    fn test_dew_point_dry_air_below_temperature() {
        let out = dew_point(&series(&[30.0]), &series(&[30.0]));
        assert!(out.points()[0].value < 30.0);
    }
}
