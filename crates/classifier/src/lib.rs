//! Severe-weather classification.
//!
//! A stateless pass over a bundle of normalized series for one location,
//! applying fixed danger thresholds and emitting transient events. Sounding
//! threat assessment lives in [`threat`].

pub mod threat;

use tracing::debug;

use forecast_common::{EventKind, ParameterCode, SeriesBundle, SevereWeatherEvent, TimeSeries};

/// Temperature above which heat stress is flagged, °C (strict).
pub const EXTREME_HEAT_C: f64 = 30.0;
/// Temperature below which cold stress is flagged, °C (strict).
pub const EXTREME_COLD_C: f64 = -20.0;
/// Per-interval precipitation above which flooding is flagged, mm (strict).
pub const HEAVY_PRECIP_MM: f64 = 10.0;
/// Wind speed above which damage is flagged, km/h (strict).
pub const STRONG_WIND_KMH: f64 = 50.0;

/// Scan a series bundle and emit one event per crossed rule.
///
/// Thresholds are strict inequalities: a value exactly at the threshold does
/// not trigger. Multiple crossings of one rule yield a single event carrying
/// every crossing timestamp. Parameters absent from the bundle simply skip
/// their rules.
pub fn identify_severe_weather(bundle: &SeriesBundle) -> Vec<SevereWeatherEvent> {
    let mut events = Vec::new();

    if let Some(temperature) = bundle.get(&ParameterCode::Temperature2m) {
        push_event(
            &mut events,
            temperature,
            |v| v > EXTREME_HEAT_C,
            EventKind::ExtremeHeat,
            "30°C",
            "Temperature exceeding 30°C may cause heat stress.",
        );
        push_event(
            &mut events,
            temperature,
            |v| v < EXTREME_COLD_C,
            EventKind::ExtremeCold,
            "-20°C",
            "Temperature below -20°C may cause frostbite and hypothermia.",
        );
    }

    if let Some(precipitation) = bundle.get(&ParameterCode::Precipitation) {
        push_event(
            &mut events,
            precipitation,
            |v| v > HEAVY_PRECIP_MM,
            EventKind::HeavyPrecipitation,
            "10mm/hr",
            "Heavy rainfall may cause localized flooding.",
        );
    }

    if let Some(wind) = bundle.get(&ParameterCode::WindSpeed10m) {
        push_event(
            &mut events,
            wind,
            |v| v > STRONG_WIND_KMH,
            EventKind::StrongWinds,
            "50 km/h",
            "Strong winds may cause power outages and property damage.",
        );
    }

    debug!(events = events.len(), "Severe weather classification complete");
    events
}

fn push_event(
    events: &mut Vec<SevereWeatherEvent>,
    series: &TimeSeries,
    rule: impl Fn(f64) -> bool,
    kind: EventKind,
    threshold: &str,
    description: &str,
) {
    let times = series.times_where(rule);
    if !times.is_empty() {
        events.push(SevereWeatherEvent {
            kind,
            threshold: threshold.to_string(),
            times,
            description: description.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use forecast_common::SeriesPoint;
    use std::collections::HashMap;

    fn series(values: &[f64]) -> TimeSeries {
        values
            .iter()
            .enumerate()
            .map(|(h, v)| {
                SeriesPoint::new(
                    Utc.with_ymd_and_hms(2024, 7, 1, h as u32, 0, 0).unwrap(),
                    *v,
                )
            })
            .collect()
    }

    fn bundle_of(param: ParameterCode, values: &[f64]) -> SeriesBundle {
        let mut b = HashMap::new();
        b.insert(param, series(values));
        b
    }

    #[test]
    fn test_threshold_is_strict() {
        // Exactly 30.0 does not trigger; 30.1 does.
        let at = identify_severe_weather(&bundle_of(ParameterCode::Temperature2m, &[30.0]));
        assert!(at.is_empty());

        let over = identify_severe_weather(&bundle_of(ParameterCode::Temperature2m, &[30.1]));
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].kind, EventKind::ExtremeHeat);
    }

    #[test]
    fn test_multiple_crossings_single_event() {
        let events =
            identify_severe_weather(&bundle_of(ParameterCode::Temperature2m, &[31.0, 25.0, 33.0]));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].times.len(), 2);
    }

    #[test]
    fn test_heat_and_cold_in_one_series() {
        let events =
            identify_severe_weather(&bundle_of(ParameterCode::Temperature2m, &[35.0, -25.0]));
        assert_eq!(events.len(), 2);
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&EventKind::ExtremeHeat));
        assert!(kinds.contains(&EventKind::ExtremeCold));
    }

    #[test]
    fn test_precipitation_and_wind_rules() {
        let mut bundle = bundle_of(ParameterCode::Precipitation, &[12.0, 2.0]);
        bundle.insert(ParameterCode::WindSpeed10m, series(&[60.0, 40.0]));
        let events = identify_severe_weather(&bundle);
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .any(|e| e.kind == EventKind::HeavyPrecipitation && e.threshold == "10mm/hr"));
        assert!(events
            .iter()
            .any(|e| e.kind == EventKind::StrongWinds && e.times.len() == 1));
    }

    #[test]
    fn test_missing_parameters_skip_rules() {
        let bundle: SeriesBundle = HashMap::new();
        assert!(identify_severe_weather(&bundle).is_empty());

        // Wind-only bundle skips the temperature and precipitation rules.
        let events = identify_severe_weather(&bundle_of(ParameterCode::WindSpeed10m, &[20.0]));
        assert!(events.is_empty());
    }
}
