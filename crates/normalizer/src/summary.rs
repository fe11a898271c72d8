//! Aggregations over normalized series: wind vectors, accumulations, and
//! per-day forecast summaries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use forecast_common::{ParameterCode, SeriesBundle, SeriesPoint, TimeSeries};

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// U/V wind vector components from speed and meteorological direction.
///
/// Direction is "from" in degrees; components point "toward", hence the
/// negation. Returns (time, u, v) triples over the aligned timestamps.
pub fn wind_components(
    speed: &TimeSeries,
    direction: &TimeSeries,
) -> Vec<(chrono::DateTime<chrono::Utc>, f64, f64)> {
    if speed.is_empty() || direction.is_empty() {
        warn!("Wind components require both speed and direction series");
        return Vec::new();
    }

    speed
        .align(direction)
        .into_iter()
        .map(|(time, s, d)| {
            let rad = d.to_radians();
            (time, -s * rad.sin(), -s * rad.cos())
        })
        .collect()
}

/// Running precipitation accumulation over a series of interval totals.
pub fn cumulative_precipitation(precipitation: &TimeSeries) -> TimeSeries {
    let mut total = 0.0;
    precipitation
        .iter()
        .map(|p| {
            total += p.value;
            SeriesPoint::new(p.time, round1(total))
        })
        .collect()
}

/// One day of aggregated forecast conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub min_temp: f64,
    pub max_temp: f64,
    pub avg_temp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wind: Option<f64>,
}

/// Build per-day summaries from a bundle of normalized series.
///
/// Temperature is required; precipitation totals and peak wind are attached
/// for days where those series have data. A bundle without temperature
/// returns an empty list with a warning.
pub fn daily_summary(bundle: &SeriesBundle) -> Vec<DailySummary> {
    let Some(temperature) = bundle
        .get(&ParameterCode::Temperature2m)
        .filter(|s| !s.is_empty())
    else {
        warn!("Daily summary requires a temperature series");
        return Vec::new();
    };

    let mut days: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for point in temperature.iter() {
        days.entry(point.time.date_naive())
            .or_default()
            .push(point.value);
    }

    let precip_by_day = bundle.get(&ParameterCode::Precipitation).map(|series| {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for point in series.iter() {
            *totals.entry(point.time.date_naive()).or_default() += point.value;
        }
        totals
    });

    let wind_by_day = bundle.get(&ParameterCode::WindSpeed10m).map(|series| {
        let mut peaks: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for point in series.iter() {
            let peak = peaks.entry(point.time.date_naive()).or_insert(f64::MIN);
            *peak = peak.max(point.value);
        }
        peaks
    });

    days.into_iter()
        .map(|(date, temps)| {
            let min = temps.iter().copied().fold(f64::MAX, f64::min);
            let max = temps.iter().copied().fold(f64::MIN, f64::max);
            let avg = temps.iter().sum::<f64>() / temps.len() as f64;
            DailySummary {
                date,
                min_temp: round1(min),
                max_temp: round1(max),
                avg_temp: round1(avg),
                precipitation: precip_by_day
                    .as_ref()
                    .and_then(|m| m.get(&date))
                    .map(|v| round1(*v)),
                max_wind: wind_by_day
                    .as_ref()
                    .and_then(|m| m.get(&date))
                    .map(|v| round1(*v)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn series_at(day: u32, values: &[(u32, f64)]) -> TimeSeries {
        values
            .iter()
            .map(|(h, v)| {
                SeriesPoint::new(Utc.with_ymd_and_hms(2024, 6, day, *h, 0, 0).unwrap(), *v)
            })
            .collect()
    }

    #[test]
    fn test_wind_components_north_wind() {
        // A wind from due north blows toward the south: v negative, u ~0.
        let speed = series_at(1, &[(0, 10.0)]);
        let dir = series_at(1, &[(0, 0.0)]);
        let comps = wind_components(&speed, &dir);
        assert!(comps[0].1.abs() < 1e-9);
        assert!((comps[0].2 + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_cumulative_precipitation() {
        let precip = series_at(1, &[(0, 1.0), (1, 2.5), (2, 0.0)]);
        let cum = cumulative_precipitation(&precip);
        let values: Vec<_> = cum.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 3.5, 3.5]);
    }

    #[test]
    fn test_daily_summary_aggregates() {
        let mut bundle: SeriesBundle = HashMap::new();
        bundle.insert(
            ParameterCode::Temperature2m,
            series_at(1, &[(0, 10.0), (12, 20.0), (23, 12.0)]),
        );
        bundle.insert(
            ParameterCode::Precipitation,
            series_at(1, &[(0, 1.0), (12, 4.0)]),
        );
        bundle.insert(
            ParameterCode::WindSpeed10m,
            series_at(1, &[(0, 12.0), (12, 33.0)]),
        );

        let days = daily_summary(&bundle);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].min_temp, 10.0);
        assert_eq!(days[0].max_temp, 20.0);
        assert_eq!(days[0].avg_temp, 14.0);
        assert_eq!(days[0].precipitation, Some(5.0));
        assert_eq!(days[0].max_wind, Some(33.0));
    }

    #[test]
    fn test_daily_summary_without_temperature() {
        let mut bundle: SeriesBundle = HashMap::new();
        bundle.insert(ParameterCode::Precipitation, series_at(1, &[(0, 1.0)]));
        assert!(daily_summary(&bundle).is_empty());
    }
}
