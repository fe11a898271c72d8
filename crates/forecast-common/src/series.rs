//! Time series types for point forecasts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parameter::ParameterCode;

/// A group of series for one location, keyed by parameter.
pub type SeriesBundle = HashMap<ParameterCode, TimeSeries>;

/// A single (forecast time, value) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self { time, value }
    }
}

/// An ordered forecast series for one parameter at one location.
///
/// Points are kept sorted by ascending forecast time; construction and
/// insertion maintain the invariant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries(Vec<SeriesPoint>);

impl TimeSeries {
    pub fn new(mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by_key(|p| p.time);
        Self(points)
    }

    pub fn push(&mut self, point: SeriesPoint) {
        match self.0.last() {
            Some(last) if last.time > point.time => {
                self.0.push(point);
                self.0.sort_by_key(|p| p.time);
            }
            _ => self.0.push(point),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.0.last()
    }

    /// Arithmetic mean of all values; None for an empty series.
    pub fn mean(&self) -> Option<f64> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0.iter().map(|p| p.value).sum::<f64>() / self.0.len() as f64)
    }

    pub fn min_value(&self) -> Option<f64> {
        self.0.iter().map(|p| p.value).fold(None, |acc, v| {
            Some(acc.map_or(v, |a: f64| a.min(v)))
        })
    }

    pub fn max_value(&self) -> Option<f64> {
        self.0.iter().map(|p| p.value).fold(None, |acc, v| {
            Some(acc.map_or(v, |a: f64| a.max(v)))
        })
    }

    /// Apply a transformation to every value, preserving timestamps.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> TimeSeries {
        TimeSeries(
            self.0
                .iter()
                .map(|p| SeriesPoint::new(p.time, f(p.value)))
                .collect(),
        )
    }

    /// Inner join with another series on exact timestamp.
    ///
    /// Both series are sorted, so a single merge pass suffices.
    pub fn align(&self, other: &TimeSeries) -> Vec<(DateTime<Utc>, f64, f64)> {
        let mut out = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].time.cmp(&other.0[j].time) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.push((self.0[i].time, self.0[i].value, other.0[j].value));
                    i += 1;
                    j += 1;
                }
            }
        }
        out
    }

    /// Timestamps whose value satisfies the predicate.
    pub fn times_where(&self, pred: impl Fn(f64) -> bool) -> Vec<DateTime<Utc>> {
        self.0
            .iter()
            .filter(|p| pred(p.value))
            .map(|p| p.time)
            .collect()
    }
}

impl FromIterator<SeriesPoint> for TimeSeries {
    fn from_iter<T: IntoIterator<Item = SeriesPoint>>(iter: T) -> Self {
        TimeSeries::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pt(hour: u32, value: f64) -> SeriesPoint {
        SeriesPoint::new(Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap(), value)
    }

    #[test]
    fn test_new_sorts_points() {
        let s = TimeSeries::new(vec![pt(3, 1.0), pt(1, 2.0), pt(2, 3.0)]);
        let hours: Vec<_> = s.iter().map(|p| p.time).collect();
        assert!(hours.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_mean_and_extremes() {
        let s = TimeSeries::new(vec![pt(0, 10.0), pt(1, 20.0), pt(2, 30.0)]);
        assert_eq!(s.mean(), Some(20.0));
        assert_eq!(s.min_value(), Some(10.0));
        assert_eq!(s.max_value(), Some(30.0));
        assert_eq!(TimeSeries::default().mean(), None);
    }

    #[test]
    fn test_align_inner_join() {
        let a = TimeSeries::new(vec![pt(0, 1.0), pt(1, 2.0), pt(3, 4.0)]);
        let b = TimeSeries::new(vec![pt(1, 10.0), pt(2, 20.0), pt(3, 30.0)]);
        let joined = a.align(&b);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].1, 2.0);
        assert_eq!(joined[0].2, 10.0);
        assert_eq!(joined[1].1, 4.0);
        assert_eq!(joined[1].2, 30.0);
    }

    #[test]
    fn test_times_where() {
        let s = TimeSeries::new(vec![pt(0, 5.0), pt(1, 15.0), pt(2, 25.0)]);
        assert_eq!(s.times_where(|v| v > 10.0).len(), 2);
    }
}
