//! Deterministic synthetic series generator.
//!
//! Emergency fallback when every live provider is down: produces plausible
//! hourly values so the pipeline downstream of the fetch keeps working. The
//! RNG is seeded from (parameter code, horizon), so two cold-cache requests
//! for the same thing yield the same series until the cache TTL turns over.

use chrono::{DateTime, Duration, DurationRound, Utc};
use rand::prelude::*;
use tracing::info;

use forecast_common::{ParameterCode, SeriesPoint, TimeSeries};

/// Generates deterministic stand-in forecast series.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSeriesGenerator;

impl SyntheticSeriesGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Hourly series for `parameter` starting at the top of the current hour.
    pub fn generate(
        &self,
        parameter: ParameterCode,
        horizon_hours: u32,
        now: DateTime<Utc>,
    ) -> TimeSeries {
        let start = now
            .duration_trunc(Duration::hours(1))
            .unwrap_or(now);
        let mut rng = StdRng::seed_from_u64(series_seed(parameter, horizon_hours));

        info!(parameter = %parameter, horizon_hours, "Generating synthetic series");

        let points = (0..horizon_hours)
            .map(|h| {
                let time = start + Duration::hours(i64::from(h));
                let value = sample_value(parameter, time, &mut rng);
                SeriesPoint::new(time, (value * 10.0).round() / 10.0)
            })
            .collect();
        TimeSeries::new(points)
    }
}

/// FNV-1a over the parameter code and horizon. Stable across processes, so
/// restarts inside a cache window regenerate identical series.
fn series_seed(parameter: ParameterCode, horizon_hours: u32) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in parameter
        .code()
        .bytes()
        .chain(horizon_hours.to_le_bytes())
    {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn sample_value(parameter: ParameterCode, time: DateTime<Utc>, rng: &mut StdRng) -> f64 {
    use chrono::Timelike;
    use std::f64::consts::TAU;

    match parameter {
        ParameterCode::Temperature2m => {
            // Diurnal curve: coolest near 00Z, warmest mid-afternoon.
            let hour_fraction = f64::from(time.hour()) / 24.0;
            20.0 - (TAU * hour_fraction).cos() * 8.0 + rng.gen_range(-0.5..0.5)
        }
        ParameterCode::DewPoint2m => {
            let hour_fraction = f64::from(time.hour()) / 24.0;
            14.0 - (TAU * hour_fraction).cos() * 4.0 + rng.gen_range(-0.5..0.5)
        }
        ParameterCode::Precipitation => {
            // Sparse events with exponentially distributed amounts.
            if rng.gen_bool(0.2) {
                let u: f64 = rng.gen_range(0.0..1.0);
                -2.0 * (1.0 - u).ln()
            } else {
                0.0
            }
        }
        ParameterCode::WindSpeed10m => (15.0 + rng.gen_range(-5.0..5.0_f64)).max(0.0),
        ParameterCode::WindGust10m => (22.0 + rng.gen_range(-7.0..7.0_f64)).max(0.0),
        ParameterCode::WindDirection10m => rng.gen_range(0.0..360.0),
        ParameterCode::RelativeHumidity2m => rng.gen_range(30.0..90.0),
        ParameterCode::CloudCover => rng.gen_range(0.0..100.0),
        ParameterCode::PressureMsl => 1013.0 + rng.gen_range(-8.0..8.0),
        ParameterCode::CapeSurface => rng.gen_range(0.0..1500.0),
        ParameterCode::CinSurface => rng.gen_range(-100.0..0.0),
    }
}
