//! Upstream forecast provider adapters.
//!
//! Each adapter wraps one external data source behind the [`ForecastProvider`]
//! trait: a commercial timeline API, the national model-grid service, a
//! tropical cyclone archive, and a sounding analysis service. A deterministic
//! synthetic generator backs the orchestrator's degraded mode when every live
//! source is down.

pub mod cyclone;
pub mod gdps;
pub mod parameters;
pub mod sounding;
pub mod synthetic;
pub mod timeline;

use async_trait::async_trait;

use forecast_common::{
    BoundingBox, ForecastError, ForecastResult, GeocodedPlace, GridSnapshot, ParameterCode,
    SoundingProfile, SoundingSummary, TimeSeries, ValueUnit, WeatherWarning,
};

/// A discrete model run cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRun {
    pub model: &'static str,
    pub run_time: chrono::DateTime<chrono::Utc>,
}

pub use cyclone::{storm_category, ActiveStorm, CycloneClient, StormSummary};
pub use gdps::GdpsClient;
pub use sounding::HttpSoundingAnalyzer;
pub use synthetic::SyntheticSeriesGenerator;
pub use timeline::TimelineClient;

/// A source of point forecasts, gridded fields, and weather alerts.
///
/// Unsupported parameter codes fail with `UnsupportedParameter` before any
/// request goes out; transport failures, non-2xx responses, and malformed
/// payloads surface as `ProviderUnavailable`. An empty alert list is a valid
/// result, never an error.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// The unit the provider delivers a parameter in, or `None` when the
    /// parameter is outside its supported set.
    fn native_unit(&self, parameter: ParameterCode) -> Option<ValueUnit>;

    /// The model run a fetch at `now` reads from, for sources with discrete
    /// run cycles. Continuous sources return `None`.
    fn model_run(&self, _now: chrono::DateTime<chrono::Utc>) -> Option<ModelRun> {
        None
    }

    /// Hourly point forecast for the given coordinates over `horizon_hours`.
    async fn fetch_series(
        &self,
        lat: f64,
        lon: f64,
        parameter: ParameterCode,
        horizon_hours: u32,
    ) -> ForecastResult<TimeSeries>;

    /// Gridded field over a bounding box at one forecast hour.
    ///
    /// Not every source has a grid endpoint; the default is unavailable.
    async fn fetch_grid(
        &self,
        _parameter: ParameterCode,
        _bbox: &BoundingBox,
        _forecast_hour: u32,
    ) -> ForecastResult<GridSnapshot> {
        Err(ForecastError::ProviderUnavailable(format!(
            "{} has no grid endpoint",
            self.name()
        )))
    }

    /// Active weather alerts near the given coordinates.
    async fn fetch_alerts(
        &self,
        _lat: f64,
        _lon: f64,
        _radius_km: u32,
    ) -> ForecastResult<Vec<WeatherWarning>> {
        Ok(Vec::new())
    }
}

/// Resolves a free-text place query to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Fails with `GeocodeNotFound` when the query cannot be resolved.
    async fn search(&self, query: &str) -> ForecastResult<GeocodedPlace>;
}

/// Black-box sounding analysis: a validated vertical profile in, derived
/// convective parameters out.
#[async_trait]
pub trait SoundingAnalyzer: Send + Sync {
    async fn analyze(&self, profile: &SoundingProfile) -> ForecastResult<SoundingSummary>;
}
