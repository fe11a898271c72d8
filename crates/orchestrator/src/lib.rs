//! Cache orchestration: the read path every forecast request goes through.
//!
//! Per (location, parameter) request the orchestrator checks persistence
//! first, falls through to the live provider on a miss or stale hit, and
//! degrades to the deterministic synthetic generator when the provider is
//! down. Whatever series comes back is normalized, written through, and
//! scanned by the severe-weather classifier before it reaches the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use classifier::identify_severe_weather;
use forecast_common::{
    Coordinates, ForecastError, ForecastResult, ParameterCode, SeriesBundle, SevereWeatherEvent,
    TimeSeries, ValueUnit, WeatherWarning,
};
use normalizer::{normalize_pressure, normalize_temperature, normalize_wind_speed};
use providers::{ForecastProvider, Geocoder, SyntheticSeriesGenerator};
use storage::ForecastStore;

/// Where a response's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Served from persistence within the TTL.
    Cache,
    /// Fetched live and written through.
    Provider,
    /// Generated fallback; the provider was unavailable.
    Synthetic,
}

/// Hard upper bound on a forecast horizon. Anything above this is clamped so
/// a hostile or buggy caller cannot drive an unbounded series build.
pub const MAX_HORIZON_HOURS: u32 = 240;

/// Cache lifetimes. Fixed; there is no push invalidation.
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    pub forecast: Duration,
    pub alerts: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            forecast: Duration::from_secs(3600),
            alerts: Duration::from_secs(600),
        }
    }
}

/// The place a request asks about.
#[derive(Debug, Clone)]
pub enum PlaceQuery {
    Coordinates { lat: f64, lon: f64 },
    Name(String),
}

/// Explicit per-request state. Carries everything a request needs so no
/// ambient session state exists anywhere in the pipeline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub place: PlaceQuery,
    pub requested_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(place: PlaceQuery) -> Self {
        Self {
            place,
            requested_at: Utc::now(),
        }
    }
}

/// A geocoded and persisted location.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLocation {
    pub name: String,
    pub coords: Coordinates,
    /// Row id, absent when persistence is degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
}

/// A forecast series with provenance and any severe-weather events found.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResponse {
    pub location: ResolvedLocation,
    pub parameter: ParameterCode,
    pub source: DataSource,
    pub series: TimeSeries,
    pub events: Vec<SevereWeatherEvent>,
}

/// Active warnings for a location with provenance.
#[derive(Debug, Clone, Serialize)]
pub struct AlertsResponse {
    pub location: ResolvedLocation,
    pub source: DataSource,
    pub warnings: Vec<WeatherWarning>,
}

/// Coordinates cache, provider, synthetic fallback, and classifier.
pub struct Orchestrator {
    store: Arc<ForecastStore>,
    provider: Arc<dyn ForecastProvider>,
    geocoder: Arc<dyn Geocoder>,
    synthetic: SyntheticSeriesGenerator,
    ttl: TtlPolicy,
}

impl Orchestrator {
    pub fn new(
        store: Arc<ForecastStore>,
        provider: Arc<dyn ForecastProvider>,
        geocoder: Arc<dyn Geocoder>,
        ttl: TtlPolicy,
    ) -> Self {
        Self {
            store,
            provider,
            geocoder,
            synthetic: SyntheticSeriesGenerator::new(),
            ttl,
        }
    }

    /// Resolve the request's place to coordinates and a persisted location
    /// row. Free-text queries go through the geocoder; coordinate queries
    /// are canonicalized directly.
    pub async fn resolve_location(&self, ctx: &RequestContext) -> ForecastResult<ResolvedLocation> {
        let (name, coords) = match &ctx.place {
            PlaceQuery::Coordinates { lat, lon } => {
                let coords = Coordinates::new(*lat, *lon);
                if !coords.is_valid() {
                    return Err(ForecastError::InvalidParameter {
                        param: "location".to_string(),
                        message: format!("Coordinates out of range: {},{}", lat, lon),
                    });
                }
                (format!("{:.4},{:.4}", coords.lat, coords.lon), coords)
            }
            PlaceQuery::Name(query) => {
                let place = self.geocoder.search(query).await?;
                (place.name, place.coords)
            }
        };

        // Persistence is best-effort: a flaky database downgrades the request
        // to uncached rather than failing it.
        let location_id = match self.store.upsert_location(&name, coords.lat, coords.lon).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Location upsert failed, continuing uncached");
                None
            }
        };

        Ok(ResolvedLocation {
            name,
            coords,
            location_id,
        })
    }

    /// The main read path: cache, then provider, then synthetic fallback.
    pub async fn forecast(
        &self,
        ctx: &RequestContext,
        parameter: ParameterCode,
        horizon_hours: u32,
    ) -> ForecastResult<ForecastResponse> {
        let horizon_hours = horizon_hours.min(MAX_HORIZON_HOURS);
        let location = self.resolve_location(ctx).await?;

        if let Some(id) = location.location_id {
            let cached = self
                .store
                .read_forecast(id, parameter, horizon_hours as i32)
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Cache read failed, treating as miss");
                    None
                });
            if let Some(cached) = cached {
                if self.is_fresh(cached.newest_write, ctx.requested_at, self.ttl.forecast) {
                    debug!(parameter = %parameter, "Cache hit");
                    return Ok(self.finish(location, parameter, DataSource::Cache, cached.series));
                }
                debug!(parameter = %parameter, "Cache stale, refetching");
            }
        }

        let (series, source) = match self
            .provider
            .fetch_series(location.coords.lat, location.coords.lon, parameter, horizon_hours)
            .await
        {
            Ok(raw) => {
                self.record_model_run(ctx.requested_at).await;
                let unit = self.provider.native_unit(parameter);
                (normalize_series(parameter, &raw, unit), DataSource::Provider)
            }
            Err(e) if e.is_recoverable() => {
                warn!(parameter = %parameter, error = %e, "Provider down, using synthetic fallback");
                let series = self
                    .synthetic
                    .generate(parameter, horizon_hours, ctx.requested_at);
                (series, DataSource::Synthetic)
            }
            Err(e) => return Err(e),
        };

        if let Some(id) = location.location_id {
            // Write-through so the next request inside the TTL is a hit. A
            // concurrent session racing this key lands on the same unique row;
            // last writer wins.
            if let Err(e) = self.store.upsert_forecast(id, parameter, &series).await {
                warn!(error = %e, "Forecast write-through failed");
            }
        }

        let response = self.finish(location, parameter, source, series);
        self.persist_events(&response).await;
        Ok(response)
    }

    /// Alerts path: stored warnings within the alert TTL, otherwise a live
    /// fetch written through. When the provider is down the stored set is
    /// returned as-is rather than failing the request.
    pub async fn alerts(
        &self,
        ctx: &RequestContext,
        radius_km: u32,
    ) -> ForecastResult<AlertsResponse> {
        let location = self.resolve_location(ctx).await?;

        let stored = match location.location_id {
            Some(id) => self.store.active_warnings(id).await.unwrap_or_else(|e| {
                warn!(error = %e, "Warning read failed, treating as miss");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let newest = stored.iter().map(|w| w.created_at).max();
        if let Some(newest) = newest {
            if self.is_fresh(newest, ctx.requested_at, self.ttl.alerts) {
                debug!("Alerts cache hit");
                return Ok(AlertsResponse {
                    location,
                    source: DataSource::Cache,
                    warnings: stored.into_iter().map(|w| w.warning).collect(),
                });
            }
        }

        match self
            .provider
            .fetch_alerts(location.coords.lat, location.coords.lon, radius_km)
            .await
        {
            Ok(warnings) => {
                if let Some(id) = location.location_id {
                    for warning in &warnings {
                        if let Err(e) = self.store.save_warning(id, warning).await {
                            warn!(error = %e, "Warning write-through failed");
                        }
                    }
                }
                info!(count = warnings.len(), "Fetched live alerts");
                Ok(AlertsResponse {
                    location,
                    source: DataSource::Provider,
                    warnings,
                })
            }
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "Alerts provider down, serving stored warnings");
                Ok(AlertsResponse {
                    location,
                    source: DataSource::Cache,
                    warnings: stored.into_iter().map(|w| w.warning).collect(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Record which run cycle a live fetch read from, for providers with
    /// discrete runs. Best-effort.
    async fn record_model_run(&self, now: DateTime<Utc>) {
        let Some(run) = self.provider.model_run(now) else {
            return;
        };
        if let Err(e) = self.store.mark_model_run_latest(run.model, run.run_time).await {
            warn!(error = %e, model = run.model, "Failed to record model run");
        }
    }

    fn is_fresh(&self, written: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now - written;
        age < chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero())
    }

    /// Classify the final series and assemble the response.
    fn finish(
        &self,
        location: ResolvedLocation,
        parameter: ParameterCode,
        source: DataSource,
        series: TimeSeries,
    ) -> ForecastResponse {
        let mut bundle = SeriesBundle::new();
        bundle.insert(parameter, series.clone());
        let events = identify_severe_weather(&bundle);

        ForecastResponse {
            location,
            parameter,
            source,
            series,
            events,
        }
    }

    /// Lower classifier events into warning rows. Only fresh data produces
    /// rows, so cache hits never duplicate warnings. Persistence failures
    /// here are logged, not surfaced.
    async fn persist_events(&self, response: &ForecastResponse) {
        if response.source == DataSource::Cache {
            return;
        }
        let Some(id) = response.location.location_id else {
            return;
        };
        for event in &response.events {
            let warning = event.to_warning();
            if let Err(e) = self.store.save_warning(id, &warning).await {
                warn!(error = %e, "Failed to persist classifier warning");
            }
        }
    }
}

/// Route a raw provider series through the right unit conversion.
fn normalize_series(
    parameter: ParameterCode,
    series: &TimeSeries,
    unit: Option<ValueUnit>,
) -> TimeSeries {
    match parameter {
        ParameterCode::Temperature2m | ParameterCode::DewPoint2m => {
            normalize_temperature(series, unit)
        }
        ParameterCode::WindSpeed10m | ParameterCode::WindGust10m => {
            normalize_wind_speed(series, unit.unwrap_or(ValueUnit::KmPerHour))
        }
        ParameterCode::PressureMsl => {
            normalize_pressure(series, unit.unwrap_or(ValueUnit::HectoPascals))
        }
        _ => series.clone(),
    }
}
