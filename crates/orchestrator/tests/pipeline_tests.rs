//! End-to-end tests of the forecast pipeline without a live database or
//! network: stub providers drive the orchestrator through its cache-miss,
//! normalization, classification, and fallback paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use forecast_common::{
    Coordinates, ForecastError, ForecastResult, GeocodedPlace, ParameterCode, SeriesPoint,
    TimeSeries, ValueUnit,
};
use orchestrator::{DataSource, Orchestrator, PlaceQuery, RequestContext, TtlPolicy};
use providers::{ForecastProvider, Geocoder};
use storage::ForecastStore;

// ============================================================================
// Stubs
// ============================================================================

/// Serves a fixed Kelvin temperature ramp and counts fetches.
struct RampProvider {
    start_kelvin: f64,
    step: f64,
    calls: AtomicUsize,
}

impl RampProvider {
    fn new(start_kelvin: f64, step: f64) -> Self {
        Self {
            start_kelvin,
            step,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ForecastProvider for RampProvider {
    fn name(&self) -> &'static str {
        "ramp"
    }

    fn native_unit(&self, _parameter: ParameterCode) -> Option<ValueUnit> {
        Some(ValueUnit::Kelvin)
    }

    async fn fetch_series(
        &self,
        _lat: f64,
        _lon: f64,
        parameter: ParameterCode,
        horizon_hours: u32,
    ) -> ForecastResult<TimeSeries> {
        if parameter != ParameterCode::Temperature2m {
            return Err(ForecastError::UnsupportedParameter {
                provider: "ramp".to_string(),
                code: parameter.code().to_string(),
            });
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        let start = Utc::now();
        Ok((0..horizon_hours)
            .map(|h| {
                SeriesPoint::new(
                    start + Duration::hours(i64::from(h)),
                    self.start_kelvin + self.step * f64::from(h),
                )
            })
            .collect())
    }
}

struct FixedGeocoder;

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn search(&self, _query: &str) -> ForecastResult<GeocodedPlace> {
        Ok(GeocodedPlace {
            name: "Winnipeg, MB, Canada".to_string(),
            coords: Coordinates::new(49.8954, -97.1385),
            timezone: Some("America/Winnipeg".to_string()),
        })
    }
}

async fn build(provider: RampProvider) -> (Orchestrator, Arc<RampProvider>) {
    let provider = Arc::new(provider);
    let orchestrator = Orchestrator::new(
        Arc::new(ForecastStore::connect(None).await),
        provider.clone(),
        Arc::new(FixedGeocoder),
        TtlPolicy::default(),
    );
    (orchestrator, provider)
}

// ============================================================================
// Normalization through the pipeline
// ============================================================================

#[tokio::test]
async fn test_kelvin_series_served_in_celsius() {
    let (orch, _) = build(RampProvider::new(283.15, 0.5)).await;
    let ctx = RequestContext::new(PlaceQuery::Name("Winnipeg".to_string()));

    let response = orch
        .forecast(&ctx, ParameterCode::Temperature2m, 12)
        .await
        .unwrap();

    assert_eq!(response.source, DataSource::Provider);
    assert_eq!(response.location.name, "Winnipeg, MB, Canada");
    assert!((response.series.first().unwrap().value - 10.0).abs() < 1e-9);
    assert!((response.series.last().unwrap().value - 15.5).abs() < 1e-9);
}

// ============================================================================
// Classification of fresh data
// ============================================================================

#[tokio::test]
async fn test_heat_event_flagged_on_fetched_series() {
    // 307.15 K = 34 °C, above the 30 °C extreme-heat threshold everywhere.
    let (orch, _) = build(RampProvider::new(307.15, 0.0)).await;
    let ctx = RequestContext::new(PlaceQuery::Coordinates {
        lat: 49.8954,
        lon: -97.1385,
    });

    let response = orch
        .forecast(&ctx, ParameterCode::Temperature2m, 6)
        .await
        .unwrap();

    assert_eq!(response.events.len(), 1);
    let event = &response.events[0];
    assert_eq!(event.times.len(), 6);
    assert!(event.threshold.contains("30"));
}

// ============================================================================
// Error surfacing and degraded persistence
// ============================================================================

#[tokio::test]
async fn test_unsupported_parameter_is_terminal() {
    let (orch, provider) = build(RampProvider::new(283.15, 0.0)).await;
    let ctx = RequestContext::new(PlaceQuery::Coordinates {
        lat: 49.8954,
        lon: -97.1385,
    });

    let err = orch
        .forecast(&ctx, ParameterCode::CapeSurface, 24)
        .await
        .unwrap_err();
    assert_eq!(err.http_status_code(), 400);
    assert!(!err.is_recoverable());
    // The rejection happened inside the provider, before any series came back.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_every_request_refetches_without_persistence() {
    // With no database there is no cache, so each request goes live.
    let (orch, provider) = build(RampProvider::new(283.15, 0.0)).await;
    let ctx = RequestContext::new(PlaceQuery::Coordinates {
        lat: 49.8954,
        lon: -97.1385,
    });

    for _ in 0..3 {
        let response = orch
            .forecast(&ctx, ParameterCode::Temperature2m, 24)
            .await
            .unwrap();
        assert_eq!(response.source, DataSource::Provider);
        assert!(response.location.location_id.is_none());
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
}
