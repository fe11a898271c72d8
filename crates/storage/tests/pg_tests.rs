//! Database-backed tests for ForecastStore.
//!
//! These need a live PostgreSQL instance. Set TEST_DATABASE_URL to run them;
//! without it every test short-circuits as a skip, so the suite stays green
//! on machines without a database.

use chrono::{Duration, Utc};
use forecast_common::{ParameterCode, SeriesPoint, Severity, TimeSeries, WeatherWarning};
use storage::ForecastStore;

async fn connect() -> Option<ForecastStore> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let store = ForecastStore::connect(Some(&url)).await;
    if !store.is_available() {
        eprintln!("TEST_DATABASE_URL set but unreachable, skipping");
        return None;
    }
    store.migrate().await.expect("migration failed");
    Some(store)
}

/// Unique suffix so tests do not collide across runs or with each other.
fn tag(name: &str) -> String {
    format!("{}-{}", name, Utc::now().timestamp_nanos_opt().unwrap_or(0))
}

fn hourly_series(start_offset_hours: i64, values: &[f64]) -> TimeSeries {
    let start = Utc::now() + Duration::hours(start_offset_hours);
    values
        .iter()
        .enumerate()
        .map(|(h, v)| SeriesPoint::new(start + Duration::hours(h as i64), *v))
        .collect()
}

// ============================================================================
// Location upsert
// ============================================================================

#[tokio::test]
async fn test_upsert_location_is_idempotent() {
    let Some(store) = connect().await else { return };
    let name = tag("idempotent");

    let first = store.upsert_location(&name, 52.1332, -106.6700).await.unwrap();
    let second = store.upsert_location(&name, 52.1332, -106.6700).await.unwrap();
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_nearby_coordinates_resolve_to_one_row() {
    let Some(store) = connect().await else { return };
    let name = tag("nearby");

    // 0.004 degrees apart, inside the 0.01 match tolerance.
    let first = store.upsert_location(&name, 53.5461, -113.4938).await.unwrap();
    let second = store.upsert_location(&name, 53.5501, -113.4938).await.unwrap();
    assert_eq!(first, second);

    let found = store.location_by_coordinates(53.5461, -113.4938).await.unwrap();
    assert_eq!(found.map(|l| l.id), first);
}

// ============================================================================
// Forecast upsert and read
// ============================================================================

#[tokio::test]
async fn test_forecast_upsert_overwrites_conflicting_rows() {
    let Some(store) = connect().await else { return };
    let id = store
        .upsert_location(&tag("overwrite"), 49.2827, -123.1207)
        .await
        .unwrap()
        .unwrap();

    let series = hourly_series(1, &[1.0, 2.0, 3.0]);
    store
        .upsert_forecast(id, ParameterCode::Temperature2m, &series)
        .await
        .unwrap();

    // Same timestamps, new values: the batch must replace, not append.
    let revised: TimeSeries = series.iter().map(|p| SeriesPoint::new(p.time, p.value + 10.0)).collect();
    store
        .upsert_forecast(id, ParameterCode::Temperature2m, &revised)
        .await
        .unwrap();

    let cached = store
        .read_forecast(id, ParameterCode::Temperature2m, 6)
        .await
        .unwrap()
        .expect("rows were written");
    assert_eq!(cached.series.len(), 3);
    assert_eq!(cached.series.first().unwrap().value, 11.0);
}

// ============================================================================
// Model run exclusivity and retention
// ============================================================================

#[tokio::test]
async fn test_latest_run_marking_is_exclusive() {
    let Some(store) = connect().await else { return };
    let model = tag("model");
    let older = Utc::now() - Duration::hours(12);
    let newer = Utc::now();

    store.mark_model_run_latest(&model, older).await.unwrap();
    store.mark_model_run_latest(&model, newer).await.unwrap();
    let latest = store.latest_model_run(&model).await.unwrap().unwrap();
    assert_eq!(latest.timestamp(), newer.timestamp());

    // Re-marking the older run moves the flag back; there is never more
    // than one latest row, so the query cannot return both.
    store.mark_model_run_latest(&model, older).await.unwrap();
    let latest = store.latest_model_run(&model).await.unwrap().unwrap();
    assert_eq!(latest.timestamp(), older.timestamp());
}

#[tokio::test]
async fn test_retention_sweep_spares_the_latest_run() {
    let Some(store) = connect().await else { return };
    let model = tag("sweep");
    let superseded = Utc::now() - Duration::hours(24);
    let current = Utc::now();

    store.mark_model_run_latest(&model, superseded).await.unwrap();
    store.mark_model_run_latest(&model, current).await.unwrap();

    // A zero-day window ages out every non-latest row immediately.
    store.retention_sweep(0).await.unwrap();

    let latest = store.latest_model_run(&model).await.unwrap();
    assert_eq!(latest.map(|t| t.timestamp()), Some(current.timestamp()));
}

// ============================================================================
// Warning dedup
// ============================================================================

#[tokio::test]
async fn test_resaving_an_ongoing_warning_does_not_duplicate() {
    let Some(store) = connect().await else { return };
    let id = store
        .upsert_location(&tag("warnings"), 50.4452, -104.6189)
        .await
        .unwrap()
        .unwrap();

    let warning = WeatherWarning {
        warning_type: "Extreme Heat".to_string(),
        description: "Temperature exceeding 30°C may cause heat stress.".to_string(),
        start_time: Some(Utc::now()),
        end_time: Some(Utc::now() + Duration::hours(6)),
        severity: Severity::Severe,
    };

    store.save_warning(id, &warning).await.unwrap();
    store.save_warning(id, &warning).await.unwrap();

    let active = store.active_warnings(id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].warning.warning_type, "Extreme Heat");
}
