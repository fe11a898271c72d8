//! HTTP handlers for the forecast API.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use classifier::identify_severe_weather;
use classifier::threat::{assess_threat, ConvectiveThreat};
use forecast_common::{
    ForecastError, ParameterCode, SeriesBundle, SevereWeatherEvent, SoundingProfile,
    SoundingSummary,
};
use normalizer::{
    daily_summary, fire_weather_index, heat_index, wind_chill, DailySummary, DerivedSeries,
    FireWeatherIndex,
};
use orchestrator::{AlertsResponse, DataSource, ForecastResponse, PlaceQuery, RequestContext};
use providers::SoundingAnalyzer;

use crate::state::AppState;

/// Wraps pipeline errors so they map onto HTTP statuses at the boundary.
#[derive(Debug)]
pub struct ApiError(ForecastError);

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Free-text place query; overrides lat/lon when present.
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Wire parameter code, e.g. "TMP_TGL_2".
    #[serde(default = "default_parameter")]
    pub parameter: String,
    #[serde(default = "default_hours")]
    pub hours: u32,
}

fn default_parameter() -> String {
    "TMP_TGL_2".to_string()
}

fn default_hours() -> u32 {
    72
}

/// Upper bound on the requested horizon for any forecast endpoint.
const MAX_FORECAST_HOURS: u32 = 240;

fn validate_hours(hours: u32) -> Result<(), ApiError> {
    if hours == 0 || hours > MAX_FORECAST_HOURS {
        return Err(ForecastError::InvalidParameter {
            param: "hours".to_string(),
            message: format!("hours must be between 1 and {}", MAX_FORECAST_HOURS),
        }
        .into());
    }
    Ok(())
}

fn place_from(
    location: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<PlaceQuery, ApiError> {
    match (location, lat, lon) {
        (Some(name), _, _) if !name.trim().is_empty() => Ok(PlaceQuery::Name(name)),
        (_, Some(lat), Some(lon)) => Ok(PlaceQuery::Coordinates { lat, lon }),
        _ => Err(ForecastError::InvalidParameter {
            param: "location".to_string(),
            message: "Provide either 'location' or both 'lat' and 'lon'".to_string(),
        }
        .into()),
    }
}

fn parse_parameter(code: &str) -> Result<ParameterCode, ApiError> {
    code.parse().map_err(|_| {
        ApiError(ForecastError::InvalidParameter {
            param: "parameter".to_string(),
            message: format!("Unknown parameter code '{}'", code),
        })
    })
}

pub async fn forecast_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let place = place_from(query.location, query.lat, query.lon)?;
    let parameter = parse_parameter(&query.parameter)?;
    validate_hours(query.hours)?;

    let ctx = RequestContext::new(place);
    let response = state.orchestrator.forecast(&ctx, parameter, query.hours).await?;
    Ok(Json(response))
}

/// Parameters the summary endpoint always fetches.
const SUMMARY_PARAMETERS: [ParameterCode; 4] = [
    ParameterCode::Temperature2m,
    ParameterCode::Precipitation,
    ParameterCode::WindSpeed10m,
    ParameterCode::RelativeHumidity2m,
];

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub location: orchestrator::ResolvedLocation,
    /// Worst provenance across the fetched parameters: synthetic if any
    /// series was generated, provider if any was fetched live.
    pub source: DataSource,
    pub daily: Vec<DailySummary>,
    pub wind_chill: DerivedSeries,
    pub heat_index: DerivedSeries,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fire_weather: Option<FireWeatherIndex>,
    pub events: Vec<SevereWeatherEvent>,
}

/// Multi-parameter overview: daily aggregates, comfort indices, fire weather,
/// and severe-weather events over one combined fetch.
pub async fn summary_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let place = place_from(query.location, query.lat, query.lon)?;
    validate_hours(query.hours)?;
    let ctx = RequestContext::new(place);

    let mut bundle = SeriesBundle::new();
    let mut source = DataSource::Cache;
    let mut location = None;
    for parameter in SUMMARY_PARAMETERS {
        let response = state.orchestrator.forecast(&ctx, parameter, query.hours).await?;
        source = worst_source(source, response.source);
        bundle.insert(parameter, response.series);
        location.get_or_insert(response.location);
    }
    // SUMMARY_PARAMETERS is non-empty, so at least one response resolved.
    let location = location.ok_or_else(|| {
        ForecastError::Internal("Summary produced no location".to_string())
    })?;

    let temperature = &bundle[&ParameterCode::Temperature2m];
    let humidity = &bundle[&ParameterCode::RelativeHumidity2m];
    let wind = &bundle[&ParameterCode::WindSpeed10m];
    let precip = &bundle[&ParameterCode::Precipitation];

    let fire_weather = match (temperature.first(), humidity.first(), wind.first()) {
        (Some(t), Some(h), Some(w)) => {
            let rain_24h: f64 = precip.iter().take(24).map(|p| p.value).sum();
            Some(fire_weather_index(t.value, h.value, w.value, rain_24h))
        }
        _ => None,
    };

    Ok(Json(SummaryResponse {
        location,
        source,
        wind_chill: wind_chill(temperature, wind),
        heat_index: heat_index(temperature, humidity),
        fire_weather,
        daily: daily_summary(&bundle),
        events: identify_severe_weather(&bundle),
    }))
}

fn worst_source(a: DataSource, b: DataSource) -> DataSource {
    use DataSource::*;
    match (a, b) {
        (Synthetic, _) | (_, Synthetic) => Synthetic,
        (Provider, _) | (_, Provider) => Provider,
        _ => Cache,
    }
}

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default = "default_radius")]
    pub radius_km: u32,
}

fn default_radius() -> u32 {
    50
}

pub async fn alerts_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<AlertsResponse>, ApiError> {
    let place = place_from(query.location, query.lat, query.lon)?;
    let ctx = RequestContext::new(place);
    let response = state.orchestrator.alerts(&ctx, query.radius_km).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

pub async fn location_search_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if query.q.trim().is_empty() {
        return Err(ForecastError::InvalidParameter {
            param: "q".to_string(),
            message: "Search query must not be empty".to_string(),
        }
        .into());
    }

    let place = state.geocoder.search(&query.q).await?;
    state
        .store
        .upsert_location(&place.name, place.coords.lat, place.coords.lon)
        .await?;
    Ok(Json(json!({ "result": place })))
}

#[derive(Debug, Serialize)]
pub struct SoundingResponse {
    pub summary: SoundingSummary,
    pub threat: ConvectiveThreat,
}

pub async fn sounding_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(profile): Json<SoundingProfile>,
) -> Result<Json<SoundingResponse>, ApiError> {
    let summary = state.analyzer.analyze(&profile).await?;
    let threat = assess_threat(&summary);
    Ok(Json(SoundingResponse { summary, threat }))
}

#[derive(Debug, Deserialize)]
pub struct GridQuery {
    pub parameter: String,
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
    #[serde(default = "default_grid_hour")]
    pub hour: u32,
}

fn default_grid_hour() -> u32 {
    24
}

/// Gridded field for map rendering, straight from the model-grid provider.
pub async fn grid_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<GridQuery>,
) -> Result<Json<forecast_common::GridSnapshot>, ApiError> {
    let parameter = parse_parameter(&query.parameter)?;
    let bbox = forecast_common::BoundingBox {
        min_lon: query.min_lon,
        min_lat: query.min_lat,
        max_lon: query.max_lon,
        max_lat: query.max_lat,
    };
    if !bbox.is_valid() {
        return Err(ForecastError::InvalidParameter {
            param: "bbox".to_string(),
            message: "Bounding box is empty or out of range".to_string(),
        }
        .into());
    }

    let snapshot = state.provider.fetch_grid(parameter, &bbox, query.hour).await?;
    Ok(Json(snapshot))
}

pub async fn storms_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let storms = state.cyclone.active_storms().await?;
    Ok(Json(json!({ "count": storms.len(), "storms": storms })))
}

pub async fn storm_detail_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(storm_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let summary = state.cyclone.storm_summary(&storm_id).await?;
    Ok(Json(json!({ "storm": summary })))
}

pub async fn recent_locations_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let locations = state.store.recent_locations(20).await?;
    Ok(Json(json!({ "locations": locations })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_precedence() {
        let place = place_from(Some("Ottawa".to_string()), Some(1.0), Some(2.0)).unwrap();
        assert!(matches!(place, PlaceQuery::Name(_)));

        let place = place_from(None, Some(45.0), Some(-75.0)).unwrap();
        assert!(matches!(place, PlaceQuery::Coordinates { .. }));

        assert!(place_from(None, Some(45.0), None).is_err());
        assert!(place_from(Some("  ".to_string()), None, None).is_err());
    }

    #[test]
    fn test_hours_bounds() {
        assert!(validate_hours(1).is_ok());
        assert!(validate_hours(240).is_ok());
        assert!(validate_hours(0).is_err());
        assert!(validate_hours(241).is_err());
        // A hostile horizon must be rejected before any series is built.
        assert!(validate_hours(u32::MAX).is_err());
    }

    #[test]
    fn test_parameter_parsing() {
        assert_eq!(
            parse_parameter("TMP_TGL_2").unwrap(),
            ParameterCode::Temperature2m
        );
        assert_eq!(
            parse_parameter("tmp_tgl_2").unwrap(),
            ParameterCode::Temperature2m
        );
        assert!(parse_parameter("NOT_A_CODE").is_err());
    }
}
