//! Model-grid adapter for the GDPS national model feed.
//!
//! The model runs at 00Z and 12Z and publishes roughly three hours after the
//! run time, so run selection works off a 15 UTC cutoff: before 03 UTC
//! yesterday's 12Z run is the newest complete one, between 03 and 15 UTC
//! today's 00Z, and from 15 UTC today's 12Z.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use forecast_common::{
    BoundingBox, ForecastError, ForecastResult, GridSnapshot, ParameterCode, SeriesPoint,
    Severity, TimeSeries, ValueUnit, WeatherWarning,
};

use crate::parameters::{lookup, GDPS_PARAMETERS};
use crate::ForecastProvider;

const DEFAULT_BASE_URL: &str = "https://meteocentre.com/plus";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the GDPS model-grid service.
pub struct GdpsClient {
    client: Client,
    base_url: String,
}

impl GdpsClient {
    pub fn new() -> ForecastResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> ForecastResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ForecastError::Internal(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Run time of the newest published run.
    pub fn latest_run_time(now: DateTime<Utc>) -> DateTime<Utc> {
        let (run_date, run_hour) = if now.hour() < 3 {
            (now.date_naive() - chrono::Days::new(1), 12)
        } else if now.hour() < 15 {
            (now.date_naive(), 0)
        } else {
            (now.date_naive(), 12)
        };
        match run_date.and_hms_opt(run_hour, 0, 0) {
            Some(dt) => dt.and_utc(),
            None => now,
        }
    }

    /// The newest published run, as a "YYYYMMDDHH" cycle identifier.
    pub fn latest_run_cycle(now: DateTime<Utc>) -> String {
        Self::latest_run_time(now).format("%Y%m%d%H").to_string()
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> ForecastResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ForecastError::ProviderUnavailable(format!("GDPS request: {}", e)))?;

        if !response.status().is_success() {
            return Err(ForecastError::ProviderUnavailable(format!(
                "GDPS service returned {}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ForecastError::ProviderUnavailable(format!("Malformed payload: {}", e)))
    }
}

#[async_trait]
impl ForecastProvider for GdpsClient {
    fn name(&self) -> &'static str {
        "gdps"
    }

    fn native_unit(&self, parameter: ParameterCode) -> Option<ValueUnit> {
        lookup(GDPS_PARAMETERS, parameter).map(|m| m.native_unit)
    }

    fn model_run(&self, now: DateTime<Utc>) -> Option<crate::ModelRun> {
        Some(crate::ModelRun {
            model: "GDPS",
            run_time: Self::latest_run_time(now),
        })
    }

    async fn fetch_series(
        &self,
        lat: f64,
        lon: f64,
        parameter: ParameterCode,
        horizon_hours: u32,
    ) -> ForecastResult<TimeSeries> {
        let mapping = lookup(GDPS_PARAMETERS, parameter).ok_or_else(|| {
            ForecastError::UnsupportedParameter {
                provider: self.name().to_string(),
                code: parameter.code().to_string(),
            }
        })?;

        let run = Self::latest_run_cycle(Utc::now());
        let url = format!(
            "{}/api/gdps/{}/{}?lat={}&lon={}&hours={}",
            self.base_url, run, mapping.provider_code, lat, lon, horizon_hours
        );
        info!(parameter = %parameter, run = %run, "Fetching GDPS series");

        let rows: Vec<GdpsPoint> = self.get_json(&url).await?;
        let series: TimeSeries = rows
            .into_iter()
            .map(|row| SeriesPoint::new(row.time, row.value))
            .collect();

        debug!(parameter = %parameter, points = series.len(), "Fetched GDPS series");
        Ok(series)
    }

    async fn fetch_grid(
        &self,
        parameter: ParameterCode,
        bbox: &BoundingBox,
        forecast_hour: u32,
    ) -> ForecastResult<GridSnapshot> {
        let mapping = lookup(GDPS_PARAMETERS, parameter).ok_or_else(|| {
            ForecastError::UnsupportedParameter {
                provider: self.name().to_string(),
                code: parameter.code().to_string(),
            }
        })?;

        let run = Self::latest_run_cycle(Utc::now());
        let url = format!(
            "{}/api/gdps/{}/{}/grid?min_lat={}&min_lon={}&max_lat={}&max_lon={}&hour={}",
            self.base_url,
            run,
            mapping.provider_code,
            bbox.min_lat,
            bbox.min_lon,
            bbox.max_lat,
            bbox.max_lon,
            forecast_hour
        );

        let payload: GdpsGrid = self.get_json(&url).await?;
        let snapshot = GridSnapshot {
            parameter,
            forecast_hour,
            data: payload.data,
            lats: payload.lats,
            lons: payload.lons,
        };

        if !snapshot.is_consistent() {
            return Err(ForecastError::ProviderUnavailable(
                "GDPS grid payload has mismatched axes".to_string(),
            ));
        }
        Ok(snapshot)
    }

    async fn fetch_alerts(
        &self,
        lat: f64,
        lon: f64,
        radius_km: u32,
    ) -> ForecastResult<Vec<WeatherWarning>> {
        let url = format!(
            "{}/api/warnings?lat={}&lon={}&radius={}",
            self.base_url, lat, lon, radius_km
        );

        let rows: Vec<GdpsWarning> = self.get_json(&url).await?;
        Ok(rows.into_iter().map(WeatherWarning::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct GdpsPoint {
    time: DateTime<Utc>,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct GdpsGrid {
    data: Vec<Vec<f64>>,
    lats: Vec<f64>,
    lons: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct GdpsWarning {
    #[serde(rename = "type")]
    warning_type: String,
    #[serde(default)]
    description: String,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    severity: Option<String>,
}

impl From<GdpsWarning> for WeatherWarning {
    fn from(row: GdpsWarning) -> Self {
        WeatherWarning {
            warning_type: row.warning_type,
            description: row.description,
            start_time: row.start_time,
            end_time: row.end_time,
            severity: row
                .severity
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Severity::Moderate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_midday_uses_same_day_00z() {
        assert_eq!(GdpsClient::latest_run_cycle(utc(2025, 6, 15, 10)), "2025061500");
        assert_eq!(GdpsClient::latest_run_cycle(utc(2025, 6, 15, 14)), "2025061500");
    }

    #[test]
    fn test_evening_uses_same_day_12z() {
        assert_eq!(GdpsClient::latest_run_cycle(utc(2025, 6, 15, 15)), "2025061512");
        assert_eq!(GdpsClient::latest_run_cycle(utc(2025, 6, 15, 23)), "2025061512");
    }

    #[test]
    fn test_early_hours_roll_back_to_yesterday_12z() {
        assert_eq!(GdpsClient::latest_run_cycle(utc(2025, 6, 15, 2)), "2025061412");
        // Month boundary
        assert_eq!(GdpsClient::latest_run_cycle(utc(2025, 6, 1, 0)), "2025053112");
    }

    #[test]
    fn test_run_time_matches_cycle() {
        let run = GdpsClient::latest_run_time(utc(2025, 6, 15, 16));
        assert_eq!(run, utc(2025, 6, 15, 12));
    }

    #[test]
    fn test_grid_payload_validation() {
        let snapshot = GridSnapshot {
            parameter: ParameterCode::Temperature2m,
            forecast_hour: 24,
            data: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            lats: vec![45.0, 46.0],
            lons: vec![-75.0, -74.0],
        };
        assert!(snapshot.is_consistent());
    }
}
