//! Commercial timeline API adapter.
//!
//! One GET against `{base}/{lat},{lon}` returns days with nested hourly
//! records plus any active alerts, all in the metric unit group. The same
//! endpoint doubles as a geocoder: querying by free-text place name yields a
//! resolved address and coordinates in the payload envelope.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use forecast_common::{
    Coordinates, ForecastError, ForecastResult, GeocodedPlace, ParameterCode, SeriesPoint,
    Severity, TimeSeries, ValueUnit, WeatherWarning,
};

use crate::parameters::{lookup, TIMELINE_PARAMETERS};
use crate::{ForecastProvider, Geocoder};

const DEFAULT_BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the timeline forecast API.
pub struct TimelineClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TimelineClient {
    pub fn new(api_key: impl Into<String>) -> ForecastResult<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> ForecastResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ForecastError::Internal(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Fetch the full timeline payload for a location string (either
    /// "lat,lon" or a free-text place query).
    async fn fetch_timeline(&self, location: &str, elements: &str) -> ForecastResult<Timeline> {
        let url = format!("{}/{}", self.base_url, location);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("unitGroup", "metric"),
                ("key", self.api_key.as_str()),
                ("include", "days,hours,current,alerts"),
                ("contentType", "json"),
                ("elements", elements),
            ])
            .send()
            .await
            .map_err(|e| ForecastError::ProviderUnavailable(format!("Timeline request: {}", e)))?;

        if !response.status().is_success() {
            return Err(ForecastError::ProviderUnavailable(format!(
                "Timeline API returned {}",
                response.status()
            )));
        }

        response
            .json::<Timeline>()
            .await
            .map_err(|e| ForecastError::ProviderUnavailable(format!("Malformed payload: {}", e)))
    }
}

#[async_trait]
impl ForecastProvider for TimelineClient {
    fn name(&self) -> &'static str {
        "timeline"
    }

    fn native_unit(&self, parameter: ParameterCode) -> Option<ValueUnit> {
        lookup(TIMELINE_PARAMETERS, parameter).map(|m| m.native_unit)
    }

    async fn fetch_series(
        &self,
        lat: f64,
        lon: f64,
        parameter: ParameterCode,
        horizon_hours: u32,
    ) -> ForecastResult<TimeSeries> {
        let mapping = lookup(TIMELINE_PARAMETERS, parameter).ok_or_else(|| {
            ForecastError::UnsupportedParameter {
                provider: self.name().to_string(),
                code: parameter.code().to_string(),
            }
        })?;

        let elements = format!("datetime,datetimeEpoch,{}", mapping.provider_code);
        let location = format!("{},{}", lat, lon);
        let timeline = self.fetch_timeline(&location, &elements).await?;

        let tz_offset_hours = timeline.tzoffset.unwrap_or(0.0);
        let cutoff = Utc::now() + chrono::Duration::hours(i64::from(horizon_hours));
        let mut points = Vec::new();
        for day in &timeline.days {
            let Ok(date) = NaiveDate::parse_from_str(&day.datetime, "%Y-%m-%d") else {
                warn!(date = %day.datetime, "Skipping day with unparseable date");
                continue;
            };
            for hour in &day.hours {
                let Some(time) = resolve_hour_time(date, hour, tz_offset_hours) else {
                    continue;
                };
                if time > cutoff {
                    continue;
                }
                if let Some(value) = hour.element(mapping.provider_code) {
                    points.push(SeriesPoint::new(time, value));
                }
            }
        }

        debug!(
            parameter = %parameter,
            points = points.len(),
            "Fetched timeline series"
        );
        Ok(TimeSeries::new(points))
    }

    async fn fetch_alerts(
        &self,
        lat: f64,
        lon: f64,
        _radius_km: u32,
    ) -> ForecastResult<Vec<WeatherWarning>> {
        let location = format!("{},{}", lat, lon);
        let timeline = self.fetch_timeline(&location, "datetime").await?;

        Ok(timeline
            .alerts
            .into_iter()
            .map(WeatherWarning::from)
            .collect())
    }
}

#[async_trait]
impl Geocoder for TimelineClient {
    async fn search(&self, query: &str) -> ForecastResult<GeocodedPlace> {
        let timeline = self.fetch_timeline(query, "datetime").await?;

        match (timeline.latitude, timeline.longitude) {
            (Some(lat), Some(lon)) => Ok(GeocodedPlace {
                name: timeline
                    .resolved_address
                    .unwrap_or_else(|| query.to_string()),
                coords: Coordinates::new(lat, lon),
                timezone: timeline.timezone,
            }),
            _ => Err(ForecastError::GeocodeNotFound(query.to_string())),
        }
    }
}

/// UTC timestamp for one hourly record.
///
/// The payload's epoch field is authoritative when present. The "HH:MM:SS"
/// stamps are in the queried location's local time, so the string fallback
/// applies the envelope's UTC offset before converting.
fn resolve_hour_time(
    date: NaiveDate,
    hour: &TimelineHour,
    tz_offset_hours: f64,
) -> Option<DateTime<Utc>> {
    if let Some(epoch) = hour.datetime_epoch {
        return DateTime::from_timestamp(epoch, 0);
    }
    let time = NaiveTime::parse_from_str(&hour.datetime, "%H:%M:%S").ok()?;
    let offset = FixedOffset::east_opt((tz_offset_hours * 3600.0) as i32)?;
    NaiveDateTime::new(date, time)
        .and_local_timezone(offset)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(rename = "resolvedAddress")]
    resolved_address: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    timezone: Option<String>,
    /// UTC offset of the resolved location, hours.
    tzoffset: Option<f64>,
    #[serde(default)]
    days: Vec<TimelineDay>,
    #[serde(default)]
    alerts: Vec<TimelineAlert>,
}

#[derive(Debug, Deserialize)]
struct TimelineDay {
    datetime: String,
    #[serde(default)]
    hours: Vec<TimelineHour>,
}

#[derive(Debug, Deserialize)]
struct TimelineHour {
    datetime: String,
    #[serde(rename = "datetimeEpoch")]
    datetime_epoch: Option<i64>,
    temp: Option<f64>,
    precip: Option<f64>,
    windspeed: Option<f64>,
    winddir: Option<f64>,
    windgust: Option<f64>,
    humidity: Option<f64>,
    dew: Option<f64>,
    pressure: Option<f64>,
    cloudcover: Option<f64>,
}

impl TimelineHour {
    fn element(&self, code: &str) -> Option<f64> {
        match code {
            "temp" => self.temp,
            "precip" => self.precip,
            "windspeed" => self.windspeed,
            "winddir" => self.winddir,
            "windgust" => self.windgust,
            "humidity" => self.humidity,
            "dew" => self.dew,
            "pressure" => self.pressure,
            "cloudcover" => self.cloudcover,
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TimelineAlert {
    event: Option<String>,
    description: Option<String>,
    onset: Option<DateTime<Utc>>,
    ends: Option<DateTime<Utc>>,
    severity: Option<String>,
}

impl From<TimelineAlert> for WeatherWarning {
    fn from(alert: TimelineAlert) -> Self {
        let severity = alert
            .severity
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Severity::Moderate);

        WeatherWarning {
            warning_type: alert.event.unwrap_or_else(|| "Weather Alert".to_string()),
            description: alert.description.unwrap_or_default(),
            start_time: alert.onset,
            end_time: alert.ends,
            severity,
        }
    }
}
