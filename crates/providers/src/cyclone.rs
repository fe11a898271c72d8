//! Tropical cyclone archive adapter.
//!
//! Reads the archive's JSON feed for currently active storms and per-storm
//! summaries. Storm categories follow the Saffir-Simpson-style ladder the
//! archive itself uses, keyed on maximum sustained wind in knots.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use forecast_common::{ForecastError, ForecastResult};

const DEFAULT_BASE_URL: &str = "https://api.cyclone-archive.net/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Storm category from maximum sustained wind in knots.
pub fn storm_category(max_wind_kt: f64) -> &'static str {
    if max_wind_kt < 35.0 {
        "Tropical Depression"
    } else if max_wind_kt < 64.0 {
        "Tropical Storm"
    } else if max_wind_kt < 83.0 {
        "Category 1 Hurricane"
    } else if max_wind_kt < 96.0 {
        "Category 2 Hurricane"
    } else if max_wind_kt < 113.0 {
        "Category 3 Hurricane"
    } else if max_wind_kt < 137.0 {
        "Category 4 Hurricane"
    } else {
        "Category 5 Hurricane"
    }
}

/// An active storm from the archive's current-storms feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveStorm {
    pub id: String,
    pub name: String,
    pub basin: String,
    pub lat: f64,
    pub lon: f64,
    /// Maximum sustained wind, knots.
    pub max_wind_kt: f64,
    /// Minimum central pressure, hPa.
    pub pressure_hpa: f64,
    pub category: String,
}

/// Summary of one storm, current position plus track history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormSummary {
    pub storm: ActiveStorm,
    pub track: Vec<TrackPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPoint {
    pub time: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub max_wind_kt: f64,
    pub category: String,
}

/// Client for the cyclone archive feed.
pub struct CycloneClient {
    client: Client,
    base_url: String,
}

impl CycloneClient {
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

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> ForecastResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ForecastError::ProviderUnavailable(format!("Archive request: {}", e)))?;

        if !response.status().is_success() {
            return Err(ForecastError::ProviderUnavailable(format!(
                "Cyclone archive returned {}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ForecastError::ProviderUnavailable(format!("Malformed payload: {}", e)))
    }

    /// Currently active storms across all basins. An empty list is a normal
    /// result outside the season.
    pub async fn active_storms(&self) -> ForecastResult<Vec<ActiveStorm>> {
        let url = format!("{}/storms/current", self.base_url);
        let rows: Vec<StormRow> = self.get_json(&url).await?;

        let storms: Vec<ActiveStorm> = rows.into_iter().map(ActiveStorm::from).collect();
        debug!(count = storms.len(), "Fetched active storms");
        Ok(storms)
    }

    /// Current state and track history for one storm.
    pub async fn storm_summary(&self, storm_id: &str) -> ForecastResult<StormSummary> {
        let url = format!("{}/storms/{}", self.base_url, storm_id);
        let row: StormDetailRow = self.get_json(&url).await?;

        Ok(StormSummary {
            storm: ActiveStorm::from(row.storm),
            track: row
                .track
                .into_iter()
                .map(|p| TrackPoint {
                    time: p.time,
                    lat: p.lat,
                    lon: p.lon,
                    max_wind_kt: p.vmax,
                    category: storm_category(p.vmax).to_string(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct StormRow {
    id: String,
    name: String,
    basin: String,
    lat: f64,
    lon: f64,
    vmax: f64,
    mslp: f64,
}

impl From<StormRow> for ActiveStorm {
    fn from(row: StormRow) -> Self {
        let category = storm_category(row.vmax).to_string();
        ActiveStorm {
            id: row.id,
            name: row.name,
            basin: row.basin,
            lat: row.lat,
            lon: row.lon,
            max_wind_kt: row.vmax,
            pressure_hpa: row.mslp,
            category,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StormDetailRow {
    #[serde(flatten)]
    storm: StormRow,
    #[serde(default)]
    track: Vec<TrackRow>,
}

#[derive(Debug, Deserialize)]
struct TrackRow {
    time: DateTime<Utc>,
    lat: f64,
    lon: f64,
    vmax: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_thresholds() {
        assert_eq!(storm_category(20.0), "Tropical Depression");
        assert_eq!(storm_category(34.9), "Tropical Depression");
        assert_eq!(storm_category(35.0), "Tropical Storm");
        assert_eq!(storm_category(64.0), "Category 1 Hurricane");
        assert_eq!(storm_category(83.0), "Category 2 Hurricane");
        assert_eq!(storm_category(96.0), "Category 3 Hurricane");
        assert_eq!(storm_category(113.0), "Category 4 Hurricane");
        assert_eq!(storm_category(137.0), "Category 5 Hurricane");
        assert_eq!(storm_category(160.0), "Category 5 Hurricane");
    }

    #[test]
    fn test_storm_row_conversion() {
        let payload = r#"{
            "id": "AL052025",
            "name": "ERIN",
            "basin": "north_atlantic",
            "lat": 24.5,
            "lon": -71.2,
            "vmax": 105.0,
            "mslp": 952.0
        }"#;
        let row: StormRow = serde_json::from_str(payload).unwrap();
        let storm = ActiveStorm::from(row);
        assert_eq!(storm.category, "Category 3 Hurricane");
        assert_eq!(storm.pressure_hpa, 952.0);
    }
}
