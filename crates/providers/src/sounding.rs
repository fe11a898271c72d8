//! Sounding analysis adapter.
//!
//! The analysis package is treated as a black box over HTTP: POST a vertical
//! profile, get back derived convective parameters. Profiles are validated
//! locally before any request goes out, so a ragged or inverted profile
//! fails fast with `InvalidProfile` instead of a round trip.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use forecast_common::{ForecastError, ForecastResult, SoundingProfile, SoundingSummary};

use crate::SoundingAnalyzer;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the sounding analysis service.
pub struct HttpSoundingAnalyzer {
    client: Client,
    base_url: String,
}

impl HttpSoundingAnalyzer {
    pub fn new(base_url: impl Into<String>) -> ForecastResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ForecastError::Internal(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SoundingAnalyzer for HttpSoundingAnalyzer {
    async fn analyze(&self, profile: &SoundingProfile) -> ForecastResult<SoundingSummary> {
        profile.validate()?;

        let url = format!("{}/analyze", self.base_url);
        debug!(levels = profile.levels(), "Submitting sounding profile");

        let response = self
            .client
            .post(&url)
            .json(profile)
            .send()
            .await
            .map_err(|e| ForecastError::ProviderUnavailable(format!("Sounding request: {}", e)))?;

        if !response.status().is_success() {
            return Err(ForecastError::ProviderUnavailable(format!(
                "Sounding service returned {}",
                response.status()
            )));
        }

        response
            .json::<SoundingSummary>()
            .await
            .map_err(|e| ForecastError::ProviderUnavailable(format!("Malformed payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_profile_fails_without_request() {
        // Ragged arrays never reach the network.
        let analyzer = HttpSoundingAnalyzer::new("http://localhost:1").unwrap();
        let profile = SoundingProfile {
            pressure_hpa: vec![1000.0, 850.0, 700.0],
            temperature_c: vec![20.0, 12.0],
            dewpoint_c: vec![15.0, 10.0, 2.0],
            wind_speed_kt: vec![10.0, 20.0, 30.0],
            wind_dir_deg: vec![180.0, 200.0, 220.0],
        };
        let err = analyzer.analyze(&profile).await.unwrap_err();
        assert!(matches!(err, ForecastError::InvalidProfile(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_provider_unavailable() {
        let analyzer = HttpSoundingAnalyzer::new("http://localhost:1").unwrap();
        let profile = SoundingProfile {
            pressure_hpa: vec![1000.0, 850.0],
            temperature_c: vec![20.0, 12.0],
            dewpoint_c: vec![15.0, 10.0],
            wind_speed_kt: vec![10.0, 20.0],
            wind_dir_deg: vec![180.0, 200.0],
        };
        let err = analyzer.analyze(&profile).await.unwrap_err();
        assert!(matches!(err, ForecastError::ProviderUnavailable(_)));
    }
}
