//! Error types for forecast-hub services.

use thiserror::Error;

/// Result type alias using ForecastError.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Primary error type for forecast pipeline operations.
#[derive(Debug, Error)]
pub enum ForecastError {
    // === Request Errors ===
    /// The caller asked for a parameter code the adapter does not recognize.
    /// Surfaced immediately, never retried.
    #[error("Unsupported parameter '{code}' for provider '{provider}'")]
    UnsupportedParameter { provider: String, code: String },

    #[error("Location not found: {0}")]
    GeocodeNotFound(String),

    #[error("Invalid sounding profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Provider Errors ===
    /// Network failure, non-2xx status, or malformed payload. The cache
    /// orchestrator recovers from this via the synthetic fallback.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    // === Storage Errors ===
    /// Database unreachable; persistence operations degrade to no-ops.
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ForecastError {
    /// Get the HTTP status code for this error at the service boundary.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ForecastError::UnsupportedParameter { .. }
            | ForecastError::InvalidProfile(_)
            | ForecastError::InvalidParameter { .. } => 400,

            ForecastError::GeocodeNotFound(_) => 404,

            ForecastError::ProviderUnavailable(_) => 502,
            ForecastError::PersistenceUnavailable(_) => 503,

            _ => 500,
        }
    }

    /// True when the orchestrator may recover locally instead of surfacing
    /// the error to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ForecastError::ProviderUnavailable(_) | ForecastError::PersistenceUnavailable(_)
        )
    }
}

// Conversion from common error types
impl From<std::io::Error> for ForecastError {
    fn from(err: std::io::Error) -> Self {
        ForecastError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::ProviderUnavailable(format!("Malformed payload: {}", err))
    }
}
