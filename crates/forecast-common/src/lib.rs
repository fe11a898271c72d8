//! Common types and utilities shared across all forecast-hub services.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod location;
pub mod parameter;
pub mod series;
pub mod severity;
pub mod sounding;
pub mod warning;

pub use bbox::BoundingBox;
pub use error::{ForecastError, ForecastResult};
pub use grid::GridSnapshot;
pub use location::{canonical_coordinate, Coordinates, GeocodedPlace, Location};
pub use parameter::{ParameterCode, ValueUnit};
pub use series::{SeriesBundle, SeriesPoint, TimeSeries};
pub use severity::Severity;
pub use sounding::{SoundingProfile, SoundingSummary};
pub use warning::{EventKind, SevereWeatherEvent, WeatherWarning};
