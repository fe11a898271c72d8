//! Unit normalization and derived weather parameters.
//!
//! Every function in this crate is pure: one or more aligned time series in,
//! a new series out, no I/O. Functions are total over their declared input
//! domain; a required-but-absent companion series returns the input (or an
//! empty derived series) with a warning rather than an error.

pub mod derived;
pub mod fire;
pub mod summary;
pub mod units;

pub use derived::{dew_point, heat_index, wind_chill, DerivedPoint, DerivedSeries};
pub use fire::{fire_weather_index, FireCategory, FireWeatherIndex};
pub use summary::{cumulative_precipitation, daily_summary, wind_components, DailySummary};
pub use units::{normalize_pressure, normalize_temperature, normalize_wind_speed};
