//! Storage layer for forecast-hub.
//!
//! PostgreSQL persistence for locations, forecast points, weather warnings,
//! and model runs. The store is the only component permitted to write these
//! tables; everything else treats it as a service.
//!
//! Without a database URL the store degrades to a no-op: every read reports
//! absent and every write is discarded, so the application keeps running in
//! "no cache" mode.

pub mod store;

pub use store::{CachedSeries, ForecastStore, StoredWarning, SweepStats};
