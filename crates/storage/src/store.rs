//! Forecast metadata store using PostgreSQL.

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tracing::{debug, info, warn};

use forecast_common::{
    canonical_coordinate, Coordinates, ForecastError, ForecastResult, Location, ParameterCode,
    SeriesPoint, Severity, TimeSeries, WeatherWarning,
};

/// Coordinate tolerance for matching an existing location row, degrees.
const LOCATION_TOLERANCE_DEG: f64 = 0.01;

/// A cached forecast series together with its newest write timestamp, so the
/// orchestrator can apply its TTL without a second query.
#[derive(Debug, Clone)]
pub struct CachedSeries {
    pub series: TimeSeries,
    pub newest_write: DateTime<Utc>,
}

/// A persisted warning row for one location.
#[derive(Debug, Clone)]
pub struct StoredWarning {
    pub warning: WeatherWarning,
    pub created_at: DateTime<Utc>,
}

/// Row counts removed by a retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub forecast_rows: u64,
    pub warning_rows: u64,
    pub model_run_rows: u64,
}

/// Database connection pool and forecast persistence operations.
///
/// Constructed with `None` when no database URL is configured; in that mode
/// every operation is a safe no-op.
pub struct ForecastStore {
    pool: Option<PgPool>,
}

impl ForecastStore {
    /// Connect to the database, or degrade to no-op mode when `database_url`
    /// is absent or the connection fails.
    pub async fn connect(database_url: Option<&str>) -> Self {
        let Some(url) = database_url else {
            warn!("DATABASE_URL not set; persistence disabled, running in no-cache mode");
            return Self { pool: None };
        };

        match PgPoolOptions::new().max_connections(10).connect(url).await {
            Ok(pool) => {
                info!("Database connection established");
                Self { pool: Some(pool) }
            }
            Err(e) => {
                warn!(error = %e, "Database unreachable; persistence disabled, running in no-cache mode");
                Self { pool: None }
            }
        }
    }

    /// True when a live database backs this store.
    pub fn is_available(&self) -> bool {
        self.pool.is_some()
    }

    /// Run schema migrations.
    pub async fn migrate(&self) -> ForecastResult<()> {
        let Some(pool) = &self.pool else {
            return Ok(());
        };

        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(pool)
                    .await
                    .map_err(|e| ForecastError::Database(format!("Migration failed: {}", e)))?;
            }
        }

        Ok(())
    }

    /// Insert or refresh a location, matching existing rows within the
    /// coordinate tolerance. Returns the row id, or `None` in no-op mode.
    pub async fn upsert_location(
        &self,
        name: &str,
        lat: f64,
        lon: f64,
    ) -> ForecastResult<Option<i64>> {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };

        let lat = canonical_coordinate(lat);
        let lon = canonical_coordinate(lon);

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM locations \
             WHERE lat BETWEEN $1 - $3 AND $1 + $3 \
             AND lon BETWEEN $2 - $3 AND $2 + $3 \
             ORDER BY last_accessed DESC LIMIT 1",
        )
        .bind(lat)
        .bind(lon)
        .bind(LOCATION_TOLERANCE_DEG)
        .fetch_optional(pool)
        .await
        .map_err(|e| ForecastError::Database(format!("Location lookup failed: {}", e)))?;

        if let Some(id) = existing {
            sqlx::query("UPDATE locations SET name = $1, last_accessed = NOW() WHERE id = $2")
                .bind(name)
                .bind(id)
                .execute(pool)
                .await
                .map_err(|e| ForecastError::Database(format!("Location update failed: {}", e)))?;
            debug!(id, name, "Refreshed existing location");
            return Ok(Some(id));
        }

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO locations (name, lat, lon, last_accessed) \
             VALUES ($1, $2, $3, NOW()) RETURNING id",
        )
        .bind(name)
        .bind(lat)
        .bind(lon)
        .fetch_one(pool)
        .await
        .map_err(|e| ForecastError::Database(format!("Location insert failed: {}", e)))?;

        info!(id, name, lat, lon, "Added new location");
        Ok(Some(id))
    }

    /// Find a location near the given coordinates, refreshing its
    /// last-accessed timestamp on a hit.
    pub async fn location_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> ForecastResult<Option<Location>> {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, LocationRow>(
            "SELECT id, name, lat, lon, last_accessed FROM locations \
             WHERE lat BETWEEN $1 - $3 AND $1 + $3 \
             AND lon BETWEEN $2 - $3 AND $2 + $3 \
             ORDER BY last_accessed DESC LIMIT 1",
        )
        .bind(canonical_coordinate(lat))
        .bind(canonical_coordinate(lon))
        .bind(LOCATION_TOLERANCE_DEG)
        .fetch_optional(pool)
        .await
        .map_err(|e| ForecastError::Database(format!("Location lookup failed: {}", e)))?;

        if let Some(row) = &row {
            sqlx::query("UPDATE locations SET last_accessed = NOW() WHERE id = $1")
                .bind(row.id)
                .execute(pool)
                .await
                .map_err(|e| ForecastError::Database(format!("Location touch failed: {}", e)))?;
        }

        Ok(row.map(Location::from))
    }

    /// Recently accessed locations, newest first.
    pub async fn recent_locations(&self, limit: i64) -> ForecastResult<Vec<Location>> {
        let Some(pool) = &self.pool else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, LocationRow>(
            "SELECT id, name, lat, lon, last_accessed FROM locations \
             ORDER BY last_accessed DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| ForecastError::Database(format!("Recent locations query failed: {}", e)))?;

        Ok(rows.into_iter().map(Location::from).collect())
    }

    /// Write one forecast series as a single atomic batch.
    ///
    /// Conflicting (location, parameter, time) keys overwrite the value and
    /// refresh the write timestamp; the whole batch commits together or not
    /// at all. Returns the number of rows written.
    pub async fn upsert_forecast(
        &self,
        location_id: i64,
        parameter: ParameterCode,
        series: &TimeSeries,
    ) -> ForecastResult<u64> {
        let Some(pool) = &self.pool else {
            return Ok(0);
        };
        if series.is_empty() {
            return Ok(0);
        }

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| ForecastError::Database(format!("Begin failed: {}", e)))?;

        for point in series.iter() {
            sqlx::query(
                "INSERT INTO forecast_data (location_id, parameter_code, forecast_time, value, created_at) \
                 VALUES ($1, $2, $3, $4, NOW()) \
                 ON CONFLICT (location_id, parameter_code, forecast_time) \
                 DO UPDATE SET value = EXCLUDED.value, created_at = NOW()",
            )
            .bind(location_id)
            .bind(parameter.code())
            .bind(point.time)
            .bind(point.value)
            .execute(&mut *tx)
            .await
            .map_err(|e| ForecastError::Database(format!("Forecast upsert failed: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| ForecastError::Database(format!("Commit failed: {}", e)))?;

        debug!(
            location_id,
            parameter = %parameter,
            rows = series.len(),
            "Saved forecast batch"
        );
        Ok(series.len() as u64)
    }

    /// Read the cached series for (location, parameter) within
    /// `[now, now + horizon_hours]`.
    ///
    /// Returns `None` when no rows match, so callers can distinguish "no data
    /// cached" from "cached and empty".
    pub async fn read_forecast(
        &self,
        location_id: i64,
        parameter: ParameterCode,
        horizon_hours: i32,
    ) -> ForecastResult<Option<CachedSeries>> {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, (DateTime<Utc>, f64, DateTime<Utc>)>(
            "SELECT forecast_time, value, created_at FROM forecast_data \
             WHERE location_id = $1 AND parameter_code = $2 \
             AND forecast_time >= NOW() \
             AND forecast_time <= NOW() + make_interval(hours => $3) \
             ORDER BY forecast_time ASC",
        )
        .bind(location_id)
        .bind(parameter.code())
        .bind(horizon_hours)
        .fetch_all(pool)
        .await
        .map_err(|e| ForecastError::Database(format!("Forecast query failed: {}", e)))?;

        if rows.is_empty() {
            debug!(location_id, parameter = %parameter, "No cached forecast");
            return Ok(None);
        }

        let newest_write = rows
            .iter()
            .map(|(_, _, created)| *created)
            .max()
            .unwrap_or_else(Utc::now);
        let series = rows
            .into_iter()
            .map(|(time, value, _)| SeriesPoint::new(time, value))
            .collect();

        Ok(Some(CachedSeries {
            series,
            newest_write,
        }))
    }

    /// Record a model run and mark it latest, un-marking any prior latest row
    /// for that model in the same transaction. At most one latest row per
    /// model exists at any time.
    pub async fn mark_model_run_latest(
        &self,
        model: &str,
        run_time: DateTime<Utc>,
    ) -> ForecastResult<()> {
        let Some(pool) = &self.pool else {
            return Ok(());
        };

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| ForecastError::Database(format!("Begin failed: {}", e)))?;

        sqlx::query("UPDATE model_runs SET is_latest = FALSE WHERE model_name = $1 AND is_latest")
            .bind(model)
            .execute(&mut *tx)
            .await
            .map_err(|e| ForecastError::Database(format!("Un-mark latest failed: {}", e)))?;

        sqlx::query(
            "INSERT INTO model_runs (model_name, run_time, is_latest, available_at) \
             VALUES ($1, $2, TRUE, NOW()) \
             ON CONFLICT (model_name, run_time) \
             DO UPDATE SET is_latest = TRUE, available_at = NOW()",
        )
        .bind(model)
        .bind(run_time)
        .execute(&mut *tx)
        .await
        .map_err(|e| ForecastError::Database(format!("Mark latest failed: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| ForecastError::Database(format!("Commit failed: {}", e)))?;

        info!(model, run_time = %run_time, "Marked model run latest");
        Ok(())
    }

    /// Run time of the latest marked run for a model.
    pub async fn latest_model_run(&self, model: &str) -> ForecastResult<Option<DateTime<Utc>>> {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };

        sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT run_time FROM model_runs \
             WHERE model_name = $1 AND is_latest \
             ORDER BY run_time DESC LIMIT 1",
        )
        .bind(model)
        .fetch_optional(pool)
        .await
        .map_err(|e| ForecastError::Database(format!("Model run query failed: {}", e)))
    }

    /// Persist one weather warning for a location.
    ///
    /// A warning is identified by (location, type, start time); re-saving an
    /// ongoing event refreshes the existing row instead of duplicating it.
    pub async fn save_warning(
        &self,
        location_id: i64,
        warning: &WeatherWarning,
    ) -> ForecastResult<()> {
        let Some(pool) = &self.pool else {
            return Ok(());
        };

        sqlx::query(
            "INSERT INTO weather_warnings \
             (location_id, warning_type, description, start_time, end_time, severity, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) \
             ON CONFLICT (location_id, warning_type, COALESCE(start_time, 'epoch'::timestamptz)) \
             DO UPDATE SET description = EXCLUDED.description, \
                           end_time = EXCLUDED.end_time, \
                           severity = EXCLUDED.severity, \
                           created_at = NOW()",
        )
        .bind(location_id)
        .bind(&warning.warning_type)
        .bind(&warning.description)
        .bind(warning.start_time)
        .bind(warning.end_time)
        .bind(warning.severity.rank())
        .execute(pool)
        .await
        .map_err(|e| ForecastError::Database(format!("Warning insert failed: {}", e)))?;

        debug!(location_id, warning_type = %warning.warning_type, "Saved warning");
        Ok(())
    }

    /// Active warnings for a location: end time unset or in the future,
    /// ordered by severity descending then start time ascending.
    pub async fn active_warnings(&self, location_id: i64) -> ForecastResult<Vec<StoredWarning>> {
        let Some(pool) = &self.pool else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, WarningRow>(
            "SELECT warning_type, description, start_time, end_time, severity, created_at \
             FROM weather_warnings \
             WHERE location_id = $1 AND (end_time IS NULL OR end_time > NOW()) \
             ORDER BY severity DESC, start_time ASC",
        )
        .bind(location_id)
        .fetch_all(pool)
        .await
        .map_err(|e| ForecastError::Database(format!("Warnings query failed: {}", e)))?;

        Ok(rows.into_iter().map(StoredWarning::from).collect())
    }

    /// Delete aged-out rows.
    ///
    /// Removes forecast rows older than the retention window by write time or
    /// with forecast times more than a day in the past, warnings that are
    /// both expired and stale, and superseded model runs past the window. The
    /// currently-latest run of every model survives regardless of age.
    pub async fn retention_sweep(&self, days_to_keep: i32) -> ForecastResult<SweepStats> {
        let Some(pool) = &self.pool else {
            return Ok(SweepStats::default());
        };

        let forecast_rows = sqlx::query(
            "DELETE FROM forecast_data \
             WHERE created_at < NOW() - make_interval(days => $1) \
             OR forecast_time < NOW() - INTERVAL '1 day'",
        )
        .bind(days_to_keep)
        .execute(pool)
        .await
        .map_err(|e| ForecastError::Database(format!("Forecast sweep failed: {}", e)))?
        .rows_affected();

        let warning_rows = sqlx::query(
            "DELETE FROM weather_warnings \
             WHERE end_time IS NOT NULL AND end_time < NOW() \
             AND created_at < NOW() - make_interval(days => $1)",
        )
        .bind(days_to_keep)
        .execute(pool)
        .await
        .map_err(|e| ForecastError::Database(format!("Warning sweep failed: {}", e)))?
        .rows_affected();

        let model_run_rows = sqlx::query(
            "DELETE FROM model_runs \
             WHERE is_latest = FALSE \
             AND available_at < NOW() - make_interval(days => $1)",
        )
        .bind(days_to_keep)
        .execute(pool)
        .await
        .map_err(|e| ForecastError::Database(format!("Model run sweep failed: {}", e)))?
        .rows_affected();

        info!(
            days_to_keep,
            forecast_rows, warning_rows, model_run_rows, "Retention sweep complete"
        );
        Ok(SweepStats {
            forecast_rows,
            warning_rows,
            model_run_rows,
        })
    }
}

/// Internal row type for location queries.
#[derive(FromRow)]
struct LocationRow {
    id: i64,
    name: String,
    lat: f64,
    lon: f64,
    last_accessed: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            name: row.name,
            coords: Coordinates::new(row.lat, row.lon),
            last_accessed: row.last_accessed,
        }
    }
}

/// Internal row type for warning queries.
#[derive(FromRow)]
struct WarningRow {
    warning_type: String,
    description: String,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    severity: i16,
    created_at: DateTime<Utc>,
}

impl From<WarningRow> for StoredWarning {
    fn from(row: WarningRow) -> Self {
        StoredWarning {
            warning: WeatherWarning {
                warning_type: row.warning_type,
                description: row.description,
                start_time: row.start_time,
                end_time: row.end_time,
                severity: Severity::from_rank(row.severity).unwrap_or(Severity::Moderate),
            },
            created_at: row.created_at,
        }
    }
}

/// Database schema SQL.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS locations (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(200) NOT NULL,
    lat DOUBLE PRECISION NOT NULL,
    lon DOUBLE PRECISION NOT NULL,
    last_accessed TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_locations_coords ON locations(lat, lon);

CREATE TABLE IF NOT EXISTS forecast_data (
    location_id BIGINT NOT NULL REFERENCES locations(id),
    parameter_code VARCHAR(50) NOT NULL,
    forecast_time TIMESTAMPTZ NOT NULL,
    value DOUBLE PRECISION NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    UNIQUE(location_id, parameter_code, forecast_time)
);

CREATE INDEX IF NOT EXISTS idx_forecast_lookup ON forecast_data(location_id, parameter_code, forecast_time);

CREATE TABLE IF NOT EXISTS weather_warnings (
    id BIGSERIAL PRIMARY KEY,
    location_id BIGINT NOT NULL REFERENCES locations(id),
    warning_type VARCHAR(100) NOT NULL,
    description TEXT NOT NULL,
    start_time TIMESTAMPTZ,
    end_time TIMESTAMPTZ,
    severity SMALLINT NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_warnings_location ON weather_warnings(location_id, end_time);

CREATE UNIQUE INDEX IF NOT EXISTS idx_warnings_dedup
    ON weather_warnings(location_id, warning_type, COALESCE(start_time, 'epoch'::timestamptz));

CREATE TABLE IF NOT EXISTS model_runs (
    model_name VARCHAR(50) NOT NULL,
    run_time TIMESTAMPTZ NOT NULL,
    is_latest BOOLEAN NOT NULL DEFAULT FALSE,
    available_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    UNIQUE(model_name, run_time)
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_model_runs_latest ON model_runs(model_name) WHERE is_latest
"#;
