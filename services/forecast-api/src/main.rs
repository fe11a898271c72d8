//! Forecast API service.
//!
//! HTTP server over the forecast cache pipeline: point forecasts, weather
//! alerts, location search, sounding analysis, and tropical storm tracking.

mod handlers;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use state::AppState;
use storage::ForecastStore;

#[derive(Parser, Debug)]
#[command(name = "forecast-api")]
#[command(about = "Forecast cache API server")]
pub struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// PostgreSQL connection URL; persistence degrades to no-ops when unset
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// API key for the commercial timeline provider
    #[arg(long, env = "TIMELINE_API_KEY", default_value = "")]
    pub timeline_api_key: String,

    /// Base URL of the sounding analysis service
    #[arg(long, env = "SOUNDING_URL", default_value = "http://localhost:8100")]
    pub sounding_url: String,

    /// Days of forecast history to keep
    #[arg(long, env = "RETENTION_DAYS", default_value_t = 7)]
    retention_days: i32,

    /// Hours between retention sweeps
    #[arg(long, default_value_t = 6)]
    sweep_interval_hours: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting forecast API server");

    let state = Arc::new(AppState::new(&args).await?);

    spawn_retention_sweeper(
        state.store.clone(),
        args.retention_days,
        Duration::from_secs(args.sweep_interval_hours * 3600),
    );

    let app = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/forecast", get(handlers::forecast_handler))
        .route("/forecast/summary", get(handlers::summary_handler))
        .route("/grid", get(handlers::grid_handler))
        .route("/alerts", get(handlers::alerts_handler))
        .route("/locations/search", get(handlers::location_search_handler))
        .route("/locations/recent", get(handlers::recent_locations_handler))
        .route("/sounding", post(handlers::sounding_handler))
        .route("/storms", get(handlers::storms_handler))
        .route("/storms/:storm_id", get(handlers::storm_detail_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically delete aged-out forecast rows, expired warnings, and
/// superseded model runs.
fn spawn_retention_sweeper(store: Arc<ForecastStore>, retention_days: i32, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so startup stays fast.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.retention_sweep(retention_days).await {
                Ok(stats) => info!(
                    forecast_rows = stats.forecast_rows,
                    warning_rows = stats.warning_rows,
                    model_run_rows = stats.model_run_rows,
                    "Retention sweep finished"
                ),
                Err(e) => error!(error = %e, "Retention sweep failed"),
            }
        }
    });
}
