//! Application state and shared resources.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use orchestrator::{Orchestrator, TtlPolicy};
use providers::{
    CycloneClient, ForecastProvider, GdpsClient, Geocoder, HttpSoundingAnalyzer, TimelineClient,
};
use storage::ForecastStore;

use crate::Args;

/// Shared application state.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub provider: Arc<dyn ForecastProvider>,
    pub geocoder: Arc<dyn Geocoder>,
    pub analyzer: HttpSoundingAnalyzer,
    pub cyclone: CycloneClient,
    pub store: Arc<ForecastStore>,
}

impl AppState {
    pub async fn new(args: &Args) -> Result<Self> {
        let store = Arc::new(ForecastStore::connect(args.database_url.as_deref()).await);
        store.migrate().await?;

        let timeline = Arc::new(TimelineClient::new(args.timeline_api_key.clone())?);
        let geocoder: Arc<dyn Geocoder> = timeline.clone();

        // The timeline source needs a paid key; without one the model feed
        // backs the forecast path instead.
        let provider: Arc<dyn ForecastProvider> = if args.timeline_api_key.is_empty() {
            info!("No timeline API key configured, using model-grid provider");
            Arc::new(GdpsClient::new()?)
        } else {
            info!("Using timeline provider");
            timeline
        };

        let orchestrator = Orchestrator::new(
            store.clone(),
            provider.clone(),
            geocoder.clone(),
            TtlPolicy::default(),
        );

        Ok(Self {
            orchestrator,
            provider,
            geocoder,
            analyzer: HttpSoundingAnalyzer::new(args.sounding_url.clone())?,
            cyclone: CycloneClient::new()?,
            store,
        })
    }
}
