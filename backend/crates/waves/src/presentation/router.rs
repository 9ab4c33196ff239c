//! Waves Router

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::application::config::HarvestConfig;
use crate::domain::repository::ObservationStore;
use crate::infra::elasticsearch::EsObservationStore;
use crate::presentation::handlers::{self, WavesAppState};

/// Create the Waves router backed by Elasticsearch
pub fn waves_router(store: EsObservationStore, config: HarvestConfig) -> Router {
    waves_router_generic(store, config)
}

/// Create a Waves router for any observation store
pub fn waves_router_generic<O>(store: O, config: HarvestConfig) -> Router
where
    O: ObservationStore + Send + Sync + 'static,
{
    let state = WavesAppState {
        store: Arc::new(store),
        config: Arc::new(config),
    };

    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/waves", get(handlers::list_waves::<O>))
        .fallback(handlers::invalid_path)
        .with_state(state)
}
