//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use std::sync::Arc;

use crate::application::ListObservationsUseCase;
use crate::application::config::HarvestConfig;
use crate::domain::repository::ObservationStore;
use crate::error::WavesResult;
use crate::presentation::dto::{PingResponse, WaveResponse};

/// Shared state for waves handlers
pub struct WavesAppState<O>
where
    O: ObservationStore + Send + Sync + 'static,
{
    pub store: Arc<O>,
    pub config: Arc<HarvestConfig>,
}

// Manual impl: the store itself need not be Clone
impl<O> Clone for WavesAppState<O>
where
    O: ObservationStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
        }
    }
}

/// GET /ping
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { message: "pong" })
}

/// GET /waves
pub async fn list_waves<O>(State(state): State<WavesAppState<O>>) -> WavesResult<Json<Vec<WaveResponse>>>
where
    O: ObservationStore + Send + Sync + 'static,
{
    let use_case = ListObservationsUseCase::new(state.store.clone(), state.config.clone());
    let records = use_case.execute(Utc::now()).await?;

    Ok(Json(records.iter().map(WaveResponse::from).collect()))
}

/// Any unknown path
pub async fn invalid_path() -> (StatusCode, Json<&'static str>) {
    (StatusCode::NOT_FOUND, Json("invalid API path"))
}
