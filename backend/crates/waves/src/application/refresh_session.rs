//! Refresh Session Use Case
//!
//! Mints a fresh credential and stores it. The store is left untouched
//! when acquisition fails.

use std::sync::Arc;

use crate::application::config::HarvestConfig;
use crate::application::with_deadline;
use crate::domain::repository::{SessionAcquirer, SessionStore};
use crate::error::{HarvestStep, WavesResult};

const OPERATION: &str = "refresh-session";

/// Refresh session use case
pub struct RefreshSessionUseCase<A, S>
where
    A: SessionAcquirer,
    S: SessionStore,
{
    acquirer: Arc<A>,
    session_store: Arc<S>,
    config: Arc<HarvestConfig>,
}

impl<A, S> RefreshSessionUseCase<A, S>
where
    A: SessionAcquirer + Sync,
    S: SessionStore + Sync,
{
    pub fn new(acquirer: Arc<A>, session_store: Arc<S>, config: Arc<HarvestConfig>) -> Self {
        Self {
            acquirer,
            session_store,
            config,
        }
    }

    pub async fn execute(&self) -> WavesResult<()> {
        let timeout = self.config.operation_timeout;

        let credential = with_deadline("acquire session", timeout, self.acquirer.acquire())
            .await
            .map_err(|e| e.at_step(OPERATION, HarvestStep::AcquireSession))?;

        with_deadline("update session", timeout, self.session_store.update(&credential))
            .await
            .map_err(|e| e.at_step(OPERATION, HarvestStep::UpdateSession))?;

        tracing::info!(created_at = %credential.created_at(), "Session refreshed");
        Ok(())
    }
}
