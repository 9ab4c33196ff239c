//! Harvest And Persist Use Case
//!
//! Loads the stored credential, extracts the campaign table and writes
//! every record, in extraction order, into the target collection.
//!
//! Writes are sequential and stop at the first failure: records before
//! the failing one stay persisted, records after it are never attempted.

use std::sync::Arc;

use crate::application::config::HarvestConfig;
use crate::application::with_deadline;
use crate::domain::repository::{ObservationStore, SessionStore, TableExtractor};
use crate::error::{HarvestStep, WavesResult};

const OPERATION: &str = "harvest";

/// Outcome of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestReport {
    pub persisted: usize,
}

/// Harvest and persist use case
pub struct HarvestAndPersistUseCase<S, E, O>
where
    S: SessionStore,
    E: TableExtractor,
    O: ObservationStore,
{
    session_store: Arc<S>,
    extractor: Arc<E>,
    observation_store: Arc<O>,
    config: Arc<HarvestConfig>,
}

impl<S, E, O> HarvestAndPersistUseCase<S, E, O>
where
    S: SessionStore + Sync,
    E: TableExtractor + Sync,
    O: ObservationStore + Sync,
{
    pub fn new(
        session_store: Arc<S>,
        extractor: Arc<E>,
        observation_store: Arc<O>,
        config: Arc<HarvestConfig>,
    ) -> Self {
        Self {
            session_store,
            extractor,
            observation_store,
            config,
        }
    }

    pub async fn execute(&self) -> WavesResult<HarvestReport> {
        let timeout = self.config.operation_timeout;
        let collection = self.config.collection.as_str();

        let credential = with_deadline("load session", timeout, self.session_store.get())
            .await
            .map_err(|e| e.at_step(OPERATION, HarvestStep::LoadSession))?;

        let records = with_deadline(
            "extract observations",
            timeout,
            self.extractor.extract(&credential, &self.config.campaign_url),
        )
        .await
        .map_err(|e| e.at_step(OPERATION, HarvestStep::ExtractObservations))?;

        for (index, record) in records.iter().enumerate() {
            with_deadline(
                "persist observation",
                timeout,
                self.observation_store.add(record, collection),
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    collection = %collection,
                    timestamp = %record.document_id(),
                    persisted = index,
                    "Stopping harvest at first failed write"
                );
                e.at_step(OPERATION, HarvestStep::PersistObservation)
            })?;
        }

        tracing::info!(collection = %collection, persisted = records.len(), "Harvest complete");

        Ok(HarvestReport {
            persisted: records.len(),
        })
    }
}
