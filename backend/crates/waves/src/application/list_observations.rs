//! List Observations Use Case
//!
//! Read side used by the HTTP front end: every record in the trailing
//! window of the configured collection.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::HarvestConfig;
use crate::application::with_deadline;
use crate::domain::observation::ObservationRecord;
use crate::domain::repository::ObservationStore;
use crate::error::WavesResult;

/// List observations use case
pub struct ListObservationsUseCase<O>
where
    O: ObservationStore,
{
    observation_store: Arc<O>,
    config: Arc<HarvestConfig>,
}

impl<O> ListObservationsUseCase<O>
where
    O: ObservationStore + Sync,
{
    pub fn new(observation_store: Arc<O>, config: Arc<HarvestConfig>) -> Self {
        Self {
            observation_store,
            config,
        }
    }

    /// Records with `now - window <= timestamp <= now`
    pub async fn execute(&self, now: DateTime<Utc>) -> WavesResult<Vec<ObservationRecord>> {
        let start = now - self.config.listing_window_delta();

        with_deadline(
            "list observations",
            self.config.operation_timeout,
            self.observation_store
                .list(&self.config.collection, start, now),
        )
        .await
    }
}
