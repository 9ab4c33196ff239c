//! Application Layer
//!
//! Use cases sequencing the collaborators into the harvest pipeline.

pub mod config;
pub mod harvest_and_persist;
pub mod list_observations;
pub mod refresh_session;

use std::future::Future;
use std::time::Duration;

use crate::error::{WavesError, WavesResult};

// Re-exports
pub use config::{AcquirerConfig, HarvestConfig, ObservationStoreConfig};
pub use harvest_and_persist::{HarvestAndPersistUseCase, HarvestReport};
pub use list_observations::ListObservationsUseCase;
pub use refresh_session::RefreshSessionUseCase;

/// Run `future`, failing with `Timeout` once `after` has elapsed
///
/// The timed-out future is dropped, which cancels its network call.
pub(crate) async fn with_deadline<T, F>(
    operation: &'static str,
    after: Duration,
    future: F,
) -> WavesResult<T>
where
    F: Future<Output = WavesResult<T>>,
{
    tokio::time::timeout(after, future)
        .await
        .map_err(|_| WavesError::Timeout { operation, after })?
}
