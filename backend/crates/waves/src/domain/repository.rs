//! Repository Traits
//!
//! Collaborators of the harvest pipeline. Implementations live in the
//! infrastructure layer; the orchestrator only sees these traits.
//!
//! Dropping a returned future cancels the in-flight network call.

use chrono::{DateTime, Utc};

use crate::domain::observation::ObservationRecord;
use crate::domain::session_credential::SessionCredential;
use crate::error::WavesResult;

/// Durable home of the single current session credential
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Current credential, `NotFound` when the store was never seeded
    async fn get(&self) -> WavesResult<SessionCredential>;

    /// Replace the current credential; never inserts a first row
    async fn update(&self, credential: &SessionCredential) -> WavesResult<()>;
}

/// Queryable home of observation records
#[trait_variant::make(ObservationStore: Send)]
pub trait LocalObservationStore {
    /// Write `record` keyed by its timestamp, visible to the next `list`
    async fn add(&self, record: &ObservationRecord, collection: &str) -> WavesResult<()>;

    /// Records with `start <= timestamp <= end`, in store order
    async fn list(
        &self,
        collection: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> WavesResult<Vec<ObservationRecord>>;
}

/// Source of fresh session credentials
#[trait_variant::make(SessionAcquirer: Send)]
pub trait LocalSessionAcquirer {
    /// One acquisition attempt, no retries
    async fn acquire(&self) -> WavesResult<SessionCredential>;
}

/// Reads observation records off the campaign page
#[trait_variant::make(TableExtractor: Send)]
pub trait LocalTableExtractor {
    /// Every parseable record on `page_url`; bad rows are skipped
    async fn extract(
        &self,
        credential: &SessionCredential,
        page_url: &str,
    ) -> WavesResult<Vec<ObservationRecord>>;
}
