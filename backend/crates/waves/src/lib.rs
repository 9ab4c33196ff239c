//! Waves (Buoy Observation Harvesting) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Observation records, session credential, collaborator traits
//! - `application/` - Use cases (refresh session, harvest, listing)
//! - `infra/` - Postgres, Elasticsearch, upstream page and browser integrations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Pipeline
//! - A real browser (or ScrapingBee) mints the upstream `PHPSESSID`
//! - The single stored credential authorizes the campaign page fetch
//! - Valid table rows become records; invalid rows are logged and skipped
//! - Records are indexed one by one, stopping at the first failed write

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{AcquirerConfig, HarvestConfig, ObservationStoreConfig};
pub use error::{HarvestStep, WavesError, WavesResult};
pub use infra::elasticsearch::EsObservationStore;
pub use infra::postgres::PgSessionStore;
pub use presentation::router::waves_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
