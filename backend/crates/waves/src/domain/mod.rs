//! Domain Layer
//!
//! Observation records, the session credential, and the collaborator traits.

pub mod observation;
pub mod repository;
pub mod session_credential;

// Re-exports
pub use observation::{ObservationError, ObservationRecord};
pub use repository::{ObservationStore, SessionAcquirer, SessionStore, TableExtractor};
pub use session_credential::{CredentialError, SESSION_COOKIE_NAME, SessionCredential};
