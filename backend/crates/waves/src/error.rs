//! Waves Error Types
//!
//! Harvesting-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use std::fmt;
use std::time::Duration;

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::PlatformError;
use thiserror::Error;

use crate::domain::session_credential::CredentialError;

/// Waves-specific result type alias
pub type WavesResult<T> = Result<T, WavesError>;

/// Pipeline step named in orchestrator failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestStep {
    AcquireSession,
    UpdateSession,
    LoadSession,
    ExtractObservations,
    PersistObservation,
}

impl fmt::Display for HarvestStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            HarvestStep::AcquireSession => "acquire session credential",
            HarvestStep::UpdateSession => "update session credential in store",
            HarvestStep::LoadSession => "load session credential from store",
            HarvestStep::ExtractObservations => "extract observations from campaign page",
            HarvestStep::PersistObservation => "persist observation",
        };
        f.write_str(step)
    }
}

/// Waves-specific error variants
#[derive(Debug, Error)]
pub enum WavesError {
    /// Bad input to a record or store call
    #[error("validation error: {0}")]
    Validation(String),

    /// Value that does not make a valid session credential
    #[error("invalid session credential: {0}")]
    InvalidCredential(#[from] CredentialError),

    /// No session / row present
    #[error("not found: {0}")]
    NotFound(String),

    /// Upstream page or service could not be fetched
    #[error("fetch error: {0}")]
    Fetch(String),

    /// DevTools discovery handshake failed
    #[error("discovery error: {0}")]
    Discovery(String),

    /// Unparseable HTML or malformed JSON
    #[error("parse error: {0}")]
    Parse(String),

    /// Database or search index fault
    #[error("storage error: {0}")]
    Storage(String),

    /// Browser session did not yield a credential
    #[error("acquisition error: {0}")]
    Acquisition(String),

    /// Deadline exceeded on a network-bound operation
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Orchestrator failure naming the operation and step
    #[error("{operation}: failed to {step}: {source}")]
    Step {
        operation: &'static str,
        step: HarvestStep,
        #[source]
        source: Box<WavesError>,
    },
}

impl WavesError {
    /// Wrap `self` as the cause of a failed orchestrator step
    pub fn at_step(self, operation: &'static str, step: HarvestStep) -> Self {
        WavesError::Step {
            operation,
            step,
            source: Box::new(self),
        }
    }

    /// The innermost error, with every `Step` layer peeled off
    pub fn root_cause(&self) -> &WavesError {
        match self {
            WavesError::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The failed step, if this error came out of the orchestrator
    pub fn failed_step(&self) -> Option<HarvestStep> {
        match self {
            WavesError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), WavesError::NotFound(_))
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            // Never caused by the HTTP caller
            WavesError::Validation(_) | WavesError::InvalidCredential(_) => {
                ErrorKind::InternalServerError
            }
            WavesError::NotFound(_) => ErrorKind::NotFound,
            WavesError::Fetch(_)
            | WavesError::Discovery(_)
            | WavesError::Parse(_)
            | WavesError::Acquisition(_) => ErrorKind::BadGateway,
            WavesError::Storage(_) => ErrorKind::ServiceUnavailable,
            WavesError::Timeout { .. } => ErrorKind::GatewayTimeout,
            WavesError::Step { source, .. } => source.kind(),
        }
    }

    /// Convert to AppError, keeping `self` as its source
    pub fn into_app_error(self) -> AppError {
        AppError::new(self.kind(), self.to_string()).with_source(self)
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self.root_cause() {
            WavesError::Storage(msg) => {
                tracing::error!(message = %msg, error = %self, "Waves storage error");
            }
            WavesError::Timeout { operation, .. } => {
                tracing::error!(operation = %operation, error = %self, "Waves operation timed out");
            }
            WavesError::NotFound(_) => {
                tracing::debug!(error = %self, "Waves resource not found");
            }
            _ => {
                tracing::warn!(error = %self, "Waves error");
            }
        }
    }
}

impl IntoResponse for WavesError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<sqlx::Error> for WavesError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => WavesError::NotFound("row not found".into()),
            other => WavesError::Storage(other.to_string()),
        }
    }
}

impl From<PlatformError> for WavesError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Discovery(msg) => WavesError::Discovery(msg),
            PlatformError::Unreachable(msg) | PlatformError::Browser(msg) => {
                WavesError::Acquisition(msg)
            }
            PlatformError::Http(e) => WavesError::Fetch(e.to_string()),
        }
    }
}
