//! Session Credential
//!
//! The opaque `PHPSESSID` value the upstream site requires to serve the
//! campaign table. Exactly one current credential exists at a time.
//!
//! ## Invariants
//! - `id` is non-empty and not already prefixed with `PHPSESSID=`
//! - `created_at` is UTC, truncated to microseconds (store precision)

use std::fmt;

use chrono::{DateTime, Offset, SubsecRound, TimeZone, Utc};
use platform::cookie::CookiePair;
use thiserror::Error;

/// Cookie name the upstream site issues the session under
pub const SESSION_COOKIE_NAME: &str = "PHPSESSID";

/// Microseconds, matching `TIMESTAMPTZ`
const STORE_SUBSEC_DIGITS: u16 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("session ID cannot be empty")]
    Empty,

    #[error("session ID must not start with the PHPSESSID= prefix")]
    AlreadyPrefixed,

    #[error("created_at must be UTC, got offset {0}")]
    NotUtc(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    id: String,
    created_at: DateTime<Utc>,
}

impl SessionCredential {
    /// A freshly observed credential, stamped now
    pub fn new(id: impl Into<String>) -> Result<Self, CredentialError> {
        Self::with_created_at(id, Utc::now())
    }

    /// Rebuild a credential with a known creation time
    ///
    /// Accepts any `TimeZone` so callers holding offset-aware values
    /// (`DateTime<FixedOffset>`) go through the same UTC check.
    pub fn with_created_at<Tz: TimeZone>(
        id: impl Into<String>,
        created_at: DateTime<Tz>,
    ) -> Result<Self, CredentialError> {
        let id = id.into();

        if id.starts_with(&format!("{SESSION_COOKIE_NAME}=")) {
            return Err(CredentialError::AlreadyPrefixed);
        }
        if id.is_empty() {
            return Err(CredentialError::Empty);
        }

        let offset = created_at.offset().fix();
        if offset.local_minus_utc() != 0 {
            return Err(CredentialError::NotUtc(offset.to_string()));
        }

        Ok(Self {
            id,
            created_at: created_at.with_timezone(&Utc).trunc_subsecs(STORE_SUBSEC_DIGITS),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The credential as a cookie pair
    pub fn cookie_pair(&self) -> CookiePair {
        CookiePair::new(SESSION_COOKIE_NAME, self.id.clone())
    }

    /// `PHPSESSID=<id>`
    pub fn cookie_fragment(&self) -> String {
        self.cookie_pair().to_header_fragment()
    }
}

// Keep the token itself out of logs
impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("id", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    #[test]
    fn test_new_valid() {
        let before = Utc::now();
        let credential = SessionCredential::new("d41d8cd98f00b204").unwrap();

        assert_eq!(credential.id(), "d41d8cd98f00b204");
        assert!(credential.created_at() >= before.trunc_subsecs(6));
        assert_eq!(credential.created_at().nanosecond() % 1_000, 0);
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(SessionCredential::new("").unwrap_err(), CredentialError::Empty);
    }

    #[test]
    fn test_rejects_prefixed() {
        assert_eq!(
            SessionCredential::new("PHPSESSID=abc").unwrap_err(),
            CredentialError::AlreadyPrefixed
        );
        assert_eq!(
            SessionCredential::new("PHPSESSID=").unwrap_err(),
            CredentialError::AlreadyPrefixed
        );
        // Only the exact prefix is refused
        assert!(SessionCredential::new("PHPSESSIDabc").is_ok());
    }

    #[test]
    fn test_rejects_non_utc() {
        let paris = FixedOffset::east_opt(2 * 3600).unwrap();
        let created_at = paris.with_ymd_and_hms(2024, 9, 17, 11, 0, 0).unwrap();

        let err = SessionCredential::with_created_at("abc", created_at).unwrap_err();
        assert_eq!(err, CredentialError::NotUtc("+02:00".to_string()));
    }

    #[test]
    fn test_accepts_zero_offset() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let created_at = utc.with_ymd_and_hms(2024, 9, 17, 9, 0, 0).unwrap();

        let credential = SessionCredential::with_created_at("abc", created_at).unwrap();
        assert_eq!(
            credential.created_at(),
            Utc.with_ymd_and_hms(2024, 9, 17, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_truncates_to_microseconds() {
        let created_at = Utc
            .with_ymd_and_hms(2024, 9, 17, 9, 0, 0)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();

        let credential = SessionCredential::with_created_at("abc", created_at).unwrap();
        assert_eq!(credential.created_at().nanosecond(), 123_456_000);
    }

    #[test]
    fn test_cookie_fragment() {
        let credential = SessionCredential::new("abc123").unwrap();
        assert_eq!(credential.cookie_fragment(), "PHPSESSID=abc123");
        assert_eq!(credential.cookie_pair().name, SESSION_COOKIE_NAME);
    }

    #[test]
    fn test_debug_redacts_id() {
        let credential = SessionCredential::new("very-secret").unwrap();
        let debug = format!("{credential:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
