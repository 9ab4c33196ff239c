//! Platform Crate - Technical Infrastructure
//!
//! This crate provides the technical foundations the harvesting core sits on:
//! - Outbound HTTP client construction (timeouts, user agent)
//! - Cookie header composition and `Set-Cookie` lookup
//! - Chrome DevTools discovery handshake (`/json/version`)
//! - Remote browser driver behind the narrow [`browser::Scraper`] capability

pub mod browser;
pub mod client;
pub mod cookie;
pub mod devtools;
pub mod error;

pub use error::{PlatformError, PlatformResult};
