//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every other crate agrees on:
//! - The unified error type returned at the HTTP edge
//! - The error classification and its status code mapping
//! - Its RFC 7807 rendering for axum handlers (feature `axum`)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all crates.

pub mod error {
    pub mod app_error;
    pub mod kind;
    #[cfg(feature = "axum")]
    pub mod response;
}
