//! Presentation Layer
//!
//! HTTP handlers, DTOs and router of the read-only front end.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::WavesAppState;
pub use router::{waves_router, waves_router_generic};
