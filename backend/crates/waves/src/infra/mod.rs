//! Infrastructure Layer
//!
//! Database, search index, upstream page and browser integrations.

pub mod elasticsearch;
pub mod postgres;
pub mod session_acquirer;
pub mod table_extractor;

pub use elasticsearch::EsObservationStore;
pub use postgres::PgSessionStore;
pub use session_acquirer::{BrowserSessionAcquirer, ScrapingBeeSessionAcquirer};
pub use table_extractor::HttpTableExtractor;

/// Body of a failed response, for error messages
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {e}>"))
}
