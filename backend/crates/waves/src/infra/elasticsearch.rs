//! Elasticsearch Observation Store
//!
//! Plain REST over `reqwest`:
//! - `PUT /{index}/_doc/{timestamp}?refresh=true` so a re-add overwrites
//!   and the write is searchable before `add` returns
//! - `POST /{index}/_search` with an inclusive `range` on `timestamp`

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

use crate::application::config::ObservationStoreConfig;
use crate::domain::observation::{ObservationRecord, format_timestamp};
use crate::domain::repository::ObservationStore;
use crate::error::{WavesError, WavesResult};
use crate::infra::error_body;

/// Upper bound on hits per listing (index default `max_result_window`)
const MAX_LISTED_DOCUMENTS: usize = 10_000;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: ObservationRecord,
}

/// Elasticsearch-backed observation store
#[derive(Debug, Clone)]
pub struct EsObservationStore {
    client: reqwest::Client,
    base_url: Url,
}

impl EsObservationStore {
    pub fn new(client: reqwest::Client, config: &ObservationStoreConfig) -> WavesResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            WavesError::Validation(format!("invalid search index URL {:?}: {e}", config.base_url))
        })?;

        Ok(Self { client, base_url })
    }

    /// `{base}/{segments...}` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> WavesResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| WavesError::Validation(format!("search index URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn require_collection(collection: &str) -> WavesResult<()> {
    if collection.is_empty() {
        return Err(WavesError::Validation("collection cannot be empty".into()));
    }
    Ok(())
}

impl ObservationStore for EsObservationStore {
    async fn add(&self, record: &ObservationRecord, collection: &str) -> WavesResult<()> {
        require_collection(collection)?;

        let document_id = record.document_id();
        let mut url = self.endpoint(&[collection, "_doc", &document_id])?;
        url.query_pairs_mut().append_pair("refresh", "true");

        let response = self
            .client
            .put(url)
            .json(record)
            .send()
            .await
            .map_err(|e| WavesError::Storage(format!("error indexing document: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(WavesError::Storage(format!(
                "error indexing document: {}, body: {body}",
                status.as_u16()
            )));
        }

        tracing::debug!(collection = %collection, timestamp = %document_id, "Observation indexed");
        Ok(())
    }

    async fn list(
        &self,
        collection: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> WavesResult<Vec<ObservationRecord>> {
        require_collection(collection)?;

        let url = self.endpoint(&[collection, "_search"])?;
        let query = json!({
            "size": MAX_LISTED_DOCUMENTS,
            "query": {
                "range": {
                    "timestamp": {
                        "gte": format_timestamp(start),
                        "lte": format_timestamp(end),
                    }
                }
            }
        });

        let response = self
            .client
            .post(url)
            .json(&query)
            .send()
            .await
            .map_err(|e| WavesError::Storage(format!("error searching documents: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(WavesError::Storage(format!(
                "error searching documents: {}, body: {body}",
                status.as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| WavesError::Storage(format!("failed to read search response: {e}")))?;
        let parsed: SearchResponse = serde_json::from_slice(&body)
            .map_err(|e| WavesError::Parse(format!("failed to unmarshal search response: {e}")))?;

        let records: Vec<ObservationRecord> =
            parsed.hits.hits.into_iter().map(|hit| hit.source).collect();

        tracing::debug!(collection = %collection, count = records.len(), "Observations listed");
        Ok(records)
    }
}
