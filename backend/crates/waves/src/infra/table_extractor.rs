//! Campaign Table Extractor
//!
//! Fetches the campaign page under the session cookie and reads the
//! observation table. The page is not versioned, so parsing is forgiving
//! at row level: a bad row is logged and skipped, never fatal.

use platform::cookie::build_cookie_header;
use reqwest::header::{ACCEPT, COOKIE};
use scraper::{ElementRef, Html, Selector};

use crate::domain::observation::ObservationRecord;
use crate::domain::repository::TableExtractor;
use crate::domain::session_credential::SessionCredential;
use crate::error::{WavesError, WavesResult};

/// Consent cookie the site expects alongside the session
pub const CONSENT_COOKIE: &str = "acceptCookies=true";

/// Style classes of the observation table
pub const TABLE_SELECTOR: &str = "table.table-striped.table-bordered.table-sm";

/// HTTP + HTML implementation of [`TableExtractor`]
#[derive(Debug, Clone)]
pub struct HttpTableExtractor {
    client: reqwest::Client,
}

impl HttpTableExtractor {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_page(&self, credential: &SessionCredential, page_url: &str) -> WavesResult<String> {
        let cookie = build_cookie_header([CONSENT_COOKIE.to_string(), credential.cookie_fragment()])
            .map_err(|e| {
                WavesError::Fetch(format!("failed to create request, url: {page_url}, error: {e}"))
            })?;

        let response = self
            .client
            .get(page_url)
            .header(ACCEPT, "text/html")
            .header(COOKIE, cookie)
            .send()
            .await
            .map_err(|e| {
                WavesError::Fetch(format!("failed to perform request, url: {page_url}, error: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WavesError::Fetch(format!(
                "unexpected status {} from {page_url}",
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| WavesError::Fetch(format!("failed to read response body: {e}")))
    }
}

impl TableExtractor for HttpTableExtractor {
    async fn extract(
        &self,
        credential: &SessionCredential,
        page_url: &str,
    ) -> WavesResult<Vec<ObservationRecord>> {
        let body = self.fetch_page(credential, page_url).await?;
        let records = parse_observation_table(&body)?;

        tracing::info!(url = %page_url, count = records.len(), "Extracted observations");
        Ok(records)
    }
}

/// Read every valid observation row out of a campaign page
///
/// ## Returns
/// * `Ok(records)` - valid rows in document order; empty if no table matches
/// * `Err(WavesError::Parse)` - the body holds no document at all
pub fn parse_observation_table(html: &str) -> WavesResult<Vec<ObservationRecord>> {
    if html.trim().is_empty() {
        return Err(WavesError::Parse("empty HTML document".into()));
    }

    let table_selector = selector(TABLE_SELECTOR)?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for (table_index, table) in document.select(&table_selector).enumerate() {
        for (row_index, row) in table.select(&row_selector).enumerate() {
            let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();

            // Header rows carry <th> only
            if cells.is_empty() {
                tracing::debug!(table_index, row_index, "Skipping row without data cells");
                continue;
            }

            match ObservationRecord::from_cells(&cells) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(table_index, row_index, error = %e, "Skipping invalid row");
                }
            }
        }
    }

    Ok(records)
}

fn selector(css: &str) -> WavesResult<Selector> {
    Selector::parse(css).map_err(|e| WavesError::Parse(format!("invalid selector {css:?}: {e}")))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
