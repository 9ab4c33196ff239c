//! Chrome DevTools discovery handshake
//!
//! A headless Chrome started with `--remote-debugging-address` publishes
//! `GET /json/version`, whose `webSocketDebuggerUrl` field looks like
//! `ws://127.0.0.1:9222/devtools/browser/<id>`. The host in that URL is the
//! one Chrome sees itself as, which is useless from another container, so
//! only the trailing id is kept and the WebSocket URL is rebuilt from the
//! host we were configured with.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{PlatformError, PlatformResult};

/// `ws:` / `` / `host:port` / `devtools` / `browser` / `<id>`
const DEBUGGER_URL_SEGMENTS: usize = 6;

#[derive(Debug, Deserialize)]
struct VersionInfo {
    #[serde(rename = "webSocketDebuggerUrl")]
    web_socket_debugger_url: String,
}

/// A resolved remote-debugging endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevToolsEndpoint {
    /// `host:port` of the browser, without scheme
    host: String,
    /// Browser target id from the discovery document
    browser_id: String,
}

impl DevToolsEndpoint {
    pub fn new(host: impl Into<String>, browser_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            browser_id: browser_id.into(),
        }
    }

    /// Run the discovery handshake against `chrome_url`
    ///
    /// `chrome_url` may be given with or without an `http(s)://` scheme.
    pub async fn discover(client: &reqwest::Client, chrome_url: &str) -> PlatformResult<Self> {
        let base_url = with_http_scheme(chrome_url);
        let browser_id = fetch_browser_id(client, &base_url).await?;
        let host = strip_scheme(&base_url).trim_end_matches('/').to_string();

        tracing::debug!(host = %host, browser_id = %browser_id, "Resolved DevTools endpoint");

        Ok(Self { host, browser_id })
    }

    pub fn browser_id(&self) -> &str {
        &self.browser_id
    }

    /// `ws://<host>/devtools/browser/<id>`
    pub fn ws_url(&self) -> String {
        format!("ws://{}/devtools/browser/{}", self.host, self.browser_id)
    }
}

/// Fetch `/json/version` and return the trailing browser id
async fn fetch_browser_id(client: &reqwest::Client, base_url: &str) -> PlatformResult<String> {
    let url = format!("{}/json/version", base_url.trim_end_matches('/'));

    let response = client.get(&url).send().await.map_err(|e| {
        PlatformError::Unreachable(format!("failed to perform request, url: {url}, error: {e}"))
    })?;

    if response.status() != StatusCode::OK {
        return Err(PlatformError::Unreachable(format!(
            "received non-200 response: {}",
            response.status().as_u16()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| PlatformError::Unreachable(format!("failed to read response body: {e}")))?;

    parse_browser_id(&body)
}

/// Extract the browser id from a `/json/version` document
pub fn parse_browser_id(body: &str) -> PlatformResult<String> {
    let info: VersionInfo = serde_json::from_str(body)
        .map_err(|e| PlatformError::Discovery(format!("failed to unmarshal version info: {e}")))?;

    let parts: Vec<&str> = info.web_socket_debugger_url.split('/').collect();
    match parts.as_slice() {
        [.., id] if parts.len() == DEBUGGER_URL_SEGMENTS && !id.is_empty() => Ok(id.to_string()),
        _ => Err(PlatformError::Discovery(format!(
            "invalid WebSocket URL format: {}",
            info.web_socket_debugger_url
        ))),
    }
}

fn with_http_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}

fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .unwrap_or(url)
}
