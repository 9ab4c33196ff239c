//! Session Acquirers
//!
//! Two ways of minting a fresh `PHPSESSID`:
//! - [`BrowserSessionAcquirer`] drives a real browser through the
//!   [`Scraper`] capability and reads its cookie jar
//! - [`ScrapingBeeSessionAcquirer`] asks the ScrapingBee rendering service
//!   to run the consent clicks and reads the forwarded `Set-Cookie`
//!
//! Both make exactly one attempt per call.

use platform::browser::{RemoteChrome, Scraper};
use platform::cookie::find_set_cookie;
use reqwest::StatusCode;
use serde_json::json;

use crate::application::config::AcquirerConfig;
use crate::domain::repository::SessionAcquirer;
use crate::domain::session_credential::{SESSION_COOKIE_NAME, SessionCredential};
use crate::error::{WavesError, WavesResult};
use crate::infra::error_body;

/// Public ScrapingBee endpoint
pub const SCRAPINGBEE_API_URL: &str = "https://app.scrapingbee.com/api/v1/";

/// Consent buttons clicked before the session cookie is issued
const CONSENT_BUTTONS: [&str; 2] = ["#idBtnAr", "#idBtnTR"];

// ============================================================================
// Browser
// ============================================================================

/// Acquires the credential with a real browser
#[derive(Debug, Clone)]
pub struct BrowserSessionAcquirer<S> {
    scraper: S,
    target_url: String,
}

impl<S> BrowserSessionAcquirer<S>
where
    S: Scraper + Sync,
{
    pub fn new(scraper: S, target_url: impl Into<String>) -> Self {
        Self {
            scraper,
            target_url: target_url.into(),
        }
    }
}

impl BrowserSessionAcquirer<RemoteChrome> {
    /// Resolve the DevTools endpoint once and bind it to the target page
    ///
    /// A malformed discovery document is a `Discovery` error; an unreachable
    /// browser is an `Acquisition` error.
    pub async fn discover(client: &reqwest::Client, config: &AcquirerConfig) -> WavesResult<Self> {
        let chrome = RemoteChrome::discover(client, &config.chrome_url).await?;

        tracing::info!(
            browser_id = %chrome.endpoint().browser_id(),
            "Remote browser discovered"
        );

        Ok(Self::new(chrome, config.target_url.clone()))
    }
}

impl<S> SessionAcquirer for BrowserSessionAcquirer<S>
where
    S: Scraper + Sync,
{
    async fn acquire(&self) -> WavesResult<SessionCredential> {
        let cookies = self
            .scraper
            .collect_cookies(&self.target_url)
            .await
            .map_err(|e| {
                WavesError::Acquisition(format!(
                    "failed while running browser tasks to retrieve session id: {e}"
                ))
            })?;

        let cookie = cookies
            .into_iter()
            .find(|cookie| cookie.name == SESSION_COOKIE_NAME)
            .ok_or_else(|| {
                WavesError::Acquisition(format!(
                    "no {SESSION_COOKIE_NAME} cookie present after visiting {}",
                    self.target_url
                ))
            })?;

        tracing::debug!(domain = %cookie.domain, "Session cookie found in browser");

        Ok(SessionCredential::new(cookie.value)?)
    }
}

// ============================================================================
// ScrapingBee
// ============================================================================

/// Acquires the credential through the ScrapingBee API
#[derive(Debug, Clone)]
pub struct ScrapingBeeSessionAcquirer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    target_url: String,
}

impl ScrapingBeeSessionAcquirer {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: SCRAPINGBEE_API_URL.to_string(),
            api_key: api_key.into(),
            target_url: target_url.into(),
        }
    }

    /// Point at another API base (tests, proxies)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    fn js_scenario() -> String {
        let instructions: Vec<_> = CONSENT_BUTTONS
            .iter()
            .map(|button| json!({ "click": button }))
            .collect();

        json!({ "instructions": instructions }).to_string()
    }
}

impl SessionAcquirer for ScrapingBeeSessionAcquirer {
    async fn acquire(&self) -> WavesResult<SessionCredential> {
        let scenario = Self::js_scenario();

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("url", self.target_url.as_str()),
                ("js_scenario", scenario.as_str()),
            ])
            .send()
            .await
            .map_err(|e| WavesError::Fetch(format!("failed to perform ScrapingBee request: {e}")))?;

        let status = response.status();
        let headers = response.headers().clone();

        if status != StatusCode::OK {
            let body = error_body(response).await;
            return Err(WavesError::Fetch(format!(
                "error response from server, status: {}, response: {body}",
                status.as_u16()
            )));
        }

        let id = find_set_cookie(&headers, SESSION_COOKIE_NAME).ok_or_else(|| {
            WavesError::Acquisition(format!("failed to retrieve cookie {SESSION_COOKIE_NAME}"))
        })?;

        Ok(SessionCredential::new(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::serve;
    use axum::{
        Router,
        extract::Query,
        http::{StatusCode as AxumStatus, header},
        response::IntoResponse,
        routing::get,
    };
    use platform::PlatformResult;
    use platform::browser::BrowserCookie;
    use std::collections::HashMap;

    struct FakeScraper {
        cookies: Vec<BrowserCookie>,
    }

    impl Scraper for FakeScraper {
        async fn collect_cookies(&self, _target_url: &str) -> PlatformResult<Vec<BrowserCookie>> {
            Ok(self.cookies.clone())
        }
    }

    struct BrokenScraper;

    impl Scraper for BrokenScraper {
        async fn collect_cookies(&self, target_url: &str) -> PlatformResult<Vec<BrowserCookie>> {
            Err(platform::PlatformError::Browser(format!(
                "failed to navigate to {target_url}: net::ERR_NAME_NOT_RESOLVED"
            )))
        }
    }

    fn cookie(name: &str, value: &str) -> BrowserCookie {
        BrowserCookie {
            name: name.to_string(),
            value: value.to_string(),
            domain: "candhis.cerema.fr".to_string(),
        }
    }

    #[tokio::test]
    async fn test_browser_acquire_picks_session_cookie() {
        let scraper = FakeScraper {
            cookies: vec![cookie("acceptCookies", "true"), cookie("PHPSESSID", "s3ss10n")],
        };
        let acquirer = BrowserSessionAcquirer::new(scraper, "https://candhis.cerema.fr");

        let credential = acquirer.acquire().await.unwrap();
        assert_eq!(credential.id(), "s3ss10n");
    }

    #[tokio::test]
    async fn test_browser_acquire_without_session_cookie() {
        let scraper = FakeScraper {
            cookies: vec![cookie("acceptCookies", "true")],
        };
        let acquirer = BrowserSessionAcquirer::new(scraper, "https://candhis.cerema.fr");

        let err = acquirer.acquire().await.unwrap_err();
        assert!(matches!(err, WavesError::Acquisition(_)));
        assert!(err.to_string().contains("no PHPSESSID cookie present"));
    }

    #[tokio::test]
    async fn test_browser_acquire_navigation_failure() {
        let acquirer = BrowserSessionAcquirer::new(BrokenScraper, "https://candhis.invalid");

        let err = acquirer.acquire().await.unwrap_err();
        assert!(matches!(err, WavesError::Acquisition(_)));
        assert!(err.to_string().contains("ERR_NAME_NOT_RESOLVED"));
    }

    #[tokio::test]
    async fn test_browser_discover_malformed_document() {
        let router = Router::new().route(
            "/json/version",
            get(|| async { r#"{"webSocketDebuggerUrl":"invalid-url"}"# }),
        );
        let host = serve(router).await;
        let config = AcquirerConfig {
            chrome_url: host,
            target_url: "https://candhis.cerema.fr".to_string(),
        };

        let err = BrowserSessionAcquirer::discover(&reqwest::Client::new(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, WavesError::Discovery(_)));
        assert!(err.to_string().contains("invalid-url"));
    }

    #[tokio::test]
    async fn test_browser_discover_unreachable() {
        let config = AcquirerConfig {
            chrome_url: "http://127.0.0.1:9".to_string(),
            target_url: "https://candhis.cerema.fr".to_string(),
        };

        let err = BrowserSessionAcquirer::discover(&reqwest::Client::new(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, WavesError::Acquisition(_)));
    }

    #[tokio::test]
    async fn test_scrapingbee_acquire() {
        let router = Router::new().route(
            "/api/v1/",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("api_key").map(String::as_str) != Some("key")
                    || params.get("url").map(String::as_str) != Some("https://candhis.cerema.fr")
                    || !params.get("js_scenario").is_some_and(|s| s.contains("#idBtnTR"))
                {
                    return (AxumStatus::UNAUTHORIZED, "bad request").into_response();
                }
                (
                    [(header::SET_COOKIE, "PHPSESSID=b33; path=/; HttpOnly")],
                    "<html></html>",
                )
                    .into_response()
            }),
        );
        let base = serve(router).await;

        let acquirer = ScrapingBeeSessionAcquirer::new(
            reqwest::Client::new(),
            "key",
            "https://candhis.cerema.fr",
        )
        .with_api_url(format!("{base}/api/v1/"));

        let credential = acquirer.acquire().await.unwrap();
        assert_eq!(credential.id(), "b33");
    }

    #[tokio::test]
    async fn test_scrapingbee_error_status() {
        let router = Router::new().route(
            "/api/v1/",
            get(|| async { (AxumStatus::PAYMENT_REQUIRED, "out of credits") }),
        );
        let base = serve(router).await;

        let acquirer = ScrapingBeeSessionAcquirer::new(reqwest::Client::new(), "key", "https://x")
            .with_api_url(format!("{base}/api/v1/"));

        let err = acquirer.acquire().await.unwrap_err();
        assert!(matches!(err, WavesError::Fetch(_)));
        assert!(err.to_string().contains("status: 402, response: out of credits"));
    }

    #[tokio::test]
    async fn test_scrapingbee_error_status_truncated_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(b"HTTP/1.1 402 Payment Required\r\ncontent-length: 100\r\n\r\nout of")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let acquirer = ScrapingBeeSessionAcquirer::new(reqwest::Client::new(), "key", "https://x")
            .with_api_url(format!("http://{addr}/api/v1/"));

        let err = acquirer.acquire().await.unwrap_err();
        assert!(matches!(err, WavesError::Fetch(_)));
        let message = err.to_string();
        assert!(message.contains("status: 402"), "{message}");
        assert!(message.contains("<unreadable body:"), "{message}");
    }

    #[tokio::test]
    async fn test_scrapingbee_without_cookie() {
        let router = Router::new().route("/api/v1/", get(|| async { "<html></html>" }));
        let base = serve(router).await;

        let acquirer = ScrapingBeeSessionAcquirer::new(reqwest::Client::new(), "key", "https://x")
            .with_api_url(format!("{base}/api/v1/"));

        let err = acquirer.acquire().await.unwrap_err();
        assert!(matches!(err, WavesError::Acquisition(_)));
    }
}
