//! Remote browser driver
//!
//! The harvesting core never talks the DevTools protocol itself. It sees the
//! [`Scraper`] capability: "open `target_url` in a real browser and hand me
//! the cookies it ends up with". [`RemoteChrome`] implements it on top of
//! `chromiumoxide` against an already running Chrome.
//!
//! Every call opens its own connection and tab. [`BrowserSession`] owns the
//! connection and the CDP event loop task; dropping it aborts the task, so
//! the connection is released whether the visit succeeded, failed, or the
//! caller's future was cancelled.

use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::EnableParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::devtools::DevToolsEndpoint;
use crate::error::{PlatformError, PlatformResult};

/// A cookie as seen by the browser after navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
}

/// Browser automation capability
#[trait_variant::make(Scraper: Send)]
pub trait LocalScraper {
    /// Navigate to `target_url` and return every cookie visible afterwards
    async fn collect_cookies(&self, target_url: &str) -> PlatformResult<Vec<BrowserCookie>>;
}

/// Chrome reachable over the remote-debugging protocol
#[derive(Debug, Clone)]
pub struct RemoteChrome {
    endpoint: DevToolsEndpoint,
}

impl RemoteChrome {
    pub fn new(endpoint: DevToolsEndpoint) -> Self {
        Self { endpoint }
    }

    /// Resolve the debugger endpoint once, up front
    pub async fn discover(client: &reqwest::Client, chrome_url: &str) -> PlatformResult<Self> {
        let endpoint = DevToolsEndpoint::discover(client, chrome_url).await?;
        Ok(Self::new(endpoint))
    }

    pub fn endpoint(&self) -> &DevToolsEndpoint {
        &self.endpoint
    }
}

impl Scraper for RemoteChrome {
    async fn collect_cookies(&self, target_url: &str) -> PlatformResult<Vec<BrowserCookie>> {
        let session = BrowserSession::connect(&self.endpoint).await?;
        session.visit_and_collect_cookies(target_url).await
    }
}

/// One live CDP connection plus the task pumping its events
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn connect(endpoint: &DevToolsEndpoint) -> PlatformResult<Self> {
        let ws_url = endpoint.ws_url();
        let (browser, mut handler) = Browser::connect(ws_url.as_str())
            .await
            .map_err(|e| PlatformError::Browser(format!("failed to connect to {ws_url}: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler stopped");
                    break;
                }
            }
        });

        tracing::debug!(ws_url = %ws_url, "Connected to remote browser");

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Open a tab, collect cookies, close the tab
    ///
    /// The tab is closed on the error path too; a close failure is only
    /// logged because the connection teardown in `Drop` reclaims it anyway.
    pub async fn visit_and_collect_cookies(
        &self,
        target_url: &str,
    ) -> PlatformResult<Vec<BrowserCookie>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| PlatformError::Browser(format!("failed to open tab: {e}")))?;

        let result = read_cookies(&page, target_url).await;

        if let Err(e) = page.close().await {
            tracing::warn!(error = %e, "Failed to close browser tab");
        }

        result
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

async fn read_cookies(page: &Page, target_url: &str) -> PlatformResult<Vec<BrowserCookie>> {
    page.execute(EnableParams::default())
        .await
        .map_err(|e| PlatformError::Browser(format!("failed to enable network domain: {e}")))?;

    page.goto(target_url)
        .await
        .map_err(|e| PlatformError::Browser(format!("failed to navigate to {target_url}: {e}")))?;

    let cookies = page
        .get_cookies()
        .await
        .map_err(|e| PlatformError::Browser(format!("failed to read cookies: {e}")))?;

    tracing::debug!(count = cookies.len(), url = %target_url, "Read browser cookies");

    Ok(cookies
        .into_iter()
        .map(|cookie| BrowserCookie {
            name: cookie.name,
            value: cookie.value,
            domain: cookie.domain,
        })
        .collect())
}
