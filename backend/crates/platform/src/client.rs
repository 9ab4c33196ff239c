//! Outbound HTTP client
//!
//! One `reqwest::Client` is built per process and shared by every component
//! that talks to the network (upstream page, DevTools discovery, search index).

use std::time::Duration;

use crate::error::PlatformResult;

/// Default user agent sent to the upstream site
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Outbound HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout (connect + headers + body)
    pub request_timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientConfig {
    /// Config with a single overall timeout, connect timeout capped at it
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            connect_timeout: timeout.min(Duration::from_secs(10)),
            request_timeout: timeout,
            ..Default::default()
        }
    }
}

/// Build the shared outbound client
///
/// ## Returns
/// * `Ok(reqwest::Client)` - client with timeouts and user agent applied
/// * `Err(PlatformError::Http)` - TLS backend could not be initialised
pub fn build_client(config: &HttpClientConfig) -> PlatformResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.clone())
        .build()?;

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_with_timeout_caps_connect() {
        let config = HttpClientConfig::with_timeout(Duration::from_secs(3));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(3));

        let config = HttpClientConfig::with_timeout(Duration::from_secs(120));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(&HttpClientConfig::default()).is_ok());
    }
}
