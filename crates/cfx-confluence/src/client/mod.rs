//! Confluence REST API client.
//!
//! Provides a sync HTTP client for the Confluence REST API (`/rest/api`)
//! with Basic or Bearer authentication.

mod download;
mod pages;

pub use download::same_host;

use std::time::Duration;

use cfx_config::{ConfluenceConfig, HttpConfig};
use serde::de::DeserializeOwned;
use tracing::warn;
use ureq::Agent;
use ureq::http::Response;
use url::Url;

use crate::auth::Credentials;
use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Default number of results requested per listing call.
const DEFAULT_PAGE_SIZE: u32 = 50;

/// First retry delay; doubles on every further attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Upper bound for any single retry delay, including `Retry-After`.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Confluence base URL (with `/wiki` on Cloud).
    pub base_url: String,
    /// Request credentials.
    pub credentials: Credentials,
    /// Global per-request timeout.
    pub timeout: Duration,
    /// Retries for transient failures.
    pub retries: u32,
    /// Results requested per listing call.
    pub page_size: u32,
}

impl ClientConfig {
    /// Create settings with default timeout, retries and page size.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            retries: 2,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Create settings from loaded configuration sections.
    #[must_use]
    pub fn from_settings(confluence: &ConfluenceConfig, http: &HttpConfig, page_size: u32) -> Self {
        Self {
            base_url: confluence.base_url.clone(),
            credentials: Credentials::from_config(confluence),
            timeout: Duration::from_secs(http.timeout_secs),
            retries: http.retries,
            page_size,
        }
    }
}

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: Url,
    auth_header: String,
    retries: u32,
    page_size: u32,
}

impl ConfluenceClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::Url`] if the base URL cannot be parsed.
    pub fn new(config: ClientConfig) -> Result<Self, ConfluenceError> {
        // Trailing slash keeps relative joins inside the context path.
        let base_url = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))?;

        let agent = Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            agent,
            base_url,
            auth_header: config.credentials.header_value(),
            retries: config.retries,
            page_size: config.page_size.max(1),
        })
    }

    /// Base URL with a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}rest/api", self.base_url)
    }

    /// Send an authenticated GET, retrying transient failures.
    fn get(&self, url: &str, accept: &str) -> Result<Response<ureq::Body>, ConfluenceError> {
        let mut attempt = 0;
        loop {
            let result = self
                .agent
                .get(url)
                .header("Authorization", &self.auth_header)
                .header("Accept", accept)
                .call();

            let retry_after = match &result {
                Ok(response) if is_transient_status(response.status().as_u16()) => Some(
                    response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned),
                ),
                Ok(_) => None,
                Err(_) => Some(None),
            };

            if let Some(retry_after) = retry_after
                && attempt < self.retries
            {
                let delay = retry_delay(attempt, retry_after.as_deref());
                match &result {
                    Ok(response) => warn!(
                        url,
                        status = response.status().as_u16(),
                        attempt = attempt + 1,
                        delay_secs = delay.as_secs_f64(),
                        "Transient HTTP status, retrying"
                    ),
                    Err(e) => warn!(
                        url,
                        error = %e,
                        attempt = attempt + 1,
                        delay_secs = delay.as_secs_f64(),
                        "Request failed, retrying"
                    ),
                }
                std::thread::sleep(delay);
                attempt += 1;
                continue;
            }

            let response = result?;
            let status = response.status().as_u16();
            if status >= 400 {
                let error_body = response
                    .into_body()
                    .read_to_string()
                    .unwrap_or_else(|_| "(unable to read error body)".to_owned());
                return Err(ConfluenceError::HttpResponse {
                    status,
                    body: error_body,
                });
            }
            return Ok(response);
        }
    }

    /// GET a JSON document.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ConfluenceError> {
        Ok(self
            .get(url, "application/json")?
            .into_body()
            .read_json()?)
    }
}

/// Statuses worth retrying: rate limiting and gateway failures.
fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 502 | 503 | 504)
}

/// Delay before retry number `attempt + 1`.
///
/// A numeric `Retry-After` header wins over exponential backoff. Both are
/// capped at [`MAX_RETRY_DELAY`].
fn retry_delay(attempt: u32, retry_after: Option<&str>) -> Duration {
    let delay = retry_after
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or_else(
            || RETRY_BASE_DELAY.saturating_mul(2_u32.saturating_pow(attempt)),
            Duration::from_secs,
        );
    delay.min(MAX_RETRY_DELAY)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn client(base_url: &str) -> ConfluenceClient {
        ConfluenceClient::new(ClientConfig::new(
            base_url,
            Credentials::Bearer {
                token: "t".to_owned(),
            },
        ))
        .unwrap()
    }

    #[test]
    fn test_api_url_keeps_context_path() {
        let client = client("https://acme.atlassian.net/wiki/");

        assert_eq!(client.api_url(), "https://acme.atlassian.net/wiki/rest/api");
    }

    #[test]
    fn test_api_url_without_context_path() {
        let client = client("https://confluence.example.com");

        assert_eq!(client.api_url(), "https://confluence.example.com/rest/api");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ConfluenceClient::new(ClientConfig::new(
            "not a url",
            Credentials::Bearer {
                token: "t".to_owned(),
            },
        ));

        assert!(matches!(result, Err(ConfluenceError::Url(_))));
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient_status(429));
        assert!(is_transient_status(503));
        assert!(!is_transient_status(500));
        assert!(!is_transient_status(401));
        assert!(!is_transient_status(404));
    }

    #[test]
    fn test_retry_delay_backoff() {
        assert_eq!(retry_delay(0, None), Duration::from_millis(500));
        assert_eq!(retry_delay(1, None), Duration::from_millis(1000));
        assert_eq!(retry_delay(3, None), Duration::from_millis(4000));
        assert_eq!(retry_delay(20, None), MAX_RETRY_DELAY);
    }

    #[test]
    fn test_retry_delay_honors_retry_after() {
        assert_eq!(retry_delay(0, Some("3")), Duration::from_secs(3));
        assert_eq!(retry_delay(0, Some("3600")), MAX_RETRY_DELAY);
        // HTTP-date values fall back to backoff.
        assert_eq!(
            retry_delay(1, Some("Wed, 21 Oct 2015 07:28:00 GMT")),
            Duration::from_millis(1000)
        );
    }
}
