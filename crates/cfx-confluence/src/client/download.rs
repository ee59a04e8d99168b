//! Attachment and image downloads.

use tracing::debug;
use url::Url;

use super::ConfluenceClient;
use crate::error::ConfluenceError;

/// Largest accepted download body (50 MiB).
const MAX_DOWNLOAD_SIZE: u64 = 50 * 1024 * 1024;

impl ConfluenceClient {
    /// Download a resource served by the Confluence instance.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::ForeignHost`] for URLs on another host and
    /// HTTP errors otherwise.
    pub fn download(&self, url: &Url) -> Result<Vec<u8>, ConfluenceError> {
        if !same_host(&self.base_url, url) {
            return Err(ConfluenceError::ForeignHost(url.to_string()));
        }

        debug!("Downloading {}", url);

        let bytes = self
            .get(url.as_str(), "*/*")?
            .into_body()
            .with_config()
            .limit(MAX_DOWNLOAD_SIZE)
            .read_to_vec()?;
        Ok(bytes)
    }
}

/// Whether `url` is served by the same host and port as `base`.
///
/// Credentials are only ever sent to URLs passing this check.
#[must_use]
pub fn same_host(base: &Url, url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
        && url.host_str() == base.host_str()
        && url.port_or_known_default() == base.port_or_known_default()
}
