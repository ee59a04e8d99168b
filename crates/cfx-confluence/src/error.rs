//! Error types for Confluence integration.

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, invalid JSON body, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Base URL or download URL could not be parsed.
    #[error("invalid URL")]
    Url(#[from] url::ParseError),

    /// Download target is not served by the configured Confluence host.
    #[error("refusing to send credentials to foreign host: {0}")]
    ForeignHost(String),
}
