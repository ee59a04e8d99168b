//! Request authentication.

use std::fmt;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use cfx_config::ConfluenceConfig;

/// Credentials sent with every request.
#[derive(Clone)]
pub enum Credentials {
    /// Account name plus API token (Confluence Cloud).
    Basic {
        /// Account name, usually an email address.
        username: String,
        /// API token.
        api_token: String,
    },
    /// Personal access token (Confluence Server/Data Center).
    Bearer {
        /// Token value.
        token: String,
    },
}

impl Credentials {
    /// Pick the scheme from configuration: Basic when a username is set.
    #[must_use]
    pub fn from_config(config: &ConfluenceConfig) -> Self {
        match &config.username {
            Some(username) => Self::Basic {
                username: username.clone(),
                api_token: config.api_token.clone(),
            },
            None => Self::Bearer {
                token: config.api_token.clone(),
            },
        }
    }

    /// `Authorization` header value.
    pub(crate) fn header_value(&self) -> String {
        match self {
            Self::Basic {
                username,
                api_token,
            } => format!(
                "Basic {}",
                BASE64_STANDARD.encode(format!("{username}:{api_token}"))
            ),
            Self::Bearer { token } => format!("Bearer {token}"),
        }
    }
}

// Tokens never reach logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("api_token", &"***")
                .finish(),
            Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &"***").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(username: Option<&str>) -> ConfluenceConfig {
        ConfluenceConfig {
            base_url: "https://acme.atlassian.net/wiki".to_owned(),
            space_key: "DOCS".to_owned(),
            username: username.map(str::to_owned),
            api_token: "secret".to_owned(),
        }
    }

    #[test]
    fn test_basic_header() {
        let credentials = Credentials::from_config(&config(Some("me@example.com")));

        // base64("me@example.com:secret")
        assert_eq!(
            credentials.header_value(),
            "Basic bWVAZXhhbXBsZS5jb206c2VjcmV0"
        );
    }

    #[test]
    fn test_bearer_header_without_username() {
        let credentials = Credentials::from_config(&config(None));

        assert_eq!(credentials.header_value(), "Bearer secret");
    }

    #[test]
    fn test_debug_redacts_token() {
        let credentials = Credentials::from_config(&config(Some("me@example.com")));

        let debug = format!("{credentials:?}");

        assert!(debug.contains("me@example.com"));
        assert!(!debug.contains("secret"));
    }
}
