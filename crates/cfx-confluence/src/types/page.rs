//! Confluence content types.

use serde::Deserialize;

/// Confluence page with expanded body.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Version information (present when `version` is expanded).
    #[serde(default)]
    pub version: Option<Version>,
    /// Page body content.
    #[serde(default)]
    pub body: Option<Body>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl Page {
    /// Rendered HTML of the page, empty when `body.view` was not expanded.
    #[must_use]
    pub fn view_html(&self) -> &str {
        self.body
            .as_ref()
            .and_then(|b| b.view.as_ref())
            .map_or("", |v| v.value.as_str())
    }
}

/// Page version.
#[derive(Debug, Clone, Deserialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// Last modification timestamp (ISO 8601).
    #[serde(default)]
    pub when: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, Deserialize)]
pub struct Body {
    /// Rendered HTML.
    #[serde(default)]
    pub view: Option<Representation>,
}

/// A body representation.
#[derive(Debug, Clone, Deserialize)]
pub struct Representation {
    /// Content in this representation.
    pub value: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, Deserialize)]
pub struct Links {
    /// Web UI link, relative to the base URL.
    #[serde(default)]
    pub webui: Option<String>,
    /// Next result page, present only when more results exist.
    #[serde(default)]
    pub next: Option<String>,
}

/// One page of a paginated content listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentPage<T> {
    /// Results in this page.
    pub results: Vec<T>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl<T> ContentPage<T> {
    /// Whether another request is needed to see all results.
    ///
    /// Confluence advertises further pages through `_links.next`. Responses
    /// without `_links` fall back to comparing against the requested limit.
    #[must_use]
    pub fn has_more(&self, limit: usize) -> bool {
        if self.results.is_empty() {
            return false;
        }
        match &self.links {
            Some(links) => links.next.is_some(),
            None => self.results.len() >= limit,
        }
    }
}
