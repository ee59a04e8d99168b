//! Page identifiers and summaries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque page identifier, unique within a space.
///
/// Confluence content ids are numeric strings, but nothing here relies on
/// that; ids are compared and hashed as plain strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Create a page id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Minimal remote representation of a page.
///
/// Deserializes straight from Confluence content JSON. Serde ignores every
/// other field of the content object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    /// Page ID.
    pub id: PageId,
    /// Page title. Not guaranteed to be unique within a space.
    pub title: String,
}

impl PageSummary {
    /// Create a page summary.
    pub fn new(id: impl Into<PageId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}
