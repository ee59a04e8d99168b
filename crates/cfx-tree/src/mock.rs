//! Mock page directory for testing.
//!
//! Provides [`MockDirectory`] for exercising tree consumers without a
//! Confluence server.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::directory::PageDirectory;
use crate::page::{PageId, PageSummary};

/// Error returned by [`MockDirectory`] for pages configured to fail.
#[derive(Debug, thiserror::Error)]
#[error("mock failure for page {0}")]
pub struct MockError(pub PageId);

/// In-memory page directory.
///
/// # Example
///
/// ```ignore
/// use cfx_tree::{MockDirectory, TreeBuilder};
///
/// let directory = MockDirectory::new()
///     .with_page("1", "Home")
///     .with_child("1", "2", "Guide");
///
/// let tree = TreeBuilder::new().build_from_directory(&directory)?;
/// ```
#[derive(Debug, Default)]
pub struct MockDirectory {
    pages: Vec<PageSummary>,
    children: HashMap<PageId, Vec<PageSummary>>,
    failing: Vec<PageId>,
    calls: RwLock<Vec<PageId>>,
}

impl MockDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page to the space listing.
    #[must_use]
    pub fn with_page(mut self, id: &str, title: &str) -> Self {
        self.pages.push(PageSummary::new(id, title));
        self
    }

    /// Report `id` as a child of `parent`.
    #[must_use]
    pub fn with_child(mut self, parent: &str, id: &str, title: &str) -> Self {
        self.children
            .entry(PageId::from(parent))
            .or_default()
            .push(PageSummary::new(id, title));
        self
    }

    /// Make child lookups for `id` fail.
    #[must_use]
    pub fn failing_on(mut self, id: &str) -> Self {
        self.failing.push(PageId::from(id));
        self
    }

    /// Page ids passed to [`PageDirectory::child_pages`], in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<PageId> {
        self.calls.read().unwrap().clone()
    }
}

impl PageDirectory for MockDirectory {
    type Error = MockError;

    fn list_pages(&self) -> Result<Vec<PageSummary>, MockError> {
        Ok(self.pages.clone())
    }

    fn child_pages(&self, id: &PageId) -> Result<Vec<PageSummary>, MockError> {
        self.calls.write().unwrap().push(id.clone());
        if self.failing.contains(id) {
            return Err(MockError(id.clone()));
        }
        Ok(self.children.get(id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls() {
        let directory = MockDirectory::new().with_child("1", "2", "Child");

        let children = directory.child_pages(&PageId::from("1")).unwrap();

        assert_eq!(children, vec![PageSummary::new("2", "Child")]);
        assert_eq!(directory.calls(), vec![PageId::from("1")]);
    }

    #[test]
    fn test_mock_failure() {
        let directory = MockDirectory::new().failing_on("9");

        let err = directory.child_pages(&PageId::from("9")).unwrap_err();

        assert_eq!(err.to_string(), "mock failure for page 9");
    }
}
