//! Confluence space as a page directory.

use cfx_tree::{PageDirectory, PageId, PageSummary};

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;

/// One space of a Confluence instance, seen as a [`PageDirectory`].
#[derive(Clone, Copy)]
pub struct SpaceDirectory<'a> {
    client: &'a ConfluenceClient,
    space_key: &'a str,
}

impl<'a> SpaceDirectory<'a> {
    /// Create a directory over `space_key`.
    #[must_use]
    pub fn new(client: &'a ConfluenceClient, space_key: &'a str) -> Self {
        Self { client, space_key }
    }
}

impl PageDirectory for SpaceDirectory<'_> {
    type Error = ConfluenceError;

    fn list_pages(&self) -> Result<Vec<PageSummary>, Self::Error> {
        self.client.list_pages(self.space_key)
    }

    fn child_pages(&self, page_id: &PageId) -> Result<Vec<PageSummary>, Self::Error> {
        self.client.child_pages(page_id)
    }
}
