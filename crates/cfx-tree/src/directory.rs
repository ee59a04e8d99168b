//! Remote page directory abstraction.

use crate::page::{PageId, PageSummary};

/// Source of page summaries for one space.
///
/// Implementations are expected to return complete, already-paginated
/// results. Both operations are idempotent: asking twice for the same page
/// returns the same children.
pub trait PageDirectory {
    /// Error returned by the remote operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// List every page in the space, regardless of nesting level.
    fn list_pages(&self) -> Result<Vec<PageSummary>, Self::Error>;

    /// List the direct children of a page.
    fn child_pages(&self, id: &PageId) -> Result<Vec<PageSummary>, Self::Error>;
}

impl<D: PageDirectory + ?Sized> PageDirectory for &D {
    type Error = D::Error;

    fn list_pages(&self) -> Result<Vec<PageSummary>, Self::Error> {
        (**self).list_pages()
    }

    fn child_pages(&self, id: &PageId) -> Result<Vec<PageSummary>, Self::Error> {
        (**self).child_pages(id)
    }
}
