//! Error types for hierarchy reconstruction.

use crate::page::PageId;

/// Boxed error from a [`PageDirectory`](crate::PageDirectory) implementation.
pub type DirectoryError = Box<dyn std::error::Error + Send + Sync>;

/// Error that aborts a tree build.
///
/// No partial forest is returned: a build either sees every page or fails.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// Listing the pages of the space failed.
    #[error("failed to list pages")]
    ListPages {
        /// Underlying directory error.
        #[source]
        source: DirectoryError,
    },

    /// Fetching the children of a page failed.
    #[error("failed to fetch children of page {page_id}")]
    ChildFetch {
        /// Page whose children could not be fetched.
        page_id: PageId,
        /// Underlying directory error.
        #[source]
        source: DirectoryError,
    },

    /// A page was reported under two different parents (strict policy only).
    #[error("page {page_id} has two parents: {first_parent} and {second_parent}")]
    ConflictingParent {
        /// Child page.
        page_id: PageId,
        /// Parent recorded first.
        first_parent: PageId,
        /// Parent that reported the child later.
        second_parent: PageId,
    },
}

impl BuildError {
    /// Page the error is about, if any.
    #[must_use]
    pub fn page_id(&self) -> Option<&PageId> {
        match self {
            Self::ListPages { .. } => None,
            Self::ChildFetch { page_id, .. } | Self::ConflictingParent { page_id, .. } => {
                Some(page_id)
            }
        }
    }
}
