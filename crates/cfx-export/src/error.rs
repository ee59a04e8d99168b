//! Error types for exporting.

use std::io;
use std::path::PathBuf;

use cfx_tree::PageId;

/// Error that aborts an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Fetching a page body failed.
    #[error("failed to fetch page {page_id}")]
    Fetch {
        page_id: PageId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Writing the mirror failed.
    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
