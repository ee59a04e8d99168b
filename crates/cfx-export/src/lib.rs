//! Offline HTML mirror of a Confluence space.
//!
//! Takes the forest built by `cfx-tree` and writes one HTML file per page
//! plus a nested index:
//!
//! - [`Exporter`] fetches page bodies through a [`PageContent`] source,
//!   localizes images and writes the mirror
//! - [`sanitize_filename`] and [`NameAllocator`] turn titles into unique,
//!   portable directory names
//! - [`rewrite_images`] repoints same-host `<img>` tags at local copies
//! - [`render_page`] and [`render_index`] produce the HTML
//!
//! # Example
//!
//! ```ignore
//! use cfx_export::{ExportOptions, Exporter};
//!
//! let options = ExportOptions {
//!     output_dir: "export".into(),
//!     download_images: true,
//!     title: "DOCS".to_owned(),
//! };
//! let summary = Exporter::new(&client, options).export(&tree)?;
//! ```

mod error;
mod exporter;
mod images;
mod sanitize;
mod source;
mod template;

pub use error::ExportError;
pub use exporter::{ExportOptions, ExportSummary, Exporter, INDEX_FILE};
pub use images::{IMAGES_DIR, ImageRef, RewrittenHtml, rewrite_images};
pub use sanitize::{MAX_NAME_LEN, NameAllocator, sanitize_filename};
pub use source::{PageBody, PageContent};
pub use template::{
    BreadcrumbData, IndexData, IndexEntryData, PageData, render_index, render_page,
};
