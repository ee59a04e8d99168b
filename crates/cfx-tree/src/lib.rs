//! Page hierarchy reconstruction for cfx.
//!
//! Confluence lists every page of a space flatly and only reveals nesting
//! through per-page child lookups. This crate turns those two views into a
//! deduplicated forest:
//!
//! - [`PageDirectory`] abstracts the remote "list pages" and "list children"
//!   operations
//! - [`TreeBuilder`] walks the directory breadth-first and records each
//!   parent/child edge exactly once
//! - [`PageTree`] is the resulting arena-backed forest
//! - [`MockDirectory`] serves pages from memory (behind the `mock` feature)
//!
//! # Example
//!
//! ```ignore
//! use cfx_tree::{PageDirectory, TreeBuilder};
//!
//! let tree = TreeBuilder::new().build_from_directory(&directory)?;
//! for (depth, node) in tree.walk() {
//!     println!("{}{}", "  ".repeat(depth), tree.node(node).title);
//! }
//! ```

mod builder;
mod directory;
mod error;
#[cfg(feature = "mock")]
mod mock;
mod page;
mod tree;

pub use builder::{ParentPolicy, TreeBuilder};
pub use directory::PageDirectory;
pub use error::BuildError;
#[cfg(feature = "mock")]
pub use mock::{MockDirectory, MockError};
pub use page::{PageId, PageSummary};
pub use tree::{NestedPage, NodeId, PageNode, PageTree, Walk};
