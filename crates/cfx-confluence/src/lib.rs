//! Confluence integration for cfx.
//!
//! This crate provides the remote side of a space export:
//! - [`ConfluenceClient`]: blocking REST API client with Basic or Bearer
//!   authentication, transparent pagination and retry of transient failures
//! - [`SpaceDirectory`]: adapter exposing one space as a
//!   [`PageDirectory`](cfx_tree::PageDirectory) for tree building
//!
//! # API Client
//!
//! ```ignore
//! use cfx_confluence::{ClientConfig, ConfluenceClient, Credentials, SpaceDirectory};
//! use cfx_tree::TreeBuilder;
//!
//! let client = ConfluenceClient::new(ClientConfig::new(
//!     "https://acme.atlassian.net/wiki",
//!     Credentials::Bearer { token: "pat".to_owned() },
//! ))?;
//!
//! let directory = SpaceDirectory::new(&client, "DOCS");
//! let tree = TreeBuilder::new().build_from_directory(&directory)?;
//! ```

// API client
mod client;
pub use client::{ClientConfig, ConfluenceClient, same_host};

// Authentication
mod auth;
pub use auth::Credentials;

// Page directory adapter
mod directory;
pub use directory::SpaceDirectory;

// Types
pub mod types;

// Errors
pub mod error;
pub use error::ConfluenceError;
