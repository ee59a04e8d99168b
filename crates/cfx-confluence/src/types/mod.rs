//! Confluence API response types.
//!
//! Only fields that are actually used are declared. Serde ignores the rest
//! of the API response.

mod page;

pub use page::{Body, ContentPage, Links, Page, Representation, Version};
