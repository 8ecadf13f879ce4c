//! Traits and types for interacting with the remote CMS collection store.

pub mod content_store;

pub use content_store::{CmsItem, ContentStore, ItemPage, PAGE_SIZE};
