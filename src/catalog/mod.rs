//! Tree catalog backend integration module.
//!
//! Provides the HTTP client, the decoded models, and the `CatalogSource` seam
//! the request runner fetches through.

pub mod client;
pub mod error;
pub mod models;

pub use client::CatalogClient;
pub use error::FetchError;
pub use models::{Article, CatalogItem};

use std::future::Future;

/// Anything that can answer "list all items" and "search items by criteria".
pub trait CatalogSource: Send + Sync + 'static {
    /// Fetch the full catalog.
    fn list_items(&self) -> impl Future<Output = Result<Vec<CatalogItem>, FetchError>> + Send;

    /// Fetch the items matching `query`.
    fn search_items(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<CatalogItem>, FetchError>> + Send;
}
