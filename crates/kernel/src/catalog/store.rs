//! Catalog store contract.

use async_trait::async_trait;
use serde::Serialize;

use super::Product;
use crate::error::CatalogError;
use crate::query::CatalogQuery;

/// One page of results plus the total match count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    /// Matches across all pages.
    pub total: u64,
}

/// A store that executes compiled catalog queries.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Run a compiled query: one page of rows and the unpaged total.
    async fn fetch(&self, query: &CatalogQuery) -> Result<CatalogPage, CatalogError>;

    /// Check that the store can answer queries.
    async fn ping(&self) -> Result<(), CatalogError>;

    /// Backend name for logs ("postgres", "memory").
    fn backend(&self) -> &'static str;
}
