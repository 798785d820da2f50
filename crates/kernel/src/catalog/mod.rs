//! Catalog data and stores.
//!
//! This module provides:
//! - Product: catalog row with a semi-structured spec bag
//! - CategoryScope: taxonomy-aware listing scope
//! - CatalogStore: the async store contract, with PostgreSQL and in-memory backends

pub mod category;
pub mod memory;
pub mod postgres;
pub mod product;
pub mod store;

pub use category::CategoryScope;
pub use memory::InMemoryCatalogStore;
pub use postgres::PgCatalogStore;
pub use product::Product;
pub use store::{CatalogPage, CatalogStore};
