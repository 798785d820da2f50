//! In-memory catalog store.
//!
//! Evaluates compiled predicates directly against a product list. Ordering
//! follows the same rules as the SQL rendering: the sort column with its
//! null placement, then `id` ascending.

use std::cmp::Ordering;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::store::{CatalogPage, CatalogStore};
use super::Product;
use crate::error::CatalogError;
use crate::query::{CatalogQuery, Column, SortClause, SortDirection};

/// Catalog held in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogStore {
    products: Vec<Product>,
}

impl InMemoryCatalogStore {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Load products from a JSON array.
    pub fn from_json(json: &str) -> Result<Self> {
        let products: Vec<Product> =
            serde_json::from_str(json).context("catalog fixtures must be a JSON array of products")?;
        Ok(Self::new(products))
    }

    /// Load products from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog fixtures from {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn fetch(&self, query: &CatalogQuery) -> Result<CatalogPage, CatalogError> {
        let mut matched: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| query.scope.is_empty() || query.scope.contains(&p.category))
            .filter(|p| query.predicate.matches(p))
            .collect();

        matched.sort_by(|a, b| {
            clause_ordering(a, b, &query.sort).then_with(|| a.id.cmp(&b.id))
        });

        let total = matched.len() as u64;
        let products: Vec<Product> = matched
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        debug!(total, returned = products.len(), "in-memory catalog query");
        Ok(CatalogPage { products, total })
    }

    async fn ping(&self) -> Result<(), CatalogError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Sortable value of one column.
#[derive(PartialEq, PartialOrd)]
enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
}

fn sort_value(p: &Product, column: Column) -> Option<SortValue<'_>> {
    match column {
        Column::Price => Some(SortValue::Number(p.price as f64)),
        Column::StockQuantity => Some(SortValue::Number(f64::from(p.stock_quantity))),
        Column::Rating => p.rating.map(SortValue::Number),
        Column::CreatedAt => p
            .created_at
            .map(|t| SortValue::Number(t.timestamp_millis() as f64)),
        Column::Name => Some(SortValue::Text(&p.name)),
        Column::Brand => p.brand.as_deref().map(SortValue::Text),
        Column::Category => Some(SortValue::Text(&p.category)),
        Column::Condition => p.condition.map(|c| SortValue::Text(c.as_str())),
        Column::Description => p.description.as_deref().map(SortValue::Text),
        Column::HasWarranty => Some(SortValue::Number(f64::from(u8::from(p.has_warranty)))),
        // Tie-broken by id afterwards.
        Column::Id => None,
    }
}

fn clause_ordering(a: &Product, b: &Product, clause: &SortClause) -> Ordering {
    let descending = clause.direction == SortDirection::Desc;
    // PostgreSQL puts NULLs first for DESC unless told otherwise.
    let nulls_last = clause.nulls_last || !descending;

    match (sort_value(a, clause.column), sort_value(b, clause.column)) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending { ord.reverse() } else { ord }
        }
        (Some(_), None) if nulls_last => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) if nulls_last => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
