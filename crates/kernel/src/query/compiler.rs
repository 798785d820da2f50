//! Query compiler.
//!
//! Translates a [`FilterSelection`] plus a [`CategoryScope`] into a
//! [`CatalogQuery`]: members of one facet combine with OR, distinct facets
//! combine with AND. Category extension attributes match the product spec
//! bag; a product without the key simply fails that branch.

use serde::Serialize;
use tracing::debug;

use super::predicate::{Column, Field, Number, Predicate};
use crate::catalog::CategoryScope;
use crate::catalog::product::spec_keys;
use crate::filter::{
    CategoryExtension, ComponentFilters, DesktopFilters, FilterSelection, LaptopFilters, SortKey,
    StorageType,
};

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: u32 = 24;

/// Maximum number of products per page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Server-side ordering. Rows tie-break on `id ASC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortClause {
    pub column: Column,
    pub direction: SortDirection,
    /// Place rows without a value after all others.
    pub nulls_last: bool,
}

impl SortClause {
    /// Newest first; used whenever a sort key has no stored column.
    pub const DEFAULT: SortClause = SortClause {
        column: Column::CreatedAt,
        direction: SortDirection::Desc,
        nulls_last: true,
    };
}

/// Everything a catalog store needs to answer one listing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogQuery {
    /// Category slugs; empty means the whole catalog.
    pub scope: Vec<String>,
    pub predicate: Predicate,
    pub sort: SortClause,
    /// Ordering the caller applies to the fetched page because the store
    /// cannot express it.
    pub client_sort: Option<SortKey>,
    pub offset: u64,
    pub limit: u64,
}

/// Compiles selections with a fixed page size.
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler {
    page_size: u32,
}

impl Default for QueryCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryCompiler {
    /// Page size is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Compile one page (1-based) of a listing.
    pub fn compile(
        &self,
        selection: &FilterSelection,
        scope: &CategoryScope,
        page: u32,
    ) -> CatalogQuery {
        let (sort, client_sort) = compile_sort(selection.effective_sort());
        let page = page.max(1);

        CatalogQuery {
            scope: scope.categories.clone(),
            predicate: compile_predicate(selection, scope),
            sort,
            client_sort,
            offset: u64::from(page - 1) * u64::from(self.page_size),
            limit: u64::from(self.page_size),
        }
    }
}

/// Compile the filter part of a selection.
///
/// An extension block whose kind differs from the scope's kind is ignored;
/// without a scope kind the block applies as-is.
pub fn compile_predicate(selection: &FilterSelection, scope: &CategoryScope) -> Predicate {
    let mut parts = Vec::new();

    if selection.price_min.is_some() || selection.price_max.is_some() {
        parts.push(Predicate::Range {
            field: Field::Column(Column::Price),
            min: selection.price_min.map(Number::Int),
            max: selection.price_max.map(Number::Int),
        });
    }

    if !selection.brands.is_empty() {
        parts.push(one_of(Field::Column(Column::Brand), selection.brands.iter()));
    }

    if !selection.conditions.is_empty() {
        parts.push(one_of(
            Field::Column(Column::Condition),
            selection.conditions.iter().map(|c| c.as_str()),
        ));
    }

    if let Some(in_stock) = selection.in_stock {
        let field = Field::Column(Column::StockQuantity);
        parts.push(if in_stock {
            Predicate::Range {
                field,
                min: Some(Number::Int(1)),
                max: None,
            }
        } else {
            Predicate::Range {
                field,
                min: None,
                max: Some(Number::Int(0)),
            }
        });
    }

    if let Some(has_warranty) = selection.has_warranty {
        parts.push(Predicate::Flag {
            field: Field::Column(Column::HasWarranty),
            value: has_warranty,
        });
    }

    if let Some(rating) = selection.min_rating {
        parts.push(Predicate::Range {
            field: Field::Column(Column::Rating),
            min: Some(Number::Float(rating)),
            max: None,
        });
    }

    if let Some(ref q) = selection.search_query {
        parts.push(Predicate::any(
            [Column::Name, Column::Brand, Column::Description]
                .into_iter()
                .map(|column| Predicate::Contains {
                    field: Field::Column(column),
                    needle: q.clone(),
                })
                .collect(),
        ));
    }

    if let Some(ref extension) = selection.extension {
        match scope.kind {
            Some(kind) if kind != extension.kind() => {
                debug!(
                    block = %extension.kind(),
                    scope = %kind,
                    "extension block does not apply to this category; ignoring"
                );
            }
            _ => match extension {
                CategoryExtension::Laptop(l) => laptop_parts(l, &mut parts),
                CategoryExtension::Desktop(d) => desktop_parts(d, &mut parts),
                CategoryExtension::Component(c) => component_parts(c, &mut parts),
            },
        }
    }

    Predicate::all(parts)
}

/// Map a sort key to a server ordering plus an optional client-side pass.
///
/// `best-selling` has no sales signal and orders by rating; `biggest-discount`
/// has no stored column, so the store orders newest first and the page is
/// re-sorted client-side.
pub fn compile_sort(key: SortKey) -> (SortClause, Option<SortKey>) {
    let clause = |column, direction, nulls_last| SortClause {
        column,
        direction,
        nulls_last,
    };

    match key {
        SortKey::PriceAsc => (clause(Column::Price, SortDirection::Asc, false), None),
        SortKey::PriceDesc => (clause(Column::Price, SortDirection::Desc, false), None),
        SortKey::Newest => (SortClause::DEFAULT, None),
        SortKey::HighestRated => (clause(Column::Rating, SortDirection::Desc, true), None),
        SortKey::BestSelling => {
            debug!("no sales signal available; best-selling falls back to rating order");
            (clause(Column::Rating, SortDirection::Desc, true), None)
        }
        SortKey::BiggestDiscount => {
            debug!("discount has no stored column; sorting the page client-side");
            (SortClause::DEFAULT, Some(SortKey::BiggestDiscount))
        }
    }
}

fn one_of<S: AsRef<str>>(field: Field, values: impl Iterator<Item = S>) -> Predicate {
    Predicate::OneOf {
        field,
        values: values.map(|v| v.as_ref().to_string()).collect(),
    }
}

fn contains_any<S: AsRef<str>>(key: &'static str, needles: impl Iterator<Item = S>) -> Predicate {
    Predicate::any(
        needles
            .map(|n| Predicate::Contains {
                field: Field::Spec(key),
                needle: n.as_ref().to_string(),
            })
            .collect(),
    )
}

fn equals_any<T: ToString>(key: &'static str, values: impl Iterator<Item = T>) -> Predicate {
    Predicate::any(
        values
            .map(|v| Predicate::SpecEquals {
                key,
                value: v.to_string(),
            })
            .collect(),
    )
}

fn laptop_parts(laptop: &LaptopFilters, parts: &mut Vec<Predicate>) {
    if !laptop.processor_types.is_empty() {
        parts.push(contains_any(
            spec_keys::PROCESSOR,
            laptop.processor_types.iter().map(|p| p.needle()),
        ));
    }
    if !laptop.ram_sizes.is_empty() {
        parts.push(equals_any(spec_keys::RAM_GB, laptop.ram_sizes.iter()));
    }
    if !laptop.storage_types.is_empty() {
        parts.push(Predicate::any(
            laptop
                .storage_types
                .iter()
                .map(|s| storage_predicate(*s))
                .collect(),
        ));
    }
    if !laptop.screen_sizes.is_empty() {
        parts.push(equals_any(spec_keys::SCREEN_SIZE, laptop.screen_sizes.iter()));
    }
    if !laptop.graphics_types.is_empty() {
        parts.push(contains_any(spec_keys::GRAPHICS, laptop.graphics_types.iter()));
    }
}

fn storage_predicate(storage: StorageType) -> Predicate {
    let contains = |needle: &str| Predicate::Contains {
        field: Field::Spec(spec_keys::STORAGE_TYPE),
        needle: needle.to_string(),
    };
    match storage {
        StorageType::Ssd => contains("ssd"),
        StorageType::Hdd => contains("hdd"),
        StorageType::Both => Predicate::all(vec![contains("ssd"), contains("hdd")]),
    }
}

fn desktop_parts(desktop: &DesktopFilters, parts: &mut Vec<Predicate>) {
    if !desktop.cpu_types.is_empty() {
        parts.push(contains_any(spec_keys::CPU, desktop.cpu_types.iter()));
    }
    if !desktop.ram_sizes.is_empty() {
        parts.push(equals_any(spec_keys::RAM_GB, desktop.ram_sizes.iter()));
    }
    if let Some(has_gpu) = desktop.has_gpu {
        parts.push(Predicate::Flag {
            field: Field::Spec(spec_keys::DEDICATED_GPU),
            value: has_gpu,
        });
    }
}

fn component_parts(component: &ComponentFilters, parts: &mut Vec<Predicate>) {
    if !component.ram_types.is_empty() {
        parts.push(contains_any(spec_keys::RAM_TYPE, component.ram_types.iter()));
    }
    if !component.ssd_types.is_empty() {
        parts.push(contains_any(spec_keys::SSD_TYPE, component.ssd_types.iter()));
    }
    if !component.psu_certifications.is_empty() {
        parts.push(contains_any(
            spec_keys::PSU_CERTIFICATION,
            component.psu_certifications.iter(),
        ));
    }
}
