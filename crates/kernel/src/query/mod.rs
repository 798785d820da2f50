//! Query compilation.
//!
//! This module provides:
//! - Predicate: store-agnostic AND-of-ORs filter tree
//! - Compiler: FilterSelection + CategoryScope to CatalogQuery
//! - Eval: in-memory matching of predicates against products
//! - SQL: PostgreSQL rendering via SeaQuery

pub mod compiler;
mod eval;
pub mod predicate;
pub mod sql;

pub use compiler::{
    CatalogQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, QueryCompiler, SortClause, SortDirection,
    compile_predicate, compile_sort,
};
pub use predicate::{Column, Field, Number, Predicate};
pub use sql::CatalogSqlBuilder;
