//! Catalog filter kernel library.
//!
//! Faceted filter model, address codec, query compiler, facet aggregator,
//! sort engine and the listing controller that ties them together. The
//! `catalog-filter` binary serves the listing API on top of this library.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod facets;
pub mod filter;
pub mod query;
pub mod routes;
pub mod sort;
pub mod state;
