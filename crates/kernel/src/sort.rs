//! Client-side product ordering.
//!
//! Used for sort keys the catalog store cannot express and for stores
//! that order in memory. All comparisons are stable: products that compare
//! equal keep their input order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::catalog::Product;
use crate::filter::SortKey;

/// Return `products` ordered by `key`.
pub fn sort(mut products: Vec<Product>, key: SortKey) -> Vec<Product> {
    sort_in_place(&mut products, key);
    products
}

/// Order a slice by `key`.
pub fn sort_in_place(products: &mut [Product], key: SortKey) {
    products.sort_by(|a, b| compare(a, b, key));
}

/// Comparator for one sort key.
///
/// Missing timestamps count as the epoch, missing ratings as zero, and a
/// product without an original price has no discount. `best-selling` has no
/// sales signal and orders by rating.
pub fn compare(a: &Product, b: &Product, key: SortKey) -> Ordering {
    match key {
        SortKey::PriceAsc => a.price.cmp(&b.price),
        SortKey::PriceDesc => b.price.cmp(&a.price),
        SortKey::Newest => created(b).cmp(&created(a)),
        SortKey::HighestRated | SortKey::BestSelling => rating(b).total_cmp(&rating(a)),
        SortKey::BiggestDiscount => b.discount_ratio().total_cmp(&a.discount_ratio()),
    }
}

fn created(p: &Product) -> DateTime<Utc> {
    p.created_at.unwrap_or(DateTime::UNIX_EPOCH)
}

fn rating(p: &Product) -> f64 {
    p.rating.unwrap_or(0.0)
}
