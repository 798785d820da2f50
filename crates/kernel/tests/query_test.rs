#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Compiled queries run against the fixture catalog.

mod common;

use catalog_filter::catalog::{CatalogPage, CatalogStore, CategoryScope};
use catalog_filter::filter::{FilterSelection, ProcessorType, ScreenSize, StorageType};
use catalog_filter::query::{CatalogSqlBuilder, QueryCompiler};

async fn run(selection: &FilterSelection, category: &str) -> CatalogPage {
    let query =
        QueryCompiler::new(24).compile(selection, &CategoryScope::resolve(category), 1);
    common::fixture_store().fetch(&query).await.unwrap()
}

fn names(page: &CatalogPage) -> Vec<&str> {
    let mut names: Vec<&str> = page.products.iter().map(|p| p.name.as_str()).collect();
    names.sort_unstable();
    names
}

#[tokio::test]
async fn laptop_listing_spans_child_categories() {
    let page = run(&FilterSelection::default(), "laptops").await;
    assert_eq!(page.total, 5);

    let page = run(&FilterSelection::default(), "business-laptops").await;
    assert_eq!(names(&page), ["EliteBook 840", "Latitude 5440"]);
}

#[tokio::test]
async fn processor_family_matches_description() {
    let mut s = FilterSelection::default();
    s.toggle_processor_type(ProcessorType::IntelI5);
    let page = run(&s, "laptops").await;
    assert_eq!(names(&page), ["EliteBook 840", "Latitude 5440"]);
}

#[tokio::test]
async fn storage_both_requires_ssd_and_hdd() {
    let mut s = FilterSelection::default();
    s.toggle_storage_type(StorageType::Both);
    let page = run(&s, "laptops").await;
    assert_eq!(names(&page), ["EliteBook 840"]);
}

#[tokio::test]
async fn ram_and_screen_compare_numerically() {
    let mut s = FilterSelection::default();
    s.toggle_laptop_ram_size(16);
    let page = run(&s, "laptops").await;
    assert_eq!(names(&page), ["Latitude 5440", "XPS 15"]);

    let mut s = FilterSelection::default();
    s.toggle_screen_size(ScreenSize::from_tenths(140).unwrap());
    let page = run(&s, "laptops").await;
    assert_eq!(names(&page), ["EliteBook 840", "Latitude 5440"]);
}

#[tokio::test]
async fn stock_and_search() {
    let mut s = FilterSelection::default();
    s.set_in_stock(Some(true));
    assert_eq!(run(&s, "laptops").await.total, 4);

    s.set_in_stock(Some(false));
    assert_eq!(names(&run(&s, "laptops").await), ["MacBook Air"]);

    let mut s = FilterSelection::default();
    s.set_search_query(Some("oled"));
    assert_eq!(names(&run(&s, "laptops").await), ["XPS 15"]);
}

#[tokio::test]
async fn brand_and_price_combine() {
    let mut s = FilterSelection::default();
    s.toggle_brand("Dell");
    s.set_price_range(Some(1000), None);
    assert_eq!(names(&run(&s, "laptops").await), ["XPS 15"]);

    // Dell also sells desktops; scope keeps them out.
    let mut s = FilterSelection::default();
    s.toggle_brand("Dell");
    assert_eq!(run(&s, "laptops").await.total, 2);
    assert_eq!(run(&s, "desktops").await.total, 1);
}

#[tokio::test]
async fn desktop_gpu_flag_reads_string_booleans() {
    let mut s = FilterSelection::default();
    s.set_has_gpu(Some(false));
    assert_eq!(names(&run(&s, "desktops").await), ["OptiPlex 7010"]);
}

#[tokio::test]
async fn foreign_extension_block_is_ignored() {
    let mut s = FilterSelection::default();
    s.toggle_ram_type("DDR5");
    assert!(s.component().is_some());

    assert_eq!(run(&s, "laptops").await.total, 5);
    assert_eq!(names(&run(&s, "components").await), ["Vengeance 32GB"]);
}

#[test]
fn count_and_page_share_where_clause() {
    let mut s = FilterSelection::default();
    s.toggle_brand("Dell");
    s.toggle_processor_type(ProcessorType::IntelI7);
    s.set_search_query(Some("oled"));
    let query = QueryCompiler::new(24).compile(&s, &CategoryScope::resolve("laptops"), 2);

    let builder = CatalogSqlBuilder::new(&query);
    let page_sql = builder.build();
    let count_sql = builder.build_count();

    let page_where = page_sql
        .split_once(" WHERE ")
        .and_then(|(_, rest)| rest.split_once(" ORDER BY "))
        .map(|(clause, _)| clause)
        .unwrap();
    let count_where = count_sql.split_once(" WHERE ").map(|(_, rest)| rest).unwrap();

    assert_eq!(page_where, count_where);
    assert!(page_sql.contains("OFFSET 24"));
    assert!(!count_sql.contains("LIMIT"));
}
