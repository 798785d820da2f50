//! Listing API.
//!
//! `GET /api/listing/{category}` takes the address text as its query string,
//! plus an optional `page` parameter, and returns one page of products with
//! the decoded selection, its chips and facet counts.

use axum::extract::{Path, RawQuery, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::catalog::{CategoryScope, Product};
use crate::controller::{FetchOutcome, ListingController};
use crate::error::{AppError, AppResult};
use crate::facets::FacetCounts;
use crate::filter::{ActiveFilter, FilterSelection};
use crate::state::AppState;

/// Create the listing router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/listing/{category}", get(listing))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingResponse {
    selection: FilterSelection,
    address: String,
    active_filters: Vec<ActiveFilter>,
    active_count: usize,
    items: Vec<Product>,
    total: u64,
    page: u32,
    per_page: u32,
    total_pages: u64,
    facets: FacetCounts,
}

async fn listing(
    State(state): State<AppState>,
    Path(category): Path<String>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<ListingResponse>> {
    let address = query.unwrap_or_default();
    let page = page_param(&address)?;

    let controller = ListingController::from_address(
        state.store().clone(),
        CategoryScope::resolve(&category),
        state.listing_settings(),
        &address,
    );
    controller.set_page(page);

    let view = match controller.refresh().await {
        FetchOutcome::Applied(view) => view,
        FetchOutcome::Failed(e) => return Err(e.into()),
        FetchOutcome::Superseded => {
            return Err(AppError::Internal(anyhow::anyhow!(
                "listing request superseded"
            )));
        }
    };

    Ok(Json(ListingResponse {
        selection: controller.selection(),
        address: controller.address(),
        active_filters: controller.active_filters(),
        active_count: controller.active_count(),
        items: view.products,
        total: view.total,
        page: view.page,
        per_page: view.per_page,
        total_pages: view.total_pages,
        facets: view.facets,
    }))
}

/// The 1-based `page` parameter; the last occurrence wins.
fn page_param(query: &str) -> AppResult<u32> {
    let mut page = 1;
    for pair in query.trim_start_matches('?').split('&') {
        if let Some(value) = pair.strip_prefix("page=") {
            page = value
                .parse::<u32>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or_else(|| AppError::BadRequest("page must be a positive integer".to_string()))?;
        }
    }
    Ok(page)
}
