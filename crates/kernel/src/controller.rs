//! Listing controller.
//!
//! Owns the live [`FilterSelection`] of one listing view. Every mutator
//! updates the selection and its address text synchronously, then issues a
//! fetch tagged with a monotonically increasing sequence number. Results are
//! applied only when their sequence number is still the latest, so a slow
//! response to an older mutation can never overwrite newer results.
//!
//! Observers either subscribe to [`ListingEvent`]s (push) or call
//! [`ListingController::refresh`] after mutating (pull).

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::catalog::{CatalogStore, CategoryScope, Product};
use crate::error::CatalogError;
use crate::facets::{FacetCounts, aggregate};
use crate::filter::{
    ActiveFilter, Condition, FilterSelection, ProcessorType, ScreenSize, SortKey, StorageType,
    active_count, active_filters, decode_for_kind, encode,
};
use crate::query::{DEFAULT_PAGE_SIZE, QueryCompiler};
use crate::sort::sort_in_place;

/// Capacity of the event channel; slow subscribers see `Lagged`.
const EVENT_CAPACITY: usize = 64;

/// Controller tuning.
#[derive(Debug, Clone, Copy)]
pub struct ListingSettings {
    pub page_size: u32,
    /// Quiet period between a mutation and its fetch. Mutations inside the
    /// window coalesce into one fetch.
    pub debounce: Duration,
    /// Spawn a fetch after every mutation. When off, callers drive fetches
    /// with [`ListingController::refresh`].
    pub auto_fetch: bool,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: Duration::from_millis(150),
            auto_fetch: true,
        }
    }
}

/// The last successfully applied fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    /// Request sequence number that produced this view.
    pub seq: u64,
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
    pub facets: FacetCounts,
}

/// Notifications emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingEvent {
    /// The selection changed; `address` is the new address text.
    AddressChanged { seq: u64, address: String },
    /// Results of request `seq` are now visible.
    ResultsApplied { seq: u64, total: u64 },
    /// Request `seq` failed; the previous view stays in place.
    FetchFailed { seq: u64, error: String },
    /// Request `seq` completed after a newer one was issued.
    StaleDiscarded { seq: u64 },
}

/// Result of a pull-based fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    Applied(ListingView),
    /// A newer request was issued while this one was in flight.
    Superseded,
    Failed(CatalogError),
}

/// Handle to one listing's filter state. Cloning shares the state.
#[derive(Clone)]
pub struct ListingController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    store: Arc<dyn CatalogStore>,
    scope: CategoryScope,
    compiler: QueryCompiler,
    settings: ListingSettings,
    state: RwLock<ListingState>,
    events: broadcast::Sender<ListingEvent>,
}

struct ListingState {
    selection: FilterSelection,
    address: String,
    page: u32,
    /// Sequence number of the most recently issued request.
    issued: u64,
    view: Option<ListingView>,
    last_error: Option<String>,
}

impl ListingController {
    /// Controller with an empty selection.
    pub fn new(
        store: Arc<dyn CatalogStore>,
        scope: CategoryScope,
        settings: ListingSettings,
    ) -> Self {
        Self::with_selection(store, scope, settings, FilterSelection::default())
    }

    /// Bootstrap from address text (page load or deep link). Extension keys
    /// are read for the scope's category kind.
    pub fn from_address(
        store: Arc<dyn CatalogStore>,
        scope: CategoryScope,
        settings: ListingSettings,
        address: &str,
    ) -> Self {
        let selection = decode_for_kind(address, scope.kind);
        Self::with_selection(store, scope, settings, selection)
    }

    fn with_selection(
        store: Arc<dyn CatalogStore>,
        scope: CategoryScope,
        settings: ListingSettings,
        selection: FilterSelection,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let address = encode(&selection);

        Self {
            inner: Arc::new(ControllerInner {
                store,
                compiler: QueryCompiler::new(settings.page_size),
                scope,
                settings,
                state: RwLock::new(ListingState {
                    selection,
                    address,
                    page: 1,
                    issued: 0,
                    view: None,
                    last_error: None,
                }),
                events,
            }),
        }
    }

    /// Subscribe to controller events.
    pub fn subscribe(&self) -> broadcast::Receiver<ListingEvent> {
        self.inner.events.subscribe()
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn selection(&self) -> FilterSelection {
        self.inner.state.read().selection.clone()
    }

    /// Address text mirroring the current selection.
    pub fn address(&self) -> String {
        self.inner.state.read().address.clone()
    }

    pub fn page(&self) -> u32 {
        self.inner.state.read().page
    }

    pub fn scope(&self) -> &CategoryScope {
        &self.inner.scope
    }

    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        active_filters(&self.inner.state.read().selection)
    }

    pub fn active_count(&self) -> usize {
        active_count(&self.inner.state.read().selection)
    }

    /// Last applied results, if any fetch has succeeded.
    pub fn view(&self) -> Option<ListingView> {
        self.inner.state.read().view.clone()
    }

    /// Facet counts of the last applied results.
    pub fn facets(&self) -> FacetCounts {
        self.inner
            .state
            .read()
            .view
            .as_ref()
            .map(|v| v.facets.clone())
            .unwrap_or_default()
    }

    /// Error of the most recent failed fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.inner.state.read().last_error.clone()
    }

    /// Sequence number of the most recently issued request.
    pub fn latest_seq(&self) -> u64 {
        self.inner.state.read().issued
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    pub fn toggle_brand(&self, brand: &str) {
        self.mutate(|s| s.toggle_brand(brand));
    }

    pub fn toggle_condition(&self, condition: Condition) {
        self.mutate(|s| s.toggle_condition(condition));
    }

    /// Set both price bounds; inverted bounds are swapped.
    pub fn set_price_range(&self, min: Option<i64>, max: Option<i64>) {
        self.mutate(|s| s.set_price_range(min, max));
    }

    pub fn set_price_min(&self, min: Option<i64>) {
        self.mutate(|s| s.set_price_min(min));
    }

    pub fn set_price_max(&self, max: Option<i64>) {
        self.mutate(|s| s.set_price_max(max));
    }

    pub fn clear_price_range(&self) {
        self.set_price_range(None, None);
    }

    pub fn set_in_stock(&self, in_stock: Option<bool>) {
        self.mutate(|s| s.set_in_stock(in_stock));
    }

    pub fn set_has_warranty(&self, has_warranty: Option<bool>) {
        self.mutate(|s| s.set_has_warranty(has_warranty));
    }

    pub fn set_min_rating(&self, rating: Option<f64>) {
        self.mutate(|s| s.set_min_rating(rating));
    }

    pub fn set_sort_by(&self, sort: Option<SortKey>) {
        self.mutate(|s| s.set_sort_by(sort));
    }

    pub fn set_search_query(&self, query: Option<&str>) {
        self.mutate(|s| s.set_search_query(query));
    }

    pub fn toggle_processor_type(&self, processor: ProcessorType) {
        self.mutate(|s| s.toggle_processor_type(processor));
    }

    pub fn toggle_laptop_ram_size(&self, gigabytes: u32) {
        self.mutate(|s| s.toggle_laptop_ram_size(gigabytes));
    }

    pub fn toggle_storage_type(&self, storage: StorageType) {
        self.mutate(|s| s.toggle_storage_type(storage));
    }

    pub fn toggle_screen_size(&self, size: ScreenSize) {
        self.mutate(|s| s.toggle_screen_size(size));
    }

    pub fn toggle_graphics_type(&self, graphics: &str) {
        self.mutate(|s| s.toggle_graphics_type(graphics));
    }

    pub fn toggle_cpu_type(&self, cpu: &str) {
        self.mutate(|s| s.toggle_cpu_type(cpu));
    }

    pub fn toggle_desktop_ram_size(&self, gigabytes: u32) {
        self.mutate(|s| s.toggle_desktop_ram_size(gigabytes));
    }

    pub fn set_has_gpu(&self, has_gpu: Option<bool>) {
        self.mutate(|s| s.set_has_gpu(has_gpu));
    }

    pub fn toggle_ram_type(&self, ram_type: &str) {
        self.mutate(|s| s.toggle_ram_type(ram_type));
    }

    pub fn toggle_ssd_type(&self, ssd_type: &str) {
        self.mutate(|s| s.toggle_ssd_type(ssd_type));
    }

    pub fn toggle_psu_certification(&self, certification: &str) {
        self.mutate(|s| s.toggle_psu_certification(certification));
    }

    /// Remove one chip. Returns `false`, and issues nothing, when the key is
    /// unknown or the value is not selected.
    pub fn remove_filter(&self, key: &str, value: &str) -> bool {
        self.mutate(|s| {
            s.remove(key, value);
        })
    }

    pub fn clear_all(&self) {
        self.mutate(|s| s.clear());
    }

    /// Move to another results page (1-based) without touching the filters.
    pub fn set_page(&self, page: u32) {
        let seq = {
            let mut state = self.inner.state.write();
            state.page = page.max(1);
            state.issued += 1;
            state.issued
        };
        self.issue(seq);
    }

    /// Apply a change, republish the address and issue one request. A change
    /// that leaves the selection as it was publishes and issues nothing.
    fn mutate(&self, change: impl FnOnce(&mut FilterSelection)) -> bool {
        let (seq, address) = {
            let mut state = self.inner.state.write();
            let before = state.selection.clone();
            change(&mut state.selection);
            if state.selection == before {
                return false;
            }
            state.page = 1;
            state.address = encode(&state.selection);
            state.issued += 1;
            (state.issued, state.address.clone())
        };

        debug!(seq, address = %address, "selection changed");
        let _ = self
            .inner
            .events
            .send(ListingEvent::AddressChanged { seq, address });
        self.issue(seq);
        true
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    /// Spawn the fetch for request `seq` when auto-fetch is on.
    fn issue(&self, seq: u64) {
        if !self.inner.settings.auto_fetch {
            return;
        }
        let Ok(handle) = Handle::try_current() else {
            debug!(seq, "no async runtime; fetch left to refresh()");
            return;
        };

        let controller = self.clone();
        let debounce = self.inner.settings.debounce;
        handle.spawn(async move {
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }
            if controller.latest_seq() != seq {
                debug!(seq, "request coalesced into a newer one");
                return;
            }
            controller.fetch(seq).await;
        });
    }

    /// Issue a request now and wait for its outcome.
    pub async fn refresh(&self) -> FetchOutcome {
        let seq = {
            let mut state = self.inner.state.write();
            state.issued += 1;
            state.issued
        };
        self.fetch(seq).await
    }

    async fn fetch(&self, seq: u64) -> FetchOutcome {
        let (query, page) = {
            let state = self.inner.state.read();
            let query = self
                .inner
                .compiler
                .compile(&state.selection, &self.inner.scope, state.page);
            (query, state.page)
        };
        debug!(seq, predicate = %query.predicate, "fetching listing");

        let result = self.inner.store.fetch(&query).await;

        let mut state = self.inner.state.write();
        if seq != state.issued {
            drop(state);
            debug!(seq, "discarding stale response");
            let _ = self.inner.events.send(ListingEvent::StaleDiscarded { seq });
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(mut rows) => {
                if let Some(key) = query.client_sort {
                    sort_in_place(&mut rows.products, key);
                }
                let per_page = self.inner.compiler.page_size();
                let view = ListingView {
                    seq,
                    facets: aggregate(&rows.products, self.inner.scope.kind),
                    total: rows.total,
                    total_pages: rows.total.div_ceil(u64::from(per_page)),
                    products: rows.products,
                    page,
                    per_page,
                };
                state.view = Some(view.clone());
                state.last_error = None;
                drop(state);

                debug!(seq, total = view.total, "results applied");
                let _ = self.inner.events.send(ListingEvent::ResultsApplied {
                    seq,
                    total: view.total,
                });
                FetchOutcome::Applied(view)
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
                drop(state);

                warn!(seq, error = %e, backend = self.inner.store.backend(), "catalog fetch failed");
                let _ = self.inner.events.send(ListingEvent::FetchFailed {
                    seq,
                    error: e.to_string(),
                });
                FetchOutcome::Failed(e)
            }
        }
    }
}
