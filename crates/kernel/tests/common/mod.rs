#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Stores here implement the real `CatalogStore` contract so controller and
//! router tests exercise the actual kernel code paths. [`GatedStore`] hands
//! every fetch to the test, which decides when and how it completes.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tower::ServiceExt;

use catalog_filter::catalog::{CatalogPage, CatalogStore, InMemoryCatalogStore};
use catalog_filter::controller::{ListingEvent, ListingSettings};
use catalog_filter::error::CatalogError;
use catalog_filter::query::CatalogQuery;
use catalog_filter::routes;
use catalog_filter::state::AppState;
use catalog_filter_test_utils::{catalog_json, fixtures};

/// In-memory store over the sample catalog fixtures.
pub fn fixture_store() -> InMemoryCatalogStore {
    InMemoryCatalogStore::from_json(&catalog_json(&fixtures::catalog()))
        .expect("fixtures must deserialize")
}

/// Controller settings that fetch immediately after each mutation.
pub fn immediate() -> ListingSettings {
    ListingSettings {
        debounce: Duration::ZERO,
        auto_fetch: true,
        ..Default::default()
    }
}

/// Controller settings where the test drives fetches with `refresh()`.
pub fn manual() -> ListingSettings {
    ListingSettings {
        auto_fetch: false,
        ..Default::default()
    }
}

/// An empty page reporting `total` matches.
pub fn page_with_total(total: u64) -> CatalogPage {
    CatalogPage {
        products: Vec::new(),
        total,
    }
}

/// Completes one pending fetch.
pub type Responder = oneshot::Sender<Result<CatalogPage, CatalogError>>;

/// Store whose fetches block until the test answers them.
pub struct GatedStore {
    calls: mpsc::UnboundedSender<Responder>,
}

impl GatedStore {
    /// The store plus the stream of pending fetches, in call order.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Responder>) {
        let (calls, pending) = mpsc::unbounded_channel();
        (Arc::new(Self { calls }), pending)
    }
}

#[async_trait]
impl CatalogStore for GatedStore {
    async fn fetch(&self, _query: &CatalogQuery) -> Result<CatalogPage, CatalogError> {
        let (respond, response) = oneshot::channel();
        self.calls
            .send(respond)
            .map_err(|_| CatalogError::Unavailable("test harness gone".to_string()))?;
        response
            .await
            .unwrap_or_else(|_| Err(CatalogError::Unavailable("responder dropped".to_string())))
    }

    async fn ping(&self) -> Result<(), CatalogError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "gated"
    }
}

/// Store that counts fetches and delegates to the fixture catalog.
pub struct CountingStore {
    inner: InMemoryCatalogStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: fixture_store(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for CountingStore {
    async fn fetch(&self, query: &CatalogQuery) -> Result<CatalogPage, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(query).await
    }

    async fn ping(&self) -> Result<(), CatalogError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "counting"
    }
}

/// Store that is always down.
pub struct FailingStore;

#[async_trait]
impl CatalogStore for FailingStore {
    async fn fetch(&self, _query: &CatalogQuery) -> Result<CatalogPage, CatalogError> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), CatalogError> {
        Err(CatalogError::Unavailable("connection refused".to_string()))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

/// Wait (up to a second) for the first event matching `predicate`.
pub async fn wait_for(
    events: &mut broadcast::Receiver<ListingEvent>,
    predicate: impl Fn(&ListingEvent) -> bool,
) -> ListingEvent {
    loop {
        match tokio::time::timeout(Duration::from_secs(1), events.recv()).await {
            Ok(Ok(event)) if predicate(&event) => return event,
            Ok(Ok(_)) => continue,
            Ok(Err(e)) => panic!("event channel error: {e}"),
            Err(_) => panic!("timed out waiting for controller event"),
        }
    }
}

/// Router over the given store, as the binary builds it (minus middleware).
pub fn app(store: Arc<dyn CatalogStore>) -> Router {
    routes::router().with_state(AppState::with_store(store, manual()))
}

/// Send a GET request through the router.
pub async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("Failed to send request")
}

/// Parse a response body as JSON.
pub async fn response_json(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap_or_else(|_| {
        let text = String::from_utf8_lossy(&body);
        panic!("Failed to parse JSON: {text}");
    })
}
