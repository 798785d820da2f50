//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::{CatalogStore, InMemoryCatalogStore, PgCatalogStore};
use crate::config::Config;
use crate::controller::ListingSettings;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Catalog backend.
    store: Arc<dyn CatalogStore>,

    /// Settings for per-request listing controllers.
    listing: ListingSettings,
}

impl AppState {
    /// Build state from configuration, connecting the catalog backend.
    ///
    /// PostgreSQL wins when both a database and fixtures are configured.
    pub async fn new(config: &Config) -> Result<Self> {
        let store: Arc<dyn CatalogStore> = if let Some(ref url) = config.database_url {
            let store = PgCatalogStore::connect(
                url,
                config.database_max_connections,
                config.statement_timeout,
            )
            .await?;
            info!("PostgreSQL catalog connected");
            Arc::new(store)
        } else if let Some(ref path) = config.catalog_fixtures {
            let store = InMemoryCatalogStore::from_json_file(path)
                .context("failed to load catalog fixtures")?;
            info!(products = store.len(), path = %path.display(), "catalog fixtures loaded");
            Arc::new(store)
        } else {
            anyhow::bail!("no catalog backend configured");
        };

        Ok(Self::with_store(
            store,
            ListingSettings {
                page_size: config.page_size,
                debounce: config.fetch_debounce,
                // HTTP requests fetch explicitly.
                auto_fetch: false,
            },
        ))
    }

    /// State over an existing store.
    pub fn with_store(store: Arc<dyn CatalogStore>, listing: ListingSettings) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, listing }),
        }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.inner.store
    }

    pub fn listing_settings(&self) -> ListingSettings {
        self.inner.listing
    }
}
