//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL. When set, the catalog is read from the
    /// `product` table.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// JSON product fixtures, used when no database is configured.
    pub catalog_fixtures: Option<PathBuf>,

    /// Products per listing page (default: 24, max: 100).
    pub page_size: u32,

    /// Quiet period before a mutation's fetch is issued (default: 150ms).
    pub fetch_debounce: Duration,

    /// Catalog query timeout (default: 10s).
    pub statement_timeout: Duration,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty());

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let catalog_fixtures = env::var("CATALOG_FIXTURES").ok().map(PathBuf::from);

        if database_url.is_none() && catalog_fixtures.is_none() {
            anyhow::bail!("either DATABASE_URL or CATALOG_FIXTURES must be set");
        }

        let page_size: u32 = env::var("PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse()
            .context("PAGE_SIZE must be a valid u32")?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            anyhow::bail!("PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}");
        }

        let fetch_debounce = env::var("FETCH_DEBOUNCE_MS")
            .unwrap_or_else(|_| "150".to_string())
            .parse()
            .map(Duration::from_millis)
            .context("FETCH_DEBOUNCE_MS must be a valid u64")?;

        let statement_timeout = env::var("STATEMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("STATEMENT_TIMEOUT_SECS must be a valid u64")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            catalog_fixtures,
            page_size,
            fetch_debounce,
            statement_timeout,
            cors_allowed_origins,
        })
    }
}
