//! PostgreSQL catalog store.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;

use super::store::{CatalogPage, CatalogStore};
use super::Product;
use crate::error::CatalogError;
use crate::query::{CatalogQuery, CatalogSqlBuilder};

/// PostgreSQL error code for `query_canceled`, raised by `statement_timeout`.
const QUERY_CANCELED: &str = "57014";

/// Catalog backed by the `product` table.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }

    /// Connect a pool and wrap it.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        statement_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("failed to connect to PostgreSQL")?;

        Ok(Self::new(pool, statement_timeout))
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn fetch(&self, query: &CatalogQuery) -> Result<CatalogPage, CatalogError> {
        let builder = CatalogSqlBuilder::new(query);
        let count_sql = builder.build_count();
        let main_sql = builder.build();
        debug!(sql = %main_sql, "catalog query");

        // SET LOCAL only lasts for the transaction.
        let mut tx = self.pool.begin().await.map_err(classify)?;

        sqlx::query(&format!(
            "SET LOCAL statement_timeout = '{}ms'",
            self.statement_timeout.as_millis()
        ))
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        let total: i64 = sqlx::query_scalar(&count_sql)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify)?;

        let rows: Vec<serde_json::Value> =
            sqlx::query_scalar(&format!("SELECT row_to_json(t) FROM ({main_sql}) t"))
                .fetch_all(&mut *tx)
                .await
                .map_err(classify)?;

        tx.commit().await.map_err(classify)?;

        let products = rows
            .into_iter()
            .map(serde_json::from_value::<Product>)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CatalogPage {
            products,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn ping(&self) -> Result<(), CatalogError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// Separate timeouts and connectivity loss from other database errors.
fn classify(err: sqlx::Error) -> CatalogError {
    let canceled = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == QUERY_CANCELED);
    if canceled {
        return CatalogError::Timeout;
    }

    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            CatalogError::Unavailable(err.to_string())
        }
        other => CatalogError::Database(other),
    }
}
