//! PostgreSQL document store
//!
//! Each collection is a table of `(id TEXT PRIMARY KEY, document JSONB)`.
//! The table is created on connect if it does not exist yet.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::time::Duration;
use tracing::{debug, info};

use super::{DocumentStore, StoreConfig, StoreError};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    collection: String,
    insert_sql: String,
}

impl PostgresStore {
    /// Open a pool for `config` and make sure the collection table exists
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.connection_url())
            .await?;

        info!(
            host = %config.host,
            database = %config.database,
            max_connections = config.max_connections,
            "Store connection pool created"
        );

        let store = Self::from_pool(pool, &config.collection)?;
        store.ensure_collection().await?;
        Ok(store)
    }

    /// Wrap an existing pool; does not touch the database
    pub fn from_pool(pool: PgPool, collection: &str) -> Result<Self, StoreError> {
        if !super::is_identifier(collection) {
            return Err(StoreError::config(format!(
                "invalid collection name '{}'",
                collection
            )));
        }

        Ok(Self {
            pool,
            collection: collection.to_string(),
            insert_sql: format!(
                r#"INSERT INTO "{}" (id, document) VALUES ($1, $2)"#,
                collection
            ),
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_collection(&self) -> Result<(), StoreError> {
        let ddl = format!(
            r#"CREATE TABLE IF NOT EXISTS "{}" (id TEXT PRIMARY KEY, document JSONB NOT NULL)"#,
            self.collection
        );
        sqlx::query(&ddl).execute(&self.pool).await?;

        debug!(collection = %self.collection, "Collection table ready");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn insert(&self, id: &str, document: &Value) -> Result<(), StoreError> {
        sqlx::query(&self.insert_sql)
            .bind(id)
            .bind(Json(document))
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::Duplicate(id.to_string())
                },
                other => StoreError::Database(other),
            })?;

        Ok(())
    }
}
