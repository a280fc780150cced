//! Key-value store implementations
//!
//! `SqliteKeyValueStore` keeps JSON text in the `kv_store` table;
//! `InMemoryKeyValueStore` is for ephemeral deployments and tests.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::domain::errors::{WidgetError, WidgetResult};
use crate::domain::repositories::KeyValueStore;

#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> WidgetResult<Option<Value>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("❌ Failed to read key {}: {}", key, e);
                WidgetError::storage(key, e.to_string())
            })?;

        let Some(row) = row else {
            debug!("Key {} not present", key);
            return Ok(None);
        };

        let raw: String = row.get("value");
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            error!("❌ Stored value for {} is not valid JSON: {}", key, e);
            WidgetError::storage(key, e.to_string())
        })
    }

    async fn set(&self, key: &str, value: Value) -> WidgetResult<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(key)
        .bind(value.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("❌ Failed to write key {}: {}", key, e);
            WidgetError::storage(key, e.to_string())
        })?;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> WidgetResult<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> WidgetResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database_connection::DatabaseConnection;
    use serde_json::json;

    async fn sqlite_store() -> SqliteKeyValueStore {
        let db = DatabaseConnection::new("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        SqliteKeyValueStore::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_sqlite_missing_key_is_none() {
        let store = sqlite_store().await;
        assert_eq!(store.get("lastValidated-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_set_replaces_previous_value() {
        let store = sqlite_store().await;
        store.set("k", json!({"userName": "first"})).await.unwrap();
        store.set("k", json!({"userName": "second"})).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(json!({"userName": "second"})));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_sqlite_corrupt_value_is_storage_error() {
        let store = sqlite_store().await;
        sqlx::query("INSERT INTO kv_store (key, value) VALUES ('bad', '{not json')")
            .execute(&store.pool)
            .await
            .unwrap();

        assert!(matches!(
            store.get("bad").await,
            Err(WidgetError::Storage { .. })
        ));
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("kv.db").display());

        {
            let db = DatabaseConnection::new(&url).await.unwrap();
            db.migrate().await.unwrap();
            SqliteKeyValueStore::new(db.pool().clone())
                .set("k", json!("v"))
                .await
                .unwrap();
            db.pool().close().await;
        }

        let db = DatabaseConnection::new(&url).await.unwrap();
        let store = SqliteKeyValueStore::new(db.pool().clone());
        assert_eq!(store.get("k").await.unwrap(), Some(json!("v")));
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryKeyValueStore::new();
        assert!(store.is_empty().await);
        store.set("a", json!(1)).await.unwrap();
        store.set("a", json!(2)).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("a").await.unwrap(), Some(json!(2)));
    }
}
