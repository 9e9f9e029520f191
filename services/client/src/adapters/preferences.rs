//! services/client/src/adapters/preferences.rs
//!
//! Namespaced key-value slots in the `preferences` table. Each store owns one
//! namespace; every operation is a single statement.

use pace_core::ports::{PortError, PortResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

#[derive(Clone)]
pub struct Preferences {
    pool: SqlitePool,
    namespace: &'static str,
}

impl Preferences {
    pub fn new(pool: SqlitePool, namespace: &'static str) -> Self {
        Self { pool, namespace }
    }

    pub async fn get_raw(&self, key: &str) -> PortResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT value FROM preferences WHERE namespace = ? AND key = ?",
        )
        .bind(self.namespace)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Storage(e.to_string()))
    }

    pub async fn put_raw(&self, key: &str, value: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO preferences (namespace, key, value) VALUES (?, ?, ?) \
             ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value",
        )
        .bind(self.namespace)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Storage(e.to_string()))?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM preferences WHERE namespace = ? AND key = ?")
            .bind(self.namespace)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Removes every key in this namespace in one statement.
    pub async fn clear(&self) -> PortResult<()> {
        sqlx::query("DELETE FROM preferences WHERE namespace = ?")
            .bind(self.namespace)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Storage(e.to_string()))?;
        Ok(())
    }

    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> PortResult<()> {
        let text =
            serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.put_raw(key, &text).await
    }

    /// Reads and decodes a JSON value.
    ///
    /// Storage failures and malformed text both resolve to `None`; the cause is logged.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = match self.get_raw(key).await {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                warn!(namespace = self.namespace, key, error = %e, "Failed to read stored value");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(namespace = self.namespace, key, error = %e, "Stored value is malformed, treating as absent");
                None
            }
        }
    }
}
