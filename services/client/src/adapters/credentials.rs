//! services/client/src/adapters/credentials.rs
//!
//! SQLite-backed implementation of the `CredentialStore` port.

use async_trait::async_trait;
use pace_core::ports::{CredentialStore, PortResult};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::adapters::preferences::Preferences;

const NAMESPACE: &str = "credentials";
const TOKEN_KEY: &str = "token";
const UNIVERSITY_KEY: &str = "university_id";

#[derive(Clone)]
pub struct SqliteCredentialStore {
    prefs: Preferences,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            prefs: Preferences::new(pool, NAMESPACE),
        }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn save_token(&self, token: &str) -> PortResult<()> {
        self.prefs.put_raw(TOKEN_KEY, token).await?;
        info!(has_token = !token.is_empty(), "Saved bearer token");
        Ok(())
    }

    async fn save_university_id(&self, university_id: i64) -> PortResult<()> {
        self.prefs
            .put_raw(UNIVERSITY_KEY, &university_id.to_string())
            .await?;
        info!(university_id, "Saved university id");
        Ok(())
    }

    async fn get_token(&self) -> Option<String> {
        match self.prefs.get_raw(TOKEN_KEY).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read bearer token");
                None
            }
        }
    }

    async fn get_university_id(&self) -> i64 {
        match self.prefs.get_raw(UNIVERSITY_KEY).await {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Stored university id is not a number");
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "Failed to read university id");
                0
            }
        }
    }

    async fn clear_token(&self) -> PortResult<()> {
        self.prefs.remove(TOKEN_KEY).await?;
        info!("Cleared bearer token");
        Ok(())
    }
}
