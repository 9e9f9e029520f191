//! services/client/src/adapters/db.rs
//!
//! This module contains the database adapter: the SQLite pool shared by every local
//! store, its migrations, and the concrete implementation of the `LoginCache` port.

use async_trait::async_trait;
use pace_core::domain::LoginRecord;
use pace_core::ports::{LoginCache, PortError, PortResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Owns the SQLite pool and implements the `LoginCache` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Opens (or creates) the database file at `path` and runs migrations.
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        info!(path = %path.display(), "Local database opened");

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// An in-memory database. One connection, since each connection would get its own.
    pub async fn open_in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Local database migrations complete");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct LoginRow {
    user_id: i64,
    user_name: String,
    jwt_token: String,
    role: String,
    university_id: Option<i64>,
    email: Option<String>,
}
impl LoginRow {
    fn to_domain(self) -> LoginRecord {
        LoginRecord {
            user_id: Some(self.user_id),
            user_name: self.user_name,
            jwt_token: self.jwt_token,
            role: self.role,
            university_id: self.university_id,
            email: self.email,
        }
    }
}

fn storage_error(e: sqlx::Error) -> PortError {
    PortError::Storage(e.to_string())
}

//=========================================================================================
// `LoginCache` Trait Implementation
//=========================================================================================

#[async_trait]
impl LoginCache for DbAdapter {
    async fn insert_login_response(&self, record: &LoginRecord) -> PortResult<()> {
        // Replace, not append: the old row goes in the same transaction.
        let mut tx = self.pool.begin().await.map_err(storage_error)?;
        sqlx::query("DELETE FROM login_response")
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        sqlx::query(
            "INSERT INTO login_response (user_name, jwt_token, role, university_id, email) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.user_name)
        .bind(&record.jwt_token)
        .bind(&record.role)
        .bind(record.university_id)
        .bind(&record.email)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;
        tx.commit().await.map_err(storage_error)?;

        info!(user = %record.user_name, role = %record.role, "Cached login response");
        Ok(())
    }

    async fn get_login_response(&self) -> PortResult<Option<LoginRecord>> {
        let row = sqlx::query_as::<_, LoginRow>(
            "SELECT user_id, user_name, jwt_token, role, university_id, email \
             FROM login_response ORDER BY user_id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(row.map(LoginRow::to_domain))
    }

    async fn clear_login(&self) -> PortResult<()> {
        sqlx::query("DELETE FROM login_response")
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        info!("Cleared cached login");
        Ok(())
    }
}
