//! services/client/src/app/state.rs
//!
//! Defines the process-wide application state, built once at startup and handed to
//! every repository and view model.

use crate::adapters::{
    credentials::SqliteCredentialStore, db::DbAdapter, http::HttpApiAdapter,
    session_store::SqliteSessionStore,
};
use crate::config::Config;
use crate::error::ClientError;
use pace_core::ports::{
    AssessmentApi, AuthApi, CredentialStore, LoginCache, SessionStore, UniversityApi,
};
use std::sync::Arc;
use tracing::info;

//=========================================================================================
// AppState (Shared Across All Screens)
//=========================================================================================

/// The shared application state. Every store and API lives behind its port.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub credentials: Arc<dyn CredentialStore>,
    pub session_store: Arc<dyn SessionStore>,
    pub login_cache: Arc<dyn LoginCache>,
    pub auth_api: Arc<dyn AuthApi>,
    pub assessment_api: Arc<dyn AssessmentApi>,
    pub university_api: Arc<dyn UniversityApi>,
}

impl AppState {
    /// Opens local storage and wires the concrete adapters.
    pub async fn bootstrap(config: Config) -> Result<Self, ClientError> {
        let config = Arc::new(config);

        info!("Opening local database...");
        let db = DbAdapter::open(&config.database_path).await?;

        let credentials: Arc<dyn CredentialStore> =
            Arc::new(SqliteCredentialStore::new(db.pool().clone()));
        let session_store: Arc<dyn SessionStore> =
            Arc::new(SqliteSessionStore::open(db.pool().clone()).await);
        let login_cache: Arc<dyn LoginCache> = Arc::new(db);

        let http = Arc::new(HttpApiAdapter::new(
            config.api_base_url.clone(),
            config.request_timeout,
            credentials.clone(),
        )?);
        info!(base_url = %config.api_base_url, "API client ready");

        Ok(Self {
            config,
            credentials,
            session_store,
            login_cache,
            auth_api: http.clone(),
            assessment_api: http.clone(),
            university_api: http,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn bootstrap_wires_file_backed_stores() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            api_base_url: "http://localhost:8080".into(),
            database_path: dir.path().join("pace.db"),
            log_level: tracing::Level::INFO,
            log_json: false,
            request_timeout: Duration::from_secs(1),
        };

        let state = AppState::bootstrap(config).await.unwrap();
        state.credentials.save_token("jwt").await.unwrap();
        assert_eq!(state.credentials.get_token().await.as_deref(), Some("jwt"));
        assert!(state.login_cache.get_login_response().await.unwrap().is_none());
        assert!(dir.path().join("pace.db").exists());
    }
}
