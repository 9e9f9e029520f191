//! services/client/src/app/university.rs
//!
//! University listing and invite-link capture.

use pace_core::domain::{DynamicLinkState, University};
use pace_core::network::NetworkResult;
use pace_core::ports::{PortResult, SessionStore, UniversityApi, ValueStream};
use pace_core::validation;
use std::sync::Arc;
use tracing::info;

use crate::app::state::AppState;

#[derive(Clone)]
pub struct UniversityRepository {
    session_store: Arc<dyn SessionStore>,
    university_api: Arc<dyn UniversityApi>,
}

impl UniversityRepository {
    pub fn new(session_store: Arc<dyn SessionStore>, university_api: Arc<dyn UniversityApi>) -> Self {
        Self {
            session_store,
            university_api,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.session_store.clone(), state.university_api.clone())
    }

    pub async fn list_universities(&self) -> NetworkResult<Vec<University>> {
        self.university_api.list_universities().await
    }

    pub async fn get_university(&self, university_id: i64) -> NetworkResult<University> {
        if let Err(e) = validation::validate_university(university_id) {
            return NetworkResult::invalid(e);
        }
        self.university_api.get_university(university_id).await
    }

    /// Stores the invite a deep link opened the app with.
    ///
    /// Re-opening the same link keeps its verification state.
    pub async fn capture_invite(
        &self,
        university_id: i64,
        dynamic_token: &str,
    ) -> PortResult<DynamicLinkState> {
        if let Some(existing) = self.session_store.get_dynamic_link().await {
            if existing.university_id == university_id && existing.dynamic_token == dynamic_token {
                return Ok(existing);
            }
        }
        let link = DynamicLinkState::new(university_id, dynamic_token);
        self.session_store.save_dynamic_link(&link).await?;
        info!(university_id, "Captured university invite");
        Ok(link)
    }

    /// Looks up the university of the stored invite, if any.
    pub async fn invited_university(&self) -> Option<NetworkResult<University>> {
        let link = self.session_store.get_dynamic_link().await?;
        Some(self.get_university(link.university_id).await)
    }

    pub fn watch_invite(&self) -> ValueStream<Option<DynamicLinkState>> {
        self.session_store.watch_dynamic_link()
    }
}
