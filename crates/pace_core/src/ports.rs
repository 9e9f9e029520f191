//! crates/pace_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client core depends on.
//! Local storage and the remote API sit behind these traits so the assessment
//! flow and the repositories never see SQL or HTTP.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::domain::{
    Answer, CourseRecommendation, DynamicLinkState, GuestKey, LoginRecord, LoginRequest,
    LoginResponse, MessageResponse, Question, RegisterRequest, RegisterResponse,
    SocialLoginRequest, StudentAssessmentRequest, StudentAssessmentResult, University,
    UpdatePasswordRequest, UpdateUsernameRequest, VerifiedAccount, VerifyEmailRequest,
};
use crate::network::NetworkResult;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// Error for port operations that can fail. Remote calls report through
/// [`NetworkResult`] instead.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Observable value: yields the current value on subscription, then every update.
pub type ValueStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

//=========================================================================================
// Local Storage Ports
//=========================================================================================

/// Bearer token and university id for authenticated requests.
///
/// Getters never fail; a missing or unreadable value is `None` / `0`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn save_token(&self, token: &str) -> PortResult<()>;
    async fn save_university_id(&self, university_id: i64) -> PortResult<()>;
    async fn get_token(&self) -> Option<String>;
    /// Returns `0` when no university was stored.
    async fn get_university_id(&self) -> i64;
    /// Removes the token only. The university id is kept.
    async fn clear_token(&self) -> PortResult<()>;
}

/// Invite link, guest key, verified account and verification-email flag.
///
/// Getters resolve malformed stored data to `None`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save_dynamic_link(&self, link: &DynamicLinkState) -> PortResult<()>;
    async fn get_dynamic_link(&self) -> Option<DynamicLinkState>;
    fn watch_dynamic_link(&self) -> ValueStream<Option<DynamicLinkState>>;
    /// Sets `is_verified` on the stored link. A no-op when none is stored.
    async fn update_verification(&self, verified: bool) -> PortResult<()>;

    async fn save_guest_key(&self, key: &GuestKey) -> PortResult<()>;
    async fn get_guest_key(&self) -> Option<GuestKey>;
    fn watch_guest_key(&self) -> ValueStream<Option<GuestKey>>;

    async fn save_verified_account(&self, account: &VerifiedAccount) -> PortResult<()>;
    async fn get_verified_account(&self) -> Option<VerifiedAccount>;
    fn watch_verified_account(&self) -> ValueStream<Option<VerifiedAccount>>;

    async fn set_verification_email_sent(&self, sent: bool) -> PortResult<()>;
    async fn is_verification_email_sent(&self) -> bool;
    fn watch_verification_email_sent(&self) -> ValueStream<bool>;

    /// Drops every value held by this store.
    async fn clear(&self) -> PortResult<()>;
}

/// Single-row cache of the last successful login.
#[async_trait]
pub trait LoginCache: Send + Sync {
    /// Replaces whatever row is cached.
    async fn insert_login_response(&self, record: &LoginRecord) -> PortResult<()>;
    async fn get_login_response(&self) -> PortResult<Option<LoginRecord>>;
    async fn clear_login(&self) -> PortResult<()>;
}

//=========================================================================================
// Remote API Ports
//=========================================================================================

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> NetworkResult<LoginResponse>;
    async fn register(&self, request: &RegisterRequest) -> NetworkResult<RegisterResponse>;
    async fn social_login(&self, request: &SocialLoginRequest) -> NetworkResult<LoginResponse>;
    async fn send_verification_email(&self, email: &str) -> NetworkResult<MessageResponse>;
    async fn verify_email(&self, request: &VerifyEmailRequest) -> NetworkResult<MessageResponse>;
    async fn update_password(
        &self,
        request: &UpdatePasswordRequest,
    ) -> NetworkResult<MessageResponse>;
    async fn update_username(
        &self,
        request: &UpdateUsernameRequest,
    ) -> NetworkResult<MessageResponse>;
}

#[async_trait]
pub trait AssessmentApi: Send + Sync {
    /// The full, ordered question set.
    async fn list_questions(&self) -> NetworkResult<Vec<Question>>;
    async fn recommend_courses(&self, answers: &[Answer]) -> NetworkResult<CourseRecommendation>;
    async fn save_student_assessment(
        &self,
        request: &StudentAssessmentRequest,
    ) -> NetworkResult<StudentAssessmentResult>;
}

#[async_trait]
pub trait UniversityApi: Send + Sync {
    async fn list_universities(&self) -> NetworkResult<Vec<University>>;
    async fn get_university(&self, university_id: i64) -> NetworkResult<University>;
}
