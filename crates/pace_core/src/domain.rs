//! crates/pace_core/src/domain.rs
//!
//! Defines the core data structures for the PACE client.
//! Persisted values and API payloads share these types, so they carry `serde`
//! derives with the camelCase field names the backend and the local store use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Session & Credential State
//=========================================================================================

/// The bearer token and university the device is signed in to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub university_id: i64,
}

/// A university invite captured from a deep link.
///
/// `is_verified` only ever moves from `false` to `true` while the same link is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicLinkState {
    pub university_id: i64,
    pub dynamic_token: String,
    #[serde(default)]
    pub is_verified: bool,
}

impl DynamicLinkState {
    /// A freshly captured, not yet verified invite.
    pub fn new(university_id: i64, dynamic_token: impl Into<String>) -> Self {
        Self {
            university_id,
            dynamic_token: dynamic_token.into(),
            is_verified: false,
        }
    }
}

/// Marks an email address whose verification succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedAccount {
    pub email: String,
    pub verified: bool,
    // Added after the first release; older stored values lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

/// Opaque marker that lets a user finish the assessment without an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestKey(pub String);

impl GuestKey {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The cached result of the last successful login. At most one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRecord {
    /// Assigned by the cache on insert; ignored when writing.
    pub user_id: Option<i64>,
    pub user_name: String,
    pub jwt_token: String,
    pub role: String,
    pub university_id: Option<i64>,
    pub email: Option<String>,
}

/// Who is taking the assessment. Only registered users get their results saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Registered,
    Guest,
}

//=========================================================================================
// Assessment
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionCategory {
    General,
    Career,
    Personal,
}

/// A single yes/no question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub category: QuestionCategory,
    #[serde(rename = "question")]
    pub text: String,
    #[serde(default)]
    pub image_ref: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: i64,
    pub answer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecommendationRequest {
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub careers: Vec<String>,
}

/// Courses and careers computed by the backend from a set of answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecommendation {
    pub courses: Vec<Course>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Sent only for registered users so the backend keeps their result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAssessmentRequest {
    pub university_id: i64,
    pub answers: Vec<Answer>,
    pub recommended_course_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAssessmentResult {
    pub id: i64,
    #[serde(default)]
    pub recommended_courses: Vec<Course>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

//=========================================================================================
// Accounts & Universities
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_name: String,
    pub token: String,
    pub role: String,
    #[serde(default)]
    pub university_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
}

impl LoginResponse {
    /// The cache row for this login.
    pub fn to_record(&self) -> LoginRecord {
        LoginRecord {
            user_id: None,
            user_name: self.user_name.clone(),
            jwt_token: self.token.clone(),
            role: self.role.clone(),
            university_id: self.university_id,
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub university_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_name: String,
    pub email: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialProvider {
    Google,
    Facebook,
    Twitter,
    Instagram,
}

impl SocialProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialProvider::Google => "google",
            SocialProvider::Facebook => "facebook",
            SocialProvider::Twitter => "twitter",
            SocialProvider::Instagram => "instagram",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLoginRequest {
    pub provider: SocialProvider,
    pub access_token: String,
    pub university_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsernameRequest {
    pub user_name: String,
}

/// Plain acknowledgement body returned by several account endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_link_reads_without_verification_flag() {
        let link: DynamicLinkState =
            serde_json::from_str(r#"{"universityId":7,"dynamicToken":"abc"}"#).unwrap();
        assert_eq!(link, DynamicLinkState::new(7, "abc"));
    }

    #[test]
    fn question_uses_backend_field_names() {
        let q: Question = serde_json::from_str(
            r#"{"id":3,"category":"CAREER","question":"Do you like maths?","imageRef":"img/3.png"}"#,
        )
        .unwrap();
        assert_eq!(q.category, QuestionCategory::Career);
        assert_eq!(q.text, "Do you like maths?");
        assert_eq!(q.image_ref.as_deref(), Some("img/3.png"));
    }

    #[test]
    fn login_response_maps_to_unsaved_record() {
        let response = LoginResponse {
            user_name: "ada".into(),
            token: "jwt".into(),
            role: "student".into(),
            university_id: Some(4),
            email: None,
        };
        let record = response.to_record();
        assert_eq!(record.user_id, None);
        assert_eq!(record.jwt_token, "jwt");
        assert_eq!(record.university_id, Some(4));
    }

    #[test]
    fn guest_keys_are_unique() {
        assert_ne!(GuestKey::generate(), GuestKey::generate());
    }
}
