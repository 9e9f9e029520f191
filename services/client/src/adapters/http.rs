//! services/client/src/adapters/http.rs
//!
//! This module contains the REST adapter. It implements the `AuthApi`,
//! `AssessmentApi` and `UniversityApi` ports with `reqwest` and maps every
//! outcome onto `NetworkResult`; nothing here returns an `Err`.

use async_trait::async_trait;
use pace_core::domain::{
    Answer, CourseRecommendation, CourseRecommendationRequest, LoginRequest, LoginResponse,
    MessageResponse, Question, RegisterRequest, RegisterResponse, SocialLoginRequest,
    StudentAssessmentRequest, StudentAssessmentResult, University, UpdatePasswordRequest,
    UpdateUsernameRequest, VerifyEmailRequest,
};
use pace_core::network::NetworkResult;
use pace_core::ports::{AssessmentApi, AuthApi, CredentialStore, UniversityApi};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Talks to the PACE backend. Attaches the stored bearer token when there is one.
#[derive(Clone)]
pub struct HttpApiAdapter {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpApiAdapter {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.credentials.get_token().await {
            Some(token) if !token.is_empty() => builder.bearer_auth(token),
            _ => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> NetworkResult<T> {
        let builder = self.request(Method::GET, path).await;
        self.execute(path, builder).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> NetworkResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self.request(method, path).await.json(body);
        self.execute(path, builder).await
    }

    /// Sends the request and maps the outcome.
    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        builder: RequestBuilder,
    ) -> NetworkResult<T> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(path, error = %e, "Request failed before a response arrived");
                return NetworkResult::transport_error(e.to_string());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(path, status = status.as_u16(), error = %e, "Failed to read response body");
                return NetworkResult::error(status.as_u16(), e.to_string());
            }
        };

        let result = NetworkResult::from_http(status.as_u16(), status.is_success(), &body);
        match &result {
            NetworkResult::Error { status, message } => {
                warn!(path, status, message = %message, "Request returned an error")
            }
            _ => debug!(path, status = status.as_u16(), "Request succeeded"),
        }
        result
    }
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl AuthApi for HttpApiAdapter {
    async fn login(&self, request: &LoginRequest) -> NetworkResult<LoginResponse> {
        self.send_json(Method::POST, "/api/auth/login", request).await
    }

    async fn register(&self, request: &RegisterRequest) -> NetworkResult<RegisterResponse> {
        self.send_json(Method::POST, "/api/auth/register", request).await
    }

    async fn social_login(&self, request: &SocialLoginRequest) -> NetworkResult<LoginResponse> {
        let path = format!("/api/auth/social/{}", request.provider.as_str());
        self.send_json(Method::POST, &path, request).await
    }

    async fn send_verification_email(&self, email: &str) -> NetworkResult<MessageResponse> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
        }
        self.send_json(Method::POST, "/api/auth/verification/send", &Body { email })
            .await
    }

    async fn verify_email(&self, request: &VerifyEmailRequest) -> NetworkResult<MessageResponse> {
        self.send_json(Method::POST, "/api/auth/verification/verify", request)
            .await
    }

    async fn update_password(
        &self,
        request: &UpdatePasswordRequest,
    ) -> NetworkResult<MessageResponse> {
        self.send_json(Method::PUT, "/api/users/me/password", request)
            .await
    }

    async fn update_username(
        &self,
        request: &UpdateUsernameRequest,
    ) -> NetworkResult<MessageResponse> {
        self.send_json(Method::PUT, "/api/users/me/username", request)
            .await
    }
}

#[async_trait]
impl AssessmentApi for HttpApiAdapter {
    async fn list_questions(&self) -> NetworkResult<Vec<Question>> {
        self.get("/api/questions").await
    }

    async fn recommend_courses(&self, answers: &[Answer]) -> NetworkResult<CourseRecommendation> {
        let body = CourseRecommendationRequest {
            answers: answers.to_vec(),
        };
        self.send_json(Method::POST, "/api/recommendations", &body)
            .await
    }

    async fn save_student_assessment(
        &self,
        request: &StudentAssessmentRequest,
    ) -> NetworkResult<StudentAssessmentResult> {
        self.send_json(Method::POST, "/api/assessments", request).await
    }
}

#[async_trait]
impl UniversityApi for HttpApiAdapter {
    async fn list_universities(&self) -> NetworkResult<Vec<University>> {
        self.get("/api/universities").await
    }

    async fn get_university(&self, university_id: i64) -> NetworkResult<University> {
        self.get(&format!("/api/universities/{}", university_id)).await
    }
}
