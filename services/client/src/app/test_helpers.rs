//! Shared test helpers for the application-layer test modules.
//!
//! Provides in-process fakes for the remote API ports and an `AppState` wired to
//! in-memory SQLite stores.

use async_trait::async_trait;
use pace_core::domain::{
    Answer, Course, CourseRecommendation, LoginRecord, LoginRequest, LoginResponse,
    MessageResponse, Question, QuestionCategory, RegisterRequest, RegisterResponse,
    SocialLoginRequest, StudentAssessmentRequest, StudentAssessmentResult, University,
    UpdatePasswordRequest, UpdateUsernameRequest, VerifyEmailRequest,
};
use pace_core::network::NetworkResult;
use pace_core::ports::{
    AssessmentApi, AuthApi, CredentialStore, LoginCache, PortError, PortResult, UniversityApi,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::adapters::{
    credentials::SqliteCredentialStore, db::DbAdapter, session_store::SqliteSessionStore,
};
use crate::app::state::AppState;
use crate::config::Config;

pub fn question(id: i64, category: QuestionCategory) -> Question {
    Question {
        id,
        category,
        text: format!("Question {}", id),
        image_ref: None,
    }
}

pub fn login_response(user_name: &str) -> LoginResponse {
    LoginResponse {
        user_name: user_name.into(),
        token: format!("{}-jwt", user_name),
        role: "student".into(),
        university_id: Some(7),
        email: Some(format!("{}@pace.edu", user_name)),
    }
}

pub fn recommendation() -> CourseRecommendation {
    CourseRecommendation {
        courses: vec![Course {
            id: 11,
            name: "Software Engineering".into(),
            description: None,
            careers: vec!["Developer".into()],
        }],
        message: None,
    }
}

fn ok_message() -> NetworkResult<MessageResponse> {
    NetworkResult::success(
        200,
        MessageResponse {
            message: "ok".into(),
        },
    )
}

//=========================================================================================
// Fake Remote APIs
//=========================================================================================

#[derive(Default)]
pub struct FakeAuthApi {
    pub calls: Mutex<Vec<&'static str>>,
    pub login_result: Mutex<Option<NetworkResult<LoginResponse>>>,
    pub verify_result: Mutex<Option<NetworkResult<MessageResponse>>>,
    pub last_register: Mutex<Option<RegisterRequest>>,
}

impl FakeAuthApi {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn login(&self, request: &LoginRequest) -> NetworkResult<LoginResponse> {
        self.record("login");
        self.login_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| NetworkResult::success(200, login_response(&request.email.replace("@pace.edu", ""))))
    }

    async fn register(&self, request: &RegisterRequest) -> NetworkResult<RegisterResponse> {
        self.record("register");
        *self.last_register.lock().unwrap() = Some(request.clone());
        NetworkResult::success(
            201,
            RegisterResponse {
                user_name: request.user_name.clone(),
                email: request.email.clone(),
                message: None,
            },
        )
    }

    async fn social_login(&self, request: &SocialLoginRequest) -> NetworkResult<LoginResponse> {
        self.record("social_login");
        NetworkResult::success(200, login_response(request.provider.as_str()))
    }

    async fn send_verification_email(&self, _email: &str) -> NetworkResult<MessageResponse> {
        self.record("send_verification_email");
        ok_message()
    }

    async fn verify_email(&self, _request: &VerifyEmailRequest) -> NetworkResult<MessageResponse> {
        self.record("verify_email");
        self.verify_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(ok_message)
    }

    async fn update_password(
        &self,
        _request: &UpdatePasswordRequest,
    ) -> NetworkResult<MessageResponse> {
        self.record("update_password");
        ok_message()
    }

    async fn update_username(
        &self,
        _request: &UpdateUsernameRequest,
    ) -> NetworkResult<MessageResponse> {
        self.record("update_username");
        ok_message()
    }
}

pub struct FakeAssessmentApi {
    pub questions: Mutex<NetworkResult<Vec<Question>>>,
    pub recommendation: Mutex<NetworkResult<CourseRecommendation>>,
    pub save_result: Mutex<NetworkResult<StudentAssessmentResult>>,
    pub recommended_for: Mutex<Vec<Vec<Answer>>>,
    pub saved: Mutex<Vec<StudentAssessmentRequest>>,
    /// Holds `list_questions` open this long before answering.
    pub delay: Mutex<Option<Duration>>,
}

impl FakeAssessmentApi {
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions: Mutex::new(NetworkResult::success(200, questions)),
            recommendation: Mutex::new(NetworkResult::success(200, recommendation())),
            save_result: Mutex::new(NetworkResult::success(
                201,
                StudentAssessmentResult {
                    id: 99,
                    recommended_courses: recommendation().courses,
                    created_at: None,
                },
            )),
            recommended_for: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
        }
    }
}

#[async_trait]
impl AssessmentApi for FakeAssessmentApi {
    async fn list_questions(&self) -> NetworkResult<Vec<Question>> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.questions.lock().unwrap().clone()
    }

    async fn recommend_courses(&self, answers: &[Answer]) -> NetworkResult<CourseRecommendation> {
        self.recommended_for.lock().unwrap().push(answers.to_vec());
        self.recommendation.lock().unwrap().clone()
    }

    async fn save_student_assessment(
        &self,
        request: &StudentAssessmentRequest,
    ) -> NetworkResult<StudentAssessmentResult> {
        self.saved.lock().unwrap().push(request.clone());
        self.save_result.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakeUniversityApi;

#[async_trait]
impl UniversityApi for FakeUniversityApi {
    async fn list_universities(&self) -> NetworkResult<Vec<University>> {
        NetworkResult::success(
            200,
            vec![
                University { id: 1, name: "Makerere".into(), logo_url: None },
                University { id: 7, name: "Strathmore".into(), logo_url: None },
            ],
        )
    }

    async fn get_university(&self, university_id: i64) -> NetworkResult<University> {
        if university_id == 7 {
            NetworkResult::success(200, University { id: 7, name: "Strathmore".into(), logo_url: None })
        } else {
            NetworkResult::error(404, "University not found")
        }
    }
}

//=========================================================================================
// Failing Local Stores
//=========================================================================================

fn disk_full() -> PortError {
    PortError::Storage("disk full".into())
}

/// Delegates to a real cache; inserts fail while `fail_inserts` is set.
pub struct FlakyLoginCache {
    inner: Arc<dyn LoginCache>,
    pub fail_inserts: AtomicBool,
}

impl FlakyLoginCache {
    pub fn new(inner: Arc<dyn LoginCache>) -> Self {
        Self {
            inner,
            fail_inserts: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl LoginCache for FlakyLoginCache {
    async fn insert_login_response(&self, record: &LoginRecord) -> PortResult<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(disk_full());
        }
        self.inner.insert_login_response(record).await
    }

    async fn get_login_response(&self) -> PortResult<Option<LoginRecord>> {
        self.inner.get_login_response().await
    }

    async fn clear_login(&self) -> PortResult<()> {
        self.inner.clear_login().await
    }
}

/// Delegates to a real store; token writes fail while `fail_token_writes` is set.
pub struct FlakyCredentialStore {
    inner: Arc<dyn CredentialStore>,
    pub fail_token_writes: AtomicBool,
}

impl FlakyCredentialStore {
    pub fn new(inner: Arc<dyn CredentialStore>) -> Self {
        Self {
            inner,
            fail_token_writes: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl CredentialStore for FlakyCredentialStore {
    async fn save_token(&self, token: &str) -> PortResult<()> {
        if self.fail_token_writes.load(Ordering::SeqCst) {
            return Err(disk_full());
        }
        self.inner.save_token(token).await
    }

    async fn save_university_id(&self, university_id: i64) -> PortResult<()> {
        self.inner.save_university_id(university_id).await
    }

    async fn get_token(&self) -> Option<String> {
        self.inner.get_token().await
    }

    async fn get_university_id(&self) -> i64 {
        self.inner.get_university_id().await
    }

    async fn clear_token(&self) -> PortResult<()> {
        if self.fail_token_writes.load(Ordering::SeqCst) {
            return Err(disk_full());
        }
        self.inner.clear_token().await
    }
}

//=========================================================================================
// AppState Wiring
//=========================================================================================

pub struct TestApp {
    pub state: AppState,
    pub auth: Arc<FakeAuthApi>,
    pub assessment: Arc<FakeAssessmentApi>,
}

pub async fn test_app(questions: Vec<Question>) -> TestApp {
    let db = DbAdapter::open_in_memory().await.unwrap();
    let auth = Arc::new(FakeAuthApi::default());
    let assessment = Arc::new(FakeAssessmentApi::with_questions(questions));
    let config = Config {
        api_base_url: "http://localhost:8080".into(),
        database_path: PathBuf::from(":memory:"),
        log_level: tracing::Level::DEBUG,
        log_json: false,
        request_timeout: Duration::from_secs(1),
    };

    let state = AppState {
        config: Arc::new(config),
        credentials: Arc::new(SqliteCredentialStore::new(db.pool().clone())),
        session_store: Arc::new(SqliteSessionStore::open(db.pool().clone()).await),
        login_cache: Arc::new(db),
        auth_api: auth.clone(),
        assessment_api: assessment.clone(),
        university_api: Arc::new(FakeUniversityApi),
    };
    TestApp {
        state,
        auth,
        assessment,
    }
}
