//! services/client/src/app/auth.rs
//!
//! Account flows: login (password and social), registration, guest access, email
//! verification, profile updates, logout and session restore.
//!
//! Every input is validated before a request is sent. Failures of either the API or
//! local storage come back as `NetworkResult::Error`; nothing here panics or throws.

use pace_core::domain::{
    Credential, GuestKey, LoginRecord, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, RegisterResponse, SocialLoginRequest, SocialProvider, UpdatePasswordRequest,
    UpdateUsernameRequest, UserType, VerifiedAccount, VerifyEmailRequest,
};
use pace_core::network::{NetworkResult, UNKNOWN_STATUS};
use pace_core::ports::{AuthApi, CredentialStore, LoginCache, PortError, PortResult, SessionStore};
use pace_core::validation::{self, ValidationError};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::app::state::AppState;

/// Fields of the sign-up form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub university_id: i64,
}

#[derive(Clone)]
pub struct AuthRepository {
    credentials: Arc<dyn CredentialStore>,
    session_store: Arc<dyn SessionStore>,
    login_cache: Arc<dyn LoginCache>,
    auth_api: Arc<dyn AuthApi>,
}

/// What a login overwrites, kept so a failed write can be undone.
struct StoredLogin {
    token: Option<String>,
    university_id: i64,
    record: Option<LoginRecord>,
}

fn rejected<T>(action: &str, e: ValidationError) -> NetworkResult<T> {
    warn!(action, reason = %e, "Rejected before sending");
    NetworkResult::invalid(e)
}

fn storage_failure<T>(action: &str, e: PortError) -> NetworkResult<T> {
    error!(action, error = %e, "Local storage failed");
    NetworkResult::error(UNKNOWN_STATUS, format!("Could not save your session: {}", e))
}

impl AuthRepository {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        session_store: Arc<dyn SessionStore>,
        login_cache: Arc<dyn LoginCache>,
        auth_api: Arc<dyn AuthApi>,
    ) -> Self {
        Self {
            credentials,
            session_store,
            login_cache,
            auth_api,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.credentials.clone(),
            state.session_store.clone(),
            state.login_cache.clone(),
            state.auth_api.clone(),
        )
    }

    //=====================================================================================
    // Login & Registration
    //=====================================================================================

    pub async fn login(&self, email: &str, password: &str) -> NetworkResult<LoginResponse> {
        if let Err(e) = validation::validate_login(email, password) {
            return rejected("login", e);
        }
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let result = self.auth_api.login(&request).await;
        self.persist_login("login", result).await
    }

    pub async fn social_login(
        &self,
        provider: SocialProvider,
        access_token: &str,
        university_id: i64,
    ) -> NetworkResult<LoginResponse> {
        if access_token.trim().is_empty() {
            return rejected("social_login", ValidationError::MissingSocialToken);
        }
        let university_id = if university_id > 0 {
            university_id
        } else {
            self.credentials.get_university_id().await
        };
        if let Err(e) = validation::validate_university(university_id) {
            return rejected("social_login", e);
        }

        let request = SocialLoginRequest {
            provider,
            access_token: access_token.to_string(),
            university_id,
        };
        let result = self.auth_api.social_login(&request).await;
        self.persist_login("social_login", result).await
    }

    /// Stores token, university and the cache row for a successful login.
    async fn persist_login(
        &self,
        action: &str,
        result: NetworkResult<LoginResponse>,
    ) -> NetworkResult<LoginResponse> {
        let (status, data) = match result {
            NetworkResult::Success { status, data } => (status, data),
            other => return other,
        };
        if let Err(e) = self.store_login(&data).await {
            return storage_failure(action, e);
        }
        info!(action, user = %data.user_name, role = %data.role, "Logged in");
        NetworkResult::success(status, data)
    }

    /// Writes the cached row, then the university, then the token. A failure after
    /// the first write puts the previous login back.
    async fn store_login(&self, response: &LoginResponse) -> PortResult<()> {
        let previous = StoredLogin {
            token: self.credentials.get_token().await,
            university_id: self.credentials.get_university_id().await,
            record: self.login_cache.get_login_response().await?,
        };

        self.login_cache
            .insert_login_response(&response.to_record())
            .await?;
        // The token goes last: until it is written the previous user stays active.
        let written = async {
            if let Some(university_id) = response.university_id {
                self.credentials.save_university_id(university_id).await?;
            }
            self.credentials.save_token(&response.token).await
        };
        if let Err(e) = written.await {
            self.restore_login(previous).await;
            return Err(e);
        }
        Ok(())
    }

    async fn restore_login(&self, previous: StoredLogin) {
        let restored = async {
            match &previous.record {
                Some(record) => self.login_cache.insert_login_response(record).await?,
                None => self.login_cache.clear_login().await?,
            }
            self.credentials
                .save_university_id(previous.university_id)
                .await?;
            match &previous.token {
                Some(token) => self.credentials.save_token(token).await,
                None => self.credentials.clear_token().await,
            }
        };
        match restored.await {
            Ok(()) => warn!("Partial login rolled back"),
            Err(e) => error!(error = %e, "Could not roll back a partial login"),
        }
    }

    /// Creates an account, attributing it to a captured invite when one exists.
    pub async fn register(&self, form: &RegistrationForm) -> NetworkResult<RegisterResponse> {
        if let Err(e) = validation::validate_registration(
            &form.user_name,
            &form.email,
            &form.password,
            &form.confirm_password,
            form.university_id,
        ) {
            return rejected("register", e);
        }

        let dynamic_token = self
            .session_store
            .get_dynamic_link()
            .await
            .filter(|link| link.university_id == form.university_id)
            .map(|link| link.dynamic_token);
        let request = RegisterRequest {
            user_name: form.user_name.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password.clone(),
            university_id: form.university_id,
            dynamic_token,
        };

        let result = self.auth_api.register(&request).await;
        if result.is_success() {
            if let Err(e) = self.credentials.save_university_id(form.university_id).await {
                return storage_failure("register", e);
            }
            info!(user = %request.user_name, invited = request.dynamic_token.is_some(), "Registered");
        }
        result
    }

    /// Reuses the stored guest key or mints a new one.
    pub async fn continue_as_guest(&self) -> PortResult<GuestKey> {
        if let Some(key) = self.session_store.get_guest_key().await {
            return Ok(key);
        }
        let key = GuestKey::generate();
        self.session_store.save_guest_key(&key).await?;
        info!("Started guest session");
        Ok(key)
    }

    //=====================================================================================
    // Email Verification
    //=====================================================================================

    pub async fn send_verification_email(&self, email: &str) -> NetworkResult<MessageResponse> {
        if let Err(e) = validation::validate_email(email) {
            return rejected("send_verification_email", e);
        }
        let result = self.auth_api.send_verification_email(email.trim()).await;
        if result.is_success() {
            if let Err(e) = self.session_store.set_verification_email_sent(true).await {
                return storage_failure("send_verification_email", e);
            }
        }
        result
    }

    /// Confirms the code, then records the verified account and flips the invite flag.
    pub async fn verify_email(&self, email: &str, code: &str) -> NetworkResult<MessageResponse> {
        if let Err(e) = validation::validate_email(email) {
            return rejected("verify_email", e);
        }
        if code.trim().is_empty() {
            return rejected("verify_email", ValidationError::EmptyVerificationCode);
        }

        let request = VerifyEmailRequest {
            email: email.trim().to_string(),
            code: code.trim().to_string(),
        };
        let result = self.auth_api.verify_email(&request).await;
        if !result.is_success() {
            return result;
        }

        let account = VerifiedAccount {
            email: request.email.clone(),
            verified: true,
            verified_at: None,
        };
        let stored = async {
            self.session_store.save_verified_account(&account).await?;
            self.session_store.update_verification(true).await?;
            self.session_store.set_verification_email_sent(false).await
        };
        if let Err(e) = stored.await {
            return storage_failure("verify_email", e);
        }
        info!(email = %request.email, "Email verified");
        result
    }

    //=====================================================================================
    // Profile Updates
    //=====================================================================================

    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> NetworkResult<MessageResponse> {
        if current_password.is_empty() {
            return rejected("update_password", ValidationError::EmptyPassword);
        }
        if let Err(e) = validation::validate_new_password(new_password, confirm_password) {
            return rejected("update_password", e);
        }
        let request = UpdatePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.auth_api.update_password(&request).await
    }

    /// Renames the account and keeps the cached login in step.
    pub async fn update_username(&self, user_name: &str) -> NetworkResult<MessageResponse> {
        if let Err(e) = validation::validate_username(user_name) {
            return rejected("update_username", e);
        }
        let request = UpdateUsernameRequest {
            user_name: user_name.trim().to_string(),
        };
        let result = self.auth_api.update_username(&request).await;
        if !result.is_success() {
            return result;
        }

        let renamed = async {
            if let Some(mut record) = self.login_cache.get_login_response().await? {
                record.user_name = request.user_name.clone();
                self.login_cache.insert_login_response(&record).await?;
            }
            Ok::<(), PortError>(())
        };
        if let Err(e) = renamed.await {
            return storage_failure("update_username", e);
        }
        result
    }

    //=====================================================================================
    // Session Lifecycle
    //=====================================================================================

    /// Clears the token, the cached login and the session store.
    ///
    /// The university id is kept so the next login defaults to the same university.
    pub async fn logout(&self) -> PortResult<()> {
        self.credentials.clear_token().await?;
        self.login_cache.clear_login().await?;
        self.session_store.clear().await?;
        info!("Logged out");
        Ok(())
    }

    /// Reads the cached login once at startup and re-seeds the credential store.
    pub async fn restore_session(&self) -> PortResult<Option<LoginRecord>> {
        let Some(record) = self.login_cache.get_login_response().await? else {
            info!("No cached login to restore");
            return Ok(None);
        };
        self.credentials.save_token(&record.jwt_token).await?;
        if let Some(university_id) = record.university_id {
            self.credentials.save_university_id(university_id).await?;
        }
        info!(user = %record.user_name, "Restored cached login");
        Ok(Some(record))
    }

    pub async fn current_credential(&self) -> Option<Credential> {
        let token = self.credentials.get_token().await?;
        Some(Credential {
            token,
            university_id: self.credentials.get_university_id().await,
        })
    }

    /// `Registered` with a stored token, `Guest` with only a guest key.
    pub async fn active_user_type(&self) -> Option<UserType> {
        if self.credentials.get_token().await.is_some() {
            Some(UserType::Registered)
        } else if self.session_store.get_guest_key().await.is_some() {
            Some(UserType::Guest)
        } else {
            None
        }
    }
}
