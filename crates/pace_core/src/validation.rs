//! crates/pace_core/src/validation.rs
//!
//! Input checks run before any request leaves the device.

use regex::Regex;
use std::sync::OnceLock;

/// Keep in step with the `PasswordTooShort` message.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Email must not be empty")]
    EmptyEmail,
    #[error("Email address is not valid")]
    InvalidEmail,
    #[error("Password must not be empty")]
    EmptyPassword,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Username must not be empty")]
    EmptyUsername,
    #[error("Please select a university")]
    UniversityNotSelected,
    #[error("Verification code must not be empty")]
    EmptyVerificationCode,
    #[error("Social login token is missing")]
    MissingSocialToken,
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if !email_pattern().is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(())
}

/// Checks a new password and its confirmation.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_username(user_name: &str) -> Result<(), ValidationError> {
    if user_name.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    Ok(())
}

/// A university id of `0` means none was picked.
pub fn validate_university(university_id: i64) -> Result<(), ValidationError> {
    if university_id <= 0 {
        return Err(ValidationError::UniversityNotSelected);
    }
    Ok(())
}

pub fn validate_registration(
    user_name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
    university_id: i64,
) -> Result<(), ValidationError> {
    validate_username(user_name)?;
    validate_email(email)?;
    validate_new_password(password, confirm_password)?;
    validate_university(university_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_email_and_password() {
        assert_eq!(validate_login("", "secret"), Err(ValidationError::EmptyEmail));
        assert_eq!(
            validate_login("ada@pace.edu", ""),
            Err(ValidationError::EmptyPassword)
        );
        assert_eq!(
            validate_login("not-an-email", "x"),
            Err(ValidationError::InvalidEmail)
        );
        assert!(validate_login(" ada@pace.edu ", "x").is_ok());
    }

    #[test]
    fn email_pattern_rejects_malformed_addresses() {
        for bad in ["ada", "ada@", "@pace.edu", "ada@pace", "ada lovelace@pace.edu"] {
            assert_eq!(validate_email(bad), Err(ValidationError::InvalidEmail), "{}", bad);
        }
        assert!(validate_email("ada.lovelace@pace.ac.ke").is_ok());
    }

    #[test]
    fn registration_checks_run_in_form_order() {
        assert_eq!(
            validate_registration("", "ada@pace.edu", "secret1", "secret1", 3),
            Err(ValidationError::EmptyUsername)
        );
        assert_eq!(
            validate_registration("ada", "ada@pace.edu", "secret1", "secret2", 3),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_registration("ada", "ada@pace.edu", "abc", "abc", 3),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_registration("ada", "ada@pace.edu", "secret1", "secret1", 0),
            Err(ValidationError::UniversityNotSelected)
        );
        assert!(validate_registration("ada", "ada@pace.edu", "secret1", "secret1", 3).is_ok());
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            ValidationError::PasswordTooShort.to_string(),
            "Password must be at least 6 characters"
        );
    }
}
