//! crates/pace_core/src/network.rs
//!
//! The tri-state envelope every remote call reports through.

use serde::de::DeserializeOwned;

use crate::validation::ValidationError;

/// Status reported when a failure never reached the HTTP layer.
pub const UNKNOWN_STATUS: u16 = 0;

/// Message for a successful response that carried no body.
pub const EMPTY_BODY_MESSAGE: &str = "Response body is empty";

/// Outcome of a remote call.
///
/// `Loading` is published explicitly while a request is outstanding; it is never
/// inferred from the absence of the other two.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkResult<T> {
    Success { status: u16, data: T },
    Error { status: u16, message: String },
    Loading,
}

impl<T> NetworkResult<T> {
    pub fn success(status: u16, data: T) -> Self {
        NetworkResult::Success { status, data }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        NetworkResult::Error {
            status,
            message: message.into(),
        }
    }

    /// A failure that happened below HTTP (connect, timeout, TLS, ...).
    pub fn transport_error(message: impl Into<String>) -> Self {
        Self::error(UNKNOWN_STATUS, message)
    }

    /// A request rejected before it was sent.
    pub fn invalid(error: ValidationError) -> Self {
        Self::error(UNKNOWN_STATUS, error.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, NetworkResult::Success { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, NetworkResult::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            NetworkResult::Success { data, .. } => Some(data),
            NetworkResult::Error { .. } | NetworkResult::Loading => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            NetworkResult::Error { message, .. } => Some(message),
            NetworkResult::Success { .. } | NetworkResult::Loading => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> NetworkResult<U> {
        match self {
            NetworkResult::Success { status, data } => NetworkResult::Success {
                status,
                data: f(data),
            },
            NetworkResult::Error { status, message } => NetworkResult::Error { status, message },
            NetworkResult::Loading => NetworkResult::Loading,
        }
    }

    /// Drops the payload, keeping the outcome. Used to publish UI status.
    pub fn as_status(&self) -> NetworkResult<()> {
        match self {
            NetworkResult::Success { status, .. } => NetworkResult::success(*status, ()),
            NetworkResult::Error { status, message } => NetworkResult::error(*status, message.clone()),
            NetworkResult::Loading => NetworkResult::Loading,
        }
    }
}

impl<T: DeserializeOwned> NetworkResult<T> {
    /// Maps a raw HTTP response onto the envelope.
    ///
    /// Success with a JSON body decodes it, success with an empty or `null` body is
    /// an error, and any other status becomes an error carrying the server's message.
    pub fn from_http(status: u16, is_success: bool, body: &str) -> Self {
        let trimmed = body.trim();
        if !is_success {
            return Self::error(status, error_message_from_body(trimmed, status));
        }
        if trimmed.is_empty() || trimmed == "null" {
            return Self::error(status, EMPTY_BODY_MESSAGE);
        }
        match serde_json::from_str::<T>(trimmed) {
            Ok(data) => Self::success(status, data),
            Err(e) => Self::error(status, format!("Failed to decode response: {}", e)),
        }
    }
}

/// Pulls a human-readable message out of an error body.
fn error_message_from_body(body: &str, status: u16) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    if body.is_empty() {
        format!("Request failed with status {}", status)
    } else {
        body.to_string()
    }
}
