//! Error taxonomy for session and API operations.
//!
//! DESIGN
//! ======
//! Transport-level failures are `ApiError`. The store maps them into the
//! caller-facing shapes: `AuthError` for login and session resolution,
//! `RegistrationError` for the registration form. Admin passthroughs hand
//! `ApiError` through untouched.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::path::PathBuf;

use serde_json::Value;

/// Fallback message when a rejected login carries no `detail`.
pub const LOGIN_FAILED: &str = "Login failed";
/// Fallback message when a rejected registration carries no `detail`.
pub const REGISTRATION_FAILED: &str = "Registration failed";

// =============================================================================
// API ERROR
// =============================================================================

/// Errors produced by a single backend request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    Build(String),

    /// A local file to send could not be read.
    #[error("cannot read {path}: {message}")]
    File { path: String, message: String },
}

impl ApiError {
    /// Build a status error from a raw response body, pulling out `detail`.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        Self::Status { status, detail: detail_message(body) }
    }

    /// HTTP status, when the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend-supplied `detail` message, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// True for 401 responses: the attached credential was rejected.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Extract a human-readable message from a FastAPI error body.
///
/// `detail` is either a string or, for request validation failures, a list of
/// `{loc, msg, type}` objects whose `msg` fields are joined with `"; "`.
#[must_use]
pub fn detail_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() { None } else { Some(messages.join("; ")) }
        }
        _ => None,
    }
}

// =============================================================================
// AUTH ERROR
// =============================================================================

/// Failures of login and session resolution.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The stored or attached token was rejected. Recovered locally by
    /// logging out; never shown to the user during startup.
    #[error("session is no longer valid")]
    Unauthenticated,

    /// Email or password was empty; nothing was sent.
    #[error("email and password are required")]
    MissingCredentials,

    /// The backend rejected the credentials. Carries its `detail` message.
    #[error("{0}")]
    InvalidCredentials(String),

    /// The request could not complete.
    #[error("could not reach the server: {0}")]
    NetworkFailure(String),

    /// The backend failed while handling a valid request.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The token could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Classify a failed `POST /api/auth/login`.
    #[must_use]
    pub fn from_login(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, detail } if (400..500).contains(&status) => {
                Self::InvalidCredentials(detail.unwrap_or_else(|| LOGIN_FAILED.to_owned()))
            }
            ApiError::Status { status, detail } => {
                Self::Server { status, message: detail.unwrap_or_else(|| LOGIN_FAILED.to_owned()) }
            }
            ApiError::Network(message) | ApiError::Build(message) => Self::NetworkFailure(message),
            ApiError::File { message, .. } => Self::NetworkFailure(message),
            ApiError::Decode(message) => {
                Self::Server { status: 200, message: format!("unexpected response: {message}") }
            }
        }
    }

    /// Classify a failed `GET /api/auth/me`.
    #[must_use]
    pub fn from_resolution(err: ApiError) -> Self {
        match err {
            ApiError::Network(message) | ApiError::Build(message) => Self::NetworkFailure(message),
            ApiError::Status { status, detail } if status != 401 && status != 403 => {
                Self::Server { status, message: detail.unwrap_or_default() }
            }
            _ => Self::Unauthenticated,
        }
    }
}

// =============================================================================
// REGISTRATION ERROR
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationErrorKind {
    /// The submitted fields were rejected.
    ValidationFailed,
    /// Username or email is already taken.
    Conflict,
    /// Anything else, including transport failures.
    Unknown,
}

/// A rejected registration: a kind plus the message to render in the form.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RegistrationError {
    pub kind: RegistrationErrorKind,
    pub message: String,
}

impl RegistrationError {
    #[must_use]
    pub fn new(kind: RegistrationErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

impl From<ApiError> for RegistrationError {
    fn from(err: ApiError) -> Self {
        let kind = match &err {
            ApiError::Status { status: 409, .. } => RegistrationErrorKind::Conflict,
            ApiError::Status { status: 400, detail } => {
                if detail.as_deref().is_some_and(|d| d.to_lowercase().contains("already")) {
                    RegistrationErrorKind::Conflict
                } else {
                    RegistrationErrorKind::ValidationFailed
                }
            }
            ApiError::Status { status: 422, .. } => RegistrationErrorKind::ValidationFailed,
            _ => RegistrationErrorKind::Unknown,
        };
        let message = err.detail().unwrap_or(REGISTRATION_FAILED).to_owned();
        Self { kind, message }
    }
}

// =============================================================================
// STORAGE ERROR
// =============================================================================

/// Failures of the durable token store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("token storage I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
