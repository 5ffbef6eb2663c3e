//! # session
//!
//! Client-side authentication context for the RAG op Maat document assistant.
//!
//! `SessionStore` owns the bearer token's lifecycle (login, restore at
//! startup, logout) and exposes the current user with the authorization
//! facts derived from it. `HttpBackend` is the shared HTTP client every
//! other backend call goes through.

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod library;
pub mod storage;
pub mod store;
pub mod tier;
pub mod types;

pub use backend::AuthApi;
pub use config::SessionConfig;
pub use error::{ApiError, AuthError, RegistrationError, RegistrationErrorKind, StorageError};
pub use http::HttpBackend;
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use store::{Session, SessionStore};
pub use tier::{Limit, TierLimits, TrialStatus};
pub use types::{Role, Tier, UserProfile};
