//! Request contract between the session store and the backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionStore` only talks to the network through this trait. `HttpBackend`
//! is the production implementation; tests substitute a scripted mock.
//! The default bearer credential lives behind the same seam so the store can
//! keep it in lockstep with its in-memory token.

use serde_json::Value;

use crate::error::ApiError;
use crate::types::{AccessToken, NewUser, RegisteredUser, Registration, TrialGrant, UserProfile, UserUpdate};

#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Attach (`Some`) or remove (`None`) the default `Authorization: Bearer`
    /// credential sent with every subsequent request.
    fn set_bearer(&self, token: Option<&str>);

    /// The currently attached credential.
    fn bearer(&self) -> Option<String>;

    /// `POST /api/auth/login`
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ApiError>;

    /// `POST /api/auth/register`
    async fn register(&self, registration: &Registration) -> Result<RegisteredUser, ApiError>;

    /// `GET /api/auth/me`
    async fn current_user(&self) -> Result<UserProfile, ApiError>;

    /// `GET /api/auth/users`
    async fn list_users(&self) -> Result<Vec<UserProfile>, ApiError>;

    /// `POST /api/auth/users`
    async fn create_user(&self, user: &NewUser) -> Result<UserProfile, ApiError>;

    /// `PUT /api/auth/users/{id}`
    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<UserProfile, ApiError>;

    /// `DELETE /api/auth/users/{id}`
    async fn delete_user(&self, id: i64) -> Result<Value, ApiError>;

    /// `POST /api/users/{id}/trial`
    async fn start_trial(&self, id: i64, grant: TrialGrant) -> Result<Value, ApiError>;
}
