//! reqwest implementation of the backend request contract.
//!
//! DESIGN
//! ======
//! One `reqwest::Client` per process, shared by the session store and the
//! library calls. The default bearer credential is held here rather than in
//! reqwest's default headers so it can be swapped on login/logout without
//! rebuilding the client.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become `ApiError::Status` carrying the backend's
//! `detail`; bodies are read as text first so a malformed success body is a
//! `Decode` error rather than a transport error.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::AuthApi;
use crate::config::{SessionConfig, Timeouts};
use crate::error::ApiError;
use crate::types::{
    AccessToken, LoginRequest, NewUser, RegisteredUser, Registration, TrialGrant, UserProfile, UserUpdate,
};

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    bearer: RwLock<Option<String>>,
}

impl HttpBackend {
    /// Build a client for `base_url` with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Build` if the TLS backend cannot be initialized.
    pub fn new(base_url: &str, timeouts: Timeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::Build(e.to_string()))?;
        Ok(Self { http, base_url: crate::config::normalize_base_url(base_url), bearer: RwLock::new(None) })
    }

    /// # Errors
    ///
    /// Returns `ApiError::Build` if the HTTP client cannot be constructed.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, config.timeouts)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Start a request with the default credential attached, if any.
    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a prepared request and decode a JSON success body.
    pub(crate) async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "backend rejected request");
            return Err(ApiError::from_status(status.as_u16(), &text));
        }
        parse_body(&text)
    }

    pub(crate) async fn call<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, ApiError> {
        tracing::debug!(%method, path, "backend request");
        self.send(self.request(method, path)).await
    }

    pub(crate) async fn call_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        tracing::debug!(%method, path, "backend request");
        self.send(self.request(method, path).json(body)).await
    }
}

/// Decode a success body. An empty body reads as JSON `null` so endpoints
/// answering `204` can still target `Value`.
fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

pub(crate) fn user_path(id: i64) -> String {
    format!("/api/auth/users/{id}")
}

pub(crate) fn trial_path(id: i64) -> String {
    format!("/api/users/{id}/trial")
}

#[async_trait::async_trait]
impl AuthApi for HttpBackend {
    fn set_bearer(&self, token: Option<&str>) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = token.map(ToOwned::to_owned);
    }

    fn bearer(&self) -> Option<String> {
        self.bearer.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ApiError> {
        self.call_json(Method::POST, "/api/auth/login", &LoginRequest { email, password }).await
    }

    async fn register(&self, registration: &Registration) -> Result<RegisteredUser, ApiError> {
        self.call_json(Method::POST, "/api/auth/register", registration).await
    }

    async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.call(Method::GET, "/api/auth/me").await
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.call(Method::GET, "/api/auth/users").await
    }

    async fn create_user(&self, user: &NewUser) -> Result<UserProfile, ApiError> {
        self.call_json(Method::POST, "/api/auth/users", user).await
    }

    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<UserProfile, ApiError> {
        self.call_json(Method::PUT, &user_path(id), update).await
    }

    async fn delete_user(&self, id: i64) -> Result<Value, ApiError> {
        self.call(Method::DELETE, &user_path(id)).await
    }

    async fn start_trial(&self, id: i64, grant: TrialGrant) -> Result<Value, ApiError> {
        self.call_json(Method::POST, &trial_path(id), &grant).await
    }
}
