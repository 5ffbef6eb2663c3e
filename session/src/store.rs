//! The process-wide session store.
//!
//! SYSTEM CONTEXT
//! ==============
//! Single source of truth for who is logged in and what they may do, and the
//! sole owner of the bearer token's lifecycle. One instance is built at
//! startup and passed by reference to every consumer; consumers read
//! snapshots and call operations but never touch token storage or the
//! request credential themselves.
//!
//! DESIGN
//! ======
//! State lives in a `tokio::sync::watch` channel: reads are a short borrow
//! and never wait on network activity, and consumers that must defer an
//! authorization decision can await `loading == false` on a receiver.
//! Every token mutation updates durable storage, the request credential and
//! the in-memory token together, so a non-null in-memory token always matches
//! the attached credential.
//!
//! RECOVERY POLICY
//! ===============
//! A failed session resolution (expired or rejected token, unreachable
//! backend at startup) is recovered locally: the store logs out and the
//! caller observes a cleared session rather than an error.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::watch;

use crate::backend::AuthApi;
use crate::error::{ApiError, AuthError, RegistrationError, RegistrationErrorKind};
use crate::storage::TokenStorage;
use crate::tier::{self, TierLimits};
use crate::types::{NewUser, RegisteredUser, Registration, Tier, TrialGrant, UserProfile, UserUpdate};

// =============================================================================
// SESSION SNAPSHOT
// =============================================================================

/// The client-side record of the current credential and user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// Present iff a login or restore succeeded and no logout happened since.
    pub token: Option<String>,
    /// Set only after a successful authenticated profile fetch.
    pub user: Option<UserProfile>,
    /// True until the initial resolution finishes, successfully or not.
    pub loading: bool,
}

impl Session {
    /// State at process start: nothing known yet.
    #[must_use]
    pub fn unresolved() -> Self {
        Self { token: None, user: None, loading: true }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        tier::is_authenticated(self.user.as_ref())
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        tier::is_admin(self.user.as_ref())
    }

    #[must_use]
    pub fn is_in_trial(&self) -> bool {
        tier::is_in_trial(self.user.as_ref())
    }

    #[must_use]
    pub fn effective_tier(&self) -> Tier {
        tier::effective_tier(self.user.as_ref())
    }

    #[must_use]
    pub fn tier_limits(&self) -> TierLimits {
        tier::effective_limits(self.user.as_ref())
    }
}

/// Clears `loading` when dropped, so resolution always finishes it even if
/// the future is dropped mid-request.
struct FinishLoading<'a>(&'a watch::Sender<Session>);

impl Drop for FinishLoading<'_> {
    fn drop(&mut self) {
        finish_loading(self.0);
    }
}

fn finish_loading(state: &watch::Sender<Session>) {
    state.send_if_modified(|s| std::mem::replace(&mut s.loading, false));
}

/// Outcome of one profile fetch.
enum Resolution {
    Resolved(UserProfile),
    /// The token changed while the request was in flight; the answer belongs
    /// to a credential that is no longer current.
    Superseded,
}

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn TokenStorage>,
    state: watch::Sender<Session>,
    initialized: AtomicBool,
}

impl SessionStore {
    /// Build a store in the unresolved state. Call [`initialize`](Self::initialize)
    /// once to restore a persisted session.
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn TokenStorage>) -> Self {
        Self { api, storage, state: watch::Sender::new(Session::unresolved()), initialized: AtomicBool::new(false) }
    }

    /// Restore the session from durable storage. Runs at most once per store;
    /// later calls return immediately.
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        let stored = self.storage.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read stored token; starting logged out");
            None
        });

        match stored {
            Some(token) => {
                tracing::info!("restoring stored session");
                self.attach(&token);
                self.fetch_current_user().await;
            }
            None => {
                tracing::debug!("no stored session");
                finish_loading(&self.state);
            }
        }
    }

    // -------------------------------------------------------------------------
    // reads
    // -------------------------------------------------------------------------

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that observes every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Wait until the initial resolution has finished and return the session
    /// at that point. Never returns if [`initialize`](Self::initialize) is
    /// never called.
    pub async fn wait_until_resolved(&self) -> Session {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|s| !s.loading).await {
            Ok(session) => session.clone(),
            Err(_) => self.session(),
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    #[must_use]
    pub fn is_in_trial(&self) -> bool {
        self.state.borrow().is_in_trial()
    }

    #[must_use]
    pub fn effective_tier(&self) -> Tier {
        self.state.borrow().effective_tier()
    }

    #[must_use]
    pub fn tier_limits(&self) -> TierLimits {
        self.state.borrow().tier_limits()
    }

    // -------------------------------------------------------------------------
    // session operations
    // -------------------------------------------------------------------------

    /// Resolve the user behind the current token.
    ///
    /// Failures are recovered by logging out and yield `None`. `loading` is
    /// false when this returns, whatever the outcome.
    pub async fn fetch_current_user(&self) -> Option<UserProfile> {
        match self.resolve().await {
            Ok(Resolution::Resolved(user)) => Some(user),
            Ok(Resolution::Superseded) => self.user(),
            Err(_) => None,
        }
    }

    /// Exchange credentials for a token, persist it, and resolve the profile.
    ///
    /// # Errors
    ///
    /// - `MissingCredentials` if either field is empty (nothing is sent).
    /// - `InvalidCredentials` with the backend's message when rejected.
    /// - `Storage` if the token cannot be persisted; nothing is committed.
    /// - Any resolution error, after which the session has been cleared.
    ///
    /// If a concurrent login replaces the token while this one resolves, the
    /// current user is returned; `Unauthenticated` only if none is set.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let token = self.api.login(email, password).await.map_err(|e| {
            tracing::warn!(error = %e, "login rejected");
            AuthError::from_login(e)
        })?;

        self.storage.save(&token.access_token)?;
        self.attach(&token.access_token);
        tracing::info!("logged in");

        match self.resolve().await? {
            Resolution::Resolved(user) => Ok(user),
            // A later login replaced this token; report whoever it resolved to.
            Resolution::Superseded => self.user().ok_or(AuthError::Unauthenticated),
        }
    }

    /// Create an account. Does not touch the current session.
    ///
    /// # Errors
    ///
    /// Returns a `RegistrationError` carrying the message to show the user.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisteredUser, RegistrationError> {
        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(RegistrationError::new(
                RegistrationErrorKind::ValidationFailed,
                "username, email and password are required",
            ));
        }

        let registration =
            Registration { username: username.to_owned(), email: email.to_owned(), password: password.to_owned() };
        self.api.register(&registration).await.map_err(|e| {
            tracing::warn!(error = %e, "registration rejected");
            RegistrationError::from(e)
        })
    }

    /// Drop the session: user, in-memory token, stored token and request
    /// credential. Idempotent.
    pub fn logout(&self) {
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "could not remove stored token");
        }
        let changed = self.state.send_if_modified(|s| {
            let had_session = s.token.is_some() || s.user.is_some();
            s.token = None;
            s.user = None;
            had_session
        });
        self.api.set_bearer(None);
        if changed {
            tracing::info!("logged out");
        }
    }

    // -------------------------------------------------------------------------
    // admin passthroughs (authorization is enforced by the backend)
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Propagates the backend's error, e.g. 403 for non-admins.
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.api.list_users().await
    }

    /// # Errors
    ///
    /// Propagates the backend's error.
    pub async fn create_user(&self, user: &NewUser) -> Result<UserProfile, ApiError> {
        self.api.create_user(user).await
    }

    /// # Errors
    ///
    /// Propagates the backend's error.
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<UserProfile, ApiError> {
        self.api.update_user(id, update).await
    }

    /// # Errors
    ///
    /// Propagates the backend's error.
    pub async fn delete_user(&self, id: i64) -> Result<Value, ApiError> {
        self.api.delete_user(id).await
    }

    /// # Errors
    ///
    /// Propagates the backend's error.
    pub async fn start_trial(&self, id: i64, grant: TrialGrant) -> Result<Value, ApiError> {
        self.api.start_trial(id, grant).await
    }

    // -------------------------------------------------------------------------
    // internals
    // -------------------------------------------------------------------------

    /// Make `token` the current credential. Storage is the caller's concern.
    fn attach(&self, token: &str) {
        self.api.set_bearer(Some(token));
        self.state.send_modify(|s| s.token = Some(token.to_owned()));
    }

    /// One profile fetch with the loading finalizer and recovery policy.
    async fn resolve(&self) -> Result<Resolution, AuthError> {
        let _finish = FinishLoading(&self.state);
        let Some(token) = self.token() else {
            self.recover(&AuthError::Unauthenticated);
            return Err(AuthError::Unauthenticated);
        };

        match self.api.current_user().await {
            Ok(user) => {
                let current = self.state.send_if_modified(|s| {
                    if s.token.as_deref() == Some(token.as_str()) {
                        s.user = Some(user.clone());
                        true
                    } else {
                        false
                    }
                });
                if current {
                    tracing::debug!(user_id = user.id, "session resolved");
                    Ok(Resolution::Resolved(user))
                } else {
                    tracing::debug!("token changed during resolution; discarding profile");
                    Ok(Resolution::Superseded)
                }
            }
            Err(e) => {
                if self.token().as_deref() != Some(token.as_str()) {
                    tracing::debug!("token changed during resolution; ignoring stale failure");
                    return Ok(Resolution::Superseded);
                }
                let err = AuthError::from_resolution(e);
                self.recover(&err);
                Err(err)
            }
        }
    }

    fn recover(&self, err: &AuthError) {
        match err {
            AuthError::Unauthenticated => tracing::info!("stored session rejected; logging out"),
            other => tracing::warn!(error = %other, "session resolution failed; logging out"),
        }
        self.logout();
    }
}
