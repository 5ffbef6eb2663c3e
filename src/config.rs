//! Runtime context for one CLI invocation.
//!
//! Environment (`RAG_*`, optionally from `.env`) supplies the defaults;
//! command-line flags override them.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use session::{FileTokenStorage, HttpBackend, SessionConfig, SessionStore};

use crate::CliError;

/// Seconds a question may run before the CLI prints a patience notice.
pub const DEFAULT_SLOW_ANSWER_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct CliContext {
    pub session: SessionConfig,
    pub slow_answer_after: Duration,
    pub json: bool,
}

impl CliContext {
    #[must_use]
    pub fn new(base_url: Option<&str>, token_path: Option<PathBuf>, slow_answer_secs: u64, json: bool) -> Self {
        let mut session = SessionConfig::from_env();
        if let Some(base_url) = base_url {
            session = session.with_base_url(base_url);
        }
        if let Some(token_path) = token_path {
            session = session.with_token_path(token_path);
        }
        Self { session, slow_answer_after: Duration::from_secs(slow_answer_secs), json }
    }

    /// Build the shared HTTP client and a store over it, then resolve any
    /// persisted session before returning.
    pub async fn connect(&self) -> Result<(Arc<HttpBackend>, SessionStore), CliError> {
        let backend = Arc::new(HttpBackend::from_config(&self.session)?);
        let storage = Arc::new(FileTokenStorage::new(&self.session.token_path));
        let store = SessionStore::new(backend.clone(), storage);
        store.initialize().await;
        store.wait_until_resolved().await;
        tracing::debug!(
            base_url = backend.base_url(),
            authenticated = store.is_authenticated(),
            "session resolved"
        );
        Ok((backend, store))
    }
}
