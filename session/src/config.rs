//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const TOKEN_FILE_NAME: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Backend base address without a trailing slash.
    pub base_url: String,
    /// Where the bearer token is persisted between runs.
    pub token_path: PathBuf,
    pub timeouts: Timeouts,
}

impl SessionConfig {
    /// Build typed config from environment variables.
    ///
    /// All optional:
    /// - `RAG_API_BASE_URL`: default `http://localhost:8001`
    /// - `RAG_TOKEN_PATH`: default `<platform config dir>/ragopmaat/token`
    /// - `RAG_REQUEST_TIMEOUT_SECS`: default 120
    /// - `RAG_CONNECT_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = normalize_base_url(&std::env::var("RAG_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()));
        let token_path = std::env::var_os("RAG_TOKEN_PATH").map_or_else(default_token_path, PathBuf::from);
        let timeouts = Timeouts {
            request_secs: env_parse_u64("RAG_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("RAG_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Self { base_url, token_path, timeouts }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    #[must_use]
    pub fn with_token_path(mut self, token_path: impl Into<PathBuf>) -> Self {
        self.token_path = token_path.into();
        self
    }
}

#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

/// Per-user config directory, falling back to the working directory when the
/// platform has no notion of one.
#[must_use]
pub fn default_token_path() -> PathBuf {
    directories::ProjectDirs::from("nl", "ragopmaat", "ragopmaat").map_or_else(
        || PathBuf::from(".ragopmaat").join(TOKEN_FILE_NAME),
        |dirs| dirs.config_dir().join(TOKEN_FILE_NAME),
    )
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
