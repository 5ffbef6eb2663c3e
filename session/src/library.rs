//! Document library and question answering calls.
//!
//! SYSTEM CONTEXT
//! ==============
//! These endpoints sit behind the same bearer credential the session store
//! attaches, so they are plain methods on `HttpBackend`: callers resolve the
//! session first, then use the shared client.

#[cfg(test)]
#[path = "library_test.rs"]
mod library_test;

use std::path::Path;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpBackend;

/// File extensions the backend ingests.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "md", "txt"];

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    #[serde(default)]
    pub filename: String,
    pub original_filename: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub uploaded_at: String,
    #[serde(default)]
    pub is_processed: bool,
    #[serde(default)]
    pub chunk_count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Question<'a> {
    pub question: &'a str,
    /// Restrict retrieval to one document; `None` searches all of them.
    pub document_id: Option<i64>,
}

/// A retrieved passage backing an answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub relevance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub source_count: usize,
    #[serde(default)]
    pub document_filter: Option<String>,
    /// Seconds the backend spent generating the answer.
    #[serde(default)]
    pub processing_time: Option<f64>,
    #[serde(default)]
    pub warning: Option<String>,
}

/// One entry of the question history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Acknowledgement returned by delete endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// CALLS
// =============================================================================

impl HttpBackend {
    /// `GET /api/documents`
    pub async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        self.call(Method::GET, "/api/documents").await
    }

    /// `POST /api/upload` with the file as multipart field `file`.
    pub async fn upload_document(&self, file_name: &str, bytes: Vec<u8>) -> Result<Document, ApiError> {
        let part = Part::bytes(bytes).file_name(file_name.to_owned());
        let form = Form::new().part("file", part);
        tracing::debug!(file_name, "uploading document");
        self.send(self.request(Method::POST, "/api/upload").multipart(form)).await
    }

    /// Read `path` from disk and upload it under its file name.
    pub async fn upload_path(&self, path: &Path) -> Result<Document, ApiError> {
        let file_error = |message: String| ApiError::File { path: path.display().to_string(), message };
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| file_error("not a file path".to_owned()))?;
        let bytes = tokio::fs::read(path).await.map_err(|e| file_error(e.to_string()))?;
        self.upload_document(file_name, bytes).await
    }

    /// `DELETE /api/documents/{id}`
    pub async fn delete_document(&self, id: i64) -> Result<Message, ApiError> {
        self.call(Method::DELETE, &format!("/api/documents/{id}")).await
    }

    /// `POST /api/query`
    pub async fn ask(&self, question: &Question<'_>) -> Result<Answer, ApiError> {
        self.call_json(Method::POST, "/api/query", question).await
    }

    /// `GET /api/queries`, newest first.
    pub async fn list_queries(&self) -> Result<Vec<QueryRecord>, ApiError> {
        self.call(Method::GET, "/api/queries").await
    }

    /// `DELETE /api/queries/{id}`
    pub async fn delete_query(&self, id: i64) -> Result<Message, ApiError> {
        self.call(Method::DELETE, &format!("/api/queries/{id}")).await
    }

    /// `DELETE /api/queries`
    pub async fn clear_queries(&self) -> Result<Message, ApiError> {
        self.call(Method::DELETE, "/api/queries").await
    }

    /// `GET /api/subscriptions`: the public tier catalogue, passed through as-is.
    pub async fn subscriptions(&self) -> Result<Value, ApiError> {
        self.call(Method::GET, "/api/subscriptions").await
    }
}

/// Whether the backend will accept a file with this name.
#[must_use]
pub fn is_supported_file(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
}
