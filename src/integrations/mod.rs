// ABOUTME: Integration gateway contracts for LLM invocation and file upload
// ABOUTME: Request/response types shared by the backend client and direct LLM providers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Integration Gateways
//!
//! The two stateless calls the assistant makes besides entity CRUD:
//!
//! - [`LlmGateway`]: `{prompt, file_urls?, response_json_schema?}` → text or a JSON object
//! - [`FileGateway`]: `{file}` → `{file_url}`
//!
//! Both are pass-through: no retry and no caching.

mod provider;

pub use provider::ProviderLlmGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

use crate::constants::chat::{ACCEPTED_MIME_PREFIXES, ACCEPTED_MIME_TYPES};
use crate::errors::{AppError, AppResult};

// ============================================================================
// LLM
// ============================================================================

/// Input of the LLM integration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvokeLlmRequest {
    /// Full prompt text
    pub prompt: String,
    /// Files the model should look at
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_urls: Vec<String>,
    /// When set, the model must answer with an object matching this schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_json_schema: Option<Value>,
}

impl InvokeLlmRequest {
    /// Free-text request
    #[must_use]
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Attach a file
    #[must_use]
    pub fn with_file(mut self, file_url: impl Into<String>) -> Self {
        self.file_urls.push(file_url.into());
        self
    }

    /// Request structured output matching `schema`
    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_json_schema = Some(schema);
        self
    }
}

/// Output of the LLM integration
#[derive(Debug, Clone, PartialEq)]
pub enum LlmOutput {
    /// Free text answer
    Text(String),
    /// Structured answer
    Json(Value),
    /// The model produced nothing
    Empty,
}

impl LlmOutput {
    /// Text of a free-text answer; structured answers are rendered as JSON
    ///
    /// # Errors
    ///
    /// Returns an external-service error when the model produced nothing.
    pub fn into_text(self) -> AppResult<String> {
        match self {
            Self::Text(text) if !text.trim().is_empty() => Ok(text),
            Self::Json(Value::String(text)) if !text.trim().is_empty() => Ok(text),
            Self::Json(value) if !value.is_null() => Ok(value.to_string()),
            _ => Err(AppError::external_service(
                "InvokeLLM",
                "The model returned an empty response",
            )),
        }
    }

    /// Structured answer, parsing text output when the model ignored JSON mode
    #[must_use]
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(Value::Null) | Self::Empty => None,
            Self::Json(Value::String(text)) | Self::Text(text) => parse_json_reply(&text),
            Self::Json(value) => Some(value),
        }
    }
}

/// Parse a JSON object out of a model reply, tolerating markdown code fences
#[must_use]
pub fn parse_json_reply(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    match serde_json::from_str::<Value>(unfenced) {
        Ok(Value::Null) | Err(_) => None,
        Ok(value) => Some(value),
    }
}

/// Invokes the hosted LLM
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send a prompt and wait for the answer
    async fn invoke_llm(&self, request: InvokeLlmRequest) -> AppResult<LlmOutput>;
}

// ============================================================================
// Files
// ============================================================================

/// A file picked by the user, not yet uploaded
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Original file name
    pub file_name: String,
    /// MIME type
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl FileUpload {
    /// Build an upload, inferring the MIME type from the file name
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name);
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read a file from disk
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the file cannot be read or has no name.
    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                AppError::invalid_input(format!("'{}' is not a file", path.display()))
            })?;
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AppError::invalid_input(format!("Cannot read '{}': {e}", path.display()))
        })?;
        Ok(Self::new(file_name, bytes))
    }

    /// Whether this is an image or a PDF
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        let content_type = self.content_type.to_lowercase();
        ACCEPTED_MIME_PREFIXES
            .iter()
            .any(|prefix| content_type.starts_with(prefix))
            || ACCEPTED_MIME_TYPES.contains(&content_type.as_str())
    }

    /// Check the file is of an accepted kind and not empty
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty files and unsupported types.
    pub fn validate(&self) -> AppResult<()> {
        if self.bytes.is_empty() {
            return Err(AppError::invalid_input(format!(
                "'{}' is empty",
                self.file_name
            )));
        }
        if !self.is_accepted() {
            return Err(AppError::invalid_input(format!(
                "'{}' is not an image or PDF",
                self.file_name
            )));
        }
        Ok(())
    }
}

/// MIME type guessed from the file extension, `application/octet-stream` when unknown
#[must_use]
pub fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_owned()
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Where the stored file can be fetched
    pub file_url: String,
}

/// Stores user files in the backend platform
#[async_trait]
pub trait FileGateway: Send + Sync {
    /// Upload a file and return its public URL
    async fn upload_file(&self, file: FileUpload) -> AppResult<UploadedFile>;
}
