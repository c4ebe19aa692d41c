// ABOUTME: Generic OpenAI-compatible LLM provider for local and cloud endpoints
// ABOUTME: Presets for Ollama-style local servers, Groq, and OpenAI with JSON mode and vision
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # `OpenAI`-Compatible Provider
//!
//! Implementation for any endpoint speaking the `OpenAI` chat completions API.
//!
//! ## Presets
//!
//! - [`OpenAiCompatibleConfig::local`]: Ollama, vLLM, `LocalAI` (`LOCAL_LLM_BASE_URL`, `LOCAL_LLM_API_KEY`)
//! - [`OpenAiCompatibleConfig::groq`]: Groq cloud (`GROQ_API_KEY`)
//! - [`OpenAiCompatibleConfig::openai`]: `OpenAI` (`OPENAI_API_KEY`)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::{
    ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, ResponseFormat,
    TokenUsage,
};
use crate::errors::{AppError, ErrorCode};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default base URL for local servers (Ollama)
pub const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:11434/v1";

/// Default model for local inference
pub const DEFAULT_LOCAL_MODEL: &str = "qwen2.5:14b-instruct";

/// Groq API base URL
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default Groq model
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// `OpenAI` API base URL
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default `OpenAI` model
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Connection timeout (lenient for local servers)
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default request timeout
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

/// OpenAI-compatible API request structure
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAiResponseFormat>,
}

/// `response_format` body field
#[derive(Debug, Serialize)]
struct OpenAiResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// Message structure for OpenAI-compatible API
#[derive(Debug, Clone, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: OpenAiContent,
}

/// Plain string content, or text plus image parts for vision models
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum OpenAiContent {
    Text(String),
    Parts(Vec<OpenAiContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAiContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAiImageUrl },
}

#[derive(Debug, Clone, Serialize)]
struct OpenAiImageUrl {
    url: String,
}

/// OpenAI-compatible API response structure
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    model: String,
}

/// Choice in response
#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

/// Message in response
#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

/// Usage statistics in response
#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

/// Error response structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., <http://localhost:11434/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Default model to use
    pub default_model: String,
    /// Provider name for logging
    pub provider_name: &'static str,
    /// Provider display name
    pub display_name: &'static str,
    /// Capabilities of this provider
    pub capabilities: LlmCapabilities,
    /// Whole-request timeout
    pub request_timeout: Duration,
}

impl OpenAiCompatibleConfig {
    /// Local server (Ollama, vLLM, `LocalAI`) at `base_url`
    #[must_use]
    pub fn local(base_url: &str, api_key: Option<String>, model: &str) -> Self {
        let (provider_name, display_name) = if base_url.contains(":11434") {
            ("ollama", "Ollama (Local)")
        } else if base_url.contains(":8000") {
            ("vllm", "vLLM (Local)")
        } else if base_url.contains(":8080") {
            ("localai", "LocalAI")
        } else {
            ("local", "Local LLM")
        };

        Self {
            base_url: base_url.to_owned(),
            api_key: api_key.filter(|k| !k.is_empty()),
            default_model: model.to_owned(),
            provider_name,
            display_name,
            capabilities: LlmCapabilities::SYSTEM_MESSAGES | LlmCapabilities::JSON_MODE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Groq cloud inference
    #[must_use]
    pub fn groq(api_key: String, model: &str) -> Self {
        Self {
            base_url: GROQ_BASE_URL.to_owned(),
            api_key: Some(api_key),
            default_model: model.to_owned(),
            provider_name: "groq",
            display_name: "Groq (Llama)",
            capabilities: LlmCapabilities::SYSTEM_MESSAGES | LlmCapabilities::JSON_MODE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// `OpenAI` chat completions
    #[must_use]
    pub fn openai(api_key: String, model: &str) -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_owned(),
            api_key: Some(api_key),
            default_model: model.to_owned(),
            provider_name: "openai",
            display_name: "OpenAI",
            capabilities: LlmCapabilities::full_featured(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Override the request timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self::local(DEFAULT_LOCAL_BASE_URL, None, DEFAULT_LOCAL_MODEL)
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Generic `OpenAI`-compatible LLM provider
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            "Initializing {} provider: base_url={}, model={}",
            config.display_name, config.base_url, config.default_model
        );

        Ok(Self { client, config })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Convert internal messages to `OpenAI` format
    ///
    /// Images are only sent to vision-capable providers; others get the text alone.
    fn convert_messages(&self, messages: &[ChatMessage]) -> Vec<OpenAiMessage> {
        let vision = self.config.capabilities.supports_vision();
        messages
            .iter()
            .map(|msg| {
                let content = if vision && !msg.image_urls.is_empty() {
                    let mut parts = vec![OpenAiContentPart::Text {
                        text: msg.content.clone(),
                    }];
                    parts.extend(msg.image_urls.iter().map(|url| OpenAiContentPart::ImageUrl {
                        image_url: OpenAiImageUrl { url: url.clone() },
                    }));
                    OpenAiContent::Parts(parts)
                } else {
                    OpenAiContent::Text(msg.content.clone())
                };
                OpenAiMessage {
                    role: msg.role.as_str(),
                    content,
                }
            })
            .collect()
    }

    /// Parse error response from API
    fn parse_error_response(&self, status: reqwest::StatusCode, body: &str) -> AppError {
        let service = self.config.display_name;
        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            let error_type = error_response
                .error
                .error_type
                .unwrap_or_else(|| "unknown".to_owned());

            match status.as_u16() {
                401 => AppError::auth_invalid(format!(
                    "API authentication failed: {}",
                    error_response.error.message
                )),
                429 => AppError::new(
                    ErrorCode::ExternalRateLimited,
                    Self::extract_rate_limit_message(&error_response.error.message),
                ),
                400 => AppError::invalid_input(format!(
                    "API validation error: {}",
                    error_response.error.message
                )),
                404 => AppError::not_found(format!(
                    "Model or endpoint ({})",
                    error_response.error.message
                )),
                503 => AppError::unavailable(service, error_response.error.message),
                _ => AppError::external_service(
                    service,
                    format!("{} - {}", error_type, error_response.error.message),
                ),
            }
        } else {
            // Non-JSON bodies are common with local servers
            match status.as_u16() {
                502..=504 => AppError::unavailable(
                    service,
                    format!("Server at {} is not responding", self.config.base_url),
                ),
                _ => AppError::external_service(
                    service,
                    format!(
                        "API error ({}): {}",
                        status,
                        body.chars().take(200).collect::<String>()
                    ),
                ),
            }
        }
    }

    /// Extract a user-friendly rate limit message ("try again in 7.5s" → 8 seconds)
    fn extract_rate_limit_message(message: &str) -> String {
        let lower = message.to_lowercase();
        if let Some(retry_pos) = lower.find("try again in ") {
            let after_prefix = &lower[retry_pos + 13..];
            if let Some(end_pos) = after_prefix.find(|c: char| !c.is_ascii_digit() && c != '.') {
                if let Ok(seconds) = after_prefix[..end_pos].parse::<f64>() {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let seconds_int = seconds.ceil() as u64;
                    return format!(
                        "LLM rate limit reached. Please try again in {seconds_int} seconds."
                    );
                }
            }
        }
        "LLM rate limit reached. Please wait a moment and try again.".to_owned()
    }

    /// Add authorization header if API key is configured
    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.bearer_auth(api_key)
        } else {
            request
        }
    }

    fn connect_error(&self, e: &reqwest::Error) -> AppError {
        error!("Failed to send request to {}: {}", self.config.provider_name, e);
        if e.is_connect() || e.is_timeout() {
            AppError::unavailable(
                self.config.display_name,
                format!("Cannot reach server at {}", self.config.base_url),
            )
        } else {
            AppError::external_service(self.config.display_name, format!("Failed to connect: {e}"))
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        self.config.provider_name
    }

    fn display_name(&self) -> &'static str {
        self.config.display_name
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(provider = self.config.provider_name, model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let response_format = match request.response_format {
            ResponseFormat::JsonObject if self.config.capabilities.supports_json_mode() => {
                Some(OpenAiResponseFormat {
                    format_type: "json_object",
                })
            }
            ResponseFormat::JsonObject => {
                warn!(
                    "{} does not support JSON mode, relying on prompt instructions",
                    self.config.provider_name
                );
                None
            }
            ResponseFormat::Text => None,
        };

        let openai_request = OpenAiRequest {
            model: model.to_owned(),
            messages: self.convert_messages(&request.messages),
            temperature: request.temperature,
            response_format,
        };
        debug!(
            "Sending chat completion request to {} with {} messages",
            self.config.provider_name,
            openai_request.messages.len()
        );

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .json(&openai_request);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| self.connect_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read API response: {}", e);
            AppError::external_service(
                self.config.display_name,
                format!("Failed to read response: {e}"),
            )
        })?;

        if !status.is_success() {
            return Err(self.parse_error_response(status, &body));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse API response: {}", e);
            AppError::external_service(
                self.config.display_name,
                format!("Failed to parse response: {e}"),
            )
        })?;

        let choice = openai_response.choices.into_iter().next().ok_or_else(|| {
            AppError::external_service(self.config.display_name, "API returned no choices")
        })?;

        let content = choice.message.content.unwrap_or_default();

        debug!(
            "Received response from {}: {} chars, finish_reason: {:?}",
            self.config.provider_name,
            content.len(),
            choice.finish_reason
        );

        Ok(ChatResponse {
            content,
            model: openai_response.model,
            usage: openai_response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt,
                completion_tokens: u.completion,
                total_tokens: u.total,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}
