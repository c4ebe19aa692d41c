// ABOUTME: Environment-based application configuration for backend, LLM, and Task Helper settings
// ABOUTME: Parses and validates STEPWISE_* variables into a typed AppConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! Environment-based configuration

use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use super::types::{BackendKind, DeclinePolicy, Environment, LlmProviderType};
use crate::constants::chat::DEFAULT_HISTORY_LIMIT;
use crate::errors::{AppError, AppResult};
use crate::llm::{DEFAULT_GROQ_MODEL, DEFAULT_LOCAL_BASE_URL, DEFAULT_LOCAL_MODEL, DEFAULT_OPENAI_MODEL};

/// Variable names read by [`AppConfig::from_env`]
pub mod env_vars {
    /// Backend platform URL
    pub const BACKEND_URL: &str = "STEPWISE_BACKEND_URL";
    /// Application id on the backend platform
    pub const APP_ID: &str = "STEPWISE_APP_ID";
    /// Session token for the backend platform
    pub const API_TOKEN: &str = "STEPWISE_API_TOKEN";
    /// Local LLM base URL
    pub const LOCAL_LLM_BASE_URL: &str = "LOCAL_LLM_BASE_URL";
    /// Local LLM API key (optional)
    pub const LOCAL_LLM_API_KEY: &str = "LOCAL_LLM_API_KEY";
    /// Groq API key
    pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
    /// `OpenAI` API key
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// Number of chat messages loaded on open
    pub const HISTORY_LIMIT: &str = "STEPWISE_HISTORY_LIMIT";
    /// Text-to-speech command
    pub const SPEECH_COMMAND: &str = "STEPWISE_SPEECH_COMMAND";
    /// Request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: &str = "STEPWISE_REQUEST_TIMEOUT_SECS";
}

/// Default request timeout
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Backend platform settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// HTTP or in-memory
    pub kind: BackendKind,
    /// Application base URL (required for HTTP)
    pub base_url: Option<Url>,
    /// Session token
    pub api_token: Option<String>,
}

/// LLM settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Which service answers prompts
    pub provider: LlmProviderType,
    /// Model override
    pub model: Option<String>,
    /// Local server base URL
    pub local_base_url: String,
    /// Local server API key
    pub local_api_key: Option<String>,
    /// Groq API key
    pub groq_api_key: Option<String>,
    /// `OpenAI` API key
    pub openai_api_key: Option<String>,
}

impl LlmConfig {
    /// Model to request, falling back to the provider default
    #[must_use]
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(match self.provider {
            LlmProviderType::Local | LlmProviderType::Backend => DEFAULT_LOCAL_MODEL,
            LlmProviderType::Groq => DEFAULT_GROQ_MODEL,
            LlmProviderType::OpenAi => DEFAULT_OPENAI_MODEL,
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Backend platform
    pub backend: BackendConfig,
    /// LLM service
    pub llm: LlmConfig,
    /// Task Helper decline behavior
    pub decline_policy: DeclinePolicy,
    /// Chat messages loaded on open
    pub history_limit: usize,
    /// Text-to-speech command, `None` logs instead of speaking
    pub speech_command: Option<String>,
    /// Timeout for every outbound request
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            backend: BackendConfig {
                kind: BackendKind::Memory,
                base_url: None,
                api_token: None,
            },
            llm: LlmConfig {
                provider: LlmProviderType::Backend,
                model: None,
                local_base_url: DEFAULT_LOCAL_BASE_URL.to_owned(),
                local_api_key: None,
                groq_api_key: None,
                openai_api_key: None,
            },
            decline_policy: DeclinePolicy::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            speech_command: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for unparseable values and `ConfigError` for
    /// missing required settings.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let backend_kind = parse_or(var(BackendKind::ENV_VAR), BackendKind::default())?;
        let base_url = var(env_vars::BACKEND_URL)
            .map(|raw| backend_base_url(&raw, var(env_vars::APP_ID).as_deref()))
            .transpose()?;

        let config = Self {
            environment: var(Environment::ENV_VAR)
                .map(|s| Environment::from_str_or_default(&s))
                .unwrap_or_default(),
            backend: BackendConfig {
                kind: backend_kind,
                base_url,
                api_token: var(env_vars::API_TOKEN),
            },
            llm: LlmConfig {
                provider: parse_or(var(LlmProviderType::ENV_VAR), LlmProviderType::default())?,
                model: var(LlmProviderType::MODEL_ENV_VAR),
                local_base_url: var(env_vars::LOCAL_LLM_BASE_URL)
                    .unwrap_or_else(|| DEFAULT_LOCAL_BASE_URL.to_owned()),
                local_api_key: var(env_vars::LOCAL_LLM_API_KEY),
                groq_api_key: var(env_vars::GROQ_API_KEY),
                openai_api_key: var(env_vars::OPENAI_API_KEY),
            },
            decline_policy: parse_or(var(DeclinePolicy::ENV_VAR), DeclinePolicy::default())?,
            history_limit: parse_number(
                env_vars::HISTORY_LIMIT,
                var(env_vars::HISTORY_LIMIT),
                DEFAULT_HISTORY_LIMIT,
            )?,
            speech_command: var(env_vars::SPEECH_COMMAND),
            request_timeout: Duration::from_secs(parse_number(
                env_vars::REQUEST_TIMEOUT_SECS,
                var(env_vars::REQUEST_TIMEOUT_SECS),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
        };

        config.validate()?;
        info!("Configuration loaded: {}", config.summary());
        Ok(config)
    }

    /// Validate cross-field requirements
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a selected backend or provider lacks its settings.
    pub fn validate(&self) -> AppResult<()> {
        if self.backend.kind == BackendKind::Http && self.backend.base_url.is_none() {
            return Err(AppError::config(format!(
                "{}=http requires {}",
                BackendKind::ENV_VAR,
                env_vars::BACKEND_URL
            )));
        }
        if self.backend.kind == BackendKind::Memory && self.backend.base_url.is_some() {
            warn!(
                "{} is set but {} is memory; the URL is ignored",
                env_vars::BACKEND_URL,
                BackendKind::ENV_VAR
            );
        }

        match self.llm.provider {
            LlmProviderType::Groq if self.llm.groq_api_key.is_none() => {
                return Err(AppError::config(format!(
                    "Missing {} environment variable. Get your API key from https://console.groq.com/keys",
                    env_vars::GROQ_API_KEY
                )));
            }
            LlmProviderType::OpenAi if self.llm.openai_api_key.is_none() => {
                return Err(AppError::config(format!(
                    "Missing {} environment variable",
                    env_vars::OPENAI_API_KEY
                )));
            }
            _ => {}
        }

        if self.history_limit == 0 {
            return Err(AppError::config_invalid(format!(
                "{} must be at least 1",
                env_vars::HISTORY_LIMIT
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(AppError::config_invalid(format!(
                "{} must be at least 1",
                env_vars::REQUEST_TIMEOUT_SECS
            )));
        }
        Ok(())
    }

    /// One-line summary for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "environment={}, backend={}{}, llm={} ({}), decline_policy={}, history_limit={}, speech={}",
            self.environment,
            self.backend.kind,
            self.backend
                .base_url
                .as_ref()
                .map_or_else(String::new, |url| format!(" at {url}")),
            self.llm.provider,
            self.llm.model_or_default(),
            self.decline_policy,
            self.history_limit,
            self.speech_command.as_deref().unwrap_or("log"),
        )
    }
}

fn parse_or<T: FromStr<Err = AppError>>(value: Option<String>, default: T) -> AppResult<T> {
    value.map_or(Ok(default), |raw| raw.parse())
}

fn parse_number<T: FromStr>(key: &str, value: Option<String>, default: T) -> AppResult<T> {
    value.map_or(Ok(default), |raw| {
        raw.parse()
            .map_err(|_| AppError::config_invalid(format!("{key}='{raw}' is not a valid number")))
    })
}

/// `https://host` + `app-1` → `https://host/api/apps/app-1/`
fn backend_base_url(raw: &str, app_id: Option<&str>) -> AppResult<Url> {
    let url = Url::parse(raw).map_err(|e| {
        AppError::config_invalid(format!("{}='{raw}': {e}", env_vars::BACKEND_URL))
    })?;

    let Some(app_id) = app_id else {
        return Ok(url);
    };
    let path = format!(
        "{}/api/apps/{}/",
        url.path().trim_end_matches('/'),
        urlencoding::encode(app_id)
    );
    let mut with_app = url;
    with_app.set_path(&path);
    Ok(with_app)
}
