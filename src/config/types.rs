// ABOUTME: Core configuration type definitions selected through environment variables
// ABOUTME: Contains Environment, BackendKind, LlmProviderType, and DeclinePolicy enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::errors::AppError;

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment (default)
    #[default]
    Development,
    /// Production environment
    Production,
    /// Testing environment for automated tests
    Testing,
}

impl Environment {
    /// Environment variable name
    pub const ENV_VAR: &'static str = "ENVIRONMENT";

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development, // Default fallback (including "development" | "dev")
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Where entities, sessions, and files live
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted backend platform over HTTP
    Http,
    /// In-process store, nothing survives the process (default)
    #[default]
    Memory,
}

impl BackendKind {
    /// Environment variable name
    pub const ENV_VAR: &'static str = "STEPWISE_BACKEND";
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" | "remote" => Ok(Self::Http),
            "memory" | "offline" => Ok(Self::Memory),
            other => Err(AppError::config_invalid(format!(
                "{}='{other}' (expected http or memory)",
                Self::ENV_VAR
            ))),
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Http => write!(f, "http"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Which service answers `InvokeLLM`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// The backend platform's own integration (default)
    #[default]
    Backend,
    /// Local `OpenAI`-compatible endpoint (Ollama, vLLM, `LocalAI`)
    Local,
    /// Groq cloud
    Groq,
    /// `OpenAI`
    OpenAi,
}

impl LlmProviderType {
    /// Environment variable for provider selection
    pub const ENV_VAR: &'static str = "STEPWISE_LLM_PROVIDER";

    /// Environment variable for model selection
    pub const MODEL_ENV_VAR: &'static str = "STEPWISE_LLM_MODEL";

    /// Whether requests bypass the backend platform
    #[must_use]
    pub const fn is_direct(&self) -> bool {
        !matches!(self, Self::Backend)
    }
}

impl FromStr for LlmProviderType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "backend" | "core" => Ok(Self::Backend),
            "local" | "ollama" | "vllm" | "localai" => Ok(Self::Local),
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAi),
            other => Err(AppError::config_invalid(format!(
                "{}='{other}' (expected backend, local, groq, or openai)",
                Self::ENV_VAR
            ))),
        }
    }
}

impl Display for LlmProviderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Backend => write!(f, "backend"),
            Self::Local => write!(f, "local"),
            Self::Groq => write!(f, "groq"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

/// What the Task Helper keeps when the user says the guide did not help
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeclinePolicy {
    /// Drop the task state (default)
    #[default]
    Discard,
    /// Keep the task and rewind to the first step
    Retain,
}

impl DeclinePolicy {
    /// Environment variable name
    pub const ENV_VAR: &'static str = "STEPWISE_DECLINE_POLICY";
}

impl FromStr for DeclinePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discard" => Ok(Self::Discard),
            "retain" | "keep" => Ok(Self::Retain),
            other => Err(AppError::config_invalid(format!(
                "{}='{other}' (expected discard or retain)",
                Self::ENV_VAR
            ))),
        }
    }
}

impl Display for DeclinePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Discard => write!(f, "discard"),
            Self::Retain => write!(f, "retain"),
        }
    }
}
