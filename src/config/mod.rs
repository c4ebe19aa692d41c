// ABOUTME: Configuration module for environment-driven application settings
// ABOUTME: Re-exports AppConfig and the typed selectors for backend, LLM, and decline policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! Configuration module
//!
//! All settings come from environment variables; there are no config files.
//!
//! - **Environment**: [`AppConfig::from_env`] and its sub-configs
//! - **Types**: enumerated selectors parsed from variable values

/// Environment-based application configuration
pub mod environment;
/// Enumerated configuration selectors
pub mod types;

pub use environment::{env_vars, AppConfig, BackendConfig, LlmConfig};
pub use types::{BackendKind, DeclinePolicy, Environment, LlmProviderType};
