// ABOUTME: Tests for loading configuration from environment variables
// ABOUTME: Covers provider and backend selection, validation errors, and context construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serial_test::serial;
use std::collections::HashMap;
use std::time::Duration;
use stepwise::config::{
    env_vars, AppConfig, BackendKind, DeclinePolicy, Environment, LlmProviderType,
};
use stepwise::context::AppContext;
use stepwise::controllers::resolve_entry;
use stepwise::errors::{AppResult, ErrorCode};
use stepwise::navigation::Route;

const MANAGED_VARS: &[&str] = &[
    "ENVIRONMENT",
    "STEPWISE_BACKEND",
    "STEPWISE_LLM_PROVIDER",
    "STEPWISE_LLM_MODEL",
    "STEPWISE_DECLINE_POLICY",
    env_vars::BACKEND_URL,
    env_vars::APP_ID,
    env_vars::API_TOKEN,
    env_vars::LOCAL_LLM_BASE_URL,
    env_vars::LOCAL_LLM_API_KEY,
    env_vars::GROQ_API_KEY,
    env_vars::OPENAI_API_KEY,
    env_vars::HISTORY_LIMIT,
    env_vars::SPEECH_COMMAND,
    env_vars::REQUEST_TIMEOUT_SECS,
];

fn clear_env() {
    for var in MANAGED_VARS {
        std::env::remove_var(var);
    }
}

fn load(vars: &[(&str, &str)]) -> AppResult<AppConfig> {
    let map: HashMap<&str, &str> = vars.iter().copied().collect();
    AppConfig::from_lookup(|key| map.get(key).map(|v| (*v).to_owned()))
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_enum_parsing() {
    assert_eq!("HTTP".parse::<BackendKind>().unwrap(), BackendKind::Http);
    assert_eq!("offline".parse::<BackendKind>().unwrap(), BackendKind::Memory);
    assert_eq!(
        "ollama".parse::<LlmProviderType>().unwrap(),
        LlmProviderType::Local
    );
    assert_eq!(
        " openai ".parse::<LlmProviderType>().unwrap(),
        LlmProviderType::OpenAi
    );
    assert_eq!("keep".parse::<DeclinePolicy>().unwrap(), DeclinePolicy::Retain);
    assert_eq!(
        Environment::from_str_or_default("production"),
        Environment::Production
    );

    let error = "gemini".parse::<LlmProviderType>().unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);
}

#[test]
fn test_blank_values_are_ignored() {
    let config = load(&[
        ("STEPWISE_LLM_PROVIDER", "  "),
        (env_vars::HISTORY_LIMIT, ""),
    ])
    .unwrap();

    assert_eq!(config.llm.provider, LlmProviderType::Backend);
    assert_eq!(config.history_limit, AppConfig::default().history_limit);
}

#[test]
fn test_full_http_configuration() {
    let config = load(&[
        ("STEPWISE_BACKEND", "http"),
        (env_vars::BACKEND_URL, "https://apps.example.com/"),
        (env_vars::APP_ID, "stepwise app"),
        (env_vars::API_TOKEN, "token-123"),
        ("STEPWISE_LLM_PROVIDER", "groq"),
        (env_vars::GROQ_API_KEY, "gsk_test"),
        ("STEPWISE_DECLINE_POLICY", "retain"),
        (env_vars::HISTORY_LIMIT, "20"),
        (env_vars::REQUEST_TIMEOUT_SECS, "15"),
        (env_vars::SPEECH_COMMAND, "say -v Samantha"),
    ])
    .unwrap();

    assert_eq!(config.backend.kind, BackendKind::Http);
    assert_eq!(
        config.backend.base_url.as_ref().unwrap().as_str(),
        "https://apps.example.com/api/apps/stepwise%20app/"
    );
    assert_eq!(config.backend.api_token.as_deref(), Some("token-123"));
    assert_eq!(config.llm.provider, LlmProviderType::Groq);
    assert!(config.llm.provider.is_direct());
    assert_eq!(config.decline_policy, DeclinePolicy::Retain);
    assert_eq!(config.history_limit, 20);
    assert_eq!(config.request_timeout, Duration::from_secs(15));
    assert_eq!(config.speech_command.as_deref(), Some("say -v Samantha"));

    let summary = config.summary();
    assert!(summary.contains("backend=http"));
    assert!(summary.contains("llm=groq"));
    assert!(!summary.contains("token-123"));
    assert!(!summary.contains("gsk_test"));
}

#[test]
fn test_model_override_and_defaults() {
    let config = load(&[("STEPWISE_LLM_MODEL", "llama3.2:3b")]).unwrap();
    assert_eq!(config.llm.model_or_default(), "llama3.2:3b");

    let config = load(&[
        ("STEPWISE_LLM_PROVIDER", "openai"),
        (env_vars::OPENAI_API_KEY, "sk-test"),
    ])
    .unwrap();
    assert!(config.llm.model.is_none());
    assert!(!config.llm.model_or_default().is_empty());
}

#[test]
fn test_validation_errors() {
    let error = load(&[
        ("STEPWISE_BACKEND", "http"),
        (env_vars::BACKEND_URL, "not a url"),
    ])
    .unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);

    let error = load(&[("STEPWISE_LLM_PROVIDER", "openai")]).unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigError);
    assert!(error.message.contains(env_vars::OPENAI_API_KEY));

    let error = load(&[(env_vars::HISTORY_LIMIT, "0")]).unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);

    let error = load(&[(env_vars::REQUEST_TIMEOUT_SECS, "0")]).unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);

    let error = load(&[("STEPWISE_DECLINE_POLICY", "sometimes")]).unwrap_err();
    assert_eq!(error.code, ErrorCode::ConfigInvalid);
}

// ============================================================================
// Process environment
// ============================================================================

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    clear_env();
    std::env::set_var("STEPWISE_DECLINE_POLICY", "retain");
    std::env::set_var(env_vars::HISTORY_LIMIT, "5");

    let config = AppConfig::from_env().unwrap();

    assert_eq!(config.decline_policy, DeclinePolicy::Retain);
    assert_eq!(config.history_limit, 5);
    assert_eq!(config.backend.kind, BackendKind::Memory);

    clear_env();
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    assert_eq!(AppConfig::from_env().unwrap(), AppConfig::default());
}

// ============================================================================
// Context construction
// ============================================================================

#[tokio::test]
async fn test_memory_context_signs_in_a_local_user() {
    let config = load(&[("STEPWISE_LLM_PROVIDER", "local")]).unwrap();

    let context = AppContext::from_config(&config).await.unwrap();

    let user = context.session().current_user().await.unwrap();
    assert_eq!(user.full_name.as_deref(), Some("Local user"));
    assert_eq!(
        resolve_entry(context.session(), Route::Home).await.unwrap(),
        Route::LanguageSelection
    );
    assert!(context.saved_tasks().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_speech_command_must_name_a_program() {
    let mut config = AppConfig::default();
    config.speech_command = Some("   ".to_owned());

    assert!(AppContext::from_config(&config).await.is_err());
}
