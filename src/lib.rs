// ABOUTME: Main library entry point for the Stepwise smartphone help assistant
// ABOUTME: Provides screen controllers, backend gateways, LLM integrations, and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # Stepwise
//!
//! A friendly assistant that helps people use their smartphone. Users ask
//! questions by typing, speaking, or sharing a screenshot; the assistant
//! answers in their language and can turn an answer into a step-by-step
//! guide that is played one instruction at a time and read aloud.
//!
//! ## Features
//!
//! - **Chat**: text, voice, and file input forwarded to an LLM with history kept per user
//! - **Task Helper**: generated or saved guides with a bounded step cursor
//! - **Onboarding**: language selection and a short introduction on first use
//! - **Pluggable backend**: hosted REST platform or an in-memory store
//!
//! ## Architecture
//!
//! - **Controllers**: one per screen, returning routes instead of navigating
//! - **Gateways**: typed CRUD over `User`, `ChatMessage`, and `SavedTask`
//! - **Integrations**: `InvokeLLM` and `UploadFile`, via the backend or a direct provider
//! - **Context**: dependency injection from configuration to controllers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use stepwise::config::AppConfig;
//! use stepwise::context::AppContext;
//! use stepwise::errors::AppResult;
//! use stepwise::models::InputType;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = AppConfig::from_env()?;
//!     let context = AppContext::from_config(&config).await?;
//!
//!     let chat = context.chat();
//!     chat.send("How do I connect to WiFi?", InputType::Text, None).await;
//!     for message in chat.messages().await {
//!         println!("{}", message.message);
//!     }
//!     Ok(())
//! }
//! ```

/// Configuration loaded from environment variables
pub mod config;

/// Application constants: languages, messages, and chat limits
pub mod constants;

/// Dependency injection contexts
pub mod context;

/// Screen controllers
pub mod controllers;

/// Unified error handling
pub mod errors;

/// Entity gateways for the backend platform
pub mod gateways;

/// Input widgets' submissions and chat command parsing
pub mod input;

/// `InvokeLLM` and `UploadFile` integrations
pub mod integrations;

/// LLM provider abstraction and prompt templates
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Entity models
pub mod models;

/// Routes, page URLs, and the navigation bar
pub mod navigation;

/// Cached signed-in user
pub mod session;

/// Text-to-speech for guide steps
pub mod speech;
