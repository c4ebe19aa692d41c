// ABOUTME: Core types and constants for the Stepwise assistant
// ABOUTME: Foundation crate with error handling, entity models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # Stepwise Core
//!
//! Foundation crate providing shared types and constants for the Stepwise
//! assistant. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `TaskHelperError`
//! - **models**: `User`, `ChatMessage`, and `SavedTask` entities plus their drafts and patches
//! - **constants**: Languages, prompts, and user-facing strings

/// Unified error handling system with standard error codes
pub mod errors;

/// Entity models exchanged with the backend platform
pub mod models;

/// Application constants organized by domain
pub mod constants;
