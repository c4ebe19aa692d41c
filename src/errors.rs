// ABOUTME: Error types for the assistant, re-exported from the stepwise-core crate
// ABOUTME: Provides AppError, ErrorCode, AppResult, and the Task Helper error enum
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Unified Error Handling
//!
//! Error types live in `stepwise-core` so the data model and controllers share
//! one taxonomy; this module re-exports them under `stepwise::errors`.

pub use stepwise_core::errors::*;
