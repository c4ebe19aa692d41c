// ABOUTME: Task Helper specific error types for loading and generating guides
// ABOUTME: Provides structured errors that integrate with the main AppError system
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Task Helper Error Types
//!
//! Failures that can occur while the Task Helper acquires its guide, plus the
//! conversion into [`AppError`] for callers that only deal in the unified type.

use thiserror::Error;

use super::{AppError, ErrorCode};

/// Errors raised while acquiring a task for the Task Helper.
#[derive(Debug, Error)]
pub enum TaskHelperError {
    /// The requested saved task does not exist
    #[error("Saved task '{task_id}' not found")]
    NotFound {
        /// Identifier that was requested
        task_id: String,
    },
    /// Generation was requested but there is no assistant message to build from
    #[error("No recent assistant message found to create a task")]
    NoSourceMessage,
    /// The LLM returned nothing usable
    #[error("Failed to generate task from conversation: {reason}")]
    GenerationFailed {
        /// What was wrong with the output
        reason: String,
    },
    /// Neither a task id nor the create mode was supplied
    #[error("Invalid task mode")]
    InvalidMode,
    /// An entity or integration gateway rejected the request
    #[error(transparent)]
    Gateway(#[from] AppError),
}

impl TaskHelperError {
    /// Create a "generation failed" error
    #[must_use]
    pub fn generation_failed(reason: impl Into<String>) -> Self {
        Self::GenerationFailed {
            reason: reason.into(),
        }
    }

    /// Create a "not found" error
    #[must_use]
    pub fn not_found(task_id: impl Into<String>) -> Self {
        Self::NotFound {
            task_id: task_id.into(),
        }
    }
}

impl From<TaskHelperError> for AppError {
    fn from(error: TaskHelperError) -> Self {
        let message = error.to_string();
        match error {
            TaskHelperError::NotFound { task_id } => {
                Self::new(ErrorCode::ResourceNotFound, message).with_resource_id(task_id)
            }
            TaskHelperError::NoSourceMessage => Self::new(ErrorCode::ResourceNotFound, message),
            TaskHelperError::GenerationFailed { .. } => {
                Self::new(ErrorCode::GenerationFailed, message)
            }
            TaskHelperError::InvalidMode => Self::invalid_input(message),
            TaskHelperError::Gateway(inner) => inner,
        }
    }
}
