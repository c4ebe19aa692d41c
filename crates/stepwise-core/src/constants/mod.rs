// ABOUTME: Application constants organized by domain
// ABOUTME: Languages, user-facing messages, onboarding content, and chat limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Constants
//!
//! Fixed content shown by the screens and the strings the controllers
//! exchange with the assistant.

/// Supported interface languages
pub mod languages;

/// User-facing messages and canned prompts
pub mod messages;

/// Chat limits and detection phrases
pub mod chat {
    /// Number of messages loaded when the chat screen opens
    pub const DEFAULT_HISTORY_LIMIT: usize = 50;

    /// Phrases in an assistant reply that mark a Task Helper suggestion
    pub const TASK_HELPER_PHRASES: &[&str] = &["task helper", "step-by-step", "guide you through"];

    /// MIME prefixes accepted by the file picker
    pub const ACCEPTED_MIME_PREFIXES: &[&str] = &["image/"];

    /// Exact MIME types accepted by the file picker
    pub const ACCEPTED_MIME_TYPES: &[&str] = &["application/pdf"];
}
