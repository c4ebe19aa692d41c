// ABOUTME: Chat message record exchanged between the user and the assistant
// ABOUTME: Append-only entity carrying input type, optional file, and Task Helper hint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use super::Entity;
use crate::errors::AppError;

/// How the user produced a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Typed text
    #[default]
    Text,
    /// Speech transcript
    Voice,
    /// Uploaded file or photo
    File,
}

impl InputType {
    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Voice => "voice",
            Self::File => "file",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "voice" => Ok(Self::Voice),
            "file" => Ok(Self::File),
            other => Err(AppError::invalid_input(format!(
                "Unknown input type '{other}' (expected text, voice, or file)"
            ))),
        }
    }
}

/// Stored chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned identifier
    pub id: String,
    /// Message text
    pub message: String,
    /// True for user messages, false for assistant messages
    pub is_user: bool,
    /// How the message was entered
    #[serde(default)]
    pub input_type: InputType,
    /// Attached file, if any
    #[serde(default)]
    pub file_url: Option<String>,
    /// Whether the assistant suggested switching to the Task Helper
    #[serde(default)]
    pub suggested_task_helper: bool,
    /// Language code the conversation was held in
    #[serde(default)]
    pub language: String,
    /// Server-assigned creation time, defines ordering
    pub created_date: DateTime<Utc>,
}

/// Chat message as sent to `create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChatMessage {
    /// Message text
    pub message: String,
    /// True for user messages
    pub is_user: bool,
    /// How the message was entered
    pub input_type: InputType,
    /// Attached file, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Task Helper hint (assistant messages only)
    #[serde(default)]
    pub suggested_task_helper: bool,
    /// Language code
    pub language: String,
}

impl NewChatMessage {
    /// Draft for a message typed, spoken, or uploaded by the user
    #[must_use]
    pub fn user(
        message: impl Into<String>,
        input_type: InputType,
        file_url: Option<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            is_user: true,
            input_type,
            file_url,
            suggested_task_helper: false,
            language: language.into(),
        }
    }

    /// Draft for an assistant reply
    #[must_use]
    pub fn assistant(
        message: impl Into<String>,
        suggested_task_helper: bool,
        language: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            is_user: false,
            input_type: InputType::Text,
            file_url: None,
            suggested_task_helper,
            language: language.into(),
        }
    }

    /// Materialize the draft into a stored message with the given id and time
    #[must_use]
    pub fn into_message(self, id: impl Into<String>, created_date: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id: id.into(),
            message: self.message,
            is_user: self.is_user,
            input_type: self.input_type,
            file_url: self.file_url,
            suggested_task_helper: self.suggested_task_helper,
            language: self.language,
            created_date,
        }
    }
}

/// Chat messages are never edited; this type has no values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum NoPatch {}

impl Entity for ChatMessage {
    const NAME: &'static str = "ChatMessage";
    type Draft = NewChatMessage;
    type Patch = NoPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> Value {
        json!({
            "name": "ChatMessage",
            "type": "object",
            "properties": {
                "message": { "type": "string", "description": "The message content" },
                "is_user": { "type": "boolean", "description": "Whether the user sent it" },
                "input_type": {
                    "type": "string",
                    "enum": ["text", "voice", "file"],
                    "default": "text"
                },
                "file_url": { "type": "string", "description": "URL of an attached file" },
                "suggested_task_helper": { "type": "boolean", "default": false },
                "language": { "type": "string", "default": "en" }
            },
            "required": ["message", "is_user"]
        })
    }
}
