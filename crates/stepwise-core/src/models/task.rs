// ABOUTME: Saved step-by-step guide with ordered steps and completion counter
// ABOUTME: Also defines the draft used for generated (not yet persisted) guides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Entity;
use crate::errors::{AppError, AppResult};

/// One step of a guide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStep {
    /// What the user should do
    pub instruction: String,
    /// Description of what the user should see on screen
    #[serde(default)]
    pub visual_description: String,
    /// Text read aloud for this step
    #[serde(default)]
    pub audio_text: String,
}

impl TaskStep {
    /// Text to narrate, falling back to the instruction when no audio text exists
    #[must_use]
    pub fn narration(&self) -> &str {
        if self.audio_text.trim().is_empty() {
            &self.instruction
        } else {
            &self.audio_text
        }
    }
}

/// Persisted guide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedTask {
    /// Server-assigned identifier
    pub id: String,
    /// Clear action title, e.g. "Turn on Do Not Disturb"
    pub title: String,
    /// Ordered steps, never empty
    pub steps: Vec<TaskStep>,
    /// How many times the guide was completed
    #[serde(default)]
    pub completion_count: u32,
    /// Language the guide was written in
    #[serde(default)]
    pub language: Option<String>,
    /// Server-assigned creation time
    pub created_date: DateTime<Utc>,
}

/// Guide as sent to `create`, also the shape produced by generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSavedTask {
    /// Clear action title
    pub title: String,
    /// Ordered steps
    pub steps: Vec<TaskStep>,
    /// Left unset so the backend applies its default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_count: Option<u32>,
    /// Language the guide was written in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl NewSavedTask {
    /// Check the guide has a title and at least one step
    ///
    /// # Errors
    ///
    /// Returns `AppError::invalid_input` if the title is blank or there are no steps.
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::invalid_input("Task title must not be empty"));
        }
        if self.steps.is_empty() {
            return Err(AppError::invalid_input("Task must have at least one step"));
        }
        if self.steps.iter().any(|step| step.instruction.trim().is_empty()) {
            return Err(AppError::invalid_input("Every step needs an instruction"));
        }
        Ok(())
    }

    /// Materialize the draft into a stored task
    #[must_use]
    pub fn into_task(
        self,
        id: impl Into<String>,
        completion_count: u32,
        created_date: DateTime<Utc>,
    ) -> SavedTask {
        SavedTask {
            id: id.into(),
            title: self.title,
            steps: self.steps,
            completion_count,
            language: self.language,
            created_date,
        }
    }
}

/// Partial update of a saved guide
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedTaskPatch {
    /// New completion counter value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_count: Option<u32>,
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl SavedTaskPatch {
    /// Patch that sets the completion counter
    #[must_use]
    pub fn completion_count(count: u32) -> Self {
        Self {
            completion_count: Some(count),
            ..Self::default()
        }
    }
}

impl Entity for SavedTask {
    const NAME: &'static str = "SavedTask";
    type Draft = NewSavedTask;
    type Patch = SavedTaskPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> Value {
        json!({
            "name": "SavedTask",
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Title of the task"
                },
                "steps": {
                    "type": "array",
                    "description": "Steps to complete the task",
                    "items": {
                        "type": "object",
                        "properties": {
                            "instruction": { "type": "string" },
                            "visual_description": { "type": "string" },
                            "audio_text": { "type": "string" }
                        },
                        "required": ["instruction"]
                    }
                },
                "completion_count": {
                    "type": "integer",
                    "default": 0,
                    "description": "How many times the task was completed"
                },
                "language": {
                    "type": "string",
                    "default": "en",
                    "description": "Language of the task"
                }
            },
            "required": ["title", "steps"]
        })
    }
}
