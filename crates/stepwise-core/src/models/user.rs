// ABOUTME: User record with language preference, onboarding flag, and completion counter
// ABOUTME: Created implicitly by the auth provider and patched by onboarding and settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Entity;
use crate::constants::languages::DEFAULT_LANGUAGE;

/// Signed-in user as returned by the backend platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier
    pub id: String,
    /// Login email
    #[serde(default)]
    pub email: Option<String>,
    /// Display name
    #[serde(default)]
    pub full_name: Option<String>,
    /// Preferred language code (e.g. "en", "es")
    #[serde(default)]
    pub preferred_language: Option<String>,
    /// Whether the onboarding wizard has been finished
    #[serde(default)]
    pub onboarding_completed: bool,
    /// Number of guides completed successfully
    #[serde(default)]
    pub total_tasks_completed: u32,
    /// Account creation time
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

impl User {
    /// Preferred language, falling back to English
    #[must_use]
    pub fn language(&self) -> &str {
        self.preferred_language
            .as_deref()
            .filter(|code| !code.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Whether a language has been chosen yet
    #[must_use]
    pub fn has_language(&self) -> bool {
        self.preferred_language
            .as_deref()
            .is_some_and(|code| !code.is_empty())
    }
}

/// Account fields supplied when the auth provider creates a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    /// Login email
    pub email: Option<String>,
    /// Display name
    pub full_name: Option<String>,
}

/// Partial update of the signed-in user's own data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    /// New preferred language code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    /// New onboarding flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_completed: Option<bool>,
    /// New completion counter value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tasks_completed: Option<u32>,
}

impl UserPatch {
    /// Patch that sets the preferred language
    #[must_use]
    pub fn language(code: impl Into<String>) -> Self {
        Self {
            preferred_language: Some(code.into()),
            ..Self::default()
        }
    }

    /// Patch that marks onboarding as finished
    #[must_use]
    pub fn onboarding_completed() -> Self {
        Self {
            onboarding_completed: Some(true),
            ..Self::default()
        }
    }

    /// Patch that sets the completion counter
    #[must_use]
    pub fn total_tasks_completed(count: u32) -> Self {
        Self {
            total_tasks_completed: Some(count),
            ..Self::default()
        }
    }
}

impl Entity for User {
    const NAME: &'static str = "User";
    type Draft = NewUser;
    type Patch = UserPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> Value {
        json!({
            "name": "User",
            "type": "object",
            "properties": {
                "preferred_language": {
                    "type": "string",
                    "description": "User's preferred language code"
                },
                "onboarding_completed": {
                    "type": "boolean",
                    "default": false,
                    "description": "Whether the user finished onboarding"
                },
                "total_tasks_completed": {
                    "type": "integer",
                    "default": 0,
                    "description": "Number of guides completed"
                }
            },
            "required": []
        })
    }
}
