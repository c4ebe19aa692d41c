// ABOUTME: Screen routes with their query parameters, the bottom navigation bar, and entry gating
// ABOUTME: Routes round-trip through page URLs of the form /<PageName>?key=value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Navigation
//!
//! | Page | Parameters |
//! |---|---|
//! | `Welcome`, `LanguageSelection`, `Onboarding`, `Home`, `SavedTasks`, `Settings` | none |
//! | `Chat` | `input=text\|voice\|file`, `prompt=<text>` |
//! | `TaskHelper` | `taskId=<id>` or `mode=create` |

use std::fmt;
use url::form_urlencoded;

use crate::errors::{AppError, AppResult};
use crate::models::{InputType, User};

/// Chat screen launch parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLaunch {
    /// Preselected input method
    pub input: Option<InputType>,
    /// Message to send as soon as the screen opens
    pub prompt: Option<String>,
}

impl ChatLaunch {
    /// Open with an input method selected
    #[must_use]
    pub const fn with_input(input: InputType) -> Self {
        Self {
            input: Some(input),
            prompt: None,
        }
    }

    /// Open and immediately send `prompt`
    #[must_use]
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            input: None,
            prompt: Some(prompt.into()),
        }
    }
}

/// Task Helper launch parameters, kept raw until the controller validates them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskHelperLaunch {
    /// Saved task to load
    pub task_id: Option<String>,
    /// `create` generates a guide from the conversation
    pub mode: Option<String>,
}

impl TaskHelperLaunch {
    /// Load a saved task
    #[must_use]
    pub fn load(task_id: impl Into<String>) -> Self {
        Self {
            task_id: Some(task_id.into()),
            mode: None,
        }
    }

    /// Generate a task from the latest answer
    #[must_use]
    pub fn create() -> Self {
        Self {
            task_id: None,
            mode: Some("create".to_owned()),
        }
    }
}

/// A screen plus its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Entry screen for signed-out users
    Welcome,
    /// Language picker
    LanguageSelection,
    /// Three-step introduction
    Onboarding,
    /// Greeting and shortcuts
    Home,
    /// Assistant conversation
    Chat(ChatLaunch),
    /// Step-by-step guide player
    TaskHelper(TaskHelperLaunch),
    /// Saved guides
    SavedTasks,
    /// Preferences and logout
    Settings,
}

impl Route {
    /// Page name used in URLs
    #[must_use]
    pub const fn page_name(&self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::LanguageSelection => "LanguageSelection",
            Self::Onboarding => "Onboarding",
            Self::Home => "Home",
            Self::Chat(_) => "Chat",
            Self::TaskHelper(_) => "TaskHelper",
            Self::SavedTasks => "SavedTasks",
            Self::Settings => "Settings",
        }
    }

    /// Plain chat screen
    #[must_use]
    pub fn chat() -> Self {
        Self::Chat(ChatLaunch::default())
    }

    /// Whether the bottom navigation bar is shown on this screen
    #[must_use]
    pub const fn shows_navigation(&self) -> bool {
        !matches!(
            self,
            Self::Welcome | Self::LanguageSelection | Self::Onboarding | Self::TaskHelper(_)
        )
    }

    /// Screens reachable without a completed profile
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Welcome | Self::LanguageSelection)
    }

    /// Page URL, e.g. `/Chat?prompt=How%20do%20I...`
    #[must_use]
    pub fn to_url(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        let mut has_query = false;
        let mut push = |key: &str, value: &str| {
            query.append_pair(key, value);
            has_query = true;
        };

        match self {
            Self::Chat(launch) => {
                if let Some(input) = launch.input {
                    push("input", input.as_str());
                }
                if let Some(prompt) = &launch.prompt {
                    push("prompt", prompt);
                }
            }
            Self::TaskHelper(launch) => {
                if let Some(task_id) = &launch.task_id {
                    push("taskId", task_id);
                }
                if let Some(mode) = &launch.mode {
                    push("mode", mode);
                }
            }
            _ => {}
        }

        let query = query.finish();
        if has_query {
            // Spaces as %20, the way the page URLs are written elsewhere
            format!("/{}?{}", self.page_name(), query.replace('+', "%20"))
        } else {
            format!("/{}", self.page_name())
        }
    }

    /// Parse a page URL or bare page name
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for unknown pages or unparseable parameters.
    pub fn parse(url: &str) -> AppResult<Self> {
        let trimmed = url.trim();
        let (path, query) = trimmed.split_once('?').unwrap_or((trimmed, ""));
        let page = path.trim_matches('/');
        let params: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        let param = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .filter(|v| !v.is_empty())
        };

        match page.to_lowercase().as_str() {
            "" | "welcome" => Ok(Self::Welcome),
            "languageselection" => Ok(Self::LanguageSelection),
            "onboarding" => Ok(Self::Onboarding),
            "home" => Ok(Self::Home),
            "chat" => Ok(Self::Chat(ChatLaunch {
                input: param("input").map(|s| s.parse()).transpose()?,
                prompt: param("prompt"),
            })),
            "taskhelper" => Ok(Self::TaskHelper(TaskHelperLaunch {
                task_id: param("taskId"),
                mode: param("mode"),
            })),
            "savedtasks" => Ok(Self::SavedTasks),
            "settings" => Ok(Self::Settings),
            _ => Err(AppError::invalid_input(format!("Unknown page '{page}'"))),
        }
    }

    /// Where a user actually lands when asking for this route
    ///
    /// No session → Welcome, no language → `LanguageSelection`, onboarding not
    /// finished → Onboarding. Public screens are never redirected.
    #[must_use]
    pub fn gate(self, user: Option<&User>) -> Self {
        if self.is_public() {
            return self;
        }
        match user {
            None => Self::Welcome,
            Some(user) if !user.has_language() => Self::LanguageSelection,
            Some(user) if !user.onboarding_completed && self != Self::Onboarding => {
                Self::Onboarding
            }
            Some(_) => self,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

/// One entry of the bottom navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    /// Label under the icon
    pub title: &'static str,
    /// Target page name
    pub page: &'static str,
}

impl NavItem {
    /// Whether `route` is this item's page
    #[must_use]
    pub fn is_active(&self, route: &Route) -> bool {
        route.page_name() == self.page
    }

    /// Route opened by this item
    #[must_use]
    pub fn route(&self) -> Route {
        Route::parse(self.page).unwrap_or(Route::Home)
    }
}

/// Bottom navigation bar entries
pub const NAV_ITEMS: &[NavItem] = &[
    NavItem {
        title: "Home",
        page: "Home",
    },
    NavItem {
        title: "Assistant",
        page: "Chat",
    },
    NavItem {
        title: "Saved Tasks",
        page: "SavedTasks",
    },
    NavItem {
        title: "Settings",
        page: "Settings",
    },
];
