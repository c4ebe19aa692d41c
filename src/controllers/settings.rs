// ABOUTME: Settings screen showing the profile summary, language switch, and logout
// ABOUTME: Language changes and logout go through the session so its cache stays current
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::constants::languages::{find_language, Language, DEFAULT_LANGUAGE};
use crate::errors::{AppError, AppResult};
use crate::models::UserPatch;
use crate::navigation::Route;
use crate::session::SessionContext;

/// What the settings screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsView {
    /// Current language
    pub language: &'static Language,
    /// Guides completed so far
    pub tasks_completed: u32,
    /// Login email, if known
    pub email: Option<String>,
}

/// Settings screen controller
pub struct SettingsController {
    session: Arc<SessionContext>,
}

impl SettingsController {
    /// Create a controller over the session
    #[must_use]
    pub const fn new(session: Arc<SessionContext>) -> Self {
        Self { session }
    }

    /// Current profile summary
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` without a session.
    pub async fn view(&self) -> AppResult<SettingsView> {
        let user = self.session.current_user().await?;
        let language = find_language(user.language())
            .or_else(|| find_language(DEFAULT_LANGUAGE))
            .ok_or_else(|| AppError::internal("Default language missing from the language list"))?;
        Ok(SettingsView {
            language,
            tasks_completed: user.total_tasks_completed,
            email: user.email,
        })
    }

    /// Switch the preferred language
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for unsupported codes, or the gateway error.
    #[instrument(skip(self))]
    pub async fn change_language(&self, code: &str) -> AppResult<&'static Language> {
        let language = find_language(code)
            .ok_or_else(|| AppError::invalid_input(format!("Unsupported language '{code}'")))?;
        self.session.update(UserPatch::language(language.code)).await?;
        info!("Preferred language changed to {}", language.code);
        Ok(language)
    }

    /// End the session and return to the welcome screen
    ///
    /// The local session is cleared even if the backend call fails.
    pub async fn logout(&self) -> Route {
        if let Err(e) = self.session.logout().await {
            warn!("Logout request failed: {}", e);
        }
        Route::Welcome
    }
}
