// ABOUTME: Language selection screen that stores the preferred language and starts onboarding
// ABOUTME: Sends signed-out users to the login flow with Onboarding as the return target
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use std::sync::Arc;
use tracing::{info, instrument};

use crate::constants::languages::{find_language, Language, SUPPORTED_LANGUAGES};
use crate::errors::{AppError, AppResult};
use crate::models::UserPatch;
use crate::navigation::Route;
use crate::session::SessionContext;

/// What the screen does after "Continue"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageStep {
    /// Nothing selected yet
    Stay,
    /// Language saved
    Navigate(Route),
    /// No session; open this login URL
    Login(String),
}

/// Language selection screen controller
pub struct LanguageController {
    session: Arc<SessionContext>,
    selected: Option<&'static Language>,
}

impl LanguageController {
    /// Create a controller with nothing selected
    #[must_use]
    pub const fn new(session: Arc<SessionContext>) -> Self {
        Self {
            session,
            selected: None,
        }
    }

    /// Languages in display order
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn languages(&self) -> &'static [Language] {
        SUPPORTED_LANGUAGES
    }

    /// Currently highlighted language
    #[must_use]
    pub const fn selected(&self) -> Option<&'static Language> {
        self.selected
    }

    /// Highlight a language
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for codes not in the list.
    pub fn select(&mut self, code: &str) -> AppResult<&'static Language> {
        let language = find_language(code)
            .ok_or_else(|| AppError::invalid_input(format!("Unsupported language '{code}'")))?;
        self.selected = Some(language);
        Ok(language)
    }

    /// Save the selection and move on to onboarding
    ///
    /// # Errors
    ///
    /// Returns the gateway error when saving fails for a reason other than a
    /// missing session.
    #[instrument(skip(self), fields(language = ?self.selected.map(|l| l.code)))]
    pub async fn continue_(&self) -> AppResult<LanguageStep> {
        let Some(language) = self.selected else {
            return Ok(LanguageStep::Stay);
        };

        match self.session.update(UserPatch::language(language.code)).await {
            Ok(_) => {
                info!("Preferred language set to {}", language.code);
                Ok(LanguageStep::Navigate(Route::Onboarding))
            }
            Err(e) if e.is_auth_required() => Ok(LanguageStep::Login(
                self.session.login_url(&Route::Onboarding.to_url()),
            )),
            Err(e) => Err(e),
        }
    }
}
