// ABOUTME: Three-page onboarding wizard shown once after choosing a language
// ABOUTME: Marks onboarding as completed on the user record when the last page is passed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use std::sync::Arc;
use tracing::{info, instrument};

use crate::constants::messages::{OnboardingPage, ONBOARDING_PAGES};
use crate::errors::AppResult;
use crate::models::UserPatch;
use crate::navigation::Route;
use crate::session::SessionContext;

/// Onboarding wizard controller
pub struct OnboardingController {
    session: Arc<SessionContext>,
    page: usize,
}

impl OnboardingController {
    /// Start on the first page
    #[must_use]
    pub const fn new(session: Arc<SessionContext>) -> Self {
        Self { session, page: 0 }
    }

    /// Zero-based page index
    #[must_use]
    pub const fn page_index(&self) -> usize {
        self.page
    }

    /// Page being shown
    #[must_use]
    pub fn page(&self) -> &'static OnboardingPage {
        &ONBOARDING_PAGES[self.page.min(ONBOARDING_PAGES.len() - 1)]
    }

    /// Whether this is the last page
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.page + 1 >= ONBOARDING_PAGES.len()
    }

    /// Advance; on the last page, finish onboarding
    ///
    /// Returns the route to open once onboarding is done.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the wizard stays on the last page.
    #[instrument(skip(self), fields(page = self.page))]
    pub async fn next(&mut self) -> AppResult<Option<Route>> {
        if !self.is_last() {
            self.page += 1;
            return Ok(None);
        }
        self.session.update(UserPatch::onboarding_completed()).await?;
        info!("Onboarding completed");
        Ok(Some(Route::Home))
    }

    /// Go back one page
    pub fn back(&mut self) {
        self.page = self.page.saturating_sub(1);
    }
}
