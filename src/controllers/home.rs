// ABOUTME: Home screen with a time-of-day greeting, input shortcuts, and suggested questions
// ABOUTME: Every action resolves to a Chat route carrying the chosen input or prompt
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use chrono::{Local, Timelike};

use crate::constants::messages::SUGGESTED_PROMPTS;
use crate::errors::{AppError, AppResult};
use crate::models::InputType;
use crate::navigation::{ChatLaunch, Route};

/// Greeting for an hour of the day (0-23)
#[must_use]
pub const fn greeting_for_hour(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning"
    } else if hour < 17 {
        "Good afternoon"
    } else {
        "Good evening"
    }
}

/// Greeting for the device's local time
#[must_use]
pub fn greeting_now() -> &'static str {
    greeting_for_hour(Local::now().hour())
}

/// Home screen actions
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeController;

#[allow(clippy::unused_self)]
impl HomeController {
    /// Suggested questions in display order
    #[must_use]
    pub const fn prompts(&self) -> &'static [&'static str] {
        SUGGESTED_PROMPTS
    }

    /// Open the chat with an input method selected
    #[must_use]
    pub const fn choose_input(&self, input: InputType) -> Route {
        Route::Chat(ChatLaunch::with_input(input))
    }

    /// Open the chat and ask the suggested question at `index`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `index` is out of range.
    pub fn choose_prompt(&self, index: usize) -> AppResult<Route> {
        let prompt = SUGGESTED_PROMPTS
            .get(index)
            .ok_or_else(|| AppError::invalid_input(format!("No suggested prompt #{index}")))?;
        Ok(Route::Chat(ChatLaunch::with_prompt(*prompt)))
    }
}
