// ABOUTME: Screen controllers for the assistant, one per page
// ABOUTME: Also resolves which screen a user lands on when opening the app
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Controllers
//!
//! Each screen owns a controller holding its view state and the gateways it
//! talks to. Controllers return [`Route`] values instead of navigating
//! themselves, so any front-end (the CLI, a mobile shell) can drive them.
//!
//! | Screen | Controller |
//! |---|---|
//! | `LanguageSelection` | [`LanguageController`] |
//! | `Onboarding` | [`OnboardingController`] |
//! | `Home` | [`HomeController`] |
//! | `Chat` | [`ChatController`] |
//! | `TaskHelper` | [`TaskHelperController`] |
//! | `SavedTasks` | [`SavedTasksController`] |
//! | `Settings` | [`SettingsController`] |

/// Chat screen
pub mod chat;
/// Home screen
pub mod home;
/// Language selection screen
pub mod language;
/// Onboarding wizard
pub mod onboarding;
/// Saved tasks screen
pub mod saved_tasks;
/// Settings screen
pub mod settings;
/// Step-by-step guide player
pub mod task_helper;

pub use chat::{suggests_task_helper, ChatController, SendOutcome};
pub use home::{greeting_for_hour, greeting_now, HomeController};
pub use language::{LanguageController, LanguageStep};
pub use onboarding::OnboardingController;
pub use saved_tasks::SavedTasksController;
pub use settings::{SettingsController, SettingsView};
pub use task_helper::{
    ActiveTask, CompletionOutcome, InitStatus, Progress, StepView, TaskHelperController,
    TaskHelperState, TaskSource,
};

use tracing::debug;

use crate::errors::AppResult;
use crate::navigation::Route;
use crate::session::SessionContext;

/// Screen actually shown when `requested` is opened
///
/// # Errors
///
/// Returns session errors other than a missing sign-in.
pub async fn resolve_entry(session: &SessionContext, requested: Route) -> AppResult<Route> {
    let user = session.optional_user().await?;
    let route = requested.clone().gate(user.as_ref());
    if route != requested {
        debug!(requested = %requested, landed = %route, "Entry redirected");
    }
    Ok(route)
}
