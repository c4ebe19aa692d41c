// ABOUTME: Screen commands for the stepwise CLI and the loop that moves between them
// ABOUTME: Every screen returns the next route, or None to exit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

pub mod chat;
pub mod home;
pub mod settings;
pub mod setup;
pub mod task;
pub mod tasks;

use anyhow::Result;
use stepwise::context::AppContext;
use stepwise::controllers::resolve_entry;
use stepwise::navigation::Route;
use tracing::debug;

use crate::helpers::display;
use crate::helpers::terminal::Terminal;

/// Run screens starting at `route` until one exits
pub async fn navigate(context: &AppContext, terminal: &mut Terminal, route: Route) -> Result<()> {
    let mut requested = route;
    loop {
        let route = resolve_entry(context.session(), requested).await?;
        debug!(route = %route, "Opening screen");
        display::nav_bar(&route);

        let next = match route {
            Route::Welcome => setup::welcome(context),
            Route::LanguageSelection => setup::language(context, terminal, None).await?,
            Route::Onboarding => setup::onboarding(context, terminal).await?,
            Route::Home => home::run(context, terminal).await?,
            Route::Chat(launch) => chat::run(context, terminal, launch).await?,
            Route::TaskHelper(launch) => task::run(context, terminal, &launch).await?,
            Route::SavedTasks => tasks::run(context, terminal).await?,
            Route::Settings => settings::run(context, terminal).await?,
        };

        match next {
            Some(next) => requested = next,
            None => return Ok(()),
        }
    }
}
