// ABOUTME: Interactive Task Helper command playing a guide one step at a time
// ABOUTME: Reads each step aloud and records the outcome on the completion screen
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use anyhow::Result;
use stepwise::context::AppContext;
use stepwise::controllers::{CompletionOutcome, StepView};
use stepwise::navigation::{Route, TaskHelperLaunch};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::helpers::display;
use crate::helpers::terminal::Terminal;

pub async fn run(
    context: &AppContext,
    terminal: &mut Terminal,
    launch: &TaskHelperLaunch,
) -> Result<Option<Route>> {
    let mut helper = context.task_helper();
    if launch.mode.is_some() && launch.task_id.is_none() {
        println!("Writing your step-by-step guide...");
    }

    if helper.initialize(launch, &CancellationToken::new()).await.is_err() {
        display::heading("Task Helper");
        println!("{}", helper.error_message().unwrap_or_default());
        if let Some(error) = helper.error() {
            println!("({error})");
        }
        return Ok(Some(Route::Home));
    }

    let mut speak = true;
    loop {
        let (Some(task), Some(view), Some(progress)) =
            (helper.task(), helper.current_view(), helper.progress())
        else {
            return Ok(Some(Route::Home));
        };
        display::step(task.title(), view, progress);
        if speak && matches!(view, StepView::Instruction { .. }) {
            if let Err(e) = helper.repeat().await {
                warn!("Could not read the step aloud: {}", e);
            }
        }
        speak = true;

        let Some(answer) = terminal.prompt("> ").await? else {
            return Ok(None);
        };
        match (answer.to_lowercase().as_str(), progress.at_completion) {
            ("q" | "quit", _) => return Ok(Some(helper.close())),
            ("b" | "back", _) => helper.back(),
            ("r" | "repeat", false) => {}
            ("y" | "yes", true) => return Ok(Some(finish(&mut helper, true).await?)),
            ("n" | "no", true) => return Ok(Some(finish(&mut helper, false).await?)),
            ("" | "n" | "next", false) => helper.next(),
            _ => speak = false,
        }
    }
}

async fn finish(
    helper: &mut stepwise::controllers::TaskHelperController,
    success: bool,
) -> Result<Route> {
    let outcome = helper.complete(success).await?;
    match &outcome {
        CompletionOutcome::Completed(task) => {
            println!("Great job! \"{}\" is saved in your tasks.", task.title);
        }
        CompletionOutcome::Declined => println!("Let's keep working on it together."),
        CompletionOutcome::PersistenceFailed { saved, error } => {
            warn!("Completion not recorded: {}", error);
            if saved.is_some() {
                println!("The guide was saved, but your progress could not be updated.");
            } else {
                println!("Sorry, the guide could not be saved. Please try again later.");
            }
        }
    }
    Ok(outcome.route())
}
