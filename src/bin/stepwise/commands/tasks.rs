// ABOUTME: Saved tasks command listing stored guides
// ABOUTME: Picking a number replays that guide in the Task Helper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use anyhow::Result;
use stepwise::context::AppContext;
use stepwise::navigation::Route;

use crate::helpers::display;
use crate::helpers::terminal::Terminal;

pub async fn run(context: &AppContext, terminal: &mut Terminal) -> Result<Option<Route>> {
    let screen = context.saved_tasks();
    display::heading("Saved Tasks");
    let tasks = screen.list().await?;
    display::task_list(&tasks);
    if tasks.is_empty() {
        return Ok(Some(Route::Home));
    }

    loop {
        let Some(answer) = terminal.prompt("Play which task? (number, or q): ").await? else {
            return Ok(None);
        };
        if answer.eq_ignore_ascii_case("q") {
            return Ok(Some(Route::Home));
        }
        let picked = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| tasks.get(index));
        match picked {
            Some(task) => return Ok(Some(screen.open(task))),
            None => println!("Pick a number between 1 and {}", tasks.len()),
        }
    }
}
