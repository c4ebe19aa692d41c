// ABOUTME: Home screen command showing the greeting, input shortcuts, and suggested questions
// ABOUTME: Every choice opens the chat with the selected input or question
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use anyhow::Result;
use stepwise::context::AppContext;
use stepwise::controllers::greeting_now;
use stepwise::models::InputType;
use stepwise::navigation::Route;

use crate::helpers::display;
use crate::helpers::terminal::Terminal;

pub async fn run(context: &AppContext, terminal: &mut Terminal) -> Result<Option<Route>> {
    let home = context.home();
    let name = context
        .session()
        .current_user()
        .await
        .ok()
        .and_then(|user| user.full_name);

    match name {
        Some(name) => display::heading(&format!("{}, {name}!", greeting_now())),
        None => display::heading(&format!("{}!", greeting_now())),
    }
    println!("How can I help you today?\n");
    println!("  [t] Type a question   [v] Speak   [f] Show a photo");
    println!("\nPopular questions:");
    for (index, prompt) in home.prompts().iter().enumerate() {
        println!("  {}. {prompt}", index + 1);
    }
    println!("\n  [s] Saved tasks   [o] Settings   [q] Quit");

    loop {
        let Some(answer) = terminal.prompt("> ").await? else {
            return Ok(None);
        };
        let route = match answer.to_lowercase().as_str() {
            "t" => home.choose_input(InputType::Text),
            "v" => home.choose_input(InputType::Voice),
            "f" => home.choose_input(InputType::File),
            "s" => Route::SavedTasks,
            "o" => Route::Settings,
            "q" => return Ok(None),
            other => match other.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                Some(index) => match home.choose_prompt(index) {
                    Ok(route) => route,
                    Err(e) => {
                        println!("{}", e.message);
                        continue;
                    }
                },
                None => {
                    println!("Pick a number, or t, v, f, s, o, q");
                    continue;
                }
            },
        };
        return Ok(Some(route));
    }
}
