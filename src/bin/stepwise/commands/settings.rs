// ABOUTME: Settings command showing the profile, switching language, and signing out
// ABOUTME: Also backs the `settings --language` and `logout` subcommands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use anyhow::Result;
use stepwise::context::AppContext;
use stepwise::navigation::Route;

use crate::helpers::display;
use crate::helpers::terminal::Terminal;

pub async fn run(context: &AppContext, terminal: &mut Terminal) -> Result<Option<Route>> {
    let screen = context.settings();

    loop {
        display::heading("Settings");
        display::settings(&screen.view().await?);
        println!("\n  [l <code>] Change language   [o] Log out   [q] Back");

        let Some(answer) = terminal.prompt("> ").await? else {
            return Ok(None);
        };
        let (action, argument) = answer
            .split_once(char::is_whitespace)
            .map_or((answer.as_str(), ""), |(action, rest)| (action, rest.trim()));

        match action.to_lowercase().as_str() {
            "l" | "language" if !argument.is_empty() => {
                if let Err(e) = screen.change_language(argument).await {
                    println!("{}", e.message);
                }
            }
            "o" | "logout" => {
                let route = screen.logout().await;
                println!("You have been signed out.");
                return Ok(Some(route));
            }
            "q" | "back" => return Ok(Some(Route::Home)),
            _ => println!("Unknown choice"),
        }
    }
}

pub async fn change_language(context: &AppContext, code: &str) -> Result<()> {
    let language = context.settings().change_language(code).await?;
    println!("Language set to {} {}", language.flag, language.name);
    Ok(())
}

pub async fn logout(context: &AppContext) {
    context.settings().logout().await;
    println!("You have been signed out.");
}
