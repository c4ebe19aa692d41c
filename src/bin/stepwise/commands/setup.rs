// ABOUTME: First-run screens: welcome, language selection, and onboarding
// ABOUTME: Signed-out users get the login URL; everyone else is walked through setup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use anyhow::Result;
use stepwise::context::AppContext;
use stepwise::controllers::LanguageStep;
use stepwise::navigation::Route;

use crate::helpers::display;
use crate::helpers::terminal::Terminal;

/// Signed-out entry screen
pub fn welcome(context: &AppContext) -> Option<Route> {
    display::heading("Welcome to Stepwise");
    println!("Your friendly helper for everything on your phone.");
    println!(
        "Sign in to get started: {}",
        context
            .session()
            .login_url(&Route::LanguageSelection.to_url())
    );
    None
}

/// Language selection; `code` skips the question
pub async fn language(
    context: &AppContext,
    terminal: &mut Terminal,
    code: Option<String>,
) -> Result<Option<Route>> {
    let mut screen = context.language();
    let mut pending = code;

    loop {
        let answer = if let Some(code) = pending.take() {
            code
        } else {
            display::heading("Choose your language");
            for language in screen.languages() {
                println!("  {} {}  ({})", language.flag, language.name, language.code);
            }
            match terminal.prompt("Language code: ").await? {
                Some(answer) => answer,
                None => return Ok(None),
            }
        };

        if let Err(e) = screen.select(&answer) {
            println!("{}", e.message);
            continue;
        }

        match screen.continue_().await? {
            LanguageStep::Stay => {}
            LanguageStep::Navigate(route) => return Ok(Some(route)),
            LanguageStep::Login(url) => {
                println!("Please sign in first: {url}");
                return Ok(None);
            }
        }
    }
}

/// Three-page introduction
pub async fn onboarding(context: &AppContext, terminal: &mut Terminal) -> Result<Option<Route>> {
    let mut screen = context.onboarding();

    loop {
        let page = screen.page();
        display::heading(&format!("{} {}", page.visual, page.title));
        println!("{}", page.description);
        let next_label = if screen.is_last() { "Get Started" } else { "Next" };
        let Some(answer) = terminal
            .prompt(&format!("[Enter] {next_label}  [b]ack  [q]uit: "))
            .await?
        else {
            return Ok(None);
        };

        match answer.to_lowercase().as_str() {
            "b" | "back" => screen.back(),
            "q" | "quit" => return Ok(None),
            _ => match screen.next().await {
                Ok(Some(route)) => return Ok(Some(route)),
                Ok(None) => {}
                Err(e) => println!("Could not save your progress: {}", e.message),
            },
        }
    }
}
