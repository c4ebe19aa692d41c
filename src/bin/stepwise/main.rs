// ABOUTME: Stepwise terminal front-end driving the assistant's screens from the command line
// ABOUTME: Parses subcommands, initializes logging and configuration, then runs the screen loop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant
//!
//! Usage:
//! ```bash
//! # Pick a language, then walk through onboarding
//! stepwise language es
//!
//! # Ask a question right away
//! stepwise chat --prompt "How do I connect to WiFi?"
//!
//! # Turn the latest answer into a guide and play it
//! stepwise task --create
//!
//! # Replay a saved guide
//! stepwise tasks
//! stepwise task --id 3f2a...
//! ```

mod commands;
mod helpers;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stepwise::config::AppConfig;
use stepwise::context::AppContext;
use stepwise::logging::LoggingConfig;
use stepwise::models::InputType;
use stepwise::navigation::{ChatLaunch, Route, TaskHelperLaunch};
use tracing::info;

use helpers::terminal::Terminal;

#[derive(Parser)]
#[command(
    name = "stepwise",
    about = "Friendly smartphone help assistant",
    long_about = "Chat with an assistant about your phone and follow step-by-step guides it writes for you."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Choose the interface language
    Language {
        /// Language code (en, es, fr, zh, ar, hi, pt); asks when omitted
        code: Option<String>,
    },

    /// Walk through the introduction
    Onboarding,

    /// Greeting, shortcuts, and suggested questions
    Home,

    /// Talk to the assistant
    Chat {
        /// Preselected input method (text, voice, file)
        #[arg(long)]
        input: Option<InputType>,

        /// Question to send as soon as the chat opens
        #[arg(long)]
        prompt: Option<String>,
    },

    /// Play a step-by-step guide
    Task {
        /// Saved task to play
        #[arg(long, conflicts_with = "create")]
        id: Option<String>,

        /// Write a guide from the assistant's latest answer
        #[arg(long)]
        create: bool,
    },

    /// List saved guides
    Tasks,

    /// Show or change settings
    Settings {
        /// Switch to this language code
        #[arg(long)]
        language: Option<String>,
    },

    /// Sign out
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.verbose();
    }
    logging.init().context("Failed to initialize logging")?;

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let context = AppContext::from_config(&config)
        .await
        .context("Failed to start the assistant")?;
    info!("Stepwise CLI ready");

    let mut terminal = Terminal::new();

    let start = match cli.command.unwrap_or(Command::Home) {
        Command::Language { code } => {
            commands::setup::language(&context, &mut terminal, code).await?
        }
        Command::Onboarding => Some(Route::Onboarding),
        Command::Home => Some(Route::Home),
        Command::Chat { input, prompt } => Some(Route::Chat(ChatLaunch { input, prompt })),
        Command::Task { id, create } => Some(Route::TaskHelper(match id {
            Some(id) => TaskHelperLaunch::load(id),
            None if create => TaskHelperLaunch::create(),
            None => TaskHelperLaunch::default(),
        })),
        Command::Tasks => Some(Route::SavedTasks),
        Command::Settings { language } => {
            if let Some(code) = language {
                commands::settings::change_language(&context, &code).await?;
            }
            Some(Route::Settings)
        }
        Command::Logout => {
            commands::settings::logout(&context).await;
            None
        }
    };

    if let Some(route) = start {
        commands::navigate(&context, &mut terminal, route).await?;
    }
    Ok(())
}
