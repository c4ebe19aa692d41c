// ABOUTME: Interactive chat command sending text, voice transcripts, and files to the assistant
// ABOUTME: Ctrl-C while opening cancels the launch prompt without leaving the screen
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use anyhow::Result;
use stepwise::constants::messages::CHAT_EMPTY_STATE;
use stepwise::context::AppContext;
use stepwise::controllers::SendOutcome;
use stepwise::input::{ChatCommand, FileUpload, UserInput};
use stepwise::models::InputType;
use stepwise::navigation::{ChatLaunch, Route};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::helpers::display;
use crate::helpers::terminal::Terminal;

pub async fn run(
    context: &AppContext,
    terminal: &mut Terminal,
    launch: ChatLaunch,
) -> Result<Option<Route>> {
    let chat = context.chat();
    display::heading("Assistant");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });
    let opened = chat.open(launch, &cancel).await;
    interrupt.abort();

    if let Err(e) = opened {
        warn!("Chat history unavailable: {}", e);
        println!("Could not load earlier messages.");
    }
    let history = chat.messages().await;
    if history.is_empty() {
        println!("{CHAT_EMPTY_STATE}");
    }
    for message in &history {
        display::message(message);
    }
    if chat.input_method().await == InputType::File {
        println!("Use /file <path> to share a photo or screenshot.");
    }
    println!("(type /help for commands)");

    loop {
        let label = format!("[{}] > ", chat.input_method().await);
        let Some(line) = terminal.prompt(&label).await? else {
            return Ok(None);
        };

        let input = match ChatCommand::parse(&line) {
            ChatCommand::Empty => continue,
            ChatCommand::Help => {
                display::chat_help();
                continue;
            }
            ChatCommand::Quit => return Ok(Some(Route::Home)),
            ChatCommand::Task => return Ok(Some(chat.start_task_helper())),
            ChatCommand::Say(text) => UserInput::Text(text),
            ChatCommand::Voice(transcript) => {
                chat.set_input_method(InputType::Voice).await;
                UserInput::Voice(transcript)
            }
            ChatCommand::File(path) => match FileUpload::from_path(&path).await {
                Ok(upload) => UserInput::File(upload),
                Err(e) => {
                    println!("{}", e.message);
                    continue;
                }
            },
        };

        println!("Thinking...");
        match chat.submit(input).await {
            Ok(outcome) => show(&outcome),
            Err(e) => println!("{}", e.message),
        }
    }
}

fn show(outcome: &SendOutcome) {
    match outcome {
        SendOutcome::Skipped => {}
        SendOutcome::Answered { reply, .. } => display::message(reply),
        SendOutcome::Apologized { apology, error, .. } => {
            warn!("Chat exchange failed: {}", error);
            display::message(apology);
        }
    }
}
