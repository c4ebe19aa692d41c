// ABOUTME: Output formatting helpers for the stepwise CLI
// ABOUTME: Renders chat messages, guide steps, task lists, and settings consistently
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use stepwise::controllers::{Progress, SettingsView, StepView};
use stepwise::models::{ChatMessage, InputType, SavedTask};
use stepwise::navigation::{Route, NAV_ITEMS};

const RULE_WIDTH: usize = 60;

/// Screen title with a rule underneath
pub fn heading(title: &str) {
    println!("\n{title}");
    println!("{}", "=".repeat(RULE_WIDTH));
}

/// Bottom navigation bar, on screens that show it
pub fn nav_bar(route: &Route) {
    if !route.shows_navigation() {
        return;
    }
    let items: Vec<String> = NAV_ITEMS
        .iter()
        .map(|item| {
            if item.is_active(route) {
                format!("[{}]", item.title)
            } else {
                item.title.to_owned()
            }
        })
        .collect();
    println!("{}", "-".repeat(RULE_WIDTH));
    println!("  {}", items.join("  |  "));
}

/// One chat bubble
pub fn message(message: &ChatMessage) {
    let who = if message.is_user { "You" } else { "Assistant" };
    let marker = match message.input_type {
        InputType::Voice if message.is_user => " (voice)",
        InputType::File if message.is_user => " (file)",
        _ => "",
    };
    println!("{who}{marker}: {}", message.message);
    if let Some(url) = &message.file_url {
        println!("    attached: {url}");
    }
    if message.suggested_task_helper {
        println!("    -> type /task to follow this step by step");
    }
}

pub fn chat_help() {
    println!("  <text>          send a message");
    println!("  /voice <text>   send as a voice message");
    println!("  /file <path>    upload a photo, screenshot, or PDF");
    println!("  /task           turn the latest answer into a guide");
    println!("  /quit           leave the chat");
}

/// Current guide step with its progress bar
pub fn step(title: &str, view: StepView<'_>, progress: Progress) {
    heading(title);
    match view {
        StepView::Instruction { step, .. } => {
            println!("Step {} of {}", progress.step_number, progress.total);
            println!("{}", progress_bar(progress));
            println!("\n{}", step.instruction);
            if !step.visual_description.is_empty() {
                println!("  Look for: {}", step.visual_description);
            }
            let mut keys = vec!["[n]ext"];
            if !progress.is_first {
                keys.push("[b]ack");
            }
            keys.extend(["[r]epeat", "[q]uit"]);
            println!("\n{}", keys.join("  "));
        }
        StepView::Completion => {
            println!("{}", progress_bar(progress));
            println!("\nDid this help?");
            println!("[y]es, it worked   [n]o, I still need help   [b]ack   [q]uit");
        }
    }
}

fn progress_bar(progress: Progress) -> String {
    const WIDTH: usize = 30;
    let done = if progress.total == 0 {
        WIDTH
    } else {
        (progress.step_number.min(progress.total) * WIDTH) / progress.total
    };
    format!("[{}{}]", "#".repeat(done), ".".repeat(WIDTH - done))
}

/// Numbered saved task list
pub fn task_list(tasks: &[SavedTask]) {
    if tasks.is_empty() {
        println!("No saved tasks yet. Finish a guide to keep it here.");
        return;
    }
    for (index, task) in tasks.iter().enumerate() {
        println!(
            "{:>3}. {}  ({} steps, completed {}x, saved {})",
            index + 1,
            task.title,
            task.steps.len(),
            task.completion_count,
            task.created_date.format("%Y-%m-%d")
        );
    }
}

pub fn settings(view: &SettingsView) {
    println!("Language: {} {} ({})", view.language.flag, view.language.name, view.language.code);
    println!("Tasks completed: {}", view.tasks_completed);
    if let Some(email) = &view.email {
        println!("Signed in as: {email}");
    }
}
