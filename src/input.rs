// ABOUTME: User input as produced by the text box, voice recognizer, and file picker
// ABOUTME: Also parses terminal input lines into chat commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Input
//!
//! Input widgets only produce values; they never call gateways. A recognized
//! voice transcript arrives as plain text tagged [`InputType::Voice`], a
//! picked file as a [`FileUpload`] that the chat controller uploads.

use std::path::PathBuf;

pub use crate::integrations::FileUpload;
pub use crate::models::InputType;

/// One submission from an input widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Typed text
    Text(String),
    /// Speech-to-text transcript
    Voice(String),
    /// Picked file or photo
    File(FileUpload),
}

impl UserInput {
    /// Input type stored on the resulting chat message
    #[must_use]
    pub const fn input_type(&self) -> InputType {
        match self {
            Self::Text(_) => InputType::Text,
            Self::Voice(_) => InputType::Voice,
            Self::File(_) => InputType::File,
        }
    }
}

/// A line typed into the interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Send text as a message
    Say(String),
    /// Send text as if it was spoken
    Voice(String),
    /// Upload a file and send it
    File(PathBuf),
    /// Open the Task Helper on the latest answer
    Task,
    /// Show available commands
    Help,
    /// Leave the chat
    Quit,
    /// Blank line
    Empty,
}

impl ChatCommand {
    /// Parse a line: `/file <path>`, `/voice <text>`, `/task`, `/help`, `/quit`, or text
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }

        let Some(command) = trimmed.strip_prefix('/') else {
            return Self::Say(trimmed.to_owned());
        };
        let (name, rest) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, rest)| (name, rest.trim()));

        match (name.to_lowercase().as_str(), rest) {
            ("file" | "upload", path) if !path.is_empty() => Self::File(PathBuf::from(path)),
            ("voice" | "say", text) if !text.is_empty() => Self::Voice(text.to_owned()),
            ("task" | "guide", _) => Self::Task,
            ("quit" | "exit" | "q", _) => Self::Quit,
            ("help" | "?", _) => Self::Help,
            _ => Self::Say(trimmed.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ChatCommand::parse("   "), ChatCommand::Empty);
        assert_eq!(
            ChatCommand::parse("How do I call?"),
            ChatCommand::Say("How do I call?".to_owned())
        );
        assert_eq!(
            ChatCommand::parse("/file  ~/shot.png "),
            ChatCommand::File(PathBuf::from("~/shot.png"))
        );
        assert_eq!(
            ChatCommand::parse("/voice turn up the volume"),
            ChatCommand::Voice("turn up the volume".to_owned())
        );
        assert_eq!(ChatCommand::parse("/TASK"), ChatCommand::Task);
        assert_eq!(ChatCommand::parse("/quit"), ChatCommand::Quit);
    }

    #[test]
    fn test_incomplete_command_is_sent_as_text() {
        assert_eq!(ChatCommand::parse("/file"), ChatCommand::Say("/file".to_owned()));
    }

    #[test]
    fn test_input_type() {
        assert_eq!(UserInput::Voice("hi".to_owned()).input_type(), InputType::Voice);
        assert_eq!(
            UserInput::File(FileUpload::new("a.png", vec![1])).input_type(),
            InputType::File
        );
    }
}
