// ABOUTME: Device-local text-to-speech used to read guide steps aloud
// ABOUTME: Runs a configured TTS command, or only logs when none is configured
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Speech
//!
//! Speech never goes through the backend. A failure to speak is reported to
//! the caller, which logs it and carries on; it never changes Task Helper state.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};

/// Reads text aloud
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` in `language` and wait until done
    async fn speak(&self, text: &str, language: &str) -> AppResult<()>;
}

/// Runs an external TTS program, e.g. `espeak` or `say`
///
/// The command line is split on whitespace; the text is passed as the last
/// argument. `{lang}` in an argument is replaced with the language code.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
}

impl CommandSpeech {
    /// Parse a command line such as `espeak -v {lang}`
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the command line is blank.
    pub fn parse(command_line: &str) -> AppResult<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_owned);
        let program = parts
            .next()
            .ok_or_else(|| AppError::config_invalid("Speech command must not be empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    fn arguments(&self, text: &str, language: &str) -> Vec<String> {
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace("{lang}", language))
            .collect();
        args.push(text.to_owned());
        args
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSpeech {
    async fn speak(&self, text: &str, language: &str) -> AppResult<()> {
        debug!(program = %self.program, language, "Speaking {} chars", text.len());
        let status = Command::new(&self.program)
            .args(self.arguments(text, language))
            .status()
            .await
            .map_err(|e| {
                AppError::external_service("Speech", format!("Cannot run {}: {e}", self.program))
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(AppError::external_service(
                "Speech",
                format!("{} exited with {status}", self.program),
            ))
        }
    }
}

/// Logs text instead of speaking it
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSpeech;

#[async_trait]
impl SpeechSynthesizer for LogSpeech {
    async fn speak(&self, text: &str, language: &str) -> AppResult<()> {
        info!(language, "Speech: {}", text);
        Ok(())
    }
}
