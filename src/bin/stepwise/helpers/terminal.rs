// ABOUTME: Line-oriented terminal input for the interactive screens
// ABOUTME: Reads stdin asynchronously so prompts never block the runtime
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use anyhow::Result;
use std::io::{self, Write};
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Prompting reader over stdin
pub struct Terminal {
    lines: Lines<BufReader<Stdin>>,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(stdin()).lines(),
        }
    }

    /// Print `label` and read one line; `None` at end of input
    pub async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        print!("{label}");
        io::stdout().flush()?;
        Ok(self.lines.next_line().await?.map(|line| line.trim().to_owned()))
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}
