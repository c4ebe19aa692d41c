// ABOUTME: Terminal helpers for the stepwise CLI
// ABOUTME: Provides stdin prompting and consistent screen output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

pub mod display;
pub mod terminal;
