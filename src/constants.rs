// ABOUTME: Application constants: languages, user-facing messages, and chat limits
// ABOUTME: Re-exported from the stepwise-core crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! Constants shared by controllers and the terminal front-end.

pub use stepwise_core::constants::*;
