// ABOUTME: Data model for users, chat messages, and saved step-by-step guides
// ABOUTME: Re-exported from the stepwise-core crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! Entities persisted by the backend platform.

pub use stepwise_core::models::*;
