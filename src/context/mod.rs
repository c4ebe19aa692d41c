// ABOUTME: Focused dependency injection contexts for gateways, integrations, and screens
// ABOUTME: AppContext composes the data and service contexts and builds controllers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! Focused dependency injection contexts
//!
//! # Architecture
//!
//! - `DataContext`: entity gateways and the cached session
//! - `ServiceContext`: LLM, upload, and speech integrations
//! - `AppContext`: both of the above plus settings, and controller factories

pub mod app;
pub mod data;
pub mod services;

pub use app::AppContext;
pub use data::DataContext;
pub use services::ServiceContext;
