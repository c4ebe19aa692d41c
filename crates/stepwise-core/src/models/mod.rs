// ABOUTME: Entity models for the Stepwise assistant
// ABOUTME: Re-exports User, ChatMessage, SavedTask and the Entity contract they share
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Data Models
//!
//! The three record types the assistant persists through the backend
//! platform. Each record has:
//!
//! - a stored shape (`User`, `ChatMessage`, `SavedTask`) with server-assigned
//!   `id` and `created_date`
//! - a draft shape used for `create` that omits server-assigned fields
//! - a patch shape used for partial `update` that serializes only set fields
//!
//! The [`Entity`] trait ties the three together so gateways can be written
//! once and used for every record type.

mod chat;
mod task;
mod user;

pub use chat::{ChatMessage, InputType, NewChatMessage, NoPatch};
pub use task::{NewSavedTask, SavedTask, SavedTaskPatch, TaskStep};
pub use user::{NewUser, User, UserPatch};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Contract shared by every record type stored in the backend platform.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Entity name as known to the backend (`/entities/{NAME}`)
    const NAME: &'static str;

    /// Payload accepted by `create`
    type Draft: Serialize + Clone + Send + Sync + 'static;

    /// Payload accepted by `update`
    type Patch: Serialize + Send + Sync + 'static;

    /// Server-assigned identifier
    fn id(&self) -> &str;

    /// JSON schema describing the record, usable for constrained generation
    fn schema() -> Value;
}

/// Remove the named properties (and their `required` entries) from a JSON schema.
#[must_use]
pub fn strip_schema_properties(mut schema: Value, fields: &[&str]) -> Value {
    if let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) {
        for field in fields {
            properties.remove(*field);
        }
    }
    if let Some(required) = schema.get_mut("required").and_then(Value::as_array_mut) {
        required.retain(|name| !name.as_str().is_some_and(|name| fields.contains(&name)));
    }
    schema
}
