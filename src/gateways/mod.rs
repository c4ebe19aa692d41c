// ABOUTME: Entity gateway contracts for records persisted by the backend platform
// ABOUTME: Typed CRUD facade plus sort keys, equality filters, and the session gateway
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Entity Gateways
//!
//! Typed CRUD facades over the external persistence service. Every record type
//! (`User`, `ChatMessage`, `SavedTask`) is reached through the same
//! [`EntityGateway`] contract, so controllers never see transport details.
//!
//! Gateways are pure pass-through: no retry, caching or backoff. A rejected
//! operation surfaces as an `AppError` that the calling controller handles.
//!
//! ## Implementations
//!
//! - [`BackendClient`]: REST client for the hosted backend platform
//! - [`InMemoryBackend`]: in-process store for offline use and tests

mod http;
mod memory;

pub use http::{BackendClient, BackendClientConfig};
pub use memory::InMemoryBackend;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::errors::{AppError, AppResult};
use crate::models::{Entity, User, UserPatch};

// ============================================================================
// Sorting
// ============================================================================

/// Field ordering for `list` and `filter`, written `"-field"` for descending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Field to order by
    pub field: String,
    /// Whether the largest value comes first
    pub descending: bool,
}

impl SortKey {
    /// Ascending order on a field
    #[must_use]
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    /// Descending order on a field
    #[must_use]
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Newest records first
    #[must_use]
    pub fn newest_first() -> Self {
        Self::descending("created_date")
    }

    /// Parse the backend notation (`"created_date"` or `"-created_date"`)
    ///
    /// # Errors
    ///
    /// Returns `AppError::invalid_input` if the field name is empty.
    pub fn parse(value: &str) -> AppResult<Self> {
        let (descending, field) = value
            .strip_prefix('-')
            .map_or((false, value), |field| (true, field));
        if field.trim().is_empty() {
            return Err(AppError::invalid_input("Sort key must name a field"));
        }
        Ok(Self {
            field: field.to_owned(),
            descending,
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

// ============================================================================
// Filtering
// ============================================================================

/// Equality predicate over record fields, e.g. `{ "is_user": false }`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Filter {
    fields: Map<String, Value>,
}

impl Filter {
    /// Empty filter, matches every record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Whether a serialized record satisfies every condition
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| record.get(field).unwrap_or(&Value::Null) == expected)
    }

    /// Conditions as a JSON object
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

// ============================================================================
// Gateway Contracts
// ============================================================================

/// CRUD facade over one record type stored in the backend platform
#[async_trait]
pub trait EntityGateway<E: Entity>: Send + Sync {
    /// Create a record; the backend assigns `id` and `created_date`
    async fn create(&self, draft: E::Draft) -> AppResult<E>;

    /// Fetch a record by identifier; `Ok(None)` if it does not exist
    async fn get(&self, id: &str) -> AppResult<Option<E>>;

    /// List records in the given order, at most `limit` of them
    async fn list(&self, sort: &SortKey, limit: Option<usize>) -> AppResult<Vec<E>>;

    /// List records matching `filter`, in the given order, at most `limit`
    async fn filter(&self, filter: &Filter, sort: &SortKey, limit: Option<usize>)
        -> AppResult<Vec<E>>;

    /// Apply a partial update and return the updated record
    async fn update(&self, id: &str, patch: E::Patch) -> AppResult<E>;

    /// Structural description of the record
    fn schema(&self) -> Value {
        E::schema()
    }
}

/// Access to the signed-in user, owned by the backend's auth provider
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// The signed-in user, or `AuthRequired` when there is no session
    async fn me(&self) -> AppResult<User>;

    /// Update the signed-in user's own data
    async fn update_me(&self, patch: UserPatch) -> AppResult<User>;

    /// URL that starts the login flow and returns to `return_to` afterwards
    fn login_url(&self, return_to: &str) -> String;

    /// End the current session
    async fn logout(&self) -> AppResult<()>;
}
