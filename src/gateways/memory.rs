// ABOUTME: In-process implementation of every backend gateway backed by concurrent maps
// ABOUTME: Used for offline mode and tests; mirrors the backend's id, timestamp, and default rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # In-Memory Backend
//!
//! Stores records as typed values in [`DashMap`]s keyed by id. Create, update,
//! filter and sort go through the records' JSON form, the same way the hosted
//! backend treats them, so the generic gateway code paths are exercised
//! without a network.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{EntityGateway, Filter, SessionGateway, SortKey};
use crate::errors::{AppError, AppResult};
use crate::integrations::{FileGateway, FileUpload, UploadedFile};
use crate::models::{ChatMessage, Entity, NewUser, SavedTask, User, UserPatch};

/// Completion count stored for a task created without one: the create itself
/// records the first completion.
const DEFAULT_TASK_COMPLETION_COUNT: u64 = 1;

// ============================================================================
// Table
// ============================================================================

/// One record type's rows plus the defaults applied on create
struct Table<E: Entity> {
    rows: DashMap<String, (u64, E)>,
    defaults: Map<String, Value>,
    sequence: AtomicU64,
}

impl<E: Entity> Table<E> {
    fn new(defaults: Map<String, Value>) -> Self {
        Self {
            rows: DashMap::new(),
            defaults,
            sequence: AtomicU64::new(0),
        }
    }

    fn insert_draft(&self, draft: &E::Draft) -> AppResult<E> {
        let Value::Object(fields) = serde_json::to_value(draft)? else {
            return Err(AppError::invalid_input(format!(
                "{} draft must serialize to an object",
                E::NAME
            )));
        };

        let mut record = self.defaults.clone();
        record.extend(fields);

        let id = Uuid::new_v4().to_string();
        record.insert("id".to_owned(), Value::String(id.clone()));
        record.insert(
            "created_date".to_owned(),
            Value::String(Utc::now().to_rfc3339()),
        );

        let entity: E = serde_json::from_value(Value::Object(record))?;
        let sequence = self.sequence.fetch_add(1, AtomicOrdering::SeqCst);
        self.rows.insert(id.clone(), (sequence, entity.clone()));

        debug!(entity = E::NAME, id = %id, "Created record");
        Ok(entity)
    }

    fn get(&self, id: &str) -> Option<E> {
        self.rows.get(id).map(|row| row.1.clone())
    }

    fn query(&self, filter: &Filter, sort: &SortKey, limit: Option<usize>) -> AppResult<Vec<E>> {
        let mut matching = Vec::new();
        for row in &self.rows {
            let (sequence, entity) = row.value();
            let json = serde_json::to_value(entity)?;
            if filter.matches(&json) {
                matching.push((*sequence, json, entity.clone()));
            }
        }

        matching.sort_by(|(seq_a, json_a, _), (seq_b, json_b, _)| {
            let by_field = compare_values(
                json_a.get(&sort.field).unwrap_or(&Value::Null),
                json_b.get(&sort.field).unwrap_or(&Value::Null),
            )
            .then_with(|| seq_a.cmp(seq_b));
            if sort.descending {
                by_field.reverse()
            } else {
                by_field
            }
        });

        let records = matching.into_iter().map(|(_, _, entity)| entity);
        Ok(match limit {
            Some(limit) => records.take(limit).collect(),
            None => records.collect(),
        })
    }

    fn apply_patch(&self, id: &str, patch: &E::Patch) -> AppResult<E> {
        let mut row = self
            .rows
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("{} {id}", E::NAME)).with_resource_id(id))?;

        let Value::Object(mut record) = serde_json::to_value(&row.1)? else {
            return Err(AppError::internal(format!("{} record is not an object", E::NAME)));
        };
        if let Value::Object(changes) = serde_json::to_value(patch)? {
            record.extend(changes);
        }

        let updated: E = serde_json::from_value(Value::Object(record))?;
        row.1 = updated.clone();
        drop(row);

        debug!(entity = E::NAME, id = %id, "Updated record");
        Ok(updated)
    }
}

/// Order two JSON field values; RFC 3339 strings compare as instants
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or_default();
            let b = b.as_f64().unwrap_or_default();
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => {
            match (
                DateTime::parse_from_rfc3339(a),
                DateTime::parse_from_rfc3339(b),
            ) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        _ => a.to_string().cmp(&b.to_string()),
    }
}

// ============================================================================
// Backend
// ============================================================================

/// In-process stand-in for the hosted backend platform
pub struct InMemoryBackend {
    users: Table<User>,
    messages: Table<ChatMessage>,
    tasks: Table<SavedTask>,
    files: DashMap<String, FileUpload>,
    current_user: RwLock<Option<String>>,
}

impl InMemoryBackend {
    /// Create an empty backend with no signed-in user
    #[must_use]
    pub fn new() -> Self {
        let mut task_defaults = Map::new();
        task_defaults.insert(
            "completion_count".to_owned(),
            Value::from(DEFAULT_TASK_COMPLETION_COUNT),
        );

        Self {
            users: Table::new(Map::new()),
            messages: Table::new(Map::new()),
            tasks: Table::new(task_defaults),
            files: DashMap::new(),
            current_user: RwLock::new(None),
        }
    }

    /// Create a user the way the auth provider does on first login, and sign in
    ///
    /// # Errors
    ///
    /// Returns an error if the user record cannot be materialized.
    pub async fn sign_in(&self, account: NewUser) -> AppResult<User> {
        let user = self.users.insert_draft(&account)?;
        *self.current_user.write().await = Some(user.id.clone());
        Ok(user)
    }

    /// Number of stored uploads
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Stored upload by URL
    #[must_use]
    pub fn file(&self, file_url: &str) -> Option<FileUpload> {
        self.files.get(file_url).map(|entry| entry.value().clone())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Implements [`EntityGateway`] for one record type over the named table
macro_rules! impl_entity_gateway {
    ($entity:ty, $table:ident) => {
        #[async_trait]
        impl EntityGateway<$entity> for InMemoryBackend {
            async fn create(&self, draft: <$entity as Entity>::Draft) -> AppResult<$entity> {
                self.$table.insert_draft(&draft)
            }

            async fn get(&self, id: &str) -> AppResult<Option<$entity>> {
                Ok(self.$table.get(id))
            }

            async fn list(&self, sort: &SortKey, limit: Option<usize>) -> AppResult<Vec<$entity>> {
                self.$table.query(&Filter::new(), sort, limit)
            }

            async fn filter(
                &self,
                filter: &Filter,
                sort: &SortKey,
                limit: Option<usize>,
            ) -> AppResult<Vec<$entity>> {
                self.$table.query(filter, sort, limit)
            }

            async fn update(
                &self,
                id: &str,
                patch: <$entity as Entity>::Patch,
            ) -> AppResult<$entity> {
                self.$table.apply_patch(id, &patch)
            }
        }
    };
}

impl_entity_gateway!(User, users);
impl_entity_gateway!(ChatMessage, messages);
impl_entity_gateway!(SavedTask, tasks);

#[async_trait]
impl SessionGateway for InMemoryBackend {
    async fn me(&self) -> AppResult<User> {
        let current = self.current_user.read().await;
        let id = current.as_deref().ok_or_else(AppError::auth_required)?;
        self.users.get(id).ok_or_else(AppError::auth_required)
    }

    async fn update_me(&self, patch: UserPatch) -> AppResult<User> {
        let id = self
            .current_user
            .read()
            .await
            .clone()
            .ok_or_else(AppError::auth_required)?;
        self.users.apply_patch(&id, &patch)
    }

    fn login_url(&self, return_to: &str) -> String {
        format!(
            "memory://login?from_url={}",
            urlencoding::encode(return_to)
        )
    }

    async fn logout(&self) -> AppResult<()> {
        *self.current_user.write().await = None;
        Ok(())
    }
}

#[async_trait]
impl FileGateway for InMemoryBackend {
    async fn upload_file(&self, file: FileUpload) -> AppResult<UploadedFile> {
        let file_url = format!(
            "memory://files/{}/{}",
            Uuid::new_v4(),
            urlencoding::encode(&file.file_name)
        );
        self.files.insert(file_url.clone(), file);
        Ok(UploadedFile { file_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InputType, NewChatMessage, NewSavedTask, SavedTaskPatch, TaskStep};

    fn task_draft(title: &str) -> NewSavedTask {
        NewSavedTask {
            title: title.to_owned(),
            steps: vec![TaskStep {
                instruction: "Open Settings".to_owned(),
                visual_description: String::new(),
                audio_text: String::new(),
            }],
            completion_count: None,
            language: None,
        }
    }

    #[tokio::test]
    async fn test_list_orders_by_creation() {
        let backend = InMemoryBackend::new();
        for text in ["first", "second", "third"] {
            EntityGateway::<ChatMessage>::create(
                &backend,
                NewChatMessage::user(text, InputType::Text, None, "en"),
            )
            .await
            .unwrap();
        }

        let newest: Vec<ChatMessage> = backend
            .list(&SortKey::newest_first(), Some(2))
            .await
            .unwrap();
        let texts: Vec<&str> = newest.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["third", "second"]);
    }

    #[tokio::test]
    async fn test_task_defaults_and_patch() {
        let backend = InMemoryBackend::new();
        let task: SavedTask = backend.create(task_draft("Connect to WiFi")).await.unwrap();
        assert_eq!(task.completion_count, 1);

        let updated: SavedTask = backend
            .update(&task.id, SavedTaskPatch::completion_count(2))
            .await
            .unwrap();
        assert_eq!(updated.completion_count, 2);
        assert_eq!(updated.title, "Connect to WiFi");
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let backend = InMemoryBackend::new();
        let result: AppResult<SavedTask> = backend
            .update("missing", SavedTaskPatch::completion_count(2))
            .await;
        assert_eq!(
            result.unwrap_err().code,
            crate::errors::ErrorCode::ResourceNotFound
        );
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let backend = InMemoryBackend::new();
        assert!(backend.me().await.unwrap_err().is_auth_required());

        backend.sign_in(NewUser::default()).await.unwrap();
        let user = backend.update_me(UserPatch::language("fr")).await.unwrap();
        assert_eq!(user.language(), "fr");

        backend.logout().await.unwrap();
        assert!(backend.me().await.is_err());
    }

    #[test]
    fn test_compare_values_handles_timestamps() {
        let earlier = Value::String("2025-01-01T12:00:00.500Z".to_owned());
        let later = Value::String("2025-01-01T12:00:01Z".to_owned());
        assert_eq!(compare_values(&earlier, &later), Ordering::Less);
    }
}
