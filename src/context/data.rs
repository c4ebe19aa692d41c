// ABOUTME: Data context for dependency injection of the entity and session gateways
// ABOUTME: Holds one typed gateway per record type plus the signed-in session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use std::sync::Arc;

use crate::gateways::EntityGateway;
use crate::models::{ChatMessage, SavedTask};
use crate::session::SessionContext;

/// Data context containing persistence dependencies
///
/// # Dependencies
/// - `messages`: chat history
/// - `tasks`: saved guides
/// - `session`: signed-in user, cached
#[derive(Clone)]
pub struct DataContext {
    messages: Arc<dyn EntityGateway<ChatMessage>>,
    tasks: Arc<dyn EntityGateway<SavedTask>>,
    session: Arc<SessionContext>,
}

impl DataContext {
    /// Create new data context
    #[must_use]
    pub fn new(
        messages: Arc<dyn EntityGateway<ChatMessage>>,
        tasks: Arc<dyn EntityGateway<SavedTask>>,
        session: Arc<SessionContext>,
    ) -> Self {
        Self {
            messages,
            tasks,
            session,
        }
    }

    /// Get the chat message gateway
    #[must_use]
    pub const fn messages(&self) -> &Arc<dyn EntityGateway<ChatMessage>> {
        &self.messages
    }

    /// Get the saved task gateway
    #[must_use]
    pub const fn tasks(&self) -> &Arc<dyn EntityGateway<SavedTask>> {
        &self.tasks
    }

    /// Get the session context
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }
}
