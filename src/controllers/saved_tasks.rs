// ABOUTME: Saved tasks screen listing stored guides newest first
// ABOUTME: Opening a guide routes to the Task Helper with its id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::errors::AppResult;
use crate::gateways::{EntityGateway, SortKey};
use crate::models::SavedTask;
use crate::navigation::{Route, TaskHelperLaunch};

/// Saved tasks screen controller
pub struct SavedTasksController {
    tasks: Arc<dyn EntityGateway<SavedTask>>,
}

impl SavedTasksController {
    /// Create a controller over the task gateway
    #[must_use]
    pub fn new(tasks: Arc<dyn EntityGateway<SavedTask>>) -> Self {
        Self { tasks }
    }

    /// Every saved guide, newest first
    ///
    /// # Errors
    ///
    /// Returns the gateway error.
    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<SavedTask>> {
        let tasks = self.tasks.list(&SortKey::newest_first(), None).await?;
        debug!("Loaded {} saved tasks", tasks.len());
        Ok(tasks)
    }

    /// Route that plays a saved guide
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn open(&self, task: &SavedTask) -> Route {
        Route::TaskHelper(TaskHelperLaunch::load(task.id.clone()))
    }
}
