// ABOUTME: Task Helper controller that loads or generates a guide and plays it step by step
// ABOUTME: Owns the cursor state machine and persists the guide on successful completion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Task Helper Controller
//!
//! States: `Idle → Loading → {Error | Ready}`. In `Ready` the cursor ranges
//! over `0..=step_count`; `step_count` is the completion screen.
//!
//! Business rules:
//! - `taskId=X` loads a saved task; a missing task is an error, never an empty guide
//! - `mode=create` turns the latest assistant reply into a guide; it stays
//!   transient (unsaved) until the user completes it
//! - Completing a transient guide creates it; completing a saved one bumps its counter
//! - The user's completed-task counter is bumped after the guide is stored
//! - Persistence failures are reported, never retried

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::DeclinePolicy;
use crate::constants::messages::{STILL_NEED_HELP_PROMPT, TASK_LOAD_ERROR};
use crate::errors::{AppError, AppResult, TaskHelperError};
use crate::gateways::{EntityGateway, Filter, SortKey};
use crate::integrations::{InvokeLlmRequest, LlmGateway};
use crate::llm::prompts;
use crate::logging::AppLogger;
use crate::models::{
    strip_schema_properties, ChatMessage, Entity, NewSavedTask, SavedTask, SavedTaskPatch,
    TaskStep, UserPatch,
};
use crate::navigation::{ChatLaunch, Route, TaskHelperLaunch};
use crate::session::SessionContext;
use crate::speech::SpeechSynthesizer;

/// Fields the model must not fill in
const SERVER_ONLY_FIELDS: &[&str] = &["completion_count", "language"];

// ============================================================================
// Request
// ============================================================================

/// Where the guide comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSource {
    /// Load a saved task
    Saved(String),
    /// Generate from the latest assistant message
    Generate,
}

impl TaskSource {
    /// Validate route parameters; `taskId` wins over `mode`
    ///
    /// # Errors
    ///
    /// Returns `InvalidMode` unless a task id or `mode=create` is present.
    pub fn from_launch(launch: &TaskHelperLaunch) -> Result<Self, TaskHelperError> {
        if let Some(task_id) = launch.task_id.as_deref().filter(|id| !id.trim().is_empty()) {
            return Ok(Self::Saved(task_id.to_owned()));
        }
        match launch.mode.as_deref() {
            Some("create") => Ok(Self::Generate),
            _ => Err(TaskHelperError::InvalidMode),
        }
    }
}

// ============================================================================
// State
// ============================================================================

/// The guide being played
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveTask {
    /// Stored guide
    Saved(SavedTask),
    /// Generated guide, not stored yet
    Transient(NewSavedTask),
}

impl ActiveTask {
    /// Guide title
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Saved(task) => &task.title,
            Self::Transient(draft) => &draft.title,
        }
    }

    /// Ordered steps
    #[must_use]
    pub fn steps(&self) -> &[TaskStep] {
        match self {
            Self::Saved(task) => &task.steps,
            Self::Transient(draft) => &draft.steps,
        }
    }

    /// Whether the guide has not been stored yet
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Controller state
#[derive(Debug, Default)]
pub enum TaskHelperState {
    /// Nothing requested yet, or the guide was closed
    #[default]
    Idle,
    /// Fetching or generating
    Loading,
    /// The guide could not be acquired
    Error(TaskHelperError),
    /// Playing the guide
    Ready {
        /// The guide
        task: ActiveTask,
        /// Step index, `steps.len()` is the completion screen
        cursor: usize,
    },
}

/// What the screen shows at the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepView<'a> {
    /// An instruction step
    Instruction {
        /// Zero-based index
        index: usize,
        /// The step
        step: &'a TaskStep,
    },
    /// The "Did this help?" screen
    Completion,
}

/// Position within the guide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// One-based step number (`total + 1` on the completion screen)
    pub step_number: usize,
    /// Number of instruction steps
    pub total: usize,
    /// Cursor is on the first step
    pub is_first: bool,
    /// Cursor is on the last instruction step
    pub is_last: bool,
    /// Cursor is on the completion screen
    pub at_completion: bool,
}

/// Result of answering the completion screen
#[derive(Debug)]
pub enum CompletionOutcome {
    /// The guide is stored and the user's counter was bumped
    Completed(SavedTask),
    /// The user still needs help
    Declined,
    /// Storing the guide or the counter failed
    PersistenceFailed {
        /// The stored guide, when only the counter update failed
        saved: Option<SavedTask>,
        /// What went wrong
        error: AppError,
    },
}

impl CompletionOutcome {
    /// Screen to navigate to
    #[must_use]
    pub fn route(&self) -> Route {
        match self {
            Self::Completed(_) => Route::SavedTasks,
            Self::Declined => Route::Chat(ChatLaunch::with_prompt(STILL_NEED_HELP_PROMPT)),
            Self::PersistenceFailed { .. } => Route::Home,
        }
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::Completed(_) => "completed",
            Self::Declined => "declined",
            Self::PersistenceFailed { .. } => "persistence_failed",
        }
    }
}

/// How an initialization call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// The guide is ready to play
    Ready,
    /// The scope was cancelled; the previous state was kept
    Cancelled,
}

// ============================================================================
// Controller
// ============================================================================

/// Task Helper screen controller
pub struct TaskHelperController {
    tasks: Arc<dyn EntityGateway<SavedTask>>,
    messages: Arc<dyn EntityGateway<ChatMessage>>,
    llm: Arc<dyn LlmGateway>,
    session: Arc<SessionContext>,
    speech: Arc<dyn SpeechSynthesizer>,
    decline_policy: DeclinePolicy,
    state: TaskHelperState,
}

impl TaskHelperController {
    /// Create an idle controller
    #[must_use]
    pub fn new(
        tasks: Arc<dyn EntityGateway<SavedTask>>,
        messages: Arc<dyn EntityGateway<ChatMessage>>,
        llm: Arc<dyn LlmGateway>,
        session: Arc<SessionContext>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            tasks,
            messages,
            llm,
            session,
            speech,
            decline_policy: DeclinePolicy::default(),
            state: TaskHelperState::Idle,
        }
    }

    /// What to keep when the user declines
    #[must_use]
    pub const fn with_decline_policy(mut self, policy: DeclinePolicy) -> Self {
        self.decline_policy = policy;
        self
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &TaskHelperState {
        &self.state
    }

    /// The guide being played
    #[must_use]
    pub const fn task(&self) -> Option<&ActiveTask> {
        match &self.state {
            TaskHelperState::Ready { task, .. } => Some(task),
            _ => None,
        }
    }

    /// Cursor position
    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        match &self.state {
            TaskHelperState::Ready { cursor, .. } => Some(*cursor),
            _ => None,
        }
    }

    /// Message shown on the error screen
    #[must_use]
    pub const fn error_message(&self) -> Option<&'static str> {
        match &self.state {
            TaskHelperState::Error(_) => Some(TASK_LOAD_ERROR),
            _ => None,
        }
    }

    /// Typed cause of the error screen
    #[must_use]
    pub const fn error(&self) -> Option<&TaskHelperError> {
        match &self.state {
            TaskHelperState::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Acquire the guide named by the route parameters
    ///
    /// On failure the state becomes `Error` and the cause is returned as well.
    /// If `cancel` fires first the result is discarded and the previous state
    /// is restored.
    ///
    /// # Errors
    ///
    /// `InvalidMode`, `NotFound`, `NoSourceMessage`, `GenerationFailed`, or a gateway error.
    #[instrument(skip(self, cancel), fields(task_id = ?launch.task_id, mode = ?launch.mode))]
    pub async fn initialize(
        &mut self,
        launch: &TaskHelperLaunch,
        cancel: &CancellationToken,
    ) -> Result<InitStatus, TaskHelperError> {
        let previous = std::mem::replace(&mut self.state, TaskHelperState::Loading);

        let acquired = tokio::select! {
            () = cancel.cancelled() => None,
            result = self.acquire(launch) => Some(result),
        };

        match acquired {
            None => {
                debug!("Task Helper initialization cancelled");
                self.state = previous;
                Ok(InitStatus::Cancelled)
            }
            Some(Ok(task)) => {
                info!(title = %task.title(), steps = task.steps().len(), transient = task.is_transient(), "Guide ready");
                self.state = TaskHelperState::Ready { task, cursor: 0 };
                Ok(InitStatus::Ready)
            }
            Some(Err(error)) => {
                warn!("Task Helper could not load a guide: {}", error);
                let reported = clone_error(&error);
                self.state = TaskHelperState::Error(error);
                Err(reported)
            }
        }
    }

    async fn acquire(&self, launch: &TaskHelperLaunch) -> Result<ActiveTask, TaskHelperError> {
        match TaskSource::from_launch(launch)? {
            TaskSource::Saved(task_id) => self.load(&task_id).await,
            TaskSource::Generate => self.generate().await,
        }
    }

    async fn load(&self, task_id: &str) -> Result<ActiveTask, TaskHelperError> {
        self.tasks
            .get(task_id)
            .await?
            .map(ActiveTask::Saved)
            .ok_or_else(|| TaskHelperError::not_found(task_id))
    }

    async fn generate(&self) -> Result<ActiveTask, TaskHelperError> {
        let latest = self
            .messages
            .filter(
                &Filter::new().eq("is_user", false),
                &SortKey::newest_first(),
                Some(1),
            )
            .await?;
        let source = latest
            .into_iter()
            .next()
            .ok_or(TaskHelperError::NoSourceMessage)?;

        let schema = strip_schema_properties(SavedTask::schema(), SERVER_ONLY_FIELDS);
        let prompt = prompts::task_guide_prompt(&schema, &source.message);
        let output = self
            .llm
            .invoke_llm(InvokeLlmRequest::text(prompt).with_schema(schema))
            .await?;

        let value = output
            .into_json()
            .ok_or_else(|| TaskHelperError::generation_failed("the model returned no guide"))?;
        let mut draft: NewSavedTask = serde_json::from_value(value).map_err(|e| {
            TaskHelperError::generation_failed(format!("the guide did not match the schema: {e}"))
        })?;
        draft
            .validate()
            .map_err(|e| TaskHelperError::generation_failed(e.message))?;

        draft.completion_count = None;
        draft.language = Some(self.session.language().await);
        Ok(ActiveTask::Transient(draft))
    }

    /// What the screen shows at the cursor
    #[must_use]
    pub fn current_view(&self) -> Option<StepView<'_>> {
        let TaskHelperState::Ready { task, cursor } = &self.state else {
            return None;
        };
        Some(
            task.steps()
                .get(*cursor)
                .map_or(StepView::Completion, |step| StepView::Instruction {
                    index: *cursor,
                    step,
                }),
        )
    }

    /// Position within the guide
    #[must_use]
    pub fn progress(&self) -> Option<Progress> {
        let TaskHelperState::Ready { task, cursor } = &self.state else {
            return None;
        };
        let total = task.steps().len();
        Some(Progress {
            step_number: cursor + 1,
            total,
            is_first: *cursor == 0,
            is_last: total > 0 && *cursor == total - 1,
            at_completion: *cursor == total,
        })
    }

    /// Advance one step, up to the completion screen
    pub fn next(&mut self) {
        if let TaskHelperState::Ready { task, cursor } = &mut self.state {
            if *cursor < task.steps().len() {
                *cursor += 1;
            }
        }
    }

    /// Go back one step, down to the first
    pub fn back(&mut self) {
        if let TaskHelperState::Ready { cursor, .. } = &mut self.state {
            if *cursor > 0 {
                *cursor -= 1;
            }
        }
    }

    /// Read the current step aloud again; state is unchanged
    ///
    /// # Errors
    ///
    /// Returns the speech error.
    pub async fn repeat(&self) -> AppResult<()> {
        let Some(StepView::Instruction { step, .. }) = self.current_view() else {
            return Ok(());
        };
        let language = self.session.language().await;
        self.speech.speak(step.narration(), &language).await
    }

    /// Answer the completion screen
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the cursor is on the completion screen.
    #[instrument(skip(self))]
    pub async fn complete(&mut self, success: bool) -> AppResult<CompletionOutcome> {
        let TaskHelperState::Ready { task, cursor } = &self.state else {
            return Err(AppError::invalid_state("No guide is being played"));
        };
        if *cursor != task.steps().len() {
            return Err(AppError::invalid_state(
                "The guide can only be completed from the completion screen",
            ));
        }
        let title = task.title().to_owned();
        let step_count = task.steps().len();

        let outcome = if success {
            let task = task.clone();
            let outcome = self.persist_completion(task).await;
            self.state = TaskHelperState::Idle;
            outcome
        } else {
            match self.decline_policy {
                DeclinePolicy::Discard => self.state = TaskHelperState::Idle,
                DeclinePolicy::Retain => {
                    if let TaskHelperState::Ready { cursor, .. } = &mut self.state {
                        *cursor = 0;
                    }
                }
            }
            CompletionOutcome::Declined
        };

        AppLogger::log_task_outcome(&title, step_count, outcome.label());
        Ok(outcome)
    }

    async fn persist_completion(&self, task: ActiveTask) -> CompletionOutcome {
        let stored = match task {
            ActiveTask::Transient(draft) => self.tasks.create(draft).await,
            ActiveTask::Saved(saved) => {
                self.tasks
                    .update(
                        &saved.id,
                        SavedTaskPatch::completion_count(saved.completion_count + 1),
                    )
                    .await
            }
        };
        let saved = match stored {
            Ok(saved) => saved,
            Err(error) => {
                AppLogger::log_gateway_failure("task_helper.save", &error);
                return CompletionOutcome::PersistenceFailed { saved: None, error };
            }
        };

        let counted = match self.session.current_user().await {
            Ok(user) => {
                self.session
                    .update(UserPatch::total_tasks_completed(
                        user.total_tasks_completed + 1,
                    ))
                    .await
            }
            Err(error) => Err(error),
        };
        match counted {
            Ok(_) => CompletionOutcome::Completed(saved),
            Err(error) => {
                AppLogger::log_gateway_failure("task_helper.count", &error);
                CompletionOutcome::PersistenceFailed {
                    saved: Some(saved),
                    error,
                }
            }
        }
    }

    /// Leave the guide
    pub fn close(&mut self) -> Route {
        self.state = TaskHelperState::Idle;
        Route::Home
    }
}

/// `TaskHelperError` holds a non-clonable source; rebuild an equivalent value
fn clone_error(error: &TaskHelperError) -> TaskHelperError {
    match error {
        TaskHelperError::NotFound { task_id } => TaskHelperError::not_found(task_id.clone()),
        TaskHelperError::NoSourceMessage => TaskHelperError::NoSourceMessage,
        TaskHelperError::GenerationFailed { reason } => {
            TaskHelperError::generation_failed(reason.clone())
        }
        TaskHelperError::InvalidMode => TaskHelperError::InvalidMode,
        TaskHelperError::Gateway(inner) => {
            let mut copy = AppError::new(inner.code, inner.message.clone());
            if let Some(resource_id) = &inner.resource_id {
                copy = copy.with_resource_id(resource_id.clone());
            }
            TaskHelperError::Gateway(copy)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_source_from_launch() {
        assert_eq!(
            TaskSource::from_launch(&TaskHelperLaunch::load("t1")).unwrap(),
            TaskSource::Saved("t1".to_owned())
        );
        assert_eq!(
            TaskSource::from_launch(&TaskHelperLaunch::create()).unwrap(),
            TaskSource::Generate
        );
        let bogus = TaskHelperLaunch {
            task_id: None,
            mode: Some("edit".to_owned()),
        };
        assert!(matches!(
            TaskSource::from_launch(&bogus),
            Err(TaskHelperError::InvalidMode)
        ));
        assert!(matches!(
            TaskSource::from_launch(&TaskHelperLaunch::default()),
            Err(TaskHelperError::InvalidMode)
        ));
    }

    #[test]
    fn test_mode_is_case_sensitive() {
        for mode in ["Create", "CREATE", " create"] {
            let launch = TaskHelperLaunch {
                task_id: None,
                mode: Some(mode.to_owned()),
            };
            assert!(
                matches!(
                    TaskSource::from_launch(&launch),
                    Err(TaskHelperError::InvalidMode)
                ),
                "{mode}"
            );
        }
    }

    #[test]
    fn test_outcome_routes() {
        assert_eq!(CompletionOutcome::Declined.route().to_url(), "/Chat?prompt=I%20still%20need%20help%20with%20this%20task.");
        let failed = CompletionOutcome::PersistenceFailed {
            saved: None,
            error: AppError::internal("boom"),
        };
        assert_eq!(failed.route(), Route::Home);
    }
}
