// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: In-memory backend harness, scripted LLM, recording speech, and failure-injecting gateways
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `stepwise`
//!
//! Controllers are built over the in-memory backend wrapped in gateways that
//! count calls and fail on request, so tests can assert exactly which
//! persistence calls happened.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use stepwise::context::{AppContext, DataContext, ServiceContext};
use stepwise::controllers::{ChatController, TaskHelperController};
use stepwise::errors::{AppError, AppResult};
use stepwise::gateways::{EntityGateway, Filter, InMemoryBackend, SessionGateway, SortKey};
use stepwise::integrations::{
    FileGateway, FileUpload, InvokeLlmRequest, LlmGateway, LlmOutput, UploadedFile,
};
use stepwise::models::{
    ChatMessage, Entity, InputType, NewChatMessage, NewSavedTask, NewUser, SavedTask, TaskStep,
    User, UserPatch,
};
use stepwise::session::SessionContext;
use stepwise::speech::SpeechSynthesizer;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

// ============================================================================
// Scripted LLM
// ============================================================================

/// LLM gateway that replays queued outputs and records every request
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<AppResult<LlmOutput>>>,
    requests: Mutex<Vec<InvokeLlmRequest>>,
}

impl ScriptedLlm {
    pub fn reply_text(&self, text: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(LlmOutput::Text(text.to_owned())));
    }

    pub fn reply_json(&self, value: Value) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(LlmOutput::Json(value)));
    }

    pub fn reply_output(&self, output: LlmOutput) {
        self.replies.lock().unwrap().push_back(Ok(output));
    }

    pub fn fail(&self) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(AppError::external_service("InvokeLLM", "model offline")));
    }

    pub fn requests(&self) -> Vec<InvokeLlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmGateway for ScriptedLlm {
    async fn invoke_llm(&self, request: InvokeLlmRequest) -> AppResult<LlmOutput> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::external_service("InvokeLLM", "no scripted reply")))
    }
}

// ============================================================================
// Recording speech
// ============================================================================

/// Speech synthesizer that records `(text, language)` pairs
#[derive(Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<(String, String)>>,
}

impl RecordingSpeech {
    pub fn spoken(&self) -> Vec<(String, String)> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSpeech {
    async fn speak(&self, text: &str, language: &str) -> AppResult<()> {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_owned(), language.to_owned()));
        Ok(())
    }
}

// ============================================================================
// Failure-injecting gateways
// ============================================================================

/// Entity gateway that records calls and fails the ones it is told to
pub struct FlakyGateway<E: Entity> {
    inner: Arc<dyn EntityGateway<E>>,
    creates: Mutex<Vec<Value>>,
    updates: Mutex<Vec<(String, Value)>>,
    failing_creates: Mutex<HashSet<usize>>,
    fail_updates: AtomicBool,
    fail_reads: AtomicBool,
}

impl<E: Entity> FlakyGateway<E> {
    pub fn new(inner: Arc<dyn EntityGateway<E>>) -> Self {
        Self {
            inner,
            creates: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            failing_creates: Mutex::new(HashSet::new()),
            fail_updates: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Fail the create call with this zero-based index
    pub fn fail_create_call(&self, index: usize) {
        self.failing_creates.lock().unwrap().insert(index);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Serialized drafts of every attempted create
    pub fn creates(&self) -> Vec<Value> {
        self.creates.lock().unwrap().clone()
    }

    /// `(id, serialized patch)` of every attempted update
    pub fn updates(&self) -> Vec<(String, Value)> {
        self.updates.lock().unwrap().clone()
    }

    fn rejected(operation: &str) -> AppError {
        AppError::gateway(E::NAME, operation, "injected failure")
    }

    fn check_reads(&self, operation: &str) -> AppResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::rejected(operation));
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> EntityGateway<E> for FlakyGateway<E> {
    async fn create(&self, draft: E::Draft) -> AppResult<E> {
        let index = {
            let mut creates = self.creates.lock().unwrap();
            creates.push(serde_json::to_value(&draft).unwrap());
            creates.len() - 1
        };
        if self.failing_creates.lock().unwrap().contains(&index) {
            return Err(Self::rejected("create"));
        }
        self.inner.create(draft).await
    }

    async fn get(&self, id: &str) -> AppResult<Option<E>> {
        self.check_reads("get")?;
        self.inner.get(id).await
    }

    async fn list(&self, sort: &SortKey, limit: Option<usize>) -> AppResult<Vec<E>> {
        self.check_reads("list")?;
        self.inner.list(sort, limit).await
    }

    async fn filter(
        &self,
        filter: &Filter,
        sort: &SortKey,
        limit: Option<usize>,
    ) -> AppResult<Vec<E>> {
        self.check_reads("filter")?;
        self.inner.filter(filter, sort, limit).await
    }

    async fn update(&self, id: &str, patch: E::Patch) -> AppResult<E> {
        self.updates
            .lock()
            .unwrap()
            .push((id.to_owned(), serde_json::to_value(&patch).unwrap()));
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(Self::rejected("update"));
        }
        self.inner.update(id, patch).await
    }
}

/// Session gateway whose `update_me` can be made to fail
pub struct FlakySession {
    inner: Arc<InMemoryBackend>,
    fail_updates: AtomicBool,
}

impl FlakySession {
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionGateway for FlakySession {
    async fn me(&self) -> AppResult<User> {
        self.inner.me().await
    }

    async fn update_me(&self, patch: UserPatch) -> AppResult<User> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::gateway("User", "update", "injected failure"));
        }
        self.inner.update_me(patch).await
    }

    fn login_url(&self, return_to: &str) -> String {
        self.inner.login_url(return_to)
    }

    async fn logout(&self) -> AppResult<()> {
        self.inner.logout().await
    }
}

/// File gateway that can be made to fail
pub struct FlakyFiles {
    inner: Arc<InMemoryBackend>,
    fail: AtomicBool,
}

impl FlakyFiles {
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileGateway for FlakyFiles {
    async fn upload_file(&self, file: FileUpload) -> AppResult<UploadedFile> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::unavailable("UploadFile", "injected failure"));
        }
        self.inner.upload_file(file).await
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Everything a controller test needs, wired over one in-memory backend
pub struct Harness {
    pub backend: Arc<InMemoryBackend>,
    pub messages: Arc<FlakyGateway<ChatMessage>>,
    pub tasks: Arc<FlakyGateway<SavedTask>>,
    pub session_gateway: Arc<FlakySession>,
    pub files: Arc<FlakyFiles>,
    pub session: Arc<SessionContext>,
    pub llm: Arc<ScriptedLlm>,
    pub speech: Arc<RecordingSpeech>,
}

impl Harness {
    /// Signed-in user who picked English and finished onboarding
    pub async fn ready() -> Self {
        let harness = Self::signed_in().await;
        harness
            .backend
            .update_me(UserPatch {
                preferred_language: Some("en".to_owned()),
                onboarding_completed: Some(true),
                total_tasks_completed: None,
            })
            .await
            .unwrap();
        harness.session.invalidate().await;
        harness
    }

    /// Signed-in user fresh from the auth provider
    pub async fn signed_in() -> Self {
        let harness = Self::signed_out();
        harness
            .backend
            .sign_in(NewUser {
                email: Some("pat@example.com".to_owned()),
                full_name: Some("Pat".to_owned()),
            })
            .await
            .unwrap();
        harness
    }

    /// No session at all
    pub fn signed_out() -> Self {
        init_test_logging();
        let backend = Arc::new(InMemoryBackend::new());
        let session_gateway = Arc::new(FlakySession {
            inner: backend.clone(),
            fail_updates: AtomicBool::new(false),
        });
        let session_dyn: Arc<dyn SessionGateway> = session_gateway.clone();

        Self {
            messages: Arc::new(FlakyGateway::<ChatMessage>::new(backend.clone())),
            tasks: Arc::new(FlakyGateway::<SavedTask>::new(backend.clone())),
            files: Arc::new(FlakyFiles {
                inner: backend.clone(),
                fail: AtomicBool::new(false),
            }),
            session: Arc::new(SessionContext::new(session_dyn)),
            session_gateway,
            backend,
            llm: Arc::new(ScriptedLlm::default()),
            speech: Arc::new(RecordingSpeech::default()),
        }
    }

    pub fn chat(&self) -> ChatController {
        ChatController::new(
            self.messages.clone(),
            self.llm.clone(),
            self.files.clone(),
            self.session.clone(),
        )
    }

    pub fn task_helper(&self) -> TaskHelperController {
        TaskHelperController::new(
            self.tasks.clone(),
            self.messages.clone(),
            self.llm.clone(),
            self.session.clone(),
            self.speech.clone(),
        )
    }

    pub fn context(&self) -> AppContext {
        AppContext::new(
            DataContext::new(self.messages.clone(), self.tasks.clone(), self.session.clone()),
            ServiceContext::new(self.llm.clone(), self.files.clone(), self.speech.clone()),
        )
    }

    /// Current user straight from the backend, bypassing the session cache
    pub async fn user(&self) -> User {
        self.backend.me().await.unwrap()
    }

    /// Store an assistant message the Task Helper can build a guide from
    pub async fn seed_answer(&self, text: &str) {
        EntityGateway::<ChatMessage>::create(
            self.backend.as_ref(),
            NewChatMessage::assistant(text, true, "en"),
        )
        .await
        .unwrap();
    }

    /// Store a user message
    pub async fn seed_question(&self, text: &str) {
        EntityGateway::<ChatMessage>::create(
            self.backend.as_ref(),
            NewChatMessage::user(text, InputType::Text, None, "en"),
        )
        .await
        .unwrap();
    }

    /// Store a saved task directly
    pub async fn seed_task(&self, title: &str, steps: &[&str]) -> SavedTask {
        EntityGateway::<SavedTask>::create(self.backend.as_ref(), task_draft(title, steps))
            .await
            .unwrap()
    }
}

// ============================================================================
// Data builders
// ============================================================================

pub fn step(instruction: &str) -> TaskStep {
    TaskStep {
        instruction: instruction.to_owned(),
        visual_description: format!("{instruction} on screen"),
        audio_text: format!("Now, {}", instruction.to_lowercase()),
    }
}

pub fn task_draft(title: &str, steps: &[&str]) -> NewSavedTask {
    NewSavedTask {
        title: title.to_owned(),
        steps: steps.iter().map(|s| step(s)).collect(),
        completion_count: None,
        language: Some("en".to_owned()),
    }
}

/// Structured guide as the model would return it
pub fn generated_guide(title: &str, steps: &[&str]) -> Value {
    json!({
        "title": title,
        "steps": steps
            .iter()
            .map(|s| json!({
                "instruction": s,
                "visual_description": format!("{s} on screen"),
                "audio_text": format!("Now, {}", s.to_lowercase()),
            }))
            .collect::<Vec<_>>(),
    })
}
