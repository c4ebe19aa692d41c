// ABOUTME: Chat screen controller forwarding text, voice, and file input to the LLM gateway
// ABOUTME: Persists both sides of each exchange and turns failures into an apology message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Chat Controller
//!
//! Business rules:
//! - A send with blank text and no file is a no-op
//! - The user message is persisted before the LLM is called
//! - Messages are appended locally as soon as they are stored; history is never re-fetched
//! - Any gateway failure ends the exchange with exactly one apology message
//! - Sends are serialized so user/assistant pairs never interleave

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::constants::chat::{DEFAULT_HISTORY_LIMIT, TASK_HELPER_PHRASES};
use crate::constants::messages::{APOLOGY_MESSAGE, UPLOADED_FILE_MESSAGE};
use crate::errors::{AppError, AppResult};
use crate::gateways::{EntityGateway, SortKey};
use crate::input::{FileUpload, UserInput};
use crate::integrations::{FileGateway, InvokeLlmRequest, LlmGateway, LlmOutput};
use crate::llm::prompts;
use crate::logging::AppLogger;
use crate::models::{ChatMessage, InputType, NewChatMessage};
use crate::navigation::{ChatLaunch, Route, TaskHelperLaunch};
use crate::session::SessionContext;

/// Whether an assistant reply suggests switching to the Task Helper
#[must_use]
pub fn suggests_task_helper(reply: &str) -> bool {
    let lower = reply.to_lowercase();
    TASK_HELPER_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
}

/// Result of one send
#[derive(Debug)]
pub enum SendOutcome {
    /// Nothing to send
    Skipped,
    /// Both messages were stored and appended
    Answered {
        /// Stored user message
        user: ChatMessage,
        /// Stored assistant reply
        reply: ChatMessage,
    },
    /// The exchange failed and an apology was appended
    Apologized {
        /// User message, if it was stored before the failure
        user: Option<ChatMessage>,
        /// The apology shown to the user
        apology: ChatMessage,
        /// What went wrong
        error: AppError,
    },
}

impl SendOutcome {
    /// Assistant message appended by this send, if any
    #[must_use]
    pub const fn assistant_message(&self) -> Option<&ChatMessage> {
        match self {
            Self::Skipped => None,
            Self::Answered { reply, .. } => Some(reply),
            Self::Apologized { apology, .. } => Some(apology),
        }
    }
}

/// Local view state of the chat screen
#[derive(Debug, Default)]
struct ChatView {
    messages: Vec<ChatMessage>,
    input_method: InputType,
}

/// Chat screen controller
pub struct ChatController {
    messages: Arc<dyn EntityGateway<ChatMessage>>,
    llm: Arc<dyn LlmGateway>,
    files: Arc<dyn FileGateway>,
    session: Arc<SessionContext>,
    history_limit: usize,
    view: RwLock<ChatView>,
    send_lock: Mutex<()>,
}

impl ChatController {
    /// Create a controller with an empty message list
    #[must_use]
    pub fn new(
        messages: Arc<dyn EntityGateway<ChatMessage>>,
        llm: Arc<dyn LlmGateway>,
        files: Arc<dyn FileGateway>,
        session: Arc<SessionContext>,
    ) -> Self {
        Self {
            messages,
            llm,
            files,
            session,
            history_limit: DEFAULT_HISTORY_LIMIT,
            view: RwLock::new(ChatView::default()),
            send_lock: Mutex::new(()),
        }
    }

    /// Number of messages loaded by [`ChatController::load_history`]
    #[must_use]
    pub const fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Messages in display order (oldest first)
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.view.read().await.messages.clone()
    }

    /// Selected input method
    pub async fn input_method(&self) -> InputType {
        self.view.read().await.input_method
    }

    /// Select the input method
    pub async fn set_input_method(&self, input: InputType) {
        self.view.write().await.input_method = input;
    }

    /// Whether a send is in flight
    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.send_lock.try_lock().is_err()
    }

    /// Load the most recent messages, newest fetched first and shown oldest first
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the current list is kept.
    #[instrument(skip(self), fields(limit = self.history_limit))]
    pub async fn load_history(&self) -> AppResult<Vec<ChatMessage>> {
        let mut history = self
            .messages
            .list(&SortKey::newest_first(), Some(self.history_limit))
            .await?;
        history.reverse();

        self.view.write().await.messages.clone_from(&history);
        debug!("Loaded {} chat messages", history.len());
        Ok(history)
    }

    /// Open the screen: load history, apply `input`, and auto-send `prompt`
    ///
    /// Returns `Ok(None)` when there was no prompt or the scope was cancelled.
    ///
    /// # Errors
    ///
    /// Returns the history gateway error (the prompt is not sent then).
    pub async fn open(
        &self,
        launch: ChatLaunch,
        cancel: &CancellationToken,
    ) -> AppResult<Option<SendOutcome>> {
        let sort = SortKey::newest_first();
        let mut history = tokio::select! {
            () = cancel.cancelled() => {
                debug!("Chat open cancelled");
                return Ok(None);
            }
            history = self.messages.list(&sort, Some(self.history_limit)) => history?,
        };
        history.reverse();

        {
            let mut view = self.view.write().await;
            view.messages = history;
            if let Some(input) = launch.input {
                view.input_method = input;
            }
        }

        match launch.prompt {
            Some(prompt) if !cancel.is_cancelled() => {
                Ok(Some(self.send(&prompt, InputType::Text, None).await))
            }
            _ => Ok(None),
        }
    }

    /// Submit whatever an input widget produced
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for files of an unsupported kind.
    pub async fn submit(&self, input: UserInput) -> AppResult<SendOutcome> {
        match input {
            UserInput::Text(text) => Ok(self.send(&text, InputType::Text, None).await),
            UserInput::Voice(transcript) => Ok(self.send(&transcript, InputType::Voice, None).await),
            UserInput::File(upload) => self.send_file(upload).await,
        }
    }

    /// Upload a picked file and send it as a file message
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` before anything is uploaded when the file is
    /// empty or not an image/PDF. Upload failures become an apology instead.
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name))]
    pub async fn send_file(&self, upload: FileUpload) -> AppResult<SendOutcome> {
        upload.validate()?;

        let uploaded = match self.files.upload_file(upload).await {
            Ok(uploaded) => uploaded,
            Err(error) => {
                let _guard = self.send_lock.lock().await;
                let language = self.session.language().await;
                return Ok(self.apologize(None, error, InputType::File, &language).await);
            }
        };

        Ok(self
            .send("", InputType::File, Some(uploaded.file_url))
            .await)
    }

    /// Send a message and wait for the assistant's reply
    ///
    /// Never fails: gateway errors are reported through
    /// [`SendOutcome::Apologized`].
    #[instrument(skip(self, message), fields(input_type = %input_type, has_file = file_url.is_some()))]
    pub async fn send(
        &self,
        message: &str,
        input_type: InputType,
        file_url: Option<String>,
    ) -> SendOutcome {
        if message.trim().is_empty() && file_url.is_none() {
            return SendOutcome::Skipped;
        }

        let _guard = self.send_lock.lock().await;
        let language = self.session.language().await;
        let stored_text = if message.is_empty() {
            UPLOADED_FILE_MESSAGE
        } else {
            message
        };

        let draft = NewChatMessage::user(stored_text, input_type, file_url.clone(), &language);
        let user = match self.messages.create(draft).await {
            Ok(user) => {
                self.append(user.clone()).await;
                user
            }
            Err(error) => return self.apologize(None, error, input_type, &language).await,
        };

        let mut request =
            InvokeLlmRequest::text(prompts::chat_prompt(&language, message, file_url.as_deref()));
        if let Some(url) = file_url {
            request = request.with_file(url);
        }

        let reply_text = match self.llm.invoke_llm(request).await.and_then(LlmOutput::into_text) {
            Ok(text) => text,
            Err(error) => return self.apologize(Some(user), error, input_type, &language).await,
        };

        let suggested = suggests_task_helper(&reply_text);
        let draft = NewChatMessage::assistant(reply_text, suggested, &language);
        match self.messages.create(draft).await {
            Ok(reply) => {
                self.append(reply.clone()).await;
                AppLogger::log_chat_exchange(input_type.as_str(), suggested, true);
                SendOutcome::Answered { user, reply }
            }
            Err(error) => self.apologize(Some(user), error, input_type, &language).await,
        }
    }

    /// Route that opens the Task Helper on the latest answer
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn start_task_helper(&self) -> Route {
        Route::TaskHelper(TaskHelperLaunch::create())
    }

    async fn append(&self, message: ChatMessage) {
        self.view.write().await.messages.push(message);
    }

    /// Store and append the apology; append it locally if storing fails too
    async fn apologize(
        &self,
        user: Option<ChatMessage>,
        error: AppError,
        input_type: InputType,
        language: &str,
    ) -> SendOutcome {
        AppLogger::log_gateway_failure("chat.send", &error);

        let draft = NewChatMessage::assistant(APOLOGY_MESSAGE, false, language);
        let apology = match self.messages.create(draft.clone()).await {
            Ok(stored) => stored,
            Err(store_error) => {
                warn!("Apology could not be stored, showing it locally: {}", store_error);
                draft.into_message(format!("local-{}", Uuid::new_v4()), Utc::now())
            }
        };
        self.append(apology.clone()).await;

        AppLogger::log_chat_exchange(input_type.as_str(), false, false);
        SendOutcome::Apologized {
            user,
            apology,
            error,
        }
    }
}
