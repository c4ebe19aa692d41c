// ABOUTME: Application context wiring configuration into gateways, services, and controllers
// ABOUTME: Chooses the hosted or in-memory backend and the LLM route from AppConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::{DataContext, ServiceContext};
use crate::config::{AppConfig, BackendKind, DeclinePolicy, LlmConfig, LlmProviderType};
use crate::controllers::{
    ChatController, HomeController, LanguageController, OnboardingController,
    SavedTasksController, SettingsController, TaskHelperController,
};
use crate::errors::{AppError, AppResult};
use crate::gateways::{
    BackendClient, BackendClientConfig, EntityGateway, InMemoryBackend, SessionGateway,
};
use crate::integrations::{FileGateway, LlmGateway, ProviderLlmGateway};
use crate::llm::{LlmProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
use crate::models::{ChatMessage, NewUser, SavedTask};
use crate::session::SessionContext;
use crate::speech::{CommandSpeech, LogSpeech, SpeechSynthesizer};

/// Everything a front-end needs to build screens
#[derive(Clone)]
pub struct AppContext {
    data: DataContext,
    services: ServiceContext,
    decline_policy: DeclinePolicy,
    history_limit: usize,
}

impl AppContext {
    /// Create a context from its parts
    #[must_use]
    pub const fn new(data: DataContext, services: ServiceContext) -> Self {
        Self {
            data,
            services,
            decline_policy: DeclinePolicy::Discard,
            history_limit: crate::constants::chat::DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Wire every gateway to one backend implementation
    #[must_use]
    pub fn with_backend<B>(
        backend: &Arc<B>,
        llm: Arc<dyn LlmGateway>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self
    where
        B: EntityGateway<ChatMessage>
            + EntityGateway<SavedTask>
            + SessionGateway
            + FileGateway
            + 'static,
    {
        let messages: Arc<dyn EntityGateway<ChatMessage>> = backend.clone();
        let tasks: Arc<dyn EntityGateway<SavedTask>> = backend.clone();
        let session_gateway: Arc<dyn SessionGateway> = backend.clone();
        let files: Arc<dyn FileGateway> = backend.clone();

        let session = Arc::new(SessionContext::new(session_gateway));
        Self::new(
            DataContext::new(messages, tasks, session),
            ServiceContext::new(llm, files, speech),
        )
    }

    /// Behaviour when a user declines a finished guide
    #[must_use]
    pub const fn with_decline_policy(mut self, policy: DeclinePolicy) -> Self {
        self.decline_policy = policy;
        self
    }

    /// Number of chat messages loaded on open
    #[must_use]
    pub const fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build the context described by `config`
    ///
    /// With the in-memory backend a local user is signed in, so every
    /// screen is usable offline.
    ///
    /// # Errors
    ///
    /// Returns configuration errors and client construction failures.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let speech = speech_from_config(config)?;

        let context = match config.backend.kind {
            BackendKind::Http => {
                let base_url = config.backend.base_url.clone().ok_or_else(|| {
                    AppError::config("The http backend needs a base URL")
                })?;
                let backend = Arc::new(BackendClient::new(BackendClientConfig {
                    base_url,
                    api_token: config.backend.api_token.clone(),
                    request_timeout: config.request_timeout,
                })?);
                let llm: Arc<dyn LlmGateway> = if config.llm.provider.is_direct() {
                    direct_llm(&config.llm, config.request_timeout)?
                } else {
                    backend.clone()
                };
                Self::with_backend(&backend, llm, speech)
            }
            BackendKind::Memory => {
                let backend = Arc::new(InMemoryBackend::new());
                backend
                    .sign_in(NewUser {
                        email: None,
                        full_name: Some("Local user".to_owned()),
                    })
                    .await?;
                if !config.llm.provider.is_direct() {
                    warn!(
                        "The in-memory backend has no LLM integration; using the {} provider at {}",
                        LlmProviderType::Local,
                        config.llm.local_base_url
                    );
                }
                let llm = direct_llm(&config.llm, config.request_timeout)?;
                Self::with_backend(&backend, llm, speech)
            }
        };

        info!(backend = %config.backend.kind, llm = %config.llm.provider, "Application context ready");
        Ok(context
            .with_decline_policy(config.decline_policy)
            .with_history_limit(config.history_limit))
    }

    /// Get the data context
    #[must_use]
    pub const fn data(&self) -> &DataContext {
        &self.data
    }

    /// Get the service context
    #[must_use]
    pub const fn services(&self) -> &ServiceContext {
        &self.services
    }

    /// Get the session context
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionContext> {
        self.data.session()
    }

    // ------------------------------------------------------------------------
    // Screen controllers
    // ------------------------------------------------------------------------

    /// Language selection screen
    #[must_use]
    pub fn language(&self) -> LanguageController {
        LanguageController::new(self.session().clone())
    }

    /// Onboarding wizard
    #[must_use]
    pub fn onboarding(&self) -> OnboardingController {
        OnboardingController::new(self.session().clone())
    }

    /// Home screen
    #[must_use]
    pub const fn home(&self) -> HomeController {
        HomeController
    }

    /// Chat screen
    #[must_use]
    pub fn chat(&self) -> ChatController {
        ChatController::new(
            self.data.messages().clone(),
            self.services.llm().clone(),
            self.services.files().clone(),
            self.session().clone(),
        )
        .with_history_limit(self.history_limit)
    }

    /// Task Helper screen
    #[must_use]
    pub fn task_helper(&self) -> TaskHelperController {
        TaskHelperController::new(
            self.data.tasks().clone(),
            self.data.messages().clone(),
            self.services.llm().clone(),
            self.session().clone(),
            self.services.speech().clone(),
        )
        .with_decline_policy(self.decline_policy)
    }

    /// Saved tasks screen
    #[must_use]
    pub fn saved_tasks(&self) -> SavedTasksController {
        SavedTasksController::new(self.data.tasks().clone())
    }

    /// Settings screen
    #[must_use]
    pub fn settings(&self) -> SettingsController {
        SettingsController::new(self.session().clone())
    }
}

/// LLM gateway that calls a provider directly instead of the backend integration
fn direct_llm(llm: &LlmConfig, timeout: Duration) -> AppResult<Arc<dyn LlmGateway>> {
    let model = llm.model_or_default();
    let config = match llm.provider {
        LlmProviderType::Groq => {
            let key = llm
                .groq_api_key
                .clone()
                .ok_or_else(|| AppError::config("Groq requires an API key"))?;
            OpenAiCompatibleConfig::groq(key, model)
        }
        LlmProviderType::OpenAi => {
            let key = llm
                .openai_api_key
                .clone()
                .ok_or_else(|| AppError::config("OpenAI requires an API key"))?;
            OpenAiCompatibleConfig::openai(key, model)
        }
        LlmProviderType::Local | LlmProviderType::Backend => {
            OpenAiCompatibleConfig::local(&llm.local_base_url, llm.local_api_key.clone(), model)
        }
    }
    .with_request_timeout(timeout);

    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatibleProvider::new(config)?);
    info!("Using {} for assistant replies", provider.display_name());
    Ok(Arc::new(ProviderLlmGateway::new(provider, llm.model.clone())))
}

fn speech_from_config(config: &AppConfig) -> AppResult<Arc<dyn SpeechSynthesizer>> {
    let speech: Arc<dyn SpeechSynthesizer> = match config.speech_command.as_deref() {
        Some(command) => Arc::new(CommandSpeech::parse(command)?),
        None => Arc::new(LogSpeech),
    };
    Ok(speech)
}
