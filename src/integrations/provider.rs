// ABOUTME: LLM gateway that calls a chat-completion provider directly instead of the backend
// ABOUTME: Maps prompt, attachments, and JSON schema onto role-based chat requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{content_type_for, parse_json_reply, InvokeLlmRequest, LlmGateway, LlmOutput};
use crate::errors::AppResult;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

/// Sampling temperature for free-text chat turns
const CHAT_TEMPERATURE: f32 = 0.7;

/// Lower temperature for structured output
const STRUCTURED_TEMPERATURE: f32 = 0.2;

/// [`LlmGateway`] over any [`LlmProvider`]
pub struct ProviderLlmGateway {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
}

impl ProviderLlmGateway {
    /// Wrap a provider; `model` overrides the provider default
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, model: Option<String>) -> Self {
        Self { provider, model }
    }

    /// The wrapped provider
    #[must_use]
    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    fn build_request(&self, request: &InvokeLlmRequest) -> ChatRequest {
        let images: Vec<String> = request
            .file_urls
            .iter()
            .filter(|url| content_type_for(url).starts_with("image/"))
            .cloned()
            .collect();

        let mut messages = Vec::with_capacity(2);
        let structured = request.response_json_schema.as_ref().map(|schema| {
            format!(
                "Respond only with a single JSON object matching this JSON schema, with no other text: {schema}"
            )
        });
        if let Some(instruction) = &structured {
            messages.push(ChatMessage::system(instruction.clone()));
        }
        messages.push(ChatMessage::user(request.prompt.clone()).with_images(images));

        let mut chat = ChatRequest::new(messages);
        if let Some(model) = &self.model {
            chat = chat.with_model(model.clone());
        }
        if structured.is_some() {
            chat.with_json_response()
                .with_temperature(STRUCTURED_TEMPERATURE)
        } else {
            chat.with_temperature(CHAT_TEMPERATURE)
        }
    }
}

#[async_trait]
impl LlmGateway for ProviderLlmGateway {
    #[instrument(skip(self, request), fields(provider = self.provider.name(), structured = request.response_json_schema.is_some()))]
    async fn invoke_llm(&self, request: InvokeLlmRequest) -> AppResult<LlmOutput> {
        let chat = self.build_request(&request);
        let response = self.provider.complete(&chat).await?;
        debug!(
            "{} answered with {} chars",
            self.provider.display_name(),
            response.content.len()
        );

        if response.content.trim().is_empty() {
            return Ok(LlmOutput::Empty);
        }
        if request.response_json_schema.is_none() {
            return Ok(LlmOutput::Text(response.content));
        }

        Ok(parse_json_reply(&response.content).map_or_else(
            || {
                warn!("Structured request answered with non-JSON text");
                LlmOutput::Text(response.content.clone())
            },
            LlmOutput::Json,
        ))
    }
}
