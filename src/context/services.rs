// ABOUTME: Service context for dependency injection of the LLM, upload, and speech services
// ABOUTME: Groups the integrations the chat and Task Helper controllers call out to
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

use std::sync::Arc;

use crate::integrations::{FileGateway, LlmGateway};
use crate::speech::SpeechSynthesizer;

/// Service context containing integration dependencies
#[derive(Clone)]
pub struct ServiceContext {
    llm: Arc<dyn LlmGateway>,
    files: Arc<dyn FileGateway>,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl ServiceContext {
    /// Create new service context
    #[must_use]
    pub fn new(
        llm: Arc<dyn LlmGateway>,
        files: Arc<dyn FileGateway>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self { llm, files, speech }
    }

    /// Get the LLM integration
    #[must_use]
    pub const fn llm(&self) -> &Arc<dyn LlmGateway> {
        &self.llm
    }

    /// Get the upload integration
    #[must_use]
    pub const fn files(&self) -> &Arc<dyn FileGateway> {
        &self.files
    }

    /// Get the speech synthesizer
    #[must_use]
    pub const fn speech(&self) -> &Arc<dyn SpeechSynthesizer> {
        &self.speech
    }
}
