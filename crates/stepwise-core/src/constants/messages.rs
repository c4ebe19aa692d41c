// ABOUTME: User-facing messages and canned prompts
// ABOUTME: Shared between controllers so tests and front-ends agree on exact wording
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

/// Assistant reply inserted when a chat exchange fails
pub const APOLOGY_MESSAGE: &str = "I'm sorry, I encountered an error. Please try again.";

/// Stored text for a user message that only carries a file
pub const UPLOADED_FILE_MESSAGE: &str = "Uploaded file";

/// Chat prompt used when the user says a guide did not help
pub const STILL_NEED_HELP_PROMPT: &str = "I still need help with this task.";

/// Error shown when the Task Helper cannot load or generate a guide
pub const TASK_LOAD_ERROR: &str = "Could not load the task. Please try again.";

/// Greeting shown on an empty chat
pub const CHAT_EMPTY_STATE: &str =
    "Hi! I'm here to help you with your phone. What would you like to learn today?";

/// Questions offered on the home screen
pub const SUGGESTED_PROMPTS: &[&str] = &[
    "How do I turn on Do Not Disturb?",
    "Help me send a photo to my family",
    "How do I make text bigger on my phone?",
    "Show me how to update my apps",
    "How do I connect to WiFi?",
    "Help me backup my photos",
];

/// One page of the onboarding wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnboardingPage {
    /// Page heading
    pub title: &'static str,
    /// Explanation shown under the heading
    pub description: &'static str,
    /// Emoji illustration
    pub visual: &'static str,
}

/// Onboarding pages in order
pub const ONBOARDING_PAGES: &[OnboardingPage] = &[
    OnboardingPage {
        title: "Ask Me Anything",
        description: "Type or speak your question naturally. No need to learn special commands - just ask like you would a friend.",
        visual: "💬",
    },
    OnboardingPage {
        title: "Show Me What You See",
        description: "Take a screenshot or upload a photo of your screen. I'll help you understand what you're looking at.",
        visual: "📱",
    },
    OnboardingPage {
        title: "Step-by-Step Guidance",
        description: "When you need detailed help, I'll guide you through each step with clear instructions and visuals.",
        visual: "✨",
    },
];
