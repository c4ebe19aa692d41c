// ABOUTME: Prompt templates for the assistant chat and the step-by-step guide generator
// ABOUTME: Templates are loaded at compile time and filled with language, message, and schema
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Prompts
//!
//! Templates live next to this module as markdown files for easy maintenance.

use serde_json::Value;

/// Assistant chat template (`{language}`, `{message}`)
pub const ASSISTANT_CHAT_TEMPLATE: &str = include_str!("assistant_chat.md");

/// Guide generation template (`{schema}`, `{response}`)
pub const TASK_GUIDE_TEMPLATE: &str = include_str!("task_guide.md");

/// Closing instruction that nudges multi-step questions towards the Task Helper
pub const TASK_HELPER_HINT: &str = "If the user's question involves multiple steps or a complex process, suggest that they might want to use the \"Task Helper Mode\" for step-by-step guidance.";

/// Build the prompt for one chat turn
#[must_use]
pub fn chat_prompt(language: &str, message: &str, file_url: Option<&str>) -> String {
    // The message goes in last so user text is never re-scanned for placeholders
    let mut prompt = ASSISTANT_CHAT_TEMPLATE
        .trim_end()
        .replace("{language}", language)
        .replace("{message}", message);

    if let Some(url) = file_url {
        prompt.push_str("\n\nUser has uploaded a file: ");
        prompt.push_str(url);
    }

    prompt.push_str("\n\n");
    prompt.push_str(TASK_HELPER_HINT);
    prompt
}

/// Build the prompt that turns the latest assistant reply into a guide
#[must_use]
pub fn task_guide_prompt(schema: &Value, assistant_response: &str) -> String {
    TASK_GUIDE_TEMPLATE
        .trim_end()
        .replace("{schema}", &schema.to_string())
        .replace("{response}", assistant_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_prompt_embeds_language_message_and_file() {
        let prompt = chat_prompt(
            "es",
            "¿Cómo hago una captura?",
            Some("https://files.example.com/shot.png"),
        );
        assert!(prompt.contains("User's preferred language: es"));
        assert!(prompt.contains("User's message: ¿Cómo hago una captura?"));
        assert!(prompt.contains("User has uploaded a file: https://files.example.com/shot.png"));
        assert!(prompt.ends_with(TASK_HELPER_HINT));
    }

    #[test]
    fn test_placeholders_in_user_text_are_left_alone() {
        let prompt = chat_prompt("en", "what does {language} mean?", None);
        assert!(prompt.contains("what does {language} mean?"));
        assert!(!prompt.contains("uploaded a file"));
    }

    #[test]
    fn test_task_guide_prompt_embeds_schema() {
        let schema = json!({ "type": "object" });
        let prompt = task_guide_prompt(&schema, "Open Settings, then tap WiFi.");
        assert!(prompt.contains(r#"schema: {"type":"object"}"#));
        assert!(prompt.contains("AI Response: \"Open Settings, then tap WiFi.\""));
    }
}
