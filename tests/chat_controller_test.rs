// ABOUTME: Integration tests for the chat controller over the in-memory backend
// ABOUTME: Covers message persistence order, apologies on failure, files, and launch prompts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::Harness;
use stepwise::constants::messages::{APOLOGY_MESSAGE, UPLOADED_FILE_MESSAGE};
use stepwise::controllers::SendOutcome;
use stepwise::errors::ErrorCode;
use stepwise::gateways::{EntityGateway, SortKey};
use stepwise::input::{FileUpload, UserInput};
use stepwise::models::{ChatMessage, InputType, UserPatch};
use stepwise::navigation::{ChatLaunch, Route, TaskHelperLaunch};
use tokio_util::sync::CancellationToken;

async fn stored_messages(harness: &Harness) -> Vec<ChatMessage> {
    let mut messages = EntityGateway::<ChatMessage>::list(
        harness.backend.as_ref(),
        &SortKey::newest_first(),
        None,
    )
    .await
    .unwrap();
    messages.reverse();
    messages
}

// ============================================================================
// Sending
// ============================================================================

#[tokio::test]
async fn test_send_appends_user_then_assistant() {
    let harness = Harness::ready().await;
    harness.llm.reply_text("Open Settings and tap Wi-Fi.");
    let chat = harness.chat();

    let outcome = chat
        .send("How do I connect to WiFi?", InputType::Text, None)
        .await;

    let SendOutcome::Answered { user, reply } = outcome else {
        panic!("expected an answer, got {outcome:?}");
    };
    assert!(user.is_user);
    assert_eq!(user.message, "How do I connect to WiFi?");
    assert!(!reply.is_user);
    assert_eq!(reply.message, "Open Settings and tap Wi-Fi.");
    assert!(!reply.suggested_task_helper);

    let local = chat.messages().await;
    assert_eq!(local.len(), 2);
    assert_eq!(local[0].id, user.id);
    assert_eq!(local[1].id, reply.id);
    assert_eq!(stored_messages(&harness).await, local);
}

#[tokio::test]
async fn test_blank_send_is_a_no_op() {
    let harness = Harness::ready().await;
    let chat = harness.chat();

    let outcome = chat.send("   \n", InputType::Text, None).await;

    assert!(matches!(outcome, SendOutcome::Skipped));
    assert!(chat.messages().await.is_empty());
    assert_eq!(harness.llm.request_count(), 0);
    assert!(harness.messages.creates().is_empty());
}

#[tokio::test]
async fn test_message_is_stored_as_typed() {
    let harness = Harness::ready().await;
    harness.llm.reply_text("Swipe down from the top.");
    let chat = harness.chat();

    let outcome = chat
        .send("  flashlight?\n", InputType::Text, None)
        .await;

    let SendOutcome::Answered { user, .. } = outcome else {
        panic!("expected an answer, got {outcome:?}");
    };
    assert_eq!(user.message, "  flashlight?\n");
    assert!(harness.llm.requests()[0].prompt.contains("  flashlight?\n"));
}

#[tokio::test]
async fn test_prompt_carries_language_and_message() {
    let harness = Harness::ready().await;
    harness.session.update(UserPatch::language("es")).await.unwrap();
    harness.llm.reply_text("Abre Ajustes.");
    let chat = harness.chat();

    chat.send("¿Cómo me conecto al WiFi?", InputType::Voice, None)
        .await;

    let requests = harness.llm.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("User's preferred language: es"));
    assert!(requests[0].prompt.contains("¿Cómo me conecto al WiFi?"));
    assert!(requests[0].file_urls.is_empty());
    assert!(requests[0].response_json_schema.is_none());

    let drafts = harness.messages.creates();
    assert_eq!(drafts[0]["input_type"], "voice");
    assert_eq!(drafts[0]["language"], "es");
    assert_eq!(drafts[1]["language"], "es");
}

#[tokio::test]
async fn test_task_helper_suggestion_is_flagged() {
    let harness = Harness::ready().await;
    harness
        .llm
        .reply_text("Let's do this step-by-step. First, open Settings.");
    let chat = harness.chat();

    let outcome = chat.send("Help me send a photo", InputType::Text, None).await;

    let reply = outcome.assistant_message().unwrap();
    assert!(reply.suggested_task_helper);
    assert_eq!(
        chat.start_task_helper(),
        Route::TaskHelper(TaskHelperLaunch::create())
    );
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_llm_failure_appends_one_apology() {
    let harness = Harness::ready().await;
    harness.llm.fail();
    let chat = harness.chat();

    let outcome = chat.send("Why is my phone slow?", InputType::Text, None).await;

    let SendOutcome::Apologized {
        user,
        apology,
        error,
    } = outcome
    else {
        panic!("expected an apology");
    };
    assert!(user.is_some());
    assert_eq!(apology.message, APOLOGY_MESSAGE);
    assert!(!apology.is_user);
    assert_eq!(error.code, ErrorCode::ExternalServiceError);

    let local = chat.messages().await;
    assert_eq!(local.len(), 2);
    assert!(local[0].is_user);
    assert_eq!(local[1].message, APOLOGY_MESSAGE);
    assert_eq!(
        local.iter().filter(|m| m.message == APOLOGY_MESSAGE).count(),
        1
    );
}

#[tokio::test]
async fn test_empty_model_output_is_a_failure() {
    let harness = Harness::ready().await;
    harness
        .llm
        .reply_output(stepwise::integrations::LlmOutput::Empty);
    let chat = harness.chat();

    let outcome = chat.send("Hello?", InputType::Text, None).await;

    assert!(matches!(outcome, SendOutcome::Apologized { .. }));
    assert_eq!(chat.messages().await.last().unwrap().message, APOLOGY_MESSAGE);
}

#[tokio::test]
async fn test_user_message_store_failure_skips_llm() {
    let harness = Harness::ready().await;
    harness.messages.fail_create_call(0);
    let chat = harness.chat();

    let outcome = chat.send("Make text bigger", InputType::Text, None).await;

    let SendOutcome::Apologized { user, .. } = outcome else {
        panic!("expected an apology");
    };
    assert!(user.is_none());
    assert_eq!(harness.llm.request_count(), 0);
    let local = chat.messages().await;
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].message, APOLOGY_MESSAGE);
}

#[tokio::test]
async fn test_apology_is_shown_even_when_it_cannot_be_stored() {
    let harness = Harness::ready().await;
    harness.llm.reply_text("Sure, here's the answer");
    // user message stored, reply rejected, apology rejected
    harness.messages.fail_create_call(1);
    harness.messages.fail_create_call(2);
    let chat = harness.chat();

    let outcome = chat.send("Update my apps", InputType::Text, None).await;

    let SendOutcome::Apologized { apology, .. } = outcome else {
        panic!("expected an apology");
    };
    assert!(apology.id.starts_with("local-"));
    let local = chat.messages().await;
    assert_eq!(local.len(), 2);
    assert_eq!(local[1].message, APOLOGY_MESSAGE);
    assert_eq!(stored_messages(&harness).await.len(), 1);
}

// ============================================================================
// Files
// ============================================================================

#[tokio::test]
async fn test_file_message_is_uploaded_and_attached() {
    let harness = Harness::ready().await;
    harness.llm.reply_text("That is the Wi-Fi settings screen.");
    let chat = harness.chat();

    let outcome = chat
        .submit(UserInput::File(FileUpload::new(
            "screenshot.png",
            vec![0x89, 0x50, 0x4e, 0x47],
        )))
        .await
        .unwrap();

    let SendOutcome::Answered { user, .. } = outcome else {
        panic!("expected an answer");
    };
    assert_eq!(user.input_type, InputType::File);
    assert_eq!(user.message, UPLOADED_FILE_MESSAGE);
    let file_url = user.file_url.clone().unwrap();
    assert!(harness.backend.file(&file_url).is_some());

    let request = &harness.llm.requests()[0];
    assert_eq!(request.file_urls, vec![file_url.clone()]);
    assert!(request.prompt.contains(&file_url));
    assert!(!request.prompt.contains(UPLOADED_FILE_MESSAGE));
}

#[tokio::test]
async fn test_unsupported_file_is_rejected_before_upload() {
    let harness = Harness::ready().await;
    let chat = harness.chat();

    let error = chat
        .submit(UserInput::File(FileUpload::new("notes.txt", b"hello".to_vec())))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidInput);
    assert_eq!(harness.backend.file_count(), 0);
    assert!(chat.messages().await.is_empty());
}

#[tokio::test]
async fn test_any_image_or_pdf_is_accepted() {
    let cases = [
        ("scan.bmp", true),
        ("scan.tiff", true),
        ("logo.svg", true),
        ("photo.avif", true),
        ("statement.pdf", true),
        ("notes.txt", false),
        ("setup.exe", false),
        ("no_extension", false),
    ];

    for (file_name, accepted) in cases {
        let harness = Harness::ready().await;
        harness.llm.reply_text("Got it.");
        let chat = harness.chat();

        let result = chat
            .submit(UserInput::File(FileUpload::new(file_name, vec![1, 2, 3])))
            .await;

        if accepted {
            let outcome = result.unwrap();
            assert!(
                matches!(outcome, SendOutcome::Answered { .. }),
                "{file_name}: {outcome:?}"
            );
            assert_eq!(harness.backend.file_count(), 1, "{file_name}");
        } else {
            assert_eq!(result.unwrap_err().code, ErrorCode::InvalidInput, "{file_name}");
            assert_eq!(harness.backend.file_count(), 0, "{file_name}");
        }
    }
}

#[tokio::test]
async fn test_upload_failure_becomes_apology() {
    let harness = Harness::ready().await;
    harness.files.fail(true);
    let chat = harness.chat();

    let outcome = chat
        .send_file(FileUpload::new("photo.jpg", vec![0xff, 0xd8]))
        .await
        .unwrap();

    assert!(matches!(outcome, SendOutcome::Apologized { user: None, .. }));
    assert_eq!(harness.llm.request_count(), 0);
    assert_eq!(chat.messages().await.len(), 1);
}

#[tokio::test]
async fn test_file_from_disk_keeps_its_name_and_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bill.PDF");
    std::fs::write(&path, b"%PDF-1.7").unwrap();

    let upload = FileUpload::from_path(&path).await.unwrap();

    assert_eq!(upload.file_name, "Bill.PDF");
    assert_eq!(upload.content_type, "application/pdf");
    assert!(upload.validate().is_ok());

    let missing = FileUpload::from_path(&dir.path().join("gone.png"))
        .await
        .unwrap_err();
    assert_eq!(missing.code, ErrorCode::InvalidInput);
}

// ============================================================================
// History and launch
// ============================================================================

#[tokio::test]
async fn test_history_loads_oldest_first_within_limit() {
    let harness = Harness::ready().await;
    for n in 0..5 {
        harness.seed_question(&format!("question {n}")).await;
    }
    let chat = harness.chat().with_history_limit(3);

    let history = chat.load_history().await.unwrap();

    let texts: Vec<&str> = history.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(texts, vec!["question 2", "question 3", "question 4"]);
}

#[tokio::test]
async fn test_open_applies_input_and_sends_prompt() {
    let harness = Harness::ready().await;
    harness.seed_question("earlier question").await;
    harness.llm.reply_text("Here is how.");
    let chat = harness.chat();

    let launch = ChatLaunch {
        input: Some(InputType::Voice),
        prompt: Some("I still need help with this task.".to_owned()),
    };
    let outcome = chat.open(launch, &CancellationToken::new()).await.unwrap();

    assert!(matches!(outcome, Some(SendOutcome::Answered { .. })));
    assert_eq!(chat.input_method().await, InputType::Voice);
    let texts: Vec<String> = chat
        .messages()
        .await
        .into_iter()
        .map(|m| m.message)
        .collect();
    assert_eq!(
        texts,
        vec![
            "earlier question".to_owned(),
            "I still need help with this task.".to_owned(),
            "Here is how.".to_owned(),
        ]
    );
}

#[tokio::test]
async fn test_cancelled_open_sends_nothing() {
    let harness = Harness::ready().await;
    let chat = harness.chat();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = chat
        .open(ChatLaunch::with_prompt("hello"), &cancel)
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert_eq!(harness.llm.request_count(), 0);
    assert!(harness.messages.creates().is_empty());
}

#[tokio::test]
async fn test_concurrent_sends_keep_pairs_together() {
    let harness = Harness::ready().await;
    harness.llm.reply_text("first answer");
    harness.llm.reply_text("second answer");
    let chat = std::sync::Arc::new(harness.chat());

    let a = {
        let chat = chat.clone();
        tokio::spawn(async move { chat.send("first", InputType::Text, None).await })
    };
    let b = {
        let chat = chat.clone();
        tokio::spawn(async move { chat.send("second", InputType::Text, None).await })
    };
    a.await.unwrap();
    b.await.unwrap();

    let local = chat.messages().await;
    assert_eq!(local.len(), 4);
    for pair in local.chunks(2) {
        assert!(pair[0].is_user);
        assert!(!pair[1].is_user);
    }
}
