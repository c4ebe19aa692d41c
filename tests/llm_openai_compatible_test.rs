// ABOUTME: Tests for the OpenAI-compatible LLM provider and the InvokeLLM gateway built on it
// ABOUTME: Uses a one-shot local HTTP stub to check request shape, replies, and error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use stepwise::errors::ErrorCode;
use stepwise::integrations::{InvokeLlmRequest, LlmGateway, LlmOutput, ProviderLlmGateway};
use stepwise::llm::{
    ChatMessage as LlmMessage, ChatRequest, LlmCapabilities, LlmProvider, OpenAiCompatibleConfig,
    OpenAiCompatibleProvider, DEFAULT_LOCAL_BASE_URL, DEFAULT_LOCAL_MODEL,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// =============================================================================
// Stub server
// =============================================================================

/// Serve exactly one request, returning the raw request text
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0_u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if request_complete(&raw) {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&raw).into_owned()
    });

    (base_url, handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    raw.len() >= header_end + 4 + content_length
}

fn request_body(raw: &str) -> Value {
    let (_, body) = raw.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(body).unwrap()
}

fn completion(content: &str) -> String {
    json!({
        "model": "qwen2.5:14b-instruct",
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20 }
    })
    .to_string()
}

fn provider_at(base_url: &str, api_key: Option<&str>) -> OpenAiCompatibleProvider {
    let config = OpenAiCompatibleConfig::local(base_url, api_key.map(str::to_owned), "test-model")
        .with_request_timeout(Duration::from_secs(5));
    OpenAiCompatibleProvider::new(config).unwrap()
}

// =============================================================================
// Configuration presets
// =============================================================================

#[test]
fn test_local_presets_are_named_after_the_server() {
    let ollama = OpenAiCompatibleConfig::local(DEFAULT_LOCAL_BASE_URL, None, DEFAULT_LOCAL_MODEL);
    assert_eq!(ollama.provider_name, "ollama");
    assert_eq!(ollama.display_name, "Ollama (Local)");
    assert!(ollama.api_key.is_none());

    let vllm = OpenAiCompatibleConfig::local("http://localhost:8000/v1", None, "llama");
    assert_eq!(vllm.provider_name, "vllm");

    let local_ai =
        OpenAiCompatibleConfig::local("http://localhost:8080/v1", Some(String::new()), "mistral");
    assert_eq!(local_ai.provider_name, "localai");
    assert!(local_ai.api_key.is_none());

    let other = OpenAiCompatibleConfig::local("http://gpu-box:9000/v1", Some("k".into()), "m");
    assert_eq!(other.provider_name, "local");
    assert_eq!(other.api_key.as_deref(), Some("k"));
}

#[test]
fn test_cloud_presets() {
    let groq = OpenAiCompatibleConfig::groq("gsk_test".to_owned(), "llama-3.3-70b-versatile");
    assert_eq!(groq.provider_name, "groq");
    assert!(groq.base_url.starts_with("https://api.groq.com"));
    assert!(groq.capabilities.supports_json_mode());
    assert!(!groq.capabilities.supports_vision());

    let openai = OpenAiCompatibleConfig::openai("sk-test".to_owned(), "gpt-4o-mini");
    assert_eq!(openai.provider_name, "openai");
    assert_eq!(openai.capabilities, LlmCapabilities::full_featured());
    assert!(openai.capabilities.supports_vision());
}

#[test]
fn test_default_config_points_at_ollama() {
    let config = OpenAiCompatibleConfig::default();
    assert_eq!(config.base_url, DEFAULT_LOCAL_BASE_URL);
    assert_eq!(config.default_model, DEFAULT_LOCAL_MODEL);
    assert!(config.capabilities.supports_system_messages());
}

// =============================================================================
// Provider requests
// =============================================================================

#[tokio::test]
async fn test_complete_sends_openai_request() {
    let (base_url, server) = serve_once("200 OK", completion("Open Settings.")).await;
    let provider = provider_at(&base_url, Some("secret-key"));

    let request = ChatRequest::new(vec![
        LlmMessage::system("Be brief"),
        LlmMessage::user("How do I connect to WiFi?"),
    ])
    .with_temperature(0.7);
    let response = provider.complete(&request).await.unwrap();

    assert_eq!(response.content, "Open Settings.");
    assert_eq!(response.usage.unwrap().total_tokens, 20);
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /v1/chat/completions"));
    assert!(raw.to_lowercase().contains("authorization: bearer secret-key"));
    let body = request_body(&raw);
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "How do I connect to WiFi?");
}

#[tokio::test]
async fn test_rate_limit_is_reported_with_retry_hint() {
    let body = json!({
        "error": { "message": "Rate limit reached. Please try again in 7.5s.", "type": "tokens" }
    })
    .to_string();
    let (base_url, _server) = serve_once("429 Too Many Requests", body).await;
    let provider = provider_at(&base_url, None);

    let error = provider
        .complete(&ChatRequest::new(vec![LlmMessage::user("hi")]))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalRateLimited);
    assert!(error.message.contains("8 seconds"));
}

#[tokio::test]
async fn test_unreachable_server_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let provider = provider_at(&format!("http://{addr}/v1"), None);

    let error = provider
        .complete(&ChatRequest::new(vec![LlmMessage::user("hi")]))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalServiceUnavailable);
}

// =============================================================================
// InvokeLLM over a provider
// =============================================================================

#[tokio::test]
async fn test_structured_invocation_returns_json() {
    let guide = json!({
        "title": "Connect to WiFi",
        "steps": [{ "instruction": "Open Settings", "visual_description": "", "audio_text": "" }]
    });
    let fenced = format!("```json\n{guide}\n```");
    let (base_url, server) = serve_once("200 OK", completion(&fenced)).await;
    let gateway = ProviderLlmGateway::new(Arc::new(provider_at(&base_url, None)), None);

    let output = gateway
        .invoke_llm(
            InvokeLlmRequest::text("Make a guide")
                .with_schema(json!({ "type": "object", "properties": { "title": {} } })),
        )
        .await
        .unwrap();

    assert_eq!(output, LlmOutput::Json(guide));
    let body = request_body(&server.await.unwrap());
    assert_eq!(body["response_format"]["type"], "json_object");
    assert_eq!(body["messages"][0]["role"], "system");
}

#[tokio::test]
async fn test_blank_reply_is_empty_output() {
    let (base_url, _server) = serve_once("200 OK", completion("   ")).await;
    let gateway = ProviderLlmGateway::new(
        Arc::new(provider_at(&base_url, None)),
        Some("override-model".to_owned()),
    );

    let output = gateway
        .invoke_llm(InvokeLlmRequest::text("Hello"))
        .await
        .unwrap();

    assert_eq!(output, LlmOutput::Empty);
}
