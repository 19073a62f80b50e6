//! Chat backend wire formats against stub servers.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hearth::chat::{ChatClient, GeminiClient, OllamaClient};
use hearth::Error;

const TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn gemini_returns_reply_text_unmodified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "secret"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "PROMPT"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [
                {"text": "Done. "},
                {"text": "### ACTION: light.turn_on | light.hall"}
            ]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = GeminiClient::new(&server.uri(), "secret", "gemini-2.0-flash", TIMEOUT).unwrap();

    let reply = client.complete("PROMPT").await.unwrap();

    assert_eq!(reply, "Done. ### ACTION: light.turn_on | light.hall");
}

#[tokio::test]
async fn gemini_without_candidates_is_payload_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;
    let client = GeminiClient::new(&server.uri(), "secret", "gemini-2.0-flash", TIMEOUT).unwrap();

    let err = client.complete("PROMPT").await.unwrap_err();

    assert!(matches!(err, Error::Payload(_)));
}

#[tokio::test]
async fn gemini_error_status_is_chat_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
        .mount(&server)
        .await;
    let client = GeminiClient::new(&server.uri(), "secret", "gemini-2.0-flash", TIMEOUT).unwrap();

    let err = client.complete("PROMPT").await.unwrap_err();

    match err {
        Error::ChatStatus { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "quota");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn ollama_sends_single_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.2:3b",
            "stream": false,
            "messages": [{"role": "user", "content": "PROMPT"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "Hello from the house."},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = OllamaClient::new(&server.uri(), "llama3.2:3b", TIMEOUT).unwrap();

    assert_eq!(client.complete("PROMPT").await.unwrap(), "Hello from the house.");
}
