//! Integration tests for the chat-completions provider
//!
//! Each test starts a local axum server that answers with a scripted
//! sequence of status codes and bodies.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use foundry_llm::{ChatCompletionsProvider, LlmError, LlmProvider, ModelRequest, RetryPolicy};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const OK_BODY: &str =
    r#"{"choices":[{"message":{"role":"assistant","content":"Title: Vision QA"}}]}"#;

#[derive(Clone, Default)]
struct Script {
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
    requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

impl Script {
    fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn handler(
    State(script): State<Script>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    script.requests.lock().unwrap().push((headers, body));
    let (status, body) = script
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((500, "script exhausted".to_string()));
    (StatusCode::from_u16(status).unwrap(), body)
}

/// Start a scripted endpoint and return its URL
async fn spawn_endpoint(responses: &[(u16, &str)]) -> (String, Script) {
    let script = Script::default();
    script
        .responses
        .lock()
        .unwrap()
        .extend(responses.iter().map(|(s, b)| (*s, b.to_string())));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/api/v1/chat/completions", post(handler))
        .with_state(script.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api/v1/chat/completions", addr), script)
}

fn provider(endpoints: Vec<String>, attempts: u32) -> ChatCompletionsProvider {
    ChatCompletionsProvider::new(endpoints, "test-key")
        .unwrap()
        .with_retry_policy(RetryPolicy::immediate(attempts))
}

fn request() -> ModelRequest {
    ModelRequest::new("google/gemma-9b:free", "Extract the use case", 600)
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let (url, script) = spawn_endpoint(&[(200, OK_BODY)]).await;
    let provider = provider(vec![url.clone()], 3).with_app_identity("https://example.com", "Tests");

    let reply = provider.complete(&request()).await;

    assert_eq!(reply.text(), Some("Title: Vision QA"));
    assert_eq!(reply.attempts, 1);
    assert_eq!(reply.endpoint.as_deref(), Some(url.as_str()));
    assert_eq!(reply.model, "google/gemma-9b:free");

    let requests = script.requests.lock().unwrap();
    let (headers, body) = &requests[0];
    assert_eq!(headers["authorization"], "Bearer test-key");
    assert_eq!(headers["x-title"], "Tests");
    assert_eq!(body["model"], "google/gemma-9b:free");
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "Extract the use case");
    assert_eq!(body["max_tokens"], 600);
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let (url, script) = spawn_endpoint(&[(429, "slow down"), (200, OK_BODY)]).await;

    let reply = provider(vec![url], 3).complete(&request()).await;

    assert_eq!(reply.text(), Some("Title: Vision QA"));
    assert_eq!(reply.attempts, 2);
    assert_eq!(script.hits(), 2);
}

#[tokio::test]
async fn test_rate_limited_on_every_attempt() {
    let (url, script) = spawn_endpoint(&[(429, ""), (429, ""), (429, ""), (429, "")]).await;

    let reply = provider(vec![url], 3).complete(&request()).await;

    assert_eq!(reply.error(), Some(&LlmError::RateLimited));
    assert_eq!(reply.attempts, 3);
    assert_eq!(script.hits(), 3);
}

#[tokio::test]
async fn test_failover_to_second_endpoint() {
    let (primary, primary_script) = spawn_endpoint(&[(429, ""), (429, "")]).await;
    let (secondary, secondary_script) = spawn_endpoint(&[(200, OK_BODY)]).await;

    let reply = provider(vec![primary, secondary.clone()], 2)
        .complete(&request())
        .await;

    assert_eq!(reply.text(), Some("Title: Vision QA"));
    assert_eq!(reply.endpoint.as_deref(), Some(secondary.as_str()));
    assert_eq!(reply.attempts, 3);
    assert_eq!(primary_script.hits(), 2);
    assert_eq!(secondary_script.hits(), 1);
}

#[tokio::test]
async fn test_failover_from_unreachable_endpoint() {
    let (live, _script) = spawn_endpoint(&[(200, OK_BODY)]).await;

    let reply = provider(vec!["http://127.0.0.1:9/v1".to_string(), live], 2)
        .complete(&request())
        .await;

    assert_eq!(reply.text(), Some("Title: Vision QA"));
    assert_eq!(reply.attempts, 3);
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let (url, script) = spawn_endpoint(&[(500, "boom"), (200, OK_BODY)]).await;

    let reply = provider(vec![url], 2).complete(&request()).await;

    assert!(reply.text().is_some());
    assert_eq!(script.hits(), 2);
}

#[tokio::test]
async fn test_server_error_exhausts_attempts() {
    let (url, _script) = spawn_endpoint(&[(503, "unavailable"), (503, "unavailable")]).await;

    let reply = provider(vec![url], 2).complete(&request()).await;

    match reply.error() {
        Some(LlmError::HttpStatus { status, body }) => {
            assert_eq!(*status, 503);
            assert_eq!(body, "unavailable");
        }
        other => panic!("Expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_envelope_is_not_retried() {
    let (url, script) =
        spawn_endpoint(&[(200, r#"{"id":"x","choices":[]}"#), (200, OK_BODY)]).await;

    let reply = provider(vec![url], 3).complete(&request()).await;

    assert!(matches!(reply.error(), Some(LlmError::MalformedEnvelope(_))));
    assert_eq!(script.hits(), 1);
}

#[tokio::test]
async fn test_backoff_waits_between_rate_limited_attempts() {
    let (url, _script) = spawn_endpoint(&[(429, ""), (429, ""), (200, OK_BODY)]).await;
    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay_ms: 40,
        multiplier: 2.0,
        max_delay_ms: 1_000,
    };
    let provider = ChatCompletionsProvider::new(vec![url], "k")
        .unwrap()
        .with_retry_policy(policy);

    let started = Instant::now();
    let reply = provider.complete(&request()).await;

    assert!(reply.text().is_some());
    // 40ms after the first 429, 80ms after the second
    assert!(started.elapsed() >= Duration::from_millis(120));
}

#[tokio::test]
async fn test_temperature_is_forwarded() {
    let (url, script) = spawn_endpoint(&[(200, OK_BODY)]).await;

    provider(vec![url], 2)
        .complete(&request().with_temperature(Some(0.2)))
        .await;

    let requests = script.requests.lock().unwrap();
    let temperature = requests[0].1["temperature"].as_f64().unwrap();
    assert!((temperature - 0.2).abs() < 1e-6);
}
