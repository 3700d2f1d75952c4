//! Foundry LLM Provider Layer
//!
//! Sends single prompts to remote chat-completion models and hands back the
//! raw reply text, or a typed failure.
//!
//! # Architecture
//!
//! Every provider implements [`LlmProvider`]. A call never returns `Err`:
//! the outcome lives inside [`ModelReply`] together with the model, the
//! endpoint and the number of attempts it took, because a failed call is a
//! normal "no candidate" outcome for the caller.
//!
//! # Providers
//!
//! - `MockProvider`: Scripted replies for testing, no network
//! - `ChatCompletionsProvider`: OpenAI/OpenRouter-style chat completions with
//!   retry, backoff on rate limiting and failover across endpoints
//!
//! # Examples
//!
//! ```
//! use foundry_llm::{LlmProvider, MockProvider, ModelRequest};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let provider = MockProvider::new("Title: Hello");
//! let reply = provider.complete(&ModelRequest::new("any-model", "prompt", 100)).await;
//! assert_eq!(reply.text(), Some("Title: Hello"));
//! # });
//! ```

#![warn(missing_docs)]

pub mod chat;
pub mod config;
pub mod retry;
pub mod transport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use chat::ChatCompletionsProvider;
pub use config::LlmConfig;
pub use retry::RetryPolicy;
pub use transport::{IpFamily, PinnedAddress, TransportConfig};

/// Errors that can occur during a model call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// DNS, connect, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Endpoint answered 429
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Endpoint answered with another non-2xx status
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code
        status: u16,
        /// Truncated response body
        body: String,
    },

    /// 2xx response without the expected `choices[0].message.content`
    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),

    /// Provider could not be built or has nothing to call
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Coarse classification of a failed call, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network-level failure
    Transport,
    /// Rate limiting
    RateLimited,
    /// Non-2xx response
    HttpStatus,
    /// Unexpected 2xx body
    MalformedEnvelope,
    /// Misconfiguration or anything else
    Other,
}

impl LlmError {
    /// Classify this error
    pub fn kind(&self) -> FailureKind {
        match self {
            LlmError::Transport(_) => FailureKind::Transport,
            LlmError::RateLimited => FailureKind::RateLimited,
            LlmError::HttpStatus { .. } => FailureKind::HttpStatus,
            LlmError::MalformedEnvelope(_) => FailureKind::MalformedEnvelope,
            LlmError::Config(_) | LlmError::Other(_) => FailureKind::Other,
        }
    }
}

/// One prompt for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Model identifier, e.g. `google/gemma-9b:free`
    pub model: String,

    /// Prompt sent as the single user message
    pub prompt: String,

    /// Completion token budget
    pub max_tokens: u32,

    /// Sampling temperature, provider default when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ModelRequest {
    /// Create a request without an explicit temperature
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            max_tokens,
            temperature: None,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Outcome of one provider invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    /// Model that was asked
    pub model: String,

    /// Endpoint that produced the outcome (last one tried on failure)
    pub endpoint: Option<String>,

    /// Total attempts across all endpoints
    pub attempts: u32,

    /// Raw assistant text, or the final failure
    pub outcome: Result<String, LlmError>,
}

impl ModelReply {
    /// Successful reply
    pub fn success(
        model: impl Into<String>,
        endpoint: Option<String>,
        attempts: u32,
        text: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            endpoint,
            attempts,
            outcome: Ok(text.into()),
        }
    }

    /// Failed reply
    pub fn failure(
        model: impl Into<String>,
        endpoint: Option<String>,
        attempts: u32,
        error: LlmError,
    ) -> Self {
        Self {
            model: model.into(),
            endpoint,
            attempts,
            outcome: Err(error),
        }
    }

    /// Raw text on success
    pub fn text(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    /// Failure on error
    pub fn error(&self) -> Option<&LlmError> {
        self.outcome.as_ref().err()
    }
}

/// A remote (or scripted) completion model
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one prompt and wait for the reply
    async fn complete(&self, request: &ModelRequest) -> ModelReply;
}

#[async_trait]
impl<P: LlmProvider + ?Sized> LlmProvider for Arc<P> {
    async fn complete(&self, request: &ModelRequest) -> ModelReply {
        (**self).complete(request).await
    }
}

/// Mock LLM provider for deterministic testing
///
/// Replies are looked up per model: first from a queue of scripted outcomes,
/// then from a per-model default, then from the global default. Every call
/// is recorded so tests can assert on what was asked.
///
/// # Examples
///
/// ```
/// use foundry_llm::{LlmError, LlmProvider, MockProvider, ModelRequest};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let provider = MockProvider::failing(LlmError::RateLimited);
/// provider.push_reply("primary", "first");
///
/// let first = provider.complete(&ModelRequest::new("primary", "p", 10)).await;
/// let second = provider.complete(&ModelRequest::new("primary", "p", 10)).await;
/// assert_eq!(first.text(), Some("first"));
/// assert_eq!(second.error(), Some(&LlmError::RateLimited));
/// assert_eq!(provider.call_count(), 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug)]
struct MockState {
    default_outcome: Result<String, LlmError>,
    model_defaults: HashMap<String, Result<String, LlmError>>,
    scripted: HashMap<String, VecDeque<Result<String, LlmError>>>,
    calls: Vec<ModelRequest>,
}

impl MockProvider {
    /// Create a MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_default(Ok(response.into()))
    }

    /// Create a MockProvider that fails every unscripted call
    pub fn failing(error: LlmError) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default_outcome: Result<String, LlmError>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                default_outcome,
                model_defaults: HashMap::new(),
                scripted: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// Queue a reply for the next call to `model`
    pub fn push_reply(&self, model: impl Into<String>, response: impl Into<String>) {
        self.push_outcome(model, Ok(response.into()));
    }

    /// Queue a failure for the next call to `model`
    pub fn push_failure(&self, model: impl Into<String>, error: LlmError) {
        self.push_outcome(model, Err(error));
    }

    fn push_outcome(&self, model: impl Into<String>, outcome: Result<String, LlmError>) {
        self.lock()
            .scripted
            .entry(model.into())
            .or_default()
            .push_back(outcome);
    }

    /// Answer every unscripted call to `model` with `response`
    pub fn set_model_reply(&self, model: impl Into<String>, response: impl Into<String>) {
        self.lock()
            .model_defaults
            .insert(model.into(), Ok(response.into()));
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of calls made to `model`
    pub fn calls_for(&self, model: &str) -> usize {
        self.lock().calls.iter().filter(|r| r.model == model).count()
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.lock().calls.clone()
    }

    /// Forget recorded calls
    pub fn reset_call_count(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: &ModelRequest) -> ModelReply {
        let mut state = self.lock();
        state.calls.push(request.clone());

        let scripted = state
            .scripted
            .get_mut(&request.model)
            .and_then(VecDeque::pop_front);
        let outcome = match scripted {
            Some(outcome) => outcome,
            None => state
                .model_defaults
                .get(&request.model)
                .unwrap_or(&state.default_outcome)
                .clone(),
        };

        ModelReply {
            model: request.model.clone(),
            endpoint: Some("mock".to_string()),
            attempts: 1,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(model: &str) -> ModelRequest {
        ModelRequest::new(model, "prompt", 100)
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let reply = provider.complete(&request("m")).await;
        assert_eq!(reply.text(), Some("Test response"));
        assert_eq!(reply.attempts, 1);
    }

    #[tokio::test]
    async fn test_mock_provider_scripted_then_default() {
        let provider = MockProvider::default();
        provider.push_reply("a", "first");
        provider.push_failure("a", LlmError::RateLimited);

        assert_eq!(provider.complete(&request("a")).await.text(), Some("first"));
        assert_eq!(
            provider.complete(&request("a")).await.error(),
            Some(&LlmError::RateLimited)
        );
        assert_eq!(
            provider.complete(&request("a")).await.text(),
            Some("Default mock response")
        );
    }

    #[tokio::test]
    async fn test_mock_provider_model_defaults() {
        let provider = MockProvider::failing(LlmError::Other("down".into()));
        provider.set_model_reply("fallback", "ok");

        assert!(provider.complete(&request("primary")).await.error().is_some());
        assert_eq!(provider.complete(&request("fallback")).await.text(), Some("ok"));
        assert_eq!(provider.calls_for("primary"), 1);
        assert_eq!(provider.calls_for("fallback"), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete(&request("m")).await;

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);

        provider2.reset_call_count();
        assert_eq!(provider1.call_count(), 0);
    }

    #[tokio::test]
    async fn test_arc_provider_delegates() {
        let provider: Arc<dyn LlmProvider> = Arc::new(MockProvider::new("shared"));
        assert_eq!(provider.complete(&request("m")).await.text(), Some("shared"));
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(LlmError::RateLimited.kind(), FailureKind::RateLimited);
        let status = LlmError::HttpStatus {
            status: 500,
            body: String::new(),
        };
        assert_eq!(status.kind(), FailureKind::HttpStatus);
        assert_eq!(
            LlmError::MalformedEnvelope("x".into()).kind(),
            FailureKind::MalformedEnvelope
        );
        assert_eq!(LlmError::Transport("dns".into()).kind(), FailureKind::Transport);
    }

    #[test]
    fn test_request_temperature_skipped_when_unset() {
        let json = serde_json::to_value(ModelRequest::new("m", "p", 5)).unwrap();
        assert!(json.get("temperature").is_none());
    }
}
