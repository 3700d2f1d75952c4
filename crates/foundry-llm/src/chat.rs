//! Chat-completions provider
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint (OpenRouter by
//! default).
//!
//! # Features
//!
//! - Ordered endpoint list with failover
//! - Bounded attempts per endpoint
//! - Capped exponential backoff on HTTP 429
//! - Per-provider transport options (timeout, IP family, pinned addresses)
//!
//! # Examples
//!
//! ```no_run
//! use foundry_llm::{ChatCompletionsProvider, LlmConfig, LlmProvider, ModelRequest};
//!
//! # async fn example() -> Result<(), foundry_llm::LlmError> {
//! let provider = ChatCompletionsProvider::from_config(&LlmConfig::default(), "sk-or-...")?;
//! let reply = provider
//!     .complete(&ModelRequest::new("google/gemma-9b:free", "Say hello", 50))
//!     .await;
//! println!("{:?}", reply.text());
//! # Ok(())
//! # }
//! ```

use crate::config::LlmConfig;
use crate::retry::RetryPolicy;
use crate::transport::TransportConfig;
use crate::{LlmError, LlmProvider, ModelReply, ModelRequest};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Maximum characters of a response body kept for diagnostics
const BODY_SNIPPET_CHARS: usize = 200;

/// Chat-completions provider with retry and endpoint failover
pub struct ChatCompletionsProvider {
    endpoints: Vec<String>,
    api_key: String,
    client: reqwest::Client,
    retry: RetryPolicy,
    app_referer: Option<String>,
    app_title: Option<String>,
}

/// Request body for the chat-completions API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response envelope; every level optional so shape errors stay typed
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl ChatCompletionsProvider {
    /// Create a provider for the given endpoints with default retry and transport
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` when no endpoint is given or the HTTP
    /// client cannot be built.
    pub fn new(endpoints: Vec<String>, api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::build(
            endpoints,
            api_key.into(),
            RetryPolicy::default(),
            &TransportConfig::default(),
        )
    }

    /// Create a provider from configuration
    pub fn from_config(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        config.validate().map_err(LlmError::Config)?;
        let provider = Self::build(
            config.endpoints.clone(),
            api_key.into(),
            config.retry.clone(),
            &config.transport,
        )?;
        Ok(Self {
            app_referer: config.app_referer.clone(),
            app_title: config.app_title.clone(),
            ..provider
        })
    }

    fn build(
        endpoints: Vec<String>,
        api_key: String,
        retry: RetryPolicy,
        transport: &TransportConfig,
    ) -> Result<Self, LlmError> {
        if endpoints.is_empty() {
            return Err(LlmError::Config("no endpoints configured".to_string()));
        }
        Ok(Self {
            endpoints,
            api_key,
            client: transport.build_client()?,
            retry,
            app_referer: None,
            app_title: None,
        })
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the attribution headers sent with every request
    pub fn with_app_identity(
        mut self,
        referer: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        self.app_referer = Some(referer.into());
        self.app_title = Some(title.into());
        self
    }

    /// Configured endpoints, in failover order
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// One HTTP round trip against one endpoint
    async fn send_once(&self, endpoint: &str, body: &ChatRequest<'_>) -> Result<String, LlmError> {
        let mut request = self
            .client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(body);
        if let Some(referer) = &self.app_referer {
            request = request.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.app_title {
            request = request.header("X-Title", title);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                body: snippet(&text),
            });
        }

        extract_content(&text)
    }
}

/// Pull `choices[0].message.content` out of a 2xx body
pub(crate) fn extract_content(body: &str) -> Result<String, LlmError> {
    let envelope: ChatResponse = serde_json::from_str(body).map_err(|e| {
        LlmError::MalformedEnvelope(format!("{} - {}", e, snippet(body)))
    })?;

    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| {
            LlmError::MalformedEnvelope(format!(
                "missing choices[0].message.content - {}",
                snippet(body)
            ))
        })
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    async fn complete(&self, request: &ModelRequest) -> ModelReply {
        let body = ChatRequest {
            model: &request.model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let max_attempts = self.retry.attempts();
        let mut total_attempts = 0;
        let mut last_error = None;
        let mut last_endpoint = None;

        for endpoint in &self.endpoints {
            last_endpoint = Some(endpoint.clone());

            for attempt in 0..max_attempts {
                total_attempts += 1;
                debug!(
                    model = %request.model,
                    endpoint = %endpoint,
                    attempt = attempt + 1,
                    "Sending completion request"
                );

                match self.send_once(endpoint, &body).await {
                    Ok(text) => {
                        return ModelReply::success(
                            &request.model,
                            last_endpoint,
                            total_attempts,
                            text,
                        );
                    }
                    Err(e @ LlmError::MalformedEnvelope(_)) => {
                        warn!(model = %request.model, endpoint = %endpoint, "{}", e);
                        return ModelReply::failure(
                            &request.model,
                            last_endpoint,
                            total_attempts,
                            e,
                        );
                    }
                    Err(e) => {
                        warn!(
                            model = %request.model,
                            endpoint = %endpoint,
                            attempt = attempt + 1,
                            max_attempts,
                            "Completion attempt failed: {}",
                            e
                        );
                        if attempt + 1 < max_attempts {
                            let delay = match e {
                                LlmError::RateLimited => self.retry.delay_for(attempt),
                                _ => self.retry.retry_delay(),
                            };
                            tokio::time::sleep(delay).await;
                        }
                        last_error = Some(e);
                    }
                }
            }

            warn!(endpoint = %endpoint, "Endpoint exhausted after {} attempts", max_attempts);
        }

        ModelReply::failure(
            &request.model,
            last_endpoint,
            total_attempts,
            last_error.unwrap_or_else(|| LlmError::Config("no endpoints configured".to_string())),
        )
    }
}

impl fmt::Debug for ChatCompletionsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionsProvider")
            .field("endpoints", &self.endpoints)
            .field("api_key", &"<redacted>")
            .field("retry", &self.retry)
            .finish()
    }
}
