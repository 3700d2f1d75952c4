//! Provider configuration

use crate::retry::RetryPolicy;
use crate::transport::TransportConfig;
use serde::{Deserialize, Serialize};

/// Default chat-completions endpoint (OpenRouter)
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Configuration for a [`ChatCompletionsProvider`](crate::ChatCompletionsProvider)
///
/// The API key is deliberately absent: secrets come from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ordered endpoint URLs, tried in turn until one answers
    pub endpoints: Vec<String>,

    /// Retry policy applied per endpoint
    pub retry: RetryPolicy,

    /// HTTP transport options
    pub transport: TransportConfig,

    /// Value for the `HTTP-Referer` attribution header
    pub app_referer: Option<String>,

    /// Value for the `X-Title` attribution header
    pub app_title: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![DEFAULT_ENDPOINT.to_string()],
            retry: RetryPolicy::default(),
            transport: TransportConfig::default(),
            app_referer: Some("https://github.com/ai-manufacturing-digest".to_string()),
            app_title: Some("AI Use Case Extractor".to_string()),
        }
    }
}

impl LlmConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoints.is_empty() {
            return Err("at least one endpoint is required".to_string());
        }
        if let Some(bad) = self
            .endpoints
            .iter()
            .find(|e| !(e.starts_with("http://") || e.starts_with("https://")))
        {
            return Err(format!("endpoint '{}' is not an http(s) URL", bad));
        }
        self.retry.validate()?;
        self.transport.validate()?;
        Ok(())
    }
}
