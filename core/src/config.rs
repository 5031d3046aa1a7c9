//! Configuration for the completion gateway

use crate::errors::GatewayError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default remote chat-completion endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// System prompt placed ahead of the user message by `complete_raw`
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an agricultural expert assistant for AgroConnect World. Provide helpful, accurate, and friendly advice about farming, agricultural technology, and sustainable practices. Keep responses concise and practical.";

/// Gateway configuration.
///
/// A gateway holds one immutable snapshot of this at a time; see
/// `CompletionGateway::update_credential`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Remote chat-completion URL
    pub endpoint: String,
    /// Bearer credential sent with every request
    pub credential: String,
    /// Model identifier
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// System prompt used by `complete_raw`; `None` sends the user message alone
    pub default_system_prompt: Option<String>,
    /// Recorded successes allowed per window
    pub rate_limit: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Total attempts per dispatch, including the first
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl GatewayConfig {
    /// Create a config with the given credential and default tunables
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            credential: credential.into(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            default_system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            rate_limit: 60,
            window_ms: 60_000,
            timeout_ms: 30_000,
            max_attempts: 3,
            retry_delay_ms: 1_000,
        }
    }

    /// Set the endpoint URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set or clear the default system prompt
    pub fn with_default_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.default_system_prompt = prompt;
        self
    }

    /// Set the rate budget per window
    pub fn with_rate_limit(mut self, rate_limit: u32, window_ms: u64) -> Self {
        self.rate_limit = rate_limit;
        self.window_ms = window_ms;
        self
    }

    /// Set per-attempt timeout
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set attempt budget and the delay between attempts
    pub fn with_retry(mut self, max_attempts: u32, retry_delay_ms: u64) -> Self {
        self.max_attempts = max_attempts;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Reject values the gateway cannot run with
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.endpoint.trim().is_empty() {
            return Err(GatewayError::Configuration("endpoint must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(GatewayError::Configuration("model must not be empty".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(GatewayError::Configuration("max_attempts must be at least 1".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(GatewayError::Configuration("timeout_ms must be positive".to_string()));
        }
        if self.window_ms == 0 {
            return Err(GatewayError::Configuration("window_ms must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new("") // Empty credential - must be set by user
    }
}
