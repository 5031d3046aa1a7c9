//! Configuration for the OpenAI HTTP client

use serde::{Deserialize, Serialize};

/// Client-level settings; endpoint, credential and timeouts come from the
/// gateway configuration snapshot on every call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// TCP connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// User-Agent header value
    pub user_agent: String,
}

impl OpenAiConfig {
    /// Set connect timeout
    pub fn with_connect_timeout(mut self, connect_timeout_ms: u64) -> Self {
        self.connect_timeout_ms = connect_timeout_ms;
        self
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            user_agent: concat!("agrogate/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
