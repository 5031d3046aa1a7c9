//! In-memory implementation of CompletionTransport for offline runs and testing
//!
//! Replies come from a script of outcomes consumed one per attempt; once the
//! script is empty every attempt gets the configured default reply.

use agrogate_core::prelude::*;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Configuration for the in-memory transport
#[derive(Debug, Clone)]
pub struct InMemoryConfig {
    /// Reply text used once the script is exhausted
    pub default_reply: String,
    /// Simulated latency per attempt
    pub latency: Duration,
    /// Whether to enable verbose logging
    pub verbose: bool,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            default_reply: "This is an offline reply from the in-memory transport.".to_string(),
            latency: Duration::ZERO,
            verbose: false,
        }
    }
}

/// What a single attempt produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptedOutcome {
    /// Successful response with one choice
    Reply { text: String },
    /// Successful response with no choices
    NoAnswer,
    /// Never answers; the dispatcher's timeout fires
    Hang,
    /// Connection-level failure
    NetworkFailure { message: String },
    /// Non-success status from the remote
    RemoteStatus { status: u16, message: String },
    /// Remote rejected the payload as malformed
    Malformed { message: String },
}

impl ScriptedOutcome {
    pub fn reply(text: impl Into<String>) -> Self {
        ScriptedOutcome::Reply { text: text.into() }
    }

    pub fn network_failure(message: impl Into<String>) -> Self {
        ScriptedOutcome::NetworkFailure { message: message.into() }
    }
}

/// One attempt as seen by the transport
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub credential: String,
    pub request: CompletionRequest,
    pub at: tokio::time::Instant,
}

#[derive(Debug, Default)]
struct TransportState {
    script: VecDeque<ScriptedOutcome>,
    calls: Vec<RecordedCall>,
    successes: usize,
}

/// Scripted in-memory CompletionTransport
pub struct InMemoryTransport {
    state: Arc<RwLock<TransportState>>,
    config: InMemoryConfig,
}

impl InMemoryTransport {
    /// Create a transport that always replies with the default text
    pub fn new() -> Self {
        Self::new_with_config(InMemoryConfig::default())
    }

    /// Create a transport with configuration
    pub fn new_with_config(config: InMemoryConfig) -> Self {
        info!("Creating in-memory transport with config: {:?}", config);
        Self {
            state: Arc::new(RwLock::new(TransportState::default())),
            config,
        }
    }

    /// Create a transport that plays `outcomes` in order
    pub fn scripted(outcomes: impl IntoIterator<Item = ScriptedOutcome>) -> Self {
        let transport = Self::new();
        if let Ok(mut state) = transport.state.try_write() {
            state.script.extend(outcomes);
        }
        transport
    }

    /// Queue an outcome behind any already scripted
    pub async fn push_outcome(&self, outcome: ScriptedOutcome) {
        self.state.write().await.script.push_back(outcome);
    }

    /// Every attempt made so far
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.read().await.calls.clone()
    }

    /// Get statistics about the transport: (attempts, successful attempts)
    pub async fn stats(&self) -> (usize, usize) {
        let state = self.state.read().await;
        (state.calls.len(), state.successes)
    }

    /// Clear the script and the call log
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = TransportState::default();
        info!("Cleared in-memory transport");
    }

    fn response(&self, model: &str, text: Option<String>) -> CompletionResponse {
        let choices = text
            .map(|content| Choice {
                index: 0,
                message: Some(ResponseMessage {
                    role: Role::Assistant.to_string(),
                    content: Some(content),
                }),
                finish_reason: Some("stop".to_string()),
            })
            .into_iter()
            .collect();

        CompletionResponse {
            id: format!("chatcmpl-{}", Uuid::new_v4()),
            object: Some("chat.completion".to_string()),
            created: u64::try_from(Utc::now().timestamp()).ok(),
            model: model.to_string(),
            choices,
            usage: Usage::default(),
        }
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionTransport for InMemoryTransport {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn execute(
        &self,
        config: &GatewayConfig,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError> {
        let outcome = {
            let mut state = self.state.write().await;
            state.calls.push(RecordedCall {
                credential: config.credential.clone(),
                request: request.clone(),
                at: tokio::time::Instant::now(),
            });
            state.script.pop_front()
        };
        let outcome = outcome.unwrap_or_else(|| ScriptedOutcome::reply(self.config.default_reply.clone()));

        if self.config.verbose {
            debug!("In-memory transport playing {:?}", outcome);
        }

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        let text = match outcome {
            ScriptedOutcome::Reply { text } => Some(text),
            ScriptedOutcome::NoAnswer => None,
            ScriptedOutcome::Hang => {
                // Outlive any sane dispatch timeout
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                return Err(GatewayError::Timeout(Duration::from_secs(24 * 60 * 60)));
            }
            ScriptedOutcome::NetworkFailure { message } => return Err(GatewayError::Network(message)),
            ScriptedOutcome::RemoteStatus { status, message } => {
                return Err(GatewayError::RemoteStatus { status, message })
            }
            ScriptedOutcome::Malformed { message } => {
                return Err(GatewayError::MalformedRequestRejected(message))
            }
        };

        self.state.write().await.successes += 1;
        Ok(self.response(&request.model, text))
    }
}
