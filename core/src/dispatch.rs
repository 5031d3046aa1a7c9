//! Retrying dispatch of completion requests

use crate::config::GatewayConfig;
use crate::errors::{GatewayError, GatewayResult};
use crate::traits::CompletionTransport;
use crate::types::{CompletionRequest, CompletionResponse};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Longest prompt prefix written to logs
pub const LOG_EXCERPT_CHARS: usize = 100;

/// Attempt budget and spacing for one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: config.retry_delay(),
            timeout: config.timeout(),
        }
    }
}

/// Sends requests through a transport with a per-attempt timeout and
/// fixed-delay retries.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn CompletionTransport>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn CompletionTransport>) -> Self {
        Self { transport }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Dispatch `request` using the endpoint, credential and retry tunables in
    /// `config`.
    ///
    /// Every failure except [`GatewayError::MalformedRequestRejected`] (and
    /// other non-transport errors) is retried until the attempt budget runs
    /// out, after which the last failure is returned inside
    /// [`GatewayError::TransportFailure`].
    pub async fn send(
        &self,
        config: &GatewayConfig,
        request: &CompletionRequest,
    ) -> GatewayResult<CompletionResponse> {
        let policy = RetryPolicy::from_config(config);
        let request_id = Uuid::new_v4();
        let prompt = excerpt(request.user_prompt().unwrap_or_default(), LOG_EXCERPT_CHARS);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let started = Instant::now();
            let outcome = match tokio::time::timeout(policy.timeout, self.transport.execute(config, request)).await {
                Ok(result) => result,
                Err(_) => Err(GatewayError::Timeout(policy.timeout)),
            };
            let latency_ms = started.elapsed().as_millis() as u64;

            let err = match outcome {
                Ok(response) => {
                    info!(
                        %request_id,
                        attempt,
                        timestamp = %Utc::now().to_rfc3339(),
                        transport = self.transport.name(),
                        prompt = %prompt,
                        latency_ms,
                        outcome = "success",
                        "Completion received"
                    );
                    return Ok(response);
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                error!(
                    %request_id,
                    attempt,
                    timestamp = %Utc::now().to_rfc3339(),
                    prompt = %prompt,
                    latency_ms,
                    outcome = err.kind(),
                    "Completion failed without retry: {}",
                    err
                );
                return Err(err);
            }

            if attempt >= policy.max_attempts {
                error!(
                    %request_id,
                    attempt,
                    timestamp = %Utc::now().to_rfc3339(),
                    prompt = %prompt,
                    latency_ms,
                    outcome = err.kind(),
                    "Completion attempts exhausted: {}",
                    err
                );
                return Err(GatewayError::TransportFailure {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            warn!(
                %request_id,
                attempt,
                timestamp = %Utc::now().to_rfc3339(),
                prompt = %prompt,
                latency_ms,
                outcome = err.kind(),
                "Completion attempt failed, retrying in {:?}: {}",
                policy.delay,
                err
            );
            tokio::time::sleep(policy.delay).await;
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("transport", &self.transport.name())
            .finish()
    }
}

/// First `max_chars` characters of `text`, with "..." appended when cut
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
