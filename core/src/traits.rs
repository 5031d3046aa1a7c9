//! Core traits defining the seams of the gateway

use crate::config::GatewayConfig;
use crate::errors::GatewayError;
use crate::types::{CompletionRequest, CompletionResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A wire-level connection to a remote chat-completion service.
///
/// Implementations perform exactly one attempt per call and classify the
/// failure; timeouts and retries are applied by the `Dispatcher`.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Send `request` once, using the endpoint and credential in `config`
    async fn execute(
        &self,
        config: &GatewayConfig,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError>;
}

/// Source of wall-clock time for the rate window
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
