//! The completion gateway: admission, dispatch and degraded responses

use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::errors::{GatewayError, GatewayResult};
use crate::persona::{Persona, GENERIC_FALLBACK_TEXT};
use crate::rate_limit::RateLimiter;
use crate::traits::{Clock, CompletionTransport, SystemClock};
use crate::types::{CompletionRequest, CompletionResponse, RateLimitStatus};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Prompt sent by [`CompletionGateway::health_check`]
pub const HEALTH_CHECK_PROMPT: &str = "Hello";

/// Outbound gateway to a remote chat-completion service.
///
/// Safe to share between tasks; every operation takes `&self`.
pub struct CompletionGateway {
    config: ArcSwap<GatewayConfig>,
    limiter: Arc<RateLimiter>,
    dispatcher: Dispatcher,
}

impl CompletionGateway {
    /// Create a gateway over `transport`
    pub fn new(config: GatewayConfig, transport: Arc<dyn CompletionTransport>) -> GatewayResult<Self> {
        Self::with_clock(config, transport, Arc::new(SystemClock))
    }

    /// Create a gateway whose rate window reads time from `clock`
    pub fn with_clock(
        config: GatewayConfig,
        transport: Arc<dyn CompletionTransport>,
        clock: Arc<dyn Clock>,
    ) -> GatewayResult<Self> {
        config.validate()?;
        let limiter = Arc::new(RateLimiter::with_clock(config.rate_limit, config.window(), clock));
        info!(
            "Completion gateway ready: transport={}, model={}, budget={}/{}ms",
            transport.name(),
            config.model,
            config.rate_limit,
            config.window_ms
        );

        Ok(Self {
            config: ArcSwap::from_pointee(config),
            limiter,
            dispatcher: Dispatcher::new(transport),
        })
    }

    /// The configuration snapshot new calls will use
    pub fn config(&self) -> Arc<GatewayConfig> {
        self.config.load_full()
    }

    /// Swap in a new credential.
    ///
    /// Calls already in flight finish with the snapshot they started with.
    pub fn update_credential(&self, credential: impl Into<String>) {
        let credential = credential.into();
        self.config.rcu(|current| GatewayConfig {
            credential: credential.clone(),
            ..GatewayConfig::clone(current)
        });
        info!("Gateway credential updated");
    }

    /// Current rate window snapshot
    pub fn status(&self) -> RateLimitStatus {
        self.limiter.status()
    }

    /// Complete `prompt` under the configured default system prompt.
    ///
    /// Dispatch failures are returned unchanged.
    pub async fn complete_raw(&self, prompt: &str) -> GatewayResult<CompletionResponse> {
        let config = self.config();
        self.complete(config.clone(), config.default_system_prompt.as_deref(), prompt)
            .await
    }

    /// Complete `prompt` and return the answer text, or the generic fallback
    /// text on any error. Never fails.
    pub async fn complete_text(&self, prompt: &str) -> String {
        match self.complete_raw(prompt).await {
            Ok(response) => response.first_response().to_string(),
            Err(e) => {
                warn!("Returning fallback text after {} failure: {}", e.kind(), e);
                GENERIC_FALLBACK_TEXT.to_string()
            }
        }
    }

    /// Complete `prompt` with `system_prompt` as the leading system message
    pub async fn complete_with_role(
        &self,
        prompt: &str,
        system_prompt: &str,
    ) -> GatewayResult<CompletionResponse> {
        self.complete(self.config(), Some(system_prompt), prompt).await
    }

    /// Complete `prompt` as `persona`, falling back to the persona's own text
    pub async fn complete_with_persona(&self, persona: &Persona, prompt: &str) -> String {
        match self.complete_with_role(prompt, &persona.system_prompt).await {
            Ok(response) => response.first_response().to_string(),
            Err(e) => {
                warn!(
                    "Returning {} fallback text after {} failure: {}",
                    persona.name,
                    e.kind(),
                    e
                );
                persona.fallback_text.clone()
            }
        }
    }

    /// Send a greeting through `complete_text` and report whether the remote
    /// answered.
    pub async fn health_check(&self) -> HealthReport {
        let reply = self.complete_text(HEALTH_CHECK_PROMPT).await;
        let connected = reply != GENERIC_FALLBACK_TEXT;
        HealthReport {
            status: if connected { "healthy" } else { "degraded" }.to_string(),
            connected,
            transport: self.dispatcher.transport_name().to_string(),
            rate_limit: self.status(),
            checked_at: Utc::now(),
        }
    }

    async fn complete(
        &self,
        config: Arc<GatewayConfig>,
        system_prompt: Option<&str>,
        prompt: &str,
    ) -> GatewayResult<CompletionResponse> {
        if prompt.trim().is_empty() {
            return Err(GatewayError::InvalidInput(
                "User message cannot be null or empty".to_string(),
            ));
        }

        let permit = match self.limiter.try_acquire() {
            Some(permit) => permit,
            None => {
                warn!("Rate limit reached: {:?}", self.limiter.status());
                return Err(GatewayError::RateLimited);
            }
        };

        let request = CompletionRequest::new(
            config.model.clone(),
            system_prompt,
            prompt,
            config.max_tokens,
            config.temperature,
        );
        debug!(
            "Dispatching completion (system prompt: {})",
            request.has_system_prompt()
        );

        let response = self.dispatcher.send(&config, &request).await?;
        permit.record_success();
        Ok(response)
    }
}

impl std::fmt::Debug for CompletionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let config = self.config();
        f.debug_struct("CompletionGateway")
            .field("endpoint", &config.endpoint)
            .field("model", &config.model)
            .field("limiter", &self.limiter)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

/// Result of [`CompletionGateway::health_check`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub connected: bool,
    pub transport: String,
    pub rate_limit: RateLimitStatus,
    pub checked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::tests::{Step, StubTransport};
    use crate::rate_limit::tests::ManualClock;
    use crate::types::{Role, NO_ANSWER_TEXT};
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn gateway(transport: Arc<StubTransport>) -> CompletionGateway {
        CompletionGateway::with_clock(GatewayConfig::new("sk-test"), transport, ManualClock::new()).unwrap()
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected_without_dispatch() {
        let transport = StubTransport::always(|| Step::Reply("unused"));
        let gateway = gateway(transport.clone());

        for prompt in ["", "   ", "\n\t"] {
            assert!(matches!(
                gateway.complete_raw(prompt).await,
                Err(GatewayError::InvalidInput(_))
            ));
            assert!(matches!(
                gateway.complete_with_role(prompt, "be helpful").await,
                Err(GatewayError::InvalidInput(_))
            ));
        }

        assert_eq!(transport.attempts(), 0);
        assert_eq!(gateway.complete_text("").await, GENERIC_FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn test_rate_limited_after_budget() {
        let transport = StubTransport::always(|| Step::Reply("ok"));
        let gateway = gateway(transport.clone());

        for _ in 0..60 {
            assert_ok!(gateway.complete_raw("What is crop rotation?").await);
        }
        assert_eq!(gateway.status().current_requests, 60);

        let err = assert_err!(gateway.complete_raw("one more").await);
        assert!(matches!(err, GatewayError::RateLimited));
        assert_eq!(transport.attempts(), 60);
        assert_eq!(gateway.complete_text("one more").await, GENERIC_FALLBACK_TEXT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_consume_budget() {
        let transport = StubTransport::always(|| Step::Fail(GatewayError::Network("down".into())));
        let gateway = gateway(transport.clone());

        let err = assert_err!(gateway.complete_raw("hello").await);
        assert!(matches!(err, GatewayError::TransportFailure { attempts: 3, .. }));
        assert_eq!(gateway.status().current_requests, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_text_swallows_unreachable_endpoint() {
        let transport = StubTransport::always(|| {
            Step::Fail(GatewayError::Network("connection refused".into()))
        });
        let gateway = gateway(transport.clone());

        assert_eq!(gateway.complete_text("Is it going to rain?").await, GENERIC_FALLBACK_TEXT);
        assert_eq!(transport.attempts(), 3);
    }

    #[tokio::test]
    async fn test_empty_choices_yield_no_answer_text() {
        let transport = StubTransport::always(|| Step::Empty);
        let gateway = gateway(transport);

        let response = gateway.complete_raw("anything").await.unwrap();
        assert!(response.is_no_answer());
        assert_eq!(gateway.complete_text("anything").await, NO_ANSWER_TEXT);
        // no-answer is still a success
        assert_eq!(gateway.status().current_requests, 2);
    }

    #[tokio::test]
    async fn test_role_prepends_system_message() {
        let transport = StubTransport::always(|| Step::Reply("ok"));
        let gateway = gateway(transport.clone());

        gateway.complete_with_role("My tractor won't start", "You are a mechanic").await.unwrap();

        let seen = transport.seen.lock().unwrap();
        let request = &seen[0].1;
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "You are a mechanic");
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.max_tokens, 1000);
    }

    #[tokio::test]
    async fn test_raw_uses_configured_default_system_prompt() {
        let transport = StubTransport::always(|| Step::Reply("ok"));
        let config = GatewayConfig::new("k").with_default_system_prompt(None);
        let gateway =
            CompletionGateway::with_clock(config, transport.clone(), ManualClock::new()).unwrap();

        gateway.complete_raw("hello").await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].1.messages.len(), 1);
        assert_eq!(seen[0].1.messages[0].role, Role::User);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persona_uses_its_own_fallback() {
        let transport = StubTransport::always(|| Step::Fail(GatewayError::Timeout(Duration::from_secs(30))));
        let gateway = gateway(transport);
        let persona = Persona::technical_support();

        let text = gateway.complete_with_persona(&persona, "I can't log in").await;
        assert_eq!(text, persona.fallback_text);

        let custom = Persona::new("weather", "You forecast weather.", "No forecast available.");
        assert_eq!(
            gateway.complete_with_persona(&custom, "Rain tomorrow?").await,
            "No forecast available."
        );
    }

    #[tokio::test]
    async fn test_update_credential_applies_to_new_calls() {
        let transport = StubTransport::always(|| Step::Reply("ok"));
        let gateway = gateway(transport.clone());

        gateway.complete_raw("first").await.unwrap();
        gateway.update_credential("sk-rotated");
        gateway.complete_raw("second").await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].0, "sk-test");
        assert_eq!(seen[1].0, "sk-rotated");
        assert_eq!(gateway.config().credential, "sk-rotated");
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_call_keeps_its_credential_across_retries() {
        let transport = StubTransport::scripted(
            vec![Step::Fail(GatewayError::Network("reset".into()))],
            || Step::Reply("ok"),
        );
        let gateway = Arc::new(gateway(transport.clone()));

        let call = tokio::spawn({
            let gateway = Arc::clone(&gateway);
            async move { gateway.complete_raw("Should I irrigate today?").await }
        });

        // Rotate while the call waits out the retry delay
        tokio::time::sleep(Duration::from_millis(500)).await;
        gateway.update_credential("sk-rotated");
        assert_ok!(call.await.unwrap());

        let credentials: Vec<String> =
            transport.seen.lock().unwrap().iter().map(|(c, _)| c.clone()).collect();
        assert_eq!(credentials, vec!["sk-test", "sk-test"]);

        gateway.complete_raw("And tomorrow?").await.unwrap();
        assert_eq!(transport.seen.lock().unwrap()[2].0, "sk-rotated");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_call_releases_its_admission() {
        let transport = StubTransport::always(|| Step::Hang);
        let config = GatewayConfig::new("sk-test").with_rate_limit(1, 60_000);
        let gateway =
            Arc::new(CompletionGateway::with_clock(config, transport.clone(), ManualClock::new()).unwrap());

        let call = tokio::spawn({
            let gateway = Arc::clone(&gateway);
            async move { gateway.complete_raw("hello").await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(transport.attempts(), 1);
        assert!(!gateway.limiter.admit());

        call.abort();
        assert!(call.await.unwrap_err().is_cancelled());

        assert!(gateway.limiter.admit());
        assert_eq!(gateway.status().current_requests, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_future_releases_its_admission() {
        let transport = StubTransport::always(|| Step::Hang);
        let config = GatewayConfig::new("sk-test").with_rate_limit(1, 60_000);
        let gateway = CompletionGateway::with_clock(config, transport, ManualClock::new()).unwrap();

        let abandoned = tokio::time::timeout(Duration::from_secs(5), gateway.complete_raw("hello")).await;
        assert!(abandoned.is_err());

        assert!(gateway.limiter.admit());
        assert_eq!(gateway.status().current_requests, 0);
    }

    #[tokio::test]
    async fn test_health_check() {
        let gateway = gateway(StubTransport::always(|| Step::Reply("Hi there")));
        let report = gateway.health_check().await;
        assert!(report.connected);
        assert_eq!(report.status, "healthy");
        assert_eq!(report.transport, "stub");
        assert_eq!(report.rate_limit.current_requests, 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let transport = StubTransport::always(|| Step::Reply("ok"));
        let result = CompletionGateway::new(GatewayConfig::new("k").with_retry(0, 0), transport);
        assert!(matches!(result, Err(GatewayError::Configuration(_))));
    }
}
