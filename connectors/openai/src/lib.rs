//! OpenAI chat-completions transport for the Agrogate gateway

use agrogate_core::prelude::*;
use reqwest::{header, Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

mod config;
mod models;

pub use config::OpenAiConfig;
use models::OpenAiError;

/// OpenAI implementation of CompletionTransport
pub struct OpenAiTransport {
    client: Client,
}

impl OpenAiTransport {
    /// Create a new OpenAI transport
    pub fn new(config: OpenAiConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Classify a failure to get any response at all
    fn classify_send_error(&self, config: &GatewayConfig, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout(config.timeout())
        } else {
            GatewayError::Network(format!("HTTP request failed: {}", e))
        }
    }

    /// Classify a non-success status; 400 is the only status that is not retried
    fn classify_status(status: StatusCode, body: &str) -> GatewayError {
        let message = OpenAiError::message_from_body(body);
        if status == StatusCode::BAD_REQUEST {
            GatewayError::MalformedRequestRejected(message)
        } else {
            GatewayError::RemoteStatus {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl CompletionTransport for OpenAiTransport {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn execute(
        &self,
        config: &GatewayConfig,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError> {
        debug!("POST {} (model {})", config.endpoint, request.model);
        let start_time = Instant::now();

        // Make the API call
        let response = self
            .client
            .post(&config.endpoint)
            .timeout(config.timeout())
            .header(header::AUTHORIZATION, format!("Bearer {}", config.credential))
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify_send_error(config, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("OpenAI API error {}: {}", status, error_text);
            return Err(Self::classify_status(status, &error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.classify_send_error(config, e))?;
        let completion: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::ResponseParse(format!("Failed to parse response: {}", e)))?;

        debug!(
            "OpenAI completion {} finished in {}ms ({} choices, {} total tokens)",
            completion.id,
            start_time.elapsed().as_millis(),
            completion.choices.len(),
            completion.usage.total_tokens
        );

        Ok(completion)
    }
}
