//! Error types for Agrogate core operations

use std::time::Duration;
use thiserror::Error;

/// Main error type for configuration and process-level failures
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors surfaced by the completion gateway.
///
/// `Network`, `RemoteStatus`, `ResponseParse` and `Timeout` classify a single
/// dispatch attempt. Once the attempt budget is spent the last of them is
/// wrapped in [`GatewayError::TransportFailure`].
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote service returned {status}: {message}")]
    RemoteStatus { status: u16, message: String },

    #[error("Failed to parse remote response: {0}")]
    ResponseParse(String),

    #[error("Remote service rejected the request as malformed: {0}")]
    MalformedRequestRejected(String),

    #[error("Transport failed after {attempts} attempt(s): {last}")]
    TransportFailure {
        attempts: u32,
        #[source]
        last: Box<GatewayError>,
    },

    #[error("Gateway configuration error: {0}")]
    Configuration(String),
}

impl GatewayError {
    /// Whether another attempt may be made after this failure.
    ///
    /// Only per-attempt transport classifications are retryable; a remote
    /// "bad request" fails fast.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout(_)
                | GatewayError::Network(_)
                | GatewayError::RemoteStatus { .. }
                | GatewayError::ResponseParse(_)
        )
    }

    /// True when this error, or the last attempt it wraps, was a timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            GatewayError::Timeout(_) => true,
            GatewayError::TransportFailure { last, .. } => last.is_timeout(),
            _ => false,
        }
    }

    /// Short machine-readable label, used in logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::InvalidInput(_) => "invalid_input",
            GatewayError::RateLimited => "rate_limited",
            GatewayError::Timeout(_) => "timeout",
            GatewayError::Network(_) => "network",
            GatewayError::RemoteStatus { .. } => "remote_status",
            GatewayError::ResponseParse(_) => "response_parse",
            GatewayError::MalformedRequestRejected(_) => "malformed_request",
            GatewayError::TransportFailure { .. } => "transport_failure",
            GatewayError::Configuration(_) => "configuration",
        }
    }
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
