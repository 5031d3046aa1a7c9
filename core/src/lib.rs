//! # Agrogate Core
//!
//! Core types, traits and the completion gateway itself: admission control
//! over a rolling fixed window, retrying dispatch under a per-attempt timeout,
//! and degraded responses for callers that must never see an error.
//! Wire transports live in the connector crates and plug in through
//! [`CompletionTransport`].

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod gateway;
pub mod persona;
pub mod rate_limit;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use config::GatewayConfig;
pub use errors::{CoreError, GatewayError};
pub use gateway::{CompletionGateway, HealthReport};
pub use persona::Persona;
pub use traits::{Clock, CompletionTransport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::dispatch::{Dispatcher, RetryPolicy};
    pub use crate::errors::*;
    pub use crate::gateway::*;
    pub use crate::persona::*;
    pub use crate::rate_limit::{AdmissionPermit, RateLimiter};
    pub use crate::traits::*;
    pub use crate::types::*;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
}
