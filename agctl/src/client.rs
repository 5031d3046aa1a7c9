//! Gateway construction from CLI configuration

use crate::config::AgctlConfig;
use agrogate_adapter_in_memory::{InMemoryConfig, InMemoryTransport};
use agrogate_connector_openai::{OpenAiConfig, OpenAiTransport};
use agrogate_core::errors::CoreError;
use agrogate_core::{CompletionGateway, CompletionTransport};
use std::sync::Arc;
use tracing::{debug, warn};

/// Build a gateway over the transport selected by `config`
pub fn build_gateway(config: &AgctlConfig) -> Result<Arc<CompletionGateway>, CoreError> {
    let transport: Arc<dyn CompletionTransport> = if config.offline {
        debug!("Using in-memory transport");
        let mut memory = InMemoryConfig::default();
        if let Some(ref reply) = config.offline_reply {
            memory.default_reply = reply.clone();
        }
        Arc::new(InMemoryTransport::new_with_config(memory))
    } else {
        if config.gateway.credential.is_empty() {
            warn!("No credential configured; the remote will likely reject requests");
        }
        Arc::new(OpenAiTransport::new(OpenAiConfig::default())?)
    };

    let gateway = CompletionGateway::new(config.gateway.clone(), transport)?;
    Ok(Arc::new(gateway))
}
