//! Concurrent fan-out against one gateway

use crate::client::build_gateway;
use crate::config::AgctlConfig;
use crate::output;
use agrogate_core::errors::CoreError;
use std::collections::BTreeMap;
use tracing::info;

/// Handle `burst`
pub async fn handle_burst_command(
    prompt: String,
    count: usize,
    config: &AgctlConfig,
) -> Result<(), CoreError> {
    if count == 0 {
        return Err(CoreError::Configuration("count must be at least 1".to_string()));
    }
    let gateway = build_gateway(config)?;

    info!("Launching {} concurrent completions", count);
    let handles: Vec<_> = (0..count)
        .map(|_| {
            let gateway = gateway.clone();
            let prompt = prompt.clone();
            tokio::spawn(async move { gateway.complete_raw(&prompt).await })
        })
        .collect();

    let mut outcomes: BTreeMap<String, usize> = BTreeMap::new();
    for handle in handles {
        let outcome = match handle.await {
            Ok(Ok(_)) => "success",
            Ok(Err(e)) => e.kind(),
            Err(e) => return Err(CoreError::Internal(format!("Burst task failed: {}", e))),
        };
        *outcomes.entry(outcome.to_string()).or_default() += 1;
    }

    output::display_burst(&outcomes, &gateway.status(), &config.default_format)
}
