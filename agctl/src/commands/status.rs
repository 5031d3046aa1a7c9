//! Status, health and persona listing commands

use crate::client::build_gateway;
use crate::config::AgctlConfig;
use crate::output;
use agrogate_core::errors::CoreError;
use tracing::info;

/// Handle `status`; reports the budget of a freshly built gateway
pub async fn handle_status_command(config: &AgctlConfig) -> Result<(), CoreError> {
    let gateway = build_gateway(config)?;
    output::display_status(&gateway.status(), &config.default_format)
}

/// Handle `health`
pub async fn handle_health_command(config: &AgctlConfig) -> Result<(), CoreError> {
    let gateway = build_gateway(config)?;

    info!("Checking completion service at {}", config.gateway.endpoint);
    let report = gateway.health_check().await;
    output::display_health(&report, &config.default_format)?;

    if report.connected {
        Ok(())
    } else {
        Err(CoreError::Internal("Completion service health check failed".to_string()))
    }
}

/// Handle `personas`
pub async fn handle_personas_command(config: &AgctlConfig) -> Result<(), CoreError> {
    output::display_personas(&config.all_personas(), &config.default_format)
}
