//! Completion command implementations

use crate::client::build_gateway;
use crate::config::AgctlConfig;
use crate::output;
use agrogate_core::errors::CoreError;
use tracing::info;

/// Handle `complete`
pub async fn handle_complete_command(
    prompt: String,
    raw: bool,
    system: Option<String>,
    config: &AgctlConfig,
) -> Result<(), CoreError> {
    let gateway = build_gateway(config)?;

    match system {
        Some(system_prompt) => {
            info!("Completing with custom system prompt");
            let response = gateway.complete_with_role(&prompt, &system_prompt).await?;
            output::display_response(&response, &config.default_format)
        }
        None if raw => {
            let response = gateway.complete_raw(&prompt).await?;
            output::display_response(&response, &config.default_format)
        }
        None => {
            let text = gateway.complete_text(&prompt).await;
            output::display_text(&text, &config.default_format)
        }
    }
}

/// Handle `ask`
pub async fn handle_ask_command(
    persona: String,
    prompt: String,
    config: &AgctlConfig,
) -> Result<(), CoreError> {
    let persona = config.persona(&persona)?;
    let gateway = build_gateway(config)?;

    info!("Asking persona {}", persona.name);
    let text = gateway.complete_with_persona(&persona, &prompt).await;
    output::display_text(&text, &config.default_format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrogate_core::GatewayError;

    fn offline() -> AgctlConfig {
        AgctlConfig {
            offline: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_complete_offline() {
        let result = handle_complete_command("hello".to_string(), true, None, &offline()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_blank_raw_prompt_is_an_error() {
        let result = handle_complete_command("  ".to_string(), true, None, &offline()).await;
        assert!(matches!(
            result,
            Err(CoreError::Gateway(GatewayError::InvalidInput(_)))
        ));
    }

    #[tokio::test]
    async fn test_blank_text_prompt_degrades() {
        let result = handle_complete_command("  ".to_string(), false, None, &offline()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_ask_unknown_persona() {
        let result = handle_ask_command("astrologer".to_string(), "hi".to_string(), &offline()).await;
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }
}
