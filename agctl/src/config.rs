//! Configuration management for agctl

use crate::cli::{Cli, OutputFormat};
use agrogate_core::errors::CoreError;
use agrogate_core::persona::{find_persona, Persona};
use agrogate_core::GatewayConfig;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted when no credential is configured
pub const CREDENTIAL_ENV: &str = "OPENAI_API_KEY";

/// Configuration for agctl CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgctlConfig {
    /// Gateway tunables
    pub gateway: GatewayConfig,
    /// Personas in addition to the built-in ones; a matching name replaces a built-in
    pub personas: Vec<Persona>,
    /// Default output format
    pub default_format: OutputFormat,
    /// Use the in-memory transport
    pub offline: bool,
    /// Reply text of the in-memory transport
    pub offline_reply: Option<String>,
}

impl Default for AgctlConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            personas: Vec::new(),
            default_format: OutputFormat::Table,
            offline: false,
            offline_reply: None,
        }
    }
}

impl AgctlConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: &Option<PathBuf>) -> Result<Self, CoreError> {
        let mut figment = Figment::new();

        // Load from default config file if it exists
        let default_config_paths = ["agctl.yaml", "agctl.yml", ".agctl.yaml", ".agctl.yml"];

        for path in &default_config_paths {
            if Path::new(path).exists() {
                figment = figment.merge(Yaml::file(path));
                break;
            }
        }

        // Load from specified config file
        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Yaml::file(path));
            } else {
                return Err(CoreError::Configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        }

        // Load from environment variables (AGCTL_GATEWAY__MODEL etc.)
        figment = figment.merge(Env::prefixed("AGCTL_").split("__"));

        let mut config: AgctlConfig = figment
            .extract()
            .map_err(|e| CoreError::Configuration(format!("Failed to parse configuration: {}", e)))?;

        if config.gateway.credential.is_empty() {
            if let Ok(credential) = std::env::var(CREDENTIAL_ENV) {
                config.gateway.credential = credential;
            }
        }

        Ok(config)
    }

    /// Apply CLI argument overrides to the configuration
    pub fn with_overrides(mut self, args: &Cli) -> Self {
        if let Some(ref endpoint) = args.endpoint {
            self.gateway.endpoint = endpoint.clone();
        }

        if let Some(ref model) = args.model {
            self.gateway.model = model.clone();
        }

        if let Some(ref format) = args.format {
            self.default_format = format.clone();
        }

        if args.offline {
            self.offline = true;
        }

        self
    }

    /// Built-in personas overlaid with the configured ones
    pub fn all_personas(&self) -> Vec<Persona> {
        let mut personas: Vec<Persona> = Persona::builtin()
            .into_iter()
            .filter(|builtin| find_persona(&self.personas, &builtin.name).is_none())
            .collect();
        personas.extend(self.personas.iter().cloned());
        personas
    }

    /// Look up a persona by name
    pub fn persona(&self, name: &str) -> Result<Persona, CoreError> {
        let personas = self.all_personas();
        find_persona(&personas, name).cloned().ok_or_else(|| {
            CoreError::Configuration(format!(
                "Unknown persona '{}'. Available: {}",
                name,
                personas.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AgctlConfig::default();
        assert_eq!(config.gateway.model, "gpt-3.5-turbo");
        assert_eq!(config.gateway.timeout_ms, 30_000);
        assert_eq!(config.default_format, OutputFormat::Table);
        assert!(!config.offline);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "gateway:").unwrap();
        writeln!(temp_file, "  endpoint: http://localhost:9000/v1/chat/completions").unwrap();
        writeln!(temp_file, "  credential: sk-file").unwrap();
        writeln!(temp_file, "  rate_limit: 5").unwrap();
        writeln!(temp_file, "default_format: json").unwrap();
        writeln!(temp_file, "personas:").unwrap();
        writeln!(temp_file, "  - name: weather").unwrap();
        writeln!(temp_file, "    system_prompt: You forecast weather.").unwrap();
        writeln!(temp_file, "    fallback_text: No forecast right now.").unwrap();

        let config = AgctlConfig::load(&Some(temp_file.path().to_path_buf())).unwrap();
        assert_eq!(config.gateway.endpoint, "http://localhost:9000/v1/chat/completions");
        assert_eq!(config.gateway.credential, "sk-file");
        assert_eq!(config.gateway.rate_limit, 5);
        assert_eq!(config.gateway.max_attempts, 3);
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.persona("weather").unwrap().fallback_text, "No forecast right now.");
    }

    #[test]
    fn test_missing_config_file() {
        let result = AgctlConfig::load(&Some(PathBuf::from("/nonexistent/agctl.yaml")));
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_configured_persona_replaces_builtin() {
        let config = AgctlConfig {
            personas: vec![Persona::new("technical-support", "Custom prompt", "Custom fallback")],
            ..Default::default()
        };

        let personas = config.all_personas();
        assert_eq!(personas.len(), 2);
        assert_eq!(config.persona("technical-support").unwrap().fallback_text, "Custom fallback");
        assert!(config.persona("agricultural-advice").is_ok());
        assert!(config.persona("unknown").is_err());
    }
}
