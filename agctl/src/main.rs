//! Command-line interface for the Agrogate completion gateway

use clap::Parser;
use std::process;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

mod cli;
mod client;
mod commands;
mod config;
mod output;

use cli::*;
use config::AgctlConfig;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Initialize logging
    let log_level = match (args.quiet, args.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(log_level).into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();

    // Load configuration
    let config = match AgctlConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Override config with CLI args
    let config = config.with_overrides(&args);

    info!(
        "Starting agctl with endpoint: {}{}",
        config.gateway.endpoint,
        if config.offline { " (offline)" } else { "" }
    );

    // Execute command
    let result = match args.command {
        Commands::Complete { prompt, raw, system } => {
            commands::complete::handle_complete_command(prompt, raw, system, &config).await
        }
        Commands::Ask { persona, prompt } => {
            commands::complete::handle_ask_command(persona, prompt, &config).await
        }
        Commands::Burst { prompt, count } => {
            commands::burst::handle_burst_command(prompt, count, &config).await
        }
        Commands::Status => commands::status::handle_status_command(&config).await,
        Commands::Personas => commands::status::handle_personas_command(&config).await,
        Commands::Health => commands::status::handle_health_command(&config).await,
    };

    match result {
        Ok(_) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {}", e);
            process::exit(1);
        }
    }
}
