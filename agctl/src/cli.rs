//! CLI argument definitions

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agctl")]
#[command(about = "Agrogate completion gateway control tool")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Chat-completion endpoint URL
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Answer from the in-memory transport instead of the remote API
    #[arg(long, global = true)]
    pub offline: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a prompt and print the answer
    Complete {
        /// Prompt text
        prompt: String,
        /// Print the full response instead of the answer text
        #[arg(long)]
        raw: bool,
        /// System prompt placed ahead of the user message (implies --raw)
        #[arg(short, long)]
        system: Option<String>,
    },
    /// Ask a persona; failures print the persona's fallback text
    Ask {
        /// Persona name (see `agctl personas`)
        persona: String,
        /// Prompt text
        prompt: String,
    },
    /// Fire concurrent completions and summarize the outcomes
    Burst {
        /// Prompt text sent by every caller
        prompt: String,
        /// Number of concurrent callers
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },
    /// Show the configured rate budget (each agctl run starts an empty window)
    Status,
    /// List configured personas
    Personas,
    /// Send a greeting and report whether the remote answered
    Health,
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
