//! CLI interface for the contract summarizer

use crate::config::OutputFormat;
use crate::error::{Result as SummarizerResult, SummarizerError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "contract-summarizer")]
#[command(version, about = "Generate a plain-English summary of a smart contract")]
#[command(long_about = "Summarize a deployed contract (by address, using its verified ABI) or raw Solidity source with a hosted language model")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a contract by address or source
    Summarize {
        /// Contract address on the configured network (e.g., 0x123...)
        #[arg(short, long)]
        address: Option<String>,

        /// Raw Solidity code (wrap in quotes or provide file path)
        #[arg(long)]
        code: Option<String>,

        /// LLM model to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,

        /// Output format: console, markdown, json
        #[arg(short, long, value_parser = parse_output_format)]
        output: Option<OutputFormat>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Print the function list sent to the model (console output only)
        #[arg(long)]
        show_abi: bool,
    },

    /// Fetch a contract ABI and list its functions without calling the model
    Abi {
        /// Contract address on the configured network
        #[arg(short, long)]
        address: String,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

impl Commands {
    /// `config reset` and `config path` never read the configuration file.
    pub fn loads_config(&self) -> bool {
        !matches!(
            self,
            Commands::Config {
                action: Some(ConfigAction::Reset | ConfigAction::Path)
            }
        )
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Which of `--address` / `--code` was given
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedInput {
    Address(String),
    Code(String),
}

/// Exactly one of `--address` and `--code` must be present.
pub fn requested_input(address: Option<String>, code: Option<String>) -> SummarizerResult<RequestedInput> {
    match (address, code) {
        (None, None) => Err(SummarizerError::Usage(
            "Must provide either --address or --code.".to_string(),
        )),
        (Some(_), Some(_)) => Err(SummarizerError::Usage(
            "You cannot provide both --address and --code. Please choose one.".to_string(),
        )),
        (Some(address), None) => Ok(RequestedInput::Address(address)),
        (None, Some(code)) => Ok(RequestedInput::Code(code)),
    }
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, markdown, json",
            format
        )),
    }
}
