//! Contract summarizer: plain-English summaries of smart contracts

use clap::Parser;
use contract_summarizer::cli::{self, Cli, Commands, ConfigAction, RequestedInput};
use contract_summarizer::config::{mask_secret, ApiKeys, Config, OutputFormat};
use contract_summarizer::error::Result;
use contract_summarizer::input::{ContractAddress, ContractInput, SourceLoader};
use contract_summarizer::output::formatter::ConsoleFormatter;
use contract_summarizer::output::progress::Spinner;
use contract_summarizer::output::{colors_enabled, save_report_to_file, ReportGenerator};
use contract_summarizer::summarizer::{chain_access_from_config, lookup_abi, Summarizer};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process;

/// Largest `--code` file we will send to the model.
const MAX_SOURCE_BYTES: u64 = 512 * 1024;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // reset and path must still work when the file itself is broken
    let loaded = if cli.command.loads_config() {
        Config::load(cli.config.as_deref())
    } else {
        Ok(Config::default())
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let no_color_env = std::env::var("NO_COLOR").ok();
    let use_colors = colors_enabled(config.output.color, cli.no_color, no_color_env.as_deref());
    if !use_colors {
        colored::control::set_override(false);
    }

    if let Err(e) = run_command(cli.command, cli.config, config, use_colors).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run_command(
    command: Commands,
    config_path: Option<PathBuf>,
    config: Config,
    use_colors: bool,
) -> Result<()> {
    match command {
        Commands::Summarize {
            address,
            code,
            model,
            output,
            save,
            show_abi,
        } => {
            let requested = cli::requested_input(address, code)?;
            let input = resolve_input(requested).await?;
            let format = output.unwrap_or(config.output.format);

            let keys = ApiKeys::from_env();
            let summarizer = Summarizer::from_config(&config, &keys, model)?;

            info!("Summarizing {}", describe(&input));
            let spinner = Spinner::start("Generating summary...", format == OutputFormat::Console);
            let result = summarizer.summarize(input).await;
            spinner.finish();
            let summary = result?;

            let generator = ReportGenerator::with_options(use_colors, show_abi, true);
            let rendered = generator.generate(&summary, format)?;
            print!("{}", rendered);
            if !rendered.ends_with('\n') {
                println!();
            }

            if let Some(path) = save {
                save_output(&path, &summary, format, show_abi)?;
            }
        }

        Commands::Abi { address } => {
            let address = ContractAddress::parse(&address)?;
            let keys = ApiKeys::from_env();
            let (explorer, probe) = chain_access_from_config(&config, &keys)?;

            let spinner = Spinner::start("Fetching ABI...", true);
            let result = lookup_abi(&explorer, probe.as_ref(), &address).await;
            spinner.finish();
            let abi = result?;

            print!("{}", ConsoleFormatter::new(use_colors, false).format_abi(&address.to_string(), &abi));
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => show_config(&config, &path),

                Some(ConfigAction::Reset) => {
                    Config::reset(&path)?;
                    println!("Configuration reset to defaults at {}", path.display());
                }

                Some(ConfigAction::Path) => println!("{}", path.display()),
            }
        }
    }

    Ok(())
}

async fn resolve_input(requested: RequestedInput) -> Result<ContractInput> {
    match requested {
        RequestedInput::Address(address) => Ok(ContractInput::Address(ContractAddress::parse(&address)?)),
        RequestedInput::Code(code) => {
            let source = SourceLoader::new().with_max_bytes(MAX_SOURCE_BYTES).load(&code).await?;
            Ok(ContractInput::Source(source))
        }
    }
}

fn describe(input: &ContractInput) -> String {
    match input {
        ContractInput::Address(address) => format!("contract {}", address),
        ContractInput::Source(source) => format!("{} bytes of Solidity source", source.len()),
    }
}

fn save_output(
    path: &Path,
    summary: &contract_summarizer::ContractSummary,
    format: OutputFormat,
    show_abi: bool,
) -> Result<()> {
    let content = ReportGenerator::for_file(show_abi).generate(summary, format)?;
    save_report_to_file(&content, path)?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    println!("Saved to {}", path.display());
    Ok(())
}

fn show_config(config: &Config, path: &Path) {
    let keys = ApiKeys::from_env();

    println!("Configuration file: {}", path.display());
    println!("\nNetwork:");
    println!("  Name: {}", config.network.name);
    println!("  Chain ID: {}", config.network.chain_id);
    println!("  Explorer: {}", config.network.explorer_url);
    println!(
        "  RPC: {}",
        config.network.rpc_url.as_deref().unwrap_or("(none, node check disabled)")
    );
    println!("\nLLM:");
    println!("  Endpoint: {}", config.llm.base_url);
    println!("  Model: {}", config.llm.model);
    println!("  Temperature: {}", config.llm.temperature);
    println!("  Max tokens: {}", config.llm.max_tokens);
    println!("  Timeout: {}s", config.llm.timeout_seconds);
    println!("\nOutput:");
    println!("  Format: {:?}", config.output.format);
    println!("  Color: {}", config.output.color);
    println!("\nAPI keys (from environment):");
    println!("  ETHERSCAN_API_KEY: {}", mask_secret(keys.etherscan.as_deref()));
    println!("  OPENAI_API_KEY: {}", mask_secret(keys.openai.as_deref()));
    println!("  INFURA_API_KEY: {}", mask_secret(keys.infura.as_deref()));
}
