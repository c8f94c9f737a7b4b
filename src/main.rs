//! envgraph - Development environment build graph compiler
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use envgraph::cli::{Cli, Commands};
use envgraph::config::ConfigManager;
use envgraph::error::EnvGraphResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> EnvGraphResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    // 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("envgraph=warn"),
        1 => EnvFilter::new("envgraph=info"),
        _ => EnvFilter::new("envgraph=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.without_time().init();
    }

    match cli.command {
        Commands::Compile(args) => envgraph::cli::commands::compile(args, &config).await,
        Commands::Config(args) => {
            envgraph::cli::commands::config(args, &config_manager, &config).await
        }
        Commands::Cache(args) => envgraph::cli::commands::cache(args, &config).await,
    }
}
