mod analytics;
mod parse;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::analytics::AnalyticsCommands;

#[derive(Debug, Parser)]
#[command(name = "mpidx-cli")]
#[command(about = "Marketplace index command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract the quantity and unit from product descriptions
    Parse {
        /// One or more free-text descriptions
        #[arg(required = true)]
        descriptions: Vec<String>,

        /// Print results as a JSON array
        #[arg(long)]
        json: bool,

        /// Include the parser rule that produced each result
        #[arg(long)]
        explain: bool,
    },
    /// Seller review analytics
    Analytics {
        #[command(subcommand)]
        command: AnalyticsCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = mpidx_core::load_app_config().context("failed to load configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, path = %config.analytics_path.display(), "config loaded");

    match cli.command {
        Some(Commands::Parse {
            descriptions,
            json,
            explain,
        }) => parse::run_parse(&descriptions, json, explain)?,
        Some(Commands::Analytics { command }) => match command {
            AnalyticsCommands::Update { input, dry_run } => {
                analytics::run_analytics_update(&config, &input, dry_run).await?;
            }
            AnalyticsCommands::Show { top } => {
                analytics::run_analytics_show(&config, top).await?;
            }
        },
        None => println!("mpidx-cli: use --help to list commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
