use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mealsub_shared::{PlanType, View};

mod cli;

/// mealsub - Meal scheduling and subscriptions
#[derive(Parser)]
#[command(name = "mealsub")]
#[command(about = "Meal scheduling and subscription rules", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the days of a calendar view
    Calendar {
        /// day, week or month
        #[arg(long, default_value = "week")]
        view: View,

        /// Date inside the wanted window (YYYY-MM-DD)
        #[arg(long)]
        anchor: Option<String>,
    },
    /// Price a saved selection list
    Quote {
        /// weekly or monthly
        #[arg(long, default_value = "weekly")]
        plan: PlanType,

        /// JSON file with the selection entries
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = mealsub::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    // Initialize observability (tracing + logging)
    mealsub::observability::init_observability(
        "mealsub",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
        &config.observability.format,
    )?;

    match cli.command {
        Commands::Serve { host, port } => cli::server::serve(config, host, port).await,
        Commands::Calendar { view, anchor } => cli::calendar::print(config, view, anchor),
        Commands::Quote { plan, file } => cli::quote::print(config, plan, file),
    }
}
