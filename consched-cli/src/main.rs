mod commands;
mod context;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use consched_core::config::SchedConfig;
use consched_core::sync::TagCriteria;
use tracing_subscriber::EnvFilter;

use crate::commands::Output;
use crate::context::Context;

#[derive(Parser)]
#[command(name = "consched", version)]
#[command(about = "Browse the convention schedule and keep a local copy in sync")]
struct Cli {
    /// Log sync steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the local schedule from the remote API
    Sync,
    /// Search events by name, host, room, tag or exact category
    Search {
        query: String,

        /// Only search the local cache
        #[arg(long)]
        offline: bool,
    },
    /// Show the next event carrying a tag
    Upcoming {
        tag: String,

        /// Which upcoming event to show (1 = soonest)
        #[arg(short = 'n', long, default_value_t = 1)]
        ordinal: u32,

        /// Only look in the local cache
        #[arg(long)]
        offline: bool,
    },
    /// Show a cached event by id
    Show { id: String },
    /// Show cache and sync status
    Status,
    /// Show config paths and effective settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Sync => {
            let ctx = Context::load().await?;
            commands::sync::run(&ctx, cli.json).await
        }
        Commands::Search { query, offline } => {
            let ctx = Context::load().await?;
            let output = Output {
                json: cli.json,
                offline,
            };
            commands::search::run(&ctx, &query, output).await
        }
        Commands::Upcoming {
            tag,
            ordinal,
            offline,
        } => {
            // Reject a bad ordinal before opening the cache
            let criteria = TagCriteria::new(tag, ordinal)?;
            let ctx = Context::load().await?;
            let output = Output {
                json: cli.json,
                offline,
            };
            commands::upcoming::run(&ctx, criteria, output).await
        }
        Commands::Show { id } => {
            let ctx = Context::load().await?;
            commands::show::run(&ctx, &id, cli.json).await
        }
        Commands::Status => {
            let ctx = Context::load().await?;
            commands::status::run(&ctx).await
        }
        Commands::Config => {
            let config = SchedConfig::load()?;
            commands::config::run(&config)
        }
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "consched_core=debug,consched_cli=debug"
    } else {
        "consched_core=warn,consched_cli=warn"
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}
