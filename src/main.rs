use anyhow::Context;
use clap::{Parser, Subcommand};
use prospect_pipeline::config::Config;
use prospect_pipeline::pipeline::stages::Stages;
use prospect_pipeline::{logging, metrics, server};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "prospect_pipeline")]
#[command(about = "Discover, filter, enrich and score registered companies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one registry page for a region and store it as a raw artifact
    Acquire {
        /// Region (state) code used as the registry filter, e.g. TG
        #[arg(long)]
        region: String,
    },
    /// Keep IT companies from a raw artifact, deduplicated and normalized
    Filter {
        /// Storage key of the raw artifact
        #[arg(long)]
        key: String,
    },
    /// Research the leading companies of a cleaned artifact
    Enrich {
        /// Storage key of the cleaned artifact
        #[arg(long)]
        key: String,
    },
    /// Score and rank an enriched artifact
    Score {
        /// Storage key of the enriched artifact
        #[arg(long)]
        key: String,
        /// Target service categories (comma-separated)
        #[arg(long)]
        target_categories: Option<String>,
    },
    /// Serve the stages over HTTP
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;
    let stages = Stages::from_config(config).context("building blob store")?;

    match cli.command {
        Commands::Acquire { region } => {
            let outcome = stages.acquire(&region).await?;
            print_json(&outcome.to_json())?;
        }
        Commands::Filter { key } => {
            print_json(&stages.filter(&key).await?)?;
        }
        Commands::Enrich { key } => {
            print_json(&stages.enrich(&key).await?)?;
        }
        Commands::Score {
            key,
            target_categories,
        } => {
            print_json(&stages.score(&key, target_categories.as_deref()).await?)?;
        }
        Commands::Serve { port } => {
            metrics::init_metrics();
            info!("Starting server on port {}", port);
            server::start_server(stages, port).await?;
        }
    }
    Ok(())
}
