//! Events crawler CLI
//!
//! Local execution entry point. For AWS Lambda, use
//! `events-crawler-lambda`. Crawled events land in a JSON store under
//! the storage directory instead of DynamoDB.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use events_crawler::{
    error::Result,
    models::{Config, CrawlWindow},
    pipeline,
    storage::LocalStore,
};

/// NYC Parks events crawler
#[derive(Parser, Debug)]
#[command(
    name = "events-crawler",
    version,
    about = "Crawls the NYC Parks events listing"
)]
struct Cli {
    /// Path to storage directory containing config and output files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the listing window and write events to local storage
    Crawl {
        /// Override the configured day-count lookahead
        #[arg(long)]
        days: Option<u32>,
    },

    /// Validate the configuration file
    Validate,

    /// Show what the local store currently holds
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load configuration
    let config_path = cli.storage_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path);
    let store = LocalStore::new(&cli.storage_dir);

    match cli.command {
        Command::Crawl { days } => {
            if let Some(days) = days {
                config.ingest.crawl_days = days;
            }
            config.validate()?;

            let window = CrawlWindow::next_days(config.ingest.crawl_days);
            log::info!(
                "Crawling events from {} through {}",
                window.start,
                window.end
            );

            let summary = pipeline::run_ingest(&config, &window, &store).await?;
            log::info!(
                "Crawl complete: {} events across {} pages",
                summary.events,
                summary.pages
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "Config OK: table {}, {} day window, listing {}",
                config.ingest.table_name,
                config.ingest.crawl_days,
                config.ingest.base_url
            );
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            let events = store.load_all().await?;
            if events.is_empty() {
                log::info!("No events stored yet.");
            } else {
                log::info!("Local store holds {} events", events.len());
                for event in events.iter().take(10) {
                    let link = event
                        .detail_url(&config.ingest.base_url)
                        .unwrap_or_else(|| event.id.clone());
                    log::info!("  {} {} - {} ({})", event.month, event.day, event.name, link);
                }
            }
        }
    }

    Ok(())
}
