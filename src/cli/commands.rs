//! CLI commands implementation.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use url::Url;

use crate::config::{self, ScrapeConfig};
use crate::report;
use crate::services::SearchScraper;

#[derive(Parser)]
#[command(name = "cardgrab")]
#[command(about = "Trading card marketplace search scraper")]
#[command(version)]
pub struct Cli {
    /// Output directory for reports and snapshots
    #[arg(short, long, global = true, default_value = "output")]
    output_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape card listings from marketplace search pages
    Scrape {
        /// Search queries (defaults to the built-in query list)
        queries: Vec<String>,
        /// Marketplace origin to scrape
        #[arg(long, default_value = config::BASE_URL)]
        base_url: String,
        /// Maximum records kept in the reports
        #[arg(short, long, default_value_t = config::MAX_RECORDS)]
        limit: usize,
        /// Seconds to wait between page fetches
        #[arg(long, default_value_t = config::DEFAULT_REQUEST_DELAY.as_secs())]
        delay: u64,
        /// Custom User-Agent header
        #[arg(long, env = "CARDGRAB_USER_AGENT")]
        user_agent: Option<String>,
    },
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            queries,
            base_url,
            limit,
            delay,
            user_agent,
        } => {
            base_url
                .parse::<Url>()
                .with_context(|| format!("invalid base URL: {}", base_url))?;

            let mut config = ScrapeConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                output_dir: cli.output_dir,
                max_records: limit,
                request_delay: Duration::from_secs(delay),
                user_agent,
                ..ScrapeConfig::default()
            };
            if !queries.is_empty() {
                config.queries = queries;
            }

            scrape(config).await
        }
    }
}

async fn scrape(config: ScrapeConfig) -> anyhow::Result<()> {
    let output_dir = config.output_dir.clone();
    let max_records = config.max_records;

    let scraper = SearchScraper::new(config);
    let cards = scraper.run().await?;

    let paths = report::write_reports(&cards, &output_dir, max_records)?;
    report::print_preview(&cards, 10);
    println!("{} Reports written", style("→").cyan());
    println!("  {}", paths.json.display());
    println!("  {}", paths.text.display());

    Ok(())
}
