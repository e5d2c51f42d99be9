//! Scrape run configuration.
//!
//! All limits and endpoints the scraper uses live here, with defaults
//! matching the marketplace it targets. The CLI can override the
//! interesting ones per run.

use std::path::PathBuf;
use std::time::Duration;

/// Marketplace origin, used to resolve relative links.
pub const BASE_URL: &str = "https://www.tcgplayer.com";

/// Search endpoint; `{query}` is replaced with the percent-encoded query.
pub const SEARCH_URL_TEMPLATE: &str = "/search/all/product?q={query}";

/// Search queries tried in order when none are given on the command line.
pub const DEFAULT_QUERIES: &[&str] = &["magic", "magic the gathering", "pokemon", "island"];

/// Per-request socket timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed delay between successive page fetches.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(2);

/// Maximum number of records kept in the final reports.
pub const MAX_RECORDS: usize = 100;

/// Stop fetching further search pages once this many deduplicated
/// records have accumulated.
pub const EARLY_STOP_THRESHOLD: usize = 30;

/// Raw HTML snapshots are truncated to this many characters.
pub const SNAPSHOT_MAX_CHARS: usize = 100_000;

/// Configuration for one scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Marketplace origin (scheme + host, no trailing slash).
    pub base_url: String,
    /// Search queries, fetched in order.
    pub queries: Vec<String>,
    /// Directory for reports and snapshots.
    pub output_dir: PathBuf,
    /// Per-request socket timeout.
    pub timeout: Duration,
    /// Delay between successive page fetches.
    pub request_delay: Duration,
    /// Cap on records in the final reports.
    pub max_records: usize,
    /// Deduplicated record count that ends the fetch loop early.
    pub early_stop: usize,
    /// Character cap for saved markup snapshots.
    pub snapshot_max_chars: usize,
    /// Custom User-Agent header (None for the built-in browser UA).
    pub user_agent: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            queries: DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect(),
            output_dir: PathBuf::from("output"),
            timeout: DEFAULT_TIMEOUT,
            request_delay: DEFAULT_REQUEST_DELAY,
            max_records: MAX_RECORDS,
            early_stop: EARLY_STOP_THRESHOLD,
            snapshot_max_chars: SNAPSHOT_MAX_CHARS,
            user_agent: None,
        }
    }
}

impl ScrapeConfig {
    /// Build the full search URL list for the configured queries.
    pub fn search_urls(&self) -> Vec<String> {
        self.queries
            .iter()
            .map(|query| {
                let encoded = urlencoding::encode(query);
                let path = SEARCH_URL_TEMPLATE.replace("{query}", &encoded);
                format!("{}{}", self.base_url, path)
            })
            .collect()
    }
}
