//! Search scrape orchestration.
//!
//! Sequential loop over the configured search URLs: fetch, snapshot,
//! run every extraction strategy, merge and deduplicate, and stop
//! early once enough records have accumulated. A failed fetch skips
//! that URL; the run itself never fails over missing data.

use tracing::{info, warn};

use crate::config::ScrapeConfig;
use crate::models::CardRecord;
use crate::report;
use crate::scrapers::{embedded_json, regex_fallback, stream, structured, HttpClient};

/// Scrapes card listings from marketplace search pages.
pub struct SearchScraper {
    config: ScrapeConfig,
    client: HttpClient,
}

impl SearchScraper {
    /// Create a scraper for the given configuration.
    pub fn new(config: ScrapeConfig) -> Self {
        let client = HttpClient::with_user_agent(config.timeout, config.user_agent.as_deref());
        Self { config, client }
    }

    /// Run the scrape across all configured search URLs.
    ///
    /// Returns the deduplicated record set, uncapped; the reporter
    /// applies the final cap.
    pub async fn run(&self) -> anyhow::Result<Vec<CardRecord>> {
        let mut all_cards: Vec<CardRecord> = Vec::new();
        let urls = self.config.search_urls();

        for (i, url) in urls.iter().enumerate() {
            info!("Fetching {}", url);
            let html = match self.client.get_text(url).await {
                Ok(html) => html,
                Err(err) => {
                    warn!("Fetch failed for {}: {}", url, err);
                    continue;
                }
            };
            info!("Fetched {} bytes", html.len());

            match report::save_snapshot(&html, &self.config.output_dir, self.config.snapshot_max_chars)
            {
                Ok(path) => info!("Saved snapshot to {}", path.display()),
                Err(err) => warn!("Failed to save snapshot: {}", err),
            }

            all_cards.extend(self.extract_all(&html));
            all_cards = report::dedupe_by_name(all_cards);
            info!("{} unique records so far", all_cards.len());

            if all_cards.len() >= self.config.early_stop {
                info!(
                    "Collected {} records, stopping before remaining URLs",
                    all_cards.len()
                );
                break;
            }

            if i + 1 < urls.len() {
                tokio::time::sleep(self.config.request_delay).await;
            }
        }

        Ok(all_cards)
    }

    /// Apply every extraction strategy to one page, in order.
    ///
    /// The strategies run independently and unconditionally; their
    /// outputs are concatenated for the aggregator to deduplicate.
    pub fn extract_all(&self, html: &str) -> Vec<CardRecord> {
        let base = &self.config.base_url;

        let mut cards = structured::extract(html, base);
        cards.extend(embedded_json::extract(html, base));
        cards.extend(stream::extract(html, base));
        cards.extend(regex_fallback::extract(html));
        cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> SearchScraper {
        SearchScraper::new(ScrapeConfig::default())
    }

    #[test]
    fn test_extract_all_merges_strategies() {
        let html = r#"
            <div class="product-card">
                <h3 class="product-name">Black Lotus</h3>
                <span class="price">$5.00</span>
            </div>
            <script>var productData = {"products": [{"name": "Island", "marketPrice": 0.25}]};</script>
        "#;
        let cards = scraper().extract_all(html);

        let names: Vec<&str> = cards.iter().filter_map(|c| c.name.as_deref()).collect();
        // Structured, streaming, and regex all see Black Lotus; the JSON
        // blob contributes Island. Dedup happens later, in aggregation.
        assert!(names.contains(&"Black Lotus"));
        assert!(names.contains(&"Island"));
        assert!(names.len() >= 3);
    }

    #[test]
    fn test_extract_all_empty_page() {
        assert!(scraper().extract_all("<html><body></body></html>").is_empty());
    }
}
