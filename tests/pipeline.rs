//! End-to-end pipeline tests: extraction strategies feeding the
//! aggregator and reporter, plus the failure path.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use cardgrab::config::ScrapeConfig;
use cardgrab::models::CardRecord;
use cardgrab::report;
use cardgrab::services::SearchScraper;

/// A search page exercising all four strategies at once.
const SEARCH_PAGE: &str = r#"
<html>
<head>
<script>
window.__INITIAL_STATE__ = {"search": {"unrelated": true}, "results": [
    {"name": "Island", "marketPrice": 0.25, "productUrl": "/product/1/island"},
    {"name": "Swamp", "marketPrice": 0.2}
]};
</script>
</head>
<body>
<div class="search-results">
    <div class="product-card">
        <a href="/product/2/black-lotus"><h3 class="product-name">Black Lotus</h3></a>
        <span class="listing-price">$5.00</span>
    </div>
    <div class="product-card">
        <a href="/product/3/mox-pearl"><h3 class="product-name">Mox Pearl</h3></a>
        <span class="listing-price">$3.10</span>
    </div>
</div>
</body>
</html>
"#;

fn scraper_with(config: ScrapeConfig) -> SearchScraper {
    SearchScraper::new(config)
}

#[test]
fn extractors_combine_and_dedupe() {
    let scraper = scraper_with(ScrapeConfig::default());
    let cards = scraper.extract_all(SEARCH_PAGE);

    // Structured, streaming, and regex strategies all report the two
    // product cards; the embedded state contributes two more names.
    let unique = report::dedupe_by_name(cards);
    let names: Vec<&str> = unique.iter().filter_map(|c| c.name.as_deref()).collect();
    assert_eq!(names, ["Black Lotus", "Mox Pearl", "Island", "Swamp"]);

    // First occurrence wins: the structured record keeps its price/url.
    assert_eq!(unique[0].price.as_deref(), Some("$5.00"));
    assert_eq!(
        unique[0].url.as_deref(),
        Some("https://www.tcgplayer.com/product/2/black-lotus")
    );
    assert_eq!(unique[2].price.as_deref(), Some("$0.25"));
}

#[test]
fn dedupe_twice_is_stable() {
    let scraper = scraper_with(ScrapeConfig::default());
    let once = report::dedupe_by_name(scraper.extract_all(SEARCH_PAGE));
    let twice = report::dedupe_by_name(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn reports_capped_and_readable() {
    let cards: Vec<CardRecord> = (0..150)
        .map(|i| CardRecord::named(format!("Unique card {}", i)))
        .collect();
    let dir = tempfile::tempdir().unwrap();
    let paths = report::write_reports(&cards, dir.path(), 100).unwrap();

    let parsed: Vec<CardRecord> =
        serde_json::from_str(&fs::read_to_string(&paths.json).unwrap()).unwrap();
    assert_eq!(parsed.len(), 100);
    assert!(fs::read_to_string(&paths.text)
        .unwrap()
        .contains("Total cards: 100"));
}

#[tokio::test]
async fn fetch_failure_still_reports_zero_records() {
    let dir = tempfile::tempdir().unwrap();

    // Nothing listens here; the fetch fails and the run carries on.
    let config = ScrapeConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        queries: vec!["magic".to_string()],
        output_dir: PathBuf::from(dir.path()),
        timeout: Duration::from_secs(2),
        request_delay: Duration::from_millis(0),
        ..ScrapeConfig::default()
    };

    let cards = scraper_with(config).run().await.unwrap();
    assert!(cards.is_empty());

    let paths = report::write_reports(&cards, dir.path(), 100).unwrap();
    let text = fs::read_to_string(&paths.text).unwrap();
    assert!(text.contains("Total cards: 0"));
}
