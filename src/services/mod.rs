//! High-level scrape services.

mod search;

pub use search::SearchScraper;
