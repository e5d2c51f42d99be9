//! cardgrab - trading card marketplace search scraper.
//!
//! Fetches TCGplayer search pages and extracts card name/price/url
//! records using several independent extraction strategies: structured
//! markup heuristics, embedded-JSON blobs, a streaming tag parser, and
//! a regex fallback. Results are deduplicated by name, capped, and
//! written out as JSON plus a plain-text report.

pub mod cli;
pub mod config;
pub mod models;
pub mod report;
pub mod scrapers;
pub mod services;
pub mod utils;
