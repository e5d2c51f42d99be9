//! Extraction strategies for marketplace search pages.
//!
//! Each extractor is independent and best-effort: given raw page text
//! it returns whatever records it can find, and the aggregator merges
//! and deduplicates the combined output. None of them fail the run;
//! a page that matches nothing simply yields no records.

pub mod embedded_json;
mod http_client;
pub mod regex_fallback;
pub mod stream;
pub mod structured;

pub use http_client::{FetchError, HttpClient, USER_AGENT};

/// Resolve a path to a full URL, handling both absolute and relative paths.
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}{}", base_url, path)
    }
}
