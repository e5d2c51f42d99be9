//! Regex fallback extraction of card names from raw HTML.
//!
//! Last-resort strategy: when nothing structured matched, heading-like
//! text is recovered straight from the markup as name-only records.

use regex::Regex;
use tracing::debug;

use crate::models::CardRecord;
use crate::utils::html::{strip_tags, truncate_chars};

/// At most this many matches of the winning pattern are kept.
const MAX_MATCHES: usize = 10;
/// Captured names this short are discarded as noise.
const MIN_NAME_CHARS: usize = 3;
/// Names are clipped to this many characters.
const MAX_NAME_CHARS: usize = 200;

/// Heading-like text patterns, tried in order.
const NAME_PATTERNS: &[&str] = &[
    r"(?is)<h[2-4][^>]*>(.*?)</h[2-4]>",
    r#"(?is)class="[^"]*name[^"]*"[^>]*>(.*?)<"#,
    r#"(?is)data-testid="[^"]*name[^"]*"[^>]*>(.*?)<"#,
    r"(?is)product-name[^>]*>(.*?)<",
];

/// Recover heading-like text as name-only records.
///
/// The first pattern that matches anything wins, even when all of its
/// captures end up filtered out; later patterns are not tried.
pub fn extract(html: &str) -> Vec<CardRecord> {
    for pattern in NAME_PATTERNS {
        let re = Regex::new(pattern).expect("static pattern");
        if !re.is_match(html) {
            continue;
        }

        let mut cards = Vec::new();
        for caps in re.captures_iter(html).take(MAX_MATCHES) {
            let Some(m) = caps.get(1) else { continue };
            let name = strip_tags(m.as_str());
            let name = name.trim();
            if name.chars().count() > MIN_NAME_CHARS {
                cards.push(CardRecord::named(truncate_chars(name, MAX_NAME_CHARS)));
            }
        }

        debug!(
            "regex fallback matched pattern {:?} with {} usable names",
            pattern,
            cards.len()
        );
        return cards;
    }

    Vec::new()
}
