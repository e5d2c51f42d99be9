//! Extraction from JSON blobs embedded in script contexts.
//!
//! Marketplace pages ship their search results inside script-tag state
//! assignments. This extractor regex-scans the raw page text for the
//! known assignment idioms, parses the first qualifying capture as
//! JSON, and walks known key names to reach the product list.

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::resolve_url;
use crate::models::CardRecord;

/// Script-embedded state assignment idioms, tried in order.
const JSON_PATTERNS: &[&str] = &[
    r"(?s)window\.__INITIAL_STATE__\s*=\s*(\{.*?\});",
    r"(?s)window\.__PRELOADED_STATE__\s*=\s*(\{.*?\});",
    r"(?s)var\s+productData\s*=\s*(\{.*?\});",
    r#"(?s)"products":\s*(\[.*?\]),"#,
    r#"(?s)"items":\s*(\[.*?\]),"#,
];

/// Keys under which a parsed state object may hold the product list.
const LIST_KEYS: &[&str] = &["products", "items", "results", "data"];

/// Candidate keys per record field, tried in order.
const NAME_KEYS: &[&str] = &["name", "title", "productName", "displayName"];
const PRICE_KEYS: &[&str] = &["price", "marketPrice", "lowPrice", "avgPrice", "amount"];
const URL_KEYS: &[&str] = &["url", "productUrl", "link", "detailUrl"];

/// Extract card records from the first embedded product list found.
pub fn extract(html: &str, base_url: &str) -> Vec<CardRecord> {
    match find_product_list(html) {
        Some(items) => cards_from_items(&items, base_url),
        None => Vec::new(),
    }
}

/// Find the first embedded JSON value holding a product list.
///
/// Scanning order is pattern order, then match order. A capture that
/// fails to parse, or parses but holds no list, is skipped and the
/// scan continues.
pub fn find_product_list(html: &str) -> Option<Vec<Value>> {
    for pattern in JSON_PATTERNS {
        let re = Regex::new(pattern).expect("static pattern");
        for caps in re.captures_iter(html) {
            let Some(m) = caps.get(1) else { continue };

            let data: Value = match serde_json::from_str(m.as_str()) {
                Ok(value) => value,
                Err(err) => {
                    debug!("embedded JSON candidate did not parse: {}", err);
                    continue;
                }
            };

            match data {
                Value::Object(map) => {
                    for key in LIST_KEYS {
                        if let Some(Value::Array(list)) = map.get(*key) {
                            debug!("found product list under key {:?}", key);
                            return Some(list.clone());
                        }
                    }
                }
                Value::Array(list) => return Some(list),
                _ => {}
            }
        }
    }
    None
}

/// Build card records from product list items.
///
/// Non-object items are skipped; a record is emitted only when a name
/// was found.
pub fn cards_from_items(items: &[Value], base_url: &str) -> Vec<CardRecord> {
    let mut cards = Vec::new();

    for item in items {
        let Some(obj) = item.as_object() else {
            continue;
        };
        let mut card = CardRecord::default();

        for key in NAME_KEYS {
            if let Some(name) = obj.get(*key).and_then(value_to_text) {
                card.name = Some(name);
                break;
            }
        }

        // First *present* price key wins, even if its value turns out
        // to be an unusable type.
        for key in PRICE_KEYS {
            if let Some(value) = obj.get(*key) {
                if let Some(n) = value.as_f64() {
                    card.price = Some(format!("${:.2}", n));
                } else if let Some(s) = value.as_str() {
                    card.price = Some(s.to_string());
                }
                break;
            }
        }

        for key in URL_KEYS {
            if let Some(raw) = obj.get(*key).and_then(value_to_text) {
                card.url = Some(resolve_url(base_url, &raw));
                break;
            }
        }

        if card.name.is_some() {
            cards.push(card);
        }
    }

    cards
}

/// Usable text for a field: non-empty strings, or numbers stringified.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
