//! Streaming tag parser for card extraction.
//!
//! A hand-rolled tag tokenizer walks start-tag/text/end-tag events
//! through a small state machine tracking whether the cursor is inside
//! a card container, a name element, or a price element. One record is
//! accumulated per container. Unmatched or overlapping tags corrupt
//! the flags silently but never error.

use tracing::debug;

use super::resolve_url;
use crate::models::CardRecord;
use crate::utils::html::{decode_entities, truncate_chars};

/// Only this many leading characters of the document are parsed.
const MAX_PARSE_CHARS: usize = 500_000;

/// Class substrings marking a card container.
const CONTAINER_CLASSES: &[&str] = &["product", "card", "item", "result"];
/// Tags and class substrings marking a name element inside a card.
const NAME_TAGS: &[&str] = &["h2", "h3", "h4", "a", "span"];
const NAME_CLASSES: &[&str] = &["title", "name", "product", "heading"];
/// Tags and class substrings marking a price element inside a card.
const PRICE_TAGS: &[&str] = &["span", "div", "p"];
const PRICE_CLASSES: &[&str] = &["price", "cost", "amount", "money"];

/// Extract card records by streaming over the tag structure.
pub fn extract(html: &str, base_url: &str) -> Vec<CardRecord> {
    let html = truncate_chars(html, MAX_PARSE_CHARS);
    let mut parser = StreamParser::new(base_url);
    tokenize(html, &mut parser);
    debug!("streaming parser produced {} records", parser.cards.len());
    parser.cards
}

struct StreamParser<'a> {
    base_url: &'a str,
    cards: Vec<CardRecord>,
    current: CardRecord,
    in_card: bool,
    in_name: bool,
    in_price: bool,
    text_buf: String,
}

impl<'a> StreamParser<'a> {
    fn new(base_url: &'a str) -> Self {
        Self {
            base_url,
            cards: Vec::new(),
            current: CardRecord::default(),
            in_card: false,
            in_name: false,
            in_price: false,
            text_buf: String::new(),
        }
    }

    fn start_tag(&mut self, tag: &str, attrs: &[(String, String)]) {
        let class = attr(attrs, "class").unwrap_or("").to_ascii_lowercase();

        if tag == "div" && CONTAINER_CLASSES.iter().any(|c| class.contains(c)) {
            // A container start always begins a fresh record, even when
            // the previous container never closed.
            self.in_card = true;
            self.current = CardRecord::default();
            if let Some(href) = attr(attrs, "href") {
                let url = if href.starts_with('/') {
                    resolve_url(self.base_url, href)
                } else {
                    href.to_string()
                };
                self.current.url = Some(url);
            }
        } else if self.in_card
            && NAME_TAGS.contains(&tag)
            && NAME_CLASSES.iter().any(|c| class.contains(c))
        {
            self.in_name = true;
        } else if self.in_card
            && PRICE_TAGS.contains(&tag)
            && PRICE_CLASSES.iter().any(|c| class.contains(c))
        {
            self.in_price = true;
        }
    }

    fn text(&mut self, data: &str) {
        if self.in_name {
            self.text_buf.push_str(data);
        } else if self.in_price {
            let lower = data.to_lowercase();
            if data.contains('$') || lower.contains("usd") || lower.contains("price") {
                // Overwrites on repeat; the last price-looking text wins.
                self.current.price_raw = Some(data.trim().to_string());
            }
        }
    }

    fn end_tag(&mut self, tag: &str) {
        if self.in_name && NAME_TAGS.contains(&tag) {
            let name = self.text_buf.trim();
            if !name.is_empty() {
                self.current.name = Some(name.to_string());
            }
            self.in_name = false;
            self.text_buf.clear();
        } else if self.in_price && PRICE_TAGS.contains(&tag) {
            self.in_price = false;
        } else if self.in_card && tag == "div" {
            if !self.current.is_empty() {
                self.cards.push(self.current.clone());
            }
            self.in_card = false;
        }
    }
}

fn attr<'v>(attrs: &'v [(String, String)], name: &str) -> Option<&'v str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Walk the document, emitting tag and text events.
fn tokenize(html: &str, parser: &mut StreamParser) {
    // ASCII-lowered shadow copy for case-insensitive searches; byte
    // offsets stay aligned with the original.
    let lower = html.to_ascii_lowercase();
    let mut pos = 0;

    while pos < html.len() {
        match html[pos..].find('<') {
            Some(rel) => {
                if rel > 0 {
                    parser.text(&decode_entities(&html[pos..pos + rel]));
                }
                pos = consume_tag(html, &lower, pos + rel, parser);
            }
            None => {
                parser.text(&decode_entities(&html[pos..]));
                break;
            }
        }
    }
}

/// Consume one tag starting at `start` (which points at `<`) and
/// return the position after it.
fn consume_tag(html: &str, lower: &str, start: usize, parser: &mut StreamParser) -> usize {
    let rest = &html[start..];

    if rest.starts_with("<!--") {
        return match rest.find("-->") {
            Some(i) => start + i + 3,
            None => html.len(),
        };
    }
    if rest.starts_with("<!") || rest.starts_with("<?") {
        return match rest.find('>') {
            Some(i) => start + i + 1,
            None => html.len(),
        };
    }
    if rest.starts_with("</") {
        let end = match rest.find('>') {
            Some(i) => i,
            None => return html.len(),
        };
        let name = rest[2..end].trim().to_ascii_lowercase();
        parser.end_tag(&name);
        return start + end + 1;
    }

    let end = match find_tag_end(rest) {
        Some(i) => i,
        None => return html.len(),
    };
    let inner = &rest[1..end];
    let self_closing = inner.ends_with('/');
    let inner = inner.strip_suffix('/').unwrap_or(inner);
    let (name, attrs) = parse_tag(inner);
    if name.is_empty() {
        return start + end + 1;
    }

    parser.start_tag(&name, &attrs);
    let mut next = start + end + 1;

    if self_closing {
        parser.end_tag(&name);
    } else if name == "script" || name == "style" {
        // Raw-text elements: skip straight to the matching close tag so
        // their content never reaches the state machine as text.
        let close = format!("</{}", name);
        next = match lower[next..].find(&close) {
            Some(i) => next + i,
            None => html.len(),
        };
    }

    next
}

/// Find the index of the closing `>` of a start tag, honoring quoted
/// attribute values.
fn find_tag_end(rest: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, b) in rest.bytes().enumerate().skip(1) {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

/// Split a start tag's interior into a lowercase name and attribute list.
fn parse_tag(inner: &str) -> (String, Vec<(String, String)>) {
    let inner = inner.trim();
    let name_end = inner
        .find(|c: char| c.is_ascii_whitespace())
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();

    let mut attrs = Vec::new();
    let mut rest = inner[name_end..].trim_start();

    while !rest.is_empty() {
        let key_end = rest
            .find(|c: char| c.is_ascii_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let key = rest[..key_end].trim_matches('/').to_ascii_lowercase();
        rest = rest[key_end..].trim_start();

        let mut value = String::new();
        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            if let Some(q) = after_eq.chars().next().filter(|&c| c == '"' || c == '\'') {
                let body = &after_eq[1..];
                match body.find(q) {
                    Some(close) => {
                        value = body[..close].to_string();
                        rest = &body[close + 1..];
                    }
                    None => {
                        value = body.to_string();
                        rest = "";
                    }
                }
            } else {
                let val_end = after_eq
                    .find(|c: char| c.is_ascii_whitespace())
                    .unwrap_or(after_eq.len());
                value = after_eq[..val_end].to_string();
                rest = &after_eq[val_end..];
            }
        }

        if !key.is_empty() {
            attrs.push((key, value));
        }
        rest = rest.trim_start();
    }

    (name, attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.tcgplayer.com";

    #[test]
    fn test_single_card() {
        let html = r#"<div class="product-card" href="/card/1"><h3 class="product-name">Black Lotus</h3><span class="price">$5.00</span></div>"#;
        let cards = extract(html, BASE);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name.as_deref(), Some("Black Lotus"));
        assert_eq!(cards[0].price_raw.as_deref(), Some("$5.00"));
        assert_eq!(
            cards[0].url.as_deref(),
            Some("https://www.tcgplayer.com/card/1")
        );
    }

    #[test]
    fn test_no_containers_yields_empty() {
        let cards = extract("<div class=\"nav\"><span>menu</span></div>", BASE);
        assert!(cards.is_empty());
    }

    #[test]
    fn test_price_text_requires_currency_marker() {
        let html = r#"<div class="item"><span class="name">Island</span><span class="cost">out of stock</span></div>"#;
        let cards = extract(html, BASE);
        assert_eq!(cards.len(), 1);
        assert!(cards[0].price_raw.is_none());
    }

    #[test]
    fn test_multiple_cards() {
        let html = r#"
            <div class="result"><a class="title">First Card</a></div>
            <div class="result"><a class="title">Second Card</a></div>
        "#;
        let cards = extract(html, BASE);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].name.as_deref(), Some("First Card"));
        assert_eq!(cards[1].name.as_deref(), Some("Second Card"));
    }

    #[test]
    fn test_entities_decoded_in_names() {
        let html = r#"<div class="product"><h2 class="name">Sword &amp; Shield</h2></div>"#;
        let cards = extract(html, BASE);
        assert_eq!(cards[0].name.as_deref(), Some("Sword & Shield"));
    }

    #[test]
    fn test_script_content_skipped() {
        let html = r#"
            <div class="product">
                <script>var x = "<span class='name'>fake</span>";</script>
                <h3 class="name">Real Name</h3>
            </div>
        "#;
        let cards = extract(html, BASE);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name.as_deref(), Some("Real Name"));
    }

    #[test]
    fn test_empty_container_dropped() {
        let cards = extract(r#"<div class="product"><span>x</span></div>"#, BASE);
        assert!(cards.is_empty());
    }

    #[test]
    fn test_container_restart_resets_record() {
        // A second container start before the first closes abandons the
        // in-progress record.
        let html = r#"<div class="product"><div class="card"><a class="name">Kept</a></div>"#;
        let cards = extract(html, BASE);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name.as_deref(), Some("Kept"));
    }

    #[test]
    fn test_parse_tag_attributes() {
        let (name, attrs) = parse_tag(r#"div class="product card" href='/x' hidden"#);
        assert_eq!(name, "div");
        assert_eq!(attr(&attrs, "class"), Some("product card"));
        assert_eq!(attr(&attrs, "href"), Some("/x"));
        assert_eq!(attr(&attrs, "hidden"), Some(""));
    }

    #[test]
    fn test_quoted_gt_does_not_end_tag() {
        let html = r#"<div class="product" data-note="a > b"><h3 class="name">Ok</h3></div>"#;
        let cards = extract(html, BASE);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name.as_deref(), Some("Ok"));
    }

    #[test]
    fn test_truncated_input_never_panics() {
        // Unterminated tag at the cut point.
        let cards = extract("<div class=\"product\"><span class=\"nam", BASE);
        assert!(cards.is_empty());
    }
}
