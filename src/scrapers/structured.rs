//! Structured extraction from parsed markup via class-name heuristics.
//!
//! Scans the document for container elements that look like product
//! cards, then pulls a name, price, and link out of each with nested
//! class-pattern matches. Selectors here are heuristics against a page
//! whose markup is not under our control; anything that does not match
//! is simply skipped.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::resolve_url;
use crate::models::CardRecord;
use crate::utils::html::normalize_ws;

/// Only the first candidates are inspected.
const MAX_CONTAINERS: usize = 20;

/// Extract card records from container-like elements.
pub fn extract(html: &str, base_url: &str) -> Vec<CardRecord> {
    let document = Html::parse_document(html);

    let container_class = Regex::new(r"(?i)product|card|item|result").expect("static pattern");
    let name_class = Regex::new(r"(?i)title|name|product-name").expect("static pattern");
    let price_class = Regex::new(r"(?i)price|cost|amount").expect("static pattern");

    let candidate_sel = Selector::parse("div, article, section").expect("static selector");
    let mut containers: Vec<ElementRef> = document
        .select(&candidate_sel)
        .filter(|el| class_matches(el, &container_class))
        .collect();

    if containers.is_empty() {
        // Fall back to attribute patterns associated with product cards.
        let fallback_sel = Selector::parse(
            r#"[data-testid*="product"], [class*="product-card"], .search-result-item"#,
        )
        .expect("static selector");
        containers = document.select(&fallback_sel).collect();
    }

    debug!("found {} candidate container elements", containers.len());

    let name_sel = Selector::parse("h2, h3, h4, a").expect("static selector");
    let price_sel = Selector::parse("[class]").expect("static selector");
    let link_sel = Selector::parse("a[href]").expect("static selector");

    let mut cards = Vec::new();
    for element in containers.into_iter().take(MAX_CONTAINERS) {
        let mut card = CardRecord::default();

        if let Some(name_el) = element
            .select(&name_sel)
            .find(|el| class_matches(el, &name_class))
        {
            let name = element_text(name_el);
            if !name.is_empty() {
                card.name = Some(name);
            }
        }

        if let Some(price_el) = element
            .select(&price_sel)
            .find(|el| class_matches(el, &price_class))
        {
            let price = element_text(price_el);
            if !price.is_empty() {
                card.price = Some(price);
            }
        }

        if let Some(link) = element.select(&link_sel).next() {
            if let Some(href) = link.value().attr("href") {
                let url = if href.starts_with('/') {
                    resolve_url(base_url, href)
                } else {
                    href.to_string()
                };
                card.url = Some(url);
            }
        }

        // Keep the record only if at least one field was found.
        if !card.is_empty() {
            cards.push(card);
        }
    }

    debug!("structured extractor produced {} records", cards.len());
    cards
}

fn class_matches(el: &ElementRef, pattern: &Regex) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|class| pattern.is_match(class))
}

fn element_text(el: ElementRef) -> String {
    normalize_ws(&el.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.tcgplayer.com";

    #[test]
    fn test_no_containers_yields_empty() {
        let cards = extract("<html><body><p>nothing here</p></body></html>", BASE);
        assert!(cards.is_empty());
    }

    #[test]
    fn test_extracts_name_price_and_link() {
        let html = r#"
            <div class="product-card">
                <a href="/product/123/black-lotus">
                    <h3 class="product-name">Black Lotus</h3>
                </a>
                <span class="market-price">$5.00</span>
            </div>
        "#;
        let cards = extract(html, BASE);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name.as_deref(), Some("Black Lotus"));
        assert_eq!(cards[0].price.as_deref(), Some("$5.00"));
        assert_eq!(
            cards[0].url.as_deref(),
            Some("https://www.tcgplayer.com/product/123/black-lotus")
        );
    }

    #[test]
    fn test_partial_record_kept() {
        // Only a link, no name or price: still one record.
        let html = r#"<div class="search-item"><a href="/x">go</a></div>"#;
        let cards = extract(html, BASE);
        assert_eq!(cards.len(), 1);
        assert!(cards[0].name.is_none());
        assert_eq!(cards[0].url.as_deref(), Some("https://www.tcgplayer.com/x"));
    }

    #[test]
    fn test_fallback_attribute_selector() {
        // No class-matched containers, but a data-testid hit.
        let html = r#"
            <section data-testid="product-grid-entry">
                <h2 class="title">Island</h2>
            </section>
        "#;
        let cards = extract(html, BASE);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name.as_deref(), Some("Island"));
    }

    #[test]
    fn test_container_cap() {
        let mut html = String::new();
        for i in 0..30 {
            html.push_str(&format!(
                r#"<div class="product"><h3 class="name">Card {}</h3></div>"#,
                i
            ));
        }
        let cards = extract(&html, BASE);
        assert_eq!(cards.len(), MAX_CONTAINERS);
    }

    #[test]
    fn test_absolute_href_passes_through() {
        let html = r#"<div class="item"><a href="https://example.com/c">c</a></div>"#;
        let cards = extract(html, BASE);
        assert_eq!(cards[0].url.as_deref(), Some("https://example.com/c"));
    }
}
