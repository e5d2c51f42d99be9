//! Aggregation and report output.
//!
//! Merges whatever the extractors produced, deduplicates by exact name,
//! caps the result set, and writes the JSON and plain-text reports plus
//! raw markup snapshots. Reports are written even for empty runs.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, Utc};
use console::style;
use tracing::info;

use crate::models::CardRecord;
use crate::utils::html::truncate_chars;

/// Paths of the files one run produced.
#[derive(Debug)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub text: PathBuf,
}

/// Deduplicate by exact case-sensitive name, preserving first occurrence.
///
/// Records without a name are dropped in this pass.
pub fn dedupe_by_name(cards: Vec<CardRecord>) -> Vec<CardRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();

    for card in cards {
        let Some(name) = card.name.clone() else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        if seen.insert(name) {
            unique.push(card);
        }
    }

    unique
}

/// Write the JSON array and plain-text report, capped at `max_records`.
pub fn write_reports(
    cards: &[CardRecord],
    output_dir: &Path,
    max_records: usize,
) -> anyhow::Result<ReportPaths> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let capped = &cards[..cards.len().min(max_records)];

    let json_path = output_dir.join("cards.json");
    let json = serde_json::to_string_pretty(capped)?;
    fs::write(&json_path, json).with_context(|| format!("writing {}", json_path.display()))?;

    let text_path = output_dir.join("report.txt");
    fs::write(&text_path, render_text_report(capped))
        .with_context(|| format!("writing {}", text_path.display()))?;

    info!(
        "wrote {} records to {} and {}",
        capped.len(),
        json_path.display(),
        text_path.display()
    );

    Ok(ReportPaths {
        json: json_path,
        text: text_path,
    })
}

/// Render the human-readable summary.
pub fn render_text_report(cards: &[CardRecord]) -> String {
    let mut out = String::new();
    out.push_str("TCGplayer card summary\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");
    out.push_str(&format!(
        "Scraped at: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("Total cards: {}\n\n", cards.len()));

    for (i, card) in cards.iter().enumerate() {
        out.push_str(&format!(
            "{}. {}\n",
            i + 1,
            card.name.as_deref().unwrap_or("(unnamed)")
        ));
        if let Some(price) = &card.price {
            out.push_str(&format!("   Price: {}\n", price));
        }
        if let Some(raw) = &card.price_raw {
            out.push_str(&format!("   Price (raw): {}\n", raw));
        }
        if let Some(url) = &card.url {
            out.push_str(&format!("   URL: {}\n", url));
        }
        out.push('\n');
    }

    out
}

/// Save a truncated snapshot of fetched markup for offline inspection.
pub fn save_snapshot(html: &str, output_dir: &Path, max_chars: usize) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let path = output_dir.join(format!("snapshot-{}.html", Utc::now().timestamp_millis()));
    fs::write(&path, truncate_chars(html, max_chars))
        .with_context(|| format!("writing {}", path.display()))?;

    Ok(path)
}

/// Print a short console preview of the first few records.
pub fn print_preview(cards: &[CardRecord], count: usize) {
    if cards.is_empty() {
        println!("{} No cards found", style("✗").red());
        return;
    }

    println!("{} {} cards collected", style("✓").green(), cards.len());
    for (i, card) in cards.iter().take(count).enumerate() {
        let name = card.name.as_deref().unwrap_or("(unnamed)");
        let price = card
            .price
            .as_deref()
            .or(card.price_raw.as_deref())
            .unwrap_or("-");
        println!("  {}. {} {}", i + 1, name, style(price).dim());
    }
}
