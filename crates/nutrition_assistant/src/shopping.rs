//! Shopping-list extraction from a generated menu document.
//!
//! The extractor only trusts one structural marker: a
//! `<ul class="shopping-list">` block. Everything else in the document is
//! ignored, and a missing block yields an empty list rather than an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document;

/// One parsed shopping-list entry. `amount` keeps the source spelling
/// ("150g", "1.5 kg"); entries without a recognizable quantity carry
/// `"unspecified"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub product: String,
    pub amount: String,
}

/// Stored as Option so a pattern that fails to compile degrades to an empty
/// extraction instead of a panic. The model is free to decorate the tag with
/// extra attributes or single quotes; only the class identifies the block.
static LIST_BLOCK: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?is)<ul\b[^>]*class\s*=\s*["']shopping-list["'][^>]*>(.*?)</ul>"#).ok()
});

static LIST_ENTRY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<li>(.*?)</li>").ok());

// Matches: "Oats 150g", "Buckwheat 1.5 kg", "Sugar 100g."
static QUANTITY_SUFFIX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)\s*(\d+\.?\d*\s*(?:kg|g|ml|pcs)\.?)$").ok()
});

static PIECES_WORD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)pcs").ok());

/// Extracts shopping items from a menu document.
///
/// Entry order is preserved and duplicates are kept; units are not
/// normalized across entries.
pub fn extract(html: &str) -> Vec<ShoppingItem> {
    let (Some(block_re), Some(entry_re)) = (LIST_BLOCK.as_ref(), LIST_ENTRY.as_ref()) else {
        return Vec::new();
    };

    let Some(block) = block_re.captures(html).and_then(|c| c.get(1)) else {
        tracing::warn!("no shopping-list block found in menu document");
        return Vec::new();
    };

    entry_re
        .captures_iter(block.as_str())
        .filter_map(|c| c.get(1))
        .map(|entry| parse_entry(entry.as_str()))
        .collect()
}

fn parse_entry(raw: &str) -> ShoppingItem {
    let text = document::fragment_text(raw);
    let text = text.trim_start_matches('-').trim();

    if let Some(re) = QUANTITY_SUFFIX.as_ref()
        && let Some(caps) = re.captures(text)
    {
        return ShoppingItem {
            product: clean_product(&caps[1]),
            amount: caps[2].trim().to_string(),
        };
    }

    // No numeric suffix; a bare pieces word still splits the entry.
    if let Some(re) = PIECES_WORD.as_ref()
        && re.is_match(text)
    {
        let parts: Vec<&str> = re.split(text).collect();
        if parts.len() >= 2 {
            let product = clean_product(parts[0]);
            let tail = parts[1].trim();
            let amount = if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
                format!("{} pcs", tail)
            } else {
                "pcs".to_string()
            };
            return ShoppingItem { product, amount };
        }
        return ShoppingItem {
            product: text.to_string(),
            amount: "pcs".to_string(),
        };
    }

    ShoppingItem {
        product: text.to_string(),
        amount: "unspecified".to_string(),
    }
}

/// Drops the separator often written between product and quantity
/// ("Oats - 150g") while keeping hyphens inside product names.
fn clean_product(raw: &str) -> String {
    raw.trim().trim_end_matches(['-', ' ']).to_string()
}
