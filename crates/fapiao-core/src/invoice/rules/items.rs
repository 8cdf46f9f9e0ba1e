//! Line item (goods/services description) extraction.

use super::patterns::{COLUMN_HEADERS, ITEM_HEADERS, ITEM_HEADER_INLINE, ITEM_TERMINATORS};
use super::{FieldExtractor, Strategy};
use crate::models::config::ExtractionConfig;

/// Characters that make up a quantity, price, rate or amount column.
const NUMERIC_COLUMN_CHARS: &str = "0123456789.,，¥￥%-";

/// Line item extractor.
///
/// Produces de-duplicated descriptions in first-seen order, capped at
/// `max_items`. Returns `None` when no tier finds anything; the caller
/// decides how to represent that.
pub struct LineItemExtractor {
    max_items: usize,
}

impl LineItemExtractor {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::with_max_items(config.max_line_items)
    }

    pub fn with_max_items(max_items: usize) -> Self {
        Self { max_items }
    }

    /// Text on the same line as an item header.
    fn inline_header(&self, text: &str) -> Option<Vec<String>> {
        self.collect(
            ITEM_HEADER_INLINE
                .captures_iter(text)
                .filter_map(|caps| clean_item(&caps[1])),
        )
    }

    /// Lines between the item header and the totals block.
    fn table_scan(&self, text: &str) -> Option<Vec<String>> {
        let mut capturing = false;
        let mut candidates = Vec::new();

        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            // Text layers often space out labels, e.g. `合 计`
            let compact = without_whitespace(line);
            if ITEM_HEADERS.iter().any(|header| compact.contains(header)) {
                capturing = true;
                continue;
            }
            if !capturing {
                continue;
            }
            if ITEM_TERMINATORS.iter().any(|marker| compact.contains(marker)) {
                break;
            }
            if let Some(item) = clean_item(line) {
                candidates.push(item);
            }
        }

        self.collect(candidates)
    }

    /// Lines starting with a `*category*` tag, e.g. `*信息技术服务*软件开发`.
    fn starred_lines(&self, text: &str) -> Option<Vec<String>> {
        self.collect(
            text.lines()
                .map(str::trim)
                .filter(|line| line.starts_with('*'))
                .filter_map(clean_item),
        )
    }

    fn collect(&self, candidates: impl IntoIterator<Item = String>) -> Option<Vec<String>> {
        let mut items: Vec<String> = Vec::new();
        for candidate in candidates {
            if !items.contains(&candidate) {
                items.push(candidate);
            }
        }
        items.truncate(self.max_items);

        if items.is_empty() { None } else { Some(items) }
    }
}

impl Default for LineItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for LineItemExtractor {
    type Output = Vec<String>;

    const FIELD: &'static str = "line_items";
    const STRATEGIES: &'static [(&'static str, Strategy<Self>)] = &[
        ("inline_header", Self::inline_header),
        ("table_scan", Self::table_scan),
        ("starred_lines", Self::starred_lines),
    ];
}

/// Cut a candidate before its first numeric column and reject headers,
/// empty text and single characters.
fn clean_item(candidate: &str) -> Option<String> {
    let description = candidate
        .split_whitespace()
        .take_while(|token| !is_numeric_column(token))
        .collect::<Vec<_>>()
        .join(" ");

    if description.chars().count() < 2 || is_column_header_row(&description) {
        return None;
    }
    Some(description)
}

fn is_numeric_column(token: &str) -> bool {
    token.chars().all(|c| NUMERIC_COLUMN_CHARS.contains(c))
}

/// True when nothing but column headers and punctuation remain, also when
/// the headers are spaced out (`单 位 数 量`).
fn is_column_header_row(line: &str) -> bool {
    let rest = COLUMN_HEADERS
        .iter()
        .fold(without_whitespace(line), |rest, header| rest.replace(header, ""));
    !rest.chars().any(char::is_alphanumeric)
}

fn without_whitespace(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}
