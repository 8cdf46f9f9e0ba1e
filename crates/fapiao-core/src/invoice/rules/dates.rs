//! Issue date extraction for Chinese invoices.

use chrono::NaiveDate;
use regex::Captures;

use super::patterns::{
    BARE_DATE_CJK, DATE_COMPACT_FULL, DATE_FULL, LABELED_DATE, LABELED_DATE_COMPACT,
};
use super::{FieldExtractor, Strategy};

/// Issue date extractor.
///
/// Labeled dates (`开票日期`/`发票日期`) win over bare `YYYY年MM月DD日`
/// occurrences. A candidate that is not a real calendar date is skipped and
/// the search moves on to the next occurrence.
pub struct IssueDateExtractor;

impl IssueDateExtractor {
    pub fn new() -> Self {
        Self
    }

    fn labeled(&self, text: &str) -> Option<NaiveDate> {
        LABELED_DATE.captures_iter(text).find_map(|caps| date_from_captures(&caps))
    }

    fn labeled_compact(&self, text: &str) -> Option<NaiveDate> {
        LABELED_DATE_COMPACT
            .captures_iter(text)
            .filter(|caps| caps[1].len() == 8)
            .find_map(|caps| DATE_COMPACT_FULL.captures(&caps[1]).and_then(|c| date_from_captures(&c)))
    }

    fn bare_cjk(&self, text: &str) -> Option<NaiveDate> {
        BARE_DATE_CJK.captures_iter(text).find_map(|caps| date_from_captures(&caps))
    }
}

impl Default for IssueDateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for IssueDateExtractor {
    type Output = NaiveDate;

    const FIELD: &'static str = "issue_date";
    const STRATEGIES: &'static [(&'static str, Strategy<Self>)] = &[
        ("labeled", Self::labeled),
        ("labeled_compact", Self::labeled_compact),
        ("bare_cjk", Self::bare_cjk),
    ];
}

/// Build a date from year/month/day capture groups 1–3.
fn date_from_captures(caps: &Captures<'_>) -> Option<NaiveDate> {
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a whole string in any supported date form.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    DATE_FULL
        .captures(input)
        .or_else(|| DATE_COMPACT_FULL.captures(input))
        .and_then(|caps| date_from_captures(&caps))
}

/// Normalize a date string to `YYYY-MM-DD`.
pub fn normalize_date(input: &str) -> Option<String> {
    parse_date(input).map(|date| date.format("%Y-%m-%d").to_string())
}
