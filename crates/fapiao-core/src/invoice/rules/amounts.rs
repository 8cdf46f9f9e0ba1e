//! Total amount (价税合计) extraction.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{CURRENCY_AMOUNT, DECIMAL_CANDIDATE, GROUPED_DECIMAL, TOTAL_LABELS};
use super::{FieldExtractor, Strategy};

/// Total amount extractor.
///
/// Labeled totals win in label order. Without a label the largest
/// currency-prefixed amount is taken, and as a last resort the largest
/// number shaped like a two-decimal amount anywhere in the text.
pub struct TotalAmountExtractor;

impl TotalAmountExtractor {
    pub fn new() -> Self {
        Self
    }

    fn labeled(&self, text: &str) -> Option<Decimal> {
        TOTAL_LABELS.iter().find_map(|pattern| {
            pattern
                .captures_iter(text)
                .find_map(|caps| parse_amount(&caps[1]))
        })
    }

    fn currency_prefixed(&self, text: &str) -> Option<Decimal> {
        CURRENCY_AMOUNT
            .captures_iter(text)
            .filter_map(|caps| parse_amount(&caps[1]))
            .max()
    }

    fn largest_decimal(&self, text: &str) -> Option<Decimal> {
        DECIMAL_CANDIDATE
            .find_iter(text)
            .filter(|m| {
                let before = text[..m.start()].chars().next_back();
                let after = text[m.end()..].chars().next();
                !matches!(before, Some(c) if c.is_ascii_digit() || c == '.' || c == ',')
                    && !matches!(after, Some(c) if c.is_ascii_digit() || c == '.')
            })
            .filter(|m| GROUPED_DECIMAL.is_match(m.as_str()))
            .filter_map(|m| parse_amount(m.as_str()))
            .max()
    }
}

impl Default for TotalAmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TotalAmountExtractor {
    type Output = Decimal;

    const FIELD: &'static str = "total_amount";
    const STRATEGIES: &'static [(&'static str, Strategy<Self>)] = &[
        ("labeled", Self::labeled),
        ("currency_prefixed", Self::currency_prefixed),
        ("largest_decimal", Self::largest_decimal),
    ];
}

/// Parse a raw amount such as `1,234.56`, `1，234.56` or `819`.
///
/// Everything except ASCII digits and `.` is dropped. When several points
/// remain only the first one separates the fraction. The result keeps at
/// least two fraction digits.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut normalized = String::with_capacity(raw.len());
    let mut seen_point = false;
    for c in raw.chars() {
        match c {
            '0'..='9' => normalized.push(c),
            '.' if !seen_point => {
                normalized.push(c);
                seen_point = true;
            }
            _ => {}
        }
    }

    let normalized = normalized.trim_end_matches('.');
    if !normalized.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let mut amount = Decimal::from_str(normalized).ok()?;
    if amount.scale() < 2 {
        amount.rescale(2);
    }
    Some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1，234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1.234.56"), Some(dec("1.23456")));
        assert_eq!(parse_amount("819.").map(|a| a.to_string()), Some("819.00".to_string()));
        assert_eq!(parse_amount("819").map(|a| a.to_string()), Some("819.00".to_string()));
        assert_eq!(parse_amount(".50"), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_label_beats_currency_amounts() {
        let extractor = TotalAmountExtractor::new();
        let text = "单价 ¥45.00\n价税合计（大写）捌佰壹拾玖圆整 价税合计（小写）¥819.00";
        assert_eq!(
            extractor.extract(text).map(|a| a.to_string()),
            Some("819.00".to_string())
        );
    }

    #[test]
    fn test_half_width_small_letter_marker() {
        let extractor = TotalAmountExtractor::new();
        let text = "价税合计(大写) 壹仟贰佰叁拾肆圆伍角陆分 (小写)￥1,234.56";
        assert_eq!(extractor.extract(text), Some(dec("1234.56")));
    }

    #[test]
    fn test_other_labels() {
        let extractor = TotalAmountExtractor::new();
        assert_eq!(extractor.extract("合 计 ¥250.00 ¥32.50"), Some(dec("250.00")));
        assert_eq!(extractor.extract("Total: 99.9"), Some(dec("99.90")));
    }

    #[test]
    fn test_largest_currency_amount() {
        let extractor = TotalAmountExtractor::new();
        let text = "¥45.00 ¥1,200.00 ￥300";
        assert_eq!(extractor.extract(text), Some(dec("1200.00")));
    }

    #[test]
    fn test_largest_decimal_without_labels() {
        let extractor = TotalAmountExtractor::new();
        assert_eq!(
            extractor.extract("金额 100.00\n税额 250.50\n"),
            Some(dec("250.50"))
        );
    }

    #[test]
    fn test_decimal_shape_and_boundaries() {
        let extractor = TotalAmountExtractor::new();
        assert_eq!(extractor.extract("12,34.56 10.00"), Some(dec("10.00")));
        assert_eq!(extractor.extract("version 1.2.345 rate 0.13"), Some(dec("0.13")));
        assert_eq!(extractor.extract("100.005"), None);
        assert_eq!(extractor.extract("no numbers here"), None);
    }
}
