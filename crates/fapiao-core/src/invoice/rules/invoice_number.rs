//! Invoice number extraction.
//!
//! The number is an identifying key, so only label-anchored digit runs are
//! accepted. There is deliberately no fallback to unlabeled digits.

use super::patterns::INVOICE_NUMBER;
use super::{FieldExtractor, Strategy};
use crate::models::config::ExtractionConfig;

/// Invoice number extractor.
pub struct InvoiceNumberExtractor {
    min_digits: usize,
    max_digits: usize,
}

impl InvoiceNumberExtractor {
    /// Create an extractor accepting 8 to 20 digits.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::with_digit_bounds(
            config.invoice_number_min_digits,
            config.invoice_number_max_digits,
        )
    }

    /// Set the accepted digit count range (inclusive).
    pub fn with_digit_bounds(min_digits: usize, max_digits: usize) -> Self {
        Self {
            min_digits,
            max_digits: max_digits.max(min_digits),
        }
    }

    fn accepts(&self, digits: &str) -> bool {
        (self.min_digits..=self.max_digits).contains(&digits.len())
    }

    fn labeled(&self, text: &str) -> Option<String> {
        INVOICE_NUMBER
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .find(|digits| self.accepts(digits))
    }
}

impl Default for InvoiceNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InvoiceNumberExtractor {
    type Output = String;

    const FIELD: &'static str = "invoice_number";
    const STRATEGIES: &'static [(&'static str, Strategy<Self>)] = &[("labeled", Self::labeled)];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_18_digits() {
        let extractor = InvoiceNumberExtractor::new();
        assert_eq!(
            extractor.extract("电子发票（普通发票）\n发票号码：243120000000123456\n"),
            Some("243120000000123456".to_string())
        );
        assert_eq!(
            extractor.extract("发票号码 : 243120000000123456"),
            Some("243120000000123456".to_string())
        );
    }

    #[test]
    fn test_unlabeled_digits_are_ignored() {
        let extractor = InvoiceNumberExtractor::new();
        let text = "纳税人识别号：913100007178123456\n订单 243120000000123456";
        assert_eq!(extractor.extract(text), None);
    }

    #[test]
    fn test_label_and_value_on_separate_lines() {
        let extractor = InvoiceNumberExtractor::new();
        assert_eq!(
            extractor.extract("发票号码：\n24312000000012345678"),
            Some("24312000000012345678".to_string())
        );
    }

    #[test]
    fn test_out_of_range_occurrence_is_skipped() {
        let extractor = InvoiceNumberExtractor::new();
        let text = "发票号码：1234\n...\n发票号码：04400190";
        assert_eq!(extractor.extract(text), Some("04400190".to_string()));
    }

    #[test]
    fn test_strict_policy() {
        let extractor = InvoiceNumberExtractor::from_config(&ExtractionConfig::strict());
        assert_eq!(extractor.extract("发票号码：04400190"), None);
        assert_eq!(
            extractor.extract("Invoice No. 243120000000123456"),
            Some("243120000000123456".to_string())
        );
    }
}
