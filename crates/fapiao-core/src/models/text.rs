//! Raw text recovered from a document.

use serde::{Deserialize, Serialize};

/// Ordered lines recovered from one document, native text first and OCR
/// output appended after it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawText {
    lines: Vec<String>,
}

impl RawText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block of text, splitting it into lines.
    pub fn push_block(&mut self, block: &str) {
        self.lines.extend(block.lines().map(str::to_string));
    }

    /// Append already-split lines.
    pub fn extend_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether any line has non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Number of non-whitespace characters.
    pub fn char_count(&self) -> usize {
        self.lines
            .iter()
            .flat_map(|l| l.chars())
            .filter(|c| !c.is_whitespace())
            .count()
    }

    /// The lines joined with `\n`.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

impl From<&str> for RawText {
    fn from(text: &str) -> Self {
        let mut raw = RawText::new();
        raw.push_block(text);
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_are_appended_in_order() {
        let mut raw = RawText::from("发票号码：12345678\n开票日期：2024年01月15日");
        raw.extend_lines(["购买方", "名称：某某公司"]);

        assert_eq!(raw.lines().len(), 4);
        assert_eq!(raw.lines()[2], "购买方");
        assert!(raw.to_text().starts_with("发票号码"));
    }

    #[test]
    fn test_blank_and_char_count() {
        let raw = RawText::from("  \n\t\n");
        assert!(raw.is_blank());
        assert_eq!(raw.char_count(), 0);

        assert_eq!(RawText::from("价税 合计\n¥1").char_count(), 6);
    }
}
