//! Buyer (purchaser) name extraction.

use regex::Regex;

use super::patterns::{
    BUYER_BLOCK_NAME, BUYER_LABEL, ITEM_NAME_PREFIXES, NAME_LABEL, NAME_WITH_SUFFIX, NON_NAME_CHARS,
    PARTY_BREAK,
};
use super::{FieldExtractor, Strategy};

/// Buyer name extractor.
///
/// Candidates must end with an organizational suffix such as `公司` or
/// `集团`. The `购买方` block label is tried first, then a bare `名称` label
/// that is not part of an item column header, then `购买方` alone.
pub struct BuyerNameExtractor;

impl BuyerNameExtractor {
    pub fn new() -> Self {
        Self
    }

    fn buyer_block(&self, text: &str) -> Option<String> {
        first_clean_capture(&BUYER_BLOCK_NAME, text, |_| true)
    }

    fn name_label(&self, text: &str) -> Option<String> {
        first_clean_capture(&NAME_LABEL, text, |start| {
            let before = text[..start].trim_end();
            !ITEM_NAME_PREFIXES.iter().any(|prefix| before.ends_with(prefix))
        })
    }

    fn buyer_label(&self, text: &str) -> Option<String> {
        first_clean_capture(&BUYER_LABEL, text, |_| true)
    }
}

impl Default for BuyerNameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for BuyerNameExtractor {
    type Output = String;

    const FIELD: &'static str = "buyer_name";
    const STRATEGIES: &'static [(&'static str, Strategy<Self>)] = &[
        ("buyer_block", Self::buyer_block),
        ("name_label", Self::name_label),
        ("buyer_label", Self::buyer_label),
    ];
}

/// First capture whose match start passes `keep` and that is non-empty after cleaning.
fn first_clean_capture(
    pattern: &Regex,
    text: &str,
    keep: impl Fn(usize) -> bool,
) -> Option<String> {
    pattern.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        if !keep(whole.start()) {
            return None;
        }
        normalize_buyer_name(own_party(caps.get(1)?.as_str())?)
    })
}

/// Cut a captured run where the next party's columns begin, keeping the
/// part up to its last organizational suffix.
fn own_party(run: &str) -> Option<&str> {
    let head = PARTY_BREAK.find(run).map_or(run, |m| &run[..m.start()]);
    NAME_WITH_SUFFIX.find(head).map(|m| m.as_str())
}

/// Strip everything except Chinese characters, Latin letters and digits.
///
/// Returns `None` when nothing is left.
pub fn normalize_buyer_name(raw: &str) -> Option<String> {
    let cleaned = NON_NAME_CHARS.replace_all(raw, "").into_owned();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buyer_block() {
        let extractor = BuyerNameExtractor::new();
        let text = "购买方信息 名称：上海某某科技有限公司\n销售方信息 名称：北京供应商有限公司";
        assert_eq!(extractor.extract(text), Some("上海某某科技有限公司".to_string()));
    }

    #[test]
    fn test_side_by_side_buyer_and_seller() {
        let extractor = BuyerNameExtractor::new();
        assert_eq!(
            extractor.extract("购 名称：上海某某科技有限公司 销 名称：北京示例软件有限公司"),
            Some("上海某某科技有限公司".to_string())
        );
        assert_eq!(
            extractor.extract("购买方 名称 上海某某科技有限公司 销售方 名称 北京示例软件有限公司"),
            Some("上海某某科技有限公司".to_string())
        );
        assert_eq!(
            extractor.extract("名称 上海某某科技有限公司 销 名称 北京示例软件有限公司"),
            Some("上海某某科技有限公司".to_string())
        );
    }

    #[test]
    fn test_spaced_name_label() {
        let extractor = BuyerNameExtractor::new();
        let text = "名 称：深圳市 测试（集团）有限公司\n纳税人识别号：91440300";
        assert_eq!(extractor.extract(text), Some("深圳市测试集团有限公司".to_string()));
    }

    #[test]
    fn test_trailing_tax_id_is_dropped() {
        let extractor = BuyerNameExtractor::new();
        assert_eq!(
            extractor.extract("名称：某某贸易有限公司（税号XXX）"),
            Some("某某贸易有限公司".to_string())
        );
    }

    #[test]
    fn test_item_header_is_not_a_buyer() {
        let extractor = BuyerNameExtractor::new();
        let text = "项目名称：技术服务中心\n名称：杭州示例网络有限公司";
        assert_eq!(extractor.extract(text), Some("杭州示例网络有限公司".to_string()));
    }

    #[test]
    fn test_buyer_label_fallback() {
        let extractor = BuyerNameExtractor::new();
        assert_eq!(
            extractor.extract("购买方：Acme 贸易中心"),
            Some("Acme贸易中心".to_string())
        );
    }

    #[test]
    fn test_requires_organizational_suffix() {
        let extractor = BuyerNameExtractor::new();
        assert_eq!(extractor.extract("名称：张三"), None);
        assert_eq!(extractor.extract("no buyer here"), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize_buyer_name(" 上海·示例 有限公司 "),
            Some("上海示例有限公司".to_string())
        );
        assert_eq!(normalize_buyer_name("（）：: "), None);
    }
}
