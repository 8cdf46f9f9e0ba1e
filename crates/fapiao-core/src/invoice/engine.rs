//! Populates an [`InvoiceRecord`] from recovered text.

use std::time::Instant;

use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::invoice::{InvoiceRecord, ITEMS_NOT_RECOGNIZED};
use crate::models::text::RawText;

use super::rules::{
    BuyerNameExtractor, FieldExtractor, InvoiceNumberExtractor, IssueDateExtractor,
    LineItemExtractor, TotalAmountExtractor,
};

/// Runs one independent extractor per field.
///
/// Extraction never fails: a field no strategy can fill stays empty, and
/// missing line items are recorded as [`ITEMS_NOT_RECOGNIZED`].
pub struct FieldExtractionEngine {
    invoice_number: InvoiceNumberExtractor,
    issue_date: IssueDateExtractor,
    buyer_name: BuyerNameExtractor,
    line_items: LineItemExtractor,
    total_amount: TotalAmountExtractor,
}

impl FieldExtractionEngine {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            invoice_number: InvoiceNumberExtractor::from_config(config),
            issue_date: IssueDateExtractor::new(),
            buyer_name: BuyerNameExtractor::new(),
            line_items: LineItemExtractor::from_config(config),
            total_amount: TotalAmountExtractor::new(),
        }
    }

    /// Fill the extractable fields of `record`. Its status is left untouched.
    pub fn populate(&self, record: &mut InvoiceRecord, text: &RawText) {
        let start = Instant::now();
        let text = text.to_text();

        record.invoice_number = self.invoice_number.extract(&text);
        record.issue_date = self.issue_date.extract(&text);
        record.buyer_name = self.buyer_name.extract(&text);
        record.line_items = self
            .line_items
            .extract(&text)
            .unwrap_or_else(|| vec![ITEMS_NOT_RECOGNIZED.to_string()]);
        record.total_amount = self.total_amount.extract(&text);

        debug!(
            file = %record.source_file_name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fields extracted"
        );
    }

    /// Convenience wrapper building a fresh record from text.
    pub fn extract(&self, source_file_name: &str, text: &RawText) -> InvoiceRecord {
        let mut record = InvoiceRecord::new(source_file_name);
        self.populate(&mut record, text);
        record
    }
}

impl Default for FieldExtractionEngine {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const SAMPLE: &str = "电子发票（普通发票）\n\
        发票号码：24312000000012345678\n\
        开票日期：2024年01月15日\n\
        购买方信息 名称：上海某某科技有限公司\n\
        统一社会信用代码/纳税人识别号：91310000MA1K000000\n\
        销售方信息 名称：北京示例软件有限公司\n\
        项目名称 规格型号 单位 数量 单价 金额 税率/征收率 税额\n\
        *信息技术服务*软件开发服务 1 773.58 773.58 6% 46.42\n\
        *信息技术服务*技术支持 1 100.00 100.00 6% 6.00\n\
        合计 ¥873.58 ¥52.42\n\
        价税合计（大写）玖佰贰拾陆圆整 （小写）¥926.00";

    #[test]
    fn test_populate_full_invoice() {
        let engine = FieldExtractionEngine::default();
        let record = engine.extract("a.pdf", &RawText::from(SAMPLE));

        assert_eq!(record.invoice_number.as_deref(), Some("24312000000012345678"));
        assert_eq!(record.issue_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(record.buyer_name.as_deref(), Some("上海某某科技有限公司"));
        assert_eq!(
            record.line_items,
            vec![
                "*信息技术服务*软件开发服务".to_string(),
                "*信息技术服务*技术支持".to_string(),
            ]
        );
        assert_eq!(record.total_amount, Some(Decimal::from_str("926.00").unwrap()));
    }

    #[test]
    fn test_items_sentinel_when_nothing_found() {
        let engine = FieldExtractionEngine::default();
        let record = engine.extract("b.pdf", &RawText::from("发票号码：12345678"));

        assert_eq!(record.invoice_number.as_deref(), Some("12345678"));
        assert_eq!(record.line_items, vec![ITEMS_NOT_RECOGNIZED.to_string()]);
        assert_eq!(record.buyer_name, None);
        assert_eq!(record.total_amount, None);
    }

    #[test]
    fn test_strict_number_policy() {
        let engine = FieldExtractionEngine::new(&ExtractionConfig::strict());
        let record = engine.extract("c.pdf", &RawText::from(SAMPLE));
        assert_eq!(record.invoice_number, None);
    }
}
