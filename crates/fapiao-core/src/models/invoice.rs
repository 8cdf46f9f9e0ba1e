//! Invoice record produced for every input document.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Placeholder stored in `line_items` when extraction ran but found nothing.
///
/// An empty `line_items` vector means extraction never ran (the document
/// failed before reaching the engine).
pub const ITEMS_NOT_RECOGNIZED: &str = "未识别到商品项目";

/// Separator used when line items are rendered into a single cell.
pub const ITEM_SEPARATOR: &str = "，";

/// Fields that must be present for a record to count as a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MandatoryField {
    InvoiceNumber,
    IssueDate,
    BuyerName,
    TotalAmount,
}

impl MandatoryField {
    /// All mandatory fields in column order.
    pub const ALL: [MandatoryField; 4] = [
        MandatoryField::InvoiceNumber,
        MandatoryField::IssueDate,
        MandatoryField::BuyerName,
        MandatoryField::TotalAmount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MandatoryField::InvoiceNumber => "invoice_number",
            MandatoryField::IssueDate => "issue_date",
            MandatoryField::BuyerName => "buyer_name",
            MandatoryField::TotalAmount => "total_amount",
        }
    }
}

impl fmt::Display for MandatoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completeness status of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RecordStatus {
    /// All mandatory fields were extracted.
    Success,
    /// Extraction ran, but these mandatory fields are empty.
    PartiallyMissing(Vec<MandatoryField>),
    /// The document never produced text to extract from.
    Failed(String),
}

impl RecordStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RecordStatus::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RecordStatus::Failed(_))
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Success => f.write_str("Success"),
            RecordStatus::PartiallyMissing(fields) => {
                let names: Vec<&str> = fields.iter().map(|field| field.as_str()).collect();
                write!(f, "PartiallyMissing: {}", names.join(", "))
            }
            RecordStatus::Failed(reason) => write!(f, "Failed: {}", reason),
        }
    }
}

/// Structured result for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Caller-supplied document name.
    pub source_file_name: String,

    /// Invoice number (digits only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// Issue date, serialized as `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,

    /// Buyer name (CJK ideographs, Latin letters and digits only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,

    /// Distinct item descriptions in first-seen order.
    #[serde(default)]
    pub line_items: Vec<String>,

    /// Grand total, serialized as a plain decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,

    /// Completeness status.
    pub status: RecordStatus,
}

impl InvoiceRecord {
    /// Column order of the tabular export.
    pub const COLUMNS: [&'static str; 7] = [
        "file_name",
        "invoice_number",
        "issue_date",
        "buyer_name",
        "line_items",
        "total_amount",
        "status",
    ];

    /// Create an empty record. Its status lists every mandatory field as
    /// missing until the validator runs.
    pub fn new(source_file_name: impl Into<String>) -> Self {
        Self {
            source_file_name: source_file_name.into(),
            invoice_number: None,
            issue_date: None,
            buyer_name: None,
            line_items: Vec::new(),
            total_amount: None,
            status: RecordStatus::PartiallyMissing(MandatoryField::ALL.to_vec()),
        }
    }

    /// Create a record for a document that failed before extraction.
    pub fn failed(source_file_name: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            status: RecordStatus::Failed(reason.to_string()),
            ..Self::new(source_file_name)
        }
    }

    /// Whether a mandatory field holds a value.
    pub fn has(&self, field: MandatoryField) -> bool {
        match field {
            MandatoryField::InvoiceNumber => self.invoice_number.is_some(),
            MandatoryField::IssueDate => self.issue_date.is_some(),
            MandatoryField::BuyerName => self.buyer_name.is_some(),
            MandatoryField::TotalAmount => self.total_amount.is_some(),
        }
    }

    /// Line items joined into one cell.
    pub fn line_items_display(&self) -> String {
        self.line_items.join(ITEM_SEPARATOR)
    }

    /// Render the record as one row in [`Self::COLUMNS`] order.
    pub fn to_row(&self) -> [String; 7] {
        [
            self.source_file_name.clone(),
            self.invoice_number.clone().unwrap_or_default(),
            self.issue_date.map(|d| d.to_string()).unwrap_or_default(),
            self.buyer_name.clone().unwrap_or_default(),
            self.line_items_display(),
            self.total_amount.map(|a| a.to_string()).unwrap_or_default(),
            self.status.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_new_record_lists_all_fields_missing() {
        let record = InvoiceRecord::new("a.pdf");
        assert_eq!(
            record.status,
            RecordStatus::PartiallyMissing(MandatoryField::ALL.to_vec())
        );
        assert!(record.line_items.is_empty());
    }

    #[test]
    fn test_row_order_and_formatting() {
        let record = InvoiceRecord {
            source_file_name: "inv-01.pdf".to_string(),
            invoice_number: Some("24312000000012345678".to_string()),
            issue_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            buyer_name: Some("某某贸易有限公司".to_string()),
            line_items: vec!["*办公用品*签字笔".to_string(), "*纸制品*打印纸".to_string()],
            total_amount: Some(Decimal::from_str("819.00").unwrap()),
            status: RecordStatus::Success,
        };

        assert_eq!(
            record.to_row(),
            [
                "inv-01.pdf".to_string(),
                "24312000000012345678".to_string(),
                "2024-03-05".to_string(),
                "某某贸易有限公司".to_string(),
                "*办公用品*签字笔，*纸制品*打印纸".to_string(),
                "819.00".to_string(),
                "Success".to_string(),
            ]
        );
    }

    #[test]
    fn test_status_display() {
        let status = RecordStatus::PartiallyMissing(vec![
            MandatoryField::IssueDate,
            MandatoryField::TotalAmount,
        ]);
        assert_eq!(status.to_string(), "PartiallyMissing: issue_date, total_amount");
        assert_eq!(
            InvoiceRecord::failed("x.pdf", "NoTextExtracted").status.to_string(),
            "Failed: NoTextExtracted"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let mut record = InvoiceRecord::new("a.pdf");
        record.issue_date = NaiveDate::from_ymd_opt(2024, 1, 15);
        record.total_amount = Some(Decimal::from_str("250.50").unwrap());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["issue_date"], "2024-01-15");
        assert_eq!(json["total_amount"], "250.50");
        assert_eq!(json["status"]["kind"], "partially_missing");
        assert!(json.get("invoice_number").is_none());
    }
}
