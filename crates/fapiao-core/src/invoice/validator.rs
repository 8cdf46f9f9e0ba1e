//! Completeness check for extracted records.

use crate::models::invoice::{InvoiceRecord, MandatoryField, RecordStatus};

/// Derives a record's status from which mandatory fields are filled.
pub struct RecordValidator;

impl RecordValidator {
    /// `Success` when every mandatory field is present, otherwise
    /// `PartiallyMissing` with exactly the empty fields in column order.
    pub fn status(record: &InvoiceRecord) -> RecordStatus {
        let missing: Vec<MandatoryField> = MandatoryField::ALL
            .into_iter()
            .filter(|field| !record.has(*field))
            .collect();

        if missing.is_empty() {
            RecordStatus::Success
        } else {
            RecordStatus::PartiallyMissing(missing)
        }
    }

    /// Set the record's status. A `Failed` status is never overwritten.
    pub fn apply(record: &mut InvoiceRecord) {
        if !record.status.is_failed() {
            record.status = Self::status(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn complete_record() -> InvoiceRecord {
        let mut record = InvoiceRecord::new("a.pdf");
        record.invoice_number = Some("12345678".to_string());
        record.issue_date = NaiveDate::from_ymd_opt(2024, 1, 15);
        record.buyer_name = Some("某某有限公司".to_string());
        record.total_amount = Some(Decimal::new(81900, 2));
        record
    }

    #[test]
    fn test_success() {
        let mut record = complete_record();
        RecordValidator::apply(&mut record);
        assert_eq!(record.status, RecordStatus::Success);
    }

    #[test]
    fn test_line_items_are_not_mandatory() {
        let record = complete_record();
        assert!(record.line_items.is_empty());
        assert!(RecordValidator::status(&record).is_success());
    }

    #[test]
    fn test_partially_missing_lists_exactly_empty_fields() {
        let mut record = complete_record();
        record.issue_date = None;
        record.total_amount = None;

        assert_eq!(
            RecordValidator::status(&record),
            RecordStatus::PartiallyMissing(vec![
                MandatoryField::IssueDate,
                MandatoryField::TotalAmount,
            ])
        );
    }

    #[test]
    fn test_failed_is_kept() {
        let mut record = InvoiceRecord::failed("x.pdf", "NoTextExtracted");
        RecordValidator::apply(&mut record);
        assert_eq!(record.status, RecordStatus::Failed("NoTextExtracted".to_string()));
    }
}
