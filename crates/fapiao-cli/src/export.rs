//! Tabular export of invoice records (CSV, JSON, Excel).

use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use fapiao_core::InvoiceRecord;

/// Batch output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated values, one row per document
    Csv,
    /// JSON array of records
    Json,
    /// Excel workbook
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

const SHEET_NAME: &str = "发票数据";

/// Column widths for the Excel sheet, in [`InvoiceRecord::COLUMNS`] order.
const COLUMN_WIDTHS: [f64; 7] = [28.0, 24.0, 12.0, 32.0, 48.0, 14.0, 36.0];

pub fn write_records(path: &Path, records: &[InvoiceRecord], format: ExportFormat) -> anyhow::Result<()> {
    match format {
        ExportFormat::Csv => fs::write(path, records_to_csv(records)?)?,
        ExportFormat::Json => fs::write(path, serde_json::to_string_pretty(records)?)?,
        ExportFormat::Xlsx => write_xlsx(path, records)?,
    }
    Ok(())
}

pub fn records_to_csv(records: &[InvoiceRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(InvoiceRecord::COLUMNS)?;
    for record in records {
        wtr.write_record(record.to_row())?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn write_xlsx(path: &Path, records: &[InvoiceRecord]) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    let text_format = Format::new().set_text_wrap();

    for (col, &width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, width)?;
    }
    for (col, header) in InvoiceRecord::COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = (index + 1) as u32;
        for (col, value) in record.to_row().iter().enumerate() {
            worksheet.write_string_with_format(row, col as u16, value, &text_format)?;
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    workbook.save(path)?;
    Ok(())
}

/// Human-readable summary of one record.
pub fn format_record_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();
    let labels = ["File", "Invoice number", "Issue date", "Buyer", "Items", "Total", "Status"];

    for (label, value) in labels.iter().zip(record.to_row()) {
        let value = if value.is_empty() { "-".to_string() } else { value };
        output.push_str(&format!("{:<15} {}\n", format!("{}:", label), value));
    }

    output
}
