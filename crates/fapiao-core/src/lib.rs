//! Core library for Chinese VAT invoice (发票) field extraction.
//!
//! This crate provides:
//! - Text acquisition from PDFs and scans (native text layer, OCR fallback)
//! - Rule-based extraction of invoice number, issue date, buyer, line items and total
//! - Per-document completeness validation
//! - Sequential batch processing with per-document isolation and time limits

pub mod acquisition;
pub mod batch;
pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;

pub use acquisition::{
    AcquiredText, NativeTextExtractor, PageRenderer, Recognizer, TextAcquisition, TextSource,
    TextSourceClassifier,
};
pub use batch::{BatchProcessor, BatchProgress, Document, DocumentPipeline};
pub use error::{AcquisitionError, FapiaoError, OcrError, PdfError, Result};
pub use invoice::{FieldExtractionEngine, RecordValidator};
pub use models::config::FapiaoConfig;
pub use models::invoice::{InvoiceRecord, MandatoryField, RecordStatus};
pub use models::text::RawText;
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pdf::PdfExtractor;
