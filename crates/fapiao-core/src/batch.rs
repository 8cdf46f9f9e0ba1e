//! Per-document pipeline and sequential batch processing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinError;
use tracing::{info, warn};

use crate::acquisition::{Recognizer, TextAcquisition};
use crate::error::AcquisitionError;
use crate::invoice::{FieldExtractionEngine, RecordValidator};
use crate::models::config::FapiaoConfig;
use crate::models::invoice::InvoiceRecord;
use crate::pdf::PdfExtractor;

/// A named document to process.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Progress reported after each document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub current_name: String,
}

/// Acquisition, extraction and validation for a single document.
pub struct DocumentPipeline {
    acquisition: TextAcquisition,
    engine: FieldExtractionEngine,
}

impl DocumentPipeline {
    pub fn new(acquisition: TextAcquisition, engine: FieldExtractionEngine) -> Self {
        Self { acquisition, engine }
    }

    /// Pipeline reading documents with [`PdfExtractor`], with OCR when a
    /// recognizer is given.
    pub fn from_config(
        config: &FapiaoConfig,
        recognizer: Option<Arc<dyn Recognizer + Send + Sync>>,
    ) -> Self {
        let pdf = Arc::new(PdfExtractor::from_config(&config.pdf));
        let mut acquisition = TextAcquisition::new(pdf.clone(), pdf, &config.acquisition);
        if let Some(recognizer) = recognizer {
            acquisition = acquisition.with_recognizer(recognizer);
        }
        Self::new(acquisition, FieldExtractionEngine::new(&config.extraction))
    }

    /// Process one document. Always yields a record.
    pub fn process(&self, name: &str, bytes: &[u8]) -> InvoiceRecord {
        self.process_with_cancel(name, bytes, &AtomicBool::new(false))
    }

    /// Like [`process`](Self::process), stopping OCR early once `cancelled` is set.
    pub fn process_with_cancel(
        &self,
        name: &str,
        bytes: &[u8],
        cancelled: &AtomicBool,
    ) -> InvoiceRecord {
        info!(file = name, "processing document");

        let acquired = match self.acquisition.acquire_with_cancel(bytes, cancelled) {
            Ok(acquired) => acquired,
            Err(e) => {
                warn!(file = name, error = %e, "no text recovered");
                return InvoiceRecord::failed(name, e);
            }
        };

        let mut record = InvoiceRecord::new(name);
        self.engine.populate(&mut record, &acquired.text);
        RecordValidator::apply(&mut record);

        info!(
            file = name,
            source = ?acquired.source,
            ocr = acquired.ocr_used,
            status = %record.status,
            "document processed"
        );
        record
    }
}

/// Runs documents one at a time, in input order, each isolated on the
/// blocking pool and bounded by an optional time limit.
pub struct BatchProcessor {
    pipeline: Arc<DocumentPipeline>,
    timeout: Option<Duration>,
}

impl BatchProcessor {
    pub fn new(pipeline: Arc<DocumentPipeline>) -> Self {
        Self {
            pipeline,
            timeout: None,
        }
    }

    /// Limit the time spent on each document (`None` = unlimited).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Process all documents, returning exactly one record per document in
    /// input order. `on_progress` is called after each document.
    pub async fn process_batch(
        &self,
        documents: Vec<Document>,
        mut on_progress: impl FnMut(&BatchProgress),
    ) -> Vec<InvoiceRecord> {
        let total = documents.len();
        let mut records = Vec::with_capacity(total);

        for (index, document) in documents.into_iter().enumerate() {
            let name = document.name.clone();
            records.push(self.process_one(document).await);

            on_progress(&BatchProgress {
                completed: index + 1,
                total,
                current_name: name,
            });
        }

        let failed = records.iter().filter(|r| r.status.is_failed()).count();
        info!(total, failed, "batch complete");
        records
    }

    async fn process_one(&self, document: Document) -> InvoiceRecord {
        let name = document.name.clone();
        let pipeline = Arc::clone(&self.pipeline);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let task = tokio::task::spawn_blocking(move || {
            pipeline.process_with_cancel(&document.name, &document.bytes, &flag)
        });

        let Some(limit) = self.timeout else {
            return joined(&name, task.await);
        };

        match tokio::time::timeout(limit, task).await {
            Ok(result) => joined(&name, result),
            Err(_) => {
                // The blocking task cannot be aborted; stop it at the next OCR page
                // so it releases the recognizer for the following documents
                cancelled.store(true, Ordering::Relaxed);
                warn!(file = %name, ?limit, "document timed out");
                InvoiceRecord::failed(name, AcquisitionError::Timeout(limit))
            }
        }
    }
}

fn joined(name: &str, result: Result<InvoiceRecord, JoinError>) -> InvoiceRecord {
    result.unwrap_or_else(|e| {
        warn!(file = name, error = %e, "document pipeline aborted");
        InvoiceRecord::failed(name, AcquisitionError::Aborted(e.to_string()))
    })
}
