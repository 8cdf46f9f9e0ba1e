//! Text acquisition: native text layer first, OCR when it is not enough.

mod classifier;

pub use classifier::{TextSource, TextSourceClassifier};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::{AcquisitionError, OcrError, PdfError};
use crate::models::config::AcquisitionConfig;
use crate::models::text::RawText;

/// Reads the embedded text layer of a document, one string per page.
pub trait NativeTextExtractor {
    fn extract_pages(&self, document: &[u8]) -> Result<Vec<String>, PdfError>;
}

/// Turns a document into page images for OCR.
pub trait PageRenderer {
    fn render_pages(&self, document: &[u8]) -> Result<Vec<DynamicImage>, PdfError>;
}

/// Recognizes text lines on a page image, in reading order.
pub trait Recognizer {
    fn recognize(&self, page: &DynamicImage) -> Result<Vec<String>, OcrError>;
}

/// Text recovered from one document, with how it was obtained.
#[derive(Debug, Clone)]
pub struct AcquiredText {
    pub text: RawText,
    pub source: TextSource,
    /// Non-whitespace characters from the native text layer.
    pub native_chars: usize,
    /// Whether the OCR path ran.
    pub ocr_used: bool,
}

/// Produces one merged [`RawText`] per document.
///
/// Native text is always extracted. OCR output is appended after it when
/// the native text is too short, or when the document looks image-based.
/// Collaborator errors are logged and treated as "no text from that source".
pub struct TextAcquisition {
    native: Arc<dyn NativeTextExtractor + Send + Sync>,
    renderer: Arc<dyn PageRenderer + Send + Sync>,
    recognizer: Option<Arc<dyn Recognizer + Send + Sync>>,
    classifier: TextSourceClassifier,
    config: AcquisitionConfig,
}

impl TextAcquisition {
    pub fn new(
        native: Arc<dyn NativeTextExtractor + Send + Sync>,
        renderer: Arc<dyn PageRenderer + Send + Sync>,
        config: &AcquisitionConfig,
    ) -> Self {
        Self {
            native,
            renderer,
            recognizer: None,
            classifier: TextSourceClassifier::from_config(config),
            config: config.clone(),
        }
    }

    /// Enable the OCR path.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn Recognizer + Send + Sync>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn has_recognizer(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Recover text from a document.
    ///
    /// Fails only with [`AcquisitionError::NoTextExtracted`], when neither
    /// source produced any text.
    pub fn acquire(&self, document: &[u8]) -> Result<AcquiredText, AcquisitionError> {
        self.acquire_with_cancel(document, &AtomicBool::new(false))
    }

    /// Like [`acquire`](Self::acquire), but OCR stops before the next page
    /// once `cancelled` is set. Pages already recognized are kept.
    pub fn acquire_with_cancel(
        &self,
        document: &[u8],
        cancelled: &AtomicBool,
    ) -> Result<AcquiredText, AcquisitionError> {
        let start = Instant::now();

        let pages = self.native.extract_pages(document).unwrap_or_else(|e| {
            warn!(error = %e, "native text extraction failed");
            Vec::new()
        });
        let source = self
            .classifier
            .classify_first_page(pages.first().map(String::as_str));

        let mut text = RawText::new();
        for page in pages.iter().filter(|page| !page.trim().is_empty()) {
            text.push_block(page);
        }
        let native_chars = text.char_count();

        let needs_ocr = native_chars < self.config.min_native_chars
            || (source == TextSource::ImageBased && self.config.ocr_when_image_based);

        debug!(
            ?source,
            pages = pages.len(),
            native_chars,
            needs_ocr,
            "native text extracted"
        );

        let mut ocr_used = false;
        if needs_ocr {
            match &self.recognizer {
                Some(recognizer) => {
                    text.extend_lines(self.ocr_document(recognizer.as_ref(), document, cancelled));
                    ocr_used = true;
                }
                None => debug!("no recognizer configured, skipping OCR"),
            }
        }

        if text.is_blank() {
            return Err(AcquisitionError::NoTextExtracted);
        }

        debug!(
            chars = text.char_count(),
            ocr_used,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "text acquired"
        );

        Ok(AcquiredText {
            text,
            source,
            native_chars,
            ocr_used,
        })
    }

    /// OCR every renderable page. Pages that keep failing are skipped.
    fn ocr_document(
        &self,
        recognizer: &dyn Recognizer,
        document: &[u8],
        cancelled: &AtomicBool,
    ) -> Vec<String> {
        let pages = self.renderer.render_pages(document).unwrap_or_else(|e| {
            warn!(error = %e, "page rendering failed, no OCR text");
            Vec::new()
        });

        let mut lines = Vec::new();
        for (index, page) in pages.iter().enumerate() {
            if cancelled.load(Ordering::Relaxed) {
                debug!(page = index + 1, "cancelled, skipping remaining pages");
                break;
            }
            if let Some(page_lines) = self.recognize_page(recognizer, page, index + 1) {
                lines.extend(page_lines);
            }
        }
        lines
    }

    fn recognize_page(
        &self,
        recognizer: &dyn Recognizer,
        page: &DynamicImage,
        page_number: usize,
    ) -> Option<Vec<String>> {
        let attempts = self.config.ocr_retries + 1;
        for attempt in 1..=attempts {
            match recognizer.recognize(page) {
                Ok(lines) => return Some(lines),
                Err(e) => warn!(page = page_number, attempt, attempts, error = %e, "page OCR failed"),
            }
        }
        None
    }
}
