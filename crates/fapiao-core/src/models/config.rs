//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FapiaoError, Result};

/// Main configuration for the fapiao pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FapiaoConfig {
    /// Text acquisition (native layer vs OCR) configuration.
    pub acquisition: AcquisitionConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Batch orchestration configuration.
    pub batch: BatchConfig,
}

/// Text acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// First-page text shorter than this (in characters) marks a document image-based.
    pub image_text_threshold: usize,

    /// Merged native text shorter than this (in characters) triggers OCR.
    pub min_native_chars: usize,

    /// Always run OCR when the classifier flagged the document image-based.
    pub ocr_when_image_based: bool,

    /// Extra attempts for a failing per-page OCR call.
    pub ocr_retries: u32,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            image_text_threshold: 10,
            min_native_chars: 50,
            ocr_when_image_based: true,
            ocr_retries: 1,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Shortest accepted invoice number, in digits.
    pub invoice_number_min_digits: usize,

    /// Longest accepted invoice number, in digits.
    pub invoice_number_max_digits: usize,

    /// Maximum number of line items kept per invoice.
    pub max_line_items: usize,
}

impl ExtractionConfig {
    /// Only accept the 18-digit numbers printed on fully digital invoices.
    pub fn strict() -> Self {
        Self {
            invoice_number_min_digits: 18,
            invoice_number_max_digits: 18,
            ..Self::default()
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            invoice_number_min_digits: 8,
            invoice_number_max_digits: 20,
            max_line_items: 5,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read per document (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { max_pages: 0 }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "ch_rec.onnx".to_string(),
            dictionary: "ch_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Check that all model files exist under `model_dir`.
    pub fn models_present(&self, model_dir: &Path) -> bool {
        [&self.detection_model, &self.recognition_model, &self.dictionary]
            .iter()
            .all(|name| model_dir.join(name).exists())
    }
}

/// Batch orchestration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Per-document time limit in seconds (0 = unlimited).
    pub document_timeout_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            document_timeout_secs: 120,
        }
    }
}

impl BatchConfig {
    /// The per-document time limit, if any.
    pub fn document_timeout(&self) -> Option<Duration> {
        (self.document_timeout_secs > 0).then(|| Duration::from_secs(self.document_timeout_secs))
    }
}

impl FapiaoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| FapiaoError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| FapiaoError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}
