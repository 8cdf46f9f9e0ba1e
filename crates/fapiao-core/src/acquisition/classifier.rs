//! Text-based vs image-based document classification.

use serde::{Deserialize, Serialize};

use crate::models::config::AcquisitionConfig;

/// Where a document's text is expected to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// The first page carries a usable native text layer.
    TextBased,
    /// The first page is (most likely) a scan.
    ImageBased,
}

/// Decides whether a document is text-based or image-based from its first page.
///
/// Classification never rejects a document. Any extraction error counts as
/// image-based so that the OCR path gets a chance.
#[derive(Debug, Clone)]
pub struct TextSourceClassifier {
    threshold: usize,
}

impl TextSourceClassifier {
    /// `threshold` is the minimum number of characters (not bytes) on the
    /// first page for a text-based verdict.
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &AcquisitionConfig) -> Self {
        Self::new(config.image_text_threshold)
    }

    /// Classify from the first page of the native text layer. `None` means
    /// the document has no pages or its text layer could not be read.
    pub fn classify_first_page(&self, first_page: Option<&str>) -> TextSource {
        let chars = first_page.map_or(0, |text| text.trim().chars().count());
        if chars < self.threshold {
            TextSource::ImageBased
        } else {
            TextSource::TextBased
        }
    }
}

impl Default for TextSourceClassifier {
    fn default() -> Self {
        Self::from_config(&AcquisitionConfig::default())
    }
}
