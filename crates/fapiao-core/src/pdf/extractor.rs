//! PDF text layer and page image extraction using lopdf and pdf-extract.

use image::DynamicImage;
use lopdf::Document;
use tracing::{debug, warn};

use super::images;
use crate::acquisition::{NativeTextExtractor, PageRenderer};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Stateless PDF collaborator. Plain image files (PNG, JPEG, TIFF…) are
/// accepted too and treated as a single page without a text layer.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    max_pages: usize,
}

/// A parsed PDF plus the (possibly decrypted) bytes pdf-extract reads.
struct LoadedPdf {
    document: Document,
    data: Vec<u8>,
}

impl PdfExtractor {
    /// `max_pages` limits how many pages are read (0 = unlimited).
    pub fn new(max_pages: usize) -> Self {
        Self { max_pages }
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self::new(config.max_pages)
    }

    fn load(&self, data: &[u8]) -> Result<LoadedPdf, PdfError> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        if document.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        Ok(LoadedPdf { document, data })
    }

    fn limit<T>(&self, mut pages: Vec<T>) -> Vec<T> {
        if self.max_pages > 0 {
            pages.truncate(self.max_pages);
        }
        pages
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::from_config(&PdfConfig::default())
    }
}

/// Whether the bytes are a raster image rather than a PDF.
fn is_image_file(data: &[u8]) -> bool {
    image::guess_format(data).is_ok()
}

impl NativeTextExtractor for PdfExtractor {
    fn extract_pages(&self, document: &[u8]) -> Result<Vec<String>, PdfError> {
        if is_image_file(document) {
            debug!("image file has no text layer");
            return Ok(vec![String::new()]);
        }

        let pdf = self.load(document)?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&pdf.data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        debug!(pages = pages.len(), "extracted PDF text layer");
        Ok(self.limit(pages))
    }
}

impl PageRenderer for PdfExtractor {
    fn render_pages(&self, document: &[u8]) -> Result<Vec<DynamicImage>, PdfError> {
        if is_image_file(document) {
            let page = image::load_from_memory(document)
                .map_err(|e| PdfError::ImageExtraction(e.to_string()))?;
            return Ok(vec![page]);
        }

        let pdf = self.load(document)?;
        let doc = &pdf.document;

        let mut pages = Vec::new();
        for (number, page_id) in doc.get_pages() {
            if self.max_pages > 0 && pages.len() >= self.max_pages {
                break;
            }
            match images::largest_page_image(doc, page_id) {
                Some(image) => pages.push(image),
                None => debug!(page = number, "no decodable image on page"),
            }
        }

        if pages.is_empty() {
            warn!("no page images found, scanning all objects");
            pages = self.limit(images::all_images(doc));
        }

        if pages.is_empty() {
            return Err(PdfError::ImageExtraction("no images found in PDF".to_string()));
        }

        debug!(pages = pages.len(), "rendered page images");
        Ok(pages)
    }
}
