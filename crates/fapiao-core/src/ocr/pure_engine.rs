//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::acquisition::Recognizer;
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Height of a reading-order row, in pixels.
const ROW_HEIGHT: f64 = 20.0;

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
///
/// Loading the models is expensive, so create one engine per process and
/// share it behind an `Arc`.
pub struct PureOcrEngine {
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Load detection, recognition and dictionary files from `model_dir`.
    pub fn from_dir(model_dir: &Path, config: &OcrConfig) -> Result<Self, OcrError> {
        let det_path = model_dir.join(&config.detection_model);
        let rec_path = model_dir.join(&config.recognition_model);
        let dict_path = model_dir.join(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!("missing {}", path.display())));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine: Mutex::new(engine),
            keep_unk: config.keep_unk,
        })
    }

    /// Recognize text lines on an image, top to bottom and left to right.
    pub fn read_lines(&self, image: &DynamicImage) -> Result<Vec<String>, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        let start = Instant::now();
        let results = {
            let engine = self
                .engine
                .lock()
                .map_err(|_| OcrError::Recognition("engine lock poisoned".to_string()))?;
            engine
                .run_from_image(image)
                .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?
        };

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let mut regions: Vec<((i64, f64), String)> = results
            .iter()
            .map(|r| {
                let text = if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", "")
                };
                (reading_position(&r.bounding_box), text)
            })
            .filter(|(_, text)| !text.trim().is_empty())
            .collect();

        regions.sort_by(|(a, _), (b, _)| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

        debug!(
            "OCR complete: {} lines from {}x{} in {}ms",
            regions.len(),
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(regions.into_iter().map(|(_, text)| text).collect())
    }
}

impl Recognizer for PureOcrEngine {
    fn recognize(&self, page: &DynamicImage) -> Result<Vec<String>, OcrError> {
        self.read_lines(page)
    }
}

/// Row bucket and left edge of a detected region.
fn reading_position(polygon: &pure_onnx_ocr::Polygon<f64>) -> (i64, f64) {
    let (min_x, min_y) = polygon
        .exterior()
        .coords()
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)));
    ((min_y / ROW_HEIGHT) as i64, min_x)
}
