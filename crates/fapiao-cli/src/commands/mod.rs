//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use fapiao_core::models::config::FapiaoConfig;
use fapiao_core::{BatchProcessor, DocumentPipeline, PureOcrEngine, Recognizer};

/// Extensions accepted as invoice documents.
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["pdf", "png", "jpg", "jpeg", "tif", "tiff", "bmp"];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fapiao")
        .join("config.json")
}

/// Load the config given on the command line, else the user config file,
/// else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FapiaoConfig> {
    if let Some(path) = config_path {
        return Ok(FapiaoConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(FapiaoConfig::from_file(&default_path)?)
    } else {
        Ok(FapiaoConfig::default())
    }
}

/// Load the OCR engine once. Missing or broken models only disable OCR.
fn load_recognizer(
    config: &FapiaoConfig,
    model_dir: Option<&Path>,
) -> Option<Arc<dyn Recognizer + Send + Sync>> {
    let model_dir = model_dir.unwrap_or(&config.ocr.model_dir);

    if !config.ocr.models_present(model_dir) {
        warn!(
            "OCR models not found in {}, only native PDF text will be used",
            model_dir.display()
        );
        return None;
    }

    match PureOcrEngine::from_dir(model_dir, &config.ocr) {
        Ok(engine) => Some(Arc::new(engine)),
        Err(e) => {
            warn!("Failed to load OCR models: {}", e);
            None
        }
    }
}

/// Build the batch processor shared by `process` and `batch`.
pub fn build_processor(
    config: &FapiaoConfig,
    model_dir: Option<&Path>,
    text_only: bool,
) -> BatchProcessor {
    let recognizer = if text_only {
        None
    } else {
        load_recognizer(config, model_dir)
    };

    let pipeline = DocumentPipeline::from_config(config, recognizer);
    BatchProcessor::new(Arc::new(pipeline)).with_timeout(config.batch.document_timeout())
}

/// File name used as the record's source name.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported(Path::new("a.pdf")));
        assert!(is_supported(Path::new("scan.JPG")));
        assert!(is_supported(Path::new("dir/scan.tiff")));
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("README")));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/tmp/in/发票1.pdf")), "发票1.pdf");
    }
}
