//! PDF processing: native text layer and embedded page scans.

mod extractor;
mod images;

pub use extractor::PdfExtractor;
