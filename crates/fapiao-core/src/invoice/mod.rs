//! Invoice field extraction and validation.

mod engine;
pub mod rules;
mod validator;

pub use engine::FieldExtractionEngine;
pub use validator::RecordValidator;
