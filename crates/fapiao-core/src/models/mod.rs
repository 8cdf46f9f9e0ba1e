//! Data models and configuration.

pub mod config;
pub mod invoice;
pub mod text;
