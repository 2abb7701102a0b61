//! Unified error types for doc-template.
//!
//! Each layer keeps its own error enum (`ContainerError`, `TemplateError`,
//! `DataError`); this module folds them into one type for callers that drive
//! the whole pipeline.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, ErrorKind, Result};
