//! Common types and utilities shared across the container, template and
//! export layers.

// Submodule declarations
pub mod cancel;
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use cancel::CancelFlag;
pub use error::{Error, ErrorKind, Result};
