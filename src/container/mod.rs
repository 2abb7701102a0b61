//! Zip-structured document containers.
//!
//! This module opens a container, exposes its body part as text and writes a
//! new container in which only the body part differs from the source:
//!
//! - `package`: the `.docx` implementation (`DocxDocument`)
//! - `part`: archive entries as opaque, named blobs
//! - `registry`: extension-based format dispatch
//!
//! Nothing here logs or touches the filesystem outside `open` and `write`.

pub mod constants;
pub mod error;
pub mod package;
pub mod part;
pub mod registry;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types
pub use constants::BODY_PART;
pub use error::ContainerError;
pub use package::DocxDocument;
pub use part::ContainerPart;
pub use registry::{DocumentFormat, FormatRegistry, TemplateDocument};
