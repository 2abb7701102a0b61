//! Unified error type for the rendering pipeline.
use crate::compliance::DataError;
use crate::container::ContainerError;
use crate::template::TemplateError;
use thiserror::Error;

/// Main error type for doc-template operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Opening, reading or writing the container failed
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// Template parsing or execution failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Compliance data could not be loaded or queried
    #[error(transparent)]
    Data(#[from] DataError),

    /// Export configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of an [`Error`], naming the stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileOpen,
    Read,
    EmptyContent,
    TemplateParse,
    TemplateExec,
    Write,
    UnsupportedFormat,
    Closed,
    Cancelled,
    Data,
    Config,
}

/// Result type for doc-template operations.
pub type Result<T> = std::result::Result<T, Error>;
