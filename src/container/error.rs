/// Error types for container operations
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("Cannot open file `{}`: {reason}", .path.display())]
    FileOpen { path: PathBuf, reason: String },

    #[error("Cannot read part `{part}` of `{}`: {reason}", .path.display())]
    Read {
        path: PathBuf,
        part: String,
        reason: String,
    },

    #[error("Part `{part}` of `{}` has no content", .path.display())]
    EmptyContent { path: PathBuf, part: String },

    #[error("Cannot write file `{}`: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },

    #[error("Unsupported document type `{extension}` for `{}`", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Document has been closed")]
    Closed,

    #[error("Operation cancelled")]
    Cancelled,
}

impl ContainerError {
    pub(crate) fn file_open(path: &Path, reason: impl ToString) -> Self {
        ContainerError::FileOpen {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn read(path: &Path, part: &str, reason: impl ToString) -> Self {
        ContainerError::Read {
            path: path.to_path_buf(),
            part: part.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, reason: impl ToString) -> Self {
        ContainerError::Write {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ContainerError>;
