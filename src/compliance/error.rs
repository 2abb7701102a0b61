/// Error types for loading and querying compliance data
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Cannot read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid component file `{}`: {reason}", .path.display())]
    Yaml { path: PathBuf, reason: String },

    #[error("Duplicate component key `{0}`")]
    DuplicateComponent(String),

    #[error("Invalid narrative key `{key}`: {reason}")]
    InvalidKey { key: String, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, DataError>;
