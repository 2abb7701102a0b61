/// Error types for template parsing and execution.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// Syntax error in the template text
    #[error("Template parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Missing field, unknown value type or failing function during rendering
    #[error("Template execution error: {0}")]
    Exec(String),
}

impl TemplateError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        TemplateError::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn exec(line: usize, message: impl std::fmt::Display) -> Self {
        TemplateError::Exec(format!("line {line}: {message}"))
    }
}

pub type Result<T> = std::result::Result<T, TemplateError>;
