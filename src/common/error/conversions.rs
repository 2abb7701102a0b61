//! Classification of unified errors by failing stage.

use super::types::{Error, ErrorKind};
use crate::container::ContainerError;
use crate::template::TemplateError;

impl Error {
    /// The pipeline stage this error originated from.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Container(err) => err.kind(),
            Error::Template(TemplateError::Parse { .. }) => ErrorKind::TemplateParse,
            Error::Template(TemplateError::Exec(_)) => ErrorKind::TemplateExec,
            Error::Data(_) => ErrorKind::Data,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

impl ContainerError {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            ContainerError::FileOpen { .. } => ErrorKind::FileOpen,
            ContainerError::Read { .. } => ErrorKind::Read,
            ContainerError::EmptyContent { .. } => ErrorKind::EmptyContent,
            ContainerError::Write { .. } => ErrorKind::Write,
            ContainerError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            ContainerError::Closed => ErrorKind::Closed,
            ContainerError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_kind_follows_wrapped_error() {
        let err = Error::from(ContainerError::EmptyContent {
            path: PathBuf::from("empty.docx"),
            part: "word/document.xml".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::EmptyContent);

        let err = Error::from(TemplateError::Exec("boom".to_string()));
        assert_eq!(err.kind(), ErrorKind::TemplateExec);

        assert_eq!(Error::Config("no template".into()).kind(), ErrorKind::Config);
    }
}
