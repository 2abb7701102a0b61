//! Format dispatch by file extension.
//!
//! A [`FormatRegistry`] maps extensions to a [`DocumentFormat`] discriminant.
//! Each discriminant knows how to open its concrete document type; new
//! extensions are added by registering them against an existing format.

use crate::common::CancelFlag;
use crate::container::error::{ContainerError, Result};
use crate::container::package::DocxDocument;
use std::collections::HashMap;
use std::path::Path;

/// Capabilities every templatable container provides.
pub trait TemplateDocument {
    /// The format this document was opened as.
    fn format(&self) -> DocumentFormat;

    /// Current body text.
    fn content(&self) -> Result<&str>;

    /// Replace the body text in memory.
    fn set_content(&mut self, content: String) -> Result<()>;

    /// Write a new container to `dest`, aborting when `cancel` is raised.
    fn write_with_cancel(&mut self, dest: &Path, cancel: &CancelFlag) -> Result<()>;

    /// Write a new container to `dest`.
    fn write(&mut self, dest: &Path) -> Result<()> {
        self.write_with_cancel(dest, &CancelFlag::new())
    }

    /// Release the underlying archive.
    fn close(&mut self) -> Result<()>;
}

/// Container formats with a templating implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// WordprocessingML (.docx); the body part is `word/document.xml`
    Docx,
}

impl DocumentFormat {
    /// Open `path` as this format.
    pub fn open(self, path: &Path, cancel: &CancelFlag) -> Result<Box<dyn TemplateDocument>> {
        match self {
            DocumentFormat::Docx => Ok(Box::new(DocxDocument::open_with_cancel(path, cancel)?)),
        }
    }

    /// Extensions registered for this format by default.
    pub fn default_extensions(self) -> &'static [&'static str] {
        match self {
            DocumentFormat::Docx => &["docx"],
        }
    }
}

/// Extension-to-format table consulted before any file is touched.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    formats: HashMap<String, DocumentFormat>,
}

impl FormatRegistry {
    /// A registry with no formats; every path is rejected.
    pub fn empty() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    /// Map `extension` (without the dot, case-insensitive) to `format`.
    pub fn register(&mut self, extension: &str, format: DocumentFormat) -> &mut Self {
        self.formats
            .insert(extension.trim_start_matches('.').to_ascii_lowercase(), format);
        self
    }

    /// Resolve the format for `path` from its extension.
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` when the extension is missing or unregistered.
    pub fn resolve(&self, path: &Path) -> Result<DocumentFormat> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        self.formats
            .get(&extension)
            .copied()
            .ok_or_else(|| ContainerError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            })
    }

    /// Resolve and open `path`.
    pub fn open(&self, path: &Path, cancel: &CancelFlag) -> Result<Box<dyn TemplateDocument>> {
        self.resolve(path)?.open(path, cancel)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for ext in DocumentFormat::Docx.default_extensions() {
            registry.register(ext, DocumentFormat::Docx);
        }
        registry
    }
}
