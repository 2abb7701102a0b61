//! Open, template and write one document.

use crate::common::{CancelFlag, Error, Result};
use crate::container::{FormatRegistry, TemplateDocument};
use crate::template::{FuncMap, Template, normalize};
use log::debug;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A container whose body is being turned into a template.
///
/// The body is normalized when the document is opened and kept as the
/// template text; rendering never replaces it. Bind functions with
/// [`funcs`](Self::funcs), then [`parse`](Self::parse) and
/// [`execute`](Self::execute); [`close`](Self::close) releases the archive.
///
/// Action output is XML-escaped, since it lands in `word/document.xml`.
pub struct DocTemplate {
    source: PathBuf,
    document: Box<dyn TemplateDocument>,
    body: String,
    funcs: FuncMap,
    template: Option<Template>,
    cancel: CancelFlag,
}

impl DocTemplate {
    /// Open `path` with the default format registry.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(&FormatRegistry::default(), path, CancelFlag::new())
    }

    /// Open `path` through `registry`; `cancel` also governs the later write.
    pub fn open_with(registry: &FormatRegistry, path: impl AsRef<Path>, cancel: CancelFlag) -> Result<Self> {
        let source = path.as_ref().to_path_buf();
        let document = registry.open(&source, &cancel)?;
        let body = normalize(document.content()?);
        debug!("opened {} as {:?}", source.display(), document.format());

        Ok(Self {
            source,
            document,
            body,
            funcs: FuncMap::new(),
            template: None,
            cancel,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Normalized body text, before rendering.
    pub fn content(&self) -> &str {
        &self.body
    }

    /// Bind `funcs` for the next [`parse`](Self::parse). A template parsed
    /// earlier is dropped, so the next `execute` sees the new bindings.
    pub fn funcs(&mut self, funcs: FuncMap) -> &mut Self {
        self.funcs.extend(funcs);
        self.template = None;
        self
    }

    /// Parse the body against the bound functions.
    pub fn parse(&mut self) -> Result<&Template> {
        let name = self.source.display().to_string();
        let template = Template::builder(name)
            .funcs(self.funcs.clone())
            .escape_xml(true)
            .parse(&self.body)?;
        debug!("parsed template {}", template.name());
        Ok(self.template.insert(template))
    }

    /// Render with `context` and write the result to `dest`.
    ///
    /// Parses first if [`parse`](Self::parse) has not been called. A failed
    /// write leaves the document usable, so `execute` may be retried.
    pub fn execute<T: Serialize + ?Sized>(&mut self, dest: impl AsRef<Path>, context: &T) -> Result<()> {
        let dest = dest.as_ref();
        let rendered = match &self.template {
            Some(template) => template.execute(context)?,
            None => self.parse()?.execute(context)?,
        };
        self.document.set_content(rendered)?;
        self.document.write_with_cancel(dest, &self.cancel)?;
        debug!("wrote {}", dest.display());
        Ok(())
    }

    /// Release the archive. Calling it twice returns a `Closed` error.
    pub fn close(&mut self) -> Result<()> {
        self.document.close().map_err(Error::from)
    }
}

impl std::fmt::Debug for DocTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocTemplate")
            .field("source", &self.source)
            .field("format", &self.document.format())
            .field("funcs", &self.funcs)
            .field("parsed", &self.template.is_some())
            .finish()
    }
}
