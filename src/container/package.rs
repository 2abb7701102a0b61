//! Word (.docx) container opened for templating.
//!
//! The source archive is read into memory once at `open`. Writing produces a
//! new archive in which every part except the body is raw-copied from the
//! source (compressed bytes, CRC and timestamps untouched) and the body part
//! is re-encoded from the current document text.

use crate::common::CancelFlag;
use crate::container::constants::{BODY_PART, CENTRAL_DIRECTORY};
use crate::container::error::{ContainerError, Result};
use crate::container::part::ContainerPart;
use crate::container::registry::{DocumentFormat, TemplateDocument};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

type SourceArchive = ZipArchive<Cursor<Vec<u8>>>;

/// An open Word document whose body part can be rewritten.
///
/// # Examples
///
/// ```rust,no_run
/// use doc_template::container::DocxDocument;
///
/// let mut doc = DocxDocument::open("template.docx")?;
/// let body = doc.content()?.replace("DRAFT", "FINAL");
/// doc.set_content(body)?;
/// doc.write("report.docx")?;
/// doc.close()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct DocxDocument {
    path: PathBuf,
    /// Source archive; `None` once the document has been closed
    archive: Option<SourceArchive>,
    /// Entries in source archive order
    parts: Vec<ContainerPart>,
    body_text: String,
}

impl DocxDocument {
    /// Open the archive at `path` and decode its body part.
    ///
    /// # Errors
    ///
    /// - `FileOpen` if the file cannot be read or is not a ZIP archive
    /// - `Read` if `word/document.xml` is missing or is not UTF-8
    /// - `EmptyContent` if the body part decodes to an empty string
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_cancel(path, &CancelFlag::new())
    }

    /// Like [`open`](Self::open), checking `cancel` between entries.
    pub fn open_with_cancel<P: AsRef<Path>>(path: P, cancel: &CancelFlag) -> Result<Self> {
        let path = path.as_ref();
        check_cancelled(cancel)?;
        let data = std::fs::read(path).map_err(|e| ContainerError::file_open(path, e))?;
        Self::from_bytes(path, data, cancel)
    }

    fn from_bytes(path: &Path, data: Vec<u8>, cancel: &CancelFlag) -> Result<Self> {
        let mut archive =
            ZipArchive::new(Cursor::new(data)).map_err(|e| ContainerError::file_open(path, e))?;

        let mut parts = Vec::with_capacity(archive.len());
        let mut body_index = None;
        for index in 0..archive.len() {
            check_cancelled(cancel)?;
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| ContainerError::read(path, CENTRAL_DIRECTORY, e))?;
            let name = entry.name().to_string();
            // Only the first entry with the body name is the body
            let is_body = body_index.is_none() && name == BODY_PART;
            if is_body {
                body_index = Some(index);
            }
            parts.push(ContainerPart::new(name, index, entry.compression(), is_body));
        }

        let body_index = body_index
            .ok_or_else(|| ContainerError::read(path, BODY_PART, "part not found in archive"))?;
        let body_text = read_body(&mut archive, body_index, path)?;
        if body_text.is_empty() {
            return Err(ContainerError::EmptyContent {
                path: path.to_path_buf(),
                part: BODY_PART.to_string(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            archive: Some(archive),
            parts,
            body_text,
        })
    }

    /// Path the document was opened from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current body text.
    pub fn content(&self) -> Result<&str> {
        self.ensure_open()?;
        Ok(&self.body_text)
    }

    /// Replace the body text. Nothing touches disk until [`write`](Self::write).
    pub fn set_content(&mut self, content: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        self.body_text = content.into();
        Ok(())
    }

    /// Entries of the source archive, in archive order.
    pub fn parts(&self) -> &[ContainerPart] {
        &self.parts
    }

    /// Decompressed bytes of a part as stored in the source archive.
    pub fn part_bytes(&mut self, name: &str) -> Result<Vec<u8>> {
        let archive = self.archive.as_mut().ok_or(ContainerError::Closed)?;
        let mut entry = archive
            .by_name(name)
            .map_err(|e| ContainerError::read(&self.path, name, e))?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| ContainerError::read(&self.path, name, e))?;
        Ok(bytes)
    }

    /// Write a new archive to `dest` with the body replaced by the current text.
    ///
    /// The archive is assembled in memory, written to a temporary file next to
    /// `dest` and renamed into place. On failure no file appears at `dest` and
    /// the document stays usable, so the write can be retried elsewhere.
    pub fn write<P: AsRef<Path>>(&mut self, dest: P) -> Result<()> {
        self.write_with_cancel(dest, &CancelFlag::new())
    }

    /// Like [`write`](Self::write), checking `cancel` between entries and
    /// before the final rename.
    pub fn write_with_cancel<P: AsRef<Path>>(&mut self, dest: P, cancel: &CancelFlag) -> Result<()> {
        let dest = dest.as_ref();
        let archive = self.archive.as_mut().ok_or(ContainerError::Closed)?;
        let bytes = assemble(archive, &self.parts, &self.body_text, &self.path, dest, cancel)?;
        persist(dest, &bytes, cancel)
    }

    /// Release the source archive. Any later call returns `Closed`.
    pub fn close(&mut self) -> Result<()> {
        self.archive.take().map(drop).ok_or(ContainerError::Closed)
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.archive.is_none()
    }

    #[inline]
    fn ensure_open(&self) -> Result<()> {
        if self.archive.is_none() {
            return Err(ContainerError::Closed);
        }
        Ok(())
    }
}

impl TemplateDocument for DocxDocument {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn content(&self) -> Result<&str> {
        DocxDocument::content(self)
    }

    fn set_content(&mut self, content: String) -> Result<()> {
        DocxDocument::set_content(self, content)
    }

    fn write_with_cancel(&mut self, dest: &Path, cancel: &CancelFlag) -> Result<()> {
        DocxDocument::write_with_cancel(self, dest, cancel)
    }

    fn close(&mut self) -> Result<()> {
        DocxDocument::close(self)
    }
}

#[inline]
fn check_cancelled(cancel: &CancelFlag) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(ContainerError::Cancelled);
    }
    Ok(())
}

fn read_body(archive: &mut SourceArchive, index: usize, path: &Path) -> Result<String> {
    let mut entry = archive
        .by_index(index)
        .map_err(|e| ContainerError::read(path, BODY_PART, e))?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| ContainerError::read(path, BODY_PART, e))?;
    String::from_utf8(bytes).map_err(|e| ContainerError::read(path, BODY_PART, e))
}

/// Body parts keep their compression; exotic methods fall back to Deflate.
fn body_compression(method: CompressionMethod) -> CompressionMethod {
    match method {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}

fn assemble(
    archive: &mut SourceArchive,
    parts: &[ContainerPart],
    body: &str,
    source: &Path,
    dest: &Path,
    cancel: &CancelFlag,
) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for part in parts {
        check_cancelled(cancel)?;
        if part.is_body() {
            let options =
                SimpleFileOptions::default().compression_method(body_compression(part.compression()));
            writer
                .start_file(part.name(), options)
                .map_err(|e| ContainerError::write(dest, e))?;
            writer
                .write_all(body.as_bytes())
                .map_err(|e| ContainerError::write(dest, e))?;
        } else {
            let entry = archive
                .by_index_raw(part.index())
                .map_err(|e| ContainerError::read(source, part.name(), e))?;
            writer
                .raw_copy_file(entry)
                .map_err(|e| ContainerError::write(dest, e))?;
        }
    }

    let cursor = writer.finish().map_err(|e| ContainerError::write(dest, e))?;
    Ok(cursor.into_inner())
}

fn persist(dest: &Path, bytes: &[u8], cancel: &CancelFlag) -> Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Dropping the temporary on any early return deletes it
    let mut staging = tempfile::Builder::new()
        .prefix(".doc-template-")
        .suffix(".partial")
        .tempfile_in(dir)
        .map_err(|e| ContainerError::write(dest, e))?;
    staging
        .write_all(bytes)
        .map_err(|e| ContainerError::write(dest, e))?;
    staging
        .as_file()
        .sync_all()
        .map_err(|e| ContainerError::write(dest, e))?;

    check_cancelled(cancel)?;
    staging
        .persist(dest)
        .map_err(|e| ContainerError::write(dest, e.error))?;
    Ok(())
}
