//! Archive entries as seen by the document layer.

use zip::CompressionMethod;

/// One entry of the source archive.
///
/// Parts are opaque: their bytes are never interpreted, only copied. The
/// single part flagged as body is the one whose bytes are regenerated from
/// the document text on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPart {
    name: String,
    index: usize,
    compression: CompressionMethod,
    is_body: bool,
}

impl ContainerPart {
    pub(crate) fn new(name: String, index: usize, compression: CompressionMethod, is_body: bool) -> Self {
        Self {
            name,
            index,
            compression,
            is_body,
        }
    }

    /// Entry name, unique within the archive (e.g. `word/styles.xml`).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the entry in the source archive's central directory.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn compression(&self) -> CompressionMethod {
        self.compression
    }

    #[inline]
    pub fn is_body(&self) -> bool {
        self.is_body
    }

    /// Directory entries carry no data but are preserved for diffability.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}
