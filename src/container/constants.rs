//! Well-known part names inside WordprocessingML containers.

/// The body part: the only part rewritten when a template is rendered.
pub const BODY_PART: &str = "word/document.xml";

/// Placeholder reported in errors that concern the archive as a whole.
pub(crate) const CENTRAL_DIRECTORY: &str = "<central directory>";
