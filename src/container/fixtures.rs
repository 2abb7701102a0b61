//! In-memory `.docx` fixtures for tests.

use super::constants::BODY_PART;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const PACKAGE_RELS_PART: &str = "_rels/.rels";
const WML_DOCUMENT_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

pub(crate) const STYLES_PART: &str = "word/styles.xml";
pub(crate) const IMAGE_PART: &str = "word/media/image1.png";

/// Wrap paragraph text in a minimal WordprocessingML body.
pub(crate) fn body_xml(paragraphs: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>{}</w:body></w:document>"
        ),
        paragraphs
    )
}

fn content_types() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Default Extension="png" ContentType="image/png"/>"#,
            r#"<Override PartName="/word/document.xml" ContentType="{}"/>"#,
            "</Types>"
        ),
        WML_DOCUMENT_MAIN
    )
}

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    "</Relationships>"
);

/// Build a container holding a body part with `body` plus a few opaque parts.
pub(crate) fn docx_bytes(body: &str) -> Vec<u8> {
    archive_bytes(&[
        (CONTENT_TYPES_PART, content_types().into_bytes(), CompressionMethod::Deflated),
        (PACKAGE_RELS_PART, PACKAGE_RELS.as_bytes().to_vec(), CompressionMethod::Deflated),
        (BODY_PART, body.as_bytes().to_vec(), CompressionMethod::Deflated),
        (STYLES_PART, b"<w:styles/>".to_vec(), CompressionMethod::Deflated),
        // Binary data stored uncompressed, as authoring tools do for media
        (IMAGE_PART, vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 1, 2, 255], CompressionMethod::Stored),
    ])
}

/// Build an archive from `(name, bytes, compression)` triples.
pub(crate) fn archive_bytes(entries: &[(&str, Vec<u8>, CompressionMethod)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data, method) in entries {
        let options = SimpleFileOptions::default().compression_method(*method);
        writer.start_file(*name, options).expect("start fixture entry");
        writer.write_all(data).expect("write fixture entry");
    }
    writer.finish().expect("finish fixture archive").into_inner()
}

pub(crate) fn write_docx(path: &Path, body: &str) {
    std::fs::write(path, docx_bytes(body)).expect("write fixture docx");
}

/// Every entry of an archive on disk as `(name, decompressed bytes)`, in archive order.
pub(crate) fn read_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let data = std::fs::read(path).expect("read archive");
    let mut archive = ZipArchive::new(Cursor::new(data)).expect("parse archive");
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).expect("entry");
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).expect("read entry");
            (entry.name().to_string(), bytes)
        })
        .collect()
}
