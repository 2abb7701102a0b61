//! doc-template - render Word documents from templates
//!
//! This library turns an existing `.docx` file into a report by treating its
//! body part (`word/document.xml`) as a text template. Every other part of
//! the container is copied byte for byte.
//!
//! # Features
//!
//! - **Container rewrite**: open a `.docx`, replace the body, write a new file
//!   atomically; untouched parts are raw-copied without recompression
//! - **Placeholder repair**: `{{ ... }}` spans split across runs by the
//!   authoring tool are stitched back together before parsing
//! - **Templates**: `{{.Field}}` access, pipelines, `if` / `range` / `with`
//!   blocks and bound functions
//! - **Compliance narratives**: `getAllControls "NIST-800-53@AC-2"` and
//!   related bindings backed by an OpenControl component workspace
//! - **Batch export**: independent documents rendered in parallel
//!
//! # Example - Rendering a document
//!
//! ```no_run
//! use doc_template::export::DocTemplate;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = DocTemplate::open("template.docx")?;
//! doc.execute("report.docx", &json!({"Name": "World"}))?;
//! doc.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Exporting a system security plan
//!
//! ```no_run
//! use doc_template::export::DocxConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DocxConfig::new("./opencontrols", "ssp-template.docx", "ssp.docx");
//! config.export()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `container`: zip container access and selective part replacement
//! - `template`: placeholder normalization, parsing and execution
//! - `compliance`: component data graph and narrative resolution
//! - `export`: the pipeline tying the three together
//! - `common`: shared error type, XML escaping and cancellation

pub mod common;
pub mod compliance;
pub mod container;
pub mod export;
pub mod template;

pub use common::{CancelFlag, Error, ErrorKind, Result};
pub use compliance::ComplianceData;
pub use container::{DocxDocument, FormatRegistry};
pub use export::{DocTemplate, DocxConfig, export_batch};
pub use template::{FuncMap, Template};
