//! Template export pipeline.
//!
//! [`DocTemplate`] drives a single document through open, normalize, parse,
//! execute and close. [`DocxConfig`] wires a compliance workspace into that
//! pipeline, and [`export_batch`] fans many configs out over rayon.
//!
//! This is the only layer that logs, through the `log` facade.

mod batch;
mod config;
mod document;

pub use batch::{ExportOutcome, export_batch, export_batch_with_cancel};
pub use config::DocxConfig;
pub use document::DocTemplate;
