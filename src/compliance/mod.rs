//! Compliance data and narrative lookups.
//!
//! [`ComplianceData`] holds the components of a system and an index from
//! `standard` and `control` keys to the components that satisfy them. It is
//! built once, then shared read-only (for example in an `Arc`) by any number
//! of concurrent renders.

mod component;
mod data;
mod error;
mod justifications;
mod narrative;

#[cfg(test)]
pub(crate) mod fixtures;

pub use component::{Component, NarrativeSection, Satisfies, Section};
pub use data::ComplianceData;
pub use error::{DataError, Result};
pub use justifications::{Justification, Justifications};
pub use narrative::{
    NarrativeKey, narrative_functions, resolve_control, resolve_control_section, resolve_parameter,
    resolve_responsible_roles, split_key,
};
