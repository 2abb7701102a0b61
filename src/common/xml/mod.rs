//! XML text helpers shared by the container and template layers.

pub mod escape;

pub use escape::escape_xml;
