//! Component records as they appear in `component.yaml`.

use serde::{Deserialize, Serialize};

/// A system component and the controls it satisfies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    pub name: String,
    /// Unique key; filled from the directory name when left empty
    pub key: String,
    pub responsible_role: String,
    pub satisfies: Vec<Satisfies>,
}

/// How one component satisfies one control of one standard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Satisfies {
    pub standard_key: String,
    pub control_key: String,
    pub narrative: Vec<NarrativeSection>,
    pub parameters: Vec<Section>,
    pub implementation_status: String,
    pub control_origin: String,
}

/// Narrative text, optionally keyed by a section such as `a` or `b`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub text: String,
}

/// A keyed parameter value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub text: String,
}

impl NarrativeSection {
    pub fn new(key: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            key: key.map(str::to_string),
            text: text.into(),
        }
    }

    #[inline]
    pub fn has_key(&self, section: &str) -> bool {
        self.key.as_deref() == Some(section)
    }
}
