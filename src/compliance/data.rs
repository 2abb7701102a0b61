//! The compliance data graph and its workspace loader.
//!
//! A workspace is a directory with a `components/` folder holding one
//! sub-directory per component, each containing a `component.yaml`:
//!
//! ```text
//! opencontrol/
//! └── components/
//!     ├── EC2/component.yaml
//!     └── S3/component.yaml
//! ```

use super::component::{Component, Satisfies};
use super::error::{DataError, Result};
use super::justifications::{Justification, Justifications};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const COMPONENTS_DIR: &str = "components";
const COMPONENT_FILE: &str = "component.yaml";

/// Components plus the control index built from them.
///
/// Serializes as `{"components": [...]}` so it can be used directly as a
/// template context.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComplianceData {
    components: Vec<Component>,
    #[serde(skip)]
    justifications: Justifications,
    #[serde(skip)]
    keys: HashSet<String>,
}

impl ComplianceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `component` and index every control it satisfies.
    ///
    /// # Errors
    ///
    /// `DuplicateComponent` if a component with the same key is already present.
    pub fn add_component(&mut self, component: Component) -> Result<()> {
        if !self.keys.insert(component.key.clone()) {
            return Err(DataError::DuplicateComponent(component.key));
        }
        let index = self.components.len();
        for (i, satisfies) in component.satisfies.iter().enumerate() {
            self.justifications.add(
                &satisfies.standard_key,
                &satisfies.control_key,
                Justification {
                    component: index,
                    satisfies: i,
                },
            );
        }
        self.components.push(component);
        Ok(())
    }

    /// Load every `components/*/component.yaml` under `dir`, in sorted directory order.
    ///
    /// A workspace without a `components` folder yields empty data; a missing
    /// `dir` is an error.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::metadata(dir).map_err(io_err(dir))?;
        let components_dir = dir.join(COMPONENTS_DIR);
        let mut data = Self::new();
        if !components_dir.is_dir() {
            return Ok(data);
        }

        let mut entries = fs::read_dir(&components_dir)
            .map_err(io_err(&components_dir))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(io_err(&components_dir))?;
        entries.sort();

        for component_dir in entries.iter().filter(|p| p.is_dir()) {
            let file = component_dir.join(COMPONENT_FILE);
            if !file.is_file() {
                continue;
            }
            let text = fs::read_to_string(&file).map_err(io_err(&file))?;
            let mut component: Component = serde_saphyr::from_str(&text).map_err(|e| DataError::Yaml {
                path: file.clone(),
                reason: e.to_string(),
            })?;
            if component.key.is_empty() {
                component.key = component_dir
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
            }
            data.add_component(component)?;
        }

        Ok(data)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, key: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.key == key)
    }

    pub fn justifications(&self) -> &Justifications {
        &self.justifications
    }

    /// Every (component, satisfies) pair for a standard and control, in insertion order.
    pub fn satisfying<'a>(
        &'a self,
        standard: &str,
        control: &str,
    ) -> impl Iterator<Item = (&'a Component, &'a Satisfies)> + use<'a> {
        self.justifications
            .get(standard, control)
            .iter()
            .filter_map(move |j| {
                let component = self.components.get(j.component)?;
                Some((component, component.satisfies.get(j.satisfies)?))
            })
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> DataError + use<> {
    let path = path.to_path_buf();
    move |source| DataError::Io { path, source }
}
