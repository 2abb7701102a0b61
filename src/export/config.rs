//! Export job configuration.
//!
//! A job names the compliance workspace, the template to render and where
//! the result goes. Jobs can be written in YAML:
//!
//! ```yaml
//! opencontrol_dir: ./opencontrols
//! template_path: ./templates/ssp.docx
//! export_path: ./exports/ssp.docx
//! ```

use super::document::DocTemplate;
use crate::common::{CancelFlag, Error, Result};
use crate::compliance::{ComplianceData, narrative_functions};
use crate::container::FormatRegistry;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One template export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocxConfig {
    /// Workspace holding `components/*/component.yaml`
    pub opencontrol_dir: PathBuf,
    pub template_path: PathBuf,
    pub export_path: PathBuf,
}

impl DocxConfig {
    pub fn new(
        opencontrol_dir: impl Into<PathBuf>,
        template_path: impl Into<PathBuf>,
        export_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            opencontrol_dir: opencontrol_dir.into(),
            template_path: template_path.into(),
            export_path: export_path.into(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml).map_err(|e| Error::Config(format!("invalid export config: {e}")))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_str(&read_config(path.as_ref())?)
    }

    /// Read a YAML list of jobs.
    pub fn list_from_yaml_file(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let text = read_config(path.as_ref())?;
        serde_saphyr::from_str(&text).map_err(|e| Error::Config(format!("invalid export config list: {e}")))
    }

    /// Check the job can run before touching the template.
    ///
    /// # Errors
    ///
    /// `Error::Config` when no template is named, the template does not exist,
    /// or no export path is set.
    pub fn validate(&self) -> Result<()> {
        if self.template_path.as_os_str().is_empty() {
            return Err(Error::Config("no template supplied".to_string()));
        }
        if !self.template_path.is_file() {
            return Err(Error::Config(format!(
                "template `{}` does not exist",
                self.template_path.display()
            )));
        }
        if self.export_path.as_os_str().is_empty() {
            return Err(Error::Config("no export path supplied".to_string()));
        }
        Ok(())
    }

    /// Render the template with `data` bound and write it to the export path.
    ///
    /// The data graph is both the template context (`{{range .components}}`)
    /// and the source of the narrative functions. The document is closed
    /// whether or not rendering succeeds.
    pub fn build(&self, data: &Arc<ComplianceData>) -> Result<()> {
        self.build_with_cancel(data, &CancelFlag::new())
    }

    /// [`build`](Self::build), aborting the open or write once `cancel` is raised.
    pub fn build_with_cancel(&self, data: &Arc<ComplianceData>, cancel: &CancelFlag) -> Result<()> {
        self.validate()?;
        let mut doc = DocTemplate::open_with(&FormatRegistry::default(), &self.template_path, cancel.clone())?;
        doc.funcs(narrative_functions(Arc::clone(data)));

        let rendered = doc.execute(&self.export_path, data.as_ref());
        let closed = doc.close();
        rendered?;
        closed?;

        info!(
            "exported {} to {}",
            self.template_path.display(),
            self.export_path.display()
        );
        Ok(())
    }

    /// Load the workspace at `opencontrol_dir`, then [`build`](Self::build).
    pub fn export(&self) -> Result<()> {
        self.validate()?;
        let data = ComplianceData::load_dir(&self.opencontrol_dir)?;
        self.build(&Arc::new(data))
    }
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::Config(format!("cannot read `{}`: {e}", path.display())))
}
