//! Parallel export of independent jobs.

use super::config::DocxConfig;
use crate::common::{CancelFlag, Result};
use crate::compliance::ComplianceData;
use log::{info, warn};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Result of one job in a batch.
#[derive(Debug)]
pub struct ExportOutcome {
    pub export_path: PathBuf,
    pub result: Result<()>,
}

impl ExportOutcome {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run every job against the shared data graph.
///
/// Jobs run on the rayon pool and all of them finish before this returns.
/// Outcomes are in the order of `configs`; a failing job does not stop the
/// others.
pub fn export_batch(configs: &[DocxConfig], data: &Arc<ComplianceData>) -> Vec<ExportOutcome> {
    export_batch_with_cancel(configs, data, &CancelFlag::new())
}

/// [`export_batch`], aborting every job that has not yet written once `cancel` is raised.
pub fn export_batch_with_cancel(
    configs: &[DocxConfig],
    data: &Arc<ComplianceData>,
    cancel: &CancelFlag,
) -> Vec<ExportOutcome> {
    let outcomes: Vec<ExportOutcome> = configs
        .par_iter()
        .map(|config| {
            let result = config.build_with_cancel(data, cancel);
            if let Err(err) = &result {
                warn!("export of {} failed: {err}", config.template_path.display());
            }
            ExportOutcome {
                export_path: config.export_path.clone(),
                result,
            }
        })
        .collect();

    let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
    info!("batch export finished: {succeeded}/{} succeeded", outcomes.len());
    outcomes
}
