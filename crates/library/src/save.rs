use crate::library::AssetLibrary;
use crate::task::{phase_percent, CancelToken, ProgressSink, TaskOutcome};
use pwassets_core::Identifier;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Summary of a completed save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Files written, with the asset each one holds.
    pub written: Vec<(Identifier, PathBuf)>,
    /// Assets that could not be written, with the reason.
    pub failed: Vec<(Identifier, String)>,
}

impl SaveReport {
    /// True when nothing failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl AssetLibrary {
    /// Write the given assets as indented JSON, creating folders as needed.
    ///
    /// A failure on one asset is logged and recorded; the rest are still
    /// written. Identifiers that are not loaded count as failures.
    pub fn save(
        &self,
        changeset: &[Identifier],
        progress: &mut impl ProgressSink,
        cancel: &CancelToken,
    ) -> TaskOutcome<SaveReport> {
        let mut report = SaveReport::default();
        let total = changeset.len();
        progress.report(0);

        for (done, id) in changeset.iter().enumerate() {
            if cancel.is_cancelled() {
                return TaskOutcome::Cancelled;
            }
            match self.write_asset(id) {
                Ok(path) => report.written.push((id.clone(), path)),
                Err(reason) => {
                    warn!(%id, "could not save asset: {reason}");
                    report.failed.push((id.clone(), reason));
                }
            }
            progress.report(phase_percent(0, 100, done + 1, total));
        }

        progress.report(100);
        info!(
            written = report.written.len(),
            failed = report.failed.len(),
            "assets saved"
        );
        TaskOutcome::Completed(report)
    }

    /// Save every pending change. Assets written successfully leave the
    /// queue; failed ones stay for the next attempt. A cancelled run leaves
    /// the queue untouched.
    pub fn save_pending(
        &mut self,
        progress: &mut impl ProgressSink,
        cancel: &CancelToken,
    ) -> TaskOutcome<SaveReport> {
        let changes = self.changes();
        let outcome = self.save(&changes, progress, cancel);
        if let TaskOutcome::Completed(report) = &outcome {
            self.changes
                .retain(|queued| !report.written.iter().any(|(id, _)| id == queued));
        }
        outcome
    }

    fn write_asset(&self, id: &Identifier) -> Result<PathBuf, String> {
        let asset = self
            .get(id)
            .ok_or_else(|| "asset is not loaded".to_string())?;
        let path = asset.json_path_or_default(self.root());
        let json = asset
            .to_json_string()
            .map_err(|err| format!("serialization failed: {err}"))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|err| format!("creating {}: {err}", dir.display()))?;
        }
        fs::write(&path, json).map_err(|err| format!("writing {}: {err}", path.display()))?;
        Ok(path)
    }
}
