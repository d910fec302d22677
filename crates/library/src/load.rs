use crate::library::AssetLibrary;
use crate::task::{phase_percent, CancelToken, ProgressSink, TaskOutcome};
use crate::LibraryError;
use pwassets_assets::{Asset, ValidationContext};
use pwassets_core::AssetType;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Scan order; each finished scan reports the paired percentage.
const SCANS: [(AssetType, u8); 3] = [
    (AssetType::Map, 4),
    (AssetType::Prop, 7),
    (AssetType::Material, 10),
];

/// Summary of a completed [`AssetLibrary::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Assets that parsed and were registered.
    pub loaded: usize,
    /// Parse and validation messages, in the order they were found.
    pub errors: Vec<String>,
}

impl LoadReport {
    /// True only if every file parsed and every asset validated.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

impl AssetLibrary {
    /// Read every asset under the root, then validate them all against the
    /// complete registry.
    ///
    /// Files that fail to parse are reported and skipped; everything that
    /// did parse stays loaded even when the report is not a success. Missing
    /// category folders are created. Anything loaded before is discarded.
    pub fn load(
        &mut self,
        progress: &mut impl ProgressSink,
        cancel: &CancelToken,
    ) -> Result<TaskOutcome<LoadReport>, LibraryError> {
        if !Self::is_valid_assets_directory(self.root()) {
            return Err(LibraryError::InvalidRoot(self.root().to_path_buf()));
        }
        self.clear_assets();

        let mut files: Vec<(AssetType, PathBuf)> = Vec::new();
        for (asset_type, percent) in SCANS {
            let dir = self.root().join(asset_type.dir_name());
            if dir.is_dir() {
                files.extend(json_files(&dir).into_iter().map(|path| (asset_type, path)));
            } else {
                fs::create_dir_all(&dir).map_err(|source| LibraryError::Io {
                    path: dir.clone(),
                    source,
                })?;
                debug!(dir = %dir.display(), "created missing category folder");
            }
            progress.report(percent);
        }

        let mut report = LoadReport::default();
        let total = files.len();
        for (done, (asset_type, path)) in files.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(TaskOutcome::Cancelled);
            }
            if let Err(message) = self.load_file(*asset_type, path) {
                warn!(file = %path.display(), "{message}");
                report.errors.push(message);
            } else {
                report.loaded += 1;
            }
            progress.report(phase_percent(10, 80, done + 1, total));
        }
        progress.report(90);

        let total = self.assets.len();
        let ctx = ValidationContext::new(&self.identifiers, self.root.as_path());
        for (done, asset) in self.assets.iter_mut().enumerate() {
            if cancel.is_cancelled() {
                return Ok(TaskOutcome::Cancelled);
            }
            asset.validate(&ctx, &mut report.errors);
            progress.report(phase_percent(90, 10, done + 1, total));
        }

        progress.report(100);
        info!(
            root = %self.root().display(),
            loaded = report.loaded,
            errors = report.errors.len(),
            "asset library loaded"
        );
        Ok(TaskOutcome::Completed(report))
    }

    fn load_file(&mut self, asset_type: AssetType, path: &Path) -> Result<(), String> {
        let asset = Asset::load(asset_type, path).map_err(|err| format!("{}: {err}", path.display()))?;
        let Some(id) = asset.identifier().cloned() else {
            return Err(format!("{}: asset has no identifier", path.display()));
        };
        if id.asset_type() != asset_type {
            return Err(format!(
                "{}: identifier {id} is a {} but the file is in the {} folder",
                path.display(),
                id.asset_type(),
                asset_type.dir_name()
            ));
        }
        if !self.identifiers.insert(id.clone()) {
            return Err(format!(
                "{}: identifier {id} is already defined by another file",
                path.display()
            ));
        }
        debug!(%id, file = %path.display(), "asset loaded");
        self.assets.push(asset);
        Ok(())
    }
}

/// Every `*.json` file below `dir`, sorted for a stable load order.
fn json_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    files.sort();
    files
}
