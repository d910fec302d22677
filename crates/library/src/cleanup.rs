use crate::library::AssetLibrary;
use crate::task::{phase_percent, CancelToken, ProgressSink, TaskOutcome};
use crate::LibraryError;
use pwassets_core::{paths, AssetType};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Summary of a completed [`AssetLibrary::cleanup`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Unreferenced files that were deleted.
    pub deleted: Vec<PathBuf>,
    /// Directories removed because they became empty.
    pub removed_dirs: Vec<PathBuf>,
    /// Files that could not be deleted, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl AssetLibrary {
    /// Delete every non-JSON file under the root that no asset references,
    /// then any directory that delete left empty.
    pub fn cleanup(
        &self,
        progress: &mut impl ProgressSink,
        cancel: &CancelToken,
    ) -> Result<TaskOutcome<CleanupReport>, LibraryError> {
        if !self.root().is_dir() {
            return Err(LibraryError::InvalidRoot(self.root().to_path_buf()));
        }
        let root = paths::normalize_lexically(self.root());
        let used: HashSet<PathBuf> = self
            .assets()
            .iter()
            .flat_map(|asset| asset.referenced_files(&root))
            .collect();

        let candidates: Vec<PathBuf> = WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| !is_json(path))
            .collect();

        let mut report = CleanupReport::default();
        let total = candidates.len();
        progress.report(0);
        for (done, file) in candidates.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(TaskOutcome::Cancelled);
            }
            if !used.contains(&paths::normalize_lexically(file)) {
                match fs::remove_file(file) {
                    Ok(()) => {
                        debug!(file = %file.display(), "deleted unused file");
                        report.deleted.push(file.clone());
                        if let Some(dir) = file.parent() {
                            report.removed_dirs.extend(remove_empty_dirs(dir, &root));
                        }
                    }
                    Err(err) => {
                        warn!(file = %file.display(), "could not delete unused file: {err}");
                        report.failed.push((file.clone(), err.to_string()));
                    }
                }
            }
            progress.report(phase_percent(0, 100, done + 1, total));
        }

        progress.report(100);
        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "cleanup finished"
        );
        Ok(TaskOutcome::Completed(report))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Remove `dir` and then its parents while they are empty, stopping at the
/// root and the category folders. Returns the directories removed.
pub(crate) fn remove_empty_dirs(dir: &Path, root: &Path) -> Vec<PathBuf> {
    let root = paths::normalize_lexically(root);
    let protected: Vec<PathBuf> = AssetType::ALL
        .iter()
        .map(|asset_type| root.join(asset_type.dir_name()))
        .collect();

    let mut removed = Vec::new();
    let mut current = paths::normalize_lexically(dir);
    while current.starts_with(&root) && current != root && !protected.contains(&current) {
        let empty = fs::read_dir(&current)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if !empty {
            break;
        }
        if let Err(err) = fs::remove_dir(&current) {
            warn!(dir = %current.display(), "could not remove empty directory: {err}");
            break;
        }
        removed.push(current.clone());
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
    removed
}
