use crate::cleanup::remove_empty_dirs;
use crate::library::AssetLibrary;
use crate::prompt::{Prompt, PromptAnswer, PromptRequest};
use crate::task::TaskOutcome;
use crate::LibraryError;
use pwassets_core::{paths, Identifier};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Summary of a completed [`AssetLibrary::delete_asset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Files removed from disk, JSON file first.
    pub deleted: Vec<PathBuf>,
    /// Directories removed because they became empty.
    pub removed_dirs: Vec<PathBuf>,
    /// Files that could not be removed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl AssetLibrary {
    /// Delete an asset together with the files only it uses.
    ///
    /// Refused with [`LibraryError::HasDependents`] while any other asset
    /// references `id`; nothing is touched in that case. Otherwise `prompt`
    /// confirms the delete and, when more than one file would go, whether
    /// the resource files go too (no keeps them and deletes only the JSON).
    pub fn delete_asset(
        &mut self,
        id: &Identifier,
        prompt: &mut dyn Prompt,
    ) -> Result<TaskOutcome<DeleteReport>, LibraryError> {
        let index = self
            .position(id)
            .ok_or_else(|| LibraryError::UnknownIdentifier(id.clone()))?;
        self.ensure_can_edit(id)?;

        let dependents: Vec<Identifier> = self
            .get_assets_that_depend_on(id)
            .into_iter()
            .filter_map(|asset| asset.identifier().cloned())
            .filter(|dependent| dependent != id)
            .collect();
        if !dependents.is_empty() {
            return Err(LibraryError::HasDependents {
                identifier: id.clone(),
                dependents,
            });
        }

        if prompt.ask(&PromptRequest::ConfirmDelete { identifier: id }) != PromptAnswer::Yes {
            return Ok(TaskOutcome::Cancelled);
        }

        let root = paths::normalize_lexically(self.root());
        let target = &self.assets[index];
        let json_path = paths::normalize_lexically(&target.json_path_or_default(&root));
        let in_use: HashSet<PathBuf> = self
            .assets
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != index)
            .flat_map(|(_, asset)| asset.referenced_files(&root))
            .collect();
        let mut deletable: Vec<PathBuf> = target
            .referenced_files(&root)
            .into_iter()
            .filter(|file| !in_use.contains(file))
            .collect();

        if deletable.len() > 1 {
            let extra: Vec<PathBuf> = deletable
                .iter()
                .filter(|file| **file != json_path)
                .cloned()
                .collect();
            match prompt.ask(&PromptRequest::DeleteUnusedFiles { files: &extra }) {
                PromptAnswer::Yes => {}
                PromptAnswer::No => deletable.retain(|file| *file == json_path),
                PromptAnswer::Cancel => return Ok(TaskOutcome::Cancelled),
            }
        }

        let mut report = DeleteReport::default();
        for file in &deletable {
            if !file.exists() {
                continue;
            }
            match fs::remove_file(file) {
                Ok(()) => {
                    report.deleted.push(file.clone());
                    if let Some(dir) = file.parent() {
                        report.removed_dirs.extend(remove_empty_dirs(dir, &root));
                    }
                }
                Err(err) => {
                    warn!(file = %file.display(), "could not delete file: {err}");
                    report.failed.push((file.clone(), err.to_string()));
                }
            }
        }

        self.remove_by_identifier(id)?;
        info!(%id, files = report.deleted.len(), "asset deleted");
        Ok(TaskOutcome::Completed(report))
    }
}
