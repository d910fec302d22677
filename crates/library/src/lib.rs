#![warn(missing_docs)]
//! The in-memory asset library: loading, saving, refactoring and deleting
//! Prego Wars assets under a `pw-assets` directory.

mod cleanup;
mod delete;
pub mod import;
mod library;
mod load;
pub mod prompt;
mod save;
pub mod task;

pub use cleanup::CleanupReport;
pub use delete::DeleteReport;
pub use import::{import_resource, ImportError, ResourceKind};
pub use library::AssetLibrary;
pub use load::LoadReport;
pub use prompt::{AutoAnswer, Prompt, PromptAnswer, PromptRequest, ScriptedPrompt};
pub use save::SaveReport;
pub use task::{CancelToken, NoProgress, ProgressSink, TaskOutcome};

use pwassets_assets::AssetError;
use pwassets_core::{Identifier, ASSETS_DIR_NAME};
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by library operations.
///
/// Batch operations (load, save, cleanup) report per-item problems in their
/// reports instead; these variants stop the operation before it changes
/// anything.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The root directory name does not end with `pw-assets`.
    #[error("'{}' is not a valid Prego Wars asset directory (its name must end with '{}')", .0.display(), ASSETS_DIR_NAME)]
    InvalidRoot(PathBuf),
    /// Filesystem failure outside a batch.
    #[error("{}: {source}", .path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// An asset without an identifier was handed to the library.
    #[error("asset has no identifier")]
    MissingIdentifier,
    /// The identifier is already registered.
    #[error("identifier {0} is already in use")]
    DuplicateIdentifier(Identifier),
    /// The identifier is not registered.
    #[error("no asset with identifier {0}")]
    UnknownIdentifier(Identifier),
    /// The asset failed validation.
    #[error("asset failed validation: {}", .errors.join("; "))]
    Invalid {
        /// Human-readable validation messages.
        errors: Vec<String>,
    },
    /// Other assets still reference the asset being deleted.
    #[error("{identifier} is used by {}", .dependents.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    HasDependents {
        /// Asset that was to be deleted.
        identifier: Identifier,
        /// Assets referencing it.
        dependents: Vec<Identifier>,
    },
    /// The asset belongs to another author and external edits are disabled.
    #[error("{identifier} belongs to author '{}', not '{author}'; enable external edits to change it", .identifier.author())]
    NotOwner {
        /// Asset that was to be changed.
        identifier: Identifier,
        /// The library's current author.
        author: String,
    },
    /// Asset-level failure (parse, serialize, unsupported resource).
    #[error(transparent)]
    Asset(#[from] AssetError),
    /// Serialization failure.
    #[error("failed to serialize asset: {0}")]
    Serialize(#[from] serde_json::Error),
}
