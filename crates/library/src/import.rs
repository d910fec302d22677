//! Bringing textures and models picked from anywhere on disk into an asset.

use crate::prompt::{Prompt, PromptAnswer, PromptRequest};
use pwassets_assets::{AssetError, MODEL_EXTENSIONS, TEXTURE_EXTENSIONS};
use pwassets_core::paths;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// What kind of resource is being imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Material texture.
    Texture,
    /// Prop model.
    Model,
}

impl ResourceKind {
    /// Folder next to the asset JSON that imported copies go into.
    pub fn subdir(self) -> &'static str {
        match self {
            ResourceKind::Texture => "textures",
            ResourceKind::Model => "models",
        }
    }

    /// Extensions the game can load for this kind, upper case.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Texture => &TEXTURE_EXTENSIONS,
            ResourceKind::Model => &MODEL_EXTENSIONS,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ResourceKind::Texture => "texture",
            ResourceKind::Model => "model",
        }
    }
}

/// Errors returned by [`import_resource`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// The asset has no JSON path yet, so there is nowhere to import to.
    #[error("asset is not ready to be given a path ('{}'); is its identifier set?", .0.display())]
    NoAssetDirectory(PathBuf),
    /// The picked file has an extension the game cannot load.
    #[error(transparent)]
    Unsupported(#[from] AssetError),
    /// Copying failed.
    #[error("{}: {source}", .path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Turn a picked file into the reference stored in the asset's JSON.
///
/// Files already inside the asset's folder are referenced in place. Files
/// elsewhere are copied into `textures/` or `models/` next to the asset
/// after `prompt` agrees, with a second question when the destination
/// already exists. Returns `None` when the user declines either question.
pub fn import_resource(
    asset_json: &Path,
    source: &Path,
    kind: ResourceKind,
    prompt: &mut dyn Prompt,
) -> Result<Option<String>, ImportError> {
    let extension = source
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_string();
    if !kind
        .extensions()
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    {
        return Err(AssetError::UnsupportedExtension {
            kind: kind.label(),
            path: source.to_path_buf(),
            extension,
            supported: kind.extensions().join(", "),
        }
        .into());
    }

    let Some(asset_dir) = asset_json.parent().filter(|dir| !dir.as_os_str().is_empty()) else {
        return Err(ImportError::NoAssetDirectory(asset_json.to_path_buf()));
    };

    let picked = if paths::can_truncate_path(asset_json, source) {
        source.to_path_buf()
    } else {
        let Some(file_name) = source.file_name() else {
            return Err(ImportError::Io {
                path: source.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file"),
            });
        };
        let destination = asset_dir.join(kind.subdir()).join(file_name);
        let request = PromptRequest::CopyIntoAssetFolder {
            source,
            destination: &destination,
        };
        if prompt.ask(&request) != PromptAnswer::Yes {
            return Ok(None);
        }
        if destination.exists()
            && prompt.ask(&PromptRequest::OverwriteFile { path: &destination }) != PromptAnswer::Yes
        {
            return Ok(None);
        }
        copy_into(source, &destination)?;
        info!(
            from = %source.display(),
            to = %destination.display(),
            "copied {} into asset folder",
            kind.label()
        );
        destination
    };

    let stored = paths::truncate_path(asset_json, &picked);
    debug!(reference = %stored.display(), "resource imported");
    Ok(Some(stored.to_string_lossy().replace('\\', "/")))
}

fn copy_into(source: &Path, destination: &Path) -> Result<(), ImportError> {
    if let Some(dir) = destination.parent() {
        fs::create_dir_all(dir).map_err(|err| ImportError::Io {
            path: dir.to_path_buf(),
            source: err,
        })?;
    }
    fs::copy(source, destination).map_err(|err| ImportError::Io {
        path: source.to_path_buf(),
        source: err,
    })?;
    Ok(())
}
