#![warn(missing_docs)]
//! Prego Wars asset model: props, materials, maps and their JSON schemas.

mod asset;
mod map;
mod map_block;
mod material;
mod prop;
pub mod strict_json;
mod validation;

pub use asset::Asset;
pub use map::{Map, MapInfo, WorkshopMetadata, DEFAULT_DEATH_PLANE};
pub use map_block::{BlockTransform, MapBlock, MapBlockKind, ShapeType, TextInfo};
pub use material::{Material, MaterialProperties, TEXTURE_EXTENSIONS};
pub use prop::{Prop, PropProperties, MODEL_EXTENSIONS};
pub use validation::ValidationContext;

use std::path::PathBuf;
use thiserror::Error;

/// Errors emitted while reading or editing a single asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Wrap IO errors when reading asset files.
    #[error("failed to read asset file: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues (syntax, schema and duplicate keys).
    #[error("failed to parse asset: {0}")]
    Parse(#[from] serde_json::Error),
    /// One entry of a map's `blocks` array failed to deserialize.
    #[error("map block {index} is invalid: {source}")]
    InvalidBlock {
        /// Position inside the `blocks` array.
        index: usize,
        /// Underlying schema error.
        source: serde_json::Error,
    },
    /// A texture or model with an extension the game cannot load.
    #[error("{kind} file '{}' has unsupported extension '{extension}'; supported: {supported}", .path.display())]
    UnsupportedExtension {
        /// "texture" or "model".
        kind: &'static str,
        /// Offending path.
        path: PathBuf,
        /// Extension as written (may be empty).
        extension: String,
        /// Comma-separated list of accepted extensions.
        supported: String,
    },
}

/// Extension of `path` without the dot, or an empty string.
pub(crate) fn extension_of(path: &str) -> String {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Case-insensitive membership test against an extension allow-list.
pub(crate) fn extension_allowed(extension: &str, allowed: &[&str]) -> bool {
    allowed
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(extension))
}

/// Accepted extensions joined for messages.
pub(crate) fn describe_extensions(allowed: &[&str]) -> String {
    allowed.join(", ")
}
