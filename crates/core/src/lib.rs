#![warn(missing_docs)]
//! Core value types shared across the workspace: identifiers, asset kinds,
//! the compact vector/color JSON codecs and path helpers.

mod asset_type;
pub mod color;
mod identifier;
pub mod paths;
pub mod vector;

pub use asset_type::AssetType;
pub use color::MaterialColor;
pub use identifier::{Identifier, IdentifierError, IDENTIFIER_EXAMPLE};
pub use paths::PathError;
pub use vector::Vec3;

/// Directory name suffix every asset library root must carry.
pub const ASSETS_DIR_NAME: &str = "pw-assets";
