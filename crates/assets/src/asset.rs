//! The asset union and the operations every asset kind shares.

use crate::map::{Map, MapFile};
use crate::material::{Material, MaterialFile};
use crate::prop::{Prop, PropFile};
use crate::strict_json::parse_strict;
use crate::validation::ValidationContext;
use crate::AssetError;
use pwassets_core::{paths, AssetType, Identifier};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Any loadable asset.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    /// A placeable model.
    Prop(Prop),
    /// A surface description.
    Material(Material),
    /// A level.
    Map(Map),
}

impl Asset {
    /// Blank asset of the given type, as produced by the "new asset" flow.
    pub fn new(asset_type: AssetType) -> Self {
        match asset_type {
            AssetType::Prop => Asset::Prop(Prop::default()),
            AssetType::Material => Asset::Material(Material::default()),
            AssetType::Map => Asset::Map(Map::default()),
        }
    }

    /// Parse an asset document, rejecting duplicate keys.
    pub fn from_json_str(asset_type: AssetType, input: &str) -> Result<Self, AssetError> {
        let value = parse_strict(input)?;
        Self::from_json(asset_type, value)
    }

    /// Deserialize an already-parsed document.
    pub fn from_json(asset_type: AssetType, value: Value) -> Result<Self, AssetError> {
        Ok(match asset_type {
            AssetType::Prop => Asset::Prop(serde_json::from_value::<PropFile>(value)?.into()),
            AssetType::Material => {
                Asset::Material(serde_json::from_value::<MaterialFile>(value)?.into())
            }
            AssetType::Map => Asset::Map(serde_json::from_value::<MapFile>(value)?.try_into()?),
        })
    }

    /// Read and parse an asset file, remembering where it came from.
    pub fn load(asset_type: AssetType, path: &Path) -> Result<Self, AssetError> {
        let data = fs::read_to_string(path)?;
        let mut asset = Self::from_json_str(asset_type, &data)?;
        asset.set_json_path(Some(path.to_path_buf()));
        Ok(asset)
    }

    /// Kind of this asset.
    pub fn asset_type(&self) -> AssetType {
        match self {
            Asset::Prop(_) => AssetType::Prop,
            Asset::Material(_) => AssetType::Material,
            Asset::Map(_) => AssetType::Map,
        }
    }

    /// Identifier, if one has been assigned.
    pub fn identifier(&self) -> Option<&Identifier> {
        match self {
            Asset::Prop(prop) => prop.identifier.as_ref(),
            Asset::Material(material) => material.identifier.as_ref(),
            Asset::Map(map) => map.identifier.as_ref(),
        }
    }

    /// Replace the identifier.
    pub fn set_identifier(&mut self, identifier: Option<Identifier>) {
        *self.identifier_slot() = identifier;
    }

    fn identifier_slot(&mut self) -> &mut Option<Identifier> {
        match self {
            Asset::Prop(prop) => &mut prop.identifier,
            Asset::Material(material) => &mut material.identifier,
            Asset::Map(map) => &mut map.identifier,
        }
    }

    /// Location of the JSON file, if known.
    pub fn json_path(&self) -> Option<&Path> {
        match self {
            Asset::Prop(prop) => prop.json_path.as_deref(),
            Asset::Material(material) => material.json_path.as_deref(),
            Asset::Map(map) => map.json_path.as_deref(),
        }
    }

    /// Replace the JSON file location.
    pub fn set_json_path(&mut self, path: Option<PathBuf>) {
        match self {
            Asset::Prop(prop) => prop.json_path = path,
            Asset::Material(material) => material.json_path = path,
            Asset::Map(map) => map.json_path = path,
        }
    }

    /// Where this asset would be written if it had no JSON path yet.
    ///
    /// Props and maps are named after their display name (trimmed, spaces
    /// replaced with `_`), falling back to the asset name. Materials always
    /// use the asset name. Anything unnamed lands in `unknown.json`.
    pub fn default_json_path(&self, root: &Path) -> PathBuf {
        let asset_name = self
            .identifier()
            .map(Identifier::name)
            .filter(|name| !name.trim().is_empty());
        let display_name = match self {
            Asset::Prop(prop) => Some(prop.properties.name.as_str()),
            Asset::Map(map) => Some(map.info.name.as_str()),
            Asset::Material(_) => None,
        }
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.replace(' ', "_"));

        let file_name = display_name
            .or_else(|| asset_name.map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        root.join(self.asset_type().dir_name())
            .join(format!("{file_name}.json"))
    }

    /// The stored JSON path, or the default one under `root`.
    pub fn json_path_or_default(&self, root: &Path) -> PathBuf {
        self.json_path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_json_path(root))
    }

    /// Check this asset against the library, appending human-readable
    /// messages to `errors`. Materials normalize their alpha on success.
    pub fn validate(&mut self, ctx: &ValidationContext<'_>, errors: &mut Vec<String>) -> bool {
        let json_path = self.json_path_or_default(ctx.root);
        match self {
            Asset::Prop(prop) => prop.validate(ctx, &json_path, errors),
            Asset::Material(material) => material.validate(ctx, &json_path, errors),
            Asset::Map(map) => map.validate(ctx, errors),
        }
    }

    /// Cheap readiness check used before offering to create the asset.
    pub fn is_filled_out(&self, ctx: &ValidationContext<'_>) -> bool {
        match self {
            Asset::Prop(prop) => prop.is_filled_out(ctx, &self.json_path_or_default(ctx.root)),
            Asset::Material(material) => material.is_filled_out(),
            Asset::Map(map) => map.is_filled_out(),
        }
    }

    /// Serialize to a JSON value.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            Asset::Prop(prop) => serde_json::to_value(prop.document()),
            Asset::Material(material) => serde_json::to_value(material.document()),
            Asset::Map(map) => serde_json::to_value(map.document()),
        }
    }

    /// Serialize to indented JSON text as written to disk.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        match self {
            Asset::Prop(prop) => serde_json::to_string_pretty(&prop.document()),
            Asset::Material(material) => serde_json::to_string_pretty(&material.document()),
            Asset::Map(map) => serde_json::to_string_pretty(&map.document()),
        }
    }

    /// The texture or model path stored in the JSON, if any.
    pub fn resource_reference(&self) -> Option<&str> {
        match self {
            Asset::Prop(prop) => Some(prop.properties.model.as_str()),
            Asset::Material(material) => material.properties.texture.as_deref(),
            Asset::Map(_) => None,
        }
        .filter(|reference| !reference.trim().is_empty())
    }

    /// Every file this asset owns on disk, as normalized absolute paths.
    ///
    /// Resources that resolve outside the asset's directory tree are not
    /// owned and are left out.
    pub fn referenced_files(&self, root: &Path) -> Vec<PathBuf> {
        let json_path = paths::normalize_lexically(&self.json_path_or_default(root));
        let mut files = Vec::with_capacity(2);
        if let Some(reference) = self.resource_reference() {
            if let Ok(resource) = paths::resolve_sub_file(&json_path, Path::new(reference)) {
                files.push(resource);
            }
        }
        files.insert(0, json_path);
        files
    }

    /// Identifiers this asset references, deduplicated in first-seen order.
    pub fn dependencies(&self) -> Vec<Identifier> {
        match self {
            Asset::Prop(prop) => {
                let mut seen: Vec<Identifier> = Vec::new();
                for id in prop.materials() {
                    if !seen.contains(id) {
                        seen.push(id.clone());
                    }
                }
                seen
            }
            Asset::Material(_) => Vec::new(),
            Asset::Map(map) => map.dependencies(),
        }
    }

    /// True if any reference points at `id`.
    pub fn depends_on(&self, id: &Identifier) -> bool {
        match self {
            Asset::Prop(prop) => prop.materials().contains(id),
            Asset::Material(_) => false,
            Asset::Map(map) => map.blocks.iter().any(|block| block.dependency() == Some(id)),
        }
    }

    /// Rewrite every reference to `from` so it points at `to`.
    pub fn refactor_identifier(&mut self, from: &Identifier, to: &Identifier) -> bool {
        match self {
            Asset::Prop(prop) => prop.refactor_identifier(from, to),
            Asset::Material(_) => false,
            Asset::Map(map) => map.refactor_identifier(from, to),
        }
    }

    /// Move this asset's own identifier to a new author (exact compare).
    pub fn refactor_author_name(&mut self, from: &str, to: &str) -> bool {
        let slot = self.identifier_slot();
        match slot {
            Some(id) if id.author() == from => {
                *id = id.with_author(to);
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Prop(prop) => fmt::Display::fmt(prop, f),
            Asset::Material(material) => fmt::Display::fmt(material, f),
            Asset::Map(map) => fmt::Display::fmt(map, f),
        }
    }
}

impl From<Prop> for Asset {
    fn from(prop: Prop) -> Self {
        Asset::Prop(prop)
    }
}

impl From<Material> for Asset {
    fn from(material: Material) -> Self {
        Asset::Material(material)
    }
}

impl From<Map> for Asset {
    fn from(map: Map) -> Self {
        Asset::Map(map)
    }
}
