//! Maps: metadata plus an ordered list of placed blocks.

use crate::map_block::MapBlock;
use crate::validation::{check_own_identifier, ValidationContext};
use crate::AssetError;
use pwassets_core::Identifier;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Height below which players are killed, when the file does not say.
pub const DEFAULT_DEATH_PLANE: f32 = -100.0;

fn default_death_plane() -> f32 {
    DEFAULT_DEATH_PLANE
}

/// Steam Workshop publication data. Carried through load and save untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkshopMetadata {
    /// Published file id.
    pub item: i64,
    /// Steam id of the publisher.
    pub publisher: i64,
}

/// The `map` object of a map file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Shown in the map picker.
    #[serde(default)]
    pub description: String,
    /// Kill height.
    #[serde(default = "default_death_plane")]
    pub death_plane: f32,
    /// Present once the map has been published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workshop: Option<WorkshopMetadata>,
}

impl Default for MapInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            death_plane: DEFAULT_DEATH_PLANE,
            workshop: None,
        }
    }
}

/// A playable level.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    /// Unique key; `None` while the asset is being created.
    pub identifier: Option<Identifier>,
    /// Where the JSON file lives, if known.
    pub json_path: Option<PathBuf>,
    /// Map metadata.
    pub info: MapInfo,
    /// Placed objects in file order.
    pub blocks: Vec<MapBlock>,
}

#[derive(Deserialize)]
pub(crate) struct MapFile {
    identifier: Identifier,
    map: MapInfo,
    #[serde(default)]
    blocks: Vec<Value>,
}

impl TryFrom<MapFile> for Map {
    type Error = AssetError;

    fn try_from(file: MapFile) -> Result<Self, Self::Error> {
        let blocks = file
            .blocks
            .into_iter()
            .enumerate()
            .filter(|(_, value)| value.is_object())
            .map(|(index, value)| {
                serde_json::from_value(value)
                    .map_err(|source| AssetError::InvalidBlock { index, source })
            })
            .collect::<Result<Vec<MapBlock>, _>>()?;
        Ok(Self {
            identifier: Some(file.identifier),
            json_path: None,
            info: file.map,
            blocks,
        })
    }
}

#[derive(Serialize)]
pub(crate) struct MapDocument<'a> {
    identifier: Option<&'a Identifier>,
    map: &'a MapInfo,
    blocks: &'a [MapBlock],
}

impl Map {
    /// Identifiers referenced by blocks, deduplicated in first-seen order.
    pub fn dependencies(&self) -> Vec<Identifier> {
        let mut seen = Vec::new();
        for id in self.blocks.iter().filter_map(MapBlock::dependency) {
            if !seen.contains(id) {
                seen.push(id.clone());
            }
        }
        seen
    }

    pub(crate) fn document(&self) -> MapDocument<'_> {
        MapDocument {
            identifier: self.identifier.as_ref(),
            map: &self.info,
            blocks: &self.blocks,
        }
    }

    pub(crate) fn validate(&self, ctx: &ValidationContext<'_>, errors: &mut Vec<String>) -> bool {
        if !check_own_identifier("Map", self.identifier.as_ref(), errors) {
            return false;
        }
        let Some(owner) = self.identifier.as_ref() else {
            return false;
        };
        if self.info.name.trim().is_empty() {
            errors.push(format!("Map {owner} has no name."));
            return false;
        }
        if self.info.description.trim().is_empty() {
            errors.push(format!("Map {owner} has no description."));
            return false;
        }
        if !self.info.death_plane.is_finite() {
            errors.push(format!("Map {owner} has a non-finite death plane."));
            return false;
        }

        let mut valid = true;
        for (index, block) in self.blocks.iter().enumerate() {
            valid &= block.validate(ctx, owner, index, errors);
        }
        valid
    }

    pub(crate) fn is_filled_out(&self) -> bool {
        self.identifier.as_ref().is_some_and(Identifier::is_valid)
            && !self.info.name.trim().is_empty()
            && !self.info.description.trim().is_empty()
            && self.info.death_plane.is_finite()
    }

    pub(crate) fn refactor_identifier(&mut self, from: &Identifier, to: &Identifier) -> bool {
        let mut changed = false;
        for block in &mut self.blocks {
            changed |= block.refactor_identifier(from, to);
        }
        changed
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Map '{}' - {} blocks", self.info.name, self.blocks.len())
    }
}
