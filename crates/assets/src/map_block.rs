//! Placed objects inside a map.

use crate::validation::ValidationContext;
use pwassets_core::{AssetType, Identifier, MaterialColor, Vec3};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Primitive geometry of a `block` map block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum ShapeType {
    Sphere,
    Capsule,
    Cylinder,
    Cube,
    Plane,
    Quad,
}

/// Placement of a block in map space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockTransform {
    /// World position.
    pub position: Vec3,
    /// Euler rotation in degrees.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for BlockTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Contents of a `text` map block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextInfo {
    /// Text to render.
    pub content: String,
    /// Wrap width, or unbounded when absent.
    #[serde(default)]
    pub wrap: Option<f32>,
    /// Text color.
    #[serde(default)]
    pub color: MaterialColor,
}

/// What a map block places. The JSON `type` field selects the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MapBlockKind {
    /// A primitive shape with a material.
    Block {
        /// Geometry.
        shape: ShapeType,
        /// Surface material.
        material: Identifier,
        /// Opaque effect descriptors passed through to the game.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        effects: Vec<Value>,
    },
    /// An instance of a prop asset.
    Prop {
        /// The prop to place.
        prop: Identifier,
    },
    /// A game entity referenced by name.
    Entity {
        /// Entity name understood by the game.
        entity: String,
    },
    /// Floating text.
    Text {
        /// Text parameters.
        text: TextInfo,
    },
}

/// One placed object in a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapBlock {
    /// What is placed.
    #[serde(flatten)]
    pub kind: MapBlockKind,
    /// Where it is placed.
    #[serde(default)]
    pub transform: BlockTransform,
}

impl MapBlock {
    /// Block at the origin with the default transform.
    pub fn new(kind: MapBlockKind) -> Self {
        Self {
            kind,
            transform: BlockTransform::default(),
        }
    }

    /// The identifier this block references, if any.
    pub fn dependency(&self) -> Option<&Identifier> {
        match &self.kind {
            MapBlockKind::Block { material, .. } => Some(material),
            MapBlockKind::Prop { prop } => Some(prop),
            MapBlockKind::Entity { .. } | MapBlockKind::Text { .. } => None,
        }
    }

    pub(crate) fn validate(
        &self,
        ctx: &ValidationContext<'_>,
        owner: &Identifier,
        index: usize,
        errors: &mut Vec<String>,
    ) -> bool {
        match &self.kind {
            MapBlockKind::Block { material, .. } => {
                ctx.check_reference(owner, material, AssetType::Material, errors)
            }
            MapBlockKind::Prop { prop } => ctx.check_reference(owner, prop, AssetType::Prop, errors),
            MapBlockKind::Entity { entity } if entity.trim().is_empty() => {
                errors.push(format!(
                    "Map {owner}: entity block {index} has no entity name."
                ));
                false
            }
            MapBlockKind::Entity { .. } | MapBlockKind::Text { .. } => true,
        }
    }

    pub(crate) fn refactor_identifier(&mut self, from: &Identifier, to: &Identifier) -> bool {
        match &mut self.kind {
            MapBlockKind::Block { material: id, .. } | MapBlockKind::Prop { prop: id } if *id == *from => {
                *id = to.clone();
                true
            }
            _ => false,
        }
    }
}
