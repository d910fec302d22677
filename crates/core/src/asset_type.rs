//! Asset kinds.
//!
//! The declaration order is significant: identifiers sort by author, then by
//! asset kind in this order, then by name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of asset an identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum AssetType {
    /// A material applied to map blocks and props.
    Material = 0,
    /// A decorative model placed in maps.
    Prop = 1,
    /// A map made of blocks, props, entities and text.
    Map = 2,
}

impl AssetType {
    /// Every asset kind, in ordinal order.
    pub const ALL: [AssetType; 3] = [AssetType::Material, AssetType::Prop, AssetType::Map];

    /// Canonical name used inside identifiers (`author.<name>.asset`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Prop => "prop",
            Self::Map => "map",
        }
    }

    /// Sub-directory of the library root holding assets of this kind.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Material => "materials",
            Self::Prop => "props",
            Self::Map => "maps",
        }
    }

    /// Parse the canonical name. Matching is case-sensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "material" => Some(Self::Material),
            "prop" => Some(Self::Prop),
            "map" => Some(Self::Map),
            _ => None,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
