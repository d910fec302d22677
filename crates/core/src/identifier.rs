//! Asset identifiers.
//!
//! Identifiers are the only foreign-key mechanism between assets. They have
//! the form `author.assetType.assetName` (e.g. `lukecreator.material.grass`)
//! and are ordered by `(author, asset type, name)` so listings are stable.

use crate::AssetType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Example format shown in parse errors.
pub const IDENTIFIER_EXAMPLE: &str = "name.assetType.assetName";

/// Error returned when parsing an invalid [`Identifier`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("identifier '{input}' could not be parsed; use the format '{}'", IDENTIFIER_EXAMPLE)]
pub struct IdentifierError {
    input: String,
}

impl IdentifierError {
    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A key of the form `author.assetType.assetName` naming exactly one asset.
///
/// Equality covers all three parts. Ordering compares the author (ordinal),
/// then the asset type ordinal, then the asset name (ordinal).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    author: String,
    asset_type: AssetType,
    name: String,
}

impl Identifier {
    /// Build an identifier from its parts. No validation is performed; see
    /// [`Identifier::is_valid`].
    pub fn new(author: impl Into<String>, asset_type: AssetType, name: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            asset_type,
            name: name.into(),
        }
    }

    /// Parse `author.assetType.assetName`.
    ///
    /// Empty segments are dropped before counting, so `a..material.b` parses
    /// the same as `a.material.b`. The middle segment must be a known asset
    /// type name.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let parts: Vec<&str> = input.split('.').filter(|part| !part.is_empty()).collect();
        let [author, asset_type, name] = parts.as_slice() else {
            return Err(IdentifierError {
                input: input.to_string(),
            });
        };
        let asset_type = AssetType::parse(asset_type).ok_or_else(|| IdentifierError {
            input: input.to_string(),
        })?;
        Ok(Self::new(*author, asset_type, *name))
    }

    /// Author component.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Asset type component.
    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    /// Asset name component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `author.assetType.`, the fixed prefix an editor keeps while the
    /// asset name is being typed.
    pub fn to_root_string(&self) -> String {
        format!("{}.{}.", self.author, self.asset_type)
    }

    /// True when both the author and asset name are non-blank.
    pub fn is_valid(&self) -> bool {
        !self.author.trim().is_empty() && !self.name.trim().is_empty()
    }

    /// Copy of this identifier with only the author replaced.
    pub fn with_author(&self, author: impl Into<String>) -> Self {
        Self::new(author, self.asset_type, self.name.clone())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.author, self.asset_type, self.name)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.to_string()
    }
}
