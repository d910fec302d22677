use pwassets_core::{AssetType, Identifier};
use std::collections::HashSet;
use std::path::Path;

/// Read-only view of the library that asset validation runs against.
///
/// Built from disjoint borrows of the library so an asset can be validated
/// (and normalized) in place while the registry is shared.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Every registered identifier.
    pub identifiers: &'a HashSet<Identifier>,
    /// The `pw-assets` root directory.
    pub root: &'a Path,
}

impl<'a> ValidationContext<'a> {
    /// Bundle a registry and a root directory.
    pub fn new(identifiers: &'a HashSet<Identifier>, root: &'a Path) -> Self {
        Self { identifiers, root }
    }

    /// True if `id` is registered.
    pub fn has_identifier(&self, id: &Identifier) -> bool {
        self.identifiers.contains(id)
    }

    /// Record an error unless `reference` is registered and of `expected` type.
    pub(crate) fn check_reference(
        &self,
        owner: &Identifier,
        reference: &Identifier,
        expected: AssetType,
        errors: &mut Vec<String>,
    ) -> bool {
        if !self.has_identifier(reference) {
            errors.push(format!(
                "Undefined identifier '{reference}' in asset {owner}."
            ));
            return false;
        }
        if reference.asset_type() != expected {
            errors.push(format!(
                "Identifier '{reference}' in asset {owner} refers to a {}, expected a {expected}.",
                reference.asset_type()
            ));
            return false;
        }
        true
    }
}

/// Shared identifier check run first by every asset kind.
pub(crate) fn check_own_identifier(
    kind: &str,
    identifier: Option<&Identifier>,
    errors: &mut Vec<String>,
) -> bool {
    match identifier {
        None => {
            errors.push(format!("{kind} has no identifier."));
            false
        }
        Some(id) if !id.is_valid() => {
            errors.push(format!(
                "{kind} identifier '{id}' needs a non-blank author and asset name."
            ));
            false
        }
        Some(_) => true,
    }
}
