use crate::prompt::{Prompt, PromptAnswer, PromptRequest};
use crate::task::TaskOutcome;
use crate::LibraryError;
use pwassets_assets::{Asset, Map, Material, Prop, ValidationContext};
use pwassets_core::{AssetType, Identifier, ASSETS_DIR_NAME};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Every asset under one `pw-assets` directory, plus the edits not yet
/// written back to disk.
///
/// Each asset's identifier is registered exactly once. The pending-changes
/// queue may hold repeats; [`AssetLibrary::changes`] reports each identifier
/// once, in the order it was first queued.
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    pub(crate) root: PathBuf,
    author: String,
    allow_external_edits: bool,
    pub(crate) assets: Vec<Asset>,
    pub(crate) identifiers: HashSet<Identifier>,
    pub(crate) changes: Vec<Identifier>,
}

impl AssetLibrary {
    /// Empty library rooted at `root`. Nothing is read until [`AssetLibrary::load`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            author: String::new(),
            allow_external_edits: false,
            assets: Vec::new(),
            identifiers: HashSet::new(),
            changes: Vec::new(),
        }
    }

    /// True if `path` names a `pw-assets` directory.
    pub fn is_valid_assets_directory(path: &Path) -> bool {
        path.to_string_lossy()
            .trim_end_matches(['/', '\\'])
            .ends_with(ASSETS_DIR_NAME)
    }

    /// The library root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Point the library at another root. Loaded assets are kept.
    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = root.into();
    }

    /// Author that owns edits made through this library.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Change the current author.
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    /// Whether assets of other authors may be edited or deleted.
    pub fn allow_external_edits(&self) -> bool {
        self.allow_external_edits
    }

    /// Allow or forbid editing other authors' assets.
    pub fn set_allow_external_edits(&mut self, allow: bool) {
        self.allow_external_edits = allow;
    }

    /// Validation view over the current registry.
    pub fn validation_context(&self) -> ValidationContext<'_> {
        ValidationContext::new(&self.identifiers, &self.root)
    }

    /// All assets in load/insertion order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// All maps.
    pub fn maps(&self) -> impl Iterator<Item = &Map> + '_ {
        self.assets.iter().filter_map(|asset| match asset {
            Asset::Map(map) => Some(map),
            _ => None,
        })
    }

    /// All props.
    pub fn props(&self) -> impl Iterator<Item = &Prop> + '_ {
        self.assets.iter().filter_map(|asset| match asset {
            Asset::Prop(prop) => Some(prop),
            _ => None,
        })
    }

    /// All materials.
    pub fn materials(&self) -> impl Iterator<Item = &Material> + '_ {
        self.assets.iter().filter_map(|asset| match asset {
            Asset::Material(material) => Some(material),
            _ => None,
        })
    }

    /// All assets of one type.
    pub fn assets_of_type(&self, asset_type: AssetType) -> impl Iterator<Item = &Asset> + '_ {
        self.assets
            .iter()
            .filter(move |asset| asset.asset_type() == asset_type)
    }

    /// Registered identifiers of one type, sorted.
    pub fn sorted_identifiers(&self, asset_type: AssetType) -> Vec<Identifier> {
        let mut ids: Vec<Identifier> = self
            .identifiers
            .iter()
            .filter(|id| id.asset_type() == asset_type)
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Look up an asset.
    pub fn get(&self, id: &Identifier) -> Option<&Asset> {
        self.position(id).map(|index| &self.assets[index])
    }

    pub(crate) fn position(&self, id: &Identifier) -> Option<usize> {
        self.assets
            .iter()
            .position(|asset| asset.identifier() == Some(id))
    }

    /// True if `id` is registered.
    pub fn has_identifier(&self, id: &Identifier) -> bool {
        self.identifiers.contains(id)
    }

    /// Assets whose dependencies include `id`.
    pub fn get_assets_that_depend_on(&self, id: &Identifier) -> Vec<&Asset> {
        self.assets
            .iter()
            .filter(|asset| asset.depends_on(id))
            .collect()
    }

    /// Distinct authors of loaded assets, in first-seen order.
    pub fn existing_author_names(&self) -> Vec<String> {
        let mut authors: Vec<String> = Vec::new();
        for id in self.assets.iter().filter_map(Asset::identifier) {
            if !authors.iter().any(|author| author == id.author()) {
                authors.push(id.author().to_string());
            }
        }
        authors
    }

    /// The materials named by `ids`, skipping any that are not loaded.
    pub fn resolve_materials<'a>(
        &'a self,
        ids: impl IntoIterator<Item = &'a Identifier>,
    ) -> Vec<&'a Material> {
        ids.into_iter()
            .filter_map(|id| {
                self.materials()
                    .find(|material| material.identifier.as_ref() == Some(id))
            })
            .collect()
    }

    /// True if the current author may change `id`. Author names match
    /// case-insensitively here.
    pub fn can_edit(&self, id: &Identifier) -> bool {
        self.allow_external_edits || id.author().to_lowercase() == self.author.to_lowercase()
    }

    pub(crate) fn ensure_can_edit(&self, id: &Identifier) -> Result<(), LibraryError> {
        if self.can_edit(id) {
            Ok(())
        } else {
            Err(LibraryError::NotOwner {
                identifier: id.clone(),
                author: self.author.clone(),
            })
        }
    }

    /// Queue `id` for the next save.
    pub fn mark_changed(&mut self, id: &Identifier) {
        self.changes.push(id.clone());
    }

    /// Pending changes, each identifier once, in first-queued order.
    pub fn changes(&self) -> Vec<Identifier> {
        let mut seen = HashSet::new();
        self.changes
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect()
    }

    /// Forget all pending changes.
    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    /// Drop every asset, registration and pending change.
    pub fn clear_assets(&mut self) {
        self.assets.clear();
        self.identifiers.clear();
        self.changes.clear();
    }

    /// Admit an asset and queue it for saving.
    ///
    /// The asset gets its default JSON path if it has none.
    pub fn add_asset(&mut self, mut asset: Asset) -> Result<Identifier, LibraryError> {
        let id = asset
            .identifier()
            .cloned()
            .ok_or(LibraryError::MissingIdentifier)?;
        if self.identifiers.contains(&id) {
            return Err(LibraryError::DuplicateIdentifier(id));
        }
        if asset.json_path().is_none() {
            let path = asset.default_json_path(&self.root);
            asset.set_json_path(Some(path));
        }
        debug!(%id, "asset added");
        self.identifiers.insert(id.clone());
        self.assets.push(asset);
        self.changes.push(id.clone());
        Ok(id)
    }

    /// "New asset" flow: validate against the library, then add.
    ///
    /// Invalid assets are never added.
    pub fn create_asset(&mut self, mut asset: Asset) -> Result<Identifier, LibraryError> {
        let id = asset
            .identifier()
            .cloned()
            .ok_or(LibraryError::MissingIdentifier)?;
        if self.identifiers.contains(&id) {
            return Err(LibraryError::DuplicateIdentifier(id));
        }
        if asset.json_path().is_none() {
            let path = asset.default_json_path(&self.root);
            asset.set_json_path(Some(path));
        }

        let mut identifiers = self.identifiers.clone();
        identifiers.insert(id);
        let ctx = ValidationContext::new(&identifiers, &self.root);
        let mut errors = Vec::new();
        if !asset.validate(&ctx, &mut errors) {
            return Err(LibraryError::Invalid { errors });
        }
        self.add_asset(asset)
    }

    /// Replace the asset registered as `original` with an edited copy.
    ///
    /// The edit is validated first. If its identifier changed, `prompt` is
    /// asked whether references elsewhere should follow: yes rewrites every
    /// dependent asset, no moves only this asset, cancel leaves the library
    /// untouched.
    pub fn update_asset(
        &mut self,
        original: &Identifier,
        mut edited: Asset,
        prompt: &mut dyn Prompt,
    ) -> Result<TaskOutcome<Identifier>, LibraryError> {
        let index = self
            .position(original)
            .ok_or_else(|| LibraryError::UnknownIdentifier(original.clone()))?;
        self.ensure_can_edit(original)?;
        let new_id = edited
            .identifier()
            .cloned()
            .ok_or(LibraryError::MissingIdentifier)?;
        let renamed = new_id != *original;
        if renamed {
            if self.identifiers.contains(&new_id) {
                return Err(LibraryError::DuplicateIdentifier(new_id));
            }
            self.ensure_can_edit(&new_id)?;
        }
        if edited.json_path().is_none() {
            let path = self.assets[index].json_path_or_default(&self.root);
            edited.set_json_path(Some(path));
        }

        let mut identifiers = self.identifiers.clone();
        identifiers.remove(original);
        identifiers.insert(new_id.clone());
        let ctx = ValidationContext::new(&identifiers, &self.root);
        let mut errors = Vec::new();
        if !edited.validate(&ctx, &mut errors) {
            return Err(LibraryError::Invalid { errors });
        }

        if !renamed {
            self.assets[index] = edited;
            self.changes.push(new_id.clone());
            return Ok(TaskOutcome::Completed(new_id));
        }

        let answer = prompt.ask(&PromptRequest::ConfirmRefactor {
            from: original,
            to: &new_id,
        });
        match answer {
            PromptAnswer::Cancel => return Ok(TaskOutcome::Cancelled),
            PromptAnswer::Yes => {
                edited.set_identifier(Some(original.clone()));
                self.assets[index] = edited;
                self.refactor_identifier(original, &new_id)?;
            }
            PromptAnswer::No => {
                self.assets[index] = edited;
                self.identifiers.remove(original);
                self.identifiers.insert(new_id.clone());
                for queued in self.changes.iter_mut().filter(|queued| *queued == original) {
                    *queued = new_id.clone();
                }
                self.changes.push(new_id.clone());
            }
        }
        Ok(TaskOutcome::Completed(new_id))
    }

    /// Remove `asset` and its JSON file.
    pub fn remove_asset(&mut self, asset: &Asset) -> Result<(), LibraryError> {
        let id = asset
            .identifier()
            .cloned()
            .ok_or(LibraryError::MissingIdentifier)?;
        self.remove_by_identifier(&id)
    }

    /// Remove the asset registered as `id`, its queue entries and its JSON
    /// file. Nothing changes if the file cannot be deleted.
    pub fn remove_by_identifier(&mut self, id: &Identifier) -> Result<(), LibraryError> {
        let index = self
            .position(id)
            .ok_or_else(|| LibraryError::UnknownIdentifier(id.clone()))?;
        if let Some(path) = self.assets[index].json_path() {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(LibraryError::Io {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            }
        }
        self.assets.remove(index);
        self.identifiers.remove(id);
        self.changes.retain(|queued| queued != id);
        info!(%id, "asset removed");
        Ok(())
    }

    /// Rename `from` to `to` everywhere: the registry, the asset that owns
    /// `from`, every reference to it and the pending-changes queue.
    ///
    /// Returns how many assets changed. `to` must not be registered yet;
    /// otherwise [`LibraryError::DuplicateIdentifier`] is returned and
    /// nothing changes.
    pub fn refactor_identifier(
        &mut self,
        from: &Identifier,
        to: &Identifier,
    ) -> Result<usize, LibraryError> {
        if from == to {
            return Ok(0);
        }
        if self.identifiers.contains(to) {
            return Err(LibraryError::DuplicateIdentifier(to.clone()));
        }
        self.identifiers.remove(from);
        self.identifiers.insert(to.clone());
        for queued in self.changes.iter_mut().filter(|queued| *queued == from) {
            *queued = to.clone();
        }

        let mut changed = Vec::new();
        for asset in &mut self.assets {
            let mut touched = false;
            if asset.identifier() == Some(from) {
                asset.set_identifier(Some(to.clone()));
                touched = true;
            }
            touched |= asset.refactor_identifier(from, to);
            if touched {
                if let Some(id) = asset.identifier() {
                    changed.push(id.clone());
                }
            }
        }
        debug!(%from, %to, assets = changed.len(), "identifier refactored");
        let count = changed.len();
        self.changes.extend(changed);
        Ok(count)
    }

    /// Move every asset of author `old` to author `new`, rewriting
    /// references as it goes. Every renamed asset is queued for saving.
    /// Returns how many assets were renamed.
    ///
    /// Names that differ only by case are treated as the same name and the
    /// call does nothing. If any renamed identifier is already taken the
    /// call fails with [`LibraryError::DuplicateIdentifier`] before anything
    /// changes. The library's own author follows the rename.
    pub fn refactor_author_name(&mut self, old: &str, new: &str) -> Result<usize, LibraryError> {
        if old.to_lowercase() == new.to_lowercase() {
            return Ok(0);
        }
        if let Some(taken) = self
            .assets
            .iter()
            .filter_map(Asset::identifier)
            .filter(|id| id.author() == old)
            .map(|id| id.with_author(new))
            .find(|renamed| self.identifiers.contains(renamed))
        {
            return Err(LibraryError::DuplicateIdentifier(taken));
        }

        let mut renames = Vec::new();
        for asset in &mut self.assets {
            let Some(before) = asset.identifier().cloned() else {
                continue;
            };
            if asset.refactor_author_name(old, new) {
                if let Some(after) = asset.identifier() {
                    renames.push((before, after.clone()));
                }
            }
        }
        for (before, after) in &renames {
            // The owner already carries the new identifier; this moves the
            // registry entry and every reference.
            self.refactor_identifier(before, after)?;
            self.changes.push(after.clone());
        }
        if self.author == old {
            self.author = new.to_string();
        }
        info!(old, new, assets = renames.len(), "author renamed");
        Ok(renames.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;
    use pwassets_assets::{MapBlock, MapBlockKind, MaterialProperties};
    use pwassets_core::MaterialColor;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    fn material(name: &str) -> Asset {
        Asset::Material(Material {
            identifier: Some(id(name)),
            json_path: None,
            properties: MaterialProperties {
                name: "m".into(),
                color: MaterialColor::GRAY,
                ..MaterialProperties::default()
            },
        })
    }

    fn map_using(name: &str, material: &str) -> Asset {
        let mut map = Map {
            identifier: Some(id(name)),
            ..Map::default()
        };
        map.info.name = "Map".into();
        map.info.description = "desc".into();
        map.blocks.push(MapBlock::new(MapBlockKind::Block {
            shape: pwassets_assets::ShapeType::Cube,
            material: id(material),
            effects: Vec::new(),
        }));
        Asset::Map(map)
    }

    fn library() -> AssetLibrary {
        let mut library = AssetLibrary::new("/nonexistent/pw-assets");
        library.set_author("luke");
        library
    }

    #[test]
    fn root_name_must_end_with_marker() {
        assert!(AssetLibrary::is_valid_assets_directory(Path::new("/games/pw-assets")));
        assert!(AssetLibrary::is_valid_assets_directory(Path::new("/games/pw-assets/")));
        assert!(!AssetLibrary::is_valid_assets_directory(Path::new("/games/assets")));
    }

    #[test]
    fn add_requires_identifier_and_uniqueness() {
        let mut library = library();
        assert!(matches!(
            library.add_asset(Asset::new(AssetType::Material)),
            Err(LibraryError::MissingIdentifier)
        ));
        library.add_asset(material("luke.material.a")).unwrap();
        assert!(matches!(
            library.add_asset(material("luke.material.a")),
            Err(LibraryError::DuplicateIdentifier(_))
        ));
        assert_eq!(
            library.get(&id("luke.material.a")).unwrap().json_path(),
            Some(Path::new("/nonexistent/pw-assets/materials/a.json"))
        );
    }

    #[test]
    fn changes_are_deduplicated_in_first_seen_order() {
        let mut library = library();
        library.add_asset(material("luke.material.b")).unwrap();
        library.add_asset(material("luke.material.a")).unwrap();
        library.mark_changed(&id("luke.material.b"));
        library.mark_changed(&id("luke.material.a"));
        assert_eq!(
            library.changes(),
            vec![id("luke.material.b"), id("luke.material.a")]
        );
        library.clear_changes();
        assert!(library.changes().is_empty());
    }

    #[test]
    fn create_rejects_invalid_assets() {
        let mut library = library();
        let err = library
            .create_asset(map_using("luke.map.m", "luke.material.none"))
            .unwrap_err();
        match err {
            LibraryError::Invalid { errors } => assert!(errors[0].contains("luke.material.none")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(library.assets().is_empty());
        assert!(!library.has_identifier(&id("luke.map.m")));
    }

    #[test]
    fn refactor_moves_registry_references_and_queue() {
        let mut library = library();
        library.add_asset(material("luke.material.a")).unwrap();
        library.add_asset(map_using("luke.map.m", "luke.material.a")).unwrap();
        library.clear_changes();

        let changed = library
            .refactor_identifier(&id("luke.material.a"), &id("luke.material.z"))
            .unwrap();
        assert_eq!(changed, 2);
        assert!(library.has_identifier(&id("luke.material.z")));
        assert!(!library.has_identifier(&id("luke.material.a")));
        assert_eq!(
            library.get(&id("luke.map.m")).unwrap().dependencies(),
            vec![id("luke.material.z")]
        );
        assert_eq!(
            library.changes(),
            vec![id("luke.material.z"), id("luke.map.m")]
        );
    }

    #[test]
    fn author_rename_follows_references_and_skips_case_only_changes() {
        let mut library = library();
        library.add_asset(material("luke.material.a")).unwrap();
        library.add_asset(map_using("luke.map.m", "luke.material.a")).unwrap();

        library.clear_changes();
        assert_eq!(library.refactor_author_name("luke", "LUKE").unwrap(), 0);
        assert!(library.changes().is_empty());
        assert_eq!(library.refactor_author_name("luke", "mark").unwrap(), 2);
        assert_eq!(library.author(), "mark");
        let mut queued = library.changes();
        queued.sort();
        assert_eq!(queued, vec![id("mark.material.a"), id("mark.map.m")]);
        assert_eq!(
            library.get(&id("mark.map.m")).unwrap().dependencies(),
            vec![id("mark.material.a")]
        );
        assert_eq!(library.existing_author_names(), vec!["mark".to_string()]);
    }

    #[test]
    fn update_rename_without_refactor_leaves_references() {
        let mut library = library();
        library.add_asset(material("luke.material.a")).unwrap();
        library.add_asset(map_using("luke.map.m", "luke.material.a")).unwrap();

        let mut edited = library.get(&id("luke.material.a")).unwrap().clone();
        edited.set_identifier(Some(id("luke.material.b")));
        let mut prompt = ScriptedPrompt::new([PromptAnswer::No]);
        let outcome = library
            .update_asset(&id("luke.material.a"), edited, &mut prompt)
            .unwrap();
        assert_eq!(outcome, TaskOutcome::Completed(id("luke.material.b")));
        assert!(library.has_identifier(&id("luke.material.b")));
        assert!(!library.has_identifier(&id("luke.material.a")));
        assert_eq!(
            library.get(&id("luke.map.m")).unwrap().dependencies(),
            vec![id("luke.material.a")]
        );
    }

    #[test]
    fn update_rename_with_refactor_and_cancel() {
        let mut library = library();
        library.add_asset(material("luke.material.a")).unwrap();
        library.add_asset(map_using("luke.map.m", "luke.material.a")).unwrap();

        let mut edited = library.get(&id("luke.material.a")).unwrap().clone();
        edited.set_identifier(Some(id("luke.material.b")));

        let mut cancel = ScriptedPrompt::new([PromptAnswer::Cancel]);
        let outcome = library
            .update_asset(&id("luke.material.a"), edited.clone(), &mut cancel)
            .unwrap();
        assert!(outcome.is_cancelled());
        assert!(library.has_identifier(&id("luke.material.a")));

        let mut yes = ScriptedPrompt::new([PromptAnswer::Yes]);
        library
            .update_asset(&id("luke.material.a"), edited, &mut yes)
            .unwrap();
        assert_eq!(
            library.get(&id("luke.map.m")).unwrap().dependencies(),
            vec![id("luke.material.b")]
        );
    }

    #[test]
    fn other_authors_assets_are_protected() {
        let mut library = library();
        library.add_asset(material("mark.material.a")).unwrap();
        let edited = library.get(&id("mark.material.a")).unwrap().clone();
        let mut prompt = ScriptedPrompt::default();
        assert!(matches!(
            library.update_asset(&id("mark.material.a"), edited.clone(), &mut prompt),
            Err(LibraryError::NotOwner { .. })
        ));
        library.set_allow_external_edits(true);
        assert!(library
            .update_asset(&id("mark.material.a"), edited, &mut prompt)
            .is_ok());
    }

    #[test]
    fn queries_filter_by_type_and_dependency() {
        let mut library = library();
        library.add_asset(material("luke.material.b")).unwrap();
        library.add_asset(material("luke.material.a")).unwrap();
        library.add_asset(map_using("luke.map.m", "luke.material.a")).unwrap();

        assert_eq!(library.materials().count(), 2);
        assert_eq!(library.maps().count(), 1);
        assert_eq!(library.props().count(), 0);
        assert_eq!(library.assets_of_type(AssetType::Material).count(), 2);
        assert_eq!(
            library.sorted_identifiers(AssetType::Material),
            vec![id("luke.material.a"), id("luke.material.b")]
        );
        let dependents = library.get_assets_that_depend_on(&id("luke.material.a"));
        assert_eq!(dependents.len(), 1);
        assert_eq!(dependents[0].identifier(), Some(&id("luke.map.m")));

        let wanted = [id("luke.material.a"), id("luke.material.q")];
        assert_eq!(library.resolve_materials(&wanted).len(), 1);
    }

    #[test]
    fn refactor_onto_taken_identifier_is_refused() {
        let mut library = library();
        library.add_asset(material("luke.material.a")).unwrap();
        library.add_asset(material("luke.material.b")).unwrap();
        library.add_asset(map_using("luke.map.m", "luke.material.a")).unwrap();
        library.clear_changes();

        assert!(matches!(
            library.refactor_identifier(&id("luke.material.a"), &id("luke.material.b")),
            Err(LibraryError::DuplicateIdentifier(taken)) if taken == id("luke.material.b")
        ));
        assert!(library.has_identifier(&id("luke.material.a")));
        assert_eq!(
            library.get(&id("luke.map.m")).unwrap().dependencies(),
            vec![id("luke.material.a")]
        );
        assert!(library.changes().is_empty());
        assert_eq!(
            library
                .refactor_identifier(&id("luke.material.a"), &id("luke.material.a"))
                .unwrap(),
            0
        );
    }

    #[test]
    fn author_rename_onto_existing_identifier_changes_nothing() {
        let mut library = library();
        library.add_asset(material("luke.material.rock")).unwrap();
        library.add_asset(material("luke.material.sand")).unwrap();
        library.add_asset(material("mark.material.rock")).unwrap();
        library.clear_changes();

        assert!(matches!(
            library.refactor_author_name("luke", "mark"),
            Err(LibraryError::DuplicateIdentifier(taken)) if taken == id("mark.material.rock")
        ));
        assert_eq!(library.author(), "luke");
        assert!(library.has_identifier(&id("luke.material.rock")));
        assert!(library.has_identifier(&id("luke.material.sand")));
        assert!(!library.has_identifier(&id("mark.material.sand")));
        let rocks = library
            .assets()
            .iter()
            .filter(|asset| asset.identifier() == Some(&id("mark.material.rock")))
            .count();
        assert_eq!(rocks, 1);
        assert!(library.changes().is_empty());
    }
}
