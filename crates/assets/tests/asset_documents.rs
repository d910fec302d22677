//! Reading, validating and re-writing asset documents on a real directory.

use pwassets_assets::{Asset, AssetError, ValidationContext};
use pwassets_core::{AssetType, Identifier};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn id(s: &str) -> Identifier {
    Identifier::parse(s).unwrap()
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

struct Pack {
    _dir: TempDir,
    root: PathBuf,
}

fn pack() -> Pack {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("pw-assets");
    fs::create_dir_all(&root).unwrap();
    Pack { _dir: dir, root }
}

#[test]
fn prop_survives_write_and_reload() {
    let pack = pack();
    let json_path = pack.root.join("props/tree/tree.json");
    write(&pack.root.join("props/tree/models/tree.glb"), "glTF");
    write(
        &json_path,
        r#"{
            "identifier": "luke.prop.tree",
            "prop": {
                "name": "Tree",
                "model": "models/tree.glb",
                "base_scale": 2,
                "materials": ["luke.material.bark", "luke.material.leaf"]
            }
        }"#,
    );
    let ids: HashSet<Identifier> = [
        id("luke.prop.tree"),
        id("luke.material.bark"),
        id("luke.material.leaf"),
    ]
    .into_iter()
    .collect();
    let ctx = ValidationContext::new(&ids, &pack.root);

    let mut asset = Asset::load(AssetType::Prop, &json_path).unwrap();
    let mut errors = Vec::new();
    assert!(asset.validate(&ctx, &mut errors), "{errors:?}");

    let written = asset.to_json_string().unwrap();
    fs::write(&json_path, &written).unwrap();
    let mut reloaded = Asset::load(AssetType::Prop, &json_path).unwrap();
    assert!(reloaded.validate(&ctx, &mut errors), "{errors:?}");
    assert_eq!(reloaded.identifier(), asset.identifier());
    assert_eq!(reloaded.dependencies(), asset.dependencies());
    assert_eq!(reloaded.to_json().unwrap(), asset.to_json().unwrap());
}

#[test]
fn map_survives_write_and_reload() {
    let pack = pack();
    let json_path = pack.root.join("maps/mars.json");
    write(
        &json_path,
        r#"{
            "identifier": "luke.map.mars",
            "map": {"name": "Mars", "description": "Red planet", "death_plane": -50},
            "blocks": [
                {"type": "block", "shape": "cube", "material": "luke.material.rock",
                 "transform": {"position": [0, -1, 0], "scale": [100, 1, 100]}},
                {"type": "prop", "prop": "luke.prop.tree", "transform": {"rotation": [0, 90, 0]}},
                {"type": "entity", "entity": "spawn"},
                {"type": "text", "text": {"content": "Welcome", "wrap": 4, "color": [1, 0, 0]}}
            ]
        }"#,
    );
    let ids: HashSet<Identifier> = [
        id("luke.map.mars"),
        id("luke.material.rock"),
        id("luke.prop.tree"),
    ]
    .into_iter()
    .collect();
    let ctx = ValidationContext::new(&ids, &pack.root);

    let mut asset = Asset::load(AssetType::Map, &json_path).unwrap();
    let mut errors = Vec::new();
    assert!(asset.validate(&ctx, &mut errors), "{errors:?}");
    assert_eq!(
        asset.dependencies(),
        vec![id("luke.material.rock"), id("luke.prop.tree")]
    );

    let reparsed = Asset::from_json_str(AssetType::Map, &asset.to_json_string().unwrap()).unwrap();
    assert_eq!(reparsed.to_json().unwrap(), asset.to_json().unwrap());
    assert_eq!(reparsed.dependencies(), asset.dependencies());
}

#[test]
fn missing_texture_names_file_and_identifier() {
    let pack = pack();
    let json_path = pack.root.join("materials/grass.json");
    write(
        &json_path,
        r#"{"identifier": "luke.material.grass", "material": {"name": "Grass", "texture": "textures/grass.png"}}"#,
    );
    let ids: HashSet<Identifier> = [id("luke.material.grass")].into_iter().collect();
    let ctx = ValidationContext::new(&ids, &pack.root);

    let mut asset = Asset::load(AssetType::Material, &json_path).unwrap();
    let mut errors = Vec::new();
    assert!(!asset.validate(&ctx, &mut errors));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("luke.material.grass"));
    assert!(errors[0].contains("grass.png"));
}

#[test]
fn material_without_color_or_texture_fails_to_parse() {
    let err = Asset::from_json_str(
        AssetType::Material,
        r#"{"identifier": "luke.material.x", "material": {"name": "X"}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, AssetError::Parse(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let pack = pack();
    let err = Asset::load(AssetType::Map, &pack.root.join("maps/none.json")).unwrap_err();
    assert!(matches!(err, AssetError::Io(_)));
}

#[test]
fn refactor_then_inverse_restores_document() {
    let mut asset = Asset::from_json_str(
        AssetType::Prop,
        r#"{"identifier": "a.prop.p", "prop": {"name": "P", "model": "p.obj", "material": "a.material.old"}}"#,
    )
    .unwrap();
    let before = asset.to_json().unwrap();
    let (from, to) = (id("a.material.old"), id("a.material.new"));

    assert!(asset.refactor_identifier(&from, &to));
    assert!(asset.depends_on(&to));
    assert!(!asset.depends_on(&from));
    assert!(asset.refactor_identifier(&to, &from));
    assert_eq!(asset.to_json().unwrap(), before);
}
