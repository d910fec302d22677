//! Library Round-Trip Tests
//!
//! Loads real `pw-assets` trees from disk and checks:
//! - progress and cancellation during load
//! - parse and validation errors in the load report
//! - refactoring identifiers and authors, then saving the result
//! - the serialized form of a material against a golden file

use anyhow::Result;
use pwassets_core::Identifier;
use pwassets_library::{
    AssetLibrary, CancelToken, LibraryError, LoadReport, NoProgress, TaskOutcome,
};
use pwassets_testkit::{
    assert_json_snapshot, assert_same_json, entity_block, init_test_logging, prop_block,
    shape_block, AssetPack,
};
use serde_json::json;
use std::fs;

fn id(s: &str) -> Identifier {
    Identifier::parse(s).unwrap()
}

fn load(pack: &AssetPack) -> Result<(AssetLibrary, LoadReport)> {
    let mut library = AssetLibrary::new(pack.root());
    library.set_author("luke");
    let report = library
        .load(&mut NoProgress, &CancelToken::new())?
        .completed()
        .expect("load was not cancelled");
    Ok((library, report))
}

/// Material, prop and map wired together the way the game expects.
fn small_world(pack: &AssetPack) -> Result<()> {
    pack.color_material("luke", "rock", json!([0.4, 0.4, 0.4]))?;
    pack.textured_material("luke", "grass", "textures/grass.png", true)?;
    pack.prop("luke", "tree", "tree.obj", &["luke.material.grass"])?;
    pack.map(
        "luke",
        "mars",
        vec![
            shape_block("cube", "luke.material.rock"),
            prop_block("luke.prop.tree"),
            entity_block("spawn"),
        ],
    )?;
    Ok(())
}

#[test]
fn load_reports_monotonic_progress_up_to_100() -> Result<()> {
    init_test_logging();
    let pack = AssetPack::new()?;
    small_world(&pack)?;

    let mut library = AssetLibrary::new(pack.root());
    let mut seen = Vec::new();
    let outcome = library.load(&mut |percent: u8| seen.push(percent), &CancelToken::new())?;
    let report = outcome.completed().expect("load was not cancelled");

    assert!(report.is_success(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.loaded, 4);
    assert_eq!(library.maps().count(), 1);
    assert_eq!(library.props().count(), 1);
    assert_eq!(library.materials().count(), 2);
    assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]), "{seen:?}");
    assert_eq!(seen.last(), Some(&100));
    Ok(())
}

#[test]
fn missing_category_folders_are_created() -> Result<()> {
    let pack = AssetPack::bare()?;
    let (library, report) = load(&pack)?;
    assert!(report.is_success());
    assert!(library.assets().is_empty());
    for category in ["maps", "props", "materials"] {
        assert!(pack.path(category).is_dir(), "{category} was not created");
    }
    Ok(())
}

#[test]
fn invalid_root_is_refused() -> Result<()> {
    let pack = AssetPack::new()?;
    let elsewhere = pack.root().parent().expect("temp root").join("not-assets");
    fs::create_dir_all(&elsewhere)?;

    let mut library = AssetLibrary::new(&elsewhere);
    let err = library
        .load(&mut NoProgress, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, LibraryError::InvalidRoot(_)));
    assert!(!elsewhere.join("maps").exists());
    Ok(())
}

#[test]
fn missing_texture_names_file_and_asset() -> Result<()> {
    init_test_logging();
    let pack = AssetPack::new()?;
    pack.textured_material("luke", "mud", "textures/mud.png", false)?;

    let (library, report) = load(&pack)?;
    assert!(!report.is_success());
    assert_eq!(report.loaded, 1);
    assert!(library.has_identifier(&id("luke.material.mud")));
    let message = report
        .errors
        .iter()
        .find(|message| message.contains("mud.png"))
        .expect("missing texture reported");
    assert!(message.contains("luke.material.mud"), "{message}");
    Ok(())
}

#[test]
fn unresolved_reference_is_reported() -> Result<()> {
    let pack = AssetPack::new()?;
    pack.map("luke", "mars", vec![shape_block("cube", "luke.material.nothing")])?;

    let (_, report) = load(&pack)?;
    assert!(report
        .errors
        .iter()
        .any(|message| message.contains("Undefined identifier 'luke.material.nothing'")));
    Ok(())
}

#[test]
fn duplicate_keys_fail_only_their_file() -> Result<()> {
    let pack = AssetPack::new()?;
    pack.color_material("luke", "rock", json!(0.5))?;
    pack.write_file(
        "materials/twice.json",
        r#"{
            "identifier": "luke.material.twice",
            "identifier": "luke.material.again",
            "material": { "name": "twice", "color": 1 }
        }"#,
    )?;

    let (library, report) = load(&pack)?;
    assert_eq!(report.loaded, 1);
    assert!(library.has_identifier(&id("luke.material.rock")));
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("twice.json"));
    assert!(report.errors[0].contains("duplicate property 'identifier'"));
    Ok(())
}

#[test]
fn duplicate_identifier_keeps_the_first_file() -> Result<()> {
    let pack = AssetPack::new()?;
    pack.color_material("luke", "rock", json!(0.5))?;
    pack.write_json(
        "materials/zz_copy.json",
        &json!({"identifier": "luke.material.rock", "material": {"name": "copy", "color": 1}}),
    )?;

    let (library, report) = load(&pack)?;
    assert_eq!(report.loaded, 1);
    assert_eq!(library.materials().count(), 1);
    assert!(report.errors[0].contains("zz_copy.json"));
    assert!(report.errors[0].contains("already defined"));
    Ok(())
}

#[test]
fn cancelled_load_reports_cancelled() -> Result<()> {
    let pack = AssetPack::new()?;
    small_world(&pack)?;
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut library = AssetLibrary::new(pack.root());
    let outcome = library.load(&mut NoProgress, &cancel)?;
    assert_eq!(outcome, TaskOutcome::Cancelled);
    Ok(())
}

#[test]
fn refactor_and_inverse_restore_saved_documents() -> Result<()> {
    init_test_logging();
    let pack = AssetPack::new()?;
    small_world(&pack)?;
    let (mut library, _) = load(&pack)?;
    let (mars, rock, stone) = (
        id("luke.map.mars"),
        id("luke.material.rock"),
        id("luke.material.stone"),
    );
    let before_map = library.get(&mars).expect("map loaded").to_json()?;
    let before_rock = library.get(&rock).expect("rock loaded").to_json()?;

    assert_eq!(library.refactor_identifier(&rock, &stone)?, 2);
    assert!(library.has_identifier(&stone) && !library.has_identifier(&rock));
    assert_eq!(library.get_assets_that_depend_on(&stone).len(), 1);

    assert_eq!(library.refactor_identifier(&stone, &rock)?, 2);
    let saved = library
        .save_pending(&mut NoProgress, &CancelToken::new())
        .completed()
        .expect("save was not cancelled");
    assert!(saved.is_success(), "{:?}", saved.failed);
    assert!(library.changes().is_empty());

    let (reloaded, report) = load(&pack)?;
    assert!(report.is_success(), "{:?}", report.errors);
    assert_eq!(reloaded.assets().len(), 4);
    let map = reloaded.get(&mars).expect("map reloaded");
    assert_same_json(&map.to_json()?, &before_map)?;
    let rock = reloaded.get(&rock).expect("rock reloaded");
    assert_eq!(rock.to_json()?, before_rock);
    Ok(())
}

#[test]
fn author_rename_moves_assets_and_references() -> Result<()> {
    let pack = AssetPack::new()?;
    small_world(&pack)?;
    pack.color_material("leia", "sand", json!(0.9))?;

    let (mut library, _) = load(&pack)?;
    assert_eq!(library.refactor_author_name("luke", "Luke")?, 0);
    assert_eq!(library.refactor_author_name("luke", "mark")?, 4);

    assert_eq!(library.author(), "mark");
    assert!(library.has_identifier(&id("mark.map.mars")));
    assert!(library.has_identifier(&id("leia.material.sand")));
    assert!(!library.has_identifier(&id("luke.prop.tree")));
    let map = library.get(&id("mark.map.mars")).expect("map renamed");
    assert!(map.depends_on(&id("mark.material.rock")));
    assert!(map.depends_on(&id("mark.prop.tree")));

    let mut authors = library.existing_author_names();
    authors.sort();
    assert_eq!(authors, vec!["leia", "mark"]);
    Ok(())
}

#[test]
fn author_rename_is_saved_with_pending_changes() -> Result<()> {
    let pack = AssetPack::new()?;
    small_world(&pack)?;
    pack.color_material("leia", "sand", json!(0.9))?;

    let (mut library, _) = load(&pack)?;
    assert_eq!(library.refactor_author_name("luke", "mark")?, 4);
    assert_eq!(library.changes().len(), 4);

    let saved = library
        .save_pending(&mut NoProgress, &CancelToken::new())
        .completed()
        .expect("save was not cancelled");
    assert!(saved.is_success(), "{:?}", saved.failed);
    assert_eq!(saved.written.len(), 4);
    assert!(library.changes().is_empty());
    assert_eq!(pack.read_json("materials/rock.json")?["identifier"], "mark.material.rock");
    assert_eq!(pack.read_json("materials/sand.json")?["identifier"], "leia.material.sand");

    let (reloaded, report) = load(&pack)?;
    assert!(report.is_success(), "{:?}", report.errors);
    let mut authors = reloaded.existing_author_names();
    authors.sort();
    assert_eq!(authors, vec!["leia", "mark"]);
    let map = reloaded.get(&id("mark.map.mars")).expect("renamed map on disk");
    assert!(map.depends_on(&id("mark.material.rock")));
    assert!(map.depends_on(&id("mark.prop.tree")));
    Ok(())
}

#[test]
fn author_rename_onto_taken_identifier_leaves_files_alone() -> Result<()> {
    let pack = AssetPack::new()?;
    pack.color_material("luke", "rock", json!(0.5))?;
    pack.write_json(
        "materials/mark_rock.json",
        &json!({"identifier": "mark.material.rock", "material": {"name": "rock", "color": 0.9}}),
    )?;
    let (mut library, report) = load(&pack)?;
    assert!(report.is_success(), "{:?}", report.errors);
    let before = pack.read_json("materials/rock.json")?;

    let err = library.refactor_author_name("luke", "mark").unwrap_err();
    assert!(
        matches!(&err, LibraryError::DuplicateIdentifier(taken) if *taken == id("mark.material.rock")),
        "{err}"
    );
    assert!(library.has_identifier(&id("luke.material.rock")));
    assert!(library.changes().is_empty());

    let saved = library
        .save_pending(&mut NoProgress, &CancelToken::new())
        .completed()
        .expect("save was not cancelled");
    assert!(saved.written.is_empty());
    assert_same_json(&pack.read_json("materials/rock.json")?, &before)?;
    Ok(())
}

#[test]
fn failed_write_stays_queued() -> Result<()> {
    let pack = AssetPack::new()?;
    pack.color_material("luke", "rock", json!(0.5))?;
    pack.color_material("luke", "sand", json!(0.9))?;
    let (mut library, _) = load(&pack)?;

    let (rock, sand) = (id("luke.material.rock"), id("luke.material.sand"));
    library.mark_changed(&rock);
    library.mark_changed(&sand);
    library.mark_changed(&rock);
    assert_eq!(library.changes(), vec![rock.clone(), sand.clone()]);

    // A directory where the file should go makes the write fail.
    fs::remove_file(pack.path("materials/sand.json"))?;
    fs::create_dir_all(pack.path("materials/sand.json"))?;

    let report = library
        .save_pending(&mut NoProgress, &CancelToken::new())
        .completed()
        .expect("save was not cancelled");
    assert_eq!(report.written.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, sand);
    assert_eq!(library.changes(), vec![sand]);
    Ok(())
}

#[test]
fn color_material_matches_golden() -> Result<()> {
    let pack = AssetPack::new()?;
    pack.color_material("luke", "rust", json!([1, 0.5, 0]))?;
    let (library, report) = load(&pack)?;
    assert!(report.is_success(), "{:?}", report.errors);

    let rust = library.get(&id("luke.material.rust")).expect("rust loaded");
    assert_json_snapshot(
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/snapshots/rust_material.json"),
        &rust.to_json()?,
    )
}
