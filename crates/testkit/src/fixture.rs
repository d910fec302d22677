//! Throwaway `pw-assets` directories populated from test code.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;

/// Name the library root must end with.
pub const ROOT_DIR_NAME: &str = "pw-assets";

/// An asset library root inside a temporary directory.
///
/// The directory is removed when the fixture is dropped.
pub struct AssetPack {
    _dir: TempDir,
    root: PathBuf,
}

impl AssetPack {
    /// Empty library with the three category folders.
    pub fn new() -> Result<Self> {
        let pack = Self::bare()?;
        for category in ["maps", "props", "materials"] {
            fs::create_dir_all(pack.root.join(category))?;
        }
        Ok(pack)
    }

    /// Library root only, without category folders.
    pub fn bare() -> Result<Self> {
        let dir = TempDir::new().context("creating temp dir")?;
        let root = dir.path().join(ROOT_DIR_NAME);
        fs::create_dir_all(&root)?;
        Ok(Self { _dir: dir, root })
    }

    /// The `pw-assets` directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `rel` under the root.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// True if `rel` exists under the root.
    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Write raw bytes to `rel`, creating parent directories.
    pub fn write_file(&self, rel: &str, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        debug!(path = %path.display(), "fixture file written");
        Ok(path)
    }

    /// Write `value` as pretty JSON to `rel`.
    pub fn write_json(&self, rel: &str, value: &Value) -> Result<PathBuf> {
        self.write_file(rel, serde_json::to_string_pretty(value)?)
    }

    /// Read `rel` back as JSON.
    pub fn read_json(&self, rel: &str) -> Result<Value> {
        let text = fs::read_to_string(self.path(rel))
            .with_context(|| format!("reading {rel}"))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `materials/<name>.json` with a flat color.
    pub fn color_material(&self, author: &str, name: &str, color: Value) -> Result<PathBuf> {
        self.write_json(
            &format!("materials/{name}.json"),
            &json!({
                "identifier": format!("{author}.material.{name}"),
                "material": {"name": name, "color": color}
            }),
        )
    }

    /// `materials/<name>.json` with a texture at `materials/<texture>`.
    ///
    /// The texture file itself is only written when `create_texture` is set.
    pub fn textured_material(
        &self,
        author: &str,
        name: &str,
        texture: &str,
        create_texture: bool,
    ) -> Result<PathBuf> {
        if create_texture {
            self.write_file(&format!("materials/{texture}"), b"\x89PNG")?;
        }
        self.write_json(
            &format!("materials/{name}.json"),
            &json!({
                "identifier": format!("{author}.material.{name}"),
                "material": {"name": name, "texture": texture}
            }),
        )
    }

    /// `props/<name>/<name>.json` with its model written next to it.
    pub fn prop(&self, author: &str, name: &str, model: &str, materials: &[&str]) -> Result<PathBuf> {
        self.write_file(&format!("props/{name}/{model}"), b"o mesh\n")?;
        self.write_json(
            &format!("props/{name}/{name}.json"),
            &json!({
                "identifier": format!("{author}.prop.{name}"),
                "prop": {"name": name, "model": model, "materials": materials}
            }),
        )
    }

    /// `maps/<name>.json` with the given block objects.
    pub fn map(&self, author: &str, name: &str, blocks: Vec<Value>) -> Result<PathBuf> {
        self.write_json(
            &format!("maps/{name}.json"),
            &json!({
                "identifier": format!("{author}.map.{name}"),
                "map": {"name": name, "description": format!("{name} test map")},
                "blocks": blocks
            }),
        )
    }

    /// Every file under the root, relative and `/`-separated, sorted.
    pub fn files(&self) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&self.root)
                    .ok()
                    .map(|rel| {
                        rel.components()
                            .map(|c| c.as_os_str().to_string_lossy().into_owned())
                            .collect::<Vec<_>>()
                            .join("/")
                    })
            })
            .collect();
        files.sort();
        files
    }
}

/// A `block` map block of the given shape.
pub fn shape_block(shape: &str, material: &str) -> Value {
    json!({"type": "block", "shape": shape, "material": material})
}

/// A `prop` map block.
pub fn prop_block(prop: &str) -> Value {
    json!({"type": "prop", "prop": prop, "transform": {"position": [0, 1, 0]}})
}

/// An `entity` map block.
pub fn entity_block(entity: &str) -> Value {
    json!({"type": "entity", "entity": entity})
}
