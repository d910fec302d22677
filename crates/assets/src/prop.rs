//! Props: a model file plus the materials applied to it.

use crate::validation::{check_own_identifier, ValidationContext};
use crate::{describe_extensions, extension_allowed, extension_of, AssetError};
use pwassets_core::{paths, AssetType, Identifier};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::warn;

/// Model formats the game can import.
pub const MODEL_EXTENSIONS: [&str; 6] = ["OBJ", "STL", "GLB", "GLTF", "DAE", "FBX"];

static PARTIAL_MODEL_SUPPORT: Once = Once::new();

fn default_base_scale() -> f32 {
    1.0
}

/// The `prop` object of a prop file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropProperties {
    /// Display name.
    pub name: String,
    /// Model path relative to the JSON file.
    pub model: String,
    /// Uniform scale applied on spawn. Must not be zero.
    #[serde(default = "default_base_scale")]
    pub base_scale: f32,
    /// Single material for the whole model.
    #[serde(default)]
    pub material: Option<Identifier>,
    /// One material per model submesh.
    #[serde(default)]
    pub materials: Option<Vec<Identifier>>,
}

impl Default for PropProperties {
    fn default() -> Self {
        Self {
            name: String::new(),
            model: String::new(),
            base_scale: default_base_scale(),
            material: None,
            materials: None,
        }
    }
}

/// A placeable model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prop {
    /// Unique key; `None` while the asset is being created.
    pub identifier: Option<Identifier>,
    /// Where the JSON file lives, if known.
    pub json_path: Option<PathBuf>,
    /// Prop fields.
    pub properties: PropProperties,
}

#[derive(Deserialize)]
pub(crate) struct PropFile {
    identifier: Identifier,
    prop: PropProperties,
}

impl From<PropFile> for Prop {
    fn from(file: PropFile) -> Self {
        Self {
            identifier: Some(file.identifier),
            json_path: None,
            properties: file.prop,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct PropDocument<'a> {
    identifier: Option<&'a Identifier>,
    prop: PropBody<'a>,
}

#[derive(Serialize)]
struct PropBody<'a> {
    name: &'a str,
    model: &'a str,
    base_scale: f32,
    materials: &'a [Identifier],
}

impl Prop {
    /// Every material this prop references, whichever field holds them.
    pub fn materials(&self) -> &[Identifier] {
        match (&self.properties.material, &self.properties.materials) {
            (Some(material), _) => std::slice::from_ref(material),
            (None, Some(materials)) => materials,
            (None, None) => &[],
        }
    }

    /// Replace the materials, using the single-material field for one entry.
    pub fn set_materials(&mut self, mut materials: Vec<Identifier>) {
        if materials.len() == 1 {
            self.properties.material = materials.pop();
            self.properties.materials = None;
        } else {
            self.properties.material = None;
            self.properties.materials = Some(materials);
        }
    }

    /// Store a model reference after checking its extension.
    pub fn set_model(&mut self, model: impl Into<String>) -> Result<(), AssetError> {
        let model = model.into();
        let extension = extension_of(&model);
        if !extension_allowed(&extension, &MODEL_EXTENSIONS) {
            return Err(AssetError::UnsupportedExtension {
                kind: "model",
                path: PathBuf::from(&model),
                extension,
                supported: describe_extensions(&MODEL_EXTENSIONS),
            });
        }
        self.properties.model = model;
        Ok(())
    }

    pub(crate) fn document(&self) -> PropDocument<'_> {
        PropDocument {
            identifier: self.identifier.as_ref(),
            prop: PropBody {
                name: &self.properties.name,
                model: &self.properties.model,
                base_scale: self.properties.base_scale,
                materials: self.materials(),
            },
        }
    }

    pub(crate) fn validate(
        &self,
        ctx: &ValidationContext<'_>,
        json_path: &Path,
        errors: &mut Vec<String>,
    ) -> bool {
        if !check_own_identifier("Prop", self.identifier.as_ref(), errors) {
            return false;
        }
        let Some(owner) = self.identifier.as_ref() else {
            return false;
        };
        let label = owner.to_string();
        let props = &self.properties;

        if props.base_scale == 0.0 {
            errors.push(format!("Prop {label} has a base scale of zero."));
            return false;
        }
        match (&props.material, &props.materials) {
            (Some(_), Some(_)) => {
                errors.push(format!(
                    "Prop {label}: Both 'material' and 'materials' fields cannot be set."
                ));
                return false;
            }
            (None, None) => {
                errors.push(format!("Prop {label}: No materials set."));
                return false;
            }
            _ => {}
        }
        if props.model.trim().is_empty() {
            errors.push(format!("Prop {label} has no model."));
            return false;
        }

        let extension = extension_of(&props.model);
        if !extension_allowed(&extension, &MODEL_EXTENSIONS) {
            errors.push(format!(
                "Prop {label}: model extension '{extension}' is not supported ({}).",
                describe_extensions(&MODEL_EXTENSIONS)
            ));
            return false;
        }
        if extension.eq_ignore_ascii_case("stl") {
            PARTIAL_MODEL_SUPPORT.call_once(|| {
                warn!(
                    prop = %label,
                    "STL models are only partially supported; prefer OBJ, GLB or GLTF"
                );
            });
        }

        match paths::resolve_sub_file(json_path, Path::new(&props.model)) {
            Ok(model) if model.is_file() => {}
            Ok(model) => {
                errors.push(format!(
                    "Prop {label}: model file '{}' does not exist.",
                    model.display()
                ));
                return false;
            }
            Err(err) => {
                errors.push(format!("Prop {label}: {err}."));
                return false;
            }
        }

        let mut valid = true;
        for material in self.materials() {
            valid &= ctx.check_reference(owner, material, AssetType::Material, errors);
        }
        valid
    }

    pub(crate) fn is_filled_out(&self, ctx: &ValidationContext<'_>, json_path: &Path) -> bool {
        let props = &self.properties;
        self.identifier.as_ref().is_some_and(Identifier::is_valid)
            && (props.material.is_some() != props.materials.is_some())
            && !props.name.trim().is_empty()
            && !props.model.trim().is_empty()
            && props.base_scale != 0.0
            && extension_allowed(&extension_of(&props.model), &MODEL_EXTENSIONS)
            && self.materials().iter().all(|id| ctx.has_identifier(id))
            && paths::resolve_sub_file(json_path, Path::new(&props.model))
                .map(|model| model.is_file())
                .unwrap_or(false)
    }

    pub(crate) fn refactor_identifier(&mut self, from: &Identifier, to: &Identifier) -> bool {
        let mut changed = false;
        if let Some(material) = self.properties.material.as_mut() {
            if material == from {
                *material = to.clone();
                changed = true;
            }
        }
        if let Some(materials) = self.properties.materials.as_mut() {
            for material in materials.iter_mut().filter(|m| *m == from) {
                *material = to.clone();
                changed = true;
            }
        }
        changed
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Prop '{}' - './{}'",
            self.properties.name, self.properties.model
        )
    }
}
