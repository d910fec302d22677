//! Materials: a texture or a flat color plus PBR scalars.

use crate::validation::{check_own_identifier, ValidationContext};
use crate::{describe_extensions, extension_allowed, extension_of, AssetError};
use pwassets_core::{paths, Identifier, MaterialColor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Texture formats the game can load.
pub const TEXTURE_EXTENSIONS: [&str; 2] = ["PNG", "JPG"];

/// Alpha values this close to 1 are snapped to fully opaque.
const ALPHA_SNAP: f32 = 0.001;

fn default_name() -> String {
    "unset".to_string()
}

fn default_alpha() -> f32 {
    1.0
}

fn default_roughness() -> f32 {
    0.75
}

/// The `material` object of a material file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawMaterialProperties")]
pub struct MaterialProperties {
    /// Display name.
    pub name: String,
    /// Texture path relative to the JSON file. Takes precedence over `color`.
    pub texture: Option<String>,
    /// Flat color used when there is no texture.
    pub color: MaterialColor,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
    /// Surface roughness in `[0, 1]`.
    pub roughness: f32,
    /// Metalness in `[0, 1]`.
    pub metallic: f32,
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self {
            name: String::new(),
            texture: None,
            color: MaterialColor::WHITE,
            alpha: default_alpha(),
            roughness: default_roughness(),
            metallic: 0.0,
        }
    }
}

#[derive(Deserialize)]
struct RawMaterialProperties {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    texture: Option<String>,
    #[serde(default)]
    color: Option<MaterialColor>,
    #[serde(default = "default_alpha")]
    alpha: f32,
    #[serde(default = "default_roughness")]
    roughness: f32,
    #[serde(default)]
    metallic: f32,
}

impl TryFrom<RawMaterialProperties> for MaterialProperties {
    type Error = String;

    fn try_from(raw: RawMaterialProperties) -> Result<Self, Self::Error> {
        let (texture, color) = match (raw.texture, raw.color) {
            (Some(texture), color) => (Some(texture), color.unwrap_or_default()),
            (None, Some(color)) => (None, color),
            (None, None) => {
                return Err("missing 'color' or 'texture' property in material".to_string())
            }
        };
        Ok(Self {
            name: raw.name,
            texture,
            color,
            alpha: raw.alpha,
            roughness: raw.roughness,
            metallic: raw.metallic,
        })
    }
}

/// A surface description referenced by props and map blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    /// Unique key; `None` while the asset is being created.
    pub identifier: Option<Identifier>,
    /// Where the JSON file lives, if known.
    pub json_path: Option<PathBuf>,
    /// Material fields.
    pub properties: MaterialProperties,
}

#[derive(Deserialize)]
pub(crate) struct MaterialFile {
    identifier: Identifier,
    material: MaterialProperties,
}

impl From<MaterialFile> for Material {
    fn from(file: MaterialFile) -> Self {
        Self {
            identifier: Some(file.identifier),
            json_path: None,
            properties: file.material,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct MaterialDocument<'a> {
    identifier: Option<&'a Identifier>,
    material: MaterialBody<'a>,
}

#[derive(Serialize)]
struct MaterialBody<'a> {
    name: &'a str,
    roughness: f32,
    metallic: f32,
    alpha: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<MaterialColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    texture: Option<&'a str>,
}

impl Material {
    /// Store a texture reference after checking its extension, or clear it.
    pub fn set_texture(&mut self, texture: Option<String>) -> Result<(), AssetError> {
        if let Some(texture) = &texture {
            let extension = extension_of(texture);
            if !extension_allowed(&extension, &TEXTURE_EXTENSIONS) {
                return Err(AssetError::UnsupportedExtension {
                    kind: "texture",
                    path: PathBuf::from(texture),
                    extension,
                    supported: describe_extensions(&TEXTURE_EXTENSIONS),
                });
            }
        }
        self.properties.texture = texture;
        Ok(())
    }

    pub(crate) fn document(&self) -> MaterialDocument<'_> {
        let props = &self.properties;
        let texture = props.texture.as_deref().filter(|t| !t.is_empty());
        MaterialDocument {
            identifier: self.identifier.as_ref(),
            material: MaterialBody {
                name: &props.name,
                roughness: props.roughness,
                metallic: props.metallic,
                alpha: props.alpha,
                color: texture.is_none().then_some(props.color),
                texture,
            },
        }
    }

    fn normalize_alpha(&mut self) {
        let alpha = &mut self.properties.alpha;
        if (*alpha - 1.0).abs() < ALPHA_SNAP {
            *alpha = 1.0;
        }
        *alpha = alpha.clamp(0.0, 1.0);
    }

    pub(crate) fn validate(
        &mut self,
        _ctx: &ValidationContext<'_>,
        json_path: &Path,
        errors: &mut Vec<String>,
    ) -> bool {
        if !check_own_identifier("Material", self.identifier.as_ref(), errors) {
            return false;
        }
        let Some(owner) = self.identifier.clone() else {
            return false;
        };
        if self.properties.name.trim().is_empty() {
            errors.push(format!("Material {owner} has no name."));
            return false;
        }

        if let Some(texture) = self.properties.texture.as_deref().filter(|t| !t.is_empty()) {
            let extension = extension_of(texture);
            if !extension_allowed(&extension, &TEXTURE_EXTENSIONS) {
                errors.push(format!(
                    "Material {owner}: texture extension '{extension}' is not supported ({}).",
                    describe_extensions(&TEXTURE_EXTENSIONS)
                ));
                return false;
            }
            match paths::resolve_sub_file(json_path, Path::new(texture)) {
                Ok(file) if file.is_file() => {}
                Ok(file) => {
                    errors.push(format!(
                        "Material {owner}: texture file '{}' does not exist.",
                        file.display()
                    ));
                    return false;
                }
                Err(err) => {
                    errors.push(format!("Material {owner}: {err}."));
                    return false;
                }
            }
        }

        for (field, value) in [
            ("roughness", self.properties.roughness),
            ("metallic", self.properties.metallic),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                errors.push(format!(
                    "Material {owner}: {field} must be between 0 and 1 (was {value})."
                ));
                return false;
            }
        }

        self.normalize_alpha();
        true
    }

    pub(crate) fn is_filled_out(&self) -> bool {
        self.identifier.as_ref().is_some_and(Identifier::is_valid)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.identifier.as_ref() {
            Some(id) => id.name(),
            None => "???",
        };
        match self.properties.texture.as_deref().filter(|t| !t.is_empty()) {
            Some(texture) => write!(f, "Material '{name}' - '{texture}'"),
            None => write!(f, "Material '{name}' - {}", self.properties.color),
        }
    }
}
