//! RGB material colors.
//!
//! JSON accepts a single number (grey level) or exactly three numbers. All
//! components are clamped into `[0, 1]` on read.

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::vector::UNIFORM_TOLERANCE;

/// Linear RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialColor {
    /// Red component.
    pub red: f32,
    /// Green component.
    pub green: f32,
    /// Blue component.
    pub blue: f32,
}

impl MaterialColor {
    /// White.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    /// 50% grey.
    pub const GRAY: Self = Self::new(0.5, 0.5, 0.5);
    /// Black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    /// Red.
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    /// Yellow.
    pub const YELLOW: Self = Self::new(1.0, 1.0, 0.0);
    /// Green.
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0);
    /// Cyan.
    pub const CYAN: Self = Self::new(0.0, 1.0, 1.0);
    /// Blue.
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0);
    /// Magenta.
    pub const MAGENTA: Self = Self::new(1.0, 0.0, 1.0);

    /// Construct without clamping.
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Construct with every component clamped into `[0, 1]`.
    pub fn clamped(red: f32, green: f32, blue: f32) -> Self {
        Self::new(clamp01(red), clamp01(green), clamp01(blue))
    }

    /// Grey level `v`, clamped.
    pub fn gray(v: f32) -> Self {
        let v = clamp01(v);
        Self::new(v, v, v)
    }

    /// Convert from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Convert to 8-bit RGBA with the given alpha in `[0, 1]`.
    pub fn to_rgba8(&self, alpha: f32) -> [u8; 4] {
        [
            (clamp01(self.red) * 255.0) as u8,
            (clamp01(self.green) * 255.0) as u8,
            (clamp01(self.blue) * 255.0) as u8,
            (clamp01(alpha) * 255.0) as u8,
        ]
    }

    fn is_uniform(&self) -> bool {
        (self.red - self.green).abs() < UNIFORM_TOLERANCE
            && (self.green - self.blue).abs() < UNIFORM_TOLERANCE
    }
}

impl Default for MaterialColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for MaterialColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.red, self.green, self.blue)
    }
}

fn clamp01(v: f32) -> f32 {
    if v > 1.0 {
        1.0
    } else if v < 0.0 {
        0.0
    } else {
        v
    }
}

impl Serialize for MaterialColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_uniform() {
            return serializer.serialize_f32(self.red);
        }
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.red)?;
        tuple.serialize_element(&self.green)?;
        tuple.serialize_element(&self.blue)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for MaterialColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ColorVisitor)
    }
}

struct ColorVisitor;

impl<'de> Visitor<'de> for ColorVisitor {
    type Value = MaterialColor;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a single number, or an array of numbers representing R, G and B")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<MaterialColor, E> {
        Ok(MaterialColor::gray(value as f32))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<MaterialColor, E> {
        Ok(MaterialColor::gray(value as f32))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<MaterialColor, E> {
        Ok(MaterialColor::gray(value as f32))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<MaterialColor, A::Error> {
        let mut components = Vec::with_capacity(3);
        while let Some(value) = seq.next_element::<f32>()? {
            components.push(value);
        }
        match components.as_slice() {
            [red, green, blue] => Ok(MaterialColor::clamped(*red, *green, *blue)),
            other if other.len() < 3 => Err(de::Error::custom(format!(
                "color contained only {} components (needs 3)",
                other.len()
            ))),
            other => Err(de::Error::custom(format!(
                "color contained {} components (needs only 3)",
                other.len()
            ))),
        }
    }
}
