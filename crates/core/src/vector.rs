//! Three-component vectors with a compact JSON form.
//!
//! `{"scale": 2}` and `{"scale": [2, 2, 2]}` are equivalent. On write a
//! uniform vector collapses back to the single number.

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Two components closer than this are treated as equal when collapsing.
pub const UNIFORM_TOLERANCE: f32 = 0.00001;

/// A position, rotation or scale triple.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Vec3 {
    /// `(0, 0, 0)`.
    pub const ZERO: Self = Self::splat(0.0);
    /// `(1, 1, 1)`.
    pub const ONE: Self = Self::splat(1.0);

    /// Construct from components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Uniform vector `(v, v, v)`.
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// True when all three components match within [`UNIFORM_TOLERANCE`].
    pub fn is_uniform(&self) -> bool {
        (self.x - self.y).abs() < UNIFORM_TOLERANCE && (self.y - self.z).abs() < UNIFORM_TOLERANCE
    }

    /// Euclidean length.
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit-length copy; zero vectors are returned unchanged.
    pub fn normalized(&self) -> Self {
        let length = self.length();
        if length > 0.0 {
            Self::new(self.x / length, self.y / length, self.z / length)
        } else {
            *self
        }
    }

    /// All components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Serialize for Vec3 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_uniform() {
            return serializer.serialize_f32(self.x);
        }
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.x)?;
        tuple.serialize_element(&self.y)?;
        tuple.serialize_element(&self.z)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Vec3 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(Vec3Visitor)
    }
}

struct Vec3Visitor;

impl<'de> Visitor<'de> for Vec3Visitor {
    type Value = Vec3;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number or an array of up to three numbers")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Vec3, E> {
        Ok(Vec3::splat(value as f32))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Vec3, E> {
        Ok(Vec3::splat(value as f32))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Vec3, E> {
        Ok(Vec3::splat(value as f32))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec3, A::Error> {
        let mut components = [0.0f32; 3];
        let mut read = 0;
        while let Some(element) = seq.next_element::<Component>()? {
            // Non-numeric entries are skipped, extra numbers ignored.
            if let Component::Number(value) = element {
                if read < 3 {
                    components[read] = value;
                    read += 1;
                }
            }
        }
        if read == 1 {
            return Ok(Vec3::splat(components[0]));
        }
        Ok(Vec3::new(components[0], components[1], components[2]))
    }
}

/// One array entry: either a number or anything else.
enum Component {
    Number(f32),
    Other,
}

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ComponentVisitor;

        impl<'de> Visitor<'de> for ComponentVisitor {
            type Value = Component;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any JSON value")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Component, E> {
                Ok(Component::Number(v as f32))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Component, E> {
                Ok(Component::Number(v as f32))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Component, E> {
                Ok(Component::Number(v as f32))
            }

            fn visit_bool<E: de::Error>(self, _: bool) -> Result<Component, E> {
                Ok(Component::Other)
            }

            fn visit_str<E: de::Error>(self, _: &str) -> Result<Component, E> {
                Ok(Component::Other)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Component, E> {
                Ok(Component::Other)
            }

            fn visit_none<E: de::Error>(self) -> Result<Component, E> {
                Ok(Component::Other)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Component, A::Error> {
                while seq.next_element::<de::IgnoredAny>()?.is_some() {}
                Ok(Component::Other)
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Component, A::Error> {
                while map
                    .next_entry::<de::IgnoredAny, de::IgnoredAny>()?
                    .is_some()
                {}
                Ok(Component::Other)
            }
        }

        deserializer.deserialize_any(ComponentVisitor)
    }
}
