//! Named uniform inputs and their packing into WGSL uniform blocks.

use std::fmt;

use glam::{Vec2, Vec3, Vec4};

/// A value bound to a named shader input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    /// `f32`
    Float(f32),
    /// `i32`, used for flags and counts.
    Int(i32),
    /// `vec2<f32>`
    Vec2(Vec2),
    /// `vec3<f32>`
    Vec3(Vec3),
    /// `vec4<f32>`
    Vec4(Vec4),
}

impl Uniform {
    /// The shape of this value.
    #[must_use]
    pub const fn kind(&self) -> UniformKind {
        match self {
            Self::Float(_) => UniformKind::Float,
            Self::Int(_) => UniformKind::Int,
            Self::Vec2(_) => UniformKind::Vec2,
            Self::Vec3(_) => UniformKind::Vec3,
            Self::Vec4(_) => UniformKind::Vec4,
        }
    }

    /// Flag as `0`/`1`.
    #[must_use]
    pub const fn flag(on: bool) -> Self {
        Self::Int(on as i32)
    }

    fn write(&self, out: &mut [u8]) {
        match self {
            Self::Float(v) => out.copy_from_slice(&v.to_ne_bytes()),
            Self::Int(v) => out.copy_from_slice(&v.to_ne_bytes()),
            Self::Vec2(v) => out.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Vec3(v) => out.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Vec4(v) => out.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
        }
    }
}

impl From<f32> for Uniform {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec2> for Uniform {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for Uniform {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec4> for Uniform {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

/// Shape of a uniform field, with WGSL uniform address-space layout rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    /// `f32`
    Float,
    /// `i32`
    Int,
    /// `vec2<f32>`
    Vec2,
    /// `vec3<f32>`
    Vec3,
    /// `vec4<f32>`
    Vec4,
}

impl UniformKind {
    const fn size(self) -> usize {
        match self {
            Self::Float | Self::Int => 4,
            Self::Vec2 => 8,
            Self::Vec3 => 12,
            Self::Vec4 => 16,
        }
    }

    const fn align(self) -> usize {
        match self {
            Self::Float | Self::Int => 4,
            Self::Vec2 => 8,
            Self::Vec3 | Self::Vec4 => 16,
        }
    }
}

const fn align_to(offset: usize, align: usize) -> usize {
    offset.div_ceil(align) * align
}

/// The uniform inputs bound for the next pass.
///
/// Setting a name twice keeps the latest value. Insertion order is
/// preserved so traces read in the order the handler bound them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformSet {
    values: Vec<(&'static str, Uniform)>,
}

impl UniformSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `name`, replacing any earlier value.
    pub fn set(&mut self, name: &'static str, value: impl Into<Uniform>) {
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    /// Current value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Uniform> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    /// Drop every binding.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Bindings in the order they were first set.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Uniform)> + '_ {
        self.values.iter().copied()
    }

    /// Number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Failure packing a [`UniformSet`] into a program's block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniformError {
    /// The program has no input of that name.
    UnknownName(&'static str),
    /// The value's shape differs from the declared field.
    KindMismatch {
        /// Field name.
        name: &'static str,
        /// Declared shape.
        expected: UniformKind,
        /// Supplied shape.
        found: UniformKind,
    },
    /// Output buffer smaller than the block.
    BufferTooSmall {
        /// Bytes the block needs.
        needed: usize,
        /// Bytes available.
        available: usize,
    },
}

impl fmt::Display for UniformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownName(name) => write!(f, "no uniform named '{name}'"),
            Self::KindMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "uniform '{name}' is {expected:?}, got {found:?}"
            ),
            Self::BufferTooSmall { needed, available } => write!(
                f,
                "uniform block needs {needed} bytes, buffer has {available}"
            ),
        }
    }
}

impl std::error::Error for UniformError {}

/// Ordered field list of one program's uniform block.
#[derive(Debug)]
pub struct UniformLayout {
    fields: &'static [(&'static str, UniformKind)],
}

impl UniformLayout {
    /// Layout with fields in declaration order.
    #[must_use]
    pub const fn new(fields: &'static [(&'static str, UniformKind)]) -> Self {
        Self { fields }
    }

    /// Byte offset of each field, in declaration order.
    pub fn offsets(&self) -> impl Iterator<Item = (&'static str, UniformKind, usize)> + '_ {
        let mut cursor = 0;
        self.fields.iter().map(move |&(name, kind)| {
            let offset = align_to(cursor, kind.align());
            cursor = offset + kind.size();
            (name, kind, offset)
        })
    }

    /// Byte offset of `name`, if declared.
    #[must_use]
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.offsets()
            .find(|(n, _, _)| *n == name)
            .map(|(_, _, offset)| offset)
    }

    /// Block size, rounded up to 16 bytes. Never zero, so every program can
    /// own a binding.
    #[must_use]
    pub fn size(&self) -> usize {
        let end = self
            .offsets()
            .last()
            .map_or(0, |(_, kind, offset)| offset + kind.size());
        align_to(end.max(1), 16)
    }

    /// Write `set` into `out` (zeroing unbound fields).
    ///
    /// # Errors
    ///
    /// Returns [`UniformError`] when a bound name is not declared, a value has
    /// the wrong shape, or `out` is shorter than [`Self::size`].
    pub fn pack(&self, set: &UniformSet, out: &mut [u8]) -> Result<(), UniformError> {
        let size = self.size();
        if out.len() < size {
            return Err(UniformError::BufferTooSmall {
                needed: size,
                available: out.len(),
            });
        }
        out[..size].fill(0);
        for (name, value) in set.iter() {
            let (_, expected, offset) = self
                .offsets()
                .find(|(n, _, _)| *n == name)
                .ok_or(UniformError::UnknownName(name))?;
            if value.kind() != expected {
                return Err(UniformError::KindMismatch {
                    name,
                    expected,
                    found: value.kind(),
                });
            }
            value.write(&mut out[offset..offset + expected.size()]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::slot::ShaderSlot;

    #[test]
    fn set_replaces_existing_name() {
        let mut set = UniformSet::new();
        set.set("offset", Vec2::new(1.0, 0.0));
        set.set("strength", 2.0_f32);
        set.set("offset", Vec2::new(0.0, 1.0));
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("offset"), Some(Uniform::Vec2(Vec2::Y)));
        let names: Vec<_> = set.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["offset", "strength"]);
    }

    #[test]
    fn vec3_fields_align_to_sixteen() {
        let gradient = ShaderSlot::Gradient.layout();
        assert_eq!(gradient.offset_of("color1"), Some(0));
        assert_eq!(gradient.offset_of("alpha"), Some(12));
        assert_eq!(gradient.offset_of("color2"), Some(16));
        assert_eq!(gradient.offset_of("size"), Some(28));
        assert_eq!(gradient.offset_of("positionTo"), Some(40));
        assert_eq!(gradient.size(), 48);

        let bloom = ShaderSlot::Bloom.layout();
        assert_eq!(bloom.offset_of("color"), Some(16));
        assert_eq!(bloom.offset_of("strength"), Some(28));
        assert_eq!(bloom.size(), 32);
    }

    #[test]
    fn pack_writes_values_at_offsets() {
        let layout = ShaderSlot::BlurLow.layout();
        let mut set = UniformSet::new();
        set.set("strength", 0.5_f32);
        set.set("offset", Vec2::new(3.0, 0.0));
        let mut out = vec![0xFF; layout.size()];
        layout.pack(&set, &mut out).unwrap();

        let floats: Vec<f32> = out
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(floats[2], 3.0);
        assert_eq!(floats[3], 0.0);
        assert_eq!(floats[7], 0.5);
        // Unbound resolution is zeroed.
        assert_eq!(floats[0], 0.0);
    }

    #[test]
    fn pack_rejects_unknown_and_mistyped_names() {
        let layout = ShaderSlot::Pixelate.layout();
        let mut out = vec![0; layout.size()];

        let mut unknown = UniformSet::new();
        unknown.set("radius", 1.0_f32);
        assert_eq!(
            layout.pack(&unknown, &mut out),
            Err(UniformError::UnknownName("radius"))
        );

        let mut mistyped = UniformSet::new();
        mistyped.set("amount", Vec2::ONE);
        assert!(matches!(
            layout.pack(&mistyped, &mut out),
            Err(UniformError::KindMismatch { name: "amount", .. })
        ));

        assert!(matches!(
            layout.pack(&UniformSet::new(), &mut [0; 4]),
            Err(UniformError::BufferTooSmall { needed: 16, .. })
        ));
    }
}
