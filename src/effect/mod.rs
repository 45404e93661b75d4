//! Effect descriptors: the closed set of effect kinds, their typed
//! parameters, and the per-instance effect list.
//!
//! An [`FxEntry`] pairs an [`Effect`] (one variant per [`EffectKind`], each
//! carrying its own parameter struct) with an `active` flag. Entries can be
//! authored untyped as a [`ParamMap`] and converted with
//! [`Effect::from_params`]; that is also the TOML representation.

mod param_map;
mod params;
mod stack;

use std::fmt;
use std::str::FromStr;

pub use param_map::{ParamMap, ParamValue, RawEffect};
pub use params::{
    BloomParams, BlurParams, GlowParams, GradientParams, PixelateParams,
    ShadowParams, ShineParams, VignetteParams,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use stack::FxStack;

use crate::error::FxError;
use param_map::ParamReader;

/// The closed enumeration of effect kinds.
///
/// Numeric values index the dispatch table directly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum EffectKind {
    /// Inner/outer glow around opaque pixels.
    Glow = 0,
    /// Drop shadow cast away from a light position.
    Shadow = 1,
    /// Block pixelation.
    Pixelate = 2,
    /// Radial darkening towards the edges.
    Vignette = 3,
    /// Animated diagonal highlight sweep.
    Shine = 4,
    /// Separable multi-pass blur.
    Blur = 5,
    /// Two-color gradient overlay.
    Gradient = 6,
    /// Blurred bright copy blended back over the original.
    Bloom = 7,
}

impl EffectKind {
    /// Number of effect kinds.
    pub const COUNT: usize = 8;

    /// Every kind, in numeric order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Glow,
        Self::Shadow,
        Self::Pixelate,
        Self::Vignette,
        Self::Shine,
        Self::Blur,
        Self::Gradient,
        Self::Bloom,
    ];

    /// Position of this kind in the dispatch table.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name used in presets and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Glow => "glow",
            Self::Shadow => "shadow",
            Self::Pixelate => "pixelate",
            Self::Vignette => "vignette",
            Self::Shine => "shine",
            Self::Blur => "blur",
            Self::Gradient => "gradient",
            Self::Bloom => "bloom",
        }
    }

    /// JSON Schema of this kind's parameter struct (for UI generation).
    #[must_use]
    pub fn param_schema(self) -> schemars::Schema {
        match self {
            Self::Glow => schemars::schema_for!(GlowParams),
            Self::Shadow => schemars::schema_for!(ShadowParams),
            Self::Pixelate => schemars::schema_for!(PixelateParams),
            Self::Vignette => schemars::schema_for!(VignetteParams),
            Self::Shine => schemars::schema_for!(ShineParams),
            Self::Blur => schemars::schema_for!(BlurParams),
            Self::Gradient => schemars::schema_for!(GradientParams),
            Self::Bloom => schemars::schema_for!(BloomParams),
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FxError::UnknownEffect(s.to_owned()))
    }
}

/// Kind names are matched like [`EffectKind::from_str`]: case-insensitive,
/// unknown names reported as [`FxError::UnknownEffect`].
impl<'de> Deserialize<'de> for EffectKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Blur sampling quality. Each level is its own shader program; the value is
/// the offset from the blur base slot.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum BlurQuality {
    /// 5-tap kernel.
    #[default]
    Low = 0,
    /// 9-tap kernel.
    Medium = 1,
    /// 13-tap kernel.
    High = 2,
}

impl BlurQuality {
    /// Offset from the blur base slot.
    #[must_use]
    pub const fn offset(self) -> u8 {
        self as u8
    }

    /// Lowercase name used in presets.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Quality for a numeric level (0, 1 or 2).
    #[must_use]
    pub const fn from_level(level: u32) -> Option<Self> {
        match level {
            0 => Some(Self::Low),
            1 => Some(Self::Medium),
            2 => Some(Self::High),
            _ => None,
        }
    }

    /// Quality for a name, case-insensitive. Accepts `med` for medium.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// One configured effect: the kind tag and its typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Glow effect.
    Glow(GlowParams),
    /// Shadow effect.
    Shadow(ShadowParams),
    /// Pixelate effect.
    Pixelate(PixelateParams),
    /// Vignette effect.
    Vignette(VignetteParams),
    /// Shine effect.
    Shine(ShineParams),
    /// Blur effect.
    Blur(BlurParams),
    /// Gradient effect.
    Gradient(GradientParams),
    /// Bloom effect.
    Bloom(BloomParams),
}

impl Effect {
    /// The kind tag of this effect.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        match self {
            Self::Glow(_) => EffectKind::Glow,
            Self::Shadow(_) => EffectKind::Shadow,
            Self::Pixelate(_) => EffectKind::Pixelate,
            Self::Vignette(_) => EffectKind::Vignette,
            Self::Shine(_) => EffectKind::Shine,
            Self::Blur(_) => EffectKind::Blur,
            Self::Gradient(_) => EffectKind::Gradient,
            Self::Bloom(_) => EffectKind::Bloom,
        }
    }

    /// An effect of the given kind with default parameters.
    #[must_use]
    pub fn with_defaults(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Glow => Self::Glow(GlowParams::default()),
            EffectKind::Shadow => Self::Shadow(ShadowParams::default()),
            EffectKind::Pixelate => Self::Pixelate(PixelateParams::default()),
            EffectKind::Vignette => Self::Vignette(VignetteParams::default()),
            EffectKind::Shine => Self::Shine(ShineParams::default()),
            EffectKind::Blur => Self::Blur(BlurParams::default()),
            EffectKind::Gradient => Self::Gradient(GradientParams::default()),
            EffectKind::Bloom => Self::Bloom(BloomParams::default()),
        }
    }

    /// Build a typed effect from an untyped parameter map.
    ///
    /// # Errors
    ///
    /// [`FxError::Configuration`] when a required key is absent and
    /// [`FxError::InvalidParameter`] when a value has the wrong shape.
    pub fn from_params(
        kind: EffectKind,
        params: &ParamMap,
    ) -> Result<Self, FxError> {
        let mut reader = ParamReader::new(kind, params);
        let effect = match kind {
            EffectKind::Glow => Self::Glow(GlowParams::read(&mut reader)?),
            EffectKind::Shadow => {
                Self::Shadow(ShadowParams::read(&mut reader)?)
            }
            EffectKind::Pixelate => {
                Self::Pixelate(PixelateParams::read(&mut reader)?)
            }
            EffectKind::Vignette => {
                Self::Vignette(VignetteParams::read(&mut reader)?)
            }
            EffectKind::Shine => Self::Shine(ShineParams::read(&mut reader)?),
            EffectKind::Blur => Self::Blur(BlurParams::read(&mut reader)?),
            EffectKind::Gradient => {
                Self::Gradient(GradientParams::read(&mut reader)?)
            }
            EffectKind::Bloom => Self::Bloom(BloomParams::read(&mut reader)?),
        };
        reader.warn_unused();
        Ok(effect)
    }

    /// The untyped parameter map for this effect.
    #[must_use]
    pub fn to_params(&self) -> ParamMap {
        let mut map = ParamMap::new();
        match self {
            Self::Glow(p) => p.write(&mut map),
            Self::Shadow(p) => p.write(&mut map),
            Self::Pixelate(p) => p.write(&mut map),
            Self::Vignette(p) => p.write(&mut map),
            Self::Shine(p) => p.write(&mut map),
            Self::Blur(p) => p.write(&mut map),
            Self::Gradient(p) => p.write(&mut map),
            Self::Bloom(p) => p.write(&mut map),
        }
        map
    }
}

macro_rules! impl_from_params {
    ($($params:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$params> for Effect {
                fn from(p: $params) -> Self {
                    Self::$variant(p)
                }
            }
        )*
    };
}

impl_from_params! {
    GlowParams => Glow,
    ShadowParams => Shadow,
    PixelateParams => Pixelate,
    VignetteParams => Vignette,
    ShineParams => Shine,
    BlurParams => Blur,
    GradientParams => Gradient,
    BloomParams => Bloom,
}

/// One entry in a visual instance's effect list.
///
/// Toggling `active` disables the effect without losing its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEffect", into = "RawEffect")]
pub struct FxEntry {
    /// Whether the effect runs this frame.
    pub active: bool,
    /// The effect and its parameters.
    pub effect: Effect,
}

impl FxEntry {
    /// An active entry for `effect`.
    pub fn new(effect: impl Into<Effect>) -> Self {
        Self {
            active: true,
            effect: effect.into(),
        }
    }

    /// The same entry with `active` set.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Kind of the wrapped effect.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        self.effect.kind()
    }
}

impl JsonSchema for FxEntry {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        RawEffect::schema_name()
    }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        RawEffect::json_schema(generator)
    }
}

impl TryFrom<RawEffect> for FxEntry {
    type Error = FxError;

    fn try_from(raw: RawEffect) -> Result<Self, Self::Error> {
        Ok(Self {
            active: raw.active,
            effect: Effect::from_params(raw.kind, &raw.params)?,
        })
    }
}

impl From<FxEntry> for RawEffect {
    fn from(entry: FxEntry) -> Self {
        Self {
            kind: entry.kind(),
            active: entry.active,
            params: entry.effect.to_params(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_indices_follow_declaration_order() {
        for (i, kind) in EffectKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Bloom".parse::<EffectKind>().unwrap(), EffectKind::Bloom);
        assert!(matches!(
            "sparkle".parse::<EffectKind>(),
            Err(FxError::UnknownEffect(name)) if name == "sparkle"
        ));
    }

    #[test]
    fn quality_levels_and_names() {
        assert_eq!(BlurQuality::from_level(2), Some(BlurQuality::High));
        assert_eq!(BlurQuality::from_level(3), None);
        assert_eq!(BlurQuality::from_name("MED"), Some(BlurQuality::Medium));
        assert_eq!(BlurQuality::High.offset(), 2);
    }

    #[test]
    fn default_effects_report_their_kind() {
        for kind in EffectKind::ALL {
            assert_eq!(Effect::with_defaults(kind).kind(), kind);
        }
    }

    #[test]
    fn every_kind_has_a_param_schema() {
        for kind in EffectKind::ALL {
            let schema =
                serde_json::to_value(kind.param_schema()).unwrap();
            assert!(schema["properties"].is_object(), "{kind}");
        }
    }

    #[test]
    fn entry_toggles_without_losing_params() {
        let entry = FxEntry::new(PixelateParams { amount: 8.0 });
        let off = entry.clone().with_active(false);
        assert!(!off.active);
        assert_eq!(off.effect, entry.effect);
    }
}
