//! Shader program slots.
//!
//! The program set is ordered; a slot is an index into it. Blur's three
//! quality levels sit in consecutive slots starting at [`BLUR_BASE`], so the
//! blur program is addressed as `BLUR_BASE + quality`. Reordering the set
//! breaks that addressing; the assertions below pin it.

use crate::effect::{BlurQuality, EffectKind};
use crate::fx::uniform::UniformKind::{Float, Int, Vec2, Vec3, Vec4};
use crate::fx::uniform::UniformLayout;

/// Index of one compiled effect program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShaderSlot {
    /// Glow program.
    Glow = 0,
    /// Shadow program.
    Shadow = 1,
    /// Pixelate program.
    Pixelate = 2,
    /// Vignette program.
    Vignette = 3,
    /// Shine program.
    Shine = 4,
    /// 5-tap blur program.
    BlurLow = 5,
    /// 9-tap blur program.
    BlurMedium = 6,
    /// 13-tap blur program.
    BlurHigh = 7,
    /// Gradient program.
    Gradient = 8,
    /// Bloom blur program.
    Bloom = 9,
}

/// First of the three blur slots.
pub const BLUR_BASE: u8 = ShaderSlot::BlurLow as u8;

const _: () = {
    assert!(ShaderSlot::BlurLow as u8 == BLUR_BASE + BlurQuality::Low as u8);
    assert!(ShaderSlot::BlurMedium as u8 == BLUR_BASE + BlurQuality::Medium as u8);
    assert!(ShaderSlot::BlurHigh as u8 == BLUR_BASE + BlurQuality::High as u8);
    assert!(ShaderSlot::Bloom as usize == ShaderSlot::COUNT - 1);
};

impl ShaderSlot {
    /// Number of effect programs.
    pub const COUNT: usize = 10;

    /// Every slot, in program-set order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Glow,
        Self::Shadow,
        Self::Pixelate,
        Self::Vignette,
        Self::Shine,
        Self::BlurLow,
        Self::BlurMedium,
        Self::BlurHigh,
        Self::Gradient,
        Self::Bloom,
    ];

    /// Position in the program set.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The slot at `index`, if any.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Blur program for a quality level.
    #[must_use]
    pub const fn blur(quality: BlurQuality) -> Self {
        Self::ALL[(BLUR_BASE + quality.offset()) as usize]
    }

    /// Program used by a single-program effect. Blur resolves through
    /// [`ShaderSlot::blur`] instead and maps to its low-quality slot here.
    #[must_use]
    pub const fn for_kind(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Glow => Self::Glow,
            EffectKind::Shadow => Self::Shadow,
            EffectKind::Pixelate => Self::Pixelate,
            EffectKind::Vignette => Self::Vignette,
            EffectKind::Shine => Self::Shine,
            EffectKind::Blur => Self::BlurLow,
            EffectKind::Gradient => Self::Gradient,
            EffectKind::Bloom => Self::Bloom,
        }
    }

    /// Debug label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Glow => "FX Glow",
            Self::Shadow => "FX Shadow",
            Self::Pixelate => "FX Pixelate",
            Self::Vignette => "FX Vignette",
            Self::Shine => "FX Shine",
            Self::BlurLow => "FX Blur Low",
            Self::BlurMedium => "FX Blur Medium",
            Self::BlurHigh => "FX Blur High",
            Self::Gradient => "FX Gradient",
            Self::Bloom => "FX Bloom",
        }
    }

    /// Uniform block layout of this program. Field order matches the WGSL
    /// `Params` struct of the program.
    #[must_use]
    pub const fn layout(self) -> &'static UniformLayout {
        match self {
            Self::Glow => &GLOW_LAYOUT,
            Self::Shadow => &SHADOW_LAYOUT,
            Self::Pixelate => &PIXELATE_LAYOUT,
            Self::Vignette => &VIGNETTE_LAYOUT,
            Self::Shine => &SHINE_LAYOUT,
            Self::BlurLow | Self::BlurMedium | Self::BlurHigh => &BLUR_LAYOUT,
            Self::Gradient => &GRADIENT_LAYOUT,
            Self::Bloom => &BLOOM_LAYOUT,
        }
    }
}

static GLOW_LAYOUT: UniformLayout = UniformLayout::new(&[
    ("glowColor", Vec4),
    ("resolution", Vec2),
    ("outerStrength", Float),
    ("innerStrength", Float),
    ("knockout", Int),
    ("distance", Float),
    ("quality", Float),
]);

static SHADOW_LAYOUT: UniformLayout = UniformLayout::new(&[
    ("color", Vec4),
    ("lightPosition", Vec2),
    ("decay", Float),
    ("power", Float),
    ("intensity", Float),
    ("samples", Int),
]);

static PIXELATE_LAYOUT: UniformLayout =
    UniformLayout::new(&[("resolution", Vec2), ("amount", Float)]);

static VIGNETTE_LAYOUT: UniformLayout = UniformLayout::new(&[
    ("position", Vec2),
    ("radius", Float),
    ("strength", Float),
]);

static SHINE_LAYOUT: UniformLayout = UniformLayout::new(&[
    ("resolution", Vec2),
    ("time", Float),
    ("speed", Float),
    ("lineWidth", Float),
    ("gradient", Float),
    ("reveal", Int),
]);

static BLUR_LAYOUT: UniformLayout = UniformLayout::new(&[
    ("resolution", Vec2),
    ("offset", Vec2),
    ("color", Vec3),
    ("strength", Float),
]);

static GRADIENT_LAYOUT: UniformLayout = UniformLayout::new(&[
    ("color1", Vec3),
    ("alpha", Float),
    ("color2", Vec3),
    ("size", Int),
    ("positionFrom", Vec2),
    ("positionTo", Vec2),
]);

static BLOOM_LAYOUT: UniformLayout = UniformLayout::new(&[
    ("offset", Vec2),
    ("color", Vec3),
    ("strength", Float),
]);

/// Layout shared by the blend and present programs.
pub static STRENGTH_LAYOUT: UniformLayout =
    UniformLayout::new(&[("strength", Float)]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_quality_selects_consecutive_slots() {
        assert_eq!(ShaderSlot::blur(BlurQuality::Low).index(), 5);
        assert_eq!(ShaderSlot::blur(BlurQuality::Medium).index(), 6);
        assert_eq!(ShaderSlot::blur(BlurQuality::High).index(), 7);
        assert_eq!(
            ShaderSlot::blur(BlurQuality::High).index(),
            BLUR_BASE as usize + 2
        );
    }

    #[test]
    fn program_set_order_is_fixed() {
        let labels: Vec<_> = ShaderSlot::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels[0], "FX Glow");
        assert_eq!(labels[8], "FX Gradient");
        assert_eq!(labels[9], "FX Bloom");
        for (i, slot) in ShaderSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
            assert_eq!(ShaderSlot::from_index(i), Some(*slot));
        }
        assert_eq!(ShaderSlot::from_index(ShaderSlot::COUNT), None);
    }

    #[test]
    fn single_program_kinds_map_to_their_slot() {
        assert_eq!(ShaderSlot::for_kind(EffectKind::Glow), ShaderSlot::Glow);
        assert_eq!(
            ShaderSlot::for_kind(EffectKind::Gradient),
            ShaderSlot::Gradient
        );
        assert_eq!(ShaderSlot::for_kind(EffectKind::Bloom), ShaderSlot::Bloom);
    }
}
