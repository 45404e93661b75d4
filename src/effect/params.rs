//! Typed parameter structs, one per effect kind.
//!
//! Key names in the map form are camelCase (`outerStrength`, `offsetX`).
//! Optional keys fall back to the struct's `Default` value, except blur and
//! bloom `steps`, which mean "no blur" when absent.

use glam::Vec3;
use schemars::JsonSchema;

use super::param_map::{ParamMap, ParamReader, ParamValue};
use super::BlurQuality;
use crate::error::FxError;

fn put(map: &mut ParamMap, key: &str, value: impl Into<ParamValue>) {
    let _ = map.insert(key.to_owned(), value.into());
}

/// Glow around opaque pixels, inside and/or outside the silhouette.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
#[schemars(title = "Glow", rename_all = "camelCase")]
pub struct GlowParams {
    /// Glow color.
    #[schemars(with = "[f32; 3]")]
    pub color: Vec3,
    /// Strength of the glow outside the silhouette.
    #[schemars(range(min = 0.0, max = 16.0), extend("step" = 0.1))]
    pub outer_strength: f32,
    /// Strength of the glow inside the silhouette.
    #[schemars(range(min = 0.0, max = 16.0), extend("step" = 0.1))]
    pub inner_strength: f32,
    /// Draw only the glow, knocking out the sprite itself.
    pub knockout: bool,
    /// Angular sampling density.
    #[schemars(range(min = 0.05, max = 1.0), extend("step" = 0.05))]
    pub quality: f32,
    /// Glow reach in pixels.
    #[schemars(range(min = 1, max = 64))]
    pub distance: u32,
}

impl Default for GlowParams {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            outer_strength: 4.0,
            inner_strength: 0.0,
            knockout: false,
            quality: 0.1,
            distance: 10,
        }
    }
}

impl GlowParams {
    pub(crate) fn read(r: &mut ParamReader<'_>) -> Result<Self, FxError> {
        let d = Self::default();
        Ok(Self {
            color: r.color("color")?,
            outer_strength: r.f32("outerStrength")?,
            inner_strength: r.f32_or("innerStrength", d.inner_strength)?,
            knockout: r.bool_or("knockout", d.knockout)?,
            quality: r.f32_or("quality", d.quality)?,
            distance: r.u32_or("distance", d.distance)?,
        })
    }

    pub(crate) fn write(&self, map: &mut ParamMap) {
        put(map, "color", self.color);
        put(map, "outerStrength", self.outer_strength);
        put(map, "innerStrength", self.inner_strength);
        put(map, "knockout", self.knockout);
        put(map, "quality", self.quality);
        put(map, "distance", self.distance);
    }
}

/// Drop shadow cast away from a light position.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
#[schemars(title = "Shadow", rename_all = "camelCase")]
pub struct ShadowParams {
    /// Light position, horizontal, in texture space.
    pub x: f32,
    /// Light position, vertical, in texture space.
    pub y: f32,
    /// Falloff of the shadow along its length.
    #[schemars(range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub decay: f32,
    /// Overall shadow power, divided evenly across samples.
    pub power: f32,
    /// Shadow color.
    #[schemars(with = "[f32; 3]")]
    pub color: Vec3,
    /// Number of samples along the shadow.
    #[schemars(range(min = 1, max = 12))]
    pub samples: u32,
    /// Shadow length multiplier.
    pub intensity: f32,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            decay: 0.1,
            power: 1.0,
            color: Vec3::ZERO,
            samples: 6,
            intensity: 1.0,
        }
    }
}

impl ShadowParams {
    pub(crate) fn read(r: &mut ParamReader<'_>) -> Result<Self, FxError> {
        let d = Self::default();
        Ok(Self {
            x: r.f32("x")?,
            y: r.f32("y")?,
            decay: r.f32_or("decay", d.decay)?,
            power: r.f32_or("power", d.power)?,
            color: r.color_or("color", d.color)?,
            samples: r.u32_or("samples", d.samples)?,
            intensity: r.f32_or("intensity", d.intensity)?,
        })
    }

    pub(crate) fn write(&self, map: &mut ParamMap) {
        put(map, "x", self.x);
        put(map, "y", self.y);
        put(map, "decay", self.decay);
        put(map, "power", self.power);
        put(map, "color", self.color);
        put(map, "samples", self.samples);
        put(map, "intensity", self.intensity);
    }
}

/// Block pixelation.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
#[schemars(title = "Pixelate")]
pub struct PixelateParams {
    /// Pixel block growth; blocks are `floor(2 + amount)` pixels wide.
    #[schemars(range(min = 0.0, max = 64.0), extend("step" = 1.0))]
    pub amount: f32,
}

impl Default for PixelateParams {
    fn default() -> Self {
        Self { amount: 1.0 }
    }
}

impl PixelateParams {
    pub(crate) fn read(r: &mut ParamReader<'_>) -> Result<Self, FxError> {
        Ok(Self {
            amount: r.f32_alias("amount", "size")?,
        })
    }

    pub(crate) fn write(&self, map: &mut ParamMap) {
        put(map, "amount", self.amount);
    }
}

/// Radial darkening around a center point.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
#[schemars(title = "Vignette")]
pub struct VignetteParams {
    /// Center, horizontal, in texture space.
    pub x: f32,
    /// Center, vertical, in texture space.
    pub y: f32,
    /// Radius of the clear area.
    #[schemars(range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub radius: f32,
    /// Darkening strength.
    #[schemars(range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub strength: f32,
}

impl Default for VignetteParams {
    fn default() -> Self {
        Self {
            x: 0.5,
            y: 0.5,
            radius: 0.5,
            strength: 0.5,
        }
    }
}

impl VignetteParams {
    pub(crate) fn read(r: &mut ParamReader<'_>) -> Result<Self, FxError> {
        let d = Self::default();
        Ok(Self {
            radius: r.f32("radius")?,
            strength: r.f32("strength")?,
            x: r.f32_or("x", d.x)?,
            y: r.f32_or("y", d.y)?,
        })
    }

    pub(crate) fn write(&self, map: &mut ParamMap) {
        put(map, "x", self.x);
        put(map, "y", self.y);
        put(map, "radius", self.radius);
        put(map, "strength", self.strength);
    }
}

/// Diagonal highlight sweeping across the sprite over time.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
#[schemars(title = "Shine", rename_all = "camelCase")]
pub struct ShineParams {
    /// Sweep speed.
    #[schemars(range(min = 0.0, max = 4.0), extend("step" = 0.05))]
    pub speed: f32,
    /// Width of the highlight line.
    #[schemars(range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub line_width: f32,
    /// Slope of the highlight line.
    pub gradient: f32,
    /// Only show the sprite where the highlight passes.
    pub reveal: bool,
}

impl Default for ShineParams {
    fn default() -> Self {
        Self {
            speed: 0.5,
            line_width: 0.5,
            gradient: 3.0,
            reveal: false,
        }
    }
}

impl ShineParams {
    pub(crate) fn read(r: &mut ParamReader<'_>) -> Result<Self, FxError> {
        let d = Self::default();
        Ok(Self {
            speed: r.f32("speed")?,
            line_width: r.f32_or("lineWidth", d.line_width)?,
            gradient: r.f32_or("gradient", d.gradient)?,
            reveal: r.bool_or("reveal", d.reveal)?,
        })
    }

    pub(crate) fn write(&self, map: &mut ParamMap) {
        put(map, "speed", self.speed);
        put(map, "lineWidth", self.line_width);
        put(map, "gradient", self.gradient);
        put(map, "reveal", self.reveal);
    }
}

/// Separable blur, iterated `steps` times.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
#[schemars(title = "Blur")]
pub struct BlurParams {
    /// Kernel size; selects the shader program.
    pub quality: BlurQuality,
    /// Horizontal sample offset.
    pub x: f32,
    /// Vertical sample offset.
    pub y: f32,
    /// Iterations; each is one horizontal and one vertical pass.
    #[schemars(range(min = 0, max = 32))]
    pub steps: u32,
    /// Sample spread multiplier.
    #[schemars(range(min = 0.0, max = 8.0), extend("step" = 0.1))]
    pub strength: f32,
    /// Tint multiplied into the result.
    #[schemars(with = "[f32; 3]")]
    pub color: Vec3,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            quality: BlurQuality::Low,
            x: 2.0,
            y: 2.0,
            steps: 4,
            strength: 1.0,
            color: Vec3::ONE,
        }
    }
}

impl BlurParams {
    pub(crate) fn read(r: &mut ParamReader<'_>) -> Result<Self, FxError> {
        Ok(Self {
            quality: r.quality("quality")?,
            x: r.f32("x")?,
            y: r.f32("y")?,
            steps: r.u32_or("steps", 0)?,
            strength: r.f32("strength")?,
            color: r.color("color")?,
        })
    }

    pub(crate) fn write(&self, map: &mut ParamMap) {
        let _ = map.insert(
            "quality".to_owned(),
            ParamValue::Text(self.quality.name().to_owned()),
        );
        put(map, "x", self.x);
        put(map, "y", self.y);
        put(map, "steps", self.steps);
        put(map, "strength", self.strength);
        put(map, "color", self.color);
    }
}

/// Two-color linear gradient laid over the sprite.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
#[schemars(title = "Gradient", rename_all = "camelCase")]
pub struct GradientParams {
    /// Color at the start point.
    #[schemars(with = "[f32; 3]")]
    pub color1: Vec3,
    /// Color at the end point.
    #[schemars(with = "[f32; 3]")]
    pub color2: Vec3,
    /// Opacity of the overlay.
    #[schemars(range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub alpha: f32,
    /// Start point, horizontal, in texture space.
    pub from_x: f32,
    /// Start point, vertical, in texture space.
    pub from_y: f32,
    /// End point, horizontal, in texture space.
    pub to_x: f32,
    /// End point, vertical, in texture space.
    pub to_y: f32,
    /// Number of bands; 0 is a smooth gradient.
    pub size: u32,
}

impl Default for GradientParams {
    fn default() -> Self {
        Self {
            color1: Vec3::X,
            color2: Vec3::Y,
            alpha: 0.2,
            from_x: 0.0,
            from_y: 0.0,
            to_x: 0.0,
            to_y: 1.0,
            size: 0,
        }
    }
}

impl GradientParams {
    pub(crate) fn read(r: &mut ParamReader<'_>) -> Result<Self, FxError> {
        let d = Self::default();
        Ok(Self {
            color1: r.color("color1")?,
            color2: r.color("color2")?,
            alpha: r.f32_or("alpha", d.alpha)?,
            from_x: r.f32_or("fromX", d.from_x)?,
            from_y: r.f32_or("fromY", d.from_y)?,
            to_x: r.f32_or("toX", d.to_x)?,
            to_y: r.f32_or("toY", d.to_y)?,
            size: r.u32_or("size", d.size)?,
        })
    }

    pub(crate) fn write(&self, map: &mut ParamMap) {
        put(map, "color1", self.color1);
        put(map, "color2", self.color2);
        put(map, "alpha", self.alpha);
        put(map, "fromX", self.from_x);
        put(map, "fromY", self.from_y);
        put(map, "toX", self.to_x);
        put(map, "toY", self.to_y);
        put(map, "size", self.size);
    }
}

/// Blurred copy of the sprite blended back over the original.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
#[schemars(title = "Bloom", rename_all = "camelCase")]
pub struct BloomParams {
    /// Tint multiplied into the blurred copy.
    #[schemars(with = "[f32; 3]")]
    pub color: Vec3,
    /// Horizontal sample offset in pixels.
    pub offset_x: f32,
    /// Vertical sample offset in pixels.
    pub offset_y: f32,
    /// Center-tap weight of the bloom blur.
    #[schemars(range(min = 0.0, max = 4.0), extend("step" = 0.05))]
    pub blur_strength: f32,
    /// Weight of the blurred copy in the final blend.
    #[schemars(range(min = 0.0, max = 4.0), extend("step" = 0.05))]
    pub strength: f32,
    /// Blur iterations.
    #[schemars(range(min = 0, max = 32))]
    pub steps: u32,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            offset_x: 1.0,
            offset_y: 1.0,
            blur_strength: 1.0,
            strength: 1.0,
            steps: 4,
        }
    }
}

impl BloomParams {
    pub(crate) fn read(r: &mut ParamReader<'_>) -> Result<Self, FxError> {
        Ok(Self {
            color: r.color("color")?,
            offset_x: r.f32("offsetX")?,
            offset_y: r.f32("offsetY")?,
            blur_strength: r.f32("blurStrength")?,
            strength: r.f32("strength")?,
            steps: r.u32_or("steps", 0)?,
        })
    }

    pub(crate) fn write(&self, map: &mut ParamMap) {
        put(map, "color", self.color);
        put(map, "offsetX", self.offset_x);
        put(map, "offsetY", self.offset_y);
        put(map, "blurStrength", self.blur_strength);
        put(map, "strength", self.strength);
        put(map, "steps", self.steps);
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Effect, EffectKind};
    use super::*;

    fn params(entries: &[(&str, ParamValue)]) -> ParamMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn blur_steps_default_to_zero_when_absent() {
        let map = params(&[
            ("quality", ParamValue::Text("low".to_owned())),
            ("x", ParamValue::Scalar(0.01)),
            ("y", ParamValue::Scalar(0.01)),
            ("strength", ParamValue::Scalar(1.0)),
            ("color", ParamValue::Vector(vec![1.0, 1.0, 1.0])),
        ]);
        let Effect::Blur(blur) =
            Effect::from_params(EffectKind::Blur, &map).unwrap()
        else {
            panic!("expected blur");
        };
        assert_eq!(blur.steps, 0);
        assert_eq!(blur.quality, BlurQuality::Low);
    }

    #[test]
    fn bloom_without_blur_strength_is_a_configuration_error() {
        let map = params(&[
            ("color", ParamValue::Scalar(f64::from(0x00FF_FFFF))),
            ("offsetX", ParamValue::Scalar(1.0)),
            ("offsetY", ParamValue::Scalar(1.0)),
            ("strength", ParamValue::Scalar(1.0)),
        ]);
        let err = Effect::from_params(EffectKind::Bloom, &map).unwrap_err();
        assert!(matches!(
            err,
            FxError::Configuration {
                kind: EffectKind::Bloom,
                key: "blurStrength"
            }
        ));
    }

    #[test]
    fn pixelate_accepts_size_alias() {
        let map = params(&[("size", ParamValue::Scalar(8.0))]);
        let effect = Effect::from_params(EffectKind::Pixelate, &map).unwrap();
        assert_eq!(effect, Effect::Pixelate(PixelateParams { amount: 8.0 }));
    }

    #[test]
    fn optional_keys_take_struct_defaults() {
        let map = params(&[
            ("x", ParamValue::Scalar(0.25)),
            ("y", ParamValue::Scalar(0.75)),
        ]);
        let Effect::Shadow(shadow) =
            Effect::from_params(EffectKind::Shadow, &map).unwrap()
        else {
            panic!("expected shadow");
        };
        assert_eq!(shadow.samples, 6);
        assert_eq!(shadow.decay, 0.1);
        assert_eq!(shadow.color, Vec3::ZERO);
    }

    #[test]
    fn every_default_effect_survives_the_map_form() {
        for kind in EffectKind::ALL {
            let effect = Effect::with_defaults(kind);
            let back = Effect::from_params(kind, &effect.to_params()).unwrap();
            assert_eq!(back, effect, "{kind}");
        }
    }
}
