//! Per-effect pass sequences.
//!
//! Six effects are "bind, then one pass" and share [`single_pass`]; each only
//! supplies its uniform schema through [`SinglePassEffect`]. Blur and bloom
//! run their own multi-pass sequences.

use glam::Vec2;

use crate::effect::{
    BloomParams, BlurParams, EffectKind, GlowParams, GradientParams,
    PixelateParams, ShadowParams, ShineParams, VignetteParams,
};
use crate::error::FxError;
use crate::fx::backend::{BlendMode, FxBackend};
use crate::fx::chain::FrameInfo;
use crate::fx::cycler::RenderTargetCycler;
use crate::fx::slot::ShaderSlot;
use crate::fx::uniform::{Uniform, UniformSet};

/// An effect drawn with exactly one pass of one program.
pub(crate) trait SinglePassEffect {
    const KIND: EffectKind;
    const PROGRAM: ShaderSlot;

    /// Bind this effect's inputs for a pass of `frame`'s size.
    fn bind(&self, uniforms: &mut UniformSet, frame: &FrameInfo);
}

/// Select the effect's program, bind its inputs, run one pass.
pub(crate) fn single_pass<B: FxBackend, E: SinglePassEffect>(
    cycler: &mut RenderTargetCycler<'_, B>,
    params: &E,
    frame: &FrameInfo,
) -> Result<(), FxError> {
    log::trace!("{}: single pass", E::KIND);
    cycler.bind_program(E::PROGRAM);
    params.bind(cycler.uniforms_mut(), frame);
    cycler.run_pass()
}

impl SinglePassEffect for GlowParams {
    const KIND: EffectKind = EffectKind::Glow;
    const PROGRAM: ShaderSlot = ShaderSlot::Glow;

    fn bind(&self, u: &mut UniformSet, frame: &FrameInfo) {
        u.set("glowColor", self.color.extend(1.0));
        u.set("resolution", frame.resolution());
        u.set("outerStrength", self.outer_strength);
        u.set("innerStrength", self.inner_strength);
        u.set("knockout", Uniform::flag(self.knockout));
        u.set("distance", self.distance as f32);
        u.set("quality", self.quality);
    }
}

impl SinglePassEffect for ShadowParams {
    const KIND: EffectKind = EffectKind::Shadow;
    const PROGRAM: ShaderSlot = ShaderSlot::Shadow;

    fn bind(&self, u: &mut UniformSet, _frame: &FrameInfo) {
        let samples = self.samples.max(1);
        u.set("color", self.color.extend(1.0));
        u.set("lightPosition", Vec2::new(self.x, self.y));
        u.set("decay", self.decay);
        u.set("power", self.power / samples as f32);
        u.set("intensity", self.intensity);
        u.set("samples", Uniform::Int(samples as i32));
    }
}

impl SinglePassEffect for PixelateParams {
    const KIND: EffectKind = EffectKind::Pixelate;
    const PROGRAM: ShaderSlot = ShaderSlot::Pixelate;

    fn bind(&self, u: &mut UniformSet, frame: &FrameInfo) {
        u.set("resolution", frame.resolution());
        u.set("amount", self.amount);
    }
}

impl SinglePassEffect for VignetteParams {
    const KIND: EffectKind = EffectKind::Vignette;
    const PROGRAM: ShaderSlot = ShaderSlot::Vignette;

    fn bind(&self, u: &mut UniformSet, _frame: &FrameInfo) {
        u.set("position", Vec2::new(self.x, self.y));
        u.set("radius", self.radius);
        u.set("strength", self.strength);
    }
}

impl SinglePassEffect for ShineParams {
    const KIND: EffectKind = EffectKind::Shine;
    const PROGRAM: ShaderSlot = ShaderSlot::Shine;

    fn bind(&self, u: &mut UniformSet, frame: &FrameInfo) {
        u.set("resolution", frame.resolution());
        u.set("time", frame.time);
        u.set("speed", self.speed);
        u.set("lineWidth", self.line_width);
        u.set("gradient", self.gradient);
        u.set("reveal", Uniform::flag(self.reveal));
    }
}

impl SinglePassEffect for GradientParams {
    const KIND: EffectKind = EffectKind::Gradient;
    const PROGRAM: ShaderSlot = ShaderSlot::Gradient;

    fn bind(&self, u: &mut UniformSet, _frame: &FrameInfo) {
        u.set("color1", self.color1);
        u.set("alpha", self.alpha);
        u.set("color2", self.color2);
        u.set("size", Uniform::Int(self.size as i32));
        u.set("positionFrom", Vec2::new(self.from_x, self.from_y));
        u.set("positionTo", Vec2::new(self.to_x, self.to_y));
    }
}

/// Separable blur: `steps` iterations of a horizontal then a vertical pass
/// with the quality's program.
pub(crate) fn blur<B: FxBackend>(
    cycler: &mut RenderTargetCycler<'_, B>,
    params: &BlurParams,
    frame: &FrameInfo,
) -> Result<(), FxError> {
    cycler.bind_program(ShaderSlot::blur(params.quality));
    cycler.set_uniform("resolution", frame.resolution());
    cycler.set_uniform("strength", params.strength);
    cycler.set_uniform("color", params.color);

    for _ in 0..params.steps {
        cycler.set_uniform("offset", Vec2::new(params.x, 0.0));
        cycler.run_pass()?;
        cycler.set_uniform("offset", Vec2::new(0.0, params.y));
        cycler.run_pass()?;
    }
    Ok(())
}

/// Bloom: snapshot the input into `swap`, blur `source` in place with the
/// bloom program, blend the snapshot with the blur into `target`, and copy
/// the blend back so `source` again holds the latest result.
pub(crate) fn bloom<B: FxBackend>(
    cycler: &mut RenderTargetCycler<'_, B>,
    params: &BloomParams,
    frame: &FrameInfo,
) -> Result<(), FxError> {
    log::debug!(
        "bloom: {} steps, blur {}, blend {}",
        params.steps,
        params.blur_strength,
        params.strength
    );
    cycler.snapshot_source()?;

    cycler.bind_program(ShaderSlot::Bloom);
    cycler.set_uniform("strength", params.blur_strength);
    cycler.set_uniform("color", params.color);

    // Pixel offsets to normalized device units.
    let nx = (2.0 / frame.width as f32) * params.offset_x;
    let ny = (2.0 / frame.height as f32) * params.offset_y;

    for _ in 0..params.steps {
        cycler.set_uniform("offset", Vec2::new(nx, 0.0));
        cycler.run_pass()?;
        cycler.set_uniform("offset", Vec2::new(0.0, ny));
        cycler.run_pass()?;
    }

    cycler.blend_swap_with_source(BlendMode::Linear, params.strength)?;
    cycler.restore_target()
}
