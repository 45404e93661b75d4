//! The seam between the effect chain and whatever executes its passes.

use std::fmt;

use crate::fx::slot::ShaderSlot;
use crate::fx::uniform::UniformSet;

/// How a blend-composite combines its two inputs.
///
/// The built-in handlers only issue [`BlendMode::Linear`] (bloom).
/// [`BlendMode::Additive`] is part of the compositor primitive for callers
/// that drive [`FxBackend::blend`] themselves; the wgpu backend encodes both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// `mix(base, overlay * strength, 0.5)`
    #[default]
    Linear,
    /// `base + overlay * strength`
    Additive,
}

/// One full-screen draw: `program` reads `source` and writes `target`.
#[derive(Debug, Clone, Copy)]
pub struct DrawPass<'a, T> {
    /// Program to run.
    pub program: ShaderSlot,
    /// Inputs bound for this draw.
    pub uniforms: &'a UniformSet,
    /// Buffer sampled by the program.
    pub source: T,
    /// Buffer written by the program.
    pub target: T,
}

/// Weighted combination of two buffers into a third.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendPass<T> {
    /// Combination rule.
    pub mode: BlendMode,
    /// First input.
    pub base: T,
    /// Second input, scaled by `strength`.
    pub overlay: T,
    /// Output buffer.
    pub target: T,
    /// Weight of `overlay`.
    pub strength: f32,
}

/// Executes the primitive operations of an effect chain.
///
/// Implementations own (or borrow) the render targets that `Target` handles
/// name; the chain only ever passes handles around. Every method corresponds
/// to exactly one GPU operation and is issued synchronously, in order.
pub trait FxBackend {
    /// Render target handle. Identity is by handle, not by content.
    type Target: Copy + Eq + fmt::Debug;
    /// Failure reported by the backend; propagated unmodified.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run one full-screen pass.
    ///
    /// # Errors
    ///
    /// Backend-specific.
    fn draw(&mut self, pass: &DrawPass<'_, Self::Target>) -> Result<(), Self::Error>;

    /// Copy the contents of `from` into `to`.
    ///
    /// # Errors
    ///
    /// Backend-specific.
    fn copy(&mut self, from: Self::Target, to: Self::Target) -> Result<(), Self::Error>;

    /// Blend-composite two buffers into a third.
    ///
    /// # Errors
    ///
    /// Backend-specific.
    fn blend(&mut self, pass: &BlendPass<Self::Target>) -> Result<(), Self::Error>;

    /// Hand the finished buffer to the main-scene compositor.
    ///
    /// # Errors
    ///
    /// Backend-specific.
    fn present(&mut self, output: Self::Target) -> Result<(), Self::Error>;
}
