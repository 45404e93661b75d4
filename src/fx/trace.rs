//! A backend that records operations instead of running them.
//!
//! Target contents are modelled symbolically: every draw or blend replaces the
//! written buffer's contents with an expression over its inputs, so two runs
//! produce the same contents exactly when they performed the same operations
//! on the same data. Useful for dry-running a chain and for tests.

use std::fmt::{self, Write as _};

use crate::fx::backend::{BlendPass, DrawPass, FxBackend};
use crate::fx::slot::ShaderSlot;
use crate::fx::uniform::UniformSet;

/// Handle of one of the three traced buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceTarget(pub u8);

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceOp {
    /// A full-screen pass.
    Draw {
        /// Program run.
        program: ShaderSlot,
        /// Inputs bound at the time of the draw.
        uniforms: UniformSet,
        /// Buffer read.
        source: TraceTarget,
        /// Buffer written.
        target: TraceTarget,
    },
    /// A buffer copy.
    Copy {
        /// Buffer read.
        from: TraceTarget,
        /// Buffer written.
        to: TraceTarget,
    },
    /// A blend-composite.
    Blend(BlendPass<TraceTarget>),
    /// Final hand-off.
    Present {
        /// Buffer presented.
        output: TraceTarget,
    },
}

/// Error injected by [`TraceBackend::fail_on_draw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceError {
    /// Zero-based index of the failing draw.
    pub draw: usize,
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "injected failure on draw {}", self.draw)
    }
}

impl std::error::Error for TraceError {}

/// Records every operation and tracks symbolic buffer contents.
#[derive(Debug, Clone)]
pub struct TraceBackend {
    contents: [String; 3],
    ops: Vec<TraceOp>,
    draws: usize,
    fail_on: Option<usize>,
}

impl Default for TraceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceBackend {
    /// Buffers start out holding `image`, `stale1` and `stale2`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_contents(["image", "stale1", "stale2"])
    }

    /// Buffers start out holding the given expressions.
    #[must_use]
    pub fn with_contents(contents: [&str; 3]) -> Self {
        Self {
            contents: contents.map(str::to_owned),
            ops: Vec::new(),
            draws: 0,
            fail_on: None,
        }
    }

    /// Make the `draw`-th draw call (zero-based) fail.
    #[must_use]
    pub fn fail_on_draw(mut self, draw: usize) -> Self {
        self.fail_on = Some(draw);
        self
    }

    /// The three handles, in the order they should be handed to the chain.
    #[must_use]
    pub const fn targets(&self) -> [TraceTarget; 3] {
        [TraceTarget(0), TraceTarget(1), TraceTarget(2)]
    }

    /// Symbolic contents of `target`.
    #[must_use]
    pub fn contents(&self, target: TraceTarget) -> &str {
        &self.contents[usize::from(target.0)]
    }

    /// Every recorded operation, in issue order.
    #[must_use]
    pub fn ops(&self) -> &[TraceOp] {
        &self.ops
    }

    /// Number of draw passes recorded.
    #[must_use]
    pub const fn draw_count(&self) -> usize {
        self.draws
    }

    /// Programs of the recorded draws, in order.
    #[must_use]
    pub fn drawn_programs(&self) -> Vec<ShaderSlot> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                TraceOp::Draw { program, .. } => Some(*program),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded operations, keeping buffer contents.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
        self.draws = 0;
    }

    fn slot(&mut self, target: TraceTarget) -> &mut String {
        &mut self.contents[usize::from(target.0)]
    }
}

fn describe_draw(program: ShaderSlot, uniforms: &UniformSet, input: &str) -> String {
    let mut out = String::from(program.label());
    out.push('[');
    for (i, (name, value)) in uniforms.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{name}={value:?}");
    }
    let _ = write!(out, "]({input})");
    out
}

impl FxBackend for TraceBackend {
    type Target = TraceTarget;
    type Error = TraceError;

    fn draw(&mut self, pass: &DrawPass<'_, TraceTarget>) -> Result<(), TraceError> {
        if self.fail_on == Some(self.draws) {
            return Err(TraceError { draw: self.draws });
        }
        let written = describe_draw(
            pass.program,
            pass.uniforms,
            self.contents(pass.source),
        );
        *self.slot(pass.target) = written;
        self.ops.push(TraceOp::Draw {
            program: pass.program,
            uniforms: pass.uniforms.clone(),
            source: pass.source,
            target: pass.target,
        });
        self.draws += 1;
        Ok(())
    }

    fn copy(&mut self, from: TraceTarget, to: TraceTarget) -> Result<(), TraceError> {
        let copied = self.contents(from).to_owned();
        *self.slot(to) = copied;
        self.ops.push(TraceOp::Copy { from, to });
        Ok(())
    }

    fn blend(&mut self, pass: &BlendPass<TraceTarget>) -> Result<(), TraceError> {
        let written = format!(
            "{:?}[{}]({}, {})",
            pass.mode,
            pass.strength,
            self.contents(pass.base),
            self.contents(pass.overlay)
        );
        *self.slot(pass.target) = written;
        self.ops.push(TraceOp::Blend(*pass));
        Ok(())
    }

    fn present(&mut self, output: TraceTarget) -> Result<(), TraceError> {
        self.ops.push(TraceOp::Present { output });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::backend::BlendMode;

    #[test]
    fn draw_rewrites_target_from_source() {
        let mut backend = TraceBackend::new();
        let [a, b, _] = backend.targets();
        let mut uniforms = UniformSet::new();
        uniforms.set("amount", 2.0_f32);
        backend
            .draw(&DrawPass {
                program: ShaderSlot::Pixelate,
                uniforms: &uniforms,
                source: a,
                target: b,
            })
            .unwrap();
        assert_eq!(backend.contents(b), "FX Pixelate[amount=Float(2.0)](image)");
        assert_eq!(backend.contents(a), "image");
        assert_eq!(backend.draw_count(), 1);
    }

    #[test]
    fn blend_and_copy_track_contents() {
        let mut backend = TraceBackend::with_contents(["x", "y", "z"]);
        let [a, b, c] = backend.targets();
        backend
            .blend(&BlendPass {
                mode: BlendMode::Additive,
                base: a,
                overlay: b,
                target: c,
                strength: 0.5,
            })
            .unwrap();
        assert_eq!(backend.contents(c), "Additive[0.5](x, y)");
        backend.copy(c, a).unwrap();
        assert_eq!(backend.contents(a), "Additive[0.5](x, y)");
        assert_eq!(backend.draw_count(), 0);
    }

    #[test]
    fn injected_failure_hits_the_requested_draw() {
        let mut backend = TraceBackend::new().fail_on_draw(1);
        let [a, b, _] = backend.targets();
        let uniforms = UniformSet::new();
        let pass = DrawPass {
            program: ShaderSlot::Vignette,
            uniforms: &uniforms,
            source: a,
            target: b,
        };
        assert!(backend.draw(&pass).is_ok());
        assert_eq!(backend.draw(&pass), Err(TraceError { draw: 1 }));
    }
}
