//! Chain evaluation: run every active entry in order over three ping-pong
//! buffers, then present whichever buffer ended up holding the result.

use glam::Vec2;

use crate::effect::FxEntry;
use crate::error::FxError;
use crate::fx::backend::FxBackend;
use crate::fx::cycler::{BufferRoles, RenderTargetCycler};
use crate::fx::dispatch::DispatchTable;
use crate::fx::trace::{TraceBackend, TraceTarget};

/// Per-evaluation inputs shared by every pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Pass width in pixels.
    pub width: u32,
    /// Pass height in pixels.
    pub height: u32,
    /// Seconds since the animation started; drives Shine.
    pub time: f32,
}

impl FrameInfo {
    /// A frame of the given size at time zero.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            time: 0.0,
        }
    }

    /// Same frame at `time` seconds.
    #[must_use]
    pub const fn at_time(mut self, time: f32) -> Self {
        self.time = time;
        self
    }

    /// Size as a `vec2` for the `resolution` uniform.
    #[must_use]
    pub const fn resolution(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    fn validate(&self) -> Result<(), FxError> {
        if self.width == 0 || self.height == 0 {
            return Err(FxError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainOutput<T> {
    /// Buffer handed to [`FxBackend::present`].
    pub output: T,
    /// Role assignment at the end of the evaluation.
    pub roles: BufferRoles<T>,
    /// Draw passes issued.
    pub passes: usize,
}

/// Evaluates effect lists against a backend.
pub struct EffectChain<B: FxBackend> {
    table: DispatchTable<B>,
}

impl<B: FxBackend> Default for EffectChain<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: FxBackend> EffectChain<B> {
    /// Chain with the standard dispatch table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: DispatchTable::new(),
        }
    }

    /// Apply the active entries of `effects`, in order, starting from the
    /// image in `targets[0]`, then present the buffer holding the result.
    ///
    /// `targets` are bound to the source, target and swap roles in that
    /// order and must be distinct, same-sized buffers. Inactive entries are
    /// skipped untouched. With no active entries nothing is drawn and
    /// `targets[0]` is presented.
    ///
    /// # Errors
    ///
    /// [`FxError::InvalidDimensions`] for an empty frame,
    /// [`FxError::AliasedTargets`] when two of `targets` are the same
    /// buffer, otherwise the first handler or backend failure; nothing is
    /// presented after a failure.
    pub fn evaluate(
        &self,
        backend: &mut B,
        targets: [B::Target; 3],
        effects: &[FxEntry],
        frame: &FrameInfo,
    ) -> Result<ChainOutput<B::Target>, FxError> {
        frame.validate()?;
        if !BufferRoles::new(targets).is_distinct() {
            return Err(FxError::AliasedTargets);
        }
        log::debug!(
            "evaluating {} of {} effects at {}x{}",
            effects.iter().filter(|e| e.active).count(),
            effects.len(),
            frame.width,
            frame.height
        );

        let mut cycler = RenderTargetCycler::initialize(backend, targets);
        for entry in effects.iter().filter(|e| e.active) {
            self.table.dispatch(&mut cycler, &entry.effect, frame)?;
        }

        let (roles, passes) = cycler.present()?;
        log::debug!("chain done: {passes} passes, output {:?}", roles.source);
        Ok(ChainOutput {
            output: roles.source,
            roles,
            passes,
        })
    }
}

impl EffectChain<TraceBackend> {
    /// Dry-run `effects` and return the evaluation result together with the
    /// recorded operations.
    ///
    /// # Errors
    ///
    /// Same as [`Self::evaluate`].
    pub fn plan(
        &self,
        effects: &[FxEntry],
        frame: &FrameInfo,
    ) -> Result<(ChainOutput<TraceTarget>, TraceBackend), FxError> {
        let mut backend = TraceBackend::new();
        let targets = backend.targets();
        let output = self.evaluate(&mut backend, targets, effects, frame)?;
        Ok((output, backend))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::effect::{
        BloomParams, BlurParams, BlurQuality, EffectKind, GradientParams, PixelateParams,
        ShineParams, VignetteParams,
    };
    use crate::fx::slot::ShaderSlot;
    use crate::fx::trace::{TraceError, TraceOp};
    use glam::Vec3;

    const FRAME: FrameInfo = FrameInfo::new(64, 64);

    fn run(effects: &[FxEntry], start: &str) -> (TraceBackend, ChainOutput<TraceTarget>) {
        let mut backend = TraceBackend::with_contents([start, "stale1", "stale2"]);
        let ids = backend.targets();
        let out = EffectChain::new()
            .evaluate(&mut backend, ids, effects, &FRAME)
            .unwrap();
        (backend, out)
    }

    #[test]
    fn inactive_chain_presents_untouched_source() {
        let effects = [
            FxEntry::new(VignetteParams::default()).with_active(false),
            FxEntry::new(BlurParams {
                steps: 3,
                ..BlurParams::default()
            })
            .with_active(false),
        ];
        let (backend, out) = run(&effects, "image");
        let ids = backend.targets();
        assert_eq!(out.passes, 0);
        assert_eq!(out.output, ids[0]);
        assert_eq!(backend.contents(out.output), "image");
        assert_eq!(backend.ops(), [TraceOp::Present { output: ids[0] }]);
    }

    #[test]
    fn empty_chain_presents_source() {
        let (backend, out) = run(&[], "image");
        assert_eq!(out.output, backend.targets()[0]);
        assert_eq!(out.roles, BufferRoles::new(backend.targets()));
    }

    #[test]
    fn pixelate_then_blur_scenario() {
        let effects = [
            FxEntry::new(PixelateParams { amount: 8.0 }),
            FxEntry::new(BlurParams {
                quality: BlurQuality::Low,
                x: 0.01,
                y: 0.01,
                steps: 2,
                strength: 1.0,
                color: Vec3::ONE,
            }),
        ];
        let (backend, out) = run(&effects, "image");
        assert_eq!(out.passes, 5);
        assert_eq!(
            backend.drawn_programs(),
            [
                ShaderSlot::Pixelate,
                ShaderSlot::BlurLow,
                ShaderSlot::BlurLow,
                ShaderSlot::BlurLow,
                ShaderSlot::BlurLow,
            ]
        );
        // Odd pass count leaves the result in the second buffer.
        assert_eq!(out.output, backend.targets()[1]);
        assert_eq!(backend.ops().last(), Some(&TraceOp::Present { output: out.output }));
        assert!(backend.contents(out.output).ends_with("(image)))))"));
    }

    #[test]
    fn effects_compose_left_to_right() {
        let a = FxEntry::new(BloomParams {
            steps: 1,
            ..BloomParams::default()
        });
        let b = FxEntry::new(GradientParams::default());

        let (both, both_out) = run(&[a.clone(), b.clone()], "image");
        let (first, first_out) = run(&[a], "image");
        let intermediate = first.contents(first_out.output).to_owned();
        let (second, second_out) = run(&[b], &intermediate);

        assert_eq!(
            both.contents(both_out.output),
            second.contents(second_out.output)
        );
        assert_eq!(both_out.passes, first_out.passes + second_out.passes);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let effects = [
            FxEntry::new(ShineParams::default()),
            FxEntry::new(BloomParams {
                steps: 2,
                ..BloomParams::default()
            }),
        ];
        let chain = EffectChain::new();
        let frame = FRAME.at_time(0.25);
        let (first_out, first) = chain.plan(&effects, &frame).unwrap();
        let (second_out, second) = chain.plan(&effects, &frame).unwrap();
        assert_eq!(first.ops(), second.ops());
        assert_eq!(first_out, second_out);
    }

    #[test]
    fn plan_reports_the_presented_buffer() {
        let effects = [FxEntry::new(PixelateParams::default())];
        let (out, backend) = EffectChain::new().plan(&effects, &FRAME).unwrap();
        assert_eq!(out.passes, 1);
        assert_eq!(out.output, backend.targets()[1]);
        assert_eq!(backend.ops().last(), Some(&TraceOp::Present { output: out.output }));
    }

    #[test]
    fn aliased_targets_are_rejected() {
        let mut backend = TraceBackend::new();
        let [a, _, c] = backend.targets();
        let err = EffectChain::new()
            .evaluate(&mut backend, [a, a, c], &[], &FRAME)
            .unwrap_err();
        assert!(matches!(err, FxError::AliasedTargets));
        assert!(backend.ops().is_empty());
    }

    #[test]
    fn roles_stay_distinct_across_mixed_chain() {
        let mut effects: Vec<FxEntry> = EffectKind::ALL
            .into_iter()
            .map(|kind| FxEntry::new(crate::effect::Effect::with_defaults(kind)))
            .collect();
        effects.push(FxEntry::new(BloomParams {
            steps: 3,
            ..BloomParams::default()
        }));
        let (_, out) = run(&effects, "image");
        assert!(out.roles.is_distinct());
        assert_eq!(out.output, out.roles.source);
    }

    #[test]
    fn zero_sized_frame_is_rejected_before_any_pass() {
        let mut backend = TraceBackend::new();
        let ids = backend.targets();
        let effects = [FxEntry::new(VignetteParams::default())];
        let err = EffectChain::new()
            .evaluate(&mut backend, ids, &effects, &FrameInfo::new(0, 64))
            .unwrap_err();
        assert!(matches!(
            err,
            FxError::InvalidDimensions {
                width: 0,
                height: 64
            }
        ));
        assert!(backend.ops().is_empty());
    }

    #[test]
    fn backend_failure_stops_the_chain() {
        let mut backend = TraceBackend::new().fail_on_draw(1);
        let ids = backend.targets();
        let effects = [
            FxEntry::new(VignetteParams::default()),
            FxEntry::new(PixelateParams::default()),
            FxEntry::new(GradientParams::default()),
        ];
        let err = EffectChain::new()
            .evaluate(&mut backend, ids, &effects, &FRAME)
            .unwrap_err();
        let source = err
            .source()
            .and_then(|e| e.downcast_ref::<TraceError>())
            .cloned();
        assert_eq!(source, Some(TraceError { draw: 1 }));
        assert_eq!(backend.draw_count(), 1);
        assert!(!backend
            .ops()
            .iter()
            .any(|op| matches!(op, TraceOp::Present { .. })));
    }
}
