//! wgpu rendering of effect chains.
//!
//! [`FxRenderer`] owns the compiled programs and the per-pass uniform ring.
//! Each call to [`FxRenderer::render`] evaluates one chain over a
//! [`RenderTargetSet`] by recording into an [`FxFrame`], then encodes the
//! recorded passes and the final composite into the caller's encoder.
//!
//! Several chains may be rendered before one submit; each gets its own
//! uniform slots. Call [`FxRenderer::begin_frame`] after submitting to
//! recycle them.

pub mod frame;
pub mod programs;

pub use frame::{FrameError, FrameOp, FrameOutput, FxFrame, RecordedFrame, Viewport};
pub use programs::FxPrograms;

use crate::effect::FxEntry;
use crate::error::FxError;
use crate::fx::chain::{ChainOutput, EffectChain, FrameInfo};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::{RenderTargetSet, TargetId};
use crate::gpu::uniform_ring::UniformRing;
use frame::EncodeResources;

/// Slots the ring starts with; a frame with more passes grows it.
const INITIAL_UNIFORM_SLOTS: u64 = 64;

/// Runs effect chains on the GPU.
pub struct FxRenderer {
    programs: FxPrograms,
    ring: UniformRing,
}

impl FxRenderer {
    /// Compile the program set for `target_format` offscreen targets,
    /// presenting into views of the context's output format.
    ///
    /// # Errors
    ///
    /// [`FxError::Shader`] if a program fails to compose.
    pub fn new(
        context: &RenderContext,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self, FxError> {
        let mut composer = ShaderComposer::new()?;
        let programs = FxPrograms::new(
            &context.device,
            &mut composer,
            target_format,
            context.format(),
        )?;
        Ok(Self {
            programs,
            ring: UniformRing::new(
                &context.device,
                "FX Uniform Ring",
                INITIAL_UNIFORM_SLOTS,
            ),
        })
    }

    /// Compiled programs.
    #[must_use]
    pub const fn programs(&self) -> &FxPrograms {
        &self.programs
    }

    /// Release the uniform slots of previous renders. Call once per frame,
    /// after the command buffers holding those renders were submitted.
    pub fn begin_frame(&mut self) {
        self.ring.reset();
    }

    /// Apply `effects` to the image in `targets.input()` and composite the
    /// result into `output`.
    ///
    /// `time` is the animation clock in seconds. On error nothing is
    /// encoded and no uniform slots are kept.
    ///
    /// # Errors
    ///
    /// Any [`FxError`] from chain evaluation; backend failures arrive as
    /// [`FxError::RenderBackend`] wrapping a [`FrameError`].
    pub fn render(
        &mut self,
        context: &RenderContext,
        encoder: &mut wgpu::CommandEncoder,
        targets: &RenderTargetSet,
        effects: &[FxEntry],
        time: f32,
        output: &FrameOutput<'_>,
    ) -> Result<ChainOutput<TargetId>, FxError> {
        let info = FrameInfo::new(targets.width(), targets.height()).at_time(time);

        let staged = self.ring.staged_mut();
        let mark = staged.as_bytes().len();
        let mut frame = FxFrame::new(staged);
        let evaluated = EffectChain::new().evaluate(&mut frame, targets.ids(), effects, &info);
        let recorded = frame.finish();
        let result = match evaluated {
            Ok(result) => result,
            Err(e) => {
                self.ring.staged_mut().truncate(mark);
                return Err(e);
            }
        };

        if self.ring.upload(&context.device, &context.queue) {
            log::debug!("uniform ring reallocated: {} bytes", self.ring.capacity());
        }
        recorded.encode(
            &EncodeResources {
                device: &context.device,
                programs: &self.programs,
                targets,
                ring: &self.ring,
            },
            encoder,
            output,
        );
        Ok(result)
    }
}
