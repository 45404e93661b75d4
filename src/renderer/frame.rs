//! The wgpu implementation of [`FxBackend`].
//!
//! Chain evaluation only records: each operation becomes a [`FrameOp`] and
//! each pass's uniforms are staged into the ring. Once the chain is done
//! the ring is uploaded and [`RecordedFrame::encode`] replays the ops into a
//! command encoder.

use std::fmt;

use crate::fx::backend::{BlendMode, BlendPass, DrawPass, FxBackend};
use crate::fx::slot::{ShaderSlot, STRENGTH_LAYOUT};
use crate::fx::uniform::{UniformError, UniformSet};
use crate::gpu::texture::{RenderTargetSet, TargetId};
use crate::gpu::uniform_ring::{StagedBlocks, UniformRing};
use crate::renderer::programs::FxPrograms;

/// Failure recording a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A pass's uniforms did not fit its program.
    Uniform {
        /// Program label.
        program: &'static str,
        /// What went wrong.
        source: UniformError,
    },
    /// An operation read and wrote the same target.
    Aliased {
        /// Operation name.
        op: &'static str,
        /// The shared target.
        target: TargetId,
    },
    /// `present` was called twice.
    AlreadyPresented,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform { program, source } => {
                write!(f, "{program}: {source}")
            }
            Self::Aliased { op, target } => {
                write!(f, "{op} reads and writes {target:?}")
            }
            Self::AlreadyPresented => write!(f, "frame already presented"),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Uniform { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// One recorded operation, with the ring offset of its uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOp {
    /// Effect pass.
    Draw {
        /// Program.
        program: ShaderSlot,
        /// Sampled target.
        source: TargetId,
        /// Written target.
        target: TargetId,
        /// Uniform block offset.
        offset: u32,
    },
    /// Whole-texture copy.
    Copy {
        /// Read target.
        from: TargetId,
        /// Written target.
        to: TargetId,
    },
    /// Blend-composite pass.
    Blend {
        /// Blend rule.
        mode: BlendMode,
        /// First input.
        base: TargetId,
        /// Second input.
        overlay: TargetId,
        /// Written target.
        target: TargetId,
        /// Uniform block offset.
        offset: u32,
    },
    /// Composite onto the output view.
    Present {
        /// Target holding the result.
        source: TargetId,
        /// Uniform block offset.
        offset: u32,
    },
}

/// Records chain operations for one frame.
pub struct FxFrame<'a> {
    staged: &'a mut StagedBlocks,
    ops: Vec<FrameOp>,
    presented: bool,
}

impl<'a> FxFrame<'a> {
    /// Start recording, staging uniform blocks into `staged` after any
    /// blocks it already holds.
    pub fn new(staged: &'a mut StagedBlocks) -> Self {
        Self {
            staged,
            ops: Vec::new(),
            presented: false,
        }
    }

    /// Operations recorded so far.
    #[must_use]
    pub fn ops(&self) -> &[FrameOp] {
        &self.ops
    }

    /// Stop recording.
    #[must_use]
    pub fn finish(self) -> RecordedFrame {
        RecordedFrame { ops: self.ops }
    }

    fn stage(
        &mut self,
        label: &'static str,
        layout: &crate::fx::uniform::UniformLayout,
        set: &UniformSet,
    ) -> Result<u32, FrameError> {
        self.staged
            .push(layout, set)
            .map_err(|source| FrameError::Uniform {
                program: label,
                source,
            })
    }

    fn stage_strength(&mut self, label: &'static str, strength: f32) -> Result<u32, FrameError> {
        let mut set = UniformSet::new();
        set.set("strength", strength);
        self.stage(label, &STRENGTH_LAYOUT, &set)
    }
}

fn distinct(op: &'static str, a: TargetId, b: TargetId) -> Result<(), FrameError> {
    if a == b {
        return Err(FrameError::Aliased { op, target: a });
    }
    Ok(())
}

impl FxBackend for FxFrame<'_> {
    type Target = TargetId;
    type Error = FrameError;

    fn draw(&mut self, pass: &DrawPass<'_, TargetId>) -> Result<(), FrameError> {
        distinct(pass.program.label(), pass.source, pass.target)?;
        let offset = self.stage(pass.program.label(), pass.program.layout(), pass.uniforms)?;
        self.ops.push(FrameOp::Draw {
            program: pass.program,
            source: pass.source,
            target: pass.target,
            offset,
        });
        Ok(())
    }

    fn copy(&mut self, from: TargetId, to: TargetId) -> Result<(), FrameError> {
        distinct("copy", from, to)?;
        self.ops.push(FrameOp::Copy { from, to });
        Ok(())
    }

    fn blend(&mut self, pass: &BlendPass<TargetId>) -> Result<(), FrameError> {
        distinct("blend", pass.base, pass.target)?;
        distinct("blend", pass.overlay, pass.target)?;
        let offset = self.stage_strength("FX Blend", pass.strength)?;
        self.ops.push(FrameOp::Blend {
            mode: pass.mode,
            base: pass.base,
            overlay: pass.overlay,
            target: pass.target,
            offset,
        });
        Ok(())
    }

    fn present(&mut self, output: TargetId) -> Result<(), FrameError> {
        if self.presented {
            return Err(FrameError::AlreadyPresented);
        }
        let offset = self.stage_strength("FX Present", 1.0)?;
        self.ops.push(FrameOp::Present {
            source: output,
            offset,
        });
        self.presented = true;
        Ok(())
    }
}

/// Sub-rectangle of the output view the result is composited into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

/// Where the chain's result ends up.
pub struct FrameOutput<'v> {
    /// View composited into; its contents are kept.
    pub view: &'v wgpu::TextureView,
    /// Area of `view` to cover, the whole view when `None`.
    pub viewport: Option<Viewport>,
}

/// GPU resources a recorded frame is replayed against.
pub struct EncodeResources<'r> {
    /// Device for per-frame bind groups.
    pub device: &'r wgpu::Device,
    /// Compiled programs.
    pub programs: &'r FxPrograms,
    /// The three targets the chain ran over.
    pub targets: &'r RenderTargetSet,
    /// Uploaded uniform ring.
    pub ring: &'r UniformRing,
}

/// A finished recording.
#[derive(Debug, Clone, Default)]
pub struct RecordedFrame {
    ops: Vec<FrameOp>,
}

impl RecordedFrame {
    /// Recorded operations.
    #[must_use]
    pub fn ops(&self) -> &[FrameOp] {
        &self.ops
    }

    /// Encode every recorded op. The ring must already hold this frame's
    /// uniform blocks.
    pub fn encode(
        &self,
        res: &EncodeResources<'_>,
        encoder: &mut wgpu::CommandEncoder,
        output: &FrameOutput<'_>,
    ) {
        let uniforms = wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: res.ring.buffer(),
            offset: 0,
            size: res.ring.binding_size(),
        });
        let single: Vec<wgpu::BindGroup> = TargetId::ALL
            .iter()
            .map(|&id| {
                res.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("FX Single Bind Group"),
                    layout: &res.programs.single_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(
                                &res.targets.get(id).view,
                            ),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(
                                &res.programs.sampler,
                            ),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: uniforms.clone(),
                        },
                    ],
                })
            })
            .collect();

        for op in &self.ops {
            match *op {
                FrameOp::Draw {
                    program,
                    source,
                    target,
                    offset,
                } => {
                    let mut pass = begin(
                        encoder,
                        program.label(),
                        &res.targets.get(target).view,
                        wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    );
                    pass.set_pipeline(res.programs.effect(program));
                    pass.set_bind_group(0, &single[source.index()], &[offset]);
                    pass.draw(0..3, 0..1);
                }
                FrameOp::Copy { from, to } => {
                    let from = res.targets.get(from);
                    encoder.copy_texture_to_texture(
                        from.texture.as_image_copy(),
                        res.targets.get(to).texture.as_image_copy(),
                        from.extent(),
                    );
                }
                FrameOp::Blend {
                    mode,
                    base,
                    overlay,
                    target,
                    offset,
                } => {
                    let bind_group = res.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("FX Blend Bind Group"),
                        layout: &res.programs.blend_layout,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: wgpu::BindingResource::TextureView(
                                    &res.targets.get(base).view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::TextureView(
                                    &res.targets.get(overlay).view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 2,
                                resource: wgpu::BindingResource::Sampler(
                                    &res.programs.sampler,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: 3,
                                resource: uniforms.clone(),
                            },
                        ],
                    });
                    let mut pass = begin(
                        encoder,
                        "FX Blend",
                        &res.targets.get(target).view,
                        wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    );
                    pass.set_pipeline(res.programs.blend(mode));
                    pass.set_bind_group(0, &bind_group, &[offset]);
                    pass.draw(0..3, 0..1);
                }
                FrameOp::Present { source, offset } => {
                    let mut pass =
                        begin(encoder, "FX Present", output.view, wgpu::LoadOp::Load);
                    if let Some(v) = output.viewport {
                        pass.set_viewport(v.x, v.y, v.width, v.height, 0.0, 1.0);
                    }
                    pass.set_pipeline(res.programs.present());
                    pass.set_bind_group(0, &single[source.index()], &[offset]);
                    pass.draw(0..3, 0..1);
                }
            }
        }
    }
}

fn begin<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{BloomParams, BlurParams, FxEntry, PixelateParams};
    use crate::fx::chain::{EffectChain, FrameInfo};
    use crate::gpu::uniform_ring::SLOT_STRIDE;

    const FRAME: FrameInfo = FrameInfo::new(32, 32);

    fn record(effects: &[FxEntry]) -> (RecordedFrame, usize) {
        let mut staged = StagedBlocks::new(SLOT_STRIDE as usize);
        let mut frame = FxFrame::new(&mut staged);
        let _ = EffectChain::new()
            .evaluate(&mut frame, TargetId::ALL, effects, &FRAME)
            .unwrap();
        let recorded = frame.finish();
        (recorded, staged.len())
    }

    #[test]
    fn every_pass_gets_its_own_uniform_block() {
        let (recorded, blocks) = record(&[FxEntry::new(BlurParams {
            steps: 2,
            ..BlurParams::default()
        })]);
        // Four blur passes plus present.
        assert_eq!(blocks, 5);
        let offsets: Vec<u32> = recorded
            .ops()
            .iter()
            .filter_map(|op| match op {
                FrameOp::Draw { offset, .. } | FrameOp::Present { offset, .. } => Some(*offset),
                _ => None,
            })
            .collect();
        assert_eq!(offsets, [0, 256, 512, 768, 1024]);
    }

    fn block_offsets(recorded: &RecordedFrame) -> Vec<u32> {
        recorded
            .ops()
            .iter()
            .filter_map(|op| match op {
                FrameOp::Draw { offset, .. }
                | FrameOp::Blend { offset, .. }
                | FrameOp::Present { offset, .. } => Some(*offset),
                FrameOp::Copy { .. } => None,
            })
            .collect()
    }

    #[test]
    fn chains_sharing_a_ring_keep_their_own_blocks() {
        let mut staged = StagedBlocks::new(SLOT_STRIDE as usize);
        let read = |staged: &StagedBlocks, at: usize| {
            let b = &staged.as_bytes()[at..at + 4];
            f32::from_ne_bytes([b[0], b[1], b[2], b[3]])
        };

        let mut first = FxFrame::new(&mut staged);
        let _ = EffectChain::new()
            .evaluate(
                &mut first,
                TargetId::ALL,
                &[FxEntry::new(PixelateParams { amount: 8.0 })],
                &FRAME,
            )
            .unwrap();
        let first = block_offsets(&first.finish());
        // amount sits right after the vec2 resolution.
        assert_eq!(read(&staged, 8), 8.0);

        let mut second = FxFrame::new(&mut staged);
        let _ = EffectChain::new()
            .evaluate(
                &mut second,
                TargetId::ALL,
                &[FxEntry::new(BlurParams {
                    x: 2.0,
                    steps: 1,
                    ..BlurParams::default()
                })],
                &FRAME,
            )
            .unwrap();
        let second = block_offsets(&second.finish());

        assert_eq!(first, [0, 256]);
        assert_eq!(second, [512, 768, 1024]);
        assert_eq!(staged.len(), 5);
        assert_eq!(read(&staged, 8), 8.0);
    }

    #[test]
    fn bloom_records_copies_around_the_blend() {
        let (recorded, _) = record(&[FxEntry::new(BloomParams {
            steps: 1,
            ..BloomParams::default()
        })]);
        let [a, b, c] = TargetId::ALL;
        let ops = recorded.ops();
        assert_eq!(ops[0], FrameOp::Copy { from: a, to: c });
        assert!(matches!(ops[3], FrameOp::Blend { base, overlay, target, .. }
            if base == c && overlay == a && target == b));
        assert_eq!(ops[4], FrameOp::Copy { from: b, to: a });
        assert!(matches!(ops[5], FrameOp::Present { source, .. } if source == a));
    }

    #[test]
    fn single_pass_chain_presents_second_target() {
        let (recorded, _) = record(&[FxEntry::new(PixelateParams::default())]);
        assert!(matches!(
            recorded.ops().last(),
            Some(FrameOp::Present { source, .. }) if *source == TargetId::ALL[1]
        ));
    }

    #[test]
    fn aliased_operations_are_rejected() {
        let mut staged = StagedBlocks::new(SLOT_STRIDE as usize);
        let mut frame = FxFrame::new(&mut staged);
        let [a, ..] = TargetId::ALL;
        assert!(matches!(
            frame.copy(a, a),
            Err(FrameError::Aliased { op: "copy", .. })
        ));
        let uniforms = UniformSet::new();
        let err = frame
            .draw(&DrawPass {
                program: ShaderSlot::Vignette,
                uniforms: &uniforms,
                source: a,
                target: a,
            })
            .unwrap_err();
        assert_eq!(
            err,
            FrameError::Aliased {
                op: "FX Vignette",
                target: a
            }
        );
        assert!(frame.ops().is_empty());
    }

    #[test]
    fn direct_additive_blend_is_recorded() {
        let mut staged = StagedBlocks::new(SLOT_STRIDE as usize);
        let mut frame = FxFrame::new(&mut staged);
        let [a, b, c] = TargetId::ALL;
        frame
            .blend(&BlendPass {
                mode: BlendMode::Additive,
                base: a,
                overlay: b,
                target: c,
                strength: 0.5,
            })
            .unwrap();
        assert_eq!(
            frame.finish().ops(),
            [FrameOp::Blend {
                mode: BlendMode::Additive,
                base: a,
                overlay: b,
                target: c,
                offset: 0,
            }]
        );
        assert_eq!(staged.len(), 1);
    }

    #[test]
    fn second_present_is_rejected() {
        let mut staged = StagedBlocks::new(SLOT_STRIDE as usize);
        let mut frame = FxFrame::new(&mut staged);
        frame.present(TargetId::ALL[0]).unwrap();
        assert_eq!(
            frame.present(TargetId::ALL[0]),
            Err(FrameError::AlreadyPresented)
        );
    }
}
