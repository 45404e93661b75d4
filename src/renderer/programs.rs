//! Compiled pipelines for every effect, blend and present program.

use crate::error::FxError;
use crate::fx::backend::BlendMode;
use crate::fx::slot::ShaderSlot;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, dynamic_uniform_buffer, filtering_sampler,
    linear_sampler, texture_2d,
};
use crate::gpu::shader_composer::{
    ShaderComposer, BLEND_ADDITIVE_SHADER, BLEND_LINEAR_SHADER, EFFECT_SHADERS,
    PRESENT_SHADER,
};

/// Premultiplied-alpha "over".
const PREMULTIPLIED_OVER: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
};

/// The fixed program set, compiled for one target format and one output
/// format.
pub struct FxPrograms {
    /// Layout of effect and present passes: source texture, sampler,
    /// dynamic uniform block.
    pub single_layout: wgpu::BindGroupLayout,
    /// Layout of blend passes: base, overlay, sampler, dynamic uniform block.
    pub blend_layout: wgpu::BindGroupLayout,
    /// Sampler shared by every pass.
    pub sampler: wgpu::Sampler,
    effects: Vec<wgpu::RenderPipeline>,
    blend_linear: wgpu::RenderPipeline,
    blend_additive: wgpu::RenderPipeline,
    present: wgpu::RenderPipeline,
}

impl FxPrograms {
    /// Compile every program.
    ///
    /// `target_format` is the format of the three offscreen targets,
    /// `output_format` the format of the view the chain is presented into.
    ///
    /// # Errors
    ///
    /// [`FxError::Shader`] if a program fails to compose.
    pub fn new(
        device: &wgpu::Device,
        composer: &mut ShaderComposer,
        target_format: wgpu::TextureFormat,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self, FxError> {
        let single_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("FX Single Layout"),
                entries: &[
                    texture_2d(0),
                    filtering_sampler(1),
                    dynamic_uniform_buffer(2),
                ],
            });
        let blend_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("FX Blend Layout"),
                entries: &[
                    texture_2d(0),
                    texture_2d(1),
                    filtering_sampler(2),
                    dynamic_uniform_buffer(3),
                ],
            });

        let mut effects = Vec::with_capacity(ShaderSlot::COUNT);
        for slot in ShaderSlot::ALL {
            let shader = composer.compose(
                device,
                slot.label(),
                EFFECT_SHADERS[slot.index()],
            )?;
            effects.push(create_screen_space_pipeline(
                device,
                slot.label(),
                &shader,
                target_format,
                None,
                &[&single_layout],
            ));
        }

        let linear = composer.compose(device, "FX Blend Linear", BLEND_LINEAR_SHADER)?;
        let additive =
            composer.compose(device, "FX Blend Additive", BLEND_ADDITIVE_SHADER)?;
        let present = composer.compose(device, "FX Present", PRESENT_SHADER)?;

        log::debug!(
            "compiled {} effect programs ({target_format:?} -> {output_format:?})",
            effects.len()
        );

        Ok(Self {
            blend_linear: create_screen_space_pipeline(
                device,
                "FX Blend Linear",
                &linear,
                target_format,
                None,
                &[&blend_layout],
            ),
            blend_additive: create_screen_space_pipeline(
                device,
                "FX Blend Additive",
                &additive,
                target_format,
                None,
                &[&blend_layout],
            ),
            present: create_screen_space_pipeline(
                device,
                "FX Present",
                &present,
                output_format,
                Some(PREMULTIPLIED_OVER),
                &[&single_layout],
            ),
            sampler: linear_sampler(device, "FX Sampler"),
            single_layout,
            blend_layout,
            effects,
        })
    }

    /// Pipeline of an effect program.
    #[must_use]
    pub fn effect(&self, slot: ShaderSlot) -> &wgpu::RenderPipeline {
        &self.effects[slot.index()]
    }

    /// Pipeline of a blend-composite.
    #[must_use]
    pub const fn blend(&self, mode: BlendMode) -> &wgpu::RenderPipeline {
        match mode {
            BlendMode::Linear => &self.blend_linear,
            BlendMode::Additive => &self.blend_additive,
        }
    }

    /// Pipeline of the final composite.
    #[must_use]
    pub const fn present(&self) -> &wgpu::RenderPipeline {
        &self.present
    }
}
