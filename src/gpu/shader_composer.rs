use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, ComposerError, NagaModuleDescriptor,
    ShaderLanguage, ShaderType,
};

use crate::error::FxError;

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Shared modules are registered at construction; effect programs pull them
/// in with `#import spritefx::fullscreen::...`. Composition yields
/// `naga::Module` IR directly so nothing re-parses WGSL at pipeline creation.
pub struct ShaderComposer {
    composer: Composer,
}

/// A shader source and the path it is reported under.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSource {
    /// WGSL text, possibly with `#import` directives.
    pub source: &'static str,
    /// Path used in diagnostics.
    pub file_path: &'static str,
}

macro_rules! shader {
    ($path:literal) => {
        ShaderSource {
            source: include_str!(concat!("../../assets/shaders/", $path)),
            file_path: $path,
        }
    };
}

/// Shared modules, in dependency order.
const MODULES: &[ShaderSource] = &[shader!("modules/fullscreen.wgsl")];

/// Effect programs, in [`ShaderSlot`](crate::fx::ShaderSlot) order.
pub const EFFECT_SHADERS: [ShaderSource; crate::fx::ShaderSlot::COUNT] = [
    shader!("fx/glow.wgsl"),
    shader!("fx/shadow.wgsl"),
    shader!("fx/pixelate.wgsl"),
    shader!("fx/vignette.wgsl"),
    shader!("fx/shine.wgsl"),
    shader!("fx/blur_low.wgsl"),
    shader!("fx/blur_med.wgsl"),
    shader!("fx/blur_high.wgsl"),
    shader!("fx/gradient.wgsl"),
    shader!("fx/bloom.wgsl"),
];

/// Linear blend-composite.
pub const BLEND_LINEAR_SHADER: ShaderSource = shader!("util/blend_linear.wgsl");
/// Additive blend-composite.
pub const BLEND_ADDITIVE_SHADER: ShaderSource = shader!("util/blend_additive.wgsl");
/// Final composite onto the output view.
pub const PRESENT_SHADER: ShaderSource = shader!("util/present.wgsl");

fn shader_error(file_path: &str, e: &ComposerError) -> FxError {
    FxError::Shader(format!("{file_path}: {e}"))
}

impl ShaderComposer {
    /// Composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// [`FxError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, FxError> {
        let mut composer = Composer::default();
        for m in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| shader_error(m.file_path, &e))?;
        }
        Ok(Self { composer })
    }

    /// Compose `shader` into a `wgpu::ShaderModule`.
    ///
    /// # Errors
    ///
    /// [`FxError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        shader: ShaderSource,
    ) -> Result<wgpu::ShaderModule, FxError> {
        let module = self.compose_naga(shader)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(module)),
        }))
    }

    /// Compose `shader` into naga IR without a device.
    ///
    /// # Errors
    ///
    /// [`FxError::Shader`] if composition fails.
    pub fn compose_naga(&mut self, shader: ShaderSource) -> Result<naga::Module, FxError> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source: shader.source,
                file_path: shader.file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| shader_error(shader.file_path, &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::ShaderSlot;

    fn all_shader_sources() -> Vec<ShaderSource> {
        let mut all = EFFECT_SHADERS.to_vec();
        all.extend([BLEND_LINEAR_SHADER, BLEND_ADDITIVE_SHADER, PRESENT_SHADER]);
        all
    }

    #[test]
    fn test_all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in all_shader_sources() {
            if let Err(e) = composer.compose_naga(shader) {
                panic!("{e}");
            }
        }
    }

    #[test]
    fn effect_shaders_follow_slot_order() {
        for slot in ShaderSlot::ALL {
            let path = EFFECT_SHADERS[slot.index()].file_path;
            let stem = path.trim_start_matches("fx/").trim_end_matches(".wgsl");
            let label = slot.label().to_lowercase().replace("fx ", "").replace(' ', "_");
            let label = label.replace("medium", "med");
            assert_eq!(stem, label, "{slot:?}");
        }
    }

    /// Every effect program's `Params` struct must declare the same fields,
    /// in the same order, as the slot's uniform layout.
    #[test]
    fn params_structs_match_uniform_layouts() {
        let mut composer = ShaderComposer::new().unwrap();
        for slot in ShaderSlot::ALL {
            let module = composer.compose_naga(EFFECT_SHADERS[slot.index()]).unwrap();
            let params = module
                .types
                .iter()
                .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
                    (Some(name), naga::TypeInner::Struct { members, span })
                        if name.starts_with("Params") =>
                    {
                        Some((members.clone(), *span))
                    }
                    _ => None,
                })
                .unwrap_or_else(|| panic!("{slot:?} has no Params struct"));
            let (members, span) = params;

            let expected: Vec<_> = slot.layout().offsets().collect();
            assert_eq!(members.len(), expected.len(), "{slot:?}");
            for (member, (name, _, offset)) in members.iter().zip(&expected) {
                assert_eq!(member.name.as_deref(), Some(*name), "{slot:?}");
                assert_eq!(member.offset as usize, *offset, "{slot:?}.{name}");
            }
            assert!(span as usize <= slot.layout().size(), "{slot:?}");
        }
    }

    #[test]
    fn shadow_program_composes() {
        let mut composer = ShaderComposer::new().unwrap();
        let shadow = EFFECT_SHADERS[ShaderSlot::Shadow.index()];
        assert!(composer.compose_naga(shadow).is_ok());
    }

    /// Source text of the WGSL function `name`, from its signature up to the
    /// next top-level item.
    fn function_body<'s>(source: &'s str, name: &str) -> &'s str {
        let start = source
            .find(&format!("fn {name}("))
            .unwrap_or_else(|| panic!("no fn {name}"));
        let rest = &source[start..];
        let end = rest.find("\n}").map_or(rest.len(), |i| i + 2);
        &rest[..end]
    }

    #[test]
    fn blur_strength_only_widens_taps() {
        for slot in [ShaderSlot::BlurLow, ShaderSlot::BlurMedium, ShaderSlot::BlurHigh] {
            let source = EFFECT_SHADERS[slot.index()].source;
            let tap = function_body(source, "tap");
            let fragment = function_body(source, "fs_main");
            assert!(
                tap.contains("params.offset * params.strength"),
                "{slot:?}: {tap}"
            );
            assert!(!fragment.contains("params.strength"), "{slot:?}: {fragment}");
        }
    }
}
