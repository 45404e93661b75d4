//! Ping-pong render target roles.

use crate::error::FxError;
use crate::fx::backend::{BlendMode, BlendPass, DrawPass, FxBackend};
use crate::fx::slot::ShaderSlot;
use crate::fx::uniform::{Uniform, UniformSet};

/// The three buffer roles of one chain evaluation.
///
/// `source` always holds the latest result. The three handles are pairwise
/// distinct for the whole evaluation; only [`BufferRoles::ping_pong`]
/// reassigns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRoles<T> {
    /// Buffer the next pass reads.
    pub source: T,
    /// Buffer the next pass writes.
    pub target: T,
    /// Scratch buffer, untouched by plain passes.
    pub swap: T,
}

impl<T: Copy + Eq> BufferRoles<T> {
    /// Roles for a caller-supplied triple, in source/target/swap order.
    pub const fn new([source, target, swap]: [T; 3]) -> Self {
        Self {
            source,
            target,
            swap,
        }
    }

    /// Exchange `source` and `target`.
    pub fn ping_pong(&mut self) {
        std::mem::swap(&mut self.source, &mut self.target);
    }

    /// True when no two roles share a handle.
    pub fn is_distinct(&self) -> bool {
        self.source != self.target
            && self.source != self.swap
            && self.target != self.swap
    }
}

/// Drives passes over a borrowed backend while tracking buffer roles, the
/// bound program, and its uniform inputs.
pub struct RenderTargetCycler<'b, B: FxBackend> {
    backend: &'b mut B,
    roles: BufferRoles<B::Target>,
    program: Option<ShaderSlot>,
    uniforms: UniformSet,
    passes: usize,
}

impl<'b, B: FxBackend> RenderTargetCycler<'b, B> {
    /// Bind `source`, `target`, `swap` to the three supplied handles.
    pub fn initialize(backend: &'b mut B, targets: [B::Target; 3]) -> Self {
        Self {
            backend,
            roles: BufferRoles::new(targets),
            program: None,
            uniforms: UniformSet::new(),
            passes: 0,
        }
    }

    /// Current role assignment.
    pub const fn roles(&self) -> BufferRoles<B::Target> {
        self.roles
    }

    /// Draw passes issued so far.
    pub const fn passes(&self) -> usize {
        self.passes
    }

    /// Select the program for following passes and clear its inputs.
    pub fn bind_program(&mut self, program: ShaderSlot) {
        self.program = Some(program);
        self.uniforms.clear();
    }

    /// Bind one named input of the current program.
    pub fn set_uniform(&mut self, name: &'static str, value: impl Into<Uniform>) {
        self.uniforms.set(name, value);
    }

    /// Inputs of the current program.
    pub fn uniforms_mut(&mut self) -> &mut UniformSet {
        &mut self.uniforms
    }

    /// Draw `source` into `target` with the bound program, then swap the two
    /// roles so the buffer just written is read next.
    ///
    /// # Errors
    ///
    /// [`FxError::NoProgramBound`] before any [`Self::bind_program`], or the
    /// backend's draw failure.
    pub fn run_pass(&mut self) -> Result<(), FxError> {
        let program = self.program.ok_or(FxError::NoProgramBound)?;
        log::trace!(
            "{} pass {:?} -> {:?}",
            program.label(),
            self.roles.source,
            self.roles.target
        );
        self.backend
            .draw(&DrawPass {
                program,
                uniforms: &self.uniforms,
                source: self.roles.source,
                target: self.roles.target,
            })
            .map_err(FxError::backend)?;
        self.passes += 1;
        self.roles.ping_pong();
        Ok(())
    }

    /// Copy `source` contents into `swap`.
    ///
    /// # Errors
    ///
    /// The backend's copy failure.
    pub fn snapshot_source(&mut self) -> Result<(), FxError> {
        self.backend
            .copy(self.roles.source, self.roles.swap)
            .map_err(FxError::backend)
    }

    /// Copy `target` contents back into `source`.
    ///
    /// # Errors
    ///
    /// The backend's copy failure.
    pub fn restore_target(&mut self) -> Result<(), FxError> {
        self.backend
            .copy(self.roles.target, self.roles.source)
            .map_err(FxError::backend)
    }

    /// Blend `swap` (base) with `source` (overlay) into `target`.
    ///
    /// # Errors
    ///
    /// The backend's blend failure.
    pub fn blend_swap_with_source(
        &mut self,
        mode: BlendMode,
        strength: f32,
    ) -> Result<(), FxError> {
        self.backend
            .blend(&BlendPass {
                mode,
                base: self.roles.swap,
                overlay: self.roles.source,
                target: self.roles.target,
                strength,
            })
            .map_err(FxError::backend)
    }

    /// Present `source` and release the backend.
    ///
    /// # Errors
    ///
    /// The backend's present failure.
    pub fn present(self) -> Result<(BufferRoles<B::Target>, usize), FxError> {
        self.backend
            .present(self.roles.source)
            .map_err(FxError::backend)?;
        Ok((self.roles, self.passes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::trace::{TraceBackend, TraceOp};

    #[test]
    fn run_pass_swaps_source_and_target_only() {
        let mut backend = TraceBackend::new();
        let ids = backend.targets();
        let mut cycler = RenderTargetCycler::initialize(&mut backend, ids);
        cycler.bind_program(ShaderSlot::Vignette);

        cycler.run_pass().unwrap();
        let roles = cycler.roles();
        assert_eq!(roles.source, ids[1]);
        assert_eq!(roles.target, ids[0]);
        assert_eq!(roles.swap, ids[2]);
        assert!(roles.is_distinct());

        cycler.run_pass().unwrap();
        assert_eq!(cycler.roles(), BufferRoles::new(ids));
        assert_eq!(cycler.passes(), 2);
    }

    #[test]
    fn pass_without_program_is_rejected() {
        let mut backend = TraceBackend::new();
        let ids = backend.targets();
        let mut cycler = RenderTargetCycler::initialize(&mut backend, ids);
        assert!(matches!(cycler.run_pass(), Err(FxError::NoProgramBound)));
        assert!(backend.ops().is_empty());
    }

    #[test]
    fn binding_a_program_clears_inputs() {
        let mut backend = TraceBackend::new();
        let ids = backend.targets();
        let mut cycler = RenderTargetCycler::initialize(&mut backend, ids);
        cycler.bind_program(ShaderSlot::Pixelate);
        cycler.set_uniform("amount", 3.0_f32);
        cycler.bind_program(ShaderSlot::Vignette);
        assert!(cycler.uniforms_mut().is_empty());
    }

    #[test]
    fn present_hands_over_current_source() {
        let mut backend = TraceBackend::new();
        let ids = backend.targets();
        let mut cycler = RenderTargetCycler::initialize(&mut backend, ids);
        cycler.bind_program(ShaderSlot::Pixelate);
        cycler.run_pass().unwrap();
        let (roles, passes) = cycler.present().unwrap();
        assert_eq!(passes, 1);
        assert_eq!(backend.ops().last(), Some(&TraceOp::Present { output: roles.source }));
    }
}
