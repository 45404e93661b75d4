//! The effect-chain core.
//!
//! An [`EffectChain`] walks an ordered list of [`FxEntry`](crate::effect::FxEntry)
//! values and, for every active one, dispatches to a handler that selects a
//! [`ShaderSlot`], binds uniforms and issues full-screen passes through a
//! [`RenderTargetCycler`]. The cycler threads pixel data through three
//! caller-supplied buffers by ping-ponging `source` and `target` after each
//! pass; `swap` is scratch space used by bloom.
//!
//! Nothing here touches a GPU API directly. Every primitive operation goes
//! through the [`FxBackend`] trait: the wgpu implementation lives in
//! [`crate::renderer`], and [`TraceBackend`] records operations for dry runs
//! and tests.

pub mod backend;
pub mod chain;
pub mod cycler;
pub mod dispatch;
mod handlers;
pub mod slot;
pub mod trace;
pub mod uniform;

pub use backend::{BlendMode, BlendPass, DrawPass, FxBackend};
pub use chain::{ChainOutput, EffectChain, FrameInfo};
pub use cycler::{BufferRoles, RenderTargetCycler};
pub use dispatch::DispatchTable;
pub use slot::{ShaderSlot, BLUR_BASE};
pub use trace::{TraceBackend, TraceOp, TraceTarget};
pub use uniform::{Uniform, UniformKind, UniformLayout, UniformSet};
