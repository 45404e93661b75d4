//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, the three offscreen targets
//! a chain ping-pongs between, the per-pass uniform ring, and shader
//! composition.

/// Shared wgpu boilerplate for the full-screen effect pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Offscreen render targets.
pub mod texture;
/// Dynamic-offset uniform buffer for per-pass parameters.
pub mod uniform_ring;
