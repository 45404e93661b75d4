// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Multi-pass GPU effect chains for sprites, built on wgpu.
//!
//! An effect chain applies an ordered list of effects (glow, shadow,
//! pixelate, vignette, shine, blur, gradient, bloom) to one image. Each
//! effect runs one or more fullscreen shader passes, ping-ponging between
//! three same-sized render targets so that every pass reads the previous
//! result and the next effect sees the output of the last.
//!
//! # Key entry points
//!
//! - [`effect`] - effect kinds, their parameters and the [`effect::FxStack`]
//!   list of toggleable entries
//! - [`fx::EffectChain`] - evaluates a list of entries against any
//!   [`fx::FxBackend`]
//! - [`renderer::FxRenderer`] - the wgpu backend, programs and uniform ring
//! - [`options::Options`] - TOML presets (display settings plus an effect
//!   list)
//!
//! # Architecture
//!
//! Chain evaluation is backend-agnostic: handlers drive a
//! [`fx::RenderTargetCycler`] that tracks which target is the source, the
//! target and the swap, and issues draw/copy/blend operations. The
//! [`fx::TraceBackend`] records those operations symbolically for tests and
//! planning; [`renderer::FxFrame`] records them for replay into a wgpu
//! command encoder.

pub mod effect;
pub mod error;
pub mod fx;
pub mod gpu;
pub mod options;
pub mod renderer;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use effect::{Effect, EffectKind, FxEntry, FxStack};
pub use error::FxError;
pub use fx::{EffectChain, FrameInfo};
pub use options::Options;
pub use renderer::FxRenderer;
