//! Crate-level error types.

use std::fmt;

use crate::effect::EffectKind;
use crate::gpu::render_context::RenderContextError;

/// Errors produced by the spritefx crate.
#[derive(Debug)]
pub enum FxError {
    /// A required effect parameter was not supplied.
    Configuration {
        /// Effect being configured.
        kind: EffectKind,
        /// Name of the missing parameter.
        key: &'static str,
    },
    /// An effect parameter was supplied with the wrong shape or range.
    InvalidParameter {
        /// Effect being configured.
        kind: EffectKind,
        /// Name of the offending parameter.
        key: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// Authored data named an effect kind that does not exist.
    UnknownEffect(String),
    /// A handler was dispatched an effect of another kind.
    HandlerMismatch {
        /// Kind the handler serves.
        expected: EffectKind,
        /// Kind it was handed.
        found: EffectKind,
    },
    /// A pass was run before any program was bound.
    NoProgramBound,
    /// Two of the three buffers handed to an evaluation are the same.
    AliasedTargets,
    /// Pass dimensions must be non-zero.
    InvalidDimensions {
        /// Requested pass width.
        width: u32,
        /// Requested pass height.
        height: u32,
    },
    /// The render backend failed to record or submit an operation.
    RenderBackend(Box<dyn std::error::Error + Send + Sync>),
    /// WGSL composition failure.
    Shader(String),
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Windowing or event-loop failure in the viewer.
    Viewer(String),
}

impl FxError {
    /// Wrap a backend error, keeping it reachable through `source()`.
    pub fn backend<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RenderBackend(Box::new(e))
    }
}

impl fmt::Display for FxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { kind, key } => {
                write!(f, "configuration error: {kind} requires '{key}'")
            }
            Self::InvalidParameter { kind, key, reason } => {
                write!(f, "invalid {kind} parameter '{key}': {reason}")
            }
            Self::UnknownEffect(name) => {
                write!(f, "unknown effect kind '{name}'")
            }
            Self::HandlerMismatch { expected, found } => {
                write!(f, "{expected} handler dispatched a {found} effect")
            }
            Self::NoProgramBound => {
                write!(f, "pass issued with no shader program bound")
            }
            Self::AliasedTargets => {
                write!(f, "effect chain targets must be three distinct buffers")
            }
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid pass dimensions {width}x{height}")
            }
            Self::RenderBackend(e) => write!(f, "render backend error: {e}"),
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for FxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RenderBackend(e) => Some(e.as_ref()),
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for FxError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for FxError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn configuration_error_names_kind_and_key() {
        let err = FxError::Configuration {
            kind: EffectKind::Blur,
            key: "strength",
        };
        let msg = err.to_string();
        assert!(msg.contains("blur"));
        assert!(msg.contains("strength"));
    }

    #[test]
    fn backend_error_keeps_source() {
        let io = std::io::Error::other("device lost");
        let err = FxError::backend(io);
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "device lost");
    }
}
