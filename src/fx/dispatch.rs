//! Effect kind to handler table.

use crate::effect::{Effect, EffectKind};
use crate::error::FxError;
use crate::fx::backend::FxBackend;
use crate::fx::chain::FrameInfo;
use crate::fx::cycler::RenderTargetCycler;
use crate::fx::handlers;

/// Issues the passes of one effect.
pub type Handler<B> =
    fn(&mut RenderTargetCycler<'_, B>, &Effect, &FrameInfo) -> Result<(), FxError>;

macro_rules! handler {
    ($name:ident, $variant:ident, $run:path) => {
        fn $name<B: FxBackend>(
            cycler: &mut RenderTargetCycler<'_, B>,
            effect: &Effect,
            frame: &FrameInfo,
        ) -> Result<(), FxError> {
            let Effect::$variant(params) = effect else {
                return Err(FxError::HandlerMismatch {
                    expected: EffectKind::$variant,
                    found: effect.kind(),
                });
            };
            $run(cycler, params, frame)
        }
    };
}

handler!(glow, Glow, handlers::single_pass);
handler!(shadow, Shadow, handlers::single_pass);
handler!(pixelate, Pixelate, handlers::single_pass);
handler!(vignette, Vignette, handlers::single_pass);
handler!(shine, Shine, handlers::single_pass);
handler!(blur, Blur, handlers::blur);
handler!(gradient, Gradient, handlers::single_pass);
handler!(bloom, Bloom, handlers::bloom);

/// Total mapping from [`EffectKind`] to its handler, indexed by the kind's
/// numeric value.
pub struct DispatchTable<B: FxBackend> {
    handlers: [Handler<B>; EffectKind::COUNT],
}

impl<B: FxBackend> DispatchTable<B> {
    /// The table, in `EffectKind` order.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: [
                glow::<B>,
                shadow::<B>,
                pixelate::<B>,
                vignette::<B>,
                shine::<B>,
                blur::<B>,
                gradient::<B>,
                bloom::<B>,
            ],
        }
    }

    /// Handler registered for `kind`.
    #[must_use]
    pub const fn handler(&self, kind: EffectKind) -> Handler<B> {
        self.handlers[kind.index()]
    }

    /// Run the handler for `effect`'s kind.
    ///
    /// # Errors
    ///
    /// Whatever the handler reports.
    pub fn dispatch(
        &self,
        cycler: &mut RenderTargetCycler<'_, B>,
        effect: &Effect,
        frame: &FrameInfo,
    ) -> Result<(), FxError> {
        log::debug!("dispatch {}", effect.kind());
        self.handler(effect.kind())(cycler, effect, frame)
    }
}

impl<B: FxBackend> Default for DispatchTable<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::slot::ShaderSlot;
    use crate::fx::trace::TraceBackend;

    const FRAME: FrameInfo = FrameInfo {
        width: 8,
        height: 8,
        time: 0.0,
    };

    #[test]
    fn every_kind_dispatches_to_its_own_program() {
        let table = DispatchTable::<TraceBackend>::new();
        for kind in EffectKind::ALL {
            let mut effect = Effect::with_defaults(kind);
            // Give the multi-pass kinds something to draw.
            match &mut effect {
                Effect::Blur(p) => p.steps = 1,
                Effect::Bloom(p) => p.steps = 1,
                _ => {}
            }
            let mut backend = TraceBackend::new();
            let ids = backend.targets();
            let mut cycler = RenderTargetCycler::initialize(&mut backend, ids);
            table.dispatch(&mut cycler, &effect, &FRAME).unwrap();
            let programs = backend.drawn_programs();
            assert!(!programs.is_empty(), "{kind} drew nothing");
            assert!(
                programs.iter().all(|&p| p == ShaderSlot::for_kind(kind)),
                "{kind} drew {programs:?}"
            );
        }
    }

    #[test]
    fn mismatched_variant_is_reported() {
        let table = DispatchTable::<TraceBackend>::new();
        let mut backend = TraceBackend::new();
        let ids = backend.targets();
        let mut cycler = RenderTargetCycler::initialize(&mut backend, ids);
        let handler = table.handler(EffectKind::Glow);
        let err = handler(
            &mut cycler,
            &Effect::with_defaults(EffectKind::Vignette),
            &FRAME,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FxError::HandlerMismatch {
                expected: EffectKind::Glow,
                found: EffectKind::Vignette,
            }
        ));
        assert_eq!(cycler.passes(), 0);
    }
}
