use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Effect, EffectKind, FxEntry};

/// The ordered effect list of one visual instance.
///
/// Effects run in list order; each consumes the previous effect's output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FxStack {
    /// Entries in evaluation order.
    pub effects: Vec<FxEntry>,
}

impl FxStack {
    /// Empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an active effect and return its index.
    pub fn push(&mut self, effect: impl Into<Effect>) -> usize {
        self.effects.push(FxEntry::new(effect));
        self.effects.len() - 1
    }

    /// Remove and return the entry at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<FxEntry> {
        (index < self.effects.len()).then(|| self.effects.remove(index))
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Set the active flag of the entry at `index`. Returns `false` when the
    /// index is out of range.
    pub fn set_active(&mut self, index: usize, active: bool) -> bool {
        let Some(entry) = self.effects.get_mut(index) else {
            return false;
        };
        entry.active = active;
        true
    }

    /// Flip the active flag of the entry at `index` and return the new value.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        self.effects.get_mut(index).map(|entry| {
            entry.active = !entry.active;
            entry.active
        })
    }

    /// Entries in evaluation order.
    #[must_use]
    pub fn entries(&self) -> &[FxEntry] {
        &self.effects
    }

    /// Number of entries, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// True when the stack has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Number of entries that will run.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.effects.iter().filter(|e| e.active).count()
    }

    /// Index of the first entry of `kind`.
    #[must_use]
    pub fn position(&self, kind: EffectKind) -> Option<usize> {
        self.effects.iter().position(|e| e.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{BloomParams, PixelateParams, VignetteParams};
    use super::*;

    #[test]
    fn push_toggle_and_remove() {
        let mut stack = FxStack::new();
        let a = stack.push(PixelateParams { amount: 4.0 });
        let b = stack.push(VignetteParams::default());
        assert_eq!((a, b), (0, 1));
        assert_eq!(stack.active_count(), 2);

        assert_eq!(stack.toggle(0), Some(false));
        assert_eq!(stack.active_count(), 1);
        assert_eq!(stack.toggle(9), None);

        let removed = stack.remove(0).unwrap();
        assert_eq!(removed.kind(), EffectKind::Pixelate);
        assert_eq!(stack.position(EffectKind::Vignette), Some(0));
        assert!(stack.remove(5).is_none());
    }

    #[test]
    fn set_active_reports_range() {
        let mut stack = FxStack::new();
        let _ = stack.push(BloomParams::default());
        assert!(stack.set_active(0, false));
        assert!(!stack.set_active(1, false));
        assert!(!stack.effects[0].active);
    }

    #[test]
    fn stack_reads_from_toml_tables() {
        let stack: FxStack = toml::from_str(
            r#"
[[effects]]
kind = "pixelate"
size = 8

[[effects]]
kind = "blur"
active = false
quality = "low"
x = 0.01
y = 0.01
steps = 2
strength = 1.0
color = [1.0, 1.0, 1.0]
"#,
        )
        .unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.effects[0].kind(), EffectKind::Pixelate);
        assert!(!stack.effects[1].active);
    }

    #[test]
    fn missing_required_key_fails_the_whole_stack() {
        let result: Result<FxStack, _> = toml::from_str(
            r#"
[[effects]]
kind = "vignette"
radius = 0.4
"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("strength"), "{err}");
    }
}
