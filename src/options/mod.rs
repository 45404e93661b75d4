//! Viewer options with TOML preset support.
//!
//! A preset is one TOML file holding a `[display]` table and the effect
//! list as `[[fx.effects]]` tables, each with a `kind`, an optional
//! `active` flag, and the effect's parameters flattened alongside. Presets
//! ship in `assets/presets/`.

mod display;

use std::path::Path;

pub use display::{DisplayOptions, SpriteShape};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::effect::FxStack;
use crate::error::FxError;

/// Top-level options container. Sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only a `[display]` table) work.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Window and sprite settings.
    pub display: DisplayOptions,
    /// The effect list.
    pub fx: FxStack,
}

impl Options {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// [`FxError::OptionsParse`] for malformed TOML or effect parameters.
    pub fn from_toml(text: &str) -> Result<Self, FxError> {
        toml::from_str(text).map_err(|e| FxError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// [`FxError::Io`] if the file cannot be read, [`FxError::OptionsParse`]
    /// if it does not parse.
    pub fn load(path: &Path) -> Result<Self, FxError> {
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_toml(&content)?;
        log::info!(
            "loaded {} ({} effects)",
            path.display(),
            options.fx.len()
        );
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// [`FxError::OptionsParse`] if serialization fails, [`FxError::Io`] if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), FxError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FxError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
