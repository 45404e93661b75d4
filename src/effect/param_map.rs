//! Untyped effect parameters and their conversion into typed structs.

use std::collections::BTreeMap;

use glam::Vec3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{BlurQuality, EffectKind};
use crate::error::FxError;

/// Parameter name → value, as authored in presets.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// A single authored parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ParamValue {
    /// Flag.
    Bool(bool),
    /// Number (integers are stored as floats).
    Scalar(f64),
    /// Fixed-length vector, e.g. an RGB color.
    Vector(Vec<f64>),
    /// Symbolic value, e.g. a blur quality name.
    Text(String),
}

impl ParamValue {
    fn describe(&self) -> &'static str {
        match self {
            Self::Bool(_) => "a boolean",
            Self::Scalar(_) => "a number",
            Self::Vector(_) => "a vector",
            Self::Text(_) => "a string",
        }
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        Self::Scalar(f64::from(v))
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Scalar(f64::from(v))
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec3> for ParamValue {
    fn from(v: Vec3) -> Self {
        Self::Vector(v.to_array().iter().map(|&c| f64::from(c)).collect())
    }
}

fn default_active() -> bool {
    true
}

/// Serialized form of an effect entry: kind tag, active flag, and the
/// flattened parameter map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawEffect {
    /// Effect kind.
    pub kind: EffectKind,
    /// Whether the effect runs. Defaults to `true`.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Remaining keys are effect parameters.
    #[serde(flatten)]
    pub params: ParamMap,
}

/// Reads typed values out of a [`ParamMap`] on behalf of one effect kind,
/// remembering which keys were consumed.
pub(crate) struct ParamReader<'a> {
    kind: EffectKind,
    params: &'a ParamMap,
    used: Vec<&'static str>,
}

impl<'a> ParamReader<'a> {
    pub(crate) fn new(kind: EffectKind, params: &'a ParamMap) -> Self {
        Self {
            kind,
            params,
            used: Vec::new(),
        }
    }

    fn lookup(&mut self, key: &'static str) -> Option<&'a ParamValue> {
        self.used.push(key);
        self.params.get(key)
    }

    fn missing(&self, key: &'static str) -> FxError {
        FxError::Configuration {
            kind: self.kind,
            key,
        }
    }

    fn invalid(&self, key: &'static str, reason: String) -> FxError {
        FxError::InvalidParameter {
            kind: self.kind,
            key,
            reason,
        }
    }

    fn to_f32(&self, key: &'static str, value: &ParamValue) -> Result<f32, FxError> {
        match value {
            ParamValue::Scalar(v) if v.is_finite() => Ok(*v as f32),
            ParamValue::Scalar(v) => {
                Err(self.invalid(key, format!("expected a finite number, got {v}")))
            }
            other => Err(self.invalid(
                key,
                format!("expected a number, got {}", other.describe()),
            )),
        }
    }

    fn to_u32(&self, key: &'static str, value: &ParamValue) -> Result<u32, FxError> {
        match value {
            ParamValue::Scalar(v)
                if *v >= 0.0 && v.fract() == 0.0 && *v <= f64::from(u32::MAX) =>
            {
                Ok(*v as u32)
            }
            ParamValue::Scalar(v) => Err(self.invalid(
                key,
                format!("expected a non-negative integer, got {v}"),
            )),
            other => Err(self.invalid(
                key,
                format!("expected an integer, got {}", other.describe()),
            )),
        }
    }

    fn to_bool(&self, key: &'static str, value: &ParamValue) -> Result<bool, FxError> {
        match value {
            ParamValue::Bool(b) => Ok(*b),
            ParamValue::Scalar(v) => Ok(*v != 0.0),
            other => Err(self.invalid(
                key,
                format!("expected a boolean, got {}", other.describe()),
            )),
        }
    }

    fn to_color(&self, key: &'static str, value: &ParamValue) -> Result<Vec3, FxError> {
        match value {
            ParamValue::Vector(c) if c.len() == 3 => {
                Ok(Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32))
            }
            ParamValue::Vector(c) => Err(self.invalid(
                key,
                format!("expected 3 color components, got {}", c.len()),
            )),
            ParamValue::Scalar(v)
                if *v >= 0.0 && v.fract() == 0.0 && *v <= f64::from(0x00FF_FFFF) =>
            {
                Ok(unpack_rgb(*v as u32))
            }
            ParamValue::Scalar(v) => Err(self.invalid(
                key,
                format!("expected a packed 0xRRGGBB color, got {v}"),
            )),
            other => Err(self.invalid(
                key,
                format!("expected a color, got {}", other.describe()),
            )),
        }
    }

    fn to_quality(
        &self,
        key: &'static str,
        value: &ParamValue,
    ) -> Result<BlurQuality, FxError> {
        let quality = match value {
            ParamValue::Text(name) => BlurQuality::from_name(name),
            ParamValue::Scalar(_) => {
                BlurQuality::from_level(self.to_u32(key, value)?)
            }
            _ => None,
        };
        quality.ok_or_else(|| {
            self.invalid(key, "expected low, medium, high or 0..=2".to_owned())
        })
    }

    /// Required number.
    pub(crate) fn f32(&mut self, key: &'static str) -> Result<f32, FxError> {
        let value = self.lookup(key).ok_or_else(|| self.missing(key))?;
        self.to_f32(key, value)
    }

    /// Required number that may also be spelled `alias`.
    pub(crate) fn f32_alias(
        &mut self,
        key: &'static str,
        alias: &'static str,
    ) -> Result<f32, FxError> {
        match (self.lookup(key), self.lookup(alias)) {
            (Some(value), _) => self.to_f32(key, value),
            (None, Some(value)) => self.to_f32(alias, value),
            (None, None) => Err(self.missing(key)),
        }
    }

    /// Optional number.
    pub(crate) fn f32_or(
        &mut self,
        key: &'static str,
        default: f32,
    ) -> Result<f32, FxError> {
        self.lookup(key)
            .map_or(Ok(default), |value| self.to_f32(key, value))
    }

    /// Optional non-negative integer.
    pub(crate) fn u32_or(
        &mut self,
        key: &'static str,
        default: u32,
    ) -> Result<u32, FxError> {
        self.lookup(key)
            .map_or(Ok(default), |value| self.to_u32(key, value))
    }

    /// Optional flag.
    pub(crate) fn bool_or(
        &mut self,
        key: &'static str,
        default: bool,
    ) -> Result<bool, FxError> {
        self.lookup(key)
            .map_or(Ok(default), |value| self.to_bool(key, value))
    }

    /// Required color.
    pub(crate) fn color(&mut self, key: &'static str) -> Result<Vec3, FxError> {
        let value = self.lookup(key).ok_or_else(|| self.missing(key))?;
        self.to_color(key, value)
    }

    /// Optional color.
    pub(crate) fn color_or(
        &mut self,
        key: &'static str,
        default: Vec3,
    ) -> Result<Vec3, FxError> {
        self.lookup(key)
            .map_or(Ok(default), |value| self.to_color(key, value))
    }

    /// Required blur quality.
    pub(crate) fn quality(
        &mut self,
        key: &'static str,
    ) -> Result<BlurQuality, FxError> {
        let value = self.lookup(key).ok_or_else(|| self.missing(key))?;
        self.to_quality(key, value)
    }

    /// Log keys nobody asked for; they are most likely typos.
    pub(crate) fn warn_unused(&self) {
        for key in self.params.keys() {
            if !self.used.contains(&key.as_str()) {
                log::warn!("ignoring unknown {} parameter '{key}'", self.kind);
            }
        }
    }
}

/// Split a packed `0xRRGGBB` value into normalized components.
fn unpack_rgb(packed: u32) -> Vec3 {
    let r = (packed >> 16) & 0xFF;
    let g = (packed >> 8) & 0xFF;
    let b = packed & 0xFF;
    Vec3::new(r as f32, g as f32, b as f32) / 255.0
}
