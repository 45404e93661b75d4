use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Procedural image the viewer feeds into the chain.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SpriteShape {
    /// Filled disc with a soft edge.
    #[default]
    Disc,
    /// Five-pointed star.
    Star,
    /// Checkerboard covering the whole target.
    Checker,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Window and sprite settings.
pub struct DisplayOptions {
    /// Initial window width in pixels.
    #[schemars(title = "Window Width", range(min = 64, max = 8192))]
    pub width: u32,
    /// Initial window height in pixels.
    #[schemars(title = "Window Height", range(min = 64, max = 8192))]
    pub height: u32,
    /// Side length of the square offscreen targets.
    #[schemars(title = "Sprite Size", range(min = 8, max = 4096))]
    pub sprite_size: u32,
    /// Image fed into the chain.
    #[schemars(title = "Sprite Shape")]
    pub sprite: SpriteShape,
    /// Clear color behind the composited sprite.
    #[schemars(title = "Background")]
    pub background: [f32; 3],
    /// Multiplier applied to wall-clock time before it reaches the chain.
    #[schemars(title = "Time Scale", range(min = 0.0, max = 10.0))]
    pub time_scale: f32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            width: 960,
            height: 640,
            sprite_size: 256,
            sprite: SpriteShape::Disc,
            background: [0.08, 0.08, 0.1],
            time_scale: 1.0,
        }
    }
}

impl DisplayOptions {
    /// Background as a wgpu clear color.
    #[must_use]
    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.background.map(f64::from);
        wgpu::Color { r, g, b, a: 1.0 }
    }
}
