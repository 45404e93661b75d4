//! Standalone preview window backed by winit.
//!
//! Feeds a procedural sprite through the effect list of an options file and
//! composites the result in the middle of the window.
//!
//! ```no_run
//! # use spritefx::viewer::Viewer;
//! Viewer::builder()
//!     .with_path("assets/presets/dreamy.toml")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```
//!
//! Keys: `1`-`9` toggle the matching effect, `R` reloads the file, `Space`
//! pauses the clock, `Backspace` rewinds it, `Escape` quits.

use std::{
    f32::consts::TAU,
    path::{Path, PathBuf},
    sync::Arc,
};

use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    error::FxError,
    gpu::{render_context::RenderContext, texture::RenderTargetSet},
    options::{Options, SpriteShape},
    renderer::{FrameOutput, FxRenderer, Viewport},
    util::frame_timing::FrameTiming,
};

/// Format of the offscreen targets.
const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    path: Option<PathBuf>,
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            path: None,
            options: None,
            title: "spritefx".into(),
        }
    }

    /// Options file to load (and reload with `R`).
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Start from these options instead of loading a file.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            path: self.path,
            options: self.options,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A window previewing an effect list on a procedural sprite.
pub struct Viewer {
    path: Option<PathBuf>,
    options: Option<Options>,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// [`FxError::Io`] or [`FxError::OptionsParse`] if the initial options
    /// file cannot be loaded, [`FxError::Viewer`] if the event loop fails.
    pub fn run(self) -> Result<(), FxError> {
        let options = match (self.options, &self.path) {
            (Some(options), _) => options,
            (None, Some(path)) => Options::load(path)?,
            (None, None) => Options::default(),
        };

        let event_loop =
            EventLoop::new().map_err(|e| FxError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            gpu: None,
            timing: FrameTiming::new(0)
                .with_time_scale(options.display.time_scale),
            sprite: sprite_pixels(
                options.display.sprite,
                options.display.sprite_size,
            ),
            options,
            path: self.path,
            title: self.title,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| FxError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// GPU state created once the window exists.
struct GpuState {
    context: RenderContext,
    targets: RenderTargetSet,
    renderer: FxRenderer,
}

struct ViewerApp {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    timing: FrameTiming,
    options: Options,
    /// Premultiplied RGBA8 pixels uploaded into the input target each frame.
    sprite: Vec<u8>,
    path: Option<PathBuf>,
    title: String,
}

impl ViewerApp {
    fn init_gpu(&self, window: Arc<Window>) -> Result<GpuState, FxError> {
        let inner = window.inner_size();
        let context = pollster::block_on(RenderContext::new(
            window,
            (inner.width.max(1), inner.height.max(1)),
        ))?;
        let size = self.options.display.sprite_size;
        let targets =
            RenderTargetSet::new(&context.device, size, size, TARGET_FORMAT);
        let renderer = FxRenderer::new(&context, TARGET_FORMAT)?;
        Ok(GpuState {
            context,
            targets,
            renderer,
        })
    }

    fn reload(&mut self) {
        let Some(path) = self.path.clone() else {
            log::info!("no options file to reload");
            return;
        };
        match Options::load(&path) {
            Ok(options) => self.apply_options(options),
            Err(e) => log::error!("reload of {} failed: {e}", path.display()),
        }
    }

    fn apply_options(&mut self, options: Options) {
        let display = &options.display;
        self.timing = FrameTiming::new(0).with_time_scale(display.time_scale);
        self.sprite = sprite_pixels(display.sprite, display.sprite_size);
        if let Some(gpu) = &mut self.gpu {
            gpu.targets.resize(
                &gpu.context.device,
                display.sprite_size,
                display.sprite_size,
            );
        }
        self.options = options;
    }

    fn toggle_effect(&mut self, index: usize) {
        match self.options.fx.toggle(index) {
            Some(active) => {
                let kind = self.options.fx.entries()[index].effect.kind();
                log::info!(
                    "{kind} #{} {}",
                    index + 1,
                    if active { "on" } else { "off" }
                );
            }
            None => log::debug!("no effect at slot {}", index + 1),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        if let Some(index) = digit_index(code) {
            self.toggle_effect(index);
            return;
        }
        match code {
            KeyCode::KeyR => self.reload(),
            KeyCode::Space => {
                let paused = self.timing.toggle_pause();
                log::info!("clock {}", if paused { "paused" } else { "running" });
            }
            KeyCode::Backspace => self.timing.reset_clock(),
            KeyCode::Escape => event_loop.exit(),
            _ => {}
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let frame = match gpu.context.get_next_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                if let Some(w) = &self.window {
                    let inner = w.inner_size();
                    gpu.context.resize(inner.width, inner.height);
                }
                return;
            }
            Err(e) => {
                log::error!("surface error: {e:?}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let _ = gpu
            .targets
            .input()
            .write_pixels(&gpu.context.queue, &self.sprite);

        gpu.renderer.begin_frame();
        let mut encoder = gpu.context.create_encoder();
        clear(&mut encoder, &view, self.options.display.clear_color());

        let output = FrameOutput {
            view: &view,
            viewport: Some(centered(
                gpu.context.size(),
                (gpu.targets.width(), gpu.targets.height()),
            )),
        };
        match gpu.renderer.render(
            &gpu.context,
            &mut encoder,
            &gpu.targets,
            self.options.fx.entries(),
            self.timing.time(),
            &output,
        ) {
            Ok(result) => log::trace!(
                "{} passes, output in {:?}",
                result.passes,
                result.output
            ),
            Err(e) => log::error!("effect chain failed: {e}"),
        }

        gpu.context.submit(encoder);
        frame.present();
        self.timing.end_frame();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let display = &self.options.display;
        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                display.width,
                display.height,
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match self.init_gpu(window.clone()) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                log::error!("Failed to initialize GPU: {e}");
                event_loop.exit();
                return;
            }
        }

        log::info!(
            "{} effects loaded; keys 1-9 toggle, R reloads",
            self.options.fx.len()
        );
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.context.resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.handle_key(event_loop, code);
                }
            }

            _ => (),
        }
    }
}

fn clear(
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    color: wgpu::Color,
) {
    let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Viewer Clear"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            depth_slice: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(color),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
}

fn digit_index(code: KeyCode) -> Option<usize> {
    const DIGITS: [KeyCode; 9] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];
    DIGITS.iter().position(|&d| d == code)
}

/// Viewport of `sprite` size centered in `surface`, never larger than it.
fn centered(surface: (u32, u32), sprite: (u32, u32)) -> Viewport {
    let width = sprite.0.min(surface.0) as f32;
    let height = sprite.1.min(surface.1) as f32;
    Viewport {
        x: ((surface.0 as f32 - width) * 0.5).floor(),
        y: ((surface.1 as f32 - height) * 0.5).floor(),
        width,
        height,
    }
}

/// Rasterize `shape` into `size` x `size` premultiplied RGBA8 pixels.
fn sprite_pixels(shape: SpriteShape, size: u32) -> Vec<u8> {
    let n = size as usize;
    let mut pixels = Vec::with_capacity(n * n * 4);
    let half = size as f32 * 0.5;
    for y in 0..size {
        for x in 0..size {
            let px = (x as f32 + 0.5 - half) / half;
            let py = (y as f32 + 0.5 - half) / half;
            let (rgb, alpha) = shade(shape, px, py, x, y, size);
            pixels.extend(rgb.map(|c| (c * alpha * 255.0).round() as u8));
            pixels.push((alpha * 255.0).round() as u8);
        }
    }
    pixels
}

/// Straight color and coverage of one pixel; `px`, `py` in -1..1.
fn shade(
    shape: SpriteShape,
    px: f32,
    py: f32,
    x: u32,
    y: u32,
    size: u32,
) -> ([f32; 3], f32) {
    let d = px.hypot(py);
    match shape {
        SpriteShape::Disc => {
            let feather = 4.0 / size as f32;
            let alpha = ((0.6 - d) / feather).clamp(0.0, 1.0);
            ([1.0, 0.55 + 0.3 * py.max(0.0), 0.2], alpha)
        }
        SpriteShape::Star => {
            let angle = py.atan2(px) + TAU * 0.25;
            let t = (angle * 5.0 / TAU).rem_euclid(1.0);
            let spike = (t - 0.5).abs() * 2.0;
            let edge = 0.28 + 0.34 * spike;
            let alpha = if d <= edge { 1.0 } else { 0.0 };
            ([1.0, 0.85, 0.25], alpha)
        }
        SpriteShape::Checker => {
            let cell = (size / 8).max(1);
            let rgb = if (x / cell + y / cell) % 2 == 0 {
                [0.9, 0.9, 0.95]
            } else {
                [0.25, 0.3, 0.45]
            };
            (rgb, 1.0)
        }
    }
}

/// Options file to open when none is given.
#[must_use]
pub fn default_preset() -> &'static Path {
    Path::new("assets/presets/dreamy.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(pixels: &[u8], size: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * size + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    #[test]
    fn sprite_is_premultiplied() {
        let size = 64;
        let pixels = sprite_pixels(SpriteShape::Disc, size);
        assert_eq!(pixels.len(), (size * size * 4) as usize);

        assert_eq!(pixel(&pixels, size, 0, 0), [0, 0, 0, 0]);
        let center = pixel(&pixels, size, 32, 32);
        assert_eq!(center[3], 255);
        for chunk in pixels.chunks_exact(4) {
            assert!(chunk[..3].iter().all(|&c| c <= chunk[3]), "{chunk:?}");
        }
    }

    #[test]
    fn star_has_transparent_notches() {
        let size = 128;
        let pixels = sprite_pixels(SpriteShape::Star, size);
        assert_eq!(pixel(&pixels, size, 64, 64)[3], 255);
        assert_eq!(pixel(&pixels, size, 2, 2)[3], 0);
    }

    #[test]
    fn checker_is_opaque() {
        let pixels = sprite_pixels(SpriteShape::Checker, 16);
        assert!(pixels.chunks_exact(4).all(|p| p[3] == 255));
        assert_ne!(pixel(&pixels, 16, 0, 0), pixel(&pixels, 16, 2, 0));
    }

    #[test]
    fn viewport_is_centered_and_clamped() {
        let vp = centered((800, 600), (256, 256));
        assert_eq!((vp.x, vp.y, vp.width, vp.height), (272.0, 172.0, 256.0, 256.0));

        let small = centered((100, 300), (256, 256));
        assert_eq!((small.x, small.width), (0.0, 100.0));
        assert_eq!(small.y, 22.0);
    }

    #[test]
    fn digit_keys_map_to_slots() {
        assert_eq!(digit_index(KeyCode::Digit1), Some(0));
        assert_eq!(digit_index(KeyCode::Digit9), Some(8));
        assert_eq!(digit_index(KeyCode::KeyQ), None);
    }
}
