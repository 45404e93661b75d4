//! Frame pacing and the animation clock.

use web_time::{Duration, Instant};

/// Frame pacing plus the animation clock fed to the effect chain.
pub struct FrameTiming {
    /// Target FPS (0 = unlimited)
    target_fps: u32,
    /// Minimum frame duration based on target FPS
    min_frame_duration: Duration,
    /// Last frame timestamp
    last_frame: Instant,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
    /// Animation time in seconds; only advances while running.
    clock: f32,
    /// Multiplier on wall-clock deltas.
    time_scale: f32,
    paused: bool,
}

impl FrameTiming {
    /// Create a frame timer with the given FPS target (0 = unlimited).
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let min_frame_duration = if target_fps > 0 {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        } else {
            Duration::ZERO
        };

        Self {
            target_fps,
            min_frame_duration,
            last_frame: Instant::now(),
            smoothed_fps: 60.0,
            smoothing: 0.05,
            clock: 0.0,
            time_scale: 1.0,
            paused: false,
        }
    }

    /// Same timer with the animation clock running at `scale` x real time.
    #[must_use]
    pub const fn with_time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale;
        self
    }

    /// True once enough time has passed since the last frame to render.
    #[must_use]
    pub fn should_render(&self) -> bool {
        if self.target_fps == 0 {
            return true;
        }
        self.last_frame.elapsed() >= self.min_frame_duration
    }

    /// Call after rendering to update timing and advance the clock.
    pub fn end_frame(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(elapsed.as_secs_f32());
    }

    /// Account for a frame that took `frame_time` seconds.
    pub fn advance(&mut self, frame_time: f32) {
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        if !self.paused {
            self.clock += frame_time * self.time_scale;
        }
    }

    /// Current FPS (smoothed).
    #[must_use]
    pub const fn fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// Animation time in seconds.
    #[must_use]
    pub const fn time(&self) -> f32 {
        self.clock
    }

    /// Freeze or resume the animation clock. Returns the new paused state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Rewind the animation clock to zero.
    pub fn reset_clock(&mut self) {
        self.clock = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_scales_and_pauses() {
        let mut timing = FrameTiming::new(0).with_time_scale(2.0);
        timing.advance(0.5);
        assert_eq!(timing.time(), 1.0);

        assert!(timing.toggle_pause());
        timing.advance(0.5);
        assert_eq!(timing.time(), 1.0);

        assert!(!timing.toggle_pause());
        timing.advance(0.25);
        assert_eq!(timing.time(), 1.5);

        timing.reset_clock();
        assert_eq!(timing.time(), 0.0);
    }

    #[test]
    fn unlimited_timer_always_renders() {
        assert!(FrameTiming::new(0).should_render());
    }

    #[test]
    fn fps_tracks_frame_time() {
        let mut timing = FrameTiming::new(60);
        for _ in 0..200 {
            timing.advance(1.0 / 30.0);
        }
        assert!((timing.fps() - 30.0).abs() < 0.5, "{}", timing.fps());
    }
}
