//! Per-LED fade toward a target color.
//!
//! Every LED starts from its own current color, so there is no single start
//! value to interpolate from. Instead each step blends the buffer toward the
//! target by an alpha chosen so that the result follows a smootherstep curve
//! over the fade duration. Alpha is quantized to 8 bits; the fractional part
//! is accumulated across steps so slow fades still move early on.

use embassy_time::{Duration, Instant};

use crate::color::{Rgb, blend_colors, scale_color};

/// Smootherstep easing, 0.0..=1.0 -> 0.0..=1.0
#[inline]
pub fn smoothed_progress(x: f32) -> f32 {
    x * x * x * (x * (x * 6.0 - 15.0) + 10.0)
}

/// Fade of a whole buffer toward one color
#[derive(Debug, Clone)]
pub struct FadeTransition {
    target: Rgb,
    start_time: Instant,
    duration: Duration,
    last_progress: f32,
    accumulated_alpha: f32,
    finished: bool,
}

impl FadeTransition {
    pub fn new(target: Rgb, duration: Duration, now: Instant) -> Self {
        Self {
            target,
            start_time: now,
            duration,
            last_progress: 0.0,
            accumulated_alpha: 0.0,
            finished: false,
        }
    }

    /// Fade toward `target` dimmed to `brightness`
    pub fn with_brightness(target: Rgb, brightness: u8, duration: Duration, now: Instant) -> Self {
        Self::new(scale_color(target, brightness), duration, now)
    }

    pub const fn target(&self) -> Rgb {
        self.target
    }

    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Linear progress at `now`, 0.0..=1.0
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, now: Instant) -> f32 {
        let total = self.duration.as_micros();
        if total == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start_time).as_micros();
        (elapsed as f32 / total as f32).clamp(0.0, 1.0)
    }

    /// Advance the fade and blend `pixels` toward the target.
    ///
    /// Returns `true` if the buffer may have changed and should be refreshed.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply(&mut self, now: Instant, pixels: &mut [Rgb]) -> bool {
        if self.finished {
            return false;
        }
        let progress = self.progress(now);
        let smoothed = smoothed_progress(progress);

        // Fraction of the remaining distance covered since the last step
        let alpha = if progress >= 1.0 {
            1.0
        } else {
            ((smoothed - self.last_progress) / (1.0 - self.last_progress)).clamp(0.0, 1.0)
        };

        let mut alpha255 = alpha * 255.0;
        let remainder = alpha255 - libm::floorf(alpha255);
        self.accumulated_alpha += remainder;
        let carry = libm::floorf(self.accumulated_alpha);
        self.accumulated_alpha -= carry;
        alpha255 = libm::floorf(alpha255) + carry;

        let alpha8 = alpha255.clamp(0.0, 255.0) as u8;
        if alpha8 != 0 {
            for led in pixels.iter_mut() {
                *led = blend_colors(*led, self.target, alpha8);
            }
        }

        self.last_progress = self.last_progress.max(smoothed);
        if progress >= 1.0 {
            self.finished = true;
        }
        true
    }
}
