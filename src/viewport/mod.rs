//! Zoom and scroll state for a horizontal timeline, plus pixel/time conversion.
//!
//! The model knows nothing about segments or playback; callers pass either the
//! original or the gapless duration depending on the timeline mode.

pub mod ruler;

use serde::{Deserialize, Serialize};

pub const MIN_ZOOM_LEVEL: f64 = 0.001;
pub const MAX_ZOOM_LEVEL: f64 = 20.0;
pub const DEFAULT_ZOOM_LEVEL: f64 = 1.0;
/// Multiplier applied by one `zoom_in` / divided by one `zoom_out`.
pub const ZOOM_STEP: f64 = 1.25;
/// Pixels per millisecond at zoom level 1.0 (100 px per second).
pub const BASE_PIXELS_PER_MS: f64 = 0.1;

/// Linear in zoom level, so the inverse is exact for hit-testing.
pub fn pixels_per_ms(zoom_level: f64) -> f64 {
    BASE_PIXELS_PER_MS * zoom_level
}

pub fn zoom_level_for_pixels_per_ms(pixels_per_ms: f64) -> f64 {
    pixels_per_ms / BASE_PIXELS_PER_MS
}

fn clamp_zoom(level: f64) -> f64 {
    level.clamp(MIN_ZOOM_LEVEL, MAX_ZOOM_LEVEL)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    zoom_level: f64,
    viewport_start_ms: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom_level: DEFAULT_ZOOM_LEVEL,
            viewport_start_ms: 0.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn viewport_start_ms(&self) -> f64 {
        self.viewport_start_ms
    }

    pub fn pixels_per_ms(&self) -> f64 {
        pixels_per_ms(self.zoom_level)
    }

    /// Non-finite levels are ignored.
    pub fn set_zoom(&mut self, level: f64) {
        if level.is_finite() {
            self.zoom_level = clamp_zoom(level);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom_level * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom_level / ZOOM_STEP);
    }

    /// Scales zoom by `factor` while keeping the instant under `anchor_px`
    /// at the same screen position.
    pub fn zoom_around(&mut self, factor: f64, anchor_px: f64) {
        if !factor.is_finite() || factor <= 0.0 || !anchor_px.is_finite() {
            return;
        }
        let anchor_ms = self.px_to_ms(anchor_px);
        self.set_zoom(self.zoom_level * factor);
        self.scroll_to(anchor_ms - anchor_px / self.pixels_per_ms());
    }

    /// Lower bound only; the caller decides whether to stop at the end.
    pub fn scroll_to(&mut self, start_ms: f64) {
        if start_ms.is_nan() {
            return;
        }
        self.viewport_start_ms = start_ms.max(0.0);
    }

    pub fn scroll_by(&mut self, delta_ms: f64) {
        self.scroll_to(self.viewport_start_ms + delta_ms);
    }

    /// Zooms so `duration_ms` exactly fills `viewport_width_px` and scrolls
    /// to the start. Non-positive input leaves the zoom alone.
    pub fn fit_to_view(&mut self, duration_ms: f64, viewport_width_px: f64) {
        self.viewport_start_ms = 0.0;
        if !(duration_ms > 0.0 && viewport_width_px > 0.0) {
            return;
        }
        self.set_zoom(zoom_level_for_pixels_per_ms(viewport_width_px / duration_ms));
    }

    pub fn visible_duration_ms(&self, viewport_width_px: f64) -> f64 {
        (viewport_width_px / self.pixels_per_ms()).max(0.0)
    }

    /// Scroll position at which the end of `duration_ms` meets the right edge.
    pub fn max_scroll_ms(&self, duration_ms: f64, viewport_width_px: f64) -> f64 {
        (duration_ms - self.visible_duration_ms(viewport_width_px)).max(0.0)
    }

    pub fn clamp_scroll(&mut self, duration_ms: f64, viewport_width_px: f64) {
        let max = self.max_scroll_ms(duration_ms, viewport_width_px);
        self.viewport_start_ms = self.viewport_start_ms.clamp(0.0, max);
    }

    pub fn ms_to_px(&self, ms: f64) -> f64 {
        (ms - self.viewport_start_ms) * self.pixels_per_ms()
    }

    pub fn px_to_ms(&self, px: f64) -> f64 {
        self.viewport_start_ms + px / self.pixels_per_ms()
    }
}
