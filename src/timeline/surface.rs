use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::{follow::FollowMode, timemap::GaplessMap, viewport::Viewport};

/// Which time axis the timeline is laid over.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimelineMode {
    /// Original time, gaps and disabled segments drawn.
    #[default]
    Full,
    /// Gapless time, enabled segments back to back.
    Gapless,
}

/// Per-timeline view state shared by gesture handlers and the follow ticker.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSurface {
    pub viewport: Viewport,
    pub width_px: f64,
    pub mode: TimelineMode,
    pub follow: FollowMode,
    /// Length of the source recording, original time.
    pub media_duration_ms: f64,
}

pub type SharedSurface = Arc<Mutex<TimelineSurface>>;

impl TimelineSurface {
    pub fn new(media_duration_ms: f64, width_px: f64) -> Self {
        Self {
            viewport: Viewport::new(),
            width_px: width_px.max(0.0),
            mode: TimelineMode::Full,
            follow: FollowMode::Following,
            media_duration_ms: media_duration_ms.max(0.0),
        }
    }

    pub fn visible_duration_ms(&self) -> f64 {
        self.viewport.visible_duration_ms(self.width_px)
    }

    /// Duration of the axis the timeline is currently laid over.
    pub fn display_duration_ms(&self, map: &GaplessMap) -> f64 {
        match self.mode {
            TimelineMode::Full => self.media_duration_ms,
            TimelineMode::Gapless => map.gapless_duration_ms(),
        }
    }

    pub fn to_display(&self, original_ms: f64, map: &GaplessMap) -> f64 {
        match self.mode {
            TimelineMode::Full => original_ms,
            TimelineMode::Gapless => map.original_to_gapless(original_ms),
        }
    }

    pub fn to_original(&self, display_ms: f64, map: &GaplessMap) -> f64 {
        match self.mode {
            TimelineMode::Full => display_ms,
            TimelineMode::Gapless => map.gapless_to_original(display_ms),
        }
    }

    /// Hard stop for gesture-driven scrolling.
    pub fn clamp_scroll(&mut self, map: &GaplessMap) {
        let duration = self.display_duration_ms(map);
        self.viewport.clamp_scroll(duration, self.width_px);
    }
}

pub fn shared(surface: TimelineSurface) -> SharedSurface {
    Arc::new(Mutex::new(surface))
}
