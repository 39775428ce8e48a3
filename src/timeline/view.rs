use anyhow::Result;

use crate::{
    follow::{center_on, FollowController, FollowMode},
    models::{Segment, SegmentEdge, Selection, Waveform},
    playback::PlaybackController,
    settings::FollowSettings,
    store::{EditRejected, SegmentStore},
    timemap::GaplessMap,
};

use super::{
    frame::{build_frame, FrameInput, TimelineFrame},
    gestures::{
        apply_fit, apply_scroll_to, apply_scrollbar_drag, apply_wheel, apply_zoom_in,
        apply_zoom_out, WheelInput,
    },
    surface::{shared, SharedSurface, TimelineMode, TimelineSurface},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// User-facing timeline for one media item: composes the store, the
/// playback controller, the viewport surface and the follow ticker, and
/// turns gestures into calls on them.
pub struct TimelineView {
    store: SegmentStore,
    playback: PlaybackController,
    surface: SharedSurface,
    follow: FollowController,
}

impl TimelineView {
    pub fn new(
        store: SegmentStore,
        playback: PlaybackController,
        media_duration_ms: f64,
        width_px: f64,
        follow_settings: FollowSettings,
    ) -> Self {
        Self {
            store,
            playback,
            surface: shared(TimelineSurface::new(media_duration_ms, width_px)),
            follow: FollowController::new(follow_settings),
        }
    }

    pub fn video_id(&self) -> &str {
        self.playback.video_id()
    }

    fn map(&self) -> GaplessMap {
        self.store.gapless_map_for(self.playback.video_id())
    }

    /// Copy of the current surface state.
    pub fn surface(&self) -> TimelineSurface {
        self.surface.lock().clone()
    }

    pub fn shared_surface(&self) -> SharedSurface {
        self.surface.clone()
    }

    /// Starts the follow ticker. Needs a tokio runtime.
    pub fn mount(&mut self) -> Result<()> {
        self.follow.start(
            self.surface.clone(),
            self.playback.clone(),
            self.store.clone(),
        )?;
        log_info!("timeline mounted for {}", self.video_id());
        Ok(())
    }

    /// Stops the follow ticker and drops any pending jump watchdog.
    pub fn unmount(&mut self) {
        self.follow.stop();
        self.playback.reset_jump_state();
        log_info!("timeline unmounted for {}", self.video_id());
    }

    pub fn is_mounted(&self) -> bool {
        self.follow.is_running()
    }

    pub fn mode(&self) -> TimelineMode {
        self.surface.lock().mode
    }

    /// Switches the time axis, keeping the same content at the left edge.
    pub fn set_mode(&self, mode: TimelineMode) {
        let map = self.map();
        {
            let mut surface = self.surface.lock();
            if surface.mode == mode {
                return;
            }
            let start = surface.viewport.viewport_start_ms();
            let original = surface.to_original(start, &map);
            surface.mode = mode;
            let mapped = surface.to_display(original, &map);
            surface.viewport.scroll_to(mapped);
        }
        self.playback.reset_jump_state();
        log_debug!("timeline {} switched to {mode:?}", self.video_id());
    }

    /// Duration of the current display axis.
    pub fn duration_ms(&self) -> f64 {
        let map = self.map();
        self.surface.lock().display_duration_ms(&map)
    }

    pub fn set_media_duration(&self, media_duration_ms: f64) {
        if media_duration_ms.is_finite() {
            self.surface.lock().media_duration_ms = media_duration_ms.max(0.0);
        }
    }

    pub fn resize(&self, width_px: f64) {
        if width_px.is_finite() {
            self.surface.lock().width_px = width_px.max(0.0);
        }
    }

    pub fn zoom_in(&self) {
        let map = self.map();
        apply_zoom_in(&mut self.surface.lock(), &map);
    }

    pub fn zoom_out(&self) {
        let map = self.map();
        apply_zoom_out(&mut self.surface.lock(), &map);
    }

    pub fn fit_to_view(&self) {
        let map = self.map();
        apply_fit(&mut self.surface.lock(), &map);
    }

    pub fn scroll_to(&self, start_ms: f64) {
        let map = self.map();
        apply_scroll_to(&mut self.surface.lock(), start_ms, &map);
    }

    pub fn wheel(&self, input: WheelInput) {
        let map = self.map();
        apply_wheel(&mut self.surface.lock(), input, &map);
    }

    pub fn drag_scrollbar(&self, fraction: f64) {
        let map = self.map();
        apply_scrollbar_drag(&mut self.surface.lock(), fraction, &map);
    }

    pub fn follow_mode(&self) -> FollowMode {
        self.surface.lock().follow
    }

    /// Follow toggle. Turning it on lets the ticker take over from the next
    /// tick.
    pub fn set_follow(&self, enabled: bool) {
        self.surface.lock().follow = if enabled {
            FollowMode::Following
        } else {
            FollowMode::Manual
        };
    }

    pub fn center_on_playhead(&self) {
        let map = self.map();
        let playhead = self.playback.current_time_ms();
        let mut surface = self.surface.lock();
        surface.follow = FollowMode::Following;
        center_on(&mut surface, playhead, &map, self.follow.settings());
    }

    fn original_at(&self, x_px: f64, map: &GaplessMap) -> f64 {
        let surface = self.surface.lock();
        let display = surface.viewport.px_to_ms(x_px);
        surface.to_original(display, map)
    }

    pub fn click_to_seek(&self, x_px: f64) {
        if !x_px.is_finite() {
            return;
        }
        let map = self.map();
        let original = self.original_at(x_px, &map);
        self.playback.seek(original);
    }

    /// Drag handle of a segment boundary released at `x_px`.
    pub fn resize_segment_edge(
        &self,
        id: &str,
        edge: SegmentEdge,
        x_px: f64,
    ) -> Result<(), EditRejected> {
        let map = self.map();
        let original = self.original_at(x_px, &map);
        self.store.resize_segment(self.video_id(), id, edge, original)
    }

    pub fn toggle_segment(&self, id: &str) -> Result<bool, EditRejected> {
        self.store.toggle_segment(self.video_id(), id)
    }

    /// Selects whatever is under `x_px`: a segment first, then a silence.
    pub fn select_at(&self, x_px: f64) -> Selection {
        if !x_px.is_finite() {
            return Selection::None;
        }
        let map = self.map();
        let mode = self.mode();
        let original = self.original_at(x_px, &map);
        let segments = self.store.segments_for(self.video_id());

        let hit = segments
            .iter()
            .filter(|s| mode == TimelineMode::Full || s.enabled)
            .find(|s| s.contains(original))
            .map(|s: &Segment| Selection::Segment(s.id.clone()))
            .or_else(|| {
                self.store
                    .silences_for(self.video_id())
                    .iter()
                    .position(|silence| original >= silence.start_ms && original < silence.end_ms)
                    .map(Selection::Silence)
            })
            .unwrap_or_default();

        match self.store.select(self.video_id(), hit.clone()) {
            Ok(()) => hit,
            Err(_) => Selection::None,
        }
    }

    /// Snapshot of everything the host needs to draw.
    pub fn frame(&self, waveform: Option<&Waveform>) -> TimelineFrame {
        let video_id = self.video_id();
        let segments = self.store.segments_for(video_id);
        let silences = self.store.silences_for(video_id);
        let selection = self.store.selection_for(video_id);
        let map = self.map();
        let playback = self.playback.snapshot();
        let surface = self.surface.lock();

        build_frame(FrameInput {
            surface: &surface,
            segments: &segments,
            silences: &silences,
            selection: &selection,
            map: &map,
            playback,
            waveform,
        })
    }
}
