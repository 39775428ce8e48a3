//! Auto-scroll that keeps the playhead in view while playing.
//!
//! Following is the default. Any explicit viewport gesture drops to Manual,
//! and only an explicit follow toggle or "center on playhead" returns to
//! Following. The ticker re-reads playback, store and surface every tick, so
//! zoom or scroll changes between ticks are always seen.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::{runtime::Handle, task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    playback::PlaybackController,
    settings::FollowSettings,
    store::SegmentStore,
    timeline::{SharedSurface, TimelineSurface},
    timemap::GaplessMap,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FollowMode {
    #[default]
    Following,
    Manual,
}

/// New viewport start that keeps `playhead_ms` clear of the edge margins,
/// or `None` when it already sits inside the band.
pub fn follow_target(
    playhead_ms: f64,
    viewport_start_ms: f64,
    visible_ms: f64,
    settings: &FollowSettings,
) -> Option<f64> {
    if !playhead_ms.is_finite() || !(visible_ms > 0.0) {
        return None;
    }
    let margin = visible_ms * settings.edge_margin.clamp(0.0, 0.5);
    let lower = viewport_start_ms + margin;
    let upper = viewport_start_ms + visible_ms - margin;
    if playhead_ms >= lower && playhead_ms <= upper {
        return None;
    }
    Some((playhead_ms - visible_ms * settings.anchor.clamp(0.0, 1.0)).max(0.0))
}

/// One follow step against the current surface. Returns whether the
/// viewport moved.
pub fn follow_step(
    surface: &mut TimelineSurface,
    playhead_original_ms: f64,
    map: &GaplessMap,
    settings: &FollowSettings,
) -> bool {
    if surface.follow != FollowMode::Following {
        return false;
    }
    let playhead = surface.to_display(playhead_original_ms, map);
    let visible = surface.visible_duration_ms();
    let start = surface.viewport.viewport_start_ms();

    let Some(target) = follow_target(playhead, start, visible, settings) else {
        return false;
    };
    let max_scroll = surface
        .viewport
        .max_scroll_ms(surface.display_duration_ms(map), surface.width_px);
    let target = target.min(max_scroll);
    if (target - start).abs() < f64::EPSILON {
        return false;
    }
    surface.viewport.scroll_to(target);
    true
}

/// Places the playhead at the anchor regardless of the edge band.
pub fn center_on(
    surface: &mut TimelineSurface,
    playhead_original_ms: f64,
    map: &GaplessMap,
    settings: &FollowSettings,
) {
    let playhead = surface.to_display(playhead_original_ms, map);
    let visible = surface.visible_duration_ms();
    let max_scroll = surface
        .viewport
        .max_scroll_ms(surface.display_duration_ms(map), surface.width_px);
    let target = (playhead - visible * settings.anchor.clamp(0.0, 1.0)).clamp(0.0, max_scroll);
    surface.viewport.scroll_to(target);
}

/// Recurring follow task for one mounted timeline.
pub struct FollowController {
    settings: FollowSettings,
    task: Option<(CancellationToken, JoinHandle<()>)>,
}

impl FollowController {
    pub fn new(settings: FollowSettings) -> Self {
        Self {
            settings,
            task: None,
        }
    }

    pub fn settings(&self) -> &FollowSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn start(
        &mut self,
        surface: SharedSurface,
        playback: PlaybackController,
        store: SegmentStore,
    ) -> Result<()> {
        if self.task.is_some() {
            return Ok(());
        }
        let runtime = Handle::try_current().context("follow ticker needs a tokio runtime")?;

        let token = CancellationToken::new();
        let handle = runtime.spawn(follow_loop(
            surface,
            playback,
            store,
            self.settings.clone(),
            token.clone(),
        ));
        self.task = Some((token, handle));
        log_info!("follow ticker started");
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some((token, handle)) = self.task.take() {
            token.cancel();
            handle.abort();
            log_info!("follow ticker stopped");
        }
    }
}

impl Drop for FollowController {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn follow_loop(
    surface: SharedSurface,
    playback: PlaybackController,
    store: SegmentStore,
    settings: FollowSettings,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(settings.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = playback.snapshot();
                if !snapshot.is_playing {
                    continue;
                }
                let map = store.gapless_map_for(playback.video_id());
                let mut surface = surface.lock();
                if follow_step(&mut surface, snapshot.current_time_ms, &map, &settings) {
                    log_debug!(
                        "follow scrolled to {:.0}ms",
                        surface.viewport.viewport_start_ms()
                    );
                }
            }
            _ = token.cancelled() => break,
        }
    }
}
