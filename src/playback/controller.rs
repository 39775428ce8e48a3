use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use parking_lot::{Mutex, RwLock};
use tokio::{
    runtime::Handle,
    sync::{oneshot, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;

use crate::{settings::PlaybackSettings, store::SegmentStore};

use super::{
    lookahead::{plan_start, plan_tick, StartAction, TickAction},
    state::{PlaybackSnapshot, PlaybackState},
    transport::{MediaEvent, MediaTransport},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Watchdog of the jump currently in flight.
struct PendingSeek {
    seq: u64,
    done_tx: oneshot::Sender<()>,
    watchdog: JoinHandle<()>,
}

struct Inner {
    state: PlaybackState,
    pending: Option<PendingSeek>,
}

impl Inner {
    fn reset_jump(&mut self) {
        self.state.gate.reset();
        if let Some(pending) = self.pending.take() {
            pending.watchdog.abort();
        }
    }
}

struct FrameClock {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

struct Shared {
    inner: Mutex<Inner>,
    transport: RwLock<Option<Arc<dyn MediaTransport>>>,
    store: SegmentStore,
    video_id: String,
    settings: PlaybackSettings,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
    clock: Mutex<Option<FrameClock>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(clock) = self.clock.get_mut().take() {
            clock.token.cancel();
            clock.handle.abort();
        }
        if let Some(pending) = self.inner.get_mut().pending.take() {
            pending.watchdog.abort();
        }
    }
}

/// Drives one media element so that disabled segments of one media item are
/// skipped during playback.
///
/// Lock order is playback state, then store. No lock is held while calling
/// into the transport, so a transport may report `on_seeked` synchronously
/// from inside `seek`.
#[derive(Clone)]
pub struct PlaybackController {
    shared: Arc<Shared>,
}

impl PlaybackController {
    pub fn new(store: SegmentStore, video_id: impl Into<String>, settings: PlaybackSettings) -> Self {
        let video_id = video_id.into();
        let mut state = PlaybackState::new(settings.jump_tolerance_ms, true);
        state.seen_revision = store.segments_revision(&video_id);
        let (snapshot_tx, _) = watch::channel(state.snapshot());

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state,
                    pending: None,
                }),
                transport: RwLock::new(None),
                store,
                video_id,
                settings,
                snapshot_tx,
                clock: Mutex::new(None),
            }),
        }
    }

    pub fn video_id(&self) -> &str {
        &self.shared.video_id
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.shared.settings
    }

    pub fn is_attached(&self) -> bool {
        self.shared.transport.read().is_some()
    }

    fn transport(&self) -> Option<Arc<dyn MediaTransport>> {
        self.shared.transport.read().clone()
    }

    fn publish(&self, inner: &Inner) {
        let next = inner.state.snapshot();
        self.shared.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    /// A segment revision the jump memory was not built against means this
    /// media item's segment topology changed underneath it.
    fn sync_topology(&self, inner: &mut Inner, revision: u64) {
        if inner.state.seen_revision == revision {
            return;
        }
        inner.state.seen_revision = revision;
        if inner.state.gate.is_in_flight() || inner.state.gate.last_target_ms().is_some() {
            log_debug!("segments of {} changed; resetting jump state", self.shared.video_id);
        }
        inner.reset_jump();
    }

    /// Binds a media element. Any state derived from a previous element is
    /// dropped.
    pub fn attach(&self, transport: Arc<dyn MediaTransport>) {
        let position = transport
            .current_time_ms()
            .ok()
            .filter(|ms| ms.is_finite())
            .unwrap_or(0.0);
        let previous = self.shared.transport.write().replace(transport);

        {
            let mut inner = self.shared.inner.lock();
            inner.reset_jump();
            inner.state.current_time_ms = position;
            inner.state.is_playing = false;
            inner.state.seen_revision =
                self.shared.store.segments_revision(&self.shared.video_id);
            self.publish(&inner);
        }

        if previous.is_some() {
            log_info!("media element swapped for {}", self.shared.video_id);
        } else {
            log_info!("media element attached for {}", self.shared.video_id);
        }
    }

    pub fn detach(&self) {
        self.stop_frame_clock();
        let previous = self.shared.transport.write().take();

        let mut inner = self.shared.inner.lock();
        inner.reset_jump();
        inner.state.is_playing = false;
        self.publish(&inner);

        if previous.is_some() {
            log_info!("media element detached from {}", self.shared.video_id);
        }
    }

    pub fn handle_event(&self, event: MediaEvent) {
        match event {
            MediaEvent::TimeUpdate(ms) => self.on_time_update(ms),
            MediaEvent::Seeked => self.on_seeked(),
            MediaEvent::Playing => self.on_playing(),
            MediaEvent::Paused => self.on_paused(),
            MediaEvent::Ended => self.on_ended(),
        }
    }

    /// Playhead tick from the element, original time.
    pub fn on_time_update(&self, original_ms: f64) {
        if !original_ms.is_finite() {
            return;
        }
        if !self.is_attached() {
            log_debug!("time update ignored: no media element");
            return;
        }

        let revision = self.shared.store.segments_revision(&self.shared.video_id);
        let map = self.shared.store.gapless_map_for(&self.shared.video_id);

        let action = {
            let mut inner = self.shared.inner.lock();
            self.sync_topology(&mut inner, revision);
            // Keep showing the jump target until the element lands there.
            if !inner.state.gate.is_in_flight() {
                inner.state.current_time_ms = original_ms;
            }
            let action = (inner.state.is_playing && inner.state.gapless)
                .then(|| plan_tick(&map, original_ms, self.shared.settings.lookahead_ms));
            self.publish(&inner);
            action
        };

        match action {
            Some(TickAction::JumpTo(target_ms)) => self.perform_jump(target_ms),
            Some(TickAction::Pause) => self.pause_at_end(),
            Some(TickAction::Continue) | None => {}
        }
    }

    /// Seek-completion signal from the element.
    pub fn on_seeked(&self) {
        if !self.is_attached() {
            return;
        }
        let mut inner = self.shared.inner.lock();
        let released = inner.state.gate.finish();
        if let Some(pending) = inner.pending.take() {
            let _ = pending.done_tx.send(());
        }
        if released {
            log_debug!("jump #{} landed", inner.state.gate.seq());
        }
        self.publish(&inner);
    }

    pub fn on_playing(&self) {
        self.set_playing_flag(true);
    }

    pub fn on_paused(&self) {
        self.set_playing_flag(false);
    }

    pub fn on_ended(&self) {
        self.set_playing_flag(false);
    }

    fn set_playing_flag(&self, playing: bool) {
        if !self.is_attached() {
            return;
        }
        let mut inner = self.shared.inner.lock();
        inner.state.is_playing = playing;
        self.publish(&inner);
    }

    /// User-initiated play. Never starts inside a disabled region.
    pub fn play(&self) {
        let Some(transport) = self.transport() else {
            log_debug!("play ignored: no media element");
            return;
        };
        let position = match transport.current_time_ms() {
            Ok(ms) if ms.is_finite() => ms,
            Ok(_) => self.current_time_ms(),
            Err(err) => {
                log_debug!("play ignored: {err}");
                return;
            }
        };

        let revision = self.shared.store.segments_revision(&self.shared.video_id);
        let map = self.shared.store.gapless_map_for(&self.shared.video_id);

        let gapless = {
            let mut inner = self.shared.inner.lock();
            self.sync_topology(&mut inner, revision);
            inner.reset_jump();
            inner.state.current_time_ms = position;
            inner.state.gapless
        };

        let start = if gapless {
            plan_start(&map, position)
        } else {
            StartAction::PlayHere
        };

        match start {
            StartAction::NothingToPlay => {
                log_info!("nothing enabled to play in {}", self.shared.video_id);
                if let Err(err) = transport.pause() {
                    log_debug!("pause failed: {err}");
                }
                let mut inner = self.shared.inner.lock();
                inner.state.is_playing = false;
                self.publish(&inner);
                return;
            }
            StartAction::SeekThenPlay(target_ms) => self.perform_jump(target_ms),
            StartAction::PlayHere => {}
        }

        match transport.play() {
            Ok(()) => {
                let mut inner = self.shared.inner.lock();
                inner.state.is_playing = true;
                self.publish(&inner);
            }
            Err(err) => log_warn!("play failed for {}: {err}", self.shared.video_id),
        }
    }

    pub fn pause(&self) {
        let Some(transport) = self.transport() else {
            return;
        };
        if let Err(err) = transport.pause() {
            log_debug!("pause ignored: {err}");
            return;
        }
        let mut inner = self.shared.inner.lock();
        inner.state.is_playing = false;
        self.publish(&inner);
    }

    /// User seek in original time, clamped to the media duration.
    pub fn seek(&self, original_ms: f64) {
        let Some(transport) = self.transport() else {
            log_debug!("seek ignored: no media element");
            return;
        };
        let upper = transport
            .duration_ms()
            .ok()
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .unwrap_or(f64::INFINITY);
        let target_ms = if original_ms.is_nan() {
            0.0
        } else {
            original_ms.clamp(0.0, upper)
        };

        {
            let mut inner = self.shared.inner.lock();
            inner.reset_jump();
            inner.state.current_time_ms = target_ms;
            self.publish(&inner);
        }

        if let Err(err) = transport.seek(target_ms) {
            log_debug!("seek to {target_ms:.0}ms ignored: {err}");
        }
    }

    /// Turns skipping of disabled regions on or off.
    pub fn set_gapless(&self, enabled: bool) {
        let mut inner = self.shared.inner.lock();
        inner.reset_jump();
        inner.state.gapless = enabled;
        self.publish(&inner);
        log_info!(
            "gapless playback {} for {}",
            if enabled { "on" } else { "off" },
            self.shared.video_id
        );
    }

    /// Forgets the in-flight guard and the last jump target.
    pub fn reset_jump_state(&self) {
        let mut inner = self.shared.inner.lock();
        inner.reset_jump();
        self.publish(&inner);
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.shared.inner.lock().state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn current_time_ms(&self) -> f64 {
        self.shared.inner.lock().state.current_time_ms
    }

    pub fn is_playing(&self) -> bool {
        self.shared.inner.lock().state.is_playing
    }

    pub fn is_transitioning(&self) -> bool {
        self.shared.inner.lock().state.gate.is_in_flight()
    }

    pub fn is_gapless(&self) -> bool {
        self.shared.inner.lock().state.gapless
    }

    fn perform_jump(&self, target_ms: f64) {
        let Some(transport) = self.transport() else {
            return;
        };

        let seq = {
            let mut inner = self.shared.inner.lock();
            let Some(seq) = inner.state.gate.try_begin(target_ms) else {
                log_debug!("jump to {target_ms:.0}ms suppressed");
                return;
            };
            inner.state.current_time_ms = target_ms;
            self.publish(&inner);
            seq
        };

        log_info!("jump #{seq} to {target_ms:.0}ms in {}", self.shared.video_id);
        if let Err(err) = transport.seek(target_ms) {
            log_warn!("jump #{seq} to {target_ms:.0}ms failed: {err}");
            let mut inner = self.shared.inner.lock();
            inner.state.gate.complete(seq);
            inner.state.gate.forget_target();
            self.publish(&inner);
            return;
        }

        self.arm_watchdog(seq);
    }

    /// Races the seek-completion signal against the safety timeout.
    fn arm_watchdog(&self, seq: u64) {
        let Ok(runtime) = Handle::try_current() else {
            log_debug!("no runtime for the seek watchdog of jump #{seq}");
            return;
        };
        let timeout = self.shared.settings.seek_timeout();
        let weak = Arc::downgrade(&self.shared);

        let mut inner = self.shared.inner.lock();
        // Completed synchronously, or superseded by a reset.
        if !inner.state.gate.is_in_flight() || inner.state.gate.seq() != seq {
            return;
        }

        let (done_tx, done_rx) = oneshot::channel::<()>();
        let watchdog = runtime.spawn(async move {
            tokio::select! {
                _ = done_rx => {}
                _ = tokio::time::sleep(timeout) => {
                    if let Some(shared) = weak.upgrade() {
                        PlaybackController { shared }.on_seek_timeout(seq);
                    }
                }
            }
        });

        if let Some(previous) = inner.pending.replace(PendingSeek {
            seq,
            done_tx,
            watchdog,
        }) {
            previous.watchdog.abort();
        }
    }

    fn on_seek_timeout(&self, seq: u64) {
        let mut inner = self.shared.inner.lock();
        if inner.pending.as_ref().is_some_and(|pending| pending.seq == seq) {
            inner.pending = None;
        }
        if inner.state.gate.complete(seq) {
            log_warn!(
                "no seek completion for jump #{seq} after {}ms; releasing guard",
                self.shared.settings.seek_timeout_ms
            );
            self.publish(&inner);
        }
    }

    fn pause_at_end(&self) {
        let Some(transport) = self.transport() else {
            return;
        };
        if let Err(err) = transport.pause() {
            log_debug!("pause at end ignored: {err}");
            return;
        }
        log_info!("end of enabled content in {}", self.shared.video_id);
        let mut inner = self.shared.inner.lock();
        inner.state.is_playing = false;
        self.publish(&inner);
    }

    /// Polls the element once per frame while playing, for hosts that do
    /// not deliver time updates at display rate.
    pub fn start_frame_clock(&self) {
        let Ok(runtime) = Handle::try_current() else {
            log_warn!("frame clock needs a tokio runtime");
            return;
        };
        let mut slot = self.shared.clock.lock();
        if slot.is_some() {
            return;
        }

        let token = CancellationToken::new();
        let handle = runtime.spawn(frame_clock_loop(
            Arc::downgrade(&self.shared),
            self.shared.settings.frame_interval(),
            token.clone(),
        ));
        *slot = Some(FrameClock { token, handle });
        log_info!("frame clock started for {}", self.shared.video_id);
    }

    pub fn stop_frame_clock(&self) {
        if let Some(clock) = self.shared.clock.lock().take() {
            clock.token.cancel();
            clock.handle.abort();
            log_info!("frame clock stopped for {}", self.shared.video_id);
        }
    }
}

async fn frame_clock_loop(shared: Weak<Shared>, period: Duration, token: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                let controller = PlaybackController { shared };
                if !controller.is_playing() {
                    continue;
                }
                let Some(transport) = controller.transport() else {
                    continue;
                };
                match transport.current_time_ms() {
                    Ok(ms) => controller.on_time_update(ms),
                    Err(err) => log_debug!("frame clock read failed: {err}"),
                }
            }
            _ = token.cancelled() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Segment, playback::testing::FakeTransport};

    const VIDEO: &str = "clip";

    fn three_segments() -> SegmentStore {
        let store = SegmentStore::new();
        store.replace_segments(
            VIDEO,
            vec![
                Segment::new("a", 0.0, 1000.0, true),
                Segment::new("b", 1000.0, 2000.0, false),
                Segment::new("c", 2000.0, 3000.0, true),
            ],
        );
        store
    }

    fn attached(store: &SegmentStore) -> (PlaybackController, Arc<FakeTransport>) {
        let controller = PlaybackController::new(store.clone(), VIDEO, PlaybackSettings::default());
        let transport = FakeTransport::new(3000.0);
        controller.attach(transport.clone());
        (controller, transport)
    }

    #[tokio::test(start_paused = true)]
    async fn one_jump_per_cut_even_with_repeated_ticks() {
        let store = three_segments();
        let (controller, transport) = attached(&store);
        controller.play();
        assert!(controller.is_playing());

        controller.on_time_update(995.0);
        controller.on_time_update(995.0);
        controller.on_time_update(999.0);
        assert_eq!(transport.seeks(), vec![2000.0]);
        assert!(controller.is_transitioning());
        assert_eq!(controller.current_time_ms(), 2000.0);

        controller.on_seeked();
        assert!(!controller.is_transitioning());

        // A stale tick from before the seek landed.
        controller.on_time_update(998.0);
        assert_eq!(transport.seeks(), vec![2000.0]);

        controller.on_time_update(2010.0);
        assert_eq!(transport.seeks(), vec![2000.0]);
        assert_eq!(controller.current_time_ms(), 2010.0);
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_during_a_jump_keeps_the_guard() {
        let store = three_segments();
        let (controller, transport) = attached(&store);
        controller.play();

        controller.on_time_update(995.0);
        store
            .select(VIDEO, crate::models::Selection::Segment("a".into()))
            .unwrap();
        controller.on_time_update(998.0);
        assert!(controller.is_transitioning());
        assert_eq!(transport.seeks(), vec![2000.0]);

        store.set_silences(VIDEO, vec![crate::models::Silence::new(1000.0, 2000.0)]);
        controller.on_time_update(999.0);
        assert!(controller.is_transitioning());
        assert_eq!(transport.seeks(), vec![2000.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn edits_to_another_media_item_keep_the_guard() {
        let store = three_segments();
        let (controller, transport) = attached(&store);
        controller.play();

        controller.on_time_update(995.0);
        store.add_segment("other-video", 0.0, 10.0).unwrap();
        store.clear_segments("third-video");
        controller.on_time_update(998.0);
        assert!(controller.is_transitioning());
        assert_eq!(transport.seeks(), vec![2000.0]);

        // Dedup memory survives past the seek as well.
        controller.on_seeked();
        store.add_segment("other-video", 20.0, 30.0).unwrap();
        controller.on_time_update(999.0);
        assert_eq!(transport.seeks(), vec![2000.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn safety_timeout_releases_the_guard() {
        let store = three_segments();
        let (controller, transport) = attached(&store);
        controller.play();

        controller.on_time_update(995.0);
        assert!(controller.is_transitioning());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(controller.is_transitioning());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!controller.is_transitioning());

        // Same target is still remembered after the timeout.
        controller.on_time_update(1500.0);
        assert_eq!(transport.seeks(), vec![2000.0]);

        controller.on_time_update(2990.0);
        assert_eq!(transport.pauses(), 1);
        assert!(!controller.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_the_playing_segment_jumps_then_pauses() {
        let store = three_segments();
        let (controller, transport) = attached(&store);
        controller.play();
        controller.on_time_update(500.0);
        assert!(transport.seeks().is_empty());

        store.toggle_segment(VIDEO, "a").unwrap();
        controller.on_time_update(520.0);
        assert_eq!(transport.seeks(), vec![2000.0]);
        controller.on_seeked();

        controller.on_time_update(2100.0);
        store.toggle_segment(VIDEO, "c").unwrap();
        controller.on_time_update(2120.0);
        assert_eq!(transport.pauses(), 1);
        assert!(!controller.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn play_from_a_gap_seeks_first() {
        let store = three_segments();
        let (controller, transport) = attached(&store);

        transport.set_time(1500.0);
        controller.play();
        assert_eq!(transport.seeks(), vec![2000.0]);
        assert!(transport.is_playing());
        assert!(controller.is_playing());
        controller.on_seeked();

        controller.pause();
        transport.set_time(3000.0);
        controller.play();
        assert_eq!(transport.seeks(), vec![2000.0, 0.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_enabled_stays_paused() {
        let store = SegmentStore::new();
        store.replace_segments(VIDEO, vec![Segment::new("a", 0.0, 1000.0, false)]);
        let (controller, transport) = attached(&store);

        controller.play();
        assert_eq!(transport.plays(), 0);
        assert_eq!(transport.pauses(), 1);
        assert!(!controller.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn detached_element_makes_handlers_no_ops() {
        let store = three_segments();
        let controller = PlaybackController::new(store.clone(), VIDEO, PlaybackSettings::default());
        controller.play();
        controller.seek(1200.0);
        controller.on_time_update(995.0);
        assert_eq!(controller.snapshot(), PlaybackSnapshot::default());

        let transport = FakeTransport::new(3000.0);
        controller.attach(transport.clone());
        controller.play();
        transport.detach();
        controller.on_time_update(995.0);
        assert!(!controller.is_transitioning());
        controller.play();
        controller.on_seeked();
        assert_eq!(transport.plays(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn user_seek_is_clamped_and_clears_dedup() {
        let store = three_segments();
        let (controller, transport) = attached(&store);

        controller.seek(-40.0);
        controller.seek(9_000.0);
        controller.seek(f64::NAN);
        assert_eq!(transport.seeks(), vec![0.0, 3000.0, 0.0]);

        controller.play();
        controller.on_time_update(995.0);
        controller.on_seeked();
        controller.seek(990.0);
        controller.on_time_update(995.0);
        assert_eq!(transport.seeks(), vec![0.0, 3000.0, 0.0, 2000.0, 990.0, 2000.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn raw_preview_plays_through_disabled_regions() {
        let store = three_segments();
        let (controller, transport) = attached(&store);
        controller.set_gapless(false);
        controller.play();
        controller.on_time_update(995.0);
        controller.on_time_update(1500.0);
        assert!(transport.seeks().is_empty());
        assert!(!controller.snapshot().gapless);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshots_are_published() {
        let store = three_segments();
        let (controller, _transport) = attached(&store);
        let mut rx = controller.subscribe();
        let _ = rx.borrow_and_update();

        controller.play();
        controller.on_time_update(995.0);
        assert!(rx.has_changed().unwrap());
        let snapshot = *rx.borrow_and_update();
        assert!(snapshot.is_playing);
        assert!(snapshot.is_transitioning);
        assert_eq!(snapshot.current_time_ms, 2000.0);
    }

    #[tokio::test(start_paused = true)]
    async fn frame_clock_feeds_time_updates() {
        let store = three_segments();
        let (controller, transport) = attached(&store);
        controller.start_frame_clock();
        controller.play();

        transport.set_time(995.0);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(transport.seeks(), vec![2000.0]);

        controller.stop_frame_clock();
        controller.on_seeked();
        transport.set_time(2995.0);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(transport.pauses(), 0);
    }
}
