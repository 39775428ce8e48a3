use std::{path::PathBuf, sync::Arc};

use anyhow::Result;

use crate::{
    playback::{MediaTransport, PlaybackController},
    preselection::{self, ImportReport, NoticeBoard, PreselectionSource},
    segmentation::propose_segments,
    settings::SettingsStore,
    store::SegmentStore,
    timeline::TimelineView,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Everything the editor needs for one open media item.
pub struct EditorSession {
    video_id: String,
    settings: Arc<SettingsStore>,
    store: SegmentStore,
    notices: NoticeBoard,
    playback: PlaybackController,
    timeline: TimelineView,
}

impl EditorSession {
    pub fn new(
        video_id: impl Into<String>,
        settings: Arc<SettingsStore>,
        store: SegmentStore,
        media_duration_ms: f64,
        width_px: f64,
    ) -> Self {
        let video_id = video_id.into();
        let playback = PlaybackController::new(store.clone(), video_id.clone(), settings.playback());
        let timeline = TimelineView::new(
            store.clone(),
            playback.clone(),
            media_duration_ms,
            width_px,
            settings.follow(),
        );

        Self {
            video_id,
            settings,
            store,
            notices: NoticeBoard::new(),
            playback,
            timeline,
        }
    }

    /// Opens a session with settings loaded from `settings_path`.
    pub fn open(
        settings_path: PathBuf,
        video_id: impl Into<String>,
        media_duration_ms: f64,
        width_px: f64,
    ) -> Result<Self> {
        let settings = Arc::new(SettingsStore::new(settings_path)?);
        Ok(Self::new(
            video_id,
            settings,
            SegmentStore::new(),
            media_duration_ms,
            width_px,
        ))
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn timeline(&self) -> &TimelineView {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut TimelineView {
        &mut self.timeline
    }

    /// Binds a (new) media element; the timeline takes its duration when the
    /// element reports one.
    pub fn attach_media(&self, transport: Arc<dyn MediaTransport>) {
        if let Ok(duration_ms) = transport.duration_ms() {
            if duration_ms.is_finite() && duration_ms > 0.0 {
                self.timeline.set_media_duration(duration_ms);
            }
        }
        self.playback.attach(transport);
    }

    pub fn detach_media(&self) {
        self.playback.detach();
    }

    pub fn mount(&mut self) -> Result<()> {
        self.timeline.mount()
    }

    /// Unmounts the timeline and releases the media element.
    pub fn close(&mut self) {
        self.timeline.unmount();
        self.playback.detach();
        log_info!("session for {} closed", self.video_id);
    }

    pub async fn run_preselection<S: PreselectionSource>(&self, source: &S) -> Result<ImportReport> {
        preselection::run_preselection(source, &self.store, &self.notices, &self.video_id).await
    }

    /// Replaces the segment set with proposals cut at the detected silences.
    pub fn propose_from_silences(&self) -> usize {
        let silences = self.store.silences_for(&self.video_id);
        let duration_ms = self.timeline.surface().media_duration_ms;
        let config = self.settings.get().segmentation;

        let proposals = propose_segments(duration_ms, &silences, &config);
        let count = self.store.replace_segments(&self.video_id, proposals);
        log_info!(
            "proposed {count} segments from {} silences for {}",
            silences.len(),
            self.video_id
        );
        count
    }
}
