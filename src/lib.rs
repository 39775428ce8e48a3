//! Segment timeline view-model and gapless preview playback for the reelcut
//! editor. The desktop shell feeds media-element events in and draws the
//! frames this crate produces.

pub mod follow;
pub mod models;
pub mod playback;
pub mod preselection;
pub mod segmentation;
pub mod session;
pub mod settings;
pub mod store;
pub mod timeline;
pub mod timemap;
mod utils;
pub mod viewport;

pub use follow::{FollowController, FollowMode};
pub use models::{
    ContentType, PreselectionResult, Segment, SegmentEdge, Selection, Silence, Waveform,
};
pub use playback::{
    MediaEvent, MediaTransport, PlaybackController, PlaybackSnapshot, TransportError,
};
pub use preselection::{Notice, NoticeBoard, NoticeLevel, PreselectionSource};
pub use session::EditorSession;
pub use settings::{SettingsStore, TimelineSettings};
pub use store::{EditRejected, SegmentStore};
pub use timeline::{TimelineFrame, TimelineMode, TimelineView, WheelInput};
pub use timemap::GaplessMap;
pub use viewport::Viewport;

/// Initialises `env_logger` at info level; `RUST_LOG` overrides. Safe to
/// call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
