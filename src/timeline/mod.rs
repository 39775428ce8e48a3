//! Timeline composition: surface state shared with the follow ticker,
//! gesture handling, and the per-frame render model.

pub mod frame;
pub mod gestures;
pub mod surface;
mod view;

pub use frame::{
    build_frame, FrameInput, PlayheadMarker, ScrollbarThumb, SegmentBlock, SilenceBlock,
    TimelineFrame,
};
pub use gestures::WheelInput;
pub use surface::{SharedSurface, TimelineMode, TimelineSurface};
pub use view::TimelineView;
