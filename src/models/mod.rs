pub mod preselection;
pub mod segment;
pub mod selection;
pub mod waveform;

pub use preselection::{
    PreselectedSegment, PreselectionResult, PreselectionSummary, PreselectionWarning,
    ProposedSplit,
};
pub use segment::{Classification, ContentType, Segment, SegmentEdge, Silence};
pub use selection::Selection;
pub use waveform::Waveform;
