pub mod algorithm;
pub mod config;
pub mod merge;

pub use algorithm::propose_segments;
pub use config::SegmentationConfig;
