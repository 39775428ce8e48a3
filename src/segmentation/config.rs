use serde::{Deserialize, Serialize};

/// Thresholds for proposing segments from detected silences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SegmentationConfig {
    /// Silences shorter than this do not split speech.
    pub min_silence_ms: f64,

    /// Speech kept on each side of a cut so words are not clipped.
    pub padding_ms: f64,

    /// Neighbouring proposals closer than this are merged into one.
    pub merge_gap_ms: f64,

    /// Proposals shorter than this are kept but start disabled.
    pub min_segment_ms: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_silence_ms: 400.0,
            padding_ms: 120.0,
            merge_gap_ms: 250.0,
            min_segment_ms: 600.0,
        }
    }
}
