use serde::{Deserialize, Serialize};

use super::segment::{Classification, ContentType, Segment};

/// A split point the classifier suggests inside a segment. Informational.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProposedSplit {
    pub at_ms: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreselectedSegment {
    pub id: String,
    pub start_ms: f64,
    pub end_ms: f64,
    pub enabled: bool,
    pub score: f64,
    pub reason: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub covers_script_lines: Option<Vec<u32>>,
    #[serde(default)]
    pub proposed_splits: Option<Vec<ProposedSplit>>,
    #[serde(default)]
    pub take_group: Option<String>,
}

impl PreselectedSegment {
    pub fn into_segment(self) -> Segment {
        Segment {
            id: self.id,
            start_ms: self.start_ms,
            end_ms: self.end_ms,
            enabled: self.enabled,
            classification: Some(Classification {
                score: Some(self.score),
                reason: Some(self.reason),
                content_type: Some(self.content_type),
                take_group: self.take_group,
                covers_script_lines: self.covers_script_lines.unwrap_or_default(),
                proposed_splits: self.proposed_splits.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreselectionSummary {
    pub total_segments: usize,
    pub selected_segments: usize,
    pub false_starts_detected: usize,
    pub repetitions_detected: usize,
    pub estimated_final_duration_ms: f64,
    #[serde(default)]
    pub covered_script_lines: Vec<u32>,
    #[serde(default)]
    pub missing_script_lines: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreselectionWarning {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub affected_script_lines: Option<Vec<u32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreselectionResult {
    pub segments: Vec<PreselectedSegment>,
    pub summary: PreselectionSummary,
    #[serde(default)]
    pub warnings: Vec<PreselectionWarning>,
}
