use serde::{Deserialize, Serialize};

use super::preselection::ProposedSplit;

/// Content classes assigned by AI preselection. Carried on segments for the
/// editor panel; the timeline core never branches on them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    BestTake,
    AlternativeTake,
    FalseStart,
    OffScript,
    Transition,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::BestTake => "best_take",
            ContentType::AlternativeTake => "alternative_take",
            ContentType::FalseStart => "false_start",
            ContentType::OffScript => "off_script",
            ContentType::Transition => "transition",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub score: Option<f64>,
    pub reason: Option<String>,
    pub content_type: Option<ContentType>,
    pub take_group: Option<String>,
    #[serde(default)]
    pub covers_script_lines: Vec<u32>,
    #[serde(default)]
    pub proposed_splits: Vec<ProposedSplit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub start_ms: f64,
    pub end_ms: f64,
    pub enabled: bool,
    #[serde(default)]
    pub classification: Option<Classification>,
}

impl Segment {
    pub fn new(id: impl Into<String>, start_ms: f64, end_ms: f64, enabled: bool) -> Self {
        Self {
            id: id.into(),
            start_ms,
            end_ms,
            enabled,
            classification: None,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        (self.end_ms - self.start_ms).max(0.0)
    }

    /// Half-open containment: the end instant belongs to whatever follows.
    pub fn contains(&self, ms: f64) -> bool {
        ms >= self.start_ms && ms < self.end_ms
    }

    pub fn is_valid_range(&self) -> bool {
        self.start_ms.is_finite()
            && self.end_ms.is_finite()
            && self.start_ms >= 0.0
            && self.start_ms < self.end_ms
    }

    pub fn content_type(&self) -> Option<ContentType> {
        self.classification.as_ref().and_then(|c| c.content_type)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Silence {
    pub start_ms: f64,
    pub end_ms: f64,
}

impl Silence {
    pub fn new(start_ms: f64, end_ms: f64) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn duration_ms(&self) -> f64 {
        (self.end_ms - self.start_ms).max(0.0)
    }
}

/// Which boundary of a segment a resize drags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SegmentEdge {
    StartMs,
    EndMs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&ContentType::FalseStart).unwrap();
        assert_eq!(json, "\"false_start\"");
        assert_eq!(ContentType::FalseStart.as_str(), "false_start");
    }

    #[test]
    fn segment_deserializes_without_classification() {
        let segment: Segment = serde_json::from_str(
            r#"{"id":"a","startMs":100.0,"endMs":900.0,"enabled":false}"#,
        )
        .unwrap();
        assert_eq!(segment.id, "a");
        assert!(!segment.enabled);
        assert!(segment.classification.is_none());
        assert_eq!(segment.duration_ms(), 800.0);
    }

    #[test]
    fn containment_is_half_open() {
        let segment = Segment::new("a", 1000.0, 2000.0, true);
        assert!(segment.contains(1000.0));
        assert!(segment.contains(1999.9));
        assert!(!segment.contains(2000.0));
    }

    #[test]
    fn inverted_range_is_invalid() {
        assert!(!Segment::new("a", 500.0, 500.0, true).is_valid_range());
        assert!(!Segment::new("a", f64::NAN, 500.0, true).is_valid_range());
        assert!(Segment::new("a", 0.0, 1.0, true).is_valid_range());
    }
}
