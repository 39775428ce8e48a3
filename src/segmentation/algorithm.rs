use log::debug;
use uuid::Uuid;

use crate::models::{Segment, Silence};
use crate::segmentation::{
    config::SegmentationConfig,
    merge::{merge_close_ranges, ProposedRange},
};

/// Proposes candidate segments covering the speech between silences.
///
/// Every proposal is returned; ones shorter than `min_segment_ms` start
/// disabled so the user can still enable them from the timeline.
pub fn propose_segments(
    duration_ms: f64,
    silences: &[Silence],
    config: &SegmentationConfig,
) -> Vec<Segment> {
    if !(duration_ms > 0.0) || !duration_ms.is_finite() {
        return Vec::new();
    }

    let speech = speech_ranges(duration_ms, silences, config.min_silence_ms);

    let padded: Vec<ProposedRange> = speech
        .into_iter()
        .map(|range| {
            ProposedRange::new(
                (range.start_ms - config.padding_ms).max(0.0),
                (range.end_ms + config.padding_ms).min(duration_ms),
            )
        })
        .collect();

    let merge_result = merge_close_ranges(padded, config.merge_gap_ms);
    debug!(
        "proposed {} segments ({} merged) over {duration_ms:.0}ms",
        merge_result.ranges.len(),
        merge_result.merged
    );

    merge_result
        .ranges
        .into_iter()
        .filter(|range| range.duration_ms() > 0.0)
        .map(|range| {
            Segment::new(
                Uuid::new_v4().to_string(),
                range.start_ms,
                range.end_ms,
                range.duration_ms() >= config.min_segment_ms,
            )
        })
        .collect()
}

/// Complement of the significant silences within `[0, duration_ms)`.
fn speech_ranges(duration_ms: f64, silences: &[Silence], min_silence_ms: f64) -> Vec<ProposedRange> {
    let mut cuts: Vec<ProposedRange> = silences
        .iter()
        .filter(|s| s.start_ms.is_finite() && s.end_ms.is_finite())
        .filter(|s| s.duration_ms() >= min_silence_ms)
        .map(|s| ProposedRange::new(s.start_ms.max(0.0), s.end_ms.min(duration_ms)))
        .filter(|r| r.duration_ms() > 0.0)
        .collect();
    cuts.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));

    let mut ranges = Vec::new();
    let mut cursor = 0.0_f64;
    for cut in cuts {
        if cut.start_ms > cursor {
            ranges.push(ProposedRange::new(cursor, cut.start_ms));
        }
        cursor = cursor.max(cut.end_ms);
    }
    if cursor < duration_ms {
        ranges.push(ProposedRange::new(cursor, duration_ms));
    }
    ranges
}
