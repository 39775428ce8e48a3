//! Conversion between original time (position in the source recording) and
//! gapless time (position with disabled regions cut out).
//!
//! Everything here is pure and total: degenerate or out-of-range input is
//! clamped, never rejected.

use crate::models::Segment;

/// One enabled region and where it lands on the gapless timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start_ms: f64,
    pub end_ms: f64,
    /// Gapless position of `start_ms`.
    pub offset_ms: f64,
}

impl Span {
    pub fn len_ms(&self) -> f64 {
        (self.end_ms - self.start_ms).max(0.0)
    }

    pub fn gapless_end_ms(&self) -> f64 {
        self.offset_ms + self.len_ms()
    }

    fn contains(&self, original_ms: f64) -> bool {
        original_ms >= self.start_ms && original_ms < self.end_ms
    }
}

/// Enabled segments sorted by start, the derived view every consumer maps through.
pub fn enabled_sorted(segments: &[Segment]) -> Vec<Segment> {
    let mut enabled: Vec<Segment> = segments.iter().filter(|s| s.enabled).cloned().collect();
    enabled.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));
    enabled
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GaplessMap {
    spans: Vec<Span>,
    total_ms: f64,
}

impl GaplessMap {
    /// Builds from segments the caller already filtered to enabled and sorted.
    /// Overlaps are taken as given; non-finite bounds are dropped.
    pub fn new(enabled: &[Segment]) -> Self {
        let mut spans = Vec::with_capacity(enabled.len());
        let mut offset_ms = 0.0;

        for segment in enabled {
            if !segment.start_ms.is_finite() || !segment.end_ms.is_finite() {
                continue;
            }
            let span = Span {
                start_ms: segment.start_ms,
                end_ms: segment.end_ms,
                offset_ms,
            };
            offset_ms += span.len_ms();
            spans.push(span);
        }

        Self {
            spans,
            total_ms: offset_ms,
        }
    }

    /// Filters to enabled, sorts, then builds.
    pub fn from_segments(segments: &[Segment]) -> Self {
        Self::new(&enabled_sorted(segments))
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn gapless_duration_ms(&self) -> f64 {
        self.total_ms
    }

    pub fn original_to_gapless(&self, original_ms: f64) -> f64 {
        let Some(first) = self.spans.first() else {
            return 0.0;
        };
        if original_ms.is_nan() || original_ms < first.start_ms {
            return 0.0;
        }

        let mut preceding_end = 0.0;
        for span in &self.spans {
            if original_ms < span.start_ms {
                // In the gap before this span: stick to the last valid position.
                return preceding_end;
            }
            if original_ms < span.end_ms {
                return span.offset_ms + (original_ms - span.start_ms);
            }
            preceding_end = span.gapless_end_ms();
        }

        self.total_ms
    }

    /// The gapless instant at a cut resolves to the end of the preceding span.
    pub fn gapless_to_original(&self, gapless_ms: f64) -> f64 {
        let (Some(first), Some(last)) = (self.spans.first(), self.spans.last()) else {
            return 0.0;
        };
        if gapless_ms.is_nan() || gapless_ms <= 0.0 {
            return first.start_ms;
        }

        for span in &self.spans {
            if gapless_ms <= span.gapless_end_ms() {
                return span.start_ms + (gapless_ms - span.offset_ms);
            }
        }

        last.end_ms
    }

    /// Index of the first span containing `original_ms` (half-open).
    pub fn span_at(&self, original_ms: f64) -> Option<usize> {
        self.spans.iter().position(|span| span.contains(original_ms))
    }

    /// First span starting strictly after `original_ms`.
    pub fn next_span_after(&self, original_ms: f64) -> Option<&Span> {
        self.spans.iter().find(|span| span.start_ms > original_ms)
    }

    /// First span starting at or after `original_ms`.
    pub fn next_span_from(&self, original_ms: f64) -> Option<&Span> {
        self.spans.iter().find(|span| span.start_ms >= original_ms)
    }

    pub fn first_span(&self) -> Option<&Span> {
        self.spans.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: &str, start_ms: f64, end_ms: f64, enabled: bool) -> Segment {
        Segment::new(id, start_ms, end_ms, enabled)
    }

    fn three_part() -> Vec<Segment> {
        vec![
            segment("a", 0.0, 1000.0, true),
            segment("b", 1000.0, 2000.0, false),
            segment("c", 2000.0, 3000.0, true),
        ]
    }

    #[test]
    fn scenario_with_one_disabled_segment() {
        let map = GaplessMap::from_segments(&three_part());
        assert_eq!(map.gapless_duration_ms(), 2000.0);
        assert_eq!(map.original_to_gapless(2500.0), 1500.0);
        assert_eq!(map.gapless_to_original(1500.0), 2500.0);
    }

    #[test]
    fn empty_map_maps_everything_to_zero() {
        let map = GaplessMap::from_segments(&[segment("a", 0.0, 1000.0, false)]);
        assert!(map.is_empty());
        assert_eq!(map.gapless_duration_ms(), 0.0);
        for t in [-5.0, 0.0, 500.0, 1e9, f64::NAN, f64::INFINITY] {
            assert_eq!(map.original_to_gapless(t), 0.0);
            assert_eq!(map.gapless_to_original(t), 0.0);
        }
    }

    #[test]
    fn round_trip_inside_enabled_segments() {
        let segments = vec![
            segment("a", 200.0, 1200.0, true),
            segment("b", 1500.0, 1700.0, true),
            segment("c", 4000.0, 6500.0, true),
        ];
        let map = GaplessMap::new(&segments);
        for t in [200.0, 700.5, 1199.0, 1500.5, 1650.0, 4000.1, 6000.0, 6499.0] {
            let back = map.gapless_to_original(map.original_to_gapless(t));
            assert!((back - t).abs() < 1e-9, "round trip of {t} gave {back}");
        }
    }

    #[test]
    fn gap_positions_clamp_to_preceding_segment_end() {
        let map = GaplessMap::from_segments(&three_part());
        let gapless = map.original_to_gapless(1500.0);
        assert_eq!(gapless, 1000.0);
        assert_eq!(map.gapless_to_original(gapless), 1000.0);
    }

    #[test]
    fn before_first_and_after_last_clamp() {
        let map = GaplessMap::new(&[segment("a", 500.0, 1500.0, true)]);
        assert_eq!(map.original_to_gapless(100.0), 0.0);
        assert_eq!(map.original_to_gapless(9000.0), 1000.0);
        assert_eq!(map.gapless_to_original(-40.0), 500.0);
        assert_eq!(map.gapless_to_original(5000.0), 1500.0);
        assert_eq!(map.original_to_gapless(f64::INFINITY), 1000.0);
    }

    #[test]
    fn duration_ignores_disabled_segments() {
        let segments = vec![
            segment("a", 0.0, 400.0, true),
            segment("b", 400.0, 5000.0, false),
            segment("c", 5000.0, 5600.0, true),
            segment("d", 7000.0, 9000.0, false),
        ];
        let map = GaplessMap::from_segments(&segments);
        assert_eq!(map.gapless_duration_ms(), 1000.0);
    }

    #[test]
    fn from_segments_sorts_by_start() {
        let segments = vec![
            segment("late", 3000.0, 4000.0, true),
            segment("early", 0.0, 1000.0, true),
        ];
        let map = GaplessMap::from_segments(&segments);
        assert_eq!(map.spans()[0].start_ms, 0.0);
        assert_eq!(map.original_to_gapless(3500.0), 1500.0);
    }

    #[test]
    fn overlapping_segments_do_not_panic() {
        let segments = vec![
            segment("a", 0.0, 1500.0, true),
            segment("b", 1000.0, 2000.0, true),
            segment("c", 1800.0, 1700.0, true),
        ];
        let map = GaplessMap::new(&segments);
        assert_eq!(map.gapless_duration_ms(), 2500.0);
        for t in [-1.0, 0.0, 1200.0, 1750.0, 1999.0, 2500.0] {
            let g = map.original_to_gapless(t);
            assert!(g.is_finite());
            assert!(map.gapless_to_original(g).is_finite());
        }
    }

    #[test]
    fn span_lookup_helpers() {
        let map = GaplessMap::from_segments(&three_part());
        assert_eq!(map.span_at(999.0), Some(0));
        assert_eq!(map.span_at(1000.0), None);
        assert_eq!(map.span_at(2000.0), Some(1));
        assert_eq!(map.next_span_after(1000.0).map(|s| s.start_ms), Some(2000.0));
        assert_eq!(map.next_span_from(2000.0).map(|s| s.start_ms), Some(2000.0));
        assert!(map.next_span_after(2000.0).is_none());
    }
}
