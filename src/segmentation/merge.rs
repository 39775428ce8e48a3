/// A candidate region before it becomes a `Segment`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProposedRange {
    pub start_ms: f64,
    pub end_ms: f64,
}

impl ProposedRange {
    pub fn new(start_ms: f64, end_ms: f64) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn duration_ms(&self) -> f64 {
        (self.end_ms - self.start_ms).max(0.0)
    }
}

/// Result of gap merging: surviving ranges and how many joins happened.
pub struct GapMergeResult {
    pub ranges: Vec<ProposedRange>,
    pub merged: usize,
}

/// Joins start-sorted ranges whose gap is at most `max_gap_ms`. Overlapping
/// ranges (negative gap) always join.
pub fn merge_close_ranges(ranges: Vec<ProposedRange>, max_gap_ms: f64) -> GapMergeResult {
    let mut result: Vec<ProposedRange> = Vec::with_capacity(ranges.len());
    let mut merged = 0;

    for range in ranges {
        match result.last_mut() {
            Some(previous) if range.start_ms - previous.end_ms <= max_gap_ms => {
                previous.end_ms = previous.end_ms.max(range.end_ms);
                merged += 1;
            }
            _ => result.push(range),
        }
    }

    GapMergeResult {
        ranges: result,
        merged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_short_gaps_and_overlaps() {
        let ranges = vec![
            ProposedRange::new(0.0, 1000.0),
            ProposedRange::new(1100.0, 2000.0),
            ProposedRange::new(1900.0, 2500.0),
            ProposedRange::new(4000.0, 5000.0),
        ];
        let result = merge_close_ranges(ranges, 250.0);
        assert_eq!(result.merged, 2);
        assert_eq!(
            result.ranges,
            vec![
                ProposedRange::new(0.0, 2500.0),
                ProposedRange::new(4000.0, 5000.0)
            ]
        );
    }

    #[test]
    fn empty_input() {
        let result = merge_close_ranges(Vec::new(), 100.0);
        assert!(result.ranges.is_empty());
        assert_eq!(result.merged, 0);
    }
}
