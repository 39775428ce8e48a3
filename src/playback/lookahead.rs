use crate::timemap::GaplessMap;

/// What a playback tick should do at the current original-time position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickAction {
    Continue,
    JumpTo(f64),
    /// End of the enabled content.
    Pause,
}

/// What a user-initiated play should do before the element starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartAction {
    PlayHere,
    SeekThenPlay(f64),
    NothingToPlay,
}

/// Edge-triggered lookahead: jump when the current span ends within
/// `lookahead_ms`, or immediately when sitting in a gap.
pub fn plan_tick(map: &GaplessMap, position_ms: f64, lookahead_ms: f64) -> TickAction {
    if map.is_empty() {
        return TickAction::Pause;
    }

    match map.span_at(position_ms) {
        Some(index) => {
            let span = map.spans()[index];
            if span.end_ms - position_ms > lookahead_ms {
                return TickAction::Continue;
            }
            // Adjacent or overlapping enabled content plays straight through.
            if map.span_at(span.end_ms).is_some() {
                return TickAction::Continue;
            }
            match map.next_span_from(span.end_ms) {
                Some(next) => TickAction::JumpTo(next.start_ms),
                None => TickAction::Pause,
            }
        }
        None => match map.next_span_after(position_ms) {
            Some(next) => TickAction::JumpTo(next.start_ms),
            None => TickAction::Pause,
        },
    }
}

/// Never start inside a disabled region. Starting after all content wraps to
/// the first enabled segment.
pub fn plan_start(map: &GaplessMap, position_ms: f64) -> StartAction {
    let Some(first) = map.first_span() else {
        return StartAction::NothingToPlay;
    };
    if map.span_at(position_ms).is_some() {
        return StartAction::PlayHere;
    }
    match map.next_span_after(position_ms) {
        Some(next) => StartAction::SeekThenPlay(next.start_ms),
        None => StartAction::SeekThenPlay(first.start_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Segment;

    fn map(ranges: &[(f64, f64, bool)]) -> GaplessMap {
        let segments: Vec<Segment> = ranges
            .iter()
            .enumerate()
            .map(|(i, (start, end, enabled))| Segment::new(format!("s{i}"), *start, *end, *enabled))
            .collect();
        GaplessMap::from_segments(&segments)
    }

    #[test]
    fn jumps_just_before_a_cut() {
        let map = map(&[(0.0, 1000.0, true), (1000.0, 2000.0, false), (2000.0, 3000.0, true)]);
        assert_eq!(plan_tick(&map, 500.0, 17.0), TickAction::Continue);
        assert_eq!(plan_tick(&map, 982.0, 17.0), TickAction::Continue);
        assert_eq!(plan_tick(&map, 995.0, 17.0), TickAction::JumpTo(2000.0));
        assert_eq!(plan_tick(&map, 2995.0, 17.0), TickAction::Pause);
    }

    #[test]
    fn gap_positions_jump_forward_or_pause() {
        let map = map(&[(500.0, 1000.0, true), (3000.0, 4000.0, true)]);
        assert_eq!(plan_tick(&map, 0.0, 17.0), TickAction::JumpTo(500.0));
        assert_eq!(plan_tick(&map, 1500.0, 17.0), TickAction::JumpTo(3000.0));
        assert_eq!(plan_tick(&map, 4200.0, 17.0), TickAction::Pause);
    }

    #[test]
    fn adjacent_enabled_segments_play_through() {
        let map = map(&[(0.0, 1000.0, true), (1000.0, 2000.0, true)]);
        assert_eq!(plan_tick(&map, 990.0, 17.0), TickAction::Continue);
        assert_eq!(plan_tick(&map, 1990.0, 17.0), TickAction::Pause);
    }

    #[test]
    fn empty_map_pauses() {
        let map = map(&[(0.0, 1000.0, false)]);
        assert_eq!(plan_tick(&map, 10.0, 17.0), TickAction::Pause);
        assert_eq!(plan_start(&map, 10.0), StartAction::NothingToPlay);
    }

    #[test]
    fn start_positions() {
        let map = map(&[(500.0, 1000.0, true), (3000.0, 4000.0, true)]);
        assert_eq!(plan_start(&map, 700.0), StartAction::PlayHere);
        assert_eq!(plan_start(&map, 0.0), StartAction::SeekThenPlay(500.0));
        assert_eq!(plan_start(&map, 2000.0), StartAction::SeekThenPlay(3000.0));
        assert_eq!(plan_start(&map, 4000.0), StartAction::SeekThenPlay(500.0));
    }
}
