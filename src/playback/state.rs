use serde::Serialize;

use super::jump::JumpGate;

/// Live values published to the host after every change.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub current_time_ms: f64,
    pub is_playing: bool,
    /// A lookahead jump is in flight; hosts suppress playhead transitions.
    pub is_transitioning: bool,
    pub gapless: bool,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            current_time_ms: 0.0,
            is_playing: false,
            is_transitioning: false,
            gapless: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackState {
    /// Last known playhead, original time.
    pub current_time_ms: f64,
    pub is_playing: bool,
    /// When off, disabled regions play like everything else.
    pub gapless: bool,
    pub gate: JumpGate,
    /// Segment revision of the media item the jump memory was built against.
    pub seen_revision: u64,
}

impl PlaybackState {
    pub fn new(jump_tolerance_ms: f64, gapless: bool) -> Self {
        Self {
            current_time_ms: 0.0,
            is_playing: false,
            gapless,
            gate: JumpGate::new(jump_tolerance_ms),
            seen_revision: 0,
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_time_ms: self.current_time_ms,
            is_playing: self.is_playing,
            is_transitioning: self.gate.is_in_flight(),
            gapless: self.gapless,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_camel_case() {
        let mut state = PlaybackState::new(50.0, true);
        state.current_time_ms = 1250.0;
        state.gate.try_begin(2000.0);

        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["currentTimeMs"], 1250.0);
        assert_eq!(json["isTransitioning"], true);
        assert_eq!(json["isPlaying"], false);
    }
}
