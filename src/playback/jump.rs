/// Gate every lookahead jump passes through.
///
/// At most one jump is in flight; a request whose target is within
/// `tolerance_ms` of the previous target is dropped. Each accepted jump gets a
/// sequence number so a late completion or timeout can only release its own
/// jump.
#[derive(Debug, Clone)]
pub struct JumpGate {
    tolerance_ms: f64,
    in_flight: bool,
    last_target_ms: Option<f64>,
    seq: u64,
}

impl JumpGate {
    pub fn new(tolerance_ms: f64) -> Self {
        Self {
            tolerance_ms: tolerance_ms.max(0.0),
            in_flight: false,
            last_target_ms: None,
            seq: 0,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_target_ms(&self) -> Option<f64> {
        self.last_target_ms
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_repeat(&self, target_ms: f64) -> bool {
        self.last_target_ms
            .is_some_and(|last| (last - target_ms).abs() < self.tolerance_ms)
    }

    /// Claims the gate for a jump to `target_ms`; `None` if it must be skipped.
    pub fn try_begin(&mut self, target_ms: f64) -> Option<u64> {
        if self.in_flight || self.is_repeat(target_ms) {
            return None;
        }
        self.seq = self.seq.wrapping_add(1);
        self.in_flight = true;
        self.last_target_ms = Some(target_ms);
        Some(self.seq)
    }

    /// Releases the gate if jump `seq` is the one in flight.
    pub fn complete(&mut self, seq: u64) -> bool {
        if self.in_flight && self.seq == seq {
            self.in_flight = false;
            true
        } else {
            false
        }
    }

    /// Releases whichever jump is in flight.
    pub fn finish(&mut self) -> bool {
        std::mem::replace(&mut self.in_flight, false)
    }

    pub fn forget_target(&mut self) {
        self.last_target_ms = None;
    }

    /// Topology changed: release the guard, forget the last target and
    /// invalidate outstanding completions.
    pub fn reset(&mut self) {
        self.in_flight = false;
        self.last_target_ms = None;
        self.seq = self.seq.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_jump_at_a_time() {
        let mut gate = JumpGate::new(50.0);
        let seq = gate.try_begin(2000.0).unwrap();
        assert!(gate.is_in_flight());
        assert_eq!(gate.try_begin(5000.0), None);
        assert!(gate.complete(seq));
        assert!(gate.try_begin(5000.0).is_some());
    }

    #[test]
    fn repeats_within_tolerance_are_dropped() {
        let mut gate = JumpGate::new(50.0);
        let seq = gate.try_begin(2000.0).unwrap();
        gate.complete(seq);
        assert_eq!(gate.try_begin(2030.0), None);
        assert_eq!(gate.try_begin(1951.0), None);
        assert!(gate.try_begin(2050.0).is_some());
    }

    #[test]
    fn stale_completion_does_not_release_newer_jump() {
        let mut gate = JumpGate::new(50.0);
        let first = gate.try_begin(1000.0).unwrap();
        gate.reset();
        let second = gate.try_begin(3000.0).unwrap();
        assert!(!gate.complete(first));
        assert!(gate.is_in_flight());
        assert!(gate.complete(second));
    }

    #[test]
    fn reset_forgets_last_target() {
        let mut gate = JumpGate::new(50.0);
        gate.try_begin(2000.0).unwrap();
        gate.reset();
        assert!(!gate.is_in_flight());
        assert_eq!(gate.last_target_ms(), None);
        assert!(gate.try_begin(2000.0).is_some());
    }

    #[test]
    fn finish_reports_whether_anything_was_pending() {
        let mut gate = JumpGate::new(50.0);
        assert!(!gate.finish());
        gate.try_begin(10.0).unwrap();
        assert!(gate.finish());
    }
}
