use std::sync::Arc;

use parking_lot::Mutex;

use super::transport::{MediaTransport, TransportError};

#[derive(Debug, Default)]
struct FakeState {
    current_ms: f64,
    duration_ms: f64,
    playing: bool,
    detached: bool,
    seeks: Vec<f64>,
    plays: usize,
    pauses: usize,
}

/// Media element stand-in that records every request.
#[derive(Debug, Default)]
pub struct FakeTransport {
    state: Mutex<FakeState>,
}

impl FakeTransport {
    pub fn new(duration_ms: f64) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                duration_ms,
                ..FakeState::default()
            }),
        })
    }

    pub fn set_time(&self, ms: f64) {
        self.state.lock().current_ms = ms;
    }

    /// Every further call fails with `Detached`.
    pub fn detach(&self) {
        self.state.lock().detached = true;
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.state.lock().seeks.clone()
    }

    pub fn plays(&self) -> usize {
        self.state.lock().plays
    }

    pub fn pauses(&self) -> usize {
        self.state.lock().pauses
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn attached(&self) -> Result<parking_lot::MutexGuard<'_, FakeState>, TransportError> {
        let guard = self.state.lock();
        if guard.detached {
            Err(TransportError::Detached)
        } else {
            Ok(guard)
        }
    }
}

impl MediaTransport for FakeTransport {
    fn play(&self) -> Result<(), TransportError> {
        let mut state = self.attached()?;
        state.playing = true;
        state.plays += 1;
        Ok(())
    }

    fn pause(&self) -> Result<(), TransportError> {
        let mut state = self.attached()?;
        state.playing = false;
        state.pauses += 1;
        Ok(())
    }

    fn seek(&self, original_ms: f64) -> Result<(), TransportError> {
        let mut state = self.attached()?;
        state.current_ms = original_ms;
        state.seeks.push(original_ms);
        Ok(())
    }

    fn current_time_ms(&self) -> Result<f64, TransportError> {
        Ok(self.attached()?.current_ms)
    }

    fn duration_ms(&self) -> Result<f64, TransportError> {
        Ok(self.attached()?.duration_ms)
    }
}
