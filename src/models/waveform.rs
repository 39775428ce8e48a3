use serde::{Deserialize, Serialize};

/// Precomputed peak amplitudes spread evenly over the recording.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Waveform {
    pub peaks: Vec<f32>,
    pub duration_ms: f64,
}

impl Waveform {
    pub fn new(peaks: Vec<f32>, duration_ms: f64) -> Self {
        Self { peaks, duration_ms }
    }

    fn index_at(&self, ms: f64) -> usize {
        let ratio = (ms / self.duration_ms).clamp(0.0, 1.0);
        let last = self.peaks.len().saturating_sub(1);
        ((ratio * self.peaks.len() as f64) as usize).min(last)
    }

    /// Loudest peak within `[start_ms, end_ms)`, at least the sample under
    /// `start_ms`. Zero outside the recording.
    pub fn peak_between(&self, start_ms: f64, end_ms: f64) -> f32 {
        if self.peaks.is_empty()
            || !(self.duration_ms > 0.0)
            || start_ms.is_nan()
            || start_ms >= self.duration_ms
            || end_ms <= 0.0
        {
            return 0.0;
        }
        let first = self.index_at(start_ms);
        let last = self.index_at(end_ms).max(first);
        self.peaks[first..=last]
            .iter()
            .fold(0.0_f32, |peak, sample| peak.max(sample.abs()))
    }
}
