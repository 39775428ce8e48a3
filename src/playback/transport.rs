use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The element behind the transport is gone (unmounted, swapped).
    #[error("media element is no longer attached")]
    Detached,
    #[error("media element refused the request: {0}")]
    Refused(String),
}

/// Outbound capabilities of a media element, in original time.
///
/// Implementations are expected to return quickly; a seek only starts the
/// operation and completion is reported back through
/// [`PlaybackController::on_seeked`](super::PlaybackController::on_seeked).
pub trait MediaTransport: Send + Sync {
    fn play(&self) -> Result<(), TransportError>;
    fn pause(&self) -> Result<(), TransportError>;
    fn seek(&self, original_ms: f64) -> Result<(), TransportError>;
    fn current_time_ms(&self) -> Result<f64, TransportError>;
    fn duration_ms(&self) -> Result<f64, TransportError>;
}

/// Inbound notifications from the media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    TimeUpdate(f64),
    Seeked,
    Playing,
    Paused,
    Ended,
}
