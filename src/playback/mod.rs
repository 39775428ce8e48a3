//! Gapless playback: drives a media element that only knows original time
//! so that disabled segments are skipped without a visible stop.

mod controller;
pub mod jump;
pub mod lookahead;
mod state;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::PlaybackController;
pub use jump::JumpGate;
pub use lookahead::{plan_start, plan_tick, StartAction, TickAction};
pub use state::{PlaybackSnapshot, PlaybackState};
pub use transport::{MediaEvent, MediaTransport, TransportError};
