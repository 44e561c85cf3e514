//! # Playback Module
//!
//! Concurrent, cancellable, time-accurate rendering of a parsed [`Sheet`](crate::Sheet).
//!
//! ## Sub-modules
//! - `cancel` - [`CancellationToken`] polled at every suspension point
//! - `renderer` - [`ToneRenderer`] seam and the backend-free [`LoggingRenderer`]
//! - `engine` - [`Scheduler`]: per-track cursors, look-ahead throttle, chord fan-out
//! - `types` - [`ToneRequest`], [`TrackReport`], [`PlaybackReport`]
//!
//! ## Timing Model
//!
//! All tracks share one origin captured when `play` starts. Each track owns a
//! virtual cursor that advances by note durations, independent of when tones
//! actually finish. The cursor may lead the real clock by at most the
//! look-ahead horizon (5 s by default); past that the track waits in
//! throttle ticks (1 s by default).
//!
//! ```text
//! origin ──► note 1 ──► note 2 ──► ... ──► last note ──► join tones ──► TrackReport
//!             │ fan-out per pitch (C4+E4+G4 = 3 tones, same start)
//!             ▼
//!        ToneRenderer::render_tone(request, cancel)
//! ```
//!
//! ## Cancellation
//! Cancelling the token stops every track at its next check (at most one
//! throttle tick later) and tells in-flight tones to stop. `play` still
//! returns a normal report.

mod cancel;
mod engine;
mod renderer;
mod types;


pub use cancel::CancellationToken;
pub use engine::Scheduler;
pub use renderer::{LoggingRenderer, ToneCompletion, ToneRenderer};
pub use types::{PlaybackReport, ToneRequest, TrackReport};
