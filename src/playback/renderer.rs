//! Tone renderer seam.
//!
//! The scheduler never produces sound itself. For every pitch of every note it
//! calls a [`ToneRenderer`], which must:
//! 1. become audible at `request.start`
//! 2. stop by itself after `request.duration`
//! 3. stop immediately when the cancellation token fires
//! 4. resolve its completion exactly once either way
//!
//! [`LoggingRenderer`] follows that contract without an audio backend and
//! reports each tone through `tracing`.

use super::cancel::CancellationToken;
use super::types::ToneRequest;
use crate::error::RenderError;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info};

/// Completion of a single tone.
pub type ToneCompletion = Pin<Box<dyn Future<Output = Result<(), RenderError>> + Send + 'static>>;

/// Produces sound for one pitch.
pub trait ToneRenderer: Send + Sync {
    fn render_tone(&self, request: ToneRequest, cancel: CancellationToken) -> ToneCompletion;
}

/// Renderer that times tones on the tokio clock and logs them instead of
/// driving an oscillator.
#[derive(Debug, Clone, Default)]
pub struct LoggingRenderer;

impl ToneRenderer for LoggingRenderer {
    fn render_tone(&self, request: ToneRequest, cancel: CancellationToken) -> ToneCompletion {
        Box::pin(async move {
            if !cancel.sleep_until(request.start).await {
                debug!(frequency = request.frequency, "tone cancelled before start");
                return Ok(());
            }

            if !request.is_rest() {
                info!(
                    frequency = request.frequency,
                    duration_ms = request.duration.as_millis() as u64,
                    timbre = request.timbre.as_str(),
                    pan = request.pan,
                    gain = request.volume * request.master.gain(),
                    "tone"
                );
            }

            if !cancel.sleep_until(request.end()).await {
                debug!(frequency = request.frequency, "tone stopped early");
            }
            Ok(())
        })
    }
}
