//! # Playback Session
//!
//! A [`Session`] bundles everything a playback needs: the tone renderer, the
//! master output bus and the scheduler configuration. Callers construct one
//! and thread it through; there is no process-wide audio state, so several
//! independent sessions can coexist (and tests run without an audio device).
//!
//! ## Master Volume
//! Every tone is mixed into the session's [`MasterBus`]. Its gain is
//! `clamp(volume, 0, 1) / 10`, leaving headroom for chords and concurrent
//! tracks summing many oscillators. A fresh bus starts at volume 1 (gain 0.1).
//!
//! ## Example
//! ```rust
//! use scriptune::{LoggingRenderer, Session};
//!
//! let session = Session::new(LoggingRenderer);
//! session.set_master_volume(2.0);
//! assert_eq!(session.master_volume(), 1.0);
//! assert!((session.master_gain() - 0.1).abs() < 1e-6);
//! ```

use crate::ast::Sheet;
use crate::config::PlaybackConfig;
use crate::error::ScriptuneError;
use crate::parser::parse;
use crate::playback::{CancellationToken, PlaybackReport, Scheduler, ToneRenderer};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Fixed attenuation applied on top of the master volume.
pub const MASTER_ATTENUATION: f32 = 10.0;

/// Shared output gain. Clones refer to the same bus; last writer wins.
#[derive(Debug, Clone)]
pub struct MasterBus {
    volume_bits: Arc<AtomicU32>,
}

impl Default for MasterBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MasterBus {
    pub fn new() -> Self {
        Self {
            volume_bits: Arc::new(AtomicU32::new(1.0f32.to_bits())),
        }
    }

    /// Set the pre-attenuation volume, clamped to 0..1.
    pub fn set_volume(&self, value: f32) {
        // NaN would poison every tone's gain; treat it as silence
        let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        self.volume_bits.store(clamped.to_bits(), Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
    }

    /// Effective gain applied to every tone.
    pub fn gain(&self) -> f32 {
        self.volume() / MASTER_ATTENUATION
    }
}

/// A playback session: renderer, master bus and scheduler settings.
pub struct Session {
    renderer: Arc<dyn ToneRenderer>,
    master: MasterBus,
    config: PlaybackConfig,
}

impl Session {
    pub fn new(renderer: impl ToneRenderer + 'static) -> Self {
        Self::from_shared(Arc::new(renderer))
    }

    pub fn from_shared(renderer: Arc<dyn ToneRenderer>) -> Self {
        Self {
            renderer,
            master: MasterBus::new(),
            config: PlaybackConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PlaybackConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn master(&self) -> &MasterBus {
        &self.master
    }

    pub fn set_master_volume(&self, value: f32) {
        self.master.set_volume(value);
        debug!(volume = self.master.volume(), gain = self.master.gain(), "master volume set");
    }

    pub fn master_volume(&self) -> f32 {
        self.master.volume()
    }

    pub fn master_gain(&self) -> f32 {
        self.master.gain()
    }

    fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.renderer.clone(), self.master.clone(), self.config.clone())
    }

    /// Parse `text` and play it. Nothing is played if the sheet fails to parse.
    pub async fn play(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<PlaybackReport, ScriptuneError> {
        let sheet = parse(text)?;
        Ok(self.play_sheet(sheet, cancel).await)
    }

    /// Play an already parsed sheet.
    pub async fn play_sheet(&self, sheet: Sheet, cancel: &CancellationToken) -> PlaybackReport {
        self.scheduler().play(sheet, cancel).await
    }
}
