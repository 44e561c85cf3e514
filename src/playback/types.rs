//! Playback type definitions
//!
//! Requests handed to the tone renderer and the reports the scheduler returns
//! once a sheet has finished (or been cancelled).

use crate::ast::Timbre;
use crate::session::MasterBus;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

/// Everything a renderer needs to sound one pitch of one note.
///
/// # Fields
/// - `frequency`: Hz, `0.0` for a rest (silent for `duration`)
/// - `start`: when the tone should become audible; may be in the near future
/// - `master`: the session's output bus; renderers scale by `master.gain()`
#[derive(Debug, Clone)]
pub struct ToneRequest {
    pub frequency: f32,
    pub duration: Duration,
    pub timbre: Timbre,
    pub pan: f32,
    pub volume: f32,
    pub start: Instant,
    pub master: MasterBus,
}

impl ToneRequest {
    pub fn is_rest(&self) -> bool {
        self.frequency == 0.0
    }

    pub fn end(&self) -> Instant {
        self.start + self.duration
    }
}

/// Outcome of one track
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackReport {
    pub name: String,
    pub notes_scheduled: usize,
    pub tones_completed: usize,
    pub tones_failed: usize,
    pub cancelled: bool,
}

impl TrackReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Outcome of a whole `play` call. Tracks are listed in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaybackReport {
    pub tracks: Vec<TrackReport>,
}

impl PlaybackReport {
    pub fn track(&self, name: &str) -> Option<&TrackReport> {
        self.tracks.iter().find(|t| t.name == name)
    }

    pub fn was_cancelled(&self) -> bool {
        self.tracks.iter().any(|t| t.cancelled)
    }

    pub fn notes_scheduled(&self) -> usize {
        self.tracks.iter().map(|t| t.notes_scheduled).sum()
    }

    pub fn tones_failed(&self) -> usize {
        self.tracks.iter().map(|t| t.tones_failed).sum()
    }

    /// Render the report as YAML, as printed by `scriptune play`.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
