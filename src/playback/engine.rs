//! Playback scheduler
//!
//! Drives every track of a [`Sheet`] concurrently against a shared origin.
//!
//! Per track the scheduler walks a virtual cursor through the notes:
//! - if the cursor is more than the look-ahead horizon past the real clock,
//!   it waits in throttle ticks (returning early on cancellation)
//! - on cancellation it stops scheduling; in-flight tones see the same token
//! - each note fans out one renderer call per pitch, all starting at the cursor
//! - the cursor then advances by the note's duration without waiting for the
//!   tones, so scheduling stays ahead of the audio
//!
//! A track reports once its last fan-out (and anything still ringing) has
//! resolved. `play` resolves when every track has. Dropping the `play` future
//! aborts every track task along with its tones.

use super::cancel::CancellationToken;
use super::renderer::ToneRenderer;
use super::types::{PlaybackReport, ToneRequest, TrackReport};
use crate::ast::{Sheet, Track};
use crate::config::PlaybackConfig;
use crate::error::RenderError;
use crate::session::MasterBus;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Schedules sheets onto a tone renderer
#[derive(Clone)]
pub struct Scheduler {
    renderer: Arc<dyn ToneRenderer>,
    master: MasterBus,
    config: PlaybackConfig,
}

impl Scheduler {
    pub fn new(renderer: Arc<dyn ToneRenderer>, master: MasterBus, config: PlaybackConfig) -> Self {
        Self {
            renderer,
            master,
            config,
        }
    }

    /// Play every track of `sheet` and wait for all of them.
    ///
    /// Cancellation is not an error: the report just shows fewer notes.
    pub async fn play(&self, sheet: Sheet, cancel: &CancellationToken) -> PlaybackReport {
        let origin = Instant::now();
        info!(
            tracks = sheet.tracks.len(),
            notes = sheet.note_count(),
            "starting playback"
        );

        // Track tasks live in a JoinSet so dropping `play` aborts all of them
        let names: Vec<String> = sheet.tracks.iter().map(|t| t.name.clone()).collect();
        let mut running = JoinSet::new();
        for (index, track) in sheet.tracks.into_iter().enumerate() {
            let track_play = play_track(track, origin, self.clone(), cancel.clone());
            running.spawn(async move { (index, track_play.await) });
        }

        let mut finished: Vec<Option<TrackReport>> = vec![None; names.len()];
        while let Some(result) = running.join_next().await {
            match result {
                Ok((index, track_report)) => finished[index] = Some(track_report),
                Err(e) => error!("track task failed: {}", e),
            }
        }

        let report = PlaybackReport {
            tracks: names
                .into_iter()
                .zip(finished)
                .map(|(name, track_report)| {
                    track_report.unwrap_or_else(|| TrackReport {
                        cancelled: true,
                        ..TrackReport::new(name)
                    })
                })
                .collect(),
        };

        info!(
            notes = report.notes_scheduled(),
            cancelled = report.was_cancelled(),
            "playback finished"
        );
        report
    }
}

async fn play_track(
    track: Track,
    origin: Instant,
    scheduler: Scheduler,
    cancel: CancellationToken,
) -> TrackReport {
    let Track { name, notes } = track;
    let config = &scheduler.config;
    let mut report = TrackReport::new(name.as_str());
    let mut tones: JoinSet<Result<(), RenderError>> = JoinSet::new();
    let mut cursor = origin;

    debug!(track = %name, notes = notes.len(), "track started");

    for note in notes {
        // Throttle: keep the cursor within the look-ahead horizon
        while cursor.saturating_duration_since(Instant::now()) > config.look_ahead {
            debug!(track = %name, "cursor ahead of look-ahead horizon, waiting");
            if !cancel.sleep(config.throttle_tick).await {
                break;
            }
        }

        if cancel.is_cancelled() {
            info!(track = %name, scheduled = report.notes_scheduled, "track cancelled");
            report.cancelled = true;
            break;
        }

        while let Some(result) = tones.try_join_next() {
            record(&mut report, result);
        }

        let duration = Duration::from_secs_f64(note.duration);
        for &frequency in &note.pitches {
            let request = ToneRequest {
                frequency,
                duration,
                timbre: note.timbre,
                pan: note.pan,
                volume: note.volume,
                start: cursor,
                master: scheduler.master.clone(),
            };
            tones.spawn(scheduler.renderer.render_tone(request, cancel.clone()));
        }

        report.notes_scheduled += 1;
        cursor += duration;
    }

    while let Some(result) = tones.join_next().await {
        record(&mut report, result);
    }

    // Tones still ringing when the token fired were cut short too
    if cancel.is_cancelled() && !report.cancelled {
        info!(track = %name, "track stopped during its last notes");
        report.cancelled = true;
    }

    debug!(
        track = %name,
        completed = report.tones_completed,
        failed = report.tones_failed,
        "track finished"
    );
    report
}

/// Fold one tone's completion into the track report.
fn record(report: &mut TrackReport, result: Result<Result<(), RenderError>, JoinError>) {
    match result {
        Ok(Ok(())) => report.tones_completed += 1,
        Ok(Err(e)) => {
            warn!(track = %report.name, "{}", e);
            report.tones_failed += 1;
        }
        Err(e) => {
            error!(track = %report.name, "tone task failed: {}", e);
            report.tones_failed += 1;
        }
    }
}
