//! # Sheet Types
//!
//! The structured form of a scriptune sheet, as produced by the parser and
//! consumed by the playback scheduler.
//!
//! ## Type Hierarchy
//! ```text
//! Sheet
//!   └── Vec<Track>            (insertion order, names unique, "default" always present)
//!         ├── name: String
//!         └── Vec<Note>       (played strictly in sequence)
//!               ├── pitches: Vec<f32>   (Hz, 0.0 = rest, >1 = chord)
//!               ├── duration: f64       (seconds, tempo already applied)
//!               ├── timbre: Timbre
//!               ├── pan: f32            (-1..1)
//!               └── volume: f32         (0..1)
//! ```
//!
//! ## Key Concepts
//!
//! ### Durations
//! Duration codes are beat multipliers relative to a quarter note (`q` = 1 beat).
//! Dotted codes (`dw dh dq de ds`) are exactly 1.5x their plain counterpart.
//! Seconds are computed once at parse time: `beats * 60 / bpm`.
//!
//! ### Notes are snapshots
//! A note copies the tempo, timbre, pan and volume in effect when its row was
//! parsed. Later `#BPM`/`#TYPE`/`#PAN`/`#VOLUME` lines never touch it.

use serde::Serialize;
use std::str::FromStr;

/// Name of the track every sheet starts with.
pub const DEFAULT_TRACK: &str = "default";

/// Oscillator waveform used to render a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Timbre {
    Sine,
    #[default]
    Square,
    Sawtooth,
    Triangle,
}

impl Timbre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timbre::Sine => "sine",
            Timbre::Square => "square",
            Timbre::Sawtooth => "sawtooth",
            Timbre::Triangle => "triangle",
        }
    }
}

impl FromStr for Timbre {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sine" => Ok(Timbre::Sine),
            "square" => Ok(Timbre::Square),
            "sawtooth" => Ok(Timbre::Sawtooth),
            "triangle" => Ok(Timbre::Triangle),
            _ => Err(()),
        }
    }
}

/// Symbolic note length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationCode {
    Whole,            // w
    Half,             // h
    Quarter,          // q
    Eighth,           // e
    Sixteenth,        // s
    DottedWhole,      // dw
    DottedHalf,       // dh
    DottedQuarter,    // dq
    DottedEighth,     // de
    DottedSixteenth,  // ds
}

impl DurationCode {
    pub const ALL: [DurationCode; 10] = [
        DurationCode::Whole,
        DurationCode::Half,
        DurationCode::Quarter,
        DurationCode::Eighth,
        DurationCode::Sixteenth,
        DurationCode::DottedWhole,
        DurationCode::DottedHalf,
        DurationCode::DottedQuarter,
        DurationCode::DottedEighth,
        DurationCode::DottedSixteenth,
    ];

    /// Look up a duration code as written in a cell (`q`, `dh`, ...).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "w" => Some(DurationCode::Whole),
            "h" => Some(DurationCode::Half),
            "q" => Some(DurationCode::Quarter),
            "e" => Some(DurationCode::Eighth),
            "s" => Some(DurationCode::Sixteenth),
            "dw" => Some(DurationCode::DottedWhole),
            "dh" => Some(DurationCode::DottedHalf),
            "dq" => Some(DurationCode::DottedQuarter),
            "de" => Some(DurationCode::DottedEighth),
            "ds" => Some(DurationCode::DottedSixteenth),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DurationCode::Whole => "w",
            DurationCode::Half => "h",
            DurationCode::Quarter => "q",
            DurationCode::Eighth => "e",
            DurationCode::Sixteenth => "s",
            DurationCode::DottedWhole => "dw",
            DurationCode::DottedHalf => "dh",
            DurationCode::DottedQuarter => "dq",
            DurationCode::DottedEighth => "de",
            DurationCode::DottedSixteenth => "ds",
        }
    }

    /// The undotted code this one is derived from, if it is dotted.
    pub fn undotted(&self) -> Option<DurationCode> {
        match self {
            DurationCode::DottedWhole => Some(DurationCode::Whole),
            DurationCode::DottedHalf => Some(DurationCode::Half),
            DurationCode::DottedQuarter => Some(DurationCode::Quarter),
            DurationCode::DottedEighth => Some(DurationCode::Eighth),
            DurationCode::DottedSixteenth => Some(DurationCode::Sixteenth),
            _ => None,
        }
    }

    /// Length in beats, where a quarter note is one beat.
    pub fn beats(&self) -> f64 {
        match self {
            DurationCode::Whole => 4.0,
            DurationCode::Half => 2.0,
            DurationCode::Quarter => 1.0,
            DurationCode::Eighth => 0.5,
            DurationCode::Sixteenth => 0.25,
            DurationCode::DottedWhole => 6.0,
            DurationCode::DottedHalf => 3.0,
            DurationCode::DottedQuarter => 1.5,
            DurationCode::DottedEighth => 0.75,
            DurationCode::DottedSixteenth => 0.375,
        }
    }

    /// Length in seconds at the given tempo.
    pub fn seconds(&self, bpm: u32) -> f64 {
        self.beats() * 60.0 / bpm as f64
    }
}

/// One playable event: one or more pitches sharing a start, duration and voice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub pitches: Vec<f32>,
    pub duration: f64,
    pub timbre: Timbre,
    pub pan: f32,
    pub volume: f32,
}

impl Note {
    pub fn is_chord(&self) -> bool {
        self.pitches.len() > 1
    }

    pub fn is_rest(&self) -> bool {
        self.pitches.iter().all(|&p| p == 0.0)
    }
}

/// A named, strictly sequential run of notes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub name: String,
    pub notes: Vec<Note>,
}

impl Track {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: Vec::new(),
        }
    }

    /// Total playing time in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.notes.iter().map(|n| n.duration).sum()
    }
}

/// A parsed multi-track sheet. Tracks keep their declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub tracks: Vec<Track>,
}

impl Default for Sheet {
    fn default() -> Self {
        Self {
            tracks: vec![Track::new(DEFAULT_TRACK)],
        }
    }
}

impl Sheet {
    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }

    pub fn track_names(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.name.as_str())
    }

    /// Playing time of the longest track; tracks run concurrently.
    pub fn duration_seconds(&self) -> f64 {
        self.tracks
            .iter()
            .map(Track::duration_seconds)
            .fold(0.0, f64::max)
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    /// Render the sheet as YAML for diagnostics.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
