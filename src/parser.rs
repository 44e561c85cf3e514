//! # Parser Module
//!
//! Turns the lexer's command stream into a [`Sheet`].
//!
//! ## Parser State
//! The parser owns a single mutable [`ParserState`] that every command updates
//! in order:
//! - tempo (`#BPM`, default 120), timbre (`#TYPE`, default square),
//!   pan (`#PAN`, default 0, clamped to -1..1), volume (`#VOLUME`, default 1,
//!   clamped to 0..1)
//! - the active track (`#TRACK`, default `"default"`)
//! - the loop stack (`#LOOP n` pushes, `#ENDLOOP` pops)
//!
//! ## Current Target
//! Newly produced notes always go to exactly one place: the buffer of the
//! innermost open loop, or the active track when no loop is open. Closing a
//! loop appends its buffer `n` times to whatever the target is after the pop,
//! so nested loops multiply.
//!
//! ## Atomic Results
//! Tracks are staged in a [`SheetBuilder`] that is only turned into a
//! [`Sheet`] when every line parsed. A failing sheet yields an error and no
//! partial tracks.
//!
//! ## Example
//! ```rust
//! use scriptune::parse;
//!
//! let sheet = parse("#LOOP 2\n#LOOP 3\nC4:q\n#ENDLOOP\n#ENDLOOP").unwrap();
//! assert_eq!(sheet.track("default").unwrap().notes.len(), 6);
//! ```

use crate::ast::{Note, Sheet, Timbre, Track, DEFAULT_TRACK};
use crate::error::ParseError;
use crate::lexer::{Cell, Command, Lexer, LocatedCommand};
use tracing::debug;

pub const DEFAULT_BPM: u32 = 120;
pub const DEFAULT_PAN: f32 = 0.0;
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Most notes a single track or loop buffer may hold after loop expansion.
pub const MAX_TRACK_NOTES: usize = 1_000_000;

/// A pending `#LOOP` block
#[derive(Debug)]
struct LoopFrame {
    count: u32,
    notes: Vec<Note>,
    line: usize,
}

/// Settings in effect while scanning the sheet
#[derive(Debug)]
pub struct ParserState {
    pub bpm: u32,
    pub timbre: Timbre,
    pub pan: f32,
    pub volume: f32,
    pub active_track: String,
    loops: Vec<LoopFrame>,
}

impl Default for ParserState {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            timbre: Timbre::default(),
            pan: DEFAULT_PAN,
            volume: DEFAULT_VOLUME,
            active_track: DEFAULT_TRACK.to_string(),
            loops: Vec::new(),
        }
    }
}

impl ParserState {
    /// Snapshot the current settings into a note for one cell.
    fn note_for(&self, cell: Cell) -> Note {
        Note {
            pitches: cell.pitches,
            duration: cell.duration.seconds(self.bpm),
            timbre: self.timbre,
            pan: self.pan,
            volume: self.volume,
        }
    }
}

/// Tracks under construction. Only becomes a [`Sheet`] on success.
#[derive(Debug)]
struct SheetBuilder {
    tracks: Vec<Track>,
}

impl SheetBuilder {
    fn new() -> Self {
        let Sheet { tracks } = Sheet::default();
        Self { tracks }
    }

    /// Create `name`, or empty it in place if it already exists.
    fn declare(&mut self, name: &str) {
        match self.tracks.iter_mut().find(|t| t.name == name) {
            Some(track) => track.notes.clear(),
            None => self.tracks.push(Track::new(name)),
        }
    }

    fn track_mut(&mut self, name: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.name == name)
    }

    fn finish(self) -> Sheet {
        Sheet { tracks: self.tracks }
    }
}

/// Parser for scriptune sheets
pub struct Parser {
    commands: Vec<LocatedCommand>,
    state: ParserState,
    builder: SheetBuilder,
}

impl Parser {
    pub fn new(commands: Vec<LocatedCommand>) -> Self {
        Self {
            commands,
            state: ParserState::default(),
            builder: SheetBuilder::new(),
        }
    }

    /// Run every command and produce the sheet.
    pub fn parse_sheet(mut self) -> Result<Sheet, ParseError> {
        let commands = std::mem::take(&mut self.commands);
        for located in commands {
            self.apply(located.command, located.line)?;
        }

        if let Some(open) = self.state.loops.last() {
            return Err(ParseError::UnclosedLoop { line: open.line });
        }

        Ok(self.builder.finish())
    }

    fn apply(&mut self, command: Command, line: usize) -> Result<(), ParseError> {
        match command {
            Command::Bpm(bpm) => self.state.bpm = bpm,
            Command::Pan(pan) => self.state.pan = pan.clamp(-1.0, 1.0),
            Command::Volume(volume) => self.state.volume = volume.clamp(0.0, 1.0),
            Command::Type(timbre) => self.state.timbre = timbre,
            Command::Track(name) => {
                debug!(track = %name, line, "declaring track");
                self.builder.declare(&name);
                self.state.active_track = name;
            }
            Command::Loop(count) => self.state.loops.push(LoopFrame {
                count,
                notes: Vec::new(),
                line,
            }),
            Command::EndLoop => {
                let frame = self
                    .state
                    .loops
                    .pop()
                    .ok_or(ParseError::UnmatchedEndLoop { line })?;
                debug!(
                    count = frame.count,
                    notes = frame.notes.len(),
                    opened_at = frame.line,
                    "expanding loop"
                );
                let target = self.target(line)?;
                frame
                    .notes
                    .len()
                    .checked_mul(frame.count as usize)
                    .and_then(|added| added.checked_add(target.len()))
                    .filter(|&total| total <= MAX_TRACK_NOTES)
                    .ok_or(ParseError::LoopTooLarge {
                        line: frame.line,
                        limit: MAX_TRACK_NOTES,
                    })?;
                if !frame.notes.is_empty() {
                    for _ in 0..frame.count {
                        target.extend(frame.notes.iter().cloned());
                    }
                }
            }
            Command::Notes(cells) => {
                let notes: Vec<Note> = cells.into_iter().map(|c| self.state.note_for(c)).collect();
                self.target(line)?.extend(notes);
            }
        }
        Ok(())
    }

    /// Where new notes go: the innermost open loop, else the active track.
    fn target(&mut self, line: usize) -> Result<&mut Vec<Note>, ParseError> {
        if let Some(frame) = self.state.loops.last_mut() {
            return Ok(&mut frame.notes);
        }
        let name = &self.state.active_track;
        match self.builder.track_mut(name) {
            Some(track) => Ok(&mut track.notes),
            None => Err(ParseError::UndeclaredTrack {
                line,
                name: name.clone(),
            }),
        }
    }
}

/// Parse sheet text into a [`Sheet`].
pub fn parse(source: &str) -> Result<Sheet, ParseError> {
    let mut lexer = Lexer::new(source);
    let commands = lexer.tokenize()?;
    Parser::new(commands).parse_sheet()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DurationCode;
    use crate::pitch::frequency;

    fn default_notes(source: &str) -> Vec<Note> {
        parse(source).unwrap().track(DEFAULT_TRACK).unwrap().notes.clone()
    }

    #[test]
    fn test_empty_sheet_has_default_track() {
        let sheet = parse("").unwrap();
        assert_eq!(sheet.tracks.len(), 1);
        assert_eq!(sheet.tracks[0].name, DEFAULT_TRACK);
        assert!(sheet.tracks[0].notes.is_empty());
    }

    #[test]
    fn test_defaults() {
        let notes = default_notes("C4:q");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].pitches, vec![frequency("C4").unwrap()]);
        assert_eq!(notes[0].duration, 0.5); // quarter at 120 bpm
        assert_eq!(notes[0].timbre, Timbre::Square);
        assert_eq!(notes[0].pan, 0.0);
        assert_eq!(notes[0].volume, 1.0);
    }

    #[test]
    fn test_simple_loop() {
        let notes = default_notes("#LOOP 2\nC4:q\n#ENDLOOP");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0], notes[1]);
        assert_eq!(notes[0].pitches, vec![frequency("C4").unwrap()]);
        assert_eq!(notes[0].duration, DurationCode::Quarter.seconds(DEFAULT_BPM));
    }

    #[test]
    fn test_nested_loops_multiply() {
        let notes = default_notes("#LOOP 2\n#LOOP 3\nC4:q\n#ENDLOOP\n#ENDLOOP");
        assert_eq!(notes.len(), 6);
    }

    #[test]
    fn test_nested_loop_keeps_order() {
        let notes = default_notes("#LOOP 2\nC4:q\n#LOOP 2\nE4:q\n#ENDLOOP\nG4:q\n#ENDLOOP");
        let c = frequency("C4").unwrap();
        let e = frequency("E4").unwrap();
        let g = frequency("G4").unwrap();
        let order: Vec<f32> = notes.iter().map(|n| n.pitches[0]).collect();
        assert_eq!(order, vec![c, e, e, g, c, e, e, g]);
    }

    #[test]
    fn test_loop_zero_yields_nothing() {
        let notes = default_notes("C4:q\n#LOOP 0\nD4:q\n#ENDLOOP\nE4:q");
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn test_endloop_without_loop_fails() {
        assert_eq!(parse("#ENDLOOP"), Err(ParseError::UnmatchedEndLoop { line: 1 }));
        assert_eq!(
            parse("#LOOP 2\nC4:q\n#ENDLOOP\n#ENDLOOP"),
            Err(ParseError::UnmatchedEndLoop { line: 4 })
        );
    }

    #[test]
    fn test_unclosed_loop_fails() {
        assert_eq!(
            parse("C4:q\n#LOOP 2\nD4:q"),
            Err(ParseError::UnclosedLoop { line: 2 })
        );
    }

    #[test]
    fn test_two_tracks() {
        let sheet = parse("#TRACK lead\nA4:h\n#TRACK bass\nC3:h").unwrap();
        assert_eq!(sheet.tracks.len(), 3);
        assert!(sheet.track(DEFAULT_TRACK).unwrap().notes.is_empty());
        assert_eq!(sheet.track("lead").unwrap().notes.len(), 1);
        assert_eq!(sheet.track("bass").unwrap().notes.len(), 1);
        assert_eq!(sheet.track("bass").unwrap().notes[0].duration, 1.0);
    }

    #[test]
    fn test_redeclared_track_starts_fresh_in_place() {
        let sheet = parse("C4:q\n#TRACK lead\nA4:q\n#TRACK default\nE4:q E4:q").unwrap();
        assert_eq!(sheet.track_names().collect::<Vec<_>>(), vec!["default", "lead"]);
        let notes = &sheet.track(DEFAULT_TRACK).unwrap().notes;
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].pitches, vec![frequency("E4").unwrap()]);
    }

    #[test]
    fn test_chord_cell_is_one_note() {
        let notes = default_notes("C4+E4+G4:q");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].pitches.len(), 3);
        assert!(notes[0].is_chord());
        assert_eq!(notes[0].duration, 0.5);
    }

    #[test]
    fn test_rest() {
        let notes = default_notes("-:h");
        assert!(notes[0].is_rest());
        assert_eq!(notes[0].duration, 1.0);
    }

    #[test]
    fn test_settings_are_snapshotted() {
        let notes = default_notes(
            "#BPM 60\n#TYPE sine\n#PAN 0.5\n#VOLUME 0.5\nC4:q\n#BPM 240\n#TYPE triangle\n#PAN -1\n#VOLUME 0\nC4:q",
        );
        assert_eq!(notes[0].duration, 1.0);
        assert_eq!(notes[0].timbre, Timbre::Sine);
        assert_eq!(notes[0].pan, 0.5);
        assert_eq!(notes[0].volume, 0.5);
        assert_eq!(notes[1].duration, 0.25);
        assert_eq!(notes[1].timbre, Timbre::Triangle);
        assert_eq!(notes[1].pan, -1.0);
        assert_eq!(notes[1].volume, 0.0);
    }

    #[test]
    fn test_pan_and_volume_clamp() {
        let notes = default_notes("#PAN 5\n#VOLUME -3\nC4:q\n#PAN -9\n#VOLUME 7\nC4:q");
        assert_eq!(notes[0].pan, 1.0);
        assert_eq!(notes[0].volume, 0.0);
        assert_eq!(notes[1].pan, -1.0);
        assert_eq!(notes[1].volume, 1.0);
    }

    #[test]
    fn test_loop_notes_keep_settings_from_inside_loop() {
        let notes = default_notes("#LOOP 2\n#BPM 60\nC4:q\n#ENDLOOP\n#BPM 120\nC4:q");
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0].duration, 1.0);
        assert_eq!(notes[1].duration, 1.0);
        assert_eq!(notes[2].duration, 0.5);
    }

    #[test]
    fn test_loop_closed_on_another_track_lands_there() {
        let sheet = parse("#LOOP 2\nC4:q\n#TRACK lead\n#ENDLOOP").unwrap();
        assert!(sheet.track(DEFAULT_TRACK).unwrap().notes.is_empty());
        assert_eq!(sheet.track("lead").unwrap().notes.len(), 2);
    }

    #[test]
    fn test_explicit_notes_command() {
        let notes = default_notes("#NOTES C4:q D4:q\nE4:q");
        assert_eq!(notes.len(), 3);
    }

    #[test]
    fn test_errors_report_lines() {
        let err = parse("#BPM 100\nC4:q\nC4:z").unwrap_err();
        assert_eq!(err.line(), 3);
        assert!(matches!(err, ParseError::UnknownDuration { .. }));
    }

    #[test]
    fn test_runaway_loop_is_rejected() {
        assert_eq!(
            parse("C4:q\n#LOOP 4294967295\nC4:q D4:q\n#ENDLOOP"),
            Err(ParseError::LoopTooLarge { line: 2, limit: MAX_TRACK_NOTES })
        );
        assert_eq!(
            parse("#LOOP 100000\n#LOOP 100000\n#LOOP 100000\nC4:q\n#ENDLOOP\n#ENDLOOP\n#ENDLOOP"),
            Err(ParseError::LoopTooLarge { line: 2, limit: MAX_TRACK_NOTES })
        );
        // An empty body expands to nothing however large the count
        assert!(default_notes("#LOOP 4294967295\n#ENDLOOP").is_empty());
    }

    #[test]
    fn test_loop_limit_counts_notes_already_on_target() {
        // 1000 * 1000 fills the track exactly; one note already there tips it over
        let full = default_notes("#LOOP 1000\n#LOOP 1000\nC4:q\n#ENDLOOP\n#ENDLOOP");
        assert_eq!(full.len(), MAX_TRACK_NOTES);
        assert!(matches!(
            parse("C4:q\n#LOOP 1000\n#LOOP 1000\nC4:q\n#ENDLOOP\n#ENDLOOP"),
            Err(ParseError::LoopTooLarge { line: 2, .. })
        ));
    }
}
