//! # Lexer Module
//!
//! Splits sheet text into lines and decodes each line into a typed [`Command`].
//!
//! ## Line Rules
//! - Everything after `;` is a comment.
//! - Blank lines (after comment stripping) are skipped.
//! - A line starting with `#` is a command: `#NAME arg ...`, whitespace separated.
//! - Any other line is an implicit `#NOTES` row of `pitch:duration` cells.
//!
//! The lexer resolves pitch names and duration codes up front, so the parser
//! only deals with state (tempo, voice, tracks, loops) and never with raw text.

use crate::ast::{DurationCode, Timbre};
use crate::error::ParseError;
use crate::pitch;

/// Marker that introduces a comment.
const COMMENT: char = ';';
/// Marker that introduces a command line.
const COMMAND: char = '#';
/// Separates pitch names inside a chord cell.
const CHORD_JOIN: char = '+';

/// One decoded note cell: the chord's frequencies and its symbolic length.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub pitches: Vec<f32>,
    pub duration: DurationCode,
}

/// The closed set of sheet commands with their typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Bpm(u32),
    Pan(f32),
    Volume(f32),
    Type(Timbre),
    Track(String),
    Loop(u32),
    EndLoop,
    Notes(Vec<Cell>),
}

/// A command with the 1-based line it came from
#[derive(Debug, Clone)]
pub struct LocatedCommand {
    pub command: Command,
    pub line: usize,
}

/// Lexer for decoding sheet text line by line
pub struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    pub fn tokenize(&mut self) -> Result<Vec<LocatedCommand>, ParseError> {
        let mut commands = Vec::new();

        for (index, raw) in self.input.lines().enumerate() {
            let line = index + 1;
            let text = strip_comment(raw).trim();
            if text.is_empty() {
                continue;
            }

            let command = match text.strip_prefix(COMMAND) {
                Some(directive) => decode_command(directive, line)?,
                None => Command::Notes(decode_cells(text.split_whitespace(), line)?),
            };
            commands.push(LocatedCommand { command, line });
        }

        Ok(commands)
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Decode the text after the leading `#`.
fn decode_command(directive: &str, line: usize) -> Result<Command, ParseError> {
    let mut words = directive.split_whitespace();
    let name = words.next().unwrap_or("");

    let command = match name {
        "BPM" => {
            let value = required(words.next(), "BPM", line)?;
            match value.parse::<u32>() {
                Ok(bpm) if bpm > 0 => Command::Bpm(bpm),
                _ => return Err(invalid("BPM", value, line)),
            }
        }
        "PAN" => Command::Pan(finite(required(words.next(), "PAN", line)?, "PAN", line)?),
        "VOLUME" => Command::Volume(finite(
            required(words.next(), "VOLUME", line)?,
            "VOLUME",
            line,
        )?),
        "TYPE" => {
            let value = required(words.next(), "TYPE", line)?;
            let timbre = value.parse::<Timbre>().map_err(|_| ParseError::UnknownTimbre {
                line,
                name: value.to_string(),
            })?;
            Command::Type(timbre)
        }
        "TRACK" => Command::Track(required(words.next(), "TRACK", line)?.to_string()),
        "LOOP" => {
            let value = required(words.next(), "LOOP", line)?;
            let count = value.parse::<u32>().map_err(|_| invalid("LOOP", value, line))?;
            Command::Loop(count)
        }
        "ENDLOOP" => Command::EndLoop,
        "NOTES" => Command::Notes(decode_cells(words, line)?),
        _ => {
            return Err(ParseError::UnknownCommand {
                line,
                command: name.to_string(),
            })
        }
    };

    Ok(command)
}

fn required<'s>(
    value: Option<&'s str>,
    command: &'static str,
    line: usize,
) -> Result<&'s str, ParseError> {
    value.ok_or(ParseError::MissingArgument { line, command })
}

fn invalid(command: &'static str, value: &str, line: usize) -> ParseError {
    ParseError::InvalidArgument {
        line,
        command,
        value: value.to_string(),
    }
}

fn finite(value: &str, command: &'static str, line: usize) -> Result<f32, ParseError> {
    match value.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(command, value, line)),
    }
}

fn decode_cells<'s>(
    cells: impl Iterator<Item = &'s str>,
    line: usize,
) -> Result<Vec<Cell>, ParseError> {
    cells.map(|cell| decode_cell(cell, line)).collect()
}

/// Decode `C4+E4+G4:q` style cells
fn decode_cell(cell: &str, line: usize) -> Result<Cell, ParseError> {
    let (pitch_spec, code) = cell.split_once(':').ok_or_else(|| ParseError::MalformedCell {
        line,
        cell: cell.to_string(),
    })?;

    let pitches = pitch_spec
        .split(CHORD_JOIN)
        .map(|name| {
            pitch::frequency(name).ok_or_else(|| ParseError::UnknownPitch {
                line,
                pitch: name.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let duration = DurationCode::from_code(code).ok_or_else(|| ParseError::UnknownDuration {
        line,
        code: code.to_string(),
    })?;

    Ok(Cell { pitches, duration })
}
