//! # Error Types
//!
//! This module defines all error types for the scriptune interpreter.
//!
//! Parse errors carry the 1-based source line so a sheet author can find the
//! offending directive or note row. They are all raised before playback starts:
//! a sheet that fails to parse never produces sound.
//!
//! ## Error Types
//! - [`ParseError`] - Malformed sheet text (unknown command, pitch, duration, loop mismatch)
//! - [`RenderError`] - A single tone failed inside the tone renderer
//! - [`ScriptuneError`] - Crate-level error returned by the public entry points
//!
//! ## Usage
//! ```rust
//! use scriptune::{parse, ParseError};
//!
//! match parse("#ENDLOOP") {
//!     Ok(_) => unreachable!(),
//!     Err(ParseError::UnmatchedEndLoop { line }) => assert_eq!(line, 1),
//!     Err(e) => panic!("unexpected error: {}", e),
//! }
//! ```

use thiserror::Error;

/// Errors detected while turning sheet text into a [`Sheet`](crate::Sheet).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A `#COMMAND` line whose command is not part of the grammar.
    ///
    /// # Example
    /// ```
    /// # use scriptune::ParseError;
    /// let err = ParseError::UnknownCommand { line: 3, command: "TEMPO".to_string() };
    /// assert_eq!(err.to_string(), "line 3: unknown command '#TEMPO'");
    /// ```
    #[error("line {line}: unknown command '#{command}'")]
    UnknownCommand { line: usize, command: String },

    /// A command that requires an argument was given none.
    #[error("line {line}: #{command} requires an argument")]
    MissingArgument { line: usize, command: &'static str },

    /// A command argument could not be read as the expected number.
    #[error("line {line}: invalid argument '{value}' for #{command}")]
    InvalidArgument {
        line: usize,
        command: &'static str,
        value: String,
    },

    /// `#TYPE` named a waveform outside sine/square/sawtooth/triangle.
    #[error("line {line}: unknown timbre '{name}'")]
    UnknownTimbre { line: usize, name: String },

    /// A note cell without the `pitch:duration` shape.
    #[error("line {line}: malformed cell '{cell}', expected <pitch>:<duration>")]
    MalformedCell { line: usize, cell: String },

    /// A pitch name that is not in the pitch table.
    #[error("line {line}: unknown pitch '{pitch}'")]
    UnknownPitch { line: usize, pitch: String },

    /// A duration code that is not in the duration table.
    #[error("line {line}: unknown duration '{code}'")]
    UnknownDuration { line: usize, code: String },

    /// `#ENDLOOP` with no open `#LOOP`.
    ///
    /// # Example
    /// ```
    /// # use scriptune::ParseError;
    /// let err = ParseError::UnmatchedEndLoop { line: 7 };
    /// assert_eq!(err.to_string(), "line 7: #ENDLOOP without a matching #LOOP");
    /// ```
    #[error("line {line}: #ENDLOOP without a matching #LOOP")]
    UnmatchedEndLoop { line: usize },

    /// A `#LOOP` still open when the sheet ended. `line` is where it was opened.
    #[error("line {line}: #LOOP is never closed with #ENDLOOP")]
    UnclosedLoop { line: usize },

    /// A `#LOOP` whose expansion would push its target past `limit` notes.
    #[error("line {line}: #LOOP expands to more than {limit} notes")]
    LoopTooLarge { line: usize, limit: usize },

    /// Notes were routed to a track that was never declared.
    #[error("line {line}: track '{name}' has not been declared")]
    UndeclaredTrack { line: usize, name: String },
}

impl ParseError {
    /// The 1-based sheet line the error was detected on.
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnknownCommand { line, .. }
            | ParseError::MissingArgument { line, .. }
            | ParseError::InvalidArgument { line, .. }
            | ParseError::UnknownTimbre { line, .. }
            | ParseError::MalformedCell { line, .. }
            | ParseError::UnknownPitch { line, .. }
            | ParseError::UnknownDuration { line, .. }
            | ParseError::UnmatchedEndLoop { line }
            | ParseError::UnclosedLoop { line }
            | ParseError::LoopTooLarge { line, .. }
            | ParseError::UndeclaredTrack { line, .. } => *line,
        }
    }
}

/// Failure reported by a [`ToneRenderer`](crate::playback::ToneRenderer) for one tone.
///
/// The scheduler isolates these to the tone that failed: the track keeps going
/// and sibling tracks are unaffected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("tone renderer failed at {frequency} Hz: {message}")]
    Backend { frequency: f32, message: String },
}

/// Crate-level error returned by the public entry points.
#[derive(Error, Debug)]
pub enum ScriptuneError {
    #[error("Parse error at {0}")]
    Parse(#[from] ParseError),

    /// Invalid playback configuration (bad YAML or out-of-range values).
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The parsed sheet could not be written out as YAML.
    #[error("Cannot render sheet: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_is_reported_for_every_kind() {
        let errors = vec![
            ParseError::UnknownCommand { line: 1, command: "X".into() },
            ParseError::MissingArgument { line: 2, command: "BPM" },
            ParseError::UnclosedLoop { line: 3 },
            ParseError::UndeclaredTrack { line: 4, name: "lead".into() },
        ];
        let lines: Vec<usize> = errors.iter().map(ParseError::line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_parse_error_wraps_into_crate_error() {
        let err: ScriptuneError = ParseError::UnknownPitch { line: 2, pitch: "H4".into() }.into();
        assert_eq!(err.to_string(), "Parse error at line 2: unknown pitch 'H4'");
    }
}
