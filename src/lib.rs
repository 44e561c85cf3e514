pub mod ast;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pitch;
pub mod playback;
pub mod session;

pub use ast::*;
pub use config::PlaybackConfig;
pub use error::*;
pub use parser::parse;
pub use playback::{CancellationToken, LoggingRenderer, PlaybackReport, ToneRenderer, TrackReport};
pub use session::{MasterBus, Session};

/// Parse a sheet and play it on `session`.
/// This is the main entry point for the library.
///
/// The sheet is parsed completely before anything is scheduled, so a parse
/// error means no tone was rendered.
pub async fn play(
    session: &Session,
    sheet_text: &str,
    cancel: &CancellationToken,
) -> Result<PlaybackReport, ScriptuneError> {
    session.play(sheet_text, cancel).await
}

/// Parse a sheet and render it as YAML (useful for checking what will play)
pub fn check(sheet_text: &str) -> Result<String, ScriptuneError> {
    let sheet = parse(sheet_text)?;
    Ok(sheet.to_yaml()?)
}
