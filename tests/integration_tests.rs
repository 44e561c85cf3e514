//! Integration tests for the scriptune interpreter
//!
//! Tests the full pipeline from sheet text to a finished playback report.

use scriptune::pitch::frequency;
use scriptune::{
    check, parse, play, CancellationToken, LoggingRenderer, ParseError, ScriptuneError, Session,
    Timbre, DEFAULT_TRACK,
};
use std::time::Duration;
use tokio::time::Instant;

const CANON: &str = r#"
; two-voice canon
#BPM 100
#TYPE triangle
#TRACK lead
#PAN -0.5
#LOOP 2
C4:q D4:q E4:q C4:q   ; phrase
#ENDLOOP
E4:q F4:q G4:h

#TRACK bass
#TYPE sine
#PAN 0.5
#VOLUME 0.6
-:h
#LOOP 2
C3+G3:h
#ENDLOOP
"#;

#[test]
fn test_parse_multi_track_sheet() {
    let sheet = parse(CANON).unwrap();
    assert_eq!(
        sheet.track_names().collect::<Vec<_>>(),
        vec![DEFAULT_TRACK, "lead", "bass"]
    );

    let lead = sheet.track("lead").unwrap();
    assert_eq!(lead.notes.len(), 11);
    assert!(lead.notes.iter().all(|n| n.timbre == Timbre::Triangle && n.pan == -0.5));
    assert_eq!(lead.notes[0].duration, 0.6); // quarter at 100 bpm

    let bass = sheet.track("bass").unwrap();
    assert_eq!(bass.notes.len(), 3);
    assert!(bass.notes[0].is_rest());
    assert_eq!(bass.notes[1].pitches, vec![frequency("C3").unwrap(), frequency("G3").unwrap()]);
    assert_eq!(bass.notes[2].volume, 0.6);
    assert_eq!(bass.notes[2].timbre, Timbre::Sine);
}

#[test]
fn test_check_renders_yaml() {
    let yaml = check("#TRACK lead\nA4:h").unwrap();
    assert!(yaml.contains("name: lead"));
    assert!(yaml.contains("timbre: square"));
    assert!(yaml.contains("440"));
}

#[test]
fn test_check_reports_parse_errors() {
    let err = check("C4:q\nC4:q\nQ9:q").unwrap_err();
    match err {
        ScriptuneError::Parse(ParseError::UnknownPitch { line, pitch }) => {
            assert_eq!(line, 3);
            assert_eq!(pitch, "Q9");
        }
        other => panic!("Expected unknown pitch, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_play_whole_sheet() {
    let session = Session::new(LoggingRenderer);
    let sheet = parse(CANON).unwrap();
    // lead is the longest track: ten quarters and a half note at 100 bpm
    assert!((sheet.duration_seconds() - 7.2).abs() < 1e-9);

    let start = Instant::now();
    let report = play(&session, CANON, &CancellationToken::new()).await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(7));
    assert!(!report.was_cancelled());
    assert_eq!(report.track("lead").unwrap().notes_scheduled, 11);
    // two chords of two pitches plus one rest
    assert_eq!(report.track("bass").unwrap().tones_completed, 5);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_play_resolves_normally() {
    let session = Session::new(LoggingRenderer);
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        canceller.cancel();
    });

    let report = play(&session, "#LOOP 64\nC4:q E4:q\n#ENDLOOP", &cancel)
        .await
        .unwrap();
    assert!(report.was_cancelled());
    assert!(report.notes_scheduled() < 128);
}
