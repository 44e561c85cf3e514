//! Pitch names to frequencies.
//!
//! Names are `{A-G}[#|b]{1-7}` (e.g. `C4`, `F#3`, `Bb5`) or `-` for a rest.
//! Every chromatic step is covered, including enharmonic spellings such as
//! `Cb4` (= `B3`) and `E#4` (= `F4`). Frequencies are equal temperament with
//! A4 = 440 Hz.

/// Spelling of a rest in a cell.
pub const REST: &str = "-";

pub const LOWEST_OCTAVE: u8 = 1;
pub const HIGHEST_OCTAVE: u8 = 7;

const A4_FREQUENCY: f64 = 440.0;
const A4_MIDI: i32 = 69;

/// Semitone offset of a natural note name from C.
fn natural_semitone(name: char) -> Option<i32> {
    match name {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// MIDI note number for a pitch name, or `None` if the name is not in the table.
pub fn midi_number(name: &str) -> Option<i32> {
    let mut chars = name.chars();
    let base = natural_semitone(chars.next()?)?;

    let rest = chars.as_str();
    let (accidental, octave_str) = match rest.chars().next()? {
        '#' => (1, &rest[1..]),
        'b' => (-1, &rest[1..]),
        _ => (0, rest),
    };

    // Exactly one octave digit
    let mut digits = octave_str.chars();
    let octave = digits.next()?.to_digit(10)? as u8;
    if digits.next().is_some() || !(LOWEST_OCTAVE..=HIGHEST_OCTAVE).contains(&octave) {
        return None;
    }

    Some((octave as i32 + 1) * 12 + base + accidental)
}

/// Frequency in Hz for a pitch name. The rest `-` maps to `0.0`.
///
/// # Examples
/// ```
/// use scriptune::pitch::frequency;
///
/// assert_eq!(frequency("A4"), Some(440.0));
/// assert_eq!(frequency("-"), Some(0.0));
/// assert_eq!(frequency("Db4"), frequency("C#4"));
/// assert_eq!(frequency("H4"), None);
/// ```
pub fn frequency(name: &str) -> Option<f32> {
    if name == REST {
        return Some(0.0);
    }
    let midi = midi_number(name)?;
    Some((A4_FREQUENCY * 2f64.powf((midi - A4_MIDI) as f64 / 12.0)) as f32)
}
