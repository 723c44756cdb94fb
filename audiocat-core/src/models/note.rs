//! Musical note names and their frequencies.
//!
//! Notes are numbered from C0 = 0 up to G10 = 127. The reference pitch is
//! note 69 (A5 in this octave naming) at 440 Hz.

use super::error::AudioError;

/// Highest valid note number.
pub const MAX_NOTE: u8 = 0x7F;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Parses a note name such as `C4`, `F#5` or `Bb2` into a note number.
///
/// Flats are folded onto the sharp of the previous letter. `B#`, `E#`,
/// `Cb` and `Fb` are rejected, as are octaves outside 0..=10 and notes
/// above G10.
pub fn note_for_name(name: &str) -> Result<u8, AudioError> {
    let invalid = |why: &str| AudioError::InvalidNote(format!("{name}: {why}"));

    let mut chars = name.chars();
    let letter = chars
        .next()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| ('A'..='G').contains(c))
        .ok_or_else(|| invalid("note does not exist"))?;

    let rest = chars.as_str();
    let (semitone, octave_str) = match rest.chars().next() {
        Some('#') => {
            if matches!(letter, 'B' | 'E') {
                return Err(invalid("note does not have a sharp"));
            }
            (letter_semitone(letter) + 1, &rest[1..])
        }
        Some('b') => {
            if matches!(letter, 'C' | 'F') {
                return Err(invalid("note does not have a flat"));
            }
            (letter_semitone(letter) - 1, &rest[1..])
        }
        _ => (letter_semitone(letter), rest),
    };

    let octave: i64 = octave_str
        .parse()
        .map_err(|_| invalid("no octave given"))?;
    if !(0..=10).contains(&octave) {
        return Err(invalid("note out of range"));
    }

    let note = semitone + 12 * octave;
    if note > i64::from(MAX_NOTE) {
        return Err(invalid("note out of range"));
    }
    Ok(note as u8)
}

fn letter_semitone(letter: char) -> i64 {
    match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        _ => 11,
    }
}

/// Canonical (sharp) name of a note, e.g. `F#5`.
pub fn name_for_note(note: u8) -> Result<String, AudioError> {
    if note > MAX_NOTE {
        return Err(AudioError::InvalidNote(format!("note {note} does not exist")));
    }
    let index = usize::from(note % 12);
    Ok(format!("{}{}", NOTE_NAMES[index], note / 12))
}

/// Equal-temperament frequency of a note, with note 69 at 440 Hz.
pub fn frequency_for_note(note: u8) -> Result<f64, AudioError> {
    if note > MAX_NOTE {
        return Err(AudioError::InvalidNote(format!("note {note} does not exist")));
    }
    Ok(440.0 * 2f64.powf((f64::from(note) - 69.0) / 12.0))
}
