//! Symbol resolution — note names, percussion tags and rests.
//!
//! Scores refer to sounds by short symbols (`"A4"`, `"F#3"`, `"kick"`,
//! `"rest"`). Resolution never fails: anything unrecognized is silence.

/// Reference pitch for A4 (MIDI 69).
pub const A4_FREQUENCY: f64 = 440.0;

/// The reserved silence tag.
pub const REST: &str = "rest";

/// Drum-kit pieces addressable from a percussion voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drum {
    Kick,
    Snare,
    ClosedHat,
    OpenHat,
}

impl Drum {
    /// Look up a percussion tag (case-insensitive).
    pub fn from_tag(tag: &str) -> Option<Drum> {
        match tag.to_ascii_lowercase().as_str() {
            "kick" | "bd" => Some(Drum::Kick),
            "snare" | "sd" => Some(Drum::Snare),
            "hihat" | "hh" | "closedhat" => Some(Drum::ClosedHat),
            "openhat" | "oh" | "hihat_open" => Some(Drum::OpenHat),
            _ => None,
        }
    }
}

/// What a score symbol refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sound {
    Pitch(f64),
    Drum(Drum),
    Silence,
}

/// Resolve a symbol to a pitch, a drum, or silence.
pub fn resolve(symbol: &str) -> Sound {
    let symbol = symbol.trim();
    if symbol.eq_ignore_ascii_case(REST) || symbol.is_empty() {
        return Sound::Silence;
    }
    if let Some(drum) = Drum::from_tag(symbol) {
        return Sound::Drum(drum);
    }
    match note_to_frequency(symbol) {
        Some(freq) => Sound::Pitch(freq),
        None => Sound::Silence,
    }
}

/// Frequency of a pitched symbol, 0.0 for rests, drums and unknown names.
pub fn frequency_of(symbol: &str) -> f64 {
    match resolve(symbol) {
        Sound::Pitch(freq) => freq,
        Sound::Drum(_) | Sound::Silence => 0.0,
    }
}

/// Parse a note name (e.g. "C4", "F#3", "Bb5") into a MIDI note number.
pub fn note_to_midi(note: &str) -> Option<i32> {
    let bytes = note.as_bytes();
    if bytes.is_empty() {
        return None;
    }

    let base_semitone = match bytes[0].to_ascii_uppercase() as char {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let mut idx = 1;
    let mut semitone = base_semitone;

    if idx < bytes.len() {
        match bytes[idx] as char {
            '#' => {
                semitone += 1;
                idx += 1;
            }
            'b' => {
                semitone -= 1;
                idx += 1;
            }
            _ => {}
        }
    }

    let octave: i32 = note.get(idx..)?.parse().ok()?;

    // C4 = 60
    Some((octave + 1) * 12 + semitone)
}

/// `A4_FREQUENCY * 2^((midi - 69) / 12)`
pub fn midi_to_frequency(midi: i32) -> f64 {
    A4_FREQUENCY * (2.0_f64).powf((midi as f64 - 69.0) / 12.0)
}

pub fn note_to_frequency(note: &str) -> Option<f64> {
    note_to_midi(note).map(midi_to_frequency)
}

/// Spell a MIDI number back to a sharp-based note name ("C#4").
pub fn midi_to_note_name(midi: i32) -> String {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    let octave = midi.div_euclid(12) - 1;
    format!("{}{}", NAMES[midi.rem_euclid(12) as usize], octave)
}
