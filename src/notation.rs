//! Compact text notation for melodies, in the style of ABC.
//!
//! ```text
//! X:1
//! T:Main Theme
//! M:4/4
//! L:1/8
//! Q:1/4=120
//! K:C
//! C2 E2 G2 c2 | [CEG]4 z4 | ^F/ G/ A3/2 B, |]
//! ```
//!
//! Uppercase letters sit in octave 4, lowercase in octave 5; each `'`
//! raises and each `,` lowers an octave. `^`, `_` and `=` are sharp, flat
//! and natural. A length is a multiple of the unit length `L:` (default
//! 1/8 of a whole note): `2`, `/2` or `3/2`, with a bare `/` meaning half.
//! `z` (or `x`) is a rest and `[...]` groups notes into a chord. Bar lines,
//! ending numbers, ties, broken-rhythm marks, `!..!`/`+..+` decorations,
//! `{..}` grace notes and quoted annotations are skipped, as are lyric and
//! other unrecognized field lines. The key signature is recorded but not
//! applied to the notes.

use serde::Serialize;

use crate::composition::{ScoreEvent, Tempo, Voice};
use crate::dsp::timbre::Timbre;
use crate::error::NotationError;
use crate::pitch::{self, REST};

/// Unit length used when a tune has no `L:` header.
pub const DEFAULT_UNIT_LENGTH: f64 = 1.0 / 8.0;

/// One parsed tune.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tune {
    pub index: Option<u32>,
    pub title: String,
    pub tempo: Tempo,
    /// Time signature as (beats per bar, beat unit).
    pub meter: (u32, u32),
    pub key: String,
    /// Fraction of a whole note that a bare letter lasts.
    pub unit_length: f64,
    pub events: Vec<ScoreEvent>,
}

impl Default for Tune {
    fn default() -> Self {
        Tune {
            index: None,
            title: "Untitled".to_string(),
            tempo: Tempo::default(),
            meter: (4, 4),
            key: "C".to_string(),
            unit_length: DEFAULT_UNIT_LENGTH,
            events: Vec::new(),
        }
    }
}

impl Tune {
    /// Turn the tune into a voice named after its title.
    pub fn into_voice(self, timbre: Timbre) -> Voice {
        Voice::new(self.title, timbre, self.events)
    }

    /// Length of the tune in quarter-note beats.
    pub fn total_beats(&self) -> f64 {
        self.events.iter().map(ScoreEvent::beats).sum()
    }
}

/// Parse a single tune.
pub fn parse_tune(source: &str) -> Result<Tune, NotationError> {
    TuneParser::new(source, 0).parse()
}

/// Parse a file holding several tunes, each starting at an `X:` line.
///
/// Text before the first `X:` line is ignored, unless there is no `X:`
/// line at all, in which case the whole input is one tune.
pub fn parse_book(source: &str) -> Result<Vec<Tune>, NotationError> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        if line.trim_start().starts_with("X:") {
            starts.push(offset);
        }
        offset += line.len();
    }
    if starts.is_empty() {
        return Ok(vec![parse_tune(source)?]);
    }

    let mut tunes = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(source.len());
        tunes.push(TuneParser::new(&source[start..end], start).parse()?);
    }
    Ok(tunes)
}

struct TuneParser<'a> {
    source: &'a str,
    /// Byte offset of `source` within the text reported in errors.
    base: usize,
    tune: Tune,
}

impl<'a> TuneParser<'a> {
    fn new(source: &'a str, base: usize) -> Self {
        TuneParser {
            source,
            base,
            tune: Tune::default(),
        }
    }

    fn parse(mut self) -> Result<Tune, NotationError> {
        let mut offset = 0;
        for raw in self.source.split_inclusive('\n') {
            let line_start = self.base + offset;
            offset += raw.len();

            let line = raw.trim_end();
            let indent = line.len() - line.trim_start().len();
            let line = line.trim_start();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            if is_header(line) {
                self.header(line, line_start + indent)?;
            } else {
                let events = BodyScanner::new(line, line_start + indent, self.tune.unit_length).scan()?;
                self.tune.events.extend(events);
            }
        }
        Ok(self.tune)
    }

    fn header(&mut self, line: &str, pos: usize) -> Result<(), NotationError> {
        let value = line[2..].trim();
        let invalid = || NotationError::InvalidHeader {
            text: line.to_string(),
            pos,
        };
        match &line[..1] {
            "X" => self.tune.index = Some(value.parse().map_err(|_| invalid())?),
            "T" => self.tune.title = value.to_string(),
            "K" => self.tune.key = value.to_string(),
            "M" => {
                // free meter (`M:none`) and anything unreadable keep the default
                let meter = match value {
                    "C" => Some((4, 4)),
                    "C|" => Some((2, 2)),
                    _ => parse_ratio(value),
                };
                if let Some(meter) = meter {
                    self.tune.meter = meter;
                }
            }
            "L" => {
                let (num, den) = parse_ratio(value).ok_or_else(invalid)?;
                self.tune.unit_length = num as f64 / den as f64;
            }
            "Q" => self.tune.tempo = parse_tempo(value).ok_or_else(invalid)?,
            // Voice, composer, notes, etc. carry nothing we render.
            _ => {}
        }
        Ok(())
    }
}

/// Field lines are a letter and a colon, e.g. `T:Title` or `w:lyrics`.
fn is_header(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// `n/m` with both parts positive.
fn parse_ratio(text: &str) -> Option<(u32, u32)> {
    let (num, den) = text.split_once('/')?;
    let num: u32 = num.trim().parse().ok()?;
    let den: u32 = den.trim().parse().ok()?;
    (num > 0 && den > 0).then_some((num, den))
}

/// `Q:1/4=120`, `Q:3/8=40` or a bare `Q:120`, normalized to quarter-note BPM.
fn parse_tempo(text: &str) -> Option<Tempo> {
    let (beat, bpm) = match text.split_once('=') {
        Some((unit, bpm)) => {
            let (num, den) = parse_ratio(unit)?;
            (num as f64 / den as f64, bpm)
        }
        None => (0.25, text),
    };
    let bpm: f64 = bpm.trim().parse().ok()?;
    (bpm.is_finite() && bpm > 0.0).then(|| Tempo(bpm * beat / 0.25))
}

/// Walks one line of note text.
struct BodyScanner<'a> {
    chars: Vec<(usize, char)>,
    line: &'a str,
    base: usize,
    pos: usize,
    unit_length: f64,
}

impl<'a> BodyScanner<'a> {
    fn new(line: &'a str, base: usize, unit_length: f64) -> Self {
        BodyScanner {
            chars: line.char_indices().collect(),
            line,
            base,
            pos: 0,
            unit_length,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).map(|&(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// Absolute byte position of char index `idx`.
    fn byte_pos_of(&self, idx: usize) -> usize {
        self.base
            + self
                .chars
                .get(idx)
                .map_or(self.line.len(), |&(byte, _)| byte)
    }

    fn scan(mut self) -> Result<Vec<ScoreEvent>, NotationError> {
        let mut events = Vec::new();
        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | ':' | ']' | '-' | '(' | ')' | '~' | '.' | '>' | '<' | '\\' | '&' => {
                    self.advance();
                }
                '%' => break,
                '"' => self.skip_until('"'),
                '!' => self.skip_until('!'),
                '+' => self.skip_until('+'),
                '{' => self.skip_until('}'),
                '[' if self.peek_at(1).is_some_and(starts_note) => {
                    events.push(self.chord()?);
                }
                '|' | '[' => {
                    self.advance();
                    self.skip_ending();
                }
                'z' | 'x' | 'Z' => {
                    self.advance();
                    let beats = self.length()?;
                    events.push(ScoreEvent::note(REST, beats));
                }
                c if starts_note(c) => {
                    let midi = self.pitch()?;
                    let beats = self.length()?;
                    events.push(ScoreEvent::note(pitch::midi_to_note_name(midi), beats));
                }
                c => {
                    return Err(NotationError::UnexpectedChar {
                        ch: c,
                        pos: self.byte_pos_of(self.pos),
                    });
                }
            }
        }
        Ok(events)
    }

    /// Skip an opening delimiter and everything up to `close` (or the line end).
    fn skip_until(&mut self, close: char) {
        self.advance();
        while let Some(c) = self.advance() {
            if c == close {
                break;
            }
        }
    }

    /// Ending numbers after a bar line, e.g. the `1` in `|1` or `1,3` in `[1,3`.
    fn skip_ending(&mut self) {
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == ',' || c == '-') {
            self.advance();
        }
    }

    /// `[` notes `]` length. A chord's own length scales its notes' length.
    fn chord(&mut self) -> Result<ScoreEvent, NotationError> {
        self.advance();
        let mut symbols = Vec::new();
        let mut inner = None;
        loop {
            match self.peek() {
                Some(']') => {
                    self.advance();
                    break;
                }
                Some(' ') => {
                    self.advance();
                }
                Some(c) if starts_note(c) => {
                    let midi = self.pitch()?;
                    let beats = self.length()?;
                    inner.get_or_insert(beats);
                    symbols.push(pitch::midi_to_note_name(midi));
                }
                Some(c) => {
                    return Err(NotationError::UnexpectedChar {
                        ch: c,
                        pos: self.byte_pos_of(self.pos),
                    });
                }
                None => {
                    return Err(NotationError::UnexpectedChar {
                        ch: '[',
                        pos: self.byte_pos_of(self.pos.saturating_sub(1)),
                    });
                }
            }
        }
        let unit = 4.0 * self.unit_length;
        let inner = inner.unwrap_or(unit);
        let outer = self.length()?;
        Ok(ScoreEvent::Chord(symbols, inner * outer / unit))
    }

    /// Accidentals, letter and octave marks, as a MIDI number.
    fn pitch(&mut self) -> Result<i32, NotationError> {
        let start = self.pos;
        let mut accidental = 0;
        while let Some(c) = self.peek() {
            match c {
                '^' => accidental += 1,
                '_' => accidental -= 1,
                '=' => accidental = 0,
                _ => break,
            }
            self.advance();
        }

        let letter = match self.peek() {
            Some(c) if is_note_letter(c) => c,
            _ => {
                return Err(NotationError::DanglingAccidental {
                    pos: self.byte_pos_of(start),
                });
            }
        };
        self.advance();

        let mut octave = if letter.is_ascii_uppercase() { 4 } else { 5 };
        while let Some(c) = self.peek() {
            match c {
                '\'' => octave += 1,
                ',' => octave -= 1,
                _ => break,
            }
            self.advance();
        }

        let semitone = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            _ => 11,
        };
        Ok((octave + 1) * 12 + semitone + accidental)
    }

    /// Optional length suffix, returned in quarter-note beats.
    fn length(&mut self) -> Result<f64, NotationError> {
        let start = self.pos;
        let num = self.digits();
        let mut den: u32 = 1;
        let mut invalid = false;
        while self.peek() == Some('/') {
            self.advance();
            match self.digits() {
                Some(d) if d > 0 => den = den.saturating_mul(d),
                Some(_) => invalid = true,
                None => den = den.saturating_mul(2),
            }
        }
        if num == Some(0) {
            invalid = true;
        }
        if invalid {
            let text = self.line[self.byte_pos_of(start) - self.base..self.byte_pos_of(self.pos) - self.base].to_string();
            return Err(NotationError::InvalidLength {
                text,
                pos: self.byte_pos_of(start),
            });
        }
        let fraction = num.unwrap_or(1) as f64 / den as f64;
        Ok(fraction * self.unit_length * 4.0)
    }

    fn digits(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            value = value.saturating_mul(10).saturating_add(d);
            self.advance();
        }
        (self.pos > start).then_some(value)
    }
}

fn is_note_letter(c: char) -> bool {
    matches!(c, 'A'..='G' | 'a'..='g')
}

fn starts_note(c: char) -> bool {
    is_note_letter(c) || matches!(c, '^' | '_' | '=')
}
