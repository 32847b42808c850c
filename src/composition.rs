//! Composition model — the declarative score the engine renders.
//!
//! A composition is a tempo plus a list of voices, each an ordered list of
//! note and chord events measured in beats. It is usually loaded from JSON:
//!
//! ```json
//! {
//!   "tempo": 120,
//!   "voices": [
//!     { "name": "melody", "timbre": "lead", "events": [["A4", 1], ["rest", 1]] },
//!     { "name": "pad", "timbre": "choir", "events": [[["C4", "E4", "G4"], 2]] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::dsp::timbre::{DrumLevels, Timbre};
use crate::error::CompositionError;
use crate::preset::MixPreset;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_SEED: u64 = 0x5C0E_3A1C;

/// One entry in a voice's event list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreEvent {
    /// A single symbol (pitch, drum tag or `rest`) held for some beats.
    Note(String, f64),
    /// Several pitches struck together for the same number of beats.
    Chord(Vec<String>, f64),
}

impl ScoreEvent {
    pub fn note(symbol: impl Into<String>, beats: f64) -> Self {
        ScoreEvent::Note(symbol.into(), beats)
    }

    pub fn chord<S: Into<String>>(symbols: impl IntoIterator<Item = S>, beats: f64) -> Self {
        ScoreEvent::Chord(symbols.into_iter().map(Into::into).collect(), beats)
    }

    pub fn beats(&self) -> f64 {
        match self {
            ScoreEvent::Note(_, beats) | ScoreEvent::Chord(_, beats) => *beats,
        }
    }
}

/// Beats per minute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tempo(pub f64);

impl Tempo {
    pub fn bpm(self) -> f64 {
        self.0
    }

    pub fn seconds_per_beat(self) -> f64 {
        60.0 / self.0
    }

    pub fn beats_to_seconds(self, beats: f64) -> f64 {
        beats * self.seconds_per_beat()
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Tempo(120.0)
    }
}

/// A single part of the arrangement.
///
/// `amplitude`, `pan` and `reverb` fall back to the timbre's defaults
/// when left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    pub name: String,
    pub timbre: Timbre,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverb: Option<f64>,
    /// Per-piece levels for a drum-kit voice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drum_levels: Option<DrumLevels>,
    #[serde(default)]
    pub events: Vec<ScoreEvent>,
}

impl Voice {
    pub fn new(name: impl Into<String>, timbre: Timbre, events: Vec<ScoreEvent>) -> Self {
        Voice {
            name: name.into(),
            timbre,
            amplitude: None,
            pan: None,
            reverb: None,
            drum_levels: None,
            events,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = Some(amplitude);
        self
    }

    pub fn with_pan(mut self, pan: f64) -> Self {
        self.pan = Some(pan);
        self
    }

    pub fn with_reverb(mut self, reverb: f64) -> Self {
        self.reverb = Some(reverb);
        self
    }

    pub fn with_drum_levels(mut self, levels: DrumLevels) -> Self {
        self.drum_levels = Some(levels);
        self
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude.unwrap_or_else(|| self.timbre.default_amplitude())
    }

    pub fn pan(&self) -> f64 {
        self.pan.unwrap_or_else(|| MixPreset::for_timbre(self.timbre).pan)
    }

    pub fn reverb(&self) -> f64 {
        self.reverb.unwrap_or_else(|| MixPreset::for_timbre(self.timbre).reverb)
    }

    pub fn drum_levels(&self) -> DrumLevels {
        self.drum_levels.unwrap_or_default()
    }

    /// Total length of one pass through the events, in beats.
    pub fn total_beats(&self) -> f64 {
        self.events.iter().map(|e| e.beats().max(0.0)).sum()
    }
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_loops() -> u32 {
    1
}

/// A full piece: tempo, render settings and voices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    #[serde(default)]
    pub tempo: Tempo,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Seed for percussion noise. Same seed, same output.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// How many times every voice is played back to back.
    #[serde(default = "default_loops")]
    pub loops: u32,
    #[serde(default)]
    pub voices: Vec<Voice>,
}

impl Composition {
    pub fn new(tempo: Tempo, voices: Vec<Voice>) -> Self {
        Composition {
            tempo,
            sample_rate: DEFAULT_SAMPLE_RATE,
            seed: DEFAULT_SEED,
            loops: 1,
            voices,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_loops(mut self, loops: u32) -> Self {
        self.loops = loops;
        self
    }

    /// Parse and validate a JSON composition.
    pub fn from_json(json: &str) -> Result<Self, CompositionError> {
        let composition: Composition = serde_json::from_str(json)?;
        composition.validate()?;
        Ok(composition)
    }

    pub fn to_json(&self) -> Result<String, CompositionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), CompositionError> {
        let bpm = self.tempo.bpm();
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(CompositionError::InvalidTempo(bpm));
        }
        if self.sample_rate == 0 {
            return Err(CompositionError::InvalidSampleRate);
        }
        Ok(())
    }

    pub fn voice(&self, name: &str) -> Option<&Voice> {
        self.voices.iter().find(|v| v.name == name)
    }
}
