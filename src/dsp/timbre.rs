//! Timbre — which oscillator recipe a voice plays with.

use serde::{Deserialize, Serialize};

use crate::pitch::{Drum, Sound};

use super::noise::NoiseSource;
use super::oscillator::{self, StringSection};

/// Instrument families understood by the oscillator bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timbre {
    /// Additive sine lead.
    Lead,
    Bass,
    Violin,
    Viola,
    Cello,
    Brass,
    Piano,
    Choir,
    /// Square-wave retro lead.
    Chip,
    Timpani,
    /// Drum kit; events name pieces (`kick`, `snare`, `hihat`, `openhat`).
    Drums,
}

impl Timbre {
    /// Amplitude used when a voice does not set one.
    pub fn default_amplitude(self) -> f64 {
        match self {
            Timbre::Lead => 0.4,
            Timbre::Bass => 0.5,
            Timbre::Violin => 0.2,
            Timbre::Viola => 0.3,
            Timbre::Cello => 0.4,
            Timbre::Brass => 0.45,
            Timbre::Piano => 0.3,
            Timbre::Choir => 0.35,
            Timbre::Chip => 1.0,
            Timbre::Timpani => 0.6,
            // Scales the per-piece levels below.
            Timbre::Drums => 1.0,
        }
    }

    /// Render one sound of this timbre.
    ///
    /// Sounds that don't fit the timbre (a drum tag in a melodic voice, a
    /// pitch in a drum kit) come out as silence of the right length.
    pub fn synthesize(
        self,
        sound: Sound,
        duration: f64,
        sample_rate: f64,
        amplitude: f64,
        noise: &mut NoiseSource,
    ) -> Vec<f64> {
        self.synthesize_with_levels(sound, duration, sample_rate, amplitude, &DrumLevels::default(), noise)
    }

    /// Like [`Timbre::synthesize`], with explicit per-piece drum levels.
    pub fn synthesize_with_levels(
        self,
        sound: Sound,
        duration: f64,
        sample_rate: f64,
        amplitude: f64,
        levels: &DrumLevels,
        noise: &mut NoiseSource,
    ) -> Vec<f64> {
        match (self, sound) {
            (Timbre::Drums, Sound::Drum(drum)) => {
                let level = amplitude * levels.level(drum);
                match drum {
                    Drum::Kick => oscillator::kick(duration, sample_rate, level, noise),
                    Drum::Snare => oscillator::snare(duration, sample_rate, level, noise),
                    Drum::ClosedHat => oscillator::hihat(duration, sample_rate, level, false, noise),
                    Drum::OpenHat => oscillator::hihat(duration, sample_rate, level, true, noise),
                }
            }
            (Timbre::Drums, _) | (_, Sound::Drum(_)) | (_, Sound::Silence) => {
                vec![0.0; oscillator::sample_count(duration, sample_rate)]
            }
            (timbre, Sound::Pitch(freq)) => timbre.pitched(freq, duration, sample_rate, amplitude, noise),
        }
    }

    fn pitched(self, freq: f64, duration: f64, sample_rate: f64, amplitude: f64, noise: &mut NoiseSource) -> Vec<f64> {
        match self {
            Timbre::Lead => oscillator::tonal(freq, duration, sample_rate, amplitude),
            Timbre::Bass => oscillator::bass(freq, duration, sample_rate, amplitude),
            Timbre::Violin => oscillator::bowed_string(freq, duration, sample_rate, amplitude, StringSection::Violin),
            Timbre::Viola => oscillator::bowed_string(freq, duration, sample_rate, amplitude, StringSection::Viola),
            Timbre::Cello => oscillator::bowed_string(freq, duration, sample_rate, amplitude, StringSection::Cello),
            Timbre::Brass => oscillator::brass(freq, duration, sample_rate, amplitude),
            Timbre::Piano => oscillator::piano(freq, duration, sample_rate, amplitude),
            Timbre::Choir => oscillator::choir(freq, duration, sample_rate, amplitude),
            Timbre::Chip => oscillator::chip(freq, duration, sample_rate, amplitude),
            Timbre::Timpani => oscillator::timpani(freq, duration, sample_rate, amplitude, noise),
            Timbre::Drums => vec![0.0; oscillator::sample_count(duration, sample_rate)],
        }
    }
}

/// Relative level of each kit piece, scaled by the voice amplitude.
///
/// Open and closed hats share `hihat`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrumLevels {
    pub kick: f64,
    pub snare: f64,
    pub hihat: f64,
}

impl DrumLevels {
    pub const fn new(kick: f64, snare: f64, hihat: f64) -> Self {
        DrumLevels { kick, snare, hihat }
    }

    pub const STANDARD: DrumLevels = DrumLevels::new(0.7, 0.5, 0.3);
    /// Heavier kit for fight music.
    pub const BATTLE: DrumLevels = DrumLevels::new(0.8, 0.6, 0.4);
    pub const BOSS: DrumLevels = DrumLevels::new(0.9, 0.7, 0.3);

    pub fn level(&self, drum: Drum) -> f64 {
        match drum {
            Drum::Kick => self.kick,
            Drum::Snare => self.snare,
            Drum::ClosedHat | Drum::OpenHat => self.hihat,
        }
    }
}

impl Default for DrumLevels {
    fn default() -> Self {
        DrumLevels::STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 22050.0;

    #[test]
    fn mismatched_sounds_are_silent() {
        let mut noise = NoiseSource::new(0);
        let drum_in_lead = Timbre::Lead.synthesize(Sound::Drum(Drum::Kick), 0.5, SR, 0.4, &mut noise);
        assert_eq!(drum_in_lead.len(), 11025);
        assert!(drum_in_lead.iter().all(|&s| s == 0.0));

        let pitch_in_kit = Timbre::Drums.synthesize(Sound::Pitch(440.0), 0.5, SR, 1.0, &mut noise);
        assert_eq!(pitch_in_kit.len(), 11025);
        assert!(pitch_in_kit.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn every_timbre_sounds() {
        let timbres = [
            Timbre::Lead,
            Timbre::Bass,
            Timbre::Violin,
            Timbre::Viola,
            Timbre::Cello,
            Timbre::Brass,
            Timbre::Piano,
            Timbre::Choir,
            Timbre::Chip,
            Timbre::Timpani,
        ];
        let mut noise = NoiseSource::new(0);
        for timbre in timbres {
            let out = timbre.synthesize(Sound::Pitch(220.0), 0.5, SR, timbre.default_amplitude(), &mut noise);
            assert!(out.iter().any(|s| s.abs() > 1e-3), "{timbre:?} is silent");
        }
        let kick = Timbre::Drums.synthesize(Sound::Drum(Drum::Kick), 0.25, SR, 1.0, &mut noise);
        assert!(kick.iter().any(|s| s.abs() > 1e-3));
    }

    #[test]
    fn drum_levels_scale_each_piece() {
        let peak = |out: Vec<f64>| out.iter().fold(0.0_f64, |m, s| m.max(s.abs()));
        let render = |levels: &DrumLevels, drum: Drum| {
            let mut noise = NoiseSource::new(11);
            Timbre::Drums.synthesize_with_levels(Sound::Drum(drum), 0.25, SR, 1.0, levels, &mut noise)
        };

        let standard = peak(render(&DrumLevels::STANDARD, Drum::Kick));
        let boss = peak(render(&DrumLevels::BOSS, Drum::Kick));
        assert!((boss / standard - 0.9 / 0.7).abs() < 1e-9);

        let muted_snare = DrumLevels::new(0.7, 0.0, 0.3);
        assert_eq!(peak(render(&muted_snare, Drum::Snare)), 0.0);
        assert_eq!(
            render(&muted_snare, Drum::OpenHat),
            render(&DrumLevels::STANDARD, Drum::OpenHat)
        );
    }

    #[test]
    fn default_synthesize_uses_standard_levels() {
        let a = Timbre::Drums.synthesize(Sound::Drum(Drum::Snare), 0.1, SR, 1.0, &mut NoiseSource::new(3));
        let b = Timbre::Drums.synthesize_with_levels(
            Sound::Drum(Drum::Snare),
            0.1,
            SR,
            1.0,
            &DrumLevels::STANDARD,
            &mut NoiseSource::new(3),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn partial_drum_levels_keep_defaults() {
        let levels: DrumLevels = serde_json::from_str(r#"{"kick": 0.9}"#).unwrap();
        assert_eq!(levels, DrumLevels::new(0.9, 0.5, 0.3));
    }

    #[test]
    fn names_deserialize_lowercase() {
        let t: Timbre = serde_json::from_str("\"cello\"").unwrap();
        assert_eq!(t, Timbre::Cello);
        assert_eq!(serde_json::to_string(&Timbre::Drums).unwrap(), "\"drums\"");
    }
}
