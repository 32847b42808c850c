//! Voice renderer — turns one voice's event list into a mono track.

use crate::composition::{ScoreEvent, Tempo, Voice};
use crate::pitch;

use super::buffer::RenderedTrack;
use super::noise::NoiseSource;
use super::timbre::{DrumLevels, Timbre};

/// Peak a summed chord is rescaled to.
pub const CHORD_PEAK: f64 = 0.4;

/// Renders voices at a fixed tempo and sample rate.
#[derive(Debug, Clone, Copy)]
pub struct VoiceRenderer {
    pub tempo: Tempo,
    pub sample_rate: f64,
}

impl VoiceRenderer {
    pub fn new(tempo: Tempo, sample_rate: f64) -> Self {
        VoiceRenderer { tempo, sample_rate }
    }

    /// Render every event of `voice` in order, `loops` times over.
    ///
    /// Events with a non-positive length add nothing. Symbols that don't
    /// resolve come out as silence.
    pub fn render(&self, voice: &Voice, loops: u32, noise: &mut NoiseSource) -> RenderedTrack {
        let amplitude = voice.amplitude();
        let levels = voice.drum_levels();
        let mut track = RenderedTrack::new();
        for _ in 0..loops {
            for event in &voice.events {
                let seconds = self.tempo.beats_to_seconds(event.beats());
                if !seconds.is_finite() || seconds <= 0.0 {
                    continue;
                }
                match event {
                    ScoreEvent::Note(symbol, _) => {
                        let sound = pitch::resolve(symbol);
                        track.extend(voice.timbre.synthesize_with_levels(
                            sound,
                            seconds,
                            self.sample_rate,
                            amplitude,
                            &levels,
                            noise,
                        ));
                    }
                    ScoreEvent::Chord(symbols, _) => {
                        track.extend(self.chord(voice.timbre, symbols, seconds, amplitude, &levels, noise));
                    }
                }
            }
        }
        track
    }

    fn chord(
        &self,
        timbre: Timbre,
        symbols: &[String],
        seconds: f64,
        amplitude: f64,
        levels: &DrumLevels,
        noise: &mut NoiseSource,
    ) -> Vec<f64> {
        let mut sum = vec![0.0; super::oscillator::sample_count(seconds, self.sample_rate)];
        for symbol in symbols {
            let sound = pitch::resolve(symbol);
            let part = timbre.synthesize_with_levels(sound, seconds, self.sample_rate, amplitude, levels, noise);
            for (acc, s) in sum.iter_mut().zip(part) {
                *acc += s;
            }
        }

        let peak = sum.iter().fold(0.0_f64, |m, s| m.max(s.abs()));
        if peak > 0.0 {
            let gain = CHORD_PEAK / peak;
            for s in sum.iter_mut() {
                *s *= gain;
            }
        }
        sum
    }
}

/// Render a single voice.
pub fn render_voice(
    voice: &Voice,
    tempo: Tempo,
    sample_rate: f64,
    loops: u32,
    noise: &mut NoiseSource,
) -> RenderedTrack {
    VoiceRenderer::new(tempo, sample_rate).render(voice, loops, noise)
}
