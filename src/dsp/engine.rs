//! Audio Engine — renders a Composition to a stereo buffer.
//!
//! Each voice is rendered to its own mono track, then handed to the mixer
//! with its pan and reverb settings. Voices draw percussion noise from
//! their own stream, derived from the composition seed and the voice's
//! position, so one voice never shifts another's randomness.

use log::debug;

use crate::composition::Composition;

use super::buffer::StereoBuffer;
use super::mixer::{DEFAULT_HEADROOM, MixSpec, Mixer};
use super::noise::NoiseSource;
use super::voice::VoiceRenderer;

/// Milestones reported while a composition renders.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderProgress {
    /// One voice finished rendering to a mono track.
    VoiceRendered { name: String, samples: usize },
    /// All voices were mixed; `peak` is the normalized output peak.
    Mixed { samples: usize, peak: f64 },
}

/// The offline rendering engine.
#[derive(Debug, Clone)]
pub struct AudioEngine {
    pub sample_rate: f64,
    /// Peak level of the final mix.
    pub headroom: f64,
    /// Seed for every voice's noise stream.
    pub seed: u64,
}

impl AudioEngine {
    pub fn new(sample_rate: f64, seed: u64) -> Self {
        AudioEngine {
            sample_rate,
            headroom: DEFAULT_HEADROOM,
            seed,
        }
    }

    /// Engine configured with the composition's sample rate and seed.
    pub fn from_composition(composition: &Composition) -> Self {
        Self::new(composition.sample_rate as f64, composition.seed)
    }

    /// Render a composition to stereo.
    pub fn render(&self, composition: &Composition) -> StereoBuffer {
        self.render_with_progress(composition, |_| {})
    }

    /// Render a composition, reporting each finished step.
    ///
    /// A composition without voices renders to an empty buffer.
    pub fn render_with_progress(
        &self,
        composition: &Composition,
        mut progress: impl FnMut(RenderProgress),
    ) -> StereoBuffer {
        if composition.voices.is_empty() {
            debug!("composition has no voices, nothing to render");
            return StereoBuffer::silent(0);
        }

        let renderer = VoiceRenderer::new(composition.tempo, self.sample_rate);
        let mut specs = Vec::with_capacity(composition.voices.len());

        for (index, voice) in composition.voices.iter().enumerate() {
            let mut noise = NoiseSource::for_stream(self.seed, index as u64);
            let track = renderer.render(voice, composition.loops, &mut noise);
            debug!(
                "rendered voice '{}' ({:?}): {} samples",
                voice.name,
                voice.timbre,
                track.len()
            );
            progress(RenderProgress::VoiceRendered {
                name: voice.name.clone(),
                samples: track.len(),
            });
            specs.push(MixSpec::new(track, voice.pan(), voice.reverb()));
        }

        let mut mixer = Mixer::new(self.sample_rate);
        mixer.headroom = self.headroom;
        let out = mixer.mix(specs);

        progress(RenderProgress::Mixed {
            samples: out.len(),
            peak: out.peak(),
        });
        out
    }

    /// Render and quantize to interleaved 16-bit stereo PCM.
    pub fn render_pcm_i16(&self, composition: &Composition) -> Vec<i16> {
        self.render(composition).to_pcm_i16()
    }
}
