//! Mixer — pads, reverbs, pans and sums voices, then normalizes.

use log::debug;

use super::buffer::{RenderedTrack, StereoBuffer};
use super::panner;
use super::reverb::{DEFAULT_DECAY, Reverb};

/// Peak level the final mix is scaled to.
pub const DEFAULT_HEADROOM: f64 = 0.9;

/// One voice's contribution to the mix.
#[derive(Debug, Clone)]
pub struct MixSpec {
    pub track: RenderedTrack,
    /// Stereo position in [-1, 1].
    pub pan: f64,
    /// Reverb room size in [0, 1]; 0 keeps the voice dry.
    pub reverb: f64,
}

impl MixSpec {
    pub fn new(track: RenderedTrack, pan: f64, reverb: f64) -> Self {
        MixSpec { track, pan, reverb }
    }
}

/// A summing mixer that normalizes its output to a fixed peak.
#[derive(Debug, Clone)]
pub struct Mixer {
    pub sample_rate: f64,
    /// Peak the mixed output is normalized to.
    pub headroom: f64,
    /// Per-tap decay handed to each voice's reverb.
    pub reverb_decay: f64,
}

impl Mixer {
    pub fn new(sample_rate: f64) -> Self {
        Mixer {
            sample_rate,
            headroom: DEFAULT_HEADROOM,
            reverb_decay: DEFAULT_DECAY,
        }
    }

    /// Mix all contributions into one stereo buffer.
    ///
    /// Callers must pass at least one spec. Every track is padded to the
    /// longest one; reverb tails past that length are cut.
    pub fn mix(&self, specs: Vec<MixSpec>) -> StereoBuffer {
        debug_assert!(!specs.is_empty(), "mixing requires at least one voice");

        let len = specs.iter().map(|s| s.track.len()).max().unwrap_or(0);
        let mut out = StereoBuffer::silent(len);

        for spec in specs {
            let MixSpec {
                mut track,
                pan,
                reverb,
            } = spec;
            track.resize(len, 0.0);

            if reverb > 0.0 {
                track = Reverb::with_params(self.sample_rate, reverb, self.reverb_decay).process(&track);
                track.truncate(len);
            }

            out.accumulate(&panner::pan(&track, pan));
        }

        let peak = out.peak();
        debug!("mixed {len} frames, raw peak {peak:.4}");
        out.normalize_to(self.headroom);
        out
    }
}

/// Mix with default settings.
pub fn mix(specs: Vec<MixSpec>, sample_rate: f64) -> StereoBuffer {
    Mixer::new(sample_rate).mix(specs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(len: usize, amp: f64) -> Vec<f64> {
        (0..len)
            .map(|n| amp * (2.0 * std::f64::consts::PI * 440.0 * n as f64 / 44100.0).sin())
            .collect()
    }

    #[test]
    fn pads_to_longest_track() {
        let out = mix(
            vec![MixSpec::new(tone(100, 0.5), 0.0, 0.0), MixSpec::new(tone(300, 0.5), 0.0, 0.0)],
            44100.0,
        );
        assert_eq!(out.len(), 300);
        assert_eq!(out.left().len(), out.right().len());
    }

    #[test]
    fn reverb_tail_is_truncated() {
        let out = mix(vec![MixSpec::new(tone(1000, 0.5), 0.3, 0.6)], 44100.0);
        assert_eq!(out.len(), 1000);
    }

    #[test]
    fn peak_is_headroom() {
        let out = mix(
            vec![
                MixSpec::new(tone(4410, 3.0), -0.5, 0.2),
                MixSpec::new(tone(4410, 2.0), 0.7, 0.0),
                MixSpec::new(tone(2000, 5.0), 0.0, 0.4),
            ],
            44100.0,
        );
        assert!((out.peak() - DEFAULT_HEADROOM).abs() < 1e-9, "peak {}", out.peak());
    }

    #[test]
    fn quiet_input_is_raised_to_headroom() {
        let out = mix(vec![MixSpec::new(tone(4410, 0.01), 0.0, 0.0)], 44100.0);
        assert!((out.peak() - DEFAULT_HEADROOM).abs() < 1e-9);
    }

    #[test]
    fn silence_stays_silent() {
        let out = mix(
            vec![MixSpec::new(vec![0.0; 64], 0.0, 0.5), MixSpec::new(vec![0.0; 32], 1.0, 0.0)],
            44100.0,
        );
        assert_eq!(out.len(), 64);
        assert_eq!(out.peak(), 0.0);
    }

    #[test]
    fn hard_pan_keeps_other_side_silent() {
        let out = mix(vec![MixSpec::new(tone(500, 0.5), -1.0, 0.0)], 44100.0);
        assert!(out.right().iter().all(|&s| s == 0.0));
        assert!(out.left().iter().any(|&s| s != 0.0));
    }
}
