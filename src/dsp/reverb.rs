//! Reverb effect — multi-tap delay.
//!
//! A handful of short echoes summed back onto the dry signal. This is not a
//! room model; it just adds a little space behind each voice.

/// Tap delays in seconds, shortest first.
const TAP_TIMES: [f64; 4] = [0.029, 0.037, 0.043, 0.053];

/// Per-tap attenuation base used when none is given.
pub const DEFAULT_DECAY: f64 = 0.5;

/// A mono multi-tap reverb.
#[derive(Debug, Clone)]
pub struct Reverb {
    /// Room size (0.0 to 1.0). Scales every echo.
    pub room_size: f64,
    /// Decay (0.0 to 1.0). Tap `i` is attenuated by `decay^i`.
    pub decay: f64,
    /// Tap delays in samples.
    taps: Vec<usize>,
}

impl Reverb {
    /// Create a reverb with default settings.
    pub fn new(sample_rate: f64) -> Self {
        Self::with_params(sample_rate, 0.3, DEFAULT_DECAY)
    }

    /// Create a reverb with specific parameters.
    pub fn with_params(sample_rate: f64, room_size: f64, decay: f64) -> Self {
        let taps = TAP_TIMES
            .iter()
            .map(|&t| (t * sample_rate).round() as usize)
            .collect();
        Reverb {
            room_size: clamp_unit(room_size),
            decay: clamp_unit(decay),
            taps,
        }
    }

    /// Longest tap delay in samples; the output grows by this much.
    pub fn tail_len(&self) -> usize {
        self.taps.iter().copied().max().unwrap_or(0)
    }

    /// Gain applied to tap `index` (0-based).
    pub fn tap_gain(&self, index: usize) -> f64 {
        self.room_size * self.decay.powi(index as i32 + 1)
    }

    /// Dry signal plus delayed copies. The input is left untouched.
    pub fn process(&self, input: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(input.len() + self.tail_len());
        out.extend_from_slice(input);
        out.resize(input.len() + self.tail_len(), 0.0);

        for (i, &delay) in self.taps.iter().enumerate() {
            let gain = self.tap_gain(i);
            if gain == 0.0 {
                continue;
            }
            for (dst, &src) in out[delay..].iter_mut().zip(input) {
                *dst += src * gain;
            }
        }
        out
    }
}

fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}
