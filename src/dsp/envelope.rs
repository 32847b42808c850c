//! ADSR Envelope shaper.
//!
//! Unlike a gated, per-sample envelope, every note here is rendered offline
//! with a known length, so the whole curve is laid out up front: attack from
//! the start, release always owning the tail.

/// ADSR envelope with linear attack/decay/release ramps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    /// Attack time in seconds.
    pub attack: f64,
    /// Decay time in seconds.
    pub decay: f64,
    /// Sustain level [0, 1].
    pub sustain: f64,
    /// Release time in seconds.
    pub release: f64,
}

impl Default for Adsr {
    fn default() -> Self {
        Adsr {
            attack: 0.01,
            decay: 0.05,
            sustain: 0.7,
            release: 0.1,
        }
    }
}

/// Sample counts for each stage of one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segments {
    pub attack: usize,
    pub decay: usize,
    pub sustain: usize,
    pub release: usize,
}

impl Adsr {
    pub const fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Adsr {
            attack,
            decay,
            sustain,
            release,
        }
    }

    fn sustain_level(&self) -> f64 {
        if self.sustain.is_finite() {
            self.sustain.max(0.0)
        } else {
            0.0
        }
    }

    /// Size the four stages for a note of `len` samples.
    ///
    /// If attack + decay + release do not fit, all three shrink in
    /// proportion and sustain gets nothing.
    pub fn segments(&self, len: usize, sample_rate: f64) -> Segments {
        let attack = seconds_to_samples(self.attack, sample_rate);
        let decay = seconds_to_samples(self.decay, sample_rate);
        let release = seconds_to_samples(self.release, sample_rate);
        let requested = attack.saturating_add(decay).saturating_add(release);

        if requested <= len {
            return Segments {
                attack,
                decay,
                sustain: len - requested,
                release,
            };
        }

        let scaled = |n: usize| (n as u128 * len as u128 / requested as u128) as usize;
        let attack = scaled(attack).min(len);
        let decay = scaled(decay).min(len - attack);
        Segments {
            attack,
            decay,
            sustain: 0,
            release: len - attack - decay,
        }
    }

    /// The envelope curve for a note of `len` samples.
    pub fn levels(&self, len: usize, sample_rate: f64) -> Vec<f64> {
        let seg = self.segments(len, sample_rate);
        let sustain = self.sustain_level();

        let mut env = Vec::with_capacity(len);
        extend_ramp(&mut env, 0.0, 1.0, seg.attack);
        extend_ramp(&mut env, 1.0, sustain, seg.decay);
        env.resize(env.len() + seg.sustain, sustain);
        extend_ramp(&mut env, sustain, 0.0, seg.release);
        debug_assert_eq!(env.len(), len);
        env
    }

    /// Return a copy of `samples` shaped by this envelope.
    pub fn apply(&self, samples: &[f64], sample_rate: f64) -> Vec<f64> {
        let env = self.levels(samples.len(), sample_rate);
        samples.iter().zip(&env).map(|(s, e)| s * e).collect()
    }

    /// Shape `samples` in place.
    pub fn apply_in_place(&self, samples: &mut [f64], sample_rate: f64) {
        let env = self.levels(samples.len(), sample_rate);
        for (s, e) in samples.iter_mut().zip(&env) {
            *s *= e;
        }
    }
}

/// Linear fade in over the first and fade out over the last `fade_seconds`.
///
/// Each fade is clamped to half the buffer so the two never overlap.
pub fn fade_edges(samples: &mut [f64], sample_rate: f64, fade_seconds: f64) {
    let len = samples.len();
    let fade = seconds_to_samples(fade_seconds, sample_rate).min(len / 2);
    if fade == 0 {
        return;
    }
    let denom = if fade > 1 { (fade - 1) as f64 } else { 1.0 };
    for i in 0..fade {
        let gain = i as f64 / denom;
        samples[i] *= gain;
        samples[len - 1 - i] *= gain;
    }
}

/// Multiply by `exp(-rate * t)`.
pub fn exponential_decay(samples: &mut [f64], sample_rate: f64, rate: f64) {
    for (n, s) in samples.iter_mut().enumerate() {
        let t = n as f64 / sample_rate;
        *s *= (-rate * t).exp();
    }
}

/// Whole samples covered by `seconds`; non-positive or NaN gives zero.
pub fn seconds_to_samples(seconds: f64, sample_rate: f64) -> usize {
    let n = seconds * sample_rate;
    if n.is_finite() && n > 0.0 {
        n.round() as usize
    } else {
        0
    }
}

/// Push `n` evenly spaced values from `from` to `to`, both ends included.
fn extend_ramp(out: &mut Vec<f64>, from: f64, to: f64, n: usize) {
    match n {
        0 => {}
        1 => out.push(from),
        _ => {
            let last = (n - 1) as f64;
            out.extend((0..n).map(|i| from + (to - from) * (i as f64 / last)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 44100.0;

    #[test]
    fn attack_reaches_one() {
        let env = Adsr::new(0.01, 0.05, 0.5, 0.1).levels(44100, SR);
        assert_eq!(env[0], 0.0);
        assert!((env[440] - 1.0).abs() < 1e-12, "attack end should be 1.0, got {}", env[440]);
    }

    #[test]
    fn sustain_holds() {
        let env = Adsr::new(0.001, 0.001, 0.6, 0.01).levels(4410, SR);
        assert!((env[2000] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn release_owns_the_tail() {
        let adsr = Adsr::new(0.01, 0.01, 0.7, 0.1);
        let env = adsr.levels(22050, SR);
        let seg = adsr.segments(22050, SR);
        assert_eq!(seg.release, 4410);
        assert_eq!(*env.last().unwrap(), 0.0);
        assert!((env[22050 - 4410] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn overflowing_segments_are_rescaled() {
        let adsr = Adsr::new(1.0, 1.0, 0.5, 2.0);
        let seg = adsr.segments(1000, SR);
        assert_eq!(seg.sustain, 0);
        assert_eq!(seg.attack + seg.decay + seg.release, 1000);
        assert_eq!(seg.attack, 250);
        assert_eq!(seg.decay, 250);
    }

    #[test]
    fn never_out_of_range_or_nan() {
        let cases = [
            Adsr::new(0.0, 0.0, 0.0, 0.0),
            Adsr::new(5.0, 5.0, 1.0, 5.0),
            Adsr::new(0.2, 0.0, 0.3, 0.0),
            Adsr::new(f64::NAN, -1.0, 0.8, f64::INFINITY),
            Adsr::new(0.001, 0.3, 1.0, 0.3),
        ];
        for adsr in cases {
            for len in [0, 1, 2, 3, 17, 441, 10_000] {
                let env = adsr.levels(len, SR);
                assert_eq!(env.len(), len);
                let ceiling = adsr.sustain.max(1.0);
                for &e in &env {
                    assert!(!e.is_nan(), "NaN in envelope for {adsr:?}");
                    assert!((0.0..=ceiling).contains(&e), "{e} out of range for {adsr:?}");
                }
            }
        }
    }

    #[test]
    fn apply_keeps_length_and_input() {
        let input = vec![1.0; 500];
        let out = Adsr::default().apply(&input, SR);
        assert_eq!(out.len(), input.len());
        assert!(input.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn fade_edges_silences_both_ends() {
        let mut buf = vec![1.0; 2000];
        fade_edges(&mut buf, SR, 0.01);
        assert_eq!(buf[0], 0.0);
        assert_eq!(buf[1999], 0.0);
        assert_eq!(buf[1000], 1.0);

        let mut tiny = vec![1.0; 3];
        fade_edges(&mut tiny, SR, 0.01);
        assert_eq!(tiny[1], 1.0);
    }

    #[test]
    fn exponential_decay_falls() {
        let mut buf = vec![1.0; 44100];
        exponential_decay(&mut buf, SR, 2.0);
        assert_eq!(buf[0], 1.0);
        assert!((buf[22050] - (-1.0f64).exp()).abs() < 1e-9);
    }
}
