//! Oscillator bank — one synthesis recipe per timbre family.
//!
//! Every function renders a whole note at once and returns a buffer of
//! `round(duration * sample_rate)` samples. A frequency of zero (a rest) or
//! any non-finite frequency gives silence of the same length; a non-positive
//! duration gives an empty buffer.

use std::f64::consts::PI;

use super::envelope::{Adsr, exponential_decay, fade_edges, seconds_to_samples};
use super::noise::NoiseSource;

/// Click guard applied to both ends of a tonal note.
pub const TONAL_FADE_SECONDS: f64 = 0.01;

pub const BASS_ENVELOPE: Adsr = Adsr::new(0.02, 0.05, 0.7, 0.1);
pub const BRASS_ENVELOPE: Adsr = Adsr::new(0.03, 0.05, 0.8, 0.1);
pub const PIANO_ENVELOPE: Adsr = Adsr::new(0.005, 0.1, 0.6, 0.3);
pub const CHOIR_ENVELOPE: Adsr = Adsr::new(0.2, 0.1, 0.8, 0.3);
pub const CHIP_ENVELOPE: Adsr = Adsr::new(0.01, 0.05, 0.7, 0.1);

/// Exponential falloff layered on top of the piano ADSR, per second.
pub const PIANO_DECAY_RATE: f64 = 2.0;

const PIANO_HARMONICS: [(f64, f64); 5] = [(1.0, 1.0), (2.0, 0.4), (3.0, 0.2), (4.0, 0.1), (5.0, 0.05)];
const BRASS_HARMONICS: [(f64, f64); 5] = [(1.0, 1.0), (3.0, 0.5), (5.0, 0.3), (7.0, 0.2), (9.0, 0.1)];
const CHOIR_HARMONICS: [(f64, f64); 3] = [(1.0, 1.0), (2.0, 0.3), (3.0, 0.2)];
const CHOIR_DETUNE: [f64; 5] = [-0.01, -0.005, 0.0, 0.005, 0.01];

/// Bowed-string sections. Lower strings swell in more slowly and wobble less.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringSection {
    #[default]
    Violin,
    Viola,
    Cello,
}

impl StringSection {
    pub fn envelope(self) -> Adsr {
        let attack = match self {
            StringSection::Violin => 0.05,
            StringSection::Viola => 0.065,
            StringSection::Cello => 0.08,
        };
        Adsr::new(attack, 0.1, 0.8, 0.15)
    }

    /// Relative depth of the 5 Hz frequency vibrato.
    pub fn vibrato_depth(self) -> f64 {
        match self {
            StringSection::Violin => 0.01,
            StringSection::Viola => 0.0075,
            StringSection::Cello => 0.005,
        }
    }
}

/// Number of samples for `duration` seconds; zero when the duration is not positive.
pub fn sample_count(duration: f64, sample_rate: f64) -> usize {
    seconds_to_samples(duration, sample_rate)
}

/// Naive sawtooth in [-1, 1).
pub fn sawtooth(frequency: f64, t: f64) -> f64 {
    2.0 * (t * frequency).rem_euclid(1.0) - 1.0
}

fn sine(frequency: f64, t: f64) -> f64 {
    (2.0 * PI * frequency * t).sin()
}

fn square(frequency: f64, t: f64) -> f64 {
    let s = sine(frequency, t);
    if s > 0.0 {
        1.0
    } else if s < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn harmonics(frequency: f64, t: f64, partials: &[(f64, f64)]) -> f64 {
    partials
        .iter()
        .map(|&(mult, weight)| weight * sine(frequency * mult, t))
        .sum()
}

fn is_audible(frequency: f64) -> bool {
    frequency.is_finite() && frequency > 0.0
}

/// Render `len` samples of `f(t)`, or silence when `frequency` is a rest.
fn render(frequency: f64, duration: f64, sample_rate: f64, f: impl Fn(f64) -> f64) -> Vec<f64> {
    let len = sample_count(duration, sample_rate);
    if !is_audible(frequency) {
        return vec![0.0; len];
    }
    (0..len).map(|n| f(n as f64 / sample_rate)).collect()
}

/// Fundamental with light 2nd and 3rd harmonics and a 10 ms fade at both ends.
pub fn tonal(frequency: f64, duration: f64, sample_rate: f64, amplitude: f64) -> Vec<f64> {
    let mut out = render(frequency, duration, sample_rate, |t| {
        amplitude * (sine(frequency, t) + 0.3 * sine(2.0 * frequency, t) + 0.1 * sine(3.0 * frequency, t))
    });
    fade_edges(&mut out, sample_rate, TONAL_FADE_SECONDS);
    out
}

/// Fundamental plus a sub-octave and a light 2nd harmonic.
pub fn bass(frequency: f64, duration: f64, sample_rate: f64, amplitude: f64) -> Vec<f64> {
    let mut out = render(frequency, duration, sample_rate, |t| {
        amplitude * (sine(frequency, t) + 0.2 * sine(0.5 * frequency, t) + 0.1 * sine(2.0 * frequency, t))
    });
    BASS_ENVELOPE.apply_in_place(&mut out, sample_rate);
    out
}

/// Sawtooth body with a vibrato-modulated fundamental.
pub fn bowed_string(
    frequency: f64,
    duration: f64,
    sample_rate: f64,
    amplitude: f64,
    section: StringSection,
) -> Vec<f64> {
    let depth = section.vibrato_depth();
    let mut out = render(frequency, duration, sample_rate, |t| {
        let vibrato = 1.0 + depth * sine(5.0, t);
        amplitude
            * (0.6 * sawtooth(frequency, t)
                + 0.2 * sine(frequency * vibrato, t)
                + 0.1 * sine(2.0 * frequency, t)
                + 0.1 * sine(3.0 * frequency, t))
    });
    section.envelope().apply_in_place(&mut out, sample_rate);
    out
}

/// Odd-harmonic stack with a slow amplitude wobble.
pub fn brass(frequency: f64, duration: f64, sample_rate: f64, amplitude: f64) -> Vec<f64> {
    let mut out = render(frequency, duration, sample_rate, |t| {
        let vibrato = 1.0 + 0.005 * sine(4.5, t);
        amplitude * vibrato * harmonics(frequency, t, &BRASS_HARMONICS)
    });
    BRASS_ENVELOPE.apply_in_place(&mut out, sample_rate);
    out
}

/// Five partials shaped by ADSR and an extra exponential falloff.
pub fn piano(frequency: f64, duration: f64, sample_rate: f64, amplitude: f64) -> Vec<f64> {
    let mut out = render(frequency, duration, sample_rate, |t| {
        amplitude * harmonics(frequency, t, &PIANO_HARMONICS)
    });
    PIANO_ENVELOPE.apply_in_place(&mut out, sample_rate);
    exponential_decay(&mut out, sample_rate, PIANO_DECAY_RATE);
    out
}

/// Five slightly detuned singers, averaged, with a slow swell.
pub fn choir(frequency: f64, duration: f64, sample_rate: f64, amplitude: f64) -> Vec<f64> {
    let mut out = render(frequency, duration, sample_rate, |t| {
        let voices: f64 = CHOIR_DETUNE
            .iter()
            .map(|d| harmonics(frequency * (1.0 + d), t, &CHOIR_HARMONICS))
            .sum();
        amplitude * voices / CHOIR_DETUNE.len() as f64
    });
    CHOIR_ENVELOPE.apply_in_place(&mut out, sample_rate);
    out
}

/// Square-wave retro lead.
pub fn chip(frequency: f64, duration: f64, sample_rate: f64, amplitude: f64) -> Vec<f64> {
    let mut out = render(frequency, duration, sample_rate, |t| {
        0.2 * amplitude
            * (square(frequency, t) + 0.2 * square(2.0 * frequency, t) + 0.1 * square(3.0 * frequency, t))
    });
    CHIP_ENVELOPE.apply_in_place(&mut out, sample_rate);
    out
}

/// Pitch-swept sine (≈100 Hz down to 40 Hz) with a noisy click.
pub fn kick(duration: f64, sample_rate: f64, amplitude: f64, noise: &mut NoiseSource) -> Vec<f64> {
    let len = sample_count(duration, sample_rate);
    (0..len)
        .map(|n| {
            let t = n as f64 / sample_rate;
            let pitch = 60.0 * (-35.0 * t).exp() + 40.0;
            let click = noise.gaussian(0.1) * (-50.0 * t).exp();
            amplitude * (-10.0 * t).exp() * (0.7 * sine(pitch, t) + 0.3 * click)
        })
        .collect()
}

/// 200 Hz body under a wash of noise, mean removed.
pub fn snare(duration: f64, sample_rate: f64, amplitude: f64, noise: &mut NoiseSource) -> Vec<f64> {
    let len = sample_count(duration, sample_rate);
    let mut out: Vec<f64> = (0..len)
        .map(|n| {
            let t = n as f64 / sample_rate;
            amplitude * (-15.0 * t).exp() * (0.3 * sine(200.0, t) + 0.7 * noise.gaussian(1.0))
        })
        .collect();
    remove_mean(&mut out);
    out
}

/// Decaying noise burst; open hats ring five times longer.
pub fn hihat(duration: f64, sample_rate: f64, amplitude: f64, open: bool, noise: &mut NoiseSource) -> Vec<f64> {
    let rate = if open { 10.0 } else { 50.0 };
    let len = sample_count(duration, sample_rate);
    let mut out: Vec<f64> = (0..len)
        .map(|n| {
            let t = n as f64 / sample_rate;
            amplitude * (-rate * t).exp() * noise.gaussian(1.0)
        })
        .collect();
    remove_mean(&mut out);
    out
}

/// Tuned drum: a slightly sharp strike settling onto pitch.
pub fn timpani(
    frequency: f64,
    duration: f64,
    sample_rate: f64,
    amplitude: f64,
    noise: &mut NoiseSource,
) -> Vec<f64> {
    let len = sample_count(duration, sample_rate);
    if !is_audible(frequency) {
        return vec![0.0; len];
    }
    (0..len)
        .map(|n| {
            let t = n as f64 / sample_rate;
            let bent = frequency * (1.0 + 0.1 * (-20.0 * t).exp());
            let strike = noise.gaussian(0.1) * (-50.0 * t).exp();
            amplitude
                * (-3.0 * t).exp()
                * (0.7 * sine(bent, t) + 0.2 * sine(2.0 * frequency, t) + 0.1 * sine(3.0 * frequency, t) + 0.05 * strike)
        })
        .collect()
}

fn remove_mean(samples: &mut [f64]) {
    if samples.is_empty() {
        return;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    for s in samples.iter_mut() {
        *s -= mean;
    }
}
