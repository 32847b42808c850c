//! DSP Engine — Pure Rust offline synthesis and mixing.
//!
//! Everything here works on whole in-memory buffers. Oscillators and
//! envelopes produce per-note samples, the voice renderer strings them into
//! tracks, and the mixer reverbs, pans and sums tracks into stereo.

pub mod buffer;
pub mod engine;
pub mod envelope;
pub mod mixer;
pub mod noise;
pub mod oscillator;
pub mod panner;
pub mod renderer;
pub mod reverb;
pub mod timbre;
pub mod voice;
