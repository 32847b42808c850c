//! Constant-power stereo panning.

use super::buffer::StereoBuffer;

/// Left/right gains for `pan` in [-1, 1] (-1 = hard left).
///
/// `left² + right² == 1` for every pan position, so a voice keeps the same
/// total power as it moves across the field.
pub fn pan_gains(pan: f64) -> (f64, f64) {
    let pan = if pan.is_nan() { 0.0 } else { pan.clamp(-1.0, 1.0) };
    let left = (0.5 * (1.0 - pan)).sqrt();
    let right = (0.5 * (1.0 + pan)).sqrt();
    (left, right)
}

/// Spread a mono buffer into a stereo pair at `pan`.
pub fn pan(mono: &[f64], pan: f64) -> StereoBuffer {
    let (lg, rg) = pan_gains(pan);
    let left = mono.iter().map(|s| s * lg).collect();
    let right = mono.iter().map(|s| s * rg).collect();
    StereoBuffer::from_channels(left, right)
}
