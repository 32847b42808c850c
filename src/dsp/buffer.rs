//! Sample buffers passed between pipeline stages.

/// A mono sample buffer at the pipeline sample rate.
pub type RenderedTrack = Vec<f64>;

/// Two equal-length channels, the terminal product of a render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoBuffer {
    left: Vec<f64>,
    right: Vec<f64>,
}

impl StereoBuffer {
    /// A silent buffer of `len` frames.
    pub fn silent(len: usize) -> Self {
        StereoBuffer {
            left: vec![0.0; len],
            right: vec![0.0; len],
        }
    }

    /// Build from two channels, zero-padding the shorter one.
    pub fn from_channels(mut left: Vec<f64>, mut right: Vec<f64>) -> Self {
        let len = left.len().max(right.len());
        left.resize(len, 0.0);
        right.resize(len, 0.0);
        StereoBuffer { left, right }
    }

    pub fn left(&self) -> &[f64] {
        &self.left
    }

    pub fn right(&self) -> &[f64] {
        &self.right
    }

    /// Number of frames (samples per channel).
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Sample-wise add `other` into this buffer, growing it if needed.
    pub fn accumulate(&mut self, other: &StereoBuffer) {
        if other.len() > self.len() {
            self.left.resize(other.len(), 0.0);
            self.right.resize(other.len(), 0.0);
        }
        for (dst, src) in self.left.iter_mut().zip(&other.left) {
            *dst += src;
        }
        for (dst, src) in self.right.iter_mut().zip(&other.right) {
            *dst += src;
        }
    }

    /// Largest absolute sample across both channels.
    pub fn peak(&self) -> f64 {
        self.left
            .iter()
            .chain(&self.right)
            .fold(0.0f64, |acc, s| acc.max(s.abs()))
    }

    /// Multiply every sample by `gain`.
    pub fn scale(&mut self, gain: f64) {
        for s in self.left.iter_mut().chain(self.right.iter_mut()) {
            *s *= gain;
        }
    }

    /// Scale so the peak equals `target`. Silence is left untouched.
    pub fn normalize_to(&mut self, target: f64) {
        let peak = self.peak();
        if peak > 0.0 {
            self.scale(target / peak);
        }
    }

    /// Average of the two channels.
    pub fn to_mono(&self) -> Vec<f64> {
        self.left
            .iter()
            .zip(&self.right)
            .map(|(l, r)| 0.5 * (l + r))
            .collect()
    }

    /// Interleaved L/R frames.
    pub fn interleaved(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.len() * 2);
        for (&l, &r) in self.left.iter().zip(&self.right) {
            out.push(l);
            out.push(r);
        }
        out
    }

    /// Interleaved 16-bit PCM, clamped to full scale.
    pub fn to_pcm_i16(&self) -> Vec<i16> {
        self.interleaved().into_iter().map(quantize_i16).collect()
    }

    pub fn into_channels(self) -> (Vec<f64>, Vec<f64>) {
        (self.left, self.right)
    }
}

/// Quantize one sample in [-1, 1] to i16.
pub fn quantize_i16(sample: f64) -> i16 {
    (sample * 32767.0).round().clamp(-32768.0, 32767.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_always_match() {
        let buf = StereoBuffer::from_channels(vec![1.0, 2.0, 3.0], vec![1.0]);
        assert_eq!(buf.left().len(), buf.right().len());
        assert_eq!(buf.right(), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn accumulate_grows_and_sums() {
        let mut a = StereoBuffer::from_channels(vec![0.5], vec![0.25]);
        let b = StereoBuffer::from_channels(vec![0.5, 1.0], vec![0.5, -1.0]);
        a.accumulate(&b);
        assert_eq!(a.left(), &[1.0, 1.0]);
        assert_eq!(a.right(), &[0.75, -1.0]);
    }

    #[test]
    fn normalize_hits_target() {
        let mut buf = StereoBuffer::from_channels(vec![0.1, -2.0], vec![0.5, 1.0]);
        buf.normalize_to(0.9);
        assert!((buf.peak() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn normalize_leaves_silence() {
        let mut buf = StereoBuffer::silent(8);
        buf.normalize_to(0.9);
        assert!(buf.left().iter().chain(buf.right()).all(|&s| s == 0.0));
    }

    #[test]
    fn mono_downmix_averages_channels() {
        let buf = StereoBuffer::from_channels(vec![1.0, 0.5, -0.5], vec![0.0, 0.5]);
        assert_eq!(buf.to_mono(), vec![0.5, 0.5, -0.25]);
    }

    #[test]
    fn into_channels_returns_equal_lengths() {
        let buf = StereoBuffer::from_channels(vec![0.25], vec![0.5, -0.5]);
        let (left, right) = buf.into_channels();
        assert_eq!(left, vec![0.25, 0.0]);
        assert_eq!(right, vec![0.5, -0.5]);
    }

    #[test]
    fn pcm_clamps() {
        assert_eq!(quantize_i16(1.0), 32767);
        assert_eq!(quantize_i16(-2.0), -32768);
        assert_eq!(quantize_i16(0.0), 0);
        let buf = StereoBuffer::from_channels(vec![1.0], vec![-1.0]);
        assert_eq!(buf.to_pcm_i16(), vec![32767, -32767]);
    }
}
