//! WAV renderer — renders a Composition to a WAV byte buffer.

use crate::composition::Composition;

use super::buffer::StereoBuffer;
use super::engine::AudioEngine;

/// Render a Composition to a WAV file as bytes (16-bit stereo PCM).
pub fn render_wav(composition: &Composition) -> Vec<u8> {
    let engine = AudioEngine::from_composition(composition);
    stereo_to_wav(&engine.render(composition), composition.sample_rate)
}

/// Quantize a stereo buffer and wrap it in a WAV container.
pub fn stereo_to_wav(buffer: &StereoBuffer, sample_rate: u32) -> Vec<u8> {
    encode_wav(&buffer.to_pcm_i16(), sample_rate, 2)
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
pub fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{ScoreEvent, Tempo, Voice};
    use crate::dsp::timbre::Timbre;

    fn one_beat(symbol: &str) -> Composition {
        Composition::new(
            Tempo(120.0),
            vec![Voice::new("lead", Timbre::Lead, vec![ScoreEvent::note(symbol, 1.0)])],
        )
    }

    #[test]
    fn wav_header_valid() {
        let wav = render_wav(&one_beat("C4"));

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 44100);

        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 2);

        let bits = u16::from_le_bytes([wav[34], wav[35]]);
        assert_eq!(bits, 16);
    }

    #[test]
    fn wav_size_correct() {
        let wav = render_wav(&one_beat("rest"));

        // 1 beat at 120 BPM = 0.5s = 22050 frames * 2 channels * 2 bytes
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size, 88200);
        assert_eq!(wav.len(), 44 + 88200);
        let riff_size = u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]);
        assert_eq!(riff_size as usize, wav.len() - 8);
    }

    #[test]
    fn full_pipeline_notation_to_wav() {
        let tune = crate::notation::parse_tune("T:Riff\nQ:1/4=120\nL:1/4\nC E G c|").expect("parse failed");
        let comp = Composition::new(tune.tempo, vec![tune.into_voice(Timbre::Piano)]).with_sample_rate(22050);
        let wav = render_wav(&comp);

        assert_eq!(&wav[0..4], b"RIFF");
        // 4 quarter notes at 120 BPM = 2s
        assert_eq!(wav.len(), 44 + 22050 * 2 * 2 * 2);

        let has_nonzero = wav[44..]
            .chunks_exact(2)
            .any(|b| i16::from_le_bytes([b[0], b[1]]) != 0);
        assert!(has_nonzero, "Rendered WAV should contain non-silent audio");
    }
}
