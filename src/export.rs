//! Export sink — writes rendered audio to disk.
//!
//! The WAV file is always written. When an encoder is configured it is run
//! on the WAV to produce a compressed file next to it; if the encoder is
//! missing or fails, the WAV path is returned instead.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use hound::{SampleFormat, WavSpec, WavWriter};
use log::{debug, warn};

use crate::dsp::buffer::StereoBuffer;
use crate::error::ExportError;

/// External program turning a WAV into a compressed file.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoder {
    pub program: String,
    /// Codec passed to `-c:a`.
    pub codec: String,
    /// VBR quality passed to `-q:a`.
    pub quality: u32,
    /// Extension of the encoded file.
    pub extension: String,
}

impl Encoder {
    /// ffmpeg with libvorbis at quality 4.
    pub fn ogg_vorbis() -> Self {
        Encoder {
            program: "ffmpeg".to_string(),
            codec: "libvorbis".to_string(),
            quality: 4,
            extension: "ogg".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-c:a".to_string(),
            self.codec.clone(),
            "-q:a".to_string(),
            self.quality.to_string(),
            output.display().to_string(),
        ]
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::ogg_vorbis()
    }
}

#[derive(Debug, Clone)]
pub struct Exporter {
    pub encoder: Option<Encoder>,
    /// Keep the intermediate WAV after a successful encode.
    pub keep_wav: bool,
}

impl Default for Exporter {
    fn default() -> Self {
        Exporter {
            encoder: Some(Encoder::default()),
            keep_wav: false,
        }
    }
}

impl Exporter {
    /// Exporter that only writes WAV files.
    pub fn wav_only() -> Self {
        Exporter {
            encoder: None,
            keep_wav: true,
        }
    }

    pub fn with_encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn keep_wav(mut self, keep: bool) -> Self {
        self.keep_wav = keep;
        self
    }

    /// Write `buffer` next to `path` and return the path of the final file.
    ///
    /// The extension of `path` is replaced. Parent directories are created.
    /// Only a failure to write the WAV itself is an error.
    pub fn export(
        &self,
        buffer: &StereoBuffer,
        sample_rate: u32,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf, ExportError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let wav_path = path.with_extension("wav");
        write_wav(buffer, sample_rate, &wav_path)?;
        debug!("wrote {} ({} frames)", wav_path.display(), buffer.len());

        let Some(encoder) = &self.encoder else {
            return Ok(wav_path);
        };

        let encoded = path.with_extension(&encoder.extension);
        match self.encode(encoder, &wav_path, &encoded) {
            Ok(()) => {
                if !self.keep_wav {
                    if let Err(e) = fs::remove_file(&wav_path) {
                        warn!("could not remove {}: {e}", wav_path.display());
                    }
                }
                Ok(encoded)
            }
            Err(reason) => {
                warn!("{} not produced ({reason}); keeping {}", encoded.display(), wav_path.display());
                Ok(wav_path)
            }
        }
    }

    fn encode(&self, encoder: &Encoder, input: &Path, output: &Path) -> Result<(), String> {
        let result = Command::new(&encoder.program)
            .args(encoder.args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();
        match result {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                let last = stderr.lines().last().unwrap_or("").trim();
                Err(format!("{} exited with {}: {last}", encoder.program, out.status))
            }
            Err(e) => Err(format!("could not run {}: {e}", encoder.program)),
        }
    }
}

/// Write a 16-bit stereo WAV file.
pub fn write_wav(buffer: &StereoBuffer, sample_rate: u32, path: &Path) -> Result<(), ExportError> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for sample in buffer.to_pcm_i16() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize) -> StereoBuffer {
        let left = (0..frames).map(|i| i as f64 / frames as f64 * 0.5).collect();
        let right = (0..frames).map(|i| -(i as f64) / frames as f64 * 0.5).collect();
        StereoBuffer::from_channels(left, right)
    }

    #[test]
    fn wav_only_writes_wav() {
        let dir = tempfile::tempdir().unwrap();
        let out = Exporter::wav_only()
            .export(&ramp(1000), 22050, dir.path().join("theme.ogg"))
            .unwrap();
        assert_eq!(out, dir.path().join("theme.wav"));

        let reader = hound::WavReader::open(&out).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.duration(), 1000);
    }

    #[test]
    fn samples_survive_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = ramp(64);
        let out = Exporter::wav_only().export(&buffer, 8000, dir.path().join("a")).unwrap();
        let mut reader = hound::WavReader::open(&out).unwrap();
        let read: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(read, buffer.to_pcm_i16());
    }

    #[test]
    fn missing_encoder_falls_back_to_wav() {
        let dir = tempfile::tempdir().unwrap();
        let exporter =
            Exporter::default().with_encoder(Encoder::ogg_vorbis().with_program("scorewalker-no-such-encoder"));
        let out = exporter.export(&ramp(100), 44100, dir.path().join("boss.ogg")).unwrap();
        assert_eq!(out, dir.path().join("boss.wav"));
        assert!(out.exists());
        assert!(!dir.path().join("boss.ogg").exists());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("music").join("battle.ogg");
        let out = Exporter::wav_only().export(&ramp(10), 44100, &target).unwrap();
        assert!(out.exists());
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let err = Exporter::wav_only()
            .export(&ramp(10), 44100, blocker.join("nested.wav"))
            .unwrap_err();
        assert!(matches!(err, ExportError::Io(_) | ExportError::Wav(_)));
    }

    #[test]
    fn encoder_command_line() {
        let args = Encoder::ogg_vorbis().args(Path::new("in.wav"), Path::new("out.ogg"));
        assert_eq!(args, ["-y", "-i", "in.wav", "-c:a", "libvorbis", "-q:a", "4", "out.ogg"]);
    }
}
