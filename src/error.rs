use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Errors raised while reading the compact text notation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotationError {
    #[error("Unexpected char '{ch}' at pos {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("Invalid note length '{text}' at pos {pos}")]
    InvalidLength { text: String, pos: usize },
    #[error("Invalid header '{text}' at pos {pos}")]
    InvalidHeader { text: String, pos: usize },
    #[error("Accidental without a note at pos {pos}")]
    DanglingAccidental { pos: usize },
}

impl NotationError {
    /// Byte range in the source this error points at.
    pub fn span(&self) -> Range<usize> {
        match self {
            NotationError::UnexpectedChar { ch, pos } => *pos..*pos + ch.len_utf8(),
            NotationError::InvalidLength { text, pos }
            | NotationError::InvalidHeader { text, pos } => *pos..*pos + text.len().max(1),
            NotationError::DanglingAccidental { pos } => *pos..*pos + 1,
        }
    }

    /// Render a plain-text diagnostic pointing into `source`.
    pub fn report(&self, source_name: &str, source: &str) -> String {
        let span = self.span();
        let mut out = Vec::new();
        let written = Report::build(ReportKind::Error, (source_name, span.clone()))
            .with_config(Config::default().with_color(false))
            .with_message(self.to_string())
            .with_label(Label::new((source_name, span)).with_message("here"))
            .finish()
            .write((source_name, Source::from(source)), &mut out);
        match written {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// Errors raised while loading a composition description.
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("Invalid composition JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Tempo must be positive, got {0}")]
    InvalidTempo(f64),
    #[error("Sample rate must be positive")]
    InvalidSampleRate,
}

/// Errors raised while persisting rendered audio.
#[cfg(feature = "export")]
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV write failed: {0}")]
    Wav(#[from] hound::Error),
}
