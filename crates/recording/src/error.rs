//! Fehlertypen fuer das Recording-Crate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AufnahmeError {
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Audio-Fehler: {0}")]
    Audio(#[from] callprobe_audio::AudioError),
}

pub type AufnahmeResult<T> = Result<T, AufnahmeError>;
