//! Fehlertypen fuer den Audio-Kern

use thiserror::Error;

/// Alle moeglichen Fehler des Audio-Kerns
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Ungueltiges Audioformat: {0}")]
    UngueltigesFormat(String),

    #[error("WAV-Fehler: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

pub type AudioResult<T> = Result<T, AudioError>;
