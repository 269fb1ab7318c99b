//! Fehlertypen fuer das Medienstrom-Protokoll

use thiserror::Error;

pub type ProtokollResult<T> = std::result::Result<T, ProtokollError>;

#[derive(Debug, Error)]
pub enum ProtokollError {
    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64-Fehler: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Pflichtfeld fehlt: {0}")]
    FehlendesFeld(&'static str),
}
