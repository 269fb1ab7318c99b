//! Structured Logging Setup via tracing-subscriber
//!
//! Level und Format kommen aus der Konfiguration und koennen per
//! Umgebungsvariable uebersteuert werden:
//! - `CP_LOG_LEVEL`: Log-Level oder Filter-Direktive, Standard: info
//! - `CP_LOG_FORMAT`: Format (text/json), Standard: text

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "CP_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "CP_LOG_FORMAT";

/// Ausgabeformat der Logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Unbekannte Werte fallen auf Text zurueck
    pub fn parsen(wert: &str) -> Self {
        match wert.trim() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Initialisiert das Logging-System.
///
/// Darf nur einmal pro Prozess aufgerufen werden, ein zweiter Aufruf
/// wird mit einer Warnung ignoriert.
pub fn logging_initialisieren(level: &str, format: &str) {
    let level = aufloesen(std::env::var(ENV_LOG_LEVEL).ok(), level);
    let format = LogFormat::parsen(&aufloesen(std::env::var(ENV_LOG_FORMAT).ok(), format));

    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let ergebnis = match format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => fmt().with_env_filter(filter).with_target(true).try_init(),
    };

    if let Err(e) = ergebnis {
        tracing::warn!("Logging bereits initialisiert: {e}");
    }
}

/// Umgebungswert vor Konfigurationswert, leere Werte zaehlen nicht
pub fn aufloesen(umgebung: Option<String>, konfiguriert: &str) -> String {
    umgebung
        .filter(|w| !w.trim().is_empty())
        .unwrap_or_else(|| konfiguriert.to_string())
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
