//! Fehlertypen fuer Callprobe
//!
//! Zentraler Fehler-Enum der alle Fehlerzustaende eines Anrufs abdeckt.
//! Untermodule koennen eigene Fehler definieren und via `#[from]` konvertieren.

use thiserror::Error;

/// Globaler Result-Alias fuer Callprobe
pub type Result<T> = std::result::Result<T, CallprobeError>;

/// Alle moeglichen Fehler im Callprobe-System
#[derive(Debug, Error)]
pub enum CallprobeError {
    // --- Verbindung & Netzwerk ---
    #[error("Verbindung fehlgeschlagen: {0}")]
    Verbindung(String),

    #[error("Verbindung getrennt: {0}")]
    Getrennt(String),

    #[error("Zeitlimit ueberschritten: {0}")]
    Zeitlimit(String),

    // --- Externe Dienste ---
    #[error("Antwort-Generierung fehlgeschlagen: {0}")]
    Generierung(String),

    #[error("Sprachsynthese fehlgeschlagen: {0}")]
    Synthese(String),

    #[error("Transkription fehlgeschlagen: {0}")]
    Transkription(String),

    #[error("Audio-Versand fehlgeschlagen: {0}")]
    AudioVersand(String),

    // --- Protokoll ---
    #[error("Ungueltige Nachricht: {0}")]
    UngueltigeNachricht(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    #[error("Szenario nicht gefunden: {0}")]
    SzenarioNichtGefunden(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl CallprobeError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler voruebergehend ist.
    ///
    /// Voruebergehende Fehler kosten hoechstens eine Gespraechsrunde,
    /// niemals den ganzen Anruf.
    pub fn ist_wiederholbar(&self) -> bool {
        matches!(
            self,
            Self::Zeitlimit(_)
                | Self::Verbindung(_)
                | Self::Getrennt(_)
                | Self::Generierung(_)
                | Self::Synthese(_)
                | Self::Transkription(_)
                | Self::AudioVersand(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = CallprobeError::Synthese("HTTP 503".into());
        assert_eq!(e.to_string(), "Sprachsynthese fehlgeschlagen: HTTP 503");
    }

    #[test]
    fn wiederholbar_erkennung() {
        assert!(CallprobeError::Zeitlimit("test".into()).ist_wiederholbar());
        assert!(CallprobeError::Generierung("test".into()).ist_wiederholbar());
        assert!(!CallprobeError::Konfiguration("test".into()).ist_wiederholbar());
    }

    #[test]
    fn io_fehler_konvertierung() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "weg");
        let e: CallprobeError = io.into();
        assert!(e.to_string().starts_with("IO-Fehler"));
    }
}
