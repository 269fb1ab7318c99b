//! Gemeinsame Identifikationstypen fuer Callprobe
//!
//! IDs verwenden das Newtype-Pattern um Verwechslungen zur Compilezeit
//! auszuschliessen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Anruf-ID
///
/// Format: `YYYYmmdd_HHMMSS_<8 Hex-Zeichen>`. Wird auch als Verzeichnisname
/// fuer die gespeicherten Artefakte verwendet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub String);

impl CallId {
    /// Erstellt eine neue Anruf-ID aus der aktuellen Uhrzeit
    pub fn new() -> Self {
        Self::aus_zeitpunkt(Utc::now())
    }

    /// Erstellt eine Anruf-ID fuer einen bestimmten Zeitpunkt (zufaelliger Suffix)
    pub fn aus_zeitpunkt(zeitpunkt: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{}_{}", zeitpunkt.format("%Y%m%d_%H%M%S"), &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sprecherrolle einer Aeusserung
///
/// `Gegenseite` ist das angerufene Telefonsystem, `Anrufer` der simulierte
/// Anrufer. Beim Einlesen werden auch die alten Bezeichner
/// `agent`/`patient` akzeptiert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sprecher {
    #[serde(rename = "remote", alias = "agent")]
    Gegenseite,
    #[serde(rename = "local", alias = "patient")]
    Anrufer,
}

impl Sprecher {
    /// Bezeichnung im lesbaren Transkript
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gegenseite => "REMOTE",
            Self::Anrufer => "LOCAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn call_id_format() {
        let zeitpunkt = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let id = CallId::aus_zeitpunkt(zeitpunkt);
        assert!(id.as_str().starts_with("20240305_140709_"));
        assert_eq!(id.as_str().len(), "20240305_140709_".len() + 8);
    }

    #[test]
    fn call_id_eindeutig() {
        let a = CallId::new();
        let b = CallId::new();
        assert_ne!(a, b, "Zwei neue CallIds muessen verschieden sein");
    }

    #[test]
    fn call_id_serialisiert_als_string() {
        let id = CallId("20240101_000000_abcdef01".into());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"20240101_000000_abcdef01\"");
    }

    #[test]
    fn sprecher_serde_namen() {
        assert_eq!(serde_json::to_string(&Sprecher::Gegenseite).unwrap(), "\"remote\"");
        assert_eq!(serde_json::to_string(&Sprecher::Anrufer).unwrap(), "\"local\"");
    }

    #[test]
    fn sprecher_alte_bezeichner_werden_akzeptiert() {
        let s: Sprecher = serde_json::from_str("\"agent\"").unwrap();
        assert_eq!(s, Sprecher::Gegenseite);
        let s: Sprecher = serde_json::from_str("\"patient\"").unwrap();
        assert_eq!(s, Sprecher::Anrufer);
    }
}
