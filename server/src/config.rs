//! Server-Konfiguration
//!
//! Wird aus einer TOML-Datei geladen. Jedes Feld hat einen Standardwert,
//! der Server laeuft also auch ganz ohne Datei.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use callprobe_voice::TurnConfig;
use serde::{Deserialize, Serialize};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerEinstellungen,
    pub netzwerk: NetzwerkEinstellungen,
    pub gespraech: GespraechsEinstellungen,
    pub aufnahme: AufnahmeEinstellungen,
    pub szenarien: SzenarioEinstellungen,
    pub logging: LoggingEinstellungen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename in Logs
    pub name: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Callprobe".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    pub bind_adresse: String,
    /// HTTP-Port fuer Medienstrom, Steuer-API, Metriken und Health
    pub port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

/// Zeitkonstanten der Gespraechssteuerung
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GespraechsEinstellungen {
    pub antwort_verzoegerung_ms: u64,
    pub stille_timeout_ms: u64,
    pub nachfrist_ms: u64,
    pub abfrage_intervall_ms: u64,
    /// RMS-Schwelle fuer Sprachaktivitaet
    pub energie_schwelle: f32,
    pub chunk_ms: u64,
}

impl Default for GespraechsEinstellungen {
    fn default() -> Self {
        Self {
            antwort_verzoegerung_ms: 1200,
            stille_timeout_ms: 800,
            nachfrist_ms: 500,
            abfrage_intervall_ms: 100,
            energie_schwelle: 400.0,
            chunk_ms: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AufnahmeEinstellungen {
    /// Artefakte nach Anrufende schreiben
    pub aktiviert: bool,
    pub verzeichnis: PathBuf,
}

impl Default for AufnahmeEinstellungen {
    fn default() -> Self {
        Self {
            aktiviert: true,
            verzeichnis: PathBuf::from("transcripts"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SzenarioEinstellungen {
    /// Pfad zum Szenario-Katalog
    pub datei: PathBuf,
    /// Szenario fuer den ersten Anruf
    pub aktiv: usize,
}

impl Default for SzenarioEinstellungen {
    fn default() -> Self {
        Self {
            datei: PathBuf::from("szenarien.toml"),
            aktiv: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// trace/debug/info/warn/error oder Filter-Direktive
    pub level: String,
    /// text oder json
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => Self::aus_toml(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}")),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    pub fn aus_toml(inhalt: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(inhalt)
    }

    /// Bind-Adresse des HTTP-Servers
    pub fn bind_adresse(&self) -> anyhow::Result<SocketAddr> {
        let adresse = format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.port);
        adresse
            .parse()
            .map_err(|e| anyhow::anyhow!("Ungueltige Bind-Adresse '{adresse}': {e}"))
    }

    /// Zeitkonstanten fuer die Gespraechssteuerung
    pub fn turn_config(&self) -> TurnConfig {
        let g = &self.gespraech;
        TurnConfig {
            antwort_verzoegerung: Duration::from_millis(g.antwort_verzoegerung_ms),
            stille_schwelle: Duration::from_millis(g.stille_timeout_ms),
            nachfrist: Duration::from_millis(g.nachfrist_ms),
            abfrage_intervall: Duration::from_millis(g.abfrage_intervall_ms.max(1)),
            energie_schwelle: g.energie_schwelle,
            chunk_dauer: Duration::from_millis(g.chunk_ms.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.netzwerk.port, 8000);
        assert!(cfg.aufnahme.aktiviert);
        assert_eq!(cfg.aufnahme.verzeichnis, PathBuf::from("transcripts"));
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.bind_adresse().unwrap().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn standard_turn_config_entspricht_voreinstellung() {
        let turn = ServerConfig::default().turn_config();
        let erwartet = TurnConfig::default();
        assert_eq!(turn.antwort_verzoegerung, erwartet.antwort_verzoegerung);
        assert_eq!(turn.stille_schwelle, erwartet.stille_schwelle);
        assert_eq!(turn.nachfrist, erwartet.nachfrist);
        assert_eq!(turn.abfrage_intervall, erwartet.abfrage_intervall);
        assert_eq!(turn.chunk_dauer, erwartet.chunk_dauer);
        assert_eq!(turn.energie_schwelle, erwartet.energie_schwelle);
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [server]
            name = "Testlauf"

            [netzwerk]
            port = 9000

            [gespraech]
            antwort_verzoegerung_ms = 1500

            [szenarien]
            aktiv = 3
        "#;
        let cfg = ServerConfig::aus_toml(toml).unwrap();
        assert_eq!(cfg.server.name, "Testlauf");
        assert_eq!(cfg.netzwerk.port, 9000);
        assert_eq!(cfg.szenarien.aktiv, 3);
        assert_eq!(
            cfg.turn_config().antwort_verzoegerung,
            Duration::from_millis(1500)
        );
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.gespraech.stille_timeout_ms, 800);
        assert_eq!(cfg.netzwerk.bind_adresse, "0.0.0.0");
    }

    #[test]
    fn fehlende_datei_liefert_standardwerte() {
        let cfg = ServerConfig::laden("/gibt/es/nicht/config.toml").unwrap();
        assert_eq!(cfg.netzwerk.port, 8000);
    }

    #[test]
    fn kaputte_datei_ist_fehler() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("config.toml");
        std::fs::write(&pfad, "[netzwerk]\nport = \"kein port\"").unwrap();
        assert!(ServerConfig::laden(pfad.to_str().unwrap()).is_err());
    }

    #[test]
    fn ungueltige_bind_adresse() {
        let mut cfg = ServerConfig::default();
        cfg.netzwerk.bind_adresse = "kein-host".into();
        assert!(cfg.bind_adresse().is_err());
    }
}
