//! Persistenz der Anruf-Artefakte
//!
//! Pro Anruf ein Verzeichnis `<basis>/<call_id>/` mit:
//! - `transcript.json`, `transcript.txt`
//! - `inbound.wav` (falls eingehendes Audio vorhanden)
//! - `outbound.wav`, `outbound_raw.wav`, `combined.wav` (falls gesprochen wurde)
//!
//! Jedes Artefakt wird unabhaengig geschrieben. Scheitert eines, werden die
//! uebrigen trotzdem gespeichert.

use std::path::{Path, PathBuf};

use callprobe_audio::{mischen, wav_schreiben, AudioAusrichtung};

use crate::error::AufnahmeResult;
use crate::transcript::TranskriptExport;

/// Alles, was von einem beendeten Anruf uebrig bleibt
#[derive(Debug)]
pub struct Aufnahme {
    pub transkript: TranskriptExport,
    pub ausrichtung: AudioAusrichtung,
}

/// Ergebnis eines Speichervorgangs
#[derive(Debug, Default)]
pub struct SpeicherBericht {
    pub verzeichnis: PathBuf,
    /// Erfolgreich geschriebene Dateinamen
    pub gespeichert: Vec<String>,
    /// Dateiname und Fehlermeldung je gescheitertem Artefakt
    pub fehler: Vec<(String, String)>,
}

impl SpeicherBericht {
    pub fn ist_vollstaendig(&self) -> bool {
        self.fehler.is_empty()
    }
}

impl Aufnahme {
    /// Speichert alle Artefakte unter `basis/<call_id>/`.
    ///
    /// Blockierend, aus async-Kontext per `spawn_blocking` aufrufen.
    pub fn speichern(&self, basis: &Path) -> SpeicherBericht {
        let verzeichnis = basis.join(self.transkript.call_id.as_str());
        let mut bericht = SpeicherBericht {
            verzeichnis: verzeichnis.clone(),
            ..Default::default()
        };

        if let Err(e) = std::fs::create_dir_all(&verzeichnis) {
            tracing::error!(
                pfad = %verzeichnis.display(),
                fehler = %e,
                "Aufnahme-Verzeichnis konnte nicht angelegt werden"
            );
            bericht.fehler.push((".".into(), e.to_string()));
            return bericht;
        }

        let mut schreiben = |name: &str, ergebnis: AufnahmeResult<()>| match ergebnis {
            Ok(()) => bericht.gespeichert.push(name.to_string()),
            Err(e) => {
                tracing::warn!(
                    call_id = %self.transkript.call_id,
                    datei = name,
                    fehler = %e,
                    "Artefakt konnte nicht gespeichert werden"
                );
                bericht.fehler.push((name.to_string(), e.to_string()));
            }
        };

        schreiben(
            "transcript.json",
            self.transkript
                .als_json()
                .and_then(|json| Ok(std::fs::write(verzeichnis.join("transcript.json"), json)?)),
        );
        schreiben(
            "transcript.txt",
            std::fs::write(verzeichnis.join("transcript.txt"), self.transkript.als_text())
                .map_err(Into::into),
        );

        let inbound = self.ausrichtung.inbound();
        if !inbound.is_empty() {
            schreiben("inbound.wav", wav(&verzeichnis, "inbound.wav", inbound));
        }

        if self.ausrichtung.hat_outbound() {
            let ausgerichtet = self.ausrichtung.ausgerichtetes_outbound(inbound.len());
            schreiben(
                "outbound.wav",
                wav(&verzeichnis, "outbound.wav", &ausgerichtet),
            );
            schreiben(
                "outbound_raw.wav",
                wav(
                    &verzeichnis,
                    "outbound_raw.wav",
                    &self.ausrichtung.rohes_outbound(),
                ),
            );
            schreiben(
                "combined.wav",
                wav(&verzeichnis, "combined.wav", &mischen(inbound, &ausgerichtet)),
            );
        }

        tracing::info!(
            call_id = %self.transkript.call_id,
            pfad = %bericht.verzeichnis.display(),
            dateien = bericht.gespeichert.len(),
            fehler = bericht.fehler.len(),
            "Aufnahme gespeichert"
        );
        bericht
    }
}

fn wav(verzeichnis: &Path, name: &str, pcm: &[u8]) -> AufnahmeResult<()> {
    Ok(wav_schreiben(&verzeichnis.join(name), pcm)?)
}
