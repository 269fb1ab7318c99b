//! Anruf-Sitzung
//!
//! Wurzel-Aggregat eines Telefonats. Entsteht mit dem Start des
//! Medienstroms und wird mit dessen Ende zu einer [`Aufnahme`] aufgeloest.
//! Jede Sitzung besitzt ihr eigenes Ledger, ihre eigene Ausrichtung und
//! ihre eigene Sprachaktivitaetserkennung; Sitzungen teilen nichts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use callprobe_audio::{AudioAusrichtung, VoiceActivityTracker};
use callprobe_core::{CallId, Sprecher, Szenario};
use callprobe_recording::{Aufnahme, UtteranceLedger};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::kollaborateure::{Dienste, TranskriptEreignis};
use crate::turn::{GespraechsZustand, TurnConfig, TurnScheduler, TurnStatistik};

/// Veraenderlicher Zustand einer Sitzung, geteilt mit dem Scheduler
#[derive(Debug)]
pub(crate) struct SitzungsKontext {
    pub(crate) call_id: CallId,
    pub(crate) vad: VoiceActivityTracker,
    ledger: Mutex<UtteranceLedger>,
    ausrichtung: Mutex<AudioAusrichtung>,
    beendet: AtomicBool,
}

impl SitzungsKontext {
    /// Nach dem Abbau ist jeder Zugriff ein Vertragsbruch
    fn pruefen(&self, aktion: &'static str) -> bool {
        if self.beendet.load(Ordering::Acquire) {
            tracing::error!(
                call_id = %self.call_id,
                aktion,
                "Zugriff auf bereits beendete Sitzung"
            );
            debug_assert!(false, "Zugriff auf beendete Sitzung: {aktion}");
            return false;
        }
        true
    }

    pub(crate) fn aeusserung(&self, sprecher: Sprecher, text: &str) {
        if self.pruefen("aeusserung") {
            self.ledger.lock().aufzeichnen(sprecher, text);
        }
    }

    pub(crate) fn inbound_laenge(&self) -> usize {
        self.ausrichtung.lock().inbound_laenge()
    }

    pub(crate) fn outbound_aufzeichnen(&self, audio: Bytes, start_offset: usize) {
        if self.pruefen("outbound_aufzeichnen") {
            tracing::debug!(
                call_id = %self.call_id,
                offset = start_offset,
                bytes = audio.len(),
                "Ausgehendes Segment aufgezeichnet"
            );
            self.ausrichtung
                .lock()
                .outbound_aufzeichnen(audio, start_offset);
        }
    }
}

/// Ergebnis des Abbaus einer Sitzung
#[derive(Debug)]
pub struct SitzungsAbschluss {
    pub aufnahme: Aufnahme,
    /// Endstand, inklusive eines beim Abbau unterbrochenen Versands
    pub statistik: TurnStatistik,
}

/// Ein laufendes Telefonat
pub struct CallSession {
    kontext: Arc<SitzungsKontext>,
    scheduler: TurnScheduler,
    erstellt_am: DateTime<Utc>,
}

impl CallSession {
    /// Erstellt eine Sitzung, die Anrufuhr startet jetzt
    pub fn neu(call_id: CallId, szenario: &Szenario, config: TurnConfig, dienste: Dienste) -> Self {
        let kontext = Arc::new(SitzungsKontext {
            vad: VoiceActivityTracker::new(config.energie_schwelle),
            ledger: Mutex::new(UtteranceLedger::neu(
                call_id.clone(),
                szenario.name.clone(),
                szenario.ziel.clone(),
            )),
            ausrichtung: Mutex::new(AudioAusrichtung::new()),
            beendet: AtomicBool::new(false),
            call_id,
        });

        tracing::info!(
            call_id = %kontext.call_id,
            szenario = %szenario.name,
            "Anruf-Sitzung erstellt"
        );

        Self {
            scheduler: TurnScheduler::neu(Arc::clone(&kontext), dienste, config),
            kontext,
            erstellt_am: Utc::now(),
        }
    }

    pub fn call_id(&self) -> &CallId {
        &self.kontext.call_id
    }

    pub fn erstellt_am(&self) -> DateTime<Utc> {
        self.erstellt_am
    }

    /// Eroeffnungsrunde: der Anrufer sagt, warum er anruft
    pub fn eroeffnen(&self) {
        self.scheduler.eroeffnen();
    }

    /// Eingehendes PCM: Zeitleiste verlaengern und Aktivitaet pruefen
    pub fn audio_empfangen(&self, pcm: &[u8]) {
        if !self.kontext.pruefen("audio_empfangen") {
            return;
        }
        self.kontext.ausrichtung.lock().inbound_anhaengen(pcm);
        self.kontext.vad.observe(pcm);
    }

    /// Verarbeitet ein Ergebnis der Spracherkennung
    pub fn transkript_empfangen(&self, ereignis: TranskriptEreignis) {
        if !ereignis.ist_final {
            tracing::trace!(call_id = %self.kontext.call_id, text = %ereignis.text, "Zwischenergebnis");
            return;
        }
        let text = ereignis.text.trim();
        if text.is_empty() {
            return;
        }

        tracing::info!(call_id = %self.kontext.call_id, text, "Gegenseite");
        self.kontext.aeusserung(Sprecher::Gegenseite, text);
        self.scheduler.final_empfangen(text.to_string());
    }

    /// Bricht eine wartende Antwort ab, gepufferter Text bleibt erhalten
    pub fn antwort_abbrechen(&self) -> bool {
        self.scheduler.antwort_abbrechen()
    }

    pub fn zustand(&self) -> GespraechsZustand {
        self.scheduler.zustand()
    }

    pub fn statistik(&self) -> TurnStatistik {
        self.scheduler.statistik()
    }

    pub fn ausstehender_text(&self) -> Vec<String> {
        self.scheduler.ausstehender_text()
    }

    /// Baut die Sitzung ab.
    ///
    /// Eine laufende Antwort wird abgebrochen und abgewartet, bevor Ledger
    /// und Ausrichtung freigegeben werden. Bereits zugestelltes Audio eines
    /// unterbrochenen Versands landet noch in der Aufnahme.
    pub async fn beenden(self) -> SitzungsAbschluss {
        if let Some(aufgabe) = self.scheduler.herunterfahren() {
            if let Err(e) = aufgabe.await {
                if e.is_panic() {
                    tracing::error!(call_id = %self.kontext.call_id, "Antwort-Aufgabe ist abgestuerzt");
                }
            }
        }

        if let Some((audio, start_offset)) = self.scheduler.abgebrochenen_versand_entnehmen() {
            tracing::info!(
                call_id = %self.kontext.call_id,
                bytes = audio.len(),
                "Unterbrochener Versand wird aufgezeichnet"
            );
            self.kontext.outbound_aufzeichnen(audio, start_offset);
        }

        let transkript = self.kontext.ledger.lock().export();
        let ausrichtung = std::mem::take(&mut *self.kontext.ausrichtung.lock());
        self.kontext.beendet.store(true, Ordering::Release);

        tracing::info!(
            call_id = %self.kontext.call_id,
            dauer_s = transkript.duration_seconds,
            aeusserungen = transkript.utterances.len(),
            "Anruf-Sitzung beendet"
        );

        SitzungsAbschluss {
            aufnahme: Aufnahme {
                transkript,
                ausrichtung,
            },
            statistik: self.scheduler.statistik(),
        }
    }
}
