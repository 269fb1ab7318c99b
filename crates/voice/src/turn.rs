//! Turn-Taking-Scheduler
//!
//! Entscheidet anhand finaler Transkripte und der Sprachaktivitaet, wann
//! die Gegenseite fertig ist und der Anrufer antworten darf.
//!
//! ## Zustaende
//! - `Leerlauf` – keine Aufgabe aktiv, niemand spricht
//! - `PuffertGegenseite` – Transkripte sammeln sich, eine Antwort-Aufgabe wartet
//! - `GeneriertUndSpricht` – Antwort wird erzeugt, synthetisiert und versendet
//! - `NachfrageAusstehend` – die Gegenseite hat waehrenddessen weitergesprochen
//!
//! ## Antwort-Aufgabe
//! 1. Beruhigungszeit nach dem letzten finalen Transkript
//! 2. Stille bestaetigen (Abfrage der Sprachaktivitaet im festen Intervall)
//! 3. Endet der Text ohne Satzzeichen: Nachfrist. Neuer Text in dieser
//!    Zeit ersetzt die Aufgabe durch eine neue, die wieder ab 1. wartet
//!    und damit auch die Stille erneut bestaetigt.
//! 4. Gepufferten Text atomar entnehmen und antworten
//!
//! Pro Sitzung existiert hoechstens eine wartende Aufgabe. Eine neue
//! verdraengt die alte ueber Abbruch und Generationszaehler, der
//! gepufferte Text bleibt dabei unangetastet.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use callprobe_audio::format::chunk_bytes;
use callprobe_core::{Result, Sprecher};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::kollaborateure::Dienste;
use crate::sender::getaktet_senden;
use crate::session::SitzungsKontext;

/// Satzzeichen, nach denen die Gegenseite als fertig gilt
const SATZENDEN: [char; 3] = ['.', '?', '!'];

/// Zeitkonstanten der Gespraechssteuerung
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Wartezeit nach dem letzten finalen Transkript
    pub antwort_verzoegerung: Duration,
    /// Geforderte Stille vor einer Antwort
    pub stille_schwelle: Duration,
    /// Zusaetzliche Wartezeit bei unvollstaendigem Satz
    pub nachfrist: Duration,
    pub abfrage_intervall: Duration,
    /// RMS-Schwelle der Sprachaktivitaet (16 Bit PCM)
    pub energie_schwelle: f32,
    /// Dauer eines ausgehenden Chunks
    pub chunk_dauer: Duration,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            antwort_verzoegerung: Duration::from_millis(1200),
            stille_schwelle: Duration::from_millis(800),
            nachfrist: Duration::from_millis(500),
            abfrage_intervall: Duration::from_millis(100),
            energie_schwelle: 400.0,
            chunk_dauer: Duration::from_millis(20),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GespraechsZustand {
    Leerlauf,
    PuffertGegenseite,
    GeneriertUndSpricht,
    NachfrageAusstehend,
}

/// Zaehler einer Sitzung
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnStatistik {
    /// Abgeschlossene Gespraechsrunden
    pub runden: u64,
    pub fehlgeschlagen: u64,
    /// Von neuerem Transkript verdraengte Antwort-Aufgaben
    pub verdraengt: u64,
    pub nachfragen: u64,
    pub outbound_bytes: u64,
}

/// Antwort, deren Audio gerade verschickt wird
struct LaufenderVersand {
    audio: Bytes,
    start_offset: usize,
    gesendet: Arc<AtomicUsize>,
}

struct Innen {
    zustand: GespraechsZustand,
    ausstehend: Vec<String>,
    /// Wird bei jeder neuen oder abgebrochenen Aufgabe erhoeht
    generation: u64,
    aufgabe: Option<JoinHandle<()>>,
    beendet: bool,
    statistik: TurnStatistik,
    /// Gesetzt, solange eine Runde Audio verschickt
    versand: Option<LaufenderVersand>,
}

struct SchedulerInner {
    kontext: Arc<SitzungsKontext>,
    dienste: Dienste,
    config: TurnConfig,
    innen: Mutex<Innen>,
}

/// Zustandsmaschine einer Sitzung
///
/// Der Zustand liegt hinter einem Mutex, der nie ueber einen `.await`
/// gehalten wird.
pub(crate) struct TurnScheduler {
    inner: Arc<SchedulerInner>,
}

impl TurnScheduler {
    pub(crate) fn neu(kontext: Arc<SitzungsKontext>, dienste: Dienste, config: TurnConfig) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                kontext,
                dienste,
                config,
                innen: Mutex::new(Innen {
                    zustand: GespraechsZustand::Leerlauf,
                    ausstehend: Vec::new(),
                    generation: 0,
                    aufgabe: None,
                    beendet: false,
                    statistik: TurnStatistik::default(),
                    versand: None,
                }),
            }),
        }
    }

    /// Startet die Eroeffnungsrunde ohne Eingabe der Gegenseite
    pub(crate) fn eroeffnen(&self) {
        let mut innen = self.inner.innen.lock();
        if innen.beendet || innen.zustand != GespraechsZustand::Leerlauf {
            tracing::warn!(
                call_id = %self.inner.kontext.call_id,
                zustand = ?innen.zustand,
                "Eroeffnung nur im Leerlauf moeglich"
            );
            return;
        }

        innen.generation += 1;
        innen.zustand = GespraechsZustand::GeneriertUndSpricht;
        let inner = Arc::clone(&self.inner);
        innen.aufgabe = Some(tokio::spawn(async move {
            inner.generieren_und_sprechen(None).await;
            inner.abschliessen();
        }));
    }

    /// Finales Transkript der Gegenseite
    pub(crate) fn final_empfangen(&self, text: String) {
        let mut innen = self.inner.innen.lock();
        if innen.beendet {
            return;
        }
        innen.ausstehend.push(text);

        match innen.zustand {
            GespraechsZustand::Leerlauf | GespraechsZustand::PuffertGegenseite => {
                if innen.zustand == GespraechsZustand::PuffertGegenseite {
                    innen.statistik.verdraengt += 1;
                }
                if let Some(alt) = innen.aufgabe.take() {
                    alt.abort();
                }
                self.inner.aufgabe_starten(&mut innen);
            }
            GespraechsZustand::GeneriertUndSpricht => {
                tracing::info!(
                    call_id = %self.inner.kontext.call_id,
                    "Gegenseite spricht waehrend Antwort – wird gepuffert"
                );
                innen.zustand = GespraechsZustand::NachfrageAusstehend;
            }
            GespraechsZustand::NachfrageAusstehend => {}
        }
    }

    /// Bricht eine wartende Antwort-Aufgabe ab.
    ///
    /// Idempotent. Gepufferter Text bleibt erhalten und geht in die naechste
    /// Aufgabe ein. Eine laufende Generierung wird nicht unterbrochen.
    pub(crate) fn antwort_abbrechen(&self) -> bool {
        let mut innen = self.inner.innen.lock();
        if innen.zustand != GespraechsZustand::PuffertGegenseite {
            return false;
        }
        innen.generation += 1;
        if let Some(aufgabe) = innen.aufgabe.take() {
            aufgabe.abort();
        }
        innen.zustand = GespraechsZustand::Leerlauf;
        tracing::debug!(
            call_id = %self.inner.kontext.call_id,
            ausstehend = innen.ausstehend.len(),
            "Wartende Antwort abgebrochen"
        );
        true
    }

    /// Beendet die Zustandsmaschine und liefert die abgebrochene Aufgabe
    /// zum Abwarten zurueck
    pub(crate) fn herunterfahren(&self) -> Option<JoinHandle<()>> {
        let mut innen = self.inner.innen.lock();
        innen.beendet = true;
        innen.generation += 1;
        let aufgabe = innen.aufgabe.take();
        if let Some(a) = &aufgabe {
            a.abort();
        }
        aufgabe
    }

    /// Bereits zugestellter Anteil eines abgebrochenen Versands.
    ///
    /// Erst aufrufen, nachdem die Aufgabe aus [`Self::herunterfahren`]
    /// abgewartet wurde. Die Bytes werden der Statistik zugerechnet.
    pub(crate) fn abgebrochenen_versand_entnehmen(&self) -> Option<(Bytes, usize)> {
        let mut innen = self.inner.innen.lock();
        let versand = innen.versand.take()?;
        let gesendet = versand.gesendet.load(Ordering::Acquire);
        if gesendet == 0 {
            return None;
        }
        innen.statistik.outbound_bytes += gesendet as u64;
        // Vollstaendig zugestellt: die Gegenseite hat die ganze Antwort gehoert
        if gesendet == versand.audio.len() {
            innen.statistik.runden += 1;
        }
        Some((versand.audio.slice(..gesendet), versand.start_offset))
    }

    pub(crate) fn zustand(&self) -> GespraechsZustand {
        self.inner.innen.lock().zustand
    }

    pub(crate) fn statistik(&self) -> TurnStatistik {
        self.inner.innen.lock().statistik
    }

    pub(crate) fn ausstehender_text(&self) -> Vec<String> {
        self.inner.innen.lock().ausstehend.clone()
    }
}

impl SchedulerInner {
    /// Startet eine neue Antwort-Aufgabe, Lock muss gehalten werden
    fn aufgabe_starten(self: &Arc<Self>, innen: &mut Innen) {
        innen.generation += 1;
        innen.zustand = GespraechsZustand::PuffertGegenseite;
        let generation = innen.generation;
        innen.aufgabe = Some(tokio::spawn(Arc::clone(self).antwort_aufgabe(generation)));
    }

    async fn antwort_aufgabe(self: Arc<Self>, generation: u64) {
        sleep(self.config.antwort_verzoegerung).await;
        self.stille_abwarten().await;

        let vollstaendig = {
            let innen = self.innen.lock();
            innen
                .ausstehend
                .last()
                .map_or(true, |t| t.trim_end().ends_with(&SATZENDEN[..]))
        };
        if !vollstaendig {
            tracing::debug!(call_id = %self.kontext.call_id, "Kein Satzende – Nachfrist");
            sleep(self.config.nachfrist).await;
        }

        let text = {
            let mut innen = self.innen.lock();
            if innen.generation != generation || innen.beendet {
                return;
            }
            if innen.ausstehend.is_empty() {
                innen.zustand = GespraechsZustand::Leerlauf;
                return;
            }
            innen.zustand = GespraechsZustand::GeneriertUndSpricht;
            let text = innen.ausstehend.join(" ");
            innen.ausstehend.clear();
            text
        };

        tracing::info!(call_id = %self.kontext.call_id, text = %text, "Gegenseite fertig – Antwort");
        self.generieren_und_sprechen(Some(&text)).await;
        self.abschliessen();
    }

    async fn stille_abwarten(&self) {
        while self.kontext.vad.stille_dauer() < self.config.stille_schwelle {
            tracing::trace!(call_id = %self.kontext.call_id, "Sprachaktivitaet – warte auf Stille");
            sleep(self.config.abfrage_intervall).await;
        }
    }

    /// Eine Runde; Fehler kosten nur diese Runde
    async fn generieren_und_sprechen(&self, eingabe: Option<&str>) {
        let ergebnis = self.runde(eingabe).await;
        let mut innen = self.innen.lock();
        match ergebnis {
            Ok(()) => innen.statistik.runden += 1,
            Err(e) => {
                innen.statistik.fehlgeschlagen += 1;
                tracing::warn!(
                    call_id = %self.kontext.call_id,
                    fehler = %e,
                    wiederholbar = e.ist_wiederholbar(),
                    "Gespraechsrunde fehlgeschlagen"
                );
            }
        }
    }

    async fn runde(&self, eingabe: Option<&str>) -> Result<()> {
        let antwort = self.dienste.generator.antwort_generieren(eingabe).await?;
        let antwort = antwort.trim();
        if antwort.is_empty() {
            tracing::warn!(call_id = %self.kontext.call_id, "Leere Antwort generiert");
            return Ok(());
        }
        tracing::info!(call_id = %self.kontext.call_id, text = antwort, "Anrufer");
        self.kontext.aeusserung(Sprecher::Anrufer, antwort);

        let audio = Bytes::from(self.dienste.synthese.synthetisieren(antwort).await?);

        // Zeitleiste vor dem Versand ablesen: ab hier laeuft die Wiedergabe
        let start_offset = self.kontext.inbound_laenge();
        let fortschritt = Arc::new(AtomicUsize::new(0));
        self.innen.lock().versand = Some(LaufenderVersand {
            audio: audio.clone(),
            start_offset,
            gesendet: Arc::clone(&fortschritt),
        });

        let (gesendet, ergebnis) = getaktet_senden(
            self.dienste.sender.as_ref(),
            &audio,
            chunk_bytes(self.config.chunk_dauer),
            self.config.chunk_dauer,
            &fortschritt,
        )
        .await;

        // Ohne `.await` bis zur Aufzeichnung: ein Abbruch sieht entweder den
        // laufenden Versand oder das fertige Segment
        {
            let mut innen = self.innen.lock();
            innen.versand = None;
            innen.statistik.outbound_bytes += gesendet as u64;
        }
        if gesendet > 0 {
            self.kontext
                .outbound_aufzeichnen(audio.slice(..gesendet), start_offset);
        }
        ergebnis
    }

    /// Nach einer Runde: Leerlauf oder sofort neue Aufgabe fuer Nachzuegler
    fn abschliessen(self: &Arc<Self>) {
        let mut innen = self.innen.lock();
        if innen.beendet {
            return;
        }
        if innen.ausstehend.is_empty() {
            innen.zustand = GespraechsZustand::Leerlauf;
            innen.aufgabe = None;
            return;
        }

        tracing::info!(
            call_id = %self.kontext.call_id,
            ausstehend = innen.ausstehend.len(),
            "Gegenseite sprach waehrend der Antwort – neue Runde geplant"
        );
        innen.statistik.nachfragen += 1;
        self.aufgabe_starten(&mut innen);
    }
}
