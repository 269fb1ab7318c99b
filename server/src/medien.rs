//! Medienstrom-Endpunkt
//!
//! Ein WebSocket pro Telefonat. Die Gegenstelle schickt `start`, danach
//! `media`-Frames mit µ-law-Audio und schliesslich `stop`. Pro Strom
//! entsteht genau eine [`CallSession`]; ausgehendes Audio laeuft ueber eine
//! Warteschlange, die ein eigener Schreib-Task in den Socket leert.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use bytes::Bytes;
use callprobe_audio::{pcm_zu_ulaw, ulaw_zu_pcm};
use callprobe_core::{CallId, CallprobeError, Result, Szenario};
use callprobe_protocol::{AusgehendeMedien, MedienNachricht, StartInfo};
use callprobe_recording::SpeicherBericht;
use callprobe_voice::{
    AntwortGenerator, AudioSender, CallSession, Dienste, SitzungsAbschluss, SprachSynthese,
    TranskriptEreignis, Transkription,
};
use chrono::Utc;
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;

use crate::zustand::{AnrufInfo, AppZustand};

/// Kapazitaet der ausgehenden Warteschlange (Nachrichten)
const AUSGANG_KAPAZITAET: usize = 256;
const TRANSKRIPT_KAPAZITAET: usize = 64;

/// Entfernte Dienste fuer einen einzelnen Anruf
pub struct AnrufDienste {
    pub transkription: Arc<dyn Transkription>,
    pub generator: Arc<dyn AntwortGenerator>,
    pub synthese: Arc<dyn SprachSynthese>,
}

/// Erzeugt die Dienste eines Anrufs.
///
/// Der Generator bekommt das Szenario, damit er die Rolle des Anrufers
/// kennt. Ein Fehler lehnt den Anruf ab.
#[async_trait]
pub trait DienstFabrik: Send + Sync {
    async fn erstellen(&self, call_id: &CallId, szenario: &Szenario) -> Result<AnrufDienste>;
}

/// Fabrik ohne Dienste, lehnt jeden Anruf ab
#[derive(Debug, Default, Clone, Copy)]
pub struct NichtKonfiguriert;

#[async_trait]
impl DienstFabrik for NichtKonfiguriert {
    async fn erstellen(&self, _call_id: &CallId, _szenario: &Szenario) -> Result<AnrufDienste> {
        Err(CallprobeError::Konfiguration(
            "keine Dienste fuer Transkription, Generierung und Synthese eingebunden".into(),
        ))
    }
}

/// Schreibt ausgehende PCM-Chunks als `media`-Events in die Warteschlange
pub struct KanalAudioSender {
    stream_sid: String,
    ausgang: mpsc::Sender<String>,
}

impl KanalAudioSender {
    pub fn neu(stream_sid: impl Into<String>, ausgang: mpsc::Sender<String>) -> Self {
        Self {
            stream_sid: stream_sid.into(),
            ausgang,
        }
    }
}

#[async_trait]
impl AudioSender for KanalAudioSender {
    async fn senden(&self, chunk: Bytes) -> Result<()> {
        let json = AusgehendeMedien::neu(self.stream_sid.as_str(), &pcm_zu_ulaw(&chunk))
            .als_json()
            .map_err(|e| CallprobeError::UngueltigeNachricht(e.to_string()))?;
        self.ausgang
            .send(json)
            .await
            .map_err(|_| CallprobeError::Getrennt("Medienstrom geschlossen".into()))
    }
}

/// `GET /media-stream`
pub async fn medienstrom_upgrade(
    ws: WebSocketUpgrade,
    State(zustand): State<AppZustand>,
) -> Response {
    ws.on_upgrade(move |socket| verbindung_bedienen(zustand, socket))
}

async fn verbindung_bedienen(zustand: AppZustand, socket: WebSocket) {
    let (mut schreiber, leser) = socket.split();
    let (ausgang_tx, mut ausgang_rx) = mpsc::channel::<String>(AUSGANG_KAPAZITAET);

    let schreib_task = tokio::spawn(async move {
        while let Some(text) = ausgang_rx.recv().await {
            if let Err(e) = schreiber.send(Message::Text(text)).await {
                tracing::debug!(fehler = %e, "Medienstrom: Senden fehlgeschlagen");
                break;
            }
        }
        let _ = schreiber.close().await;
    });

    // Textframes bis zum Close oder Lesefehler
    let eingang = Box::pin(
        leser
            .take_while(|nachricht| {
                futures_util::future::ready(matches!(nachricht, Ok(m) if !matches!(m, Message::Close(_))))
            })
            .filter_map(|nachricht| {
                futures_util::future::ready(match nachricht {
                    Ok(Message::Text(text)) => Some(text),
                    _ => None,
                })
            }),
    );

    medienstrom_verarbeiten(zustand, eingang, ausgang_tx).await;

    if let Err(e) = schreib_task.await {
        tracing::warn!(fehler = %e, "Schreib-Task des Medienstroms abgebrochen");
    }
}

/// Ein laufender Anruf innerhalb eines Medienstroms
struct LaufenderAnruf {
    sitzung: CallSession,
    transkription: Arc<dyn Transkription>,
}

/// Verarbeitet einen Medienstrom bis `stop` oder Verbindungsende.
///
/// `eingang` liefert die Textnachrichten der Gegenstelle, `ausgang` nimmt
/// die ausgehenden `media`-Events auf. Gibt den Speicherbericht zurueck,
/// falls ein Anruf stattfand und die Aufnahme aktiviert ist.
pub async fn medienstrom_verarbeiten<S>(
    zustand: AppZustand,
    mut eingang: S,
    ausgang: mpsc::Sender<String>,
) -> Option<SpeicherBericht>
where
    S: Stream<Item = String> + Unpin,
{
    let (transkript_tx, mut transkript_rx) =
        mpsc::channel::<TranskriptEreignis>(TRANSKRIPT_KAPAZITAET);
    let mut anruf: Option<LaufenderAnruf> = None;

    loop {
        tokio::select! {
            nachricht = eingang.next() => {
                let Some(text) = nachricht else {
                    tracing::info!("Medienstrom von der Gegenstelle getrennt");
                    break;
                };

                match MedienNachricht::parsen(&text) {
                    Ok(MedienNachricht::Start { start }) => {
                        if anruf.is_some() {
                            tracing::warn!("Zweites start-Event im selben Strom ignoriert");
                            continue;
                        }
                        match anruf_starten(&zustand, &start, &ausgang).await {
                            Ok(neu) => {
                                if let Err(e) = neu.transkription.starten(transkript_tx.clone()).await {
                                    tracing::error!(
                                        call_id = %neu.sitzung.call_id(),
                                        fehler = %e,
                                        "Transkription konnte nicht gestartet werden"
                                    );
                                    anruf = Some(neu);
                                    break;
                                }
                                neu.sitzung.eroeffnen();
                                anruf = Some(neu);
                            }
                            Err(e) => {
                                tracing::error!(fehler = %e, "Anruf abgelehnt");
                                break;
                            }
                        }
                    }
                    Ok(MedienNachricht::Media { media }) => {
                        let Some(laufend) = &anruf else {
                            tracing::trace!("media vor start verworfen");
                            continue;
                        };
                        match media.payload_dekodieren() {
                            Ok(ulaw) => audio_weiterleiten(laufend, &ulaw).await,
                            Err(e) => tracing::warn!(
                                call_id = %laufend.sitzung.call_id(),
                                fehler = %e,
                                "Audio-Frame nicht dekodierbar"
                            ),
                        }
                    }
                    Ok(MedienNachricht::Stop { .. }) => {
                        tracing::info!("Medienstrom beendet (stop)");
                        break;
                    }
                    Ok(andere) => tracing::debug!(nachricht = ?andere, "Nachricht ignoriert"),
                    Err(e) => tracing::warn!(fehler = %e, "Ungueltige Nachricht im Medienstrom"),
                }
            }
            Some(ereignis) = transkript_rx.recv(), if anruf.is_some() => {
                if let Some(laufend) = &anruf {
                    laufend.sitzung.transkript_empfangen(ereignis);
                }
            }
        }
    }

    let laufend = anruf?;
    anruf_beenden(&zustand, laufend).await
}

async fn anruf_starten(
    zustand: &AppZustand,
    start: &StartInfo,
    ausgang: &mpsc::Sender<String>,
) -> Result<LaufenderAnruf> {
    let stream_sid = start
        .stream_sid()
        .map_err(|e| CallprobeError::UngueltigeNachricht(e.to_string()))?
        .to_string();
    let (szenario_index, szenario) = zustand.aktives_szenario()?;
    let call_id = CallId::new();

    let dienste = zustand.fabrik().erstellen(&call_id, &szenario).await?;

    tracing::info!(
        call_id = %call_id,
        stream_sid = %stream_sid,
        call_sid = start.call_sid.as_deref().unwrap_or("-"),
        szenario = %szenario.name,
        "Medienstrom gestartet"
    );

    let sitzung = CallSession::neu(
        call_id.clone(),
        &szenario,
        zustand.config.turn_config(),
        Dienste {
            generator: dienste.generator,
            synthese: dienste.synthese,
            sender: Arc::new(KanalAudioSender::neu(stream_sid.clone(), ausgang.clone())),
        },
    );

    zustand.anruf_registrieren(
        call_id,
        AnrufInfo {
            stream_sid,
            szenario_index,
            gestartet_am: Utc::now(),
        },
    );

    Ok(LaufenderAnruf {
        sitzung,
        transkription: dienste.transkription,
    })
}

async fn audio_weiterleiten(laufend: &LaufenderAnruf, ulaw: &[u8]) {
    let pcm = ulaw_zu_pcm(ulaw);
    laufend.sitzung.audio_empfangen(&pcm);
    if let Err(e) = laufend.transkription.audio_senden(&pcm).await {
        tracing::warn!(
            call_id = %laufend.sitzung.call_id(),
            fehler = %e,
            "Audio an Transkription nicht zugestellt"
        );
    }
}

async fn anruf_beenden(zustand: &AppZustand, laufend: LaufenderAnruf) -> Option<SpeicherBericht> {
    let LaufenderAnruf {
        sitzung,
        transkription,
    } = laufend;
    let call_id = sitzung.call_id().clone();

    if let Err(e) = transkription.beenden().await {
        tracing::warn!(call_id = %call_id, fehler = %e, "Transkription nicht sauber beendet");
    }

    let SitzungsAbschluss {
        aufnahme,
        statistik,
    } = sitzung.beenden().await;
    zustand.anruf_abmelden(&call_id, &statistik);

    tracing::info!(
        call_id = %call_id,
        runden = statistik.runden,
        fehlgeschlagen = statistik.fehlgeschlagen,
        verdraengt = statistik.verdraengt,
        "Anruf beendet"
    );

    if !zustand.config.aufnahme.aktiviert {
        return None;
    }

    let basis = zustand.config.aufnahme.verzeichnis.clone();
    match tokio::task::spawn_blocking(move || aufnahme.speichern(&basis)).await {
        Ok(bericht) => {
            zustand.health.speicherung_melden(bericht.ist_vollstaendig());
            if !bericht.ist_vollstaendig() {
                tracing::warn!(
                    call_id = %call_id,
                    fehler = bericht.fehler.len(),
                    "Anruf-Artefakte unvollstaendig gespeichert"
                );
            }
            Some(bericht)
        }
        Err(e) => {
            zustand.health.speicherung_melden(false);
            tracing::error!(call_id = %call_id, fehler = %e, "Speicher-Task abgebrochen");
            None
        }
    }
}
