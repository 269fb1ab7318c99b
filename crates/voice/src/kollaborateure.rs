//! Externe Kollaborateure
//!
//! Spracherkennung, Antwortgenerierung, Sprachsynthese und der Audio-Rueckkanal
//! sind Adapter um entfernte Dienste. Die Gespraechssteuerung kennt sie nur
//! ueber diese Traits.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use callprobe_core::Result;
use tokio::sync::mpsc;

/// Ergebnis der Spracherkennung
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranskriptEreignis {
    pub text: String,
    /// Stabil und nicht mehr revidierbar
    pub ist_final: bool,
}

/// Streaming-Spracherkennung fuer das eingehende Leg
#[async_trait]
pub trait Transkription: Send + Sync {
    /// Startet den Erkennungsstrom, Ergebnisse landen in `ereignisse`
    async fn starten(&self, ereignisse: mpsc::Sender<TranskriptEreignis>) -> Result<()>;

    /// Schiebt eingehendes 16 Bit PCM in den Erkenner
    async fn audio_senden(&self, pcm: &[u8]) -> Result<()>;

    async fn beenden(&self) -> Result<()>;
}

/// Erzeugt die Antworten des simulierten Anrufers.
///
/// Der Gespraechsverlauf liegt beim Generator selbst.
#[async_trait]
pub trait AntwortGenerator: Send + Sync {
    /// `None` fuer die Eroeffnung des Anrufs
    async fn antwort_generieren(&self, gegenseite: Option<&str>) -> Result<String>;
}

/// Text → 8 kHz/16 Bit/mono PCM
#[async_trait]
pub trait SprachSynthese: Send + Sync {
    async fn synthetisieren(&self, text: &str) -> Result<Vec<u8>>;
}

/// Senke fuer einen ausgehenden PCM-Chunk
#[async_trait]
pub trait AudioSender: Send + Sync {
    async fn senden(&self, chunk: Bytes) -> Result<()>;
}

/// Dienste, die eine Anruf-Sitzung zum Antworten braucht
#[derive(Clone)]
pub struct Dienste {
    pub generator: Arc<dyn AntwortGenerator>,
    pub synthese: Arc<dyn SprachSynthese>,
    pub sender: Arc<dyn AudioSender>,
}
