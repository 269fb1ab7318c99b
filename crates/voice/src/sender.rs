//! Getakteter Versand
//!
//! Ausgehendes Audio wird in Chunks fester Dauer in Echtzeit-Takt
//! verschickt, nicht als ein Block. Der Takt richtet sich nach Deadlines
//! ab Versandbeginn, damit sich Verzoegerungen einzelner Sends nicht
//! aufsummieren. Haengt ein Send laenger als einen Takt, wird die Deadline
//! neu verankert statt die verpassten Chunks nachzuholen.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use callprobe_core::Result;
use tokio::time::{sleep_until, Instant};

use crate::kollaborateure::AudioSender;

/// Verschickt `pcm` in Chunks von `chunk_bytes` im Abstand von `takt`.
///
/// `fortschritt` haelt nach jedem zugestellten Chunk die Anzahl bisher
/// gesendeter Bytes, damit ein Abbruch mitten im Versand nachvollziehbar
/// bleibt. Nach dem letzten Chunk wird nicht mehr gewartet.
///
/// Gibt die Anzahl tatsaechlich gesendeter Bytes zusammen mit dem
/// Ergebnis zurueck. Bricht beim ersten Fehler ab.
pub async fn getaktet_senden(
    sender: &dyn AudioSender,
    pcm: &Bytes,
    chunk_bytes: usize,
    takt: Duration,
    fortschritt: &AtomicUsize,
) -> (usize, Result<()>) {
    let chunk_bytes = chunk_bytes.max(2);
    let start = Instant::now();
    let mut gesendet = 0;
    let mut deadline = start;

    while gesendet < pcm.len() {
        let ende = (gesendet + chunk_bytes).min(pcm.len());
        if let Err(e) = sender.senden(pcm.slice(gesendet..ende)).await {
            return (gesendet, Err(e));
        }
        gesendet = ende;
        fortschritt.store(gesendet, Ordering::Release);

        if gesendet == pcm.len() {
            break;
        }

        deadline += takt;
        let jetzt = Instant::now();
        if deadline < jetzt {
            tracing::debug!(
                rueckstand_ms = (jetzt - deadline).as_millis() as u64,
                "Versand im Rueckstand – Takt neu verankert"
            );
            deadline = jetzt + takt;
        }
        sleep_until(deadline).await;
    }

    tracing::trace!(
        bytes = gesendet,
        dauer_ms = start.elapsed().as_millis() as u64,
        "Audio versendet"
    );
    (gesendet, Ok(()))
}
