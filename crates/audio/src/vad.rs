//! Sprachaktivitaet auf dem eingehenden Leg
//!
//! Grobe Energie-Schwelle statt trainiertem Modell: jeder Frame wird auf
//! seinen RMS-Wert reduziert, liegt dieser ueber der Schwelle, gilt die
//! Gegenseite als sprechend. Gelesen wird nur die Zeit seit der letzten
//! Aktivitaet.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Standard-Schwelle fuer 16 Bit PCM
pub const STANDARD_SCHWELLE: f32 = 400.0;

/// Verfolgt den Zeitpunkt der letzten Sprachaktivitaet
#[derive(Debug)]
pub struct VoiceActivityTracker {
    schwelle: f32,
    letzte_aktivitaet: Mutex<Option<Instant>>,
}

impl VoiceActivityTracker {
    pub fn new(schwelle: f32) -> Self {
        Self {
            schwelle,
            letzte_aktivitaet: Mutex::new(None),
        }
    }

    /// Wertet einen PCM-Frame aus.
    ///
    /// Gibt zurueck ob Aktivitaet erkannt wurde. Kaputte Frames (ungerade
    /// Laenge) zaehlen als Stille und werden nur geloggt.
    pub fn observe(&self, pcm: &[u8]) -> bool {
        let energie = match rms_energy(pcm) {
            Some(e) => e,
            None => {
                tracing::debug!(bytes = pcm.len(), "Ungueltiger Audio-Frame ignoriert");
                return false;
            }
        };

        if energie > self.schwelle {
            *self.letzte_aktivitaet.lock() = Some(Instant::now());
            true
        } else {
            false
        }
    }

    /// Zeit seit der letzten Aktivitaet, `Duration::MAX` wenn nie aktiv
    pub fn stille_dauer(&self) -> Duration {
        match *self.letzte_aktivitaet.lock() {
            Some(zeitpunkt) => zeitpunkt.elapsed(),
            None => Duration::MAX,
        }
    }
}

impl Default for VoiceActivityTracker {
    fn default() -> Self {
        Self::new(STANDARD_SCHWELLE)
    }
}

/// Berechnet den RMS-Energiewert eines 16 Bit LE PCM-Frames.
///
/// `None` bei ungerader Laenge.
pub fn rms_energy(pcm: &[u8]) -> Option<f32> {
    if pcm.len() % 2 != 0 {
        return None;
    }
    if pcm.is_empty() {
        return Some(0.0);
    }
    let samples = pcm.len() / 2;
    let sum_sq: f64 = pcm
        .chunks_exact(2)
        .map(|s| {
            let v = i16::from_le_bytes([s[0], s[1]]) as f64;
            v * v
        })
        .sum();
    Some((sum_sq / samples as f64).sqrt() as f32)
}
