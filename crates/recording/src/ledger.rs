//! Aeusserungs-Ledger
//!
//! Append-only: es gibt keine API zum Aendern oder Entfernen. Die
//! Einfuegereihenfolge ist die chronologische Reihenfolge.

use callprobe_core::{CallId, Sprecher};
use tokio::time::Instant;

use crate::transcript::{SzenarioInfo, TranskriptExport, Utterance};

#[derive(Debug)]
pub struct UtteranceLedger {
    call_id: CallId,
    szenario: SzenarioInfo,
    start: Instant,
    utterances: Vec<Utterance>,
}

impl UtteranceLedger {
    /// Neues Ledger, die Anrufuhr startet jetzt
    pub fn neu(call_id: CallId, szenario_name: impl Into<String>, ziel: impl Into<String>) -> Self {
        Self {
            call_id,
            szenario: SzenarioInfo {
                name: szenario_name.into(),
                goal: ziel.into(),
            },
            start: Instant::now(),
            utterances: Vec::new(),
        }
    }

    /// Haengt eine Aeusserung mit dem aktuellen Zeitversatz an
    pub fn aufzeichnen(&mut self, sprecher: Sprecher, text: impl Into<String>) {
        let text = text.into();
        let timestamp = runden(self.start.elapsed().as_secs_f64(), 1000.0);
        tracing::debug!(
            call_id = %self.call_id,
            sprecher = sprecher.label(),
            timestamp,
            "Aeusserung aufgezeichnet"
        );
        self.utterances.push(Utterance {
            speaker: sprecher,
            text,
            timestamp,
        });
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn call_id(&self) -> &CallId {
        &self.call_id
    }

    /// Momentaufnahme mit aktueller Anrufdauer
    pub fn export(&self) -> TranskriptExport {
        TranskriptExport {
            call_id: self.call_id.clone(),
            scenario: self.szenario.clone(),
            duration_seconds: runden(self.start.elapsed().as_secs_f64(), 10.0),
            utterances: self.utterances.clone(),
        }
    }
}

fn runden(wert: f64, faktor: f64) -> f64 {
    (wert * faktor).round() / faktor
}
