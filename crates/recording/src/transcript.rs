//! Transkript-Modell
//!
//! Das JSON-Transkript ist das einzige Artefakt, das an die nachgelagerte
//! Gespraechsanalyse uebergeben wird. Sein Format ist daher stabil:
//!
//! ```json
//! {
//!   "call_id": "20240305_140709_1a2b3c4d",
//!   "scenario": { "name": "...", "goal": "..." },
//!   "duration_seconds": 42.3,
//!   "utterances": [ { "speaker": "remote", "text": "...", "timestamp": 0.512 } ]
//! }
//! ```

use std::fmt::Write as _;

use callprobe_core::{CallId, Sprecher};
use serde::{Deserialize, Serialize};

use crate::error::AufnahmeResult;

/// Eine einzelne, unveraenderliche Aeusserung
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker: Sprecher,
    pub text: String,
    /// Sekunden seit Anrufbeginn (Millisekunden-Aufloesung)
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SzenarioInfo {
    pub name: String,
    pub goal: String,
}

/// Exportiertes Transkript eines Anrufs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranskriptExport {
    pub call_id: CallId,
    pub scenario: SzenarioInfo,
    /// Anrufdauer, auf eine Nachkommastelle gerundet
    pub duration_seconds: f64,
    pub utterances: Vec<Utterance>,
}

impl TranskriptExport {
    pub fn als_json(&self) -> AufnahmeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn aus_json(json: &str) -> AufnahmeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Lesbare Darstellung fuer Menschen
    pub fn als_text(&self) -> String {
        let mut text = String::new();
        // fmt::Write auf String schlaegt nie fehl
        let _ = writeln!(text, "Call ID: {}", self.call_id);
        let _ = writeln!(text, "Scenario: {}", self.scenario.name);
        let _ = writeln!(text, "Goal: {}", self.scenario.goal);
        let _ = writeln!(text, "Duration: {:.1}s", self.duration_seconds);
        text.push_str(&"-".repeat(50));
        text.push_str("\n\n");

        for u in &self.utterances {
            let _ = writeln!(
                text,
                "[{:.1}s] {}: {}\n",
                u.timestamp,
                u.speaker.label(),
                u.text
            );
        }
        text
    }
}
