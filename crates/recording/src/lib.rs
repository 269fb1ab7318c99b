//! callprobe-recording – Aufzeichnung eines Anrufs
//!
//! Dieses Crate implementiert:
//! - UtteranceLedger: append-only Protokoll aller Aeusserungen
//! - TranskriptExport: maschinenlesbares (JSON) und lesbares Transkript
//! - Aufnahme: Persistenz aller Artefakte eines Anrufs (best effort)
//!
//! # Beispiel
//!
//! ```no_run
//! use callprobe_core::{CallId, Sprecher};
//! use callprobe_recording::UtteranceLedger;
//!
//! let mut ledger = UtteranceLedger::neu(CallId::new(), "Sarah Chen", "Termin vereinbaren");
//! ledger.aufzeichnen(Sprecher::Gegenseite, "Praxis Dr. Weber, guten Tag?");
//! let export = ledger.export();
//! println!("{}", export.als_text());
//! ```

pub mod artifacts;
pub mod error;
pub mod ledger;
pub mod transcript;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use artifacts::{Aufnahme, SpeicherBericht};
pub use error::{AufnahmeError, AufnahmeResult};
pub use ledger::UtteranceLedger;
pub use transcript::{SzenarioInfo, TranskriptExport, Utterance};
