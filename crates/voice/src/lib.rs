//! callprobe-voice – Gespraechssteuerung
//!
//! Entscheidet, wann die Gegenseite fertig gesprochen hat, und laesst den
//! simulierten Anrufer erst dann antworten.
//!
//! ## Module
//! - [`kollaborateure`] – Schnittstellen zu Transkription, Generierung, Synthese, Versand
//! - [`sender`] – Getakteter Versand ausgehender Audio-Chunks
//! - [`turn`] – Turn-Taking-Scheduler (Zustandsmaschine)
//! - [`session`] – Anruf-Sitzung als Wurzel-Aggregat

pub mod kollaborateure;
pub mod sender;
pub mod session;
pub mod turn;

pub use kollaborateure::{
    AntwortGenerator, AudioSender, Dienste, SprachSynthese, TranskriptEreignis, Transkription,
};
pub use session::{CallSession, SitzungsAbschluss};
pub use turn::{GespraechsZustand, TurnConfig, TurnStatistik};
