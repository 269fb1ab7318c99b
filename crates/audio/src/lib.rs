//! callprobe-audio – Audio-Kern
//!
//! Alles Audio im System hat ein festes Format: 8 kHz, 16 Bit signed PCM,
//! mono (Telefon-Leg). Dieses Crate enthaelt:
//! - G.711 µ-law Kodierung fuer den Telefonie-Transport
//! - Energie-basierte Sprachaktivitaetserkennung
//! - Zeitliche Ausrichtung ausgehender Segmente an der eingehenden Zeitleiste
//! - Mischung zweier Spuren
//! - WAV-Ein-/Ausgabe

pub mod ausrichtung;
pub mod codec;
pub mod error;
pub mod format;
pub mod mixer;
pub mod vad;
pub mod wav;

// Bequeme Re-Exporte der wichtigsten Typen
pub use ausrichtung::{AudioAusrichtung, OutboundSegment};
pub use codec::{pcm_zu_ulaw, ulaw_zu_pcm};
pub use error::{AudioError, AudioResult};
pub use mixer::mischen;
pub use vad::VoiceActivityTracker;
pub use wav::{wav_lesen, wav_schreiben};
