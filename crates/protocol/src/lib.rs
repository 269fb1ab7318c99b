//! callprobe-protocol – Medienstrom-Nachrichten
//!
//! Die Telefonie-Gegenstelle spricht JSON-Textnachrichten ueber eine
//! WebSocket-Verbindung. Audio reist darin als base64-kodiertes µ-law.

pub mod error;
pub mod medienstrom;

pub use error::{ProtokollError, ProtokollResult};
pub use medienstrom::{AusgehendeMedien, MedienNachricht, MedienNutzlast, StartInfo};
