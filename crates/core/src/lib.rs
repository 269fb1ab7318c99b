//! callprobe-core – Gemeinsame Typen, Szenarien und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Callprobe-Crates gemeinsam genutzt werden.

pub mod error;
pub mod szenario;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{CallprobeError, Result};
pub use szenario::{Szenario, SzenarioKatalog, SzenarioTyp};
pub use types::{CallId, Sprecher};
