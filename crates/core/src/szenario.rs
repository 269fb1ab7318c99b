//! Anruf-Szenarien
//!
//! Ein Szenario beschreibt, wen der simulierte Anrufer spielt und was er
//! erreichen will. Der Kern (Name, Ziel, Typ) ist typisiert, weitere
//! Angaben landen in einer offenen String-Map.
//!
//! Der Katalog wird aus einer TOML-Datei geladen:
//!
//! ```toml
//! [[szenario]]
//! name = "Sarah Chen"
//! geburtsdatum = "July 8, 1992"
//! typ = "terminvereinbarung"
//! ziel = "Schedule an appointment for persistent headaches"
//!
//! [szenario.details]
//! preferred_time = "afternoon"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CallprobeError, Result};

/// Art des Anliegens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SzenarioTyp {
    Terminvereinbarung,
    Umbuchung,
    Absage,
    Rezept,
    Frage,
}

/// Ein einzelnes Anruf-Szenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Szenario {
    /// Name der gespielten Person
    pub name: String,
    /// Geburtsdatum im Klartext (z.B. "January 15, 1980")
    #[serde(default)]
    pub geburtsdatum: String,
    pub typ: SzenarioTyp,
    /// Gespraechsziel – fuer den Kern undurchsichtig
    pub ziel: String,
    /// Freie Zusatzangaben
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct KatalogDatei {
    #[serde(default)]
    szenario: Vec<Szenario>,
}

/// Geordnete Liste aller verfuegbaren Szenarien
#[derive(Debug, Clone, Default)]
pub struct SzenarioKatalog {
    szenarien: Vec<Szenario>,
}

impl SzenarioKatalog {
    pub fn neu(szenarien: Vec<Szenario>) -> Self {
        Self { szenarien }
    }

    /// Parst einen Katalog aus einem TOML-String
    pub fn aus_toml(inhalt: &str) -> Result<Self> {
        let datei: KatalogDatei = toml::from_str(inhalt)
            .map_err(|e| CallprobeError::Konfiguration(format!("Szenario-Katalog: {e}")))?;
        Ok(Self::neu(datei.szenario))
    }

    /// Laedt den Katalog aus einer TOML-Datei
    pub fn laden(pfad: impl AsRef<Path>) -> Result<Self> {
        let pfad = pfad.as_ref();
        let inhalt = std::fs::read_to_string(pfad)?;
        let katalog = Self::aus_toml(&inhalt)?;
        tracing::info!(
            pfad = %pfad.display(),
            anzahl = katalog.len(),
            "Szenario-Katalog geladen"
        );
        Ok(katalog)
    }

    pub fn get(&self, index: usize) -> Option<&Szenario> {
        self.szenarien.get(index)
    }

    /// Sucht ein Szenario nach Name (Gross-/Kleinschreibung egal)
    pub fn nach_name(&self, name: &str) -> Option<&Szenario> {
        self.szenarien
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Wie `get`, aber mit Fehler statt `None`
    pub fn erforderlich(&self, index: usize) -> Result<&Szenario> {
        self.get(index).ok_or_else(|| {
            CallprobeError::SzenarioNichtGefunden(format!(
                "Index {index} (verfuegbar: 0-{})",
                self.len().saturating_sub(1)
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.szenarien.len()
    }

    pub fn is_empty(&self) -> bool {
        self.szenarien.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Szenario> {
        self.szenarien.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KATALOG: &str = r#"
        [[szenario]]
        name = "David Park"
        geburtsdatum = "September 3, 1988"
        typ = "absage"
        ziel = "Cancel upcoming appointment"

        [szenario.details]
        reason = "feeling better"

        [[szenario]]
        name = "Emily Rodriguez"
        typ = "frage"
        ziel = "Ask about office hours"
    "#;

    #[test]
    fn katalog_aus_toml() {
        let katalog = SzenarioKatalog::aus_toml(KATALOG).unwrap();
        assert_eq!(katalog.len(), 2);

        let erstes = katalog.get(0).unwrap();
        assert_eq!(erstes.typ, SzenarioTyp::Absage);
        assert_eq!(erstes.details.get("reason").map(String::as_str), Some("feeling better"));

        // Nicht angegebene Felder behalten Standardwerte
        let zweites = katalog.get(1).unwrap();
        assert!(zweites.geburtsdatum.is_empty());
        assert!(zweites.details.is_empty());
    }

    #[test]
    fn suche_nach_name_ignoriert_schreibweise() {
        let katalog = SzenarioKatalog::aus_toml(KATALOG).unwrap();
        assert!(katalog.nach_name("david park").is_some());
        assert!(katalog.nach_name("Niemand").is_none());
    }

    #[test]
    fn ungueltiger_index_liefert_fehler() {
        let katalog = SzenarioKatalog::aus_toml(KATALOG).unwrap();
        let e = katalog.erforderlich(7).unwrap_err();
        assert!(e.to_string().contains("Index 7"));
    }

    #[test]
    fn unbekannter_typ_ist_konfigurationsfehler() {
        let toml = r#"
            [[szenario]]
            name = "X"
            typ = "unbekannt"
            ziel = "Y"
        "#;
        let e = SzenarioKatalog::aus_toml(toml).unwrap_err();
        assert!(matches!(e, CallprobeError::Konfiguration(_)));
    }

    #[test]
    fn katalog_aus_datei_laden() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("szenarien.toml");
        std::fs::write(&pfad, KATALOG).unwrap();

        let katalog = SzenarioKatalog::laden(&pfad).unwrap();
        assert_eq!(katalog.iter().count(), 2);
    }

    #[test]
    fn fehlende_datei_ist_io_fehler() {
        let e = SzenarioKatalog::laden("/gibt/es/nicht.toml").unwrap_err();
        assert!(matches!(e, CallprobeError::Io(_)));
    }
}
