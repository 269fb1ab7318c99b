//! Geteilter Anwendungszustand
//!
//! Szenario-Auswahl fuer den naechsten Anruf, Register der laufenden Anrufe
//! und die Anbindung an Metriken und Health-Check. Jeder Medienstrom besitzt
//! seine Sitzung selbst, das Register haelt nur Stammdaten.

use std::sync::Arc;

use callprobe_core::{CallId, CallprobeError, Result, Szenario, SzenarioKatalog};
use callprobe_observability::{CallprobeMetrics, HealthState};
use callprobe_voice::TurnStatistik;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::medien::DienstFabrik;

/// Stammdaten eines laufenden Anrufs
#[derive(Debug, Clone)]
pub struct AnrufInfo {
    pub stream_sid: String,
    pub szenario_index: usize,
    pub gestartet_am: DateTime<Utc>,
}

/// Antwort von `GET /call-status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnrufStatus {
    pub in_progress: bool,
    pub last_call_id: Option<CallId>,
    pub scenario_index: usize,
    pub scenario_name: Option<String>,
    pub active_calls: usize,
}

#[derive(Debug)]
struct Auswahl {
    szenario_index: usize,
    letzter_anruf: Option<CallId>,
}

/// Axum-State des Servers
#[derive(Clone)]
pub struct AppZustand {
    pub config: Arc<ServerConfig>,
    katalog: Arc<SzenarioKatalog>,
    auswahl: Arc<Mutex<Auswahl>>,
    anrufe: Arc<DashMap<CallId, AnrufInfo>>,
    fabrik: Arc<dyn DienstFabrik>,
    pub metriken: CallprobeMetrics,
    pub health: HealthState,
}

impl AppZustand {
    pub fn neu(
        config: ServerConfig,
        katalog: SzenarioKatalog,
        fabrik: Arc<dyn DienstFabrik>,
        metriken: CallprobeMetrics,
    ) -> Self {
        let mut szenario_index = config.szenarien.aktiv;
        if szenario_index >= katalog.len() {
            tracing::warn!(
                index = szenario_index,
                anzahl = katalog.len(),
                "Konfiguriertes Szenario existiert nicht, verwende Index 0"
            );
            szenario_index = 0;
        }

        Self {
            config: Arc::new(config),
            katalog: Arc::new(katalog),
            auswahl: Arc::new(Mutex::new(Auswahl {
                szenario_index,
                letzter_anruf: None,
            })),
            anrufe: Arc::new(DashMap::new()),
            fabrik,
            metriken,
            health: HealthState::neu(),
        }
    }

    pub fn katalog(&self) -> &SzenarioKatalog {
        &self.katalog
    }

    pub fn fabrik(&self) -> &Arc<dyn DienstFabrik> {
        &self.fabrik
    }

    /// Waehlt das Szenario fuer den naechsten Anruf.
    ///
    /// Laufende Anrufe behalten ihr Szenario.
    pub fn szenario_waehlen(&self, index: usize) -> Result<Szenario> {
        let szenario = self.katalog.erforderlich(index)?.clone();
        self.auswahl.lock().szenario_index = index;
        tracing::info!(index, szenario = %szenario.name, "Szenario gewaehlt");
        Ok(szenario)
    }

    /// Aktuell gewaehltes Szenario samt Index
    pub fn aktives_szenario(&self) -> Result<(usize, Szenario)> {
        let index = self.auswahl.lock().szenario_index;
        let szenario = self.katalog.get(index).cloned().ok_or_else(|| {
            CallprobeError::Konfiguration("Szenario-Katalog ist leer".into())
        })?;
        Ok((index, szenario))
    }

    pub fn anruf_registrieren(&self, call_id: CallId, info: AnrufInfo) {
        self.auswahl.lock().letzter_anruf = Some(call_id.clone());
        self.anrufe.insert(call_id, info);
        self.metriken.anruf_gestartet();
        self.health.aktive_anrufe_setzen(self.anrufe.len());
    }

    /// Entfernt einen Anruf aus dem Register und verbucht seine Statistik
    pub fn anruf_abmelden(&self, call_id: &CallId, statistik: &TurnStatistik) -> Option<AnrufInfo> {
        let info = self.anrufe.remove(call_id).map(|(_, info)| info);
        if info.is_some() {
            self.metriken.anruf_beendet(
                statistik.runden,
                statistik.fehlgeschlagen,
                statistik.verdraengt,
                callprobe_audio::format::dauer_von_bytes(statistik.outbound_bytes as usize)
                    .as_secs_f64(),
            );
        } else {
            tracing::warn!(call_id = %call_id, "Abmeldung eines unbekannten Anrufs");
        }
        self.health.aktive_anrufe_setzen(self.anrufe.len());
        info
    }

    pub fn aktive_anrufe(&self) -> usize {
        self.anrufe.len()
    }

    pub fn anruf_status(&self) -> AnrufStatus {
        let (szenario_index, letzter_anruf) = {
            let auswahl = self.auswahl.lock();
            (auswahl.szenario_index, auswahl.letzter_anruf.clone())
        };
        let active_calls = self.anrufe.len();

        AnrufStatus {
            in_progress: active_calls > 0,
            last_call_id: letzter_anruf,
            scenario_index: szenario_index,
            scenario_name: self.katalog.get(szenario_index).map(|s| s.name.clone()),
            active_calls,
        }
    }
}
