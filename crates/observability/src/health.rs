//! Health-Check-Endpunkt
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime, laufenden Anrufen und
//! dem Ergebnis der letzten Artefakt-Speicherung

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub active_calls: usize,
    pub last_save_ok: bool,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
pub struct HealthState {
    pub start_time: Arc<Instant>,
    aktive_anrufe: Arc<AtomicUsize>,
    letzte_speicherung_ok: Arc<AtomicBool>,
}

impl HealthState {
    pub fn neu() -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            aktive_anrufe: Arc::new(AtomicUsize::new(0)),
            letzte_speicherung_ok: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn aktive_anrufe(&self) -> usize {
        self.aktive_anrufe.load(Ordering::Relaxed)
    }

    pub fn aktive_anrufe_setzen(&self, anzahl: usize) {
        self.aktive_anrufe.store(anzahl, Ordering::Relaxed);
    }

    pub fn speicherung_ok(&self) -> bool {
        self.letzte_speicherung_ok.load(Ordering::Relaxed)
    }

    pub fn speicherung_melden(&self, ok: bool) {
        self.letzte_speicherung_ok.store(ok, Ordering::Relaxed);
    }

    pub fn status(&self) -> HealthStatus {
        if self.speicherung_ok() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        }
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::neu()
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let status = state.status();

    let http_status = match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        active_calls: state.aktive_anrufe(),
        last_save_ok: state.speicherung_ok(),
    };

    (http_status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn health_state_frisch() {
        let state = HealthState::neu();
        assert!(state.uptime_seconds() < 5);
        assert_eq!(state.aktive_anrufe(), 0);
        assert_eq!(state.status(), HealthStatus::Healthy);
    }

    #[test]
    fn fehlgeschlagene_speicherung_ist_degraded() {
        let state = HealthState::neu();
        state.speicherung_melden(false);
        assert_eq!(state.status(), HealthStatus::Degraded);
        state.speicherung_melden(true);
        assert_eq!(state.status(), HealthStatus::Healthy);
    }

    #[test]
    fn klone_teilen_den_zustand() {
        let state = HealthState::neu();
        let klon = state.clone();
        klon.aktive_anrufe_setzen(3);
        assert_eq!(state.aktive_anrufe(), 3);
    }

    #[test]
    fn health_response_serialisierung() {
        let response = HealthResponse {
            status: HealthStatus::Degraded,
            version: "0.1.0".to_string(),
            uptime_seconds: 120,
            active_calls: 2,
            last_save_ok: false,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"degraded\""));
        assert!(json.contains("\"active_calls\":2"));
        assert!(json.contains("\"last_save_ok\":false"));
    }

    #[tokio::test]
    async fn endpunkt_liefert_json() {
        let state = HealthState::neu();
        state.aktive_anrufe_setzen(1);
        let app = health_router(state);

        let antwort = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(antwort.status(), StatusCode::OK);

        let body = to_bytes(antwort.into_body(), usize::MAX).await.unwrap();
        let wert: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(wert.status, HealthStatus::Healthy);
        assert_eq!(wert.active_calls, 1);
    }
}
