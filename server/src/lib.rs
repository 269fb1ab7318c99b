//! callprobe-server – Bibliotheks-Root
//!
//! Ein HTTP-Server mit:
//! - `GET /media-stream` – WebSocket der Telefonie-Gegenstelle
//! - `GET /call-status`, `POST /set-scenario/:index` – Steuer-API
//! - `GET /metrics`, `GET /health` – Observability

pub mod config;
pub mod medien;
pub mod routen;
pub mod zustand;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use callprobe_core::SzenarioKatalog;
use callprobe_observability::{
    observability_router, request_timing_layer, timing_middleware, CallprobeMetrics,
};

use config::ServerConfig;
use medien::{DienstFabrik, NichtKonfiguriert};
use zustand::AppZustand;

/// Baut den vollstaendigen Router
pub fn router(zustand: AppZustand) -> Router {
    let metriken = zustand.metriken.clone();
    let observability = observability_router(metriken.clone(), zustand.health.clone());

    Router::new()
        .route("/media-stream", get(medien::medienstrom_upgrade))
        .route("/call-status", get(routen::anruf_status))
        .route("/set-scenario/:index", post(routen::szenario_setzen))
        .with_state(zustand)
        .merge(observability)
        .layer(axum::middleware::from_fn_with_state(metriken, timing_middleware))
        .layer(request_timing_layer())
}

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
    fabrik: Arc<dyn DienstFabrik>,
}

impl Server {
    /// Erstellt einen Server ohne eingebundene Dienste
    pub fn neu(config: ServerConfig) -> Self {
        Self {
            config,
            fabrik: Arc::new(NichtKonfiguriert),
        }
    }

    /// Bindet die Dienste fuer Transkription, Generierung und Synthese ein
    pub fn mit_fabrik(mut self, fabrik: Arc<dyn DienstFabrik>) -> Self {
        self.fabrik = fabrik;
        self
    }

    /// Startet den HTTP-Server und laeuft bis zum Shutdown-Signal
    pub async fn starten(self) -> Result<()> {
        let katalog = SzenarioKatalog::laden(&self.config.szenarien.datei).with_context(|| {
            format!(
                "Szenario-Katalog '{}' nicht ladbar",
                self.config.szenarien.datei.display()
            )
        })?;
        let metriken = CallprobeMetrics::neu()?;
        let adresse = self.config.bind_adresse()?;

        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %adresse,
            szenarien = katalog.len(),
            aufnahme = self.config.aufnahme.aktiviert,
            "Server startet"
        );

        let zustand = AppZustand::neu(self.config, katalog, self.fabrik, metriken);
        let app = router(zustand);

        let listener = tokio::net::TcpListener::bind(adresse).await?;
        tracing::info!(adresse = %adresse, "Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(fehler = %e, "Shutdown-Signal nicht verfuegbar");
                }
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
            })
            .await?;

        Ok(())
    }
}
