//! Prometheus-kompatible Metriken fuer Callprobe
//!
//! Registrierte Metriken:
//! - `callprobe_calls_active` – Gauge: Laufende Anrufe
//! - `callprobe_calls_total` – Counter: Angenommene Anrufe
//! - `callprobe_turns_total` – Counter: Abgeschlossene Gespraechsrunden
//! - `callprobe_turn_failures_total` – Counter: Fehlgeschlagene Runden
//! - `callprobe_superseded_responses_total` – Counter: Verdraengte Antworten
//! - `callprobe_outbound_audio_seconds_total` – Counter: Gesendetes Audio
//! - `callprobe_http_requests_total` – Counter: HTTP-Anfragen (method, path, status)
//! - `callprobe_http_request_duration_seconds` – Histogram: HTTP-Antwortzeit

use std::sync::Arc;

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{
    Counter, Encoder, Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};

/// Alle Callprobe-Prometheus-Metriken
#[derive(Clone)]
pub struct CallprobeMetrics {
    pub registry: Arc<Registry>,

    // Anruf-Metriken
    pub calls_active: Gauge,
    pub calls_total: IntCounter,
    pub turns_total: IntCounter,
    pub turn_failures_total: IntCounter,
    pub superseded_responses_total: IntCounter,
    pub outbound_audio_seconds_total: Counter,

    // HTTP-Metriken
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
}

impl CallprobeMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let calls_active = Gauge::with_opts(Opts::new(
            "callprobe_calls_active",
            "Anzahl laufender Anrufe",
        ))?;
        registry.register(Box::new(calls_active.clone()))?;

        let calls_total = IntCounter::with_opts(Opts::new(
            "callprobe_calls_total",
            "Gesamtanzahl angenommener Anrufe",
        ))?;
        registry.register(Box::new(calls_total.clone()))?;

        let turns_total = IntCounter::with_opts(Opts::new(
            "callprobe_turns_total",
            "Abgeschlossene Gespraechsrunden",
        ))?;
        registry.register(Box::new(turns_total.clone()))?;

        let turn_failures_total = IntCounter::with_opts(Opts::new(
            "callprobe_turn_failures_total",
            "Gespraechsrunden mit Fehler bei Generierung, Synthese oder Versand",
        ))?;
        registry.register(Box::new(turn_failures_total.clone()))?;

        let superseded_responses_total = IntCounter::with_opts(Opts::new(
            "callprobe_superseded_responses_total",
            "Antworten, die vor dem Sprechen von neuem Transkript verdraengt wurden",
        ))?;
        registry.register(Box::new(superseded_responses_total.clone()))?;

        let outbound_audio_seconds_total = Counter::with_opts(Opts::new(
            "callprobe_outbound_audio_seconds_total",
            "Gesendetes Audio in Sekunden",
        ))?;
        registry.register(Box::new(outbound_audio_seconds_total.clone()))?;

        // --- HTTP-Metriken ---
        let http_requests_total = IntCounterVec::new(
            Opts::new("callprobe_http_requests_total", "Gesamtanzahl HTTP-Anfragen"),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "callprobe_http_request_duration_seconds",
                "HTTP-Antwortzeit in Sekunden",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
            &["method", "path"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            calls_active,
            calls_total,
            turns_total,
            turn_failures_total,
            superseded_responses_total,
            outbound_audio_seconds_total,
            http_requests_total,
            http_request_duration_seconds,
        })
    }

    pub fn anruf_gestartet(&self) {
        self.calls_total.inc();
        self.calls_active.inc();
    }

    /// Verbucht die Statistik eines beendeten Anrufs
    pub fn anruf_beendet(
        &self,
        runden: u64,
        fehlgeschlagen: u64,
        verdraengt: u64,
        outbound_sekunden: f64,
    ) {
        self.calls_active.dec();
        self.turns_total.inc_by(runden);
        self.turn_failures_total.inc_by(fehlgeschlagen);
        self.superseded_responses_total.inc_by(verdraengt);
        if outbound_sekunden > 0.0 {
            self.outbound_audio_seconds_total.inc_by(outbound_sekunden);
        }
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: CallprobeMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<CallprobeMetrics>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metriken_erstellen_erfolgreich() {
        let metriken = CallprobeMetrics::neu().unwrap();
        assert!(!metriken.registry.gather().is_empty());
    }

    #[test]
    fn zwei_registries_kollidieren_nicht() {
        // Jede Instanz hat ihre eigene Registry
        let a = CallprobeMetrics::neu().unwrap();
        let b = CallprobeMetrics::neu().unwrap();
        a.anruf_gestartet();
        assert_eq!(a.calls_total.get(), 1);
        assert_eq!(b.calls_total.get(), 0);
    }

    #[test]
    fn anruf_lebenszyklus_verbuchen() {
        let m = CallprobeMetrics::neu().unwrap();
        m.anruf_gestartet();
        m.anruf_gestartet();
        assert_eq!(m.calls_active.get(), 2.0);

        m.anruf_beendet(4, 1, 2, 3.5);
        assert_eq!(m.calls_active.get(), 1.0);
        assert_eq!(m.turns_total.get(), 4);
        assert_eq!(m.turn_failures_total.get(), 1);
        assert_eq!(m.superseded_responses_total.get(), 2);
        assert!((m.outbound_audio_seconds_total.get() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn export_enthaelt_metriknamen() {
        let m = CallprobeMetrics::neu().unwrap();
        m.anruf_gestartet();
        m.http_requests_total
            .with_label_values(&["GET", "/health", "200"])
            .inc();

        let text = m.exportieren().unwrap();
        assert!(text.contains("callprobe_calls_total 1"));
        assert!(text.contains("callprobe_calls_active 1"));
        assert!(text.contains("callprobe_http_requests_total"));
    }
}
