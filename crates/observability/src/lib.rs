//! # callprobe-observability
//!
//! Observability-Crate fuer Callprobe:
//! - Prometheus-kompatible Metriken (`/metrics`)
//! - Health-Check-Endpunkt (`/health`)
//! - Structured Logging via tracing-subscriber
//! - Request-Timing Middleware

pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;

pub use health::{health_router, HealthResponse, HealthState, HealthStatus};
pub use logging::logging_initialisieren;
pub use metrics::{metrics_router, CallprobeMetrics};
pub use middleware::{request_timing_layer, timing_middleware};

use axum::Router;

/// Router mit `GET /metrics` und `GET /health`
///
/// Wird vom Server in dessen eigenen Router eingehaengt, damit die
/// Endpunkte auf demselben Port liegen wie der Medienstrom.
pub fn observability_router(metriken: CallprobeMetrics, health: HealthState) -> Router {
    Router::new()
        .merge(metrics_router(metriken))
        .merge(health_router(health))
}
