//! Steuer-API fuer den Testtreiber

use axum::extract::{Path, State};
use axum::response::Json;
use serde_json::{json, Value};

use crate::zustand::{AnrufStatus, AppZustand};

/// `GET /call-status`
pub async fn anruf_status(State(zustand): State<AppZustand>) -> Json<AnrufStatus> {
    Json(zustand.anruf_status())
}

/// `POST /set-scenario/:index`
///
/// Ungueltige Indizes liefern `success: false` statt eines HTTP-Fehlers,
/// der Treiber wertet nur den Body aus.
pub async fn szenario_setzen(
    State(zustand): State<AppZustand>,
    Path(index): Path<usize>,
) -> Json<Value> {
    match zustand.szenario_waehlen(index) {
        Ok(szenario) => Json(json!({
            "success": true,
            "scenario_index": index,
            "scenario_name": szenario.name,
            "scenario_goal": szenario.ziel,
        })),
        Err(e) => {
            tracing::warn!(index, fehler = %e, "Szenario-Wahl abgelehnt");
            Json(json!({
                "success": false,
                "error": e.to_string(),
            }))
        }
    }
}
