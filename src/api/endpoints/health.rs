//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// `online` when GSTINs are checked against the registry, `offline` for format-only.
    pub gst_registry: &'static str,
}

/// `GET /api/health`: liveness and registry mode.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let gst_registry = if ctx.analyzer.registry().is_online() {
        "online"
    } else {
        "offline"
    };

    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        gst_registry,
    })
}
