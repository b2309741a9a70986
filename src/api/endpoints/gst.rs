//! GSTIN validation endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::gst_registry::{validate_gst_online, GstValidation};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub gst_number: String,
}

/// `POST /api/gst/validate`: format check plus registry lookup for one GSTIN.
pub async fn validate(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<GstValidation>, ApiError> {
    let Json(payload) = payload?;
    let gst_number = payload.gst_number.trim().to_string();
    if gst_number.is_empty() {
        return Err(ApiError::BadRequest("gstNumber is required".into()));
    }

    let validation = ctx
        .run_blocking(move |analyzer| validate_gst_online(analyzer.registry(), &gst_number))
        .await?;
    Ok(Json(validation))
}
