//! Receipt text parsing endpoint.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::pipeline::extraction::{
    detect_amount, extract_gst_from_bill, sanitize_extracted_text, AmountConfidence,
};

#[derive(Deserialize)]
pub struct ParseRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_confidence: Option<AmountConfidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
}

/// `POST /api/receipts/parse`: amount and GSTIN from already-read receipt text.
///
/// No OCR and no registry call, so it runs inline.
pub async fn parse(
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ParseResponse>, ApiError> {
    let Json(payload) = payload?;
    let text = sanitize_extracted_text(&payload.text);
    let amount = detect_amount(&text);

    Ok(Json(ParseResponse {
        amount: amount.as_ref().map(|a| a.value),
        amount_confidence: amount.map(|a| a.confidence),
        gst_number: extract_gst_from_bill(&text),
    }))
}
