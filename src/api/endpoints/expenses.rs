//! Expense analysis and scoring endpoints.
//!
//! `POST /api/expenses/analyze` runs the full pipeline on a receipt photo.
//! `POST /api/expenses/score` scores a submission the caller assembled itself.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::analyzer::{ExpenseAnalysis, ExpenseRequest};
use crate::pipeline::scoring::{
    calculate_fraud_score, calculate_reliability_score, generate_fraud_report,
    generate_reliability_report, ExpenseSubmission, FraudAnalysisResult, ReliabilityResult,
};

/// Maximum decoded receipt image size in bytes (8 MB).
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub claimed_amount: Option<f64>,
    #[serde(default)]
    pub remaining_balance: Option<f64>,
    /// Base64 data URL (e.g., `data:image/jpeg;base64,/9j/...`) or raw base64.
    #[serde(default)]
    pub receipt_image: Option<String>,
    /// Receipt text read elsewhere; skips OCR when present.
    #[serde(default)]
    pub receipt_text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub fraud: FraudAnalysisResult,
    pub reliability: ReliabilityResult,
    pub report: String,
    pub reliability_report: String,
}

/// `POST /api/expenses/analyze`: OCR, extraction, GST check, and scoring.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ExpenseAnalysis>, ApiError> {
    let Json(payload) = payload?;

    let receipt_image = payload
        .receipt_image
        .as_deref()
        .map(decode_receipt_image)
        .transpose()?;

    let request = ExpenseRequest {
        claimed_amount: payload.claimed_amount,
        remaining_balance: payload.remaining_balance,
        receipt_image,
        receipt_text: payload.receipt_text,
    };

    let analysis = ctx.run_blocking(move |analyzer| analyzer.analyze(request)).await?;
    Ok(Json(analysis))
}

/// `POST /api/expenses/score`: both scorers and both reports.
pub async fn score(
    payload: Result<Json<ExpenseSubmission>, JsonRejection>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let Json(submission) = payload?;

    let fraud = calculate_fraud_score(&submission);
    let reliability = calculate_reliability_score(&submission);
    let report = generate_fraud_report(&fraud);
    let reliability_report = generate_reliability_report(&reliability);

    Ok(Json(ScoreResponse {
        fraud,
        reliability,
        report,
        reliability_report,
    }))
}

/// Decode, size-check, and sniff an uploaded receipt image.
fn decode_receipt_image(data: &str) -> Result<Vec<u8>, ApiError> {
    let bytes = decode_data_url(data)
        .map_err(|e| ApiError::BadRequest(format!("Invalid image data: {e}")))?;

    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Receipt image is empty".into()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::BadRequest(format!(
            "Receipt image exceeds 8 MB size limit ({} bytes)",
            bytes.len()
        )));
    }
    if detect_image_format(&bytes).is_none() {
        return Err(ApiError::BadRequest(
            "Unsupported image format (expected JPEG, PNG, WebP or HEIC)".into(),
        ));
    }
    Ok(bytes)
}

/// Decode a base64 data URL to raw bytes.
///
/// Handles both `data:image/jpeg;base64,...` and raw base64 strings.
fn decode_data_url(data_url: &str) -> Result<Vec<u8>, String> {
    let base64_data = match data_url.find(',') {
        Some(idx) => &data_url[idx + 1..],
        None => data_url,
    };

    base64::engine::general_purpose::STANDARD
        .decode(base64_data.trim())
        .map_err(|e| format!("Base64 decode failed: {e}"))
}

/// ISO-BMFF major brands used by HEIC/HEIF stills.
const HEIC_BRANDS: [&[u8]; 4] = [b"heic", b"heix", b"mif1", b"msf1"];

/// Detect receipt image format from magic bytes.
fn detect_image_format(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() >= 3 && bytes[0..3] == [0xFF, 0xD8, 0xFF] {
        Some("jpeg")
    } else if bytes.len() >= 8 && bytes[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        Some("png")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" && HEIC_BRANDS.contains(&&bytes[8..12]) {
        Some("heic")
    } else {
        None
    }
}
