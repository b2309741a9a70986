//! Expense analysis orchestrator.
//!
//! Drives one claim through the whole pipeline:
//! OCR → amount + GSTIN extraction → registry check → scoring → report.
//!
//! Engines are injected as traits so the analyzer is testable with mocks.
//! `analyze` never fails: every stage degrades to an absent value that the
//! scorers penalize.

use std::sync::Arc;

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::FundexConfig;
use crate::pipeline::extraction::{
    detect_amount, extract_gst_from_bill, extract_text_from_image, sanitize_extracted_text,
    AmountConfidence, ExtractionError, OcrEngine, OllamaVisionOcr,
};
use crate::pipeline::gst_registry::{
    validate_gst_online, GstRegistry, GstValidation, HttpGstRegistry, OfflineRegistry,
    RegistryError,
};
use crate::pipeline::scoring::{
    calculate_fraud_score, calculate_reliability_score, generate_fraud_report,
    generate_reliability_report, ExpenseSubmission, FraudAnalysisResult, ReliabilityResult,
};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors building the production engines. Analysis itself cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerSetupError {
    #[error("OCR engine initialization failed: {0}")]
    Ocr(#[from] ExtractionError),

    #[error("GST registry initialization failed: {0}")]
    Registry(#[from] RegistryError),
}

// ---------------------------------------------------------------------------
// Request / result types
// ---------------------------------------------------------------------------

/// One expense claim as submitted by a member.
#[derive(Debug, Clone, Default)]
pub struct ExpenseRequest {
    pub claimed_amount: Option<f64>,
    pub remaining_balance: Option<f64>,
    pub receipt_image: Option<Vec<u8>>,
    /// Already-transcribed receipt text. Takes precedence over the image.
    pub receipt_text: Option<String>,
}

/// Combined result handed back to the caller and stored with the claim.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseAnalysis {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    /// SHA-256 of the receipt image, base64. Lets callers spot resubmitted receipts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_confidence: Option<AmountConfidence>,
    pub submission: ExpenseSubmission,
    pub fraud: FraudAnalysisResult,
    pub reliability: ReliabilityResult,
    pub report: String,
    pub reliability_report: String,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct ExpenseAnalyzer {
    ocr: Arc<dyn OcrEngine>,
    registry: Arc<dyn GstRegistry>,
}

impl ExpenseAnalyzer {
    pub fn new(ocr: Arc<dyn OcrEngine>, registry: Arc<dyn GstRegistry>) -> Self {
        Self { ocr, registry }
    }

    pub fn registry(&self) -> &dyn GstRegistry {
        self.registry.as_ref()
    }

    /// Full pipeline for one claim. Blocking: OCR and registry calls are
    /// synchronous HTTP requests made one after the other.
    pub fn analyze(&self, request: ExpenseRequest) -> ExpenseAnalysis {
        let analysis_id = Uuid::new_v4();
        let _span = tracing::info_span!("expense_analysis", %analysis_id).entered();

        let receipt_fingerprint = request
            .receipt_image
            .as_deref()
            .filter(|bytes| !bytes.is_empty())
            .map(receipt_fingerprint);

        // Step 1: receipt text, from a non-blank override or from OCR
        let override_text = request
            .receipt_text
            .as_deref()
            .map(sanitize_extracted_text)
            .filter(|t| !t.is_empty());
        let ocr_text = match (override_text, &request.receipt_image) {
            (Some(text), _) => Some(text),
            (None, Some(image)) => extract_text_from_image(self.ocr.as_ref(), image),
            (None, None) => None,
        };

        // Step 2: amount and GSTIN from the text
        let amount = ocr_text.as_deref().and_then(detect_amount);
        let gst_validation = ocr_text.as_deref().map(|text| self.check_gst(text));

        let submission = ExpenseSubmission {
            claimed_amount: request.claimed_amount,
            detected_amount: amount.as_ref().map(|a| a.value),
            ocr_extracted_text: ocr_text,
            gst_validation,
            remaining_balance: request.remaining_balance,
        };

        // Step 3: scoring
        let fraud = calculate_fraud_score(&submission);
        let reliability = calculate_reliability_score(&submission);
        let report = generate_fraud_report(&fraud);
        let reliability_report = generate_reliability_report(&reliability);

        tracing::info!(
            fraud_score = fraud.score,
            risk_level = %fraud.risk_level,
            reliability_score = reliability.score,
            rating = %reliability.rating,
            "Expense analysis complete"
        );

        ExpenseAnalysis {
            analysis_id,
            analyzed_at: Utc::now(),
            receipt_fingerprint,
            amount_confidence: amount.map(|a| a.confidence),
            submission,
            fraud,
            reliability,
            report,
            reliability_report,
        }
    }

    /// Registry check for the GSTIN printed on the bill, if there is one.
    fn check_gst(&self, text: &str) -> GstValidation {
        match extract_gst_from_bill(text) {
            Some(gstin) => validate_gst_online(self.registry.as_ref(), &gstin),
            None => {
                tracing::info!("No GSTIN found on bill");
                GstValidation::not_found()
            }
        }
    }
}

/// SHA-256 of the raw image bytes, base64-encoded.
pub fn receipt_fingerprint(image_bytes: &[u8]) -> String {
    let hash = Sha256::digest(image_bytes);
    base64::engine::general_purpose::STANDARD.encode(hash)
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Build an `ExpenseAnalyzer` with production implementations.
///
/// - OCR: `OllamaVisionOcr` against the configured Ollama server
/// - GST: `HttpGstRegistry` when an API key is set, `OfflineRegistry` otherwise
pub fn build_analyzer(config: &FundexConfig) -> Result<ExpenseAnalyzer, AnalyzerSetupError> {
    let ocr = OllamaVisionOcr::new(&config.ollama_url, &config.ocr_model, config.ocr_timeout_secs)?;
    tracing::info!(model = %config.ocr_model, url = %config.ollama_url, "Receipt OCR via Ollama");

    let registry: Arc<dyn GstRegistry> = match &config.gst_api_key {
        Some(key) => {
            tracing::info!(url = %config.gst_api_url, "GST registry lookups enabled");
            Arc::new(HttpGstRegistry::new(
                &config.gst_api_url,
                key,
                config.gst_timeout_secs,
            )?)
        }
        None => {
            tracing::warn!("No GST API key configured, GSTINs are checked by format only");
            Arc::new(OfflineRegistry)
        }
    };

    Ok(ExpenseAnalyzer::new(Arc::new(ocr), registry))
}
