use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine: Send + Sync {
    /// Transcribe the text printed on a receipt image.
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;

    /// Short label for logs.
    fn engine_name(&self) -> &str;
}

/// How much the amount extractor trusts its pick, by the strategy that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountConfidence {
    Low,
    Medium,
    High,
}

/// Amount picked from receipt text, with the line it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountCandidate {
    pub value: f64,
    pub confidence: AmountConfidence,
    pub line: String,
}
