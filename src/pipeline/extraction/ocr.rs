use super::sanitize::sanitize_extracted_text;
use super::types::OcrEngine;
use super::ExtractionError;

/// Run OCR on a receipt image and return its sanitized text.
///
/// Never fails: an engine error, an empty image, or a blank transcription all
/// become `None`, which the scorers treat as an OCR failure.
pub fn extract_text_from_image(engine: &dyn OcrEngine, image_bytes: &[u8]) -> Option<String> {
    let _span = tracing::info_span!(
        "ocr_extract",
        engine = %engine.engine_name(),
        image_size = image_bytes.len(),
    )
    .entered();

    if image_bytes.is_empty() {
        tracing::warn!("Receipt image is empty, skipping OCR");
        return None;
    }

    let start = std::time::Instant::now();
    match engine.ocr_image(image_bytes) {
        Ok(raw) => {
            let text = sanitize_extracted_text(&raw);
            tracing::info!(
                elapsed_ms = %start.elapsed().as_millis(),
                text_len = text.chars().count(),
                "OCR extraction complete"
            );
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "OCR extraction failed");
            None
        }
    }
}

/// Mock OCR engine for unit testing without a vision model.
pub struct MockOcrEngine {
    response: Result<String, String>,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
        }
    }

    /// An engine whose every call fails with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        if image_bytes.is_empty() {
            return Err(ExtractionError::EmptyImage);
        }
        self.response
            .clone()
            .map_err(ExtractionError::OcrRequest)
    }

    fn engine_name(&self) -> &str {
        "mock"
    }
}
