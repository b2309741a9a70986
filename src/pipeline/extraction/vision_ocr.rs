//! Vision OCR engine: transcribes receipt images through an Ollama vision model.
//!
//! The image is sent base64-encoded to `/api/chat`. The model is asked for a
//! plain line-by-line transcription so the amount and GSTIN patterns see the
//! bill the way it is printed.

use std::time::Duration;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::types::OcrEngine;
use super::ExtractionError;

/// Sentinel the model is told to emit when the image carries no text.
const NO_TEXT_MARKER: &str = "[NO_TEXT]";

const TRANSCRIBE_PROMPT: &str = "\
Transcribe every piece of text visible on this bill or receipt, line by line, exactly as printed. \
Keep numbers, currency symbols, commas and decimal points unchanged. \
Include the GSTIN, invoice number, item lines and totals. \
Do not summarise, translate or add commentary. \
If the image contains no readable text, reply with exactly [NO_TEXT].";

/// Production OCR engine backed by an Ollama vision model.
pub struct OllamaVisionOcr {
    base_url: String,
    model_name: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaVisionOcr {
    pub fn new(base_url: &str, model_name: &str, timeout_secs: u64) -> Result<Self, ExtractionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ExtractionError::ClientSetup(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
            client,
            timeout_secs,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    images: Vec<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OcrEngine for OllamaVisionOcr {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        if image_bytes.is_empty() {
            return Err(ExtractionError::EmptyImage);
        }

        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: &self.model_name,
            messages: vec![ChatMessage {
                role: "user",
                content: TRANSCRIBE_PROMPT,
                images: vec![base64::engine::general_purpose::STANDARD.encode(image_bytes)],
            }],
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                ExtractionError::OcrConnection(self.base_url.clone())
            } else if e.is_timeout() {
                ExtractionError::OcrRequest(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                ExtractionError::OcrRequest(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::OcrService {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ExtractionError::ResponseParsing(e.to_string()))?;

        Ok(strip_model_wrapping(&parsed.message.content))
    }

    fn engine_name(&self) -> &str {
        &self.model_name
    }
}

/// Remove the no-text sentinel and any Markdown code fence the model wraps
/// its transcription in.
fn strip_model_wrapping(response: &str) -> String {
    let trimmed = response.trim();
    if trimmed == NO_TEXT_MARKER {
        return String::new();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines.first().is_some_and(|l| l.trim_start().starts_with("```")) {
        lines.remove(0);
        if lines.last().is_some_and(|l| l.trim() == "```") {
            lines.pop();
        }
    }
    lines.join("\n")
}
