pub mod types;
pub mod sanitize;
pub mod ocr;
pub mod vision_ocr;
pub mod amount;
pub mod gst;

pub use types::*;
pub use sanitize::*;
pub use ocr::*;
pub use vision_ocr::*;
pub use amount::*;
pub use gst::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("OCR request failed: {0}")]
    OcrRequest(String),

    #[error("OCR service at {0} is unreachable")]
    OcrConnection(String),

    #[error("OCR service returned HTTP {status}: {body}")]
    OcrService { status: u16, body: String },

    #[error("OCR response could not be parsed: {0}")]
    ResponseParsing(String),

    #[error("Empty image payload")]
    EmptyImage,

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}
