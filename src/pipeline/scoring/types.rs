use serde::{Deserialize, Serialize};

use crate::pipeline::gst_registry::GstValidation;

use super::weights::{rating, risk};

/// Generates a code enum that serializes as its code string, with `code()`.
macro_rules! code_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn code(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

code_enum!(
    /// Reason a fraud score was raised.
    FraudFlag {
        SevereAmountMismatch => "SEVERE_AMOUNT_MISMATCH",
        ModerateAmountMismatch => "MODERATE_AMOUNT_MISMATCH",
        MinorAmountMismatch => "MINOR_AMOUNT_MISMATCH",
        NoAmountDetected => "NO_AMOUNT_DETECTED",
        NoGstNumber => "NO_GST_NUMBER",
        InvalidGst => "INVALID_GST",
        GstNotApiVerified => "GST_NOT_API_VERIFIED",
        GstNotChecked => "GST_NOT_CHECKED",
        LowOcrQuality => "LOW_OCR_QUALITY",
        ModerateOcrQuality => "MODERATE_OCR_QUALITY",
        OcrFailed => "OCR_FAILED",
        Overspending => "OVERSPENDING",
    }
);

code_enum!(
    /// Reason a reliability score was lowered.
    ReliabilityFlag {
        NoOcrText => "NO_OCR_TEXT",
        AmountNotDetected => "AMOUNT_NOT_DETECTED",
        AmountDiscrepancy => "AMOUNT_DISCREPANCY",
        MajorAmountDiscrepancy => "MAJOR_AMOUNT_DISCREPANCY",
        InvalidGst => "INVALID_GST",
        NoGstNumber => "NO_GST_NUMBER",
        MinorOverspend => "MINOR_OVERSPEND",
        ModerateOverspend => "MODERATE_OVERSPEND",
        SignificantOverspend => "SIGNIFICANT_OVERSPEND",
    }
);

code_enum!(
    RiskLevel {
        Minimal => "MINIMAL",
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Critical => "CRITICAL",
    }
);

code_enum!(
    ReliabilityRating {
        Excellent => "EXCELLENT",
        Good => "GOOD",
        Fair => "FAIR",
        NeedsReview => "NEEDS REVIEW",
        Poor => "POOR",
    }
);

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= risk::CRITICAL => Self::Critical,
            s if s >= risk::HIGH => Self::High,
            s if s >= risk::MEDIUM => Self::Medium,
            s if s >= risk::LOW => Self::Low,
            _ => Self::Minimal,
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Critical => "REJECT - Critical fraud indicators. Do not approve without investigation.",
            Self::High => "FLAG - High fraud risk. Escalate for admin verification.",
            Self::Medium => "REVIEW - Moderate risk. Verify the receipt and amounts manually.",
            Self::Low => "CAUTION - Minor irregularities. Approve after a quick check.",
            Self::Minimal => "APPROVE - No significant fraud indicators.",
        }
    }
}

impl ReliabilityRating {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= rating::EXCELLENT => Self::Excellent,
            s if s >= rating::GOOD => Self::Good,
            s if s >= rating::FAIR => Self::Fair,
            s if s >= rating::NEEDS_REVIEW => Self::NeedsReview,
            _ => Self::Poor,
        }
    }

    /// Badge color shown next to the rating.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Excellent => "green",
            Self::Good => "blue",
            Self::Fair => "yellow",
            Self::NeedsReview => "orange",
            Self::Poor => "red",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Excellent => "Highly reliable submission. Safe to approve.",
            Self::Good => "Reliable submission. Approve after a routine check.",
            Self::Fair => "Moderately reliable. Verify the flagged items before approving.",
            Self::NeedsReview => "Low reliability. Manual review of the receipt is required.",
            Self::Poor => "Unreliable submission. Request a clearer receipt or supporting documents.",
        }
    }
}

/// Everything known about one expense claim at scoring time.
///
/// Every field is optional; absence is itself a scored condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSubmission {
    #[serde(default)]
    pub claimed_amount: Option<f64>,
    #[serde(default)]
    pub detected_amount: Option<f64>,
    #[serde(default)]
    pub ocr_extracted_text: Option<String>,
    /// `None` means the GSTIN was never checked.
    #[serde(default)]
    pub gst_validation: Option<GstValidation>,
    #[serde(default)]
    pub remaining_balance: Option<f64>,
}

impl ExpenseSubmission {
    /// OCR text, trimmed; `None` when missing or blank.
    pub fn ocr_text(&self) -> Option<&str> {
        self.ocr_extracted_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Character count of the trimmed OCR text.
    pub fn ocr_text_len(&self) -> Option<usize> {
        self.ocr_text().map(|t| t.chars().count())
    }

    /// Both amounts, when both are known.
    pub(crate) fn amounts(&self) -> Option<(f64, f64)> {
        self.claimed_amount.zip(self.detected_amount)
    }

    /// `(claimed, remaining)` when the claim exceeds the remaining balance.
    pub(crate) fn overspend(&self) -> Option<(f64, f64)> {
        self.claimed_amount
            .zip(self.remaining_balance)
            .filter(|(claimed, remaining)| claimed > remaining)
    }
}

/// Claimed vs detected amount comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountDetail {
    pub claimed: f64,
    pub detected: f64,
    pub difference: f64,
    /// Serialized as `null` when the claimed amount is not positive.
    pub percent_diff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstDetail {
    pub gst_number: Option<String>,
    pub valid: bool,
    pub api_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrDetail {
    pub text_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverspendDetail {
    pub claimed: f64,
    pub remaining_balance: f64,
    pub overspend_amount: f64,
}

/// Per-factor evidence behind a fraud score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_mismatch: Option<AmountDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst: Option<GstDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overspend: Option<OverspendDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudAnalysisResult {
    pub score: u32,
    pub risk_level: RiskLevel,
    /// In the order the factors raised them.
    pub flags: Vec<FraudFlag>,
    pub details: FraudDetails,
    pub recommendation: String,
}

/// One capped component of the reliability score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScore {
    pub score: u32,
    pub max: u32,
    pub notes: Vec<String>,
}

impl SubScore {
    pub(crate) fn new(score: u32, max: u32, notes: Vec<String>) -> Self {
        Self {
            score: score.min(max),
            max,
            notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityBreakdown {
    pub document_quality: SubScore,
    pub amount_accuracy: SubScore,
    pub compliance: SubScore,
    pub spending_pattern: SubScore,
}

impl ReliabilityBreakdown {
    pub fn total(&self) -> u32 {
        self.document_quality.score
            + self.amount_accuracy.score
            + self.compliance.score
            + self.spending_pattern.score
    }

    /// Sub-scores with their display names, in report order.
    pub fn parts(&self) -> [(&'static str, &SubScore); 4] {
        [
            ("Document Quality", &self.document_quality),
            ("Amount Accuracy", &self.amount_accuracy),
            ("Compliance", &self.compliance),
            ("Spending Pattern", &self.spending_pattern),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityResult {
    pub score: u32,
    pub rating: ReliabilityRating,
    pub color: String,
    pub breakdown: ReliabilityBreakdown,
    pub flags: Vec<ReliabilityFlag>,
    pub recommendation: String,
}
