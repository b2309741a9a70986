//! Point weights and band thresholds for both scorers.
//!
//! Values are kept exactly as the platform has always used them.

/// Upper bound for both scores.
pub const MAX_SCORE: u32 = 100;

/// Fraud score contributions. Higher means more suspicious.
pub mod fraud {
    /// Claimed vs detected difference, in percent of the claimed amount.
    pub const SEVERE_MISMATCH_PCT: f64 = 50.0;
    pub const MODERATE_MISMATCH_PCT: f64 = 20.0;
    pub const MINOR_MISMATCH_PCT: f64 = 5.0;

    pub const SEVERE_MISMATCH_POINTS: u32 = 35;
    pub const MODERATE_MISMATCH_POINTS: u32 = 25;
    pub const MINOR_MISMATCH_POINTS: u32 = 15;
    pub const NO_AMOUNT_POINTS: u32 = 20;

    pub const NO_GST_POINTS: u32 = 25;
    pub const INVALID_GST_POINTS: u32 = 30;
    pub const GST_NOT_VERIFIED_POINTS: u32 = 10;
    pub const GST_NOT_CHECKED_POINTS: u32 = 20;

    /// OCR text length (characters) below which quality is poor / middling.
    pub const LOW_OCR_LENGTH: usize = 50;
    pub const MODERATE_OCR_LENGTH: usize = 100;

    pub const LOW_OCR_POINTS: u32 = 15;
    pub const MODERATE_OCR_POINTS: u32 = 10;
    pub const OCR_FAILED_POINTS: u32 = 15;

    pub const OVERSPEND_POINTS: u32 = 20;
}

/// Fraud score → risk level cut-offs (inclusive lower bounds).
pub mod risk {
    pub const CRITICAL: u32 = 80;
    pub const HIGH: u32 = 60;
    pub const MEDIUM: u32 = 40;
    pub const LOW: u32 = 20;
}

/// Reliability score contributions. Higher means more trustworthy.
pub mod reliability {
    pub const DOCUMENT_QUALITY_MAX: u32 = 40;
    pub const AMOUNT_ACCURACY_MAX: u32 = 30;
    pub const COMPLIANCE_MAX: u32 = 20;
    pub const SPENDING_PATTERN_MAX: u32 = 10;

    // Document quality: OCR text length bands.
    pub const TEXT_RICH_LENGTH: usize = 200;
    pub const TEXT_GOOD_LENGTH: usize = 100;
    pub const TEXT_FAIR_LENGTH: usize = 50;
    pub const TEXT_RICH_POINTS: u32 = 20;
    pub const TEXT_GOOD_POINTS: u32 = 15;
    pub const TEXT_FAIR_POINTS: u32 = 10;
    pub const TEXT_SPARSE_POINTS: u32 = 5;
    pub const AMOUNT_DETECTED_POINTS: u32 = 20;
    pub const AMOUNT_MISSING_POINTS: u32 = 5;

    // Amount accuracy: difference bands (percent, inclusive upper bounds).
    pub const EXACT_DIFF_PCT: f64 = 2.0;
    pub const CLOSE_DIFF_PCT: f64 = 5.0;
    pub const NEAR_DIFF_PCT: f64 = 10.0;
    pub const LOOSE_DIFF_PCT: f64 = 20.0;
    pub const EXACT_POINTS: u32 = 30;
    pub const CLOSE_POINTS: u32 = 25;
    pub const NEAR_POINTS: u32 = 20;
    pub const LOOSE_POINTS: u32 = 10;
    /// Half credit when there is nothing to compare.
    pub const UNCOMPARED_POINTS: u32 = 15;

    // Compliance.
    pub const GST_VERIFIED_POINTS: u32 = 15;
    pub const GST_UNVERIFIED_POINTS: u32 = 12;
    pub const GST_MISSING_POINTS: u32 = 5;
    /// Found, but the registry says it is not an active registration.
    pub const GST_REJECTED_POINTS: u32 = 5;
    pub const GST_UNCHECKED_POINTS: u32 = 5;
    pub const DETAILED_TEXT_LENGTH: usize = 100;
    pub const DETAILED_TEXT_POINTS: u32 = 5;
    pub const BRIEF_TEXT_POINTS: u32 = 2;

    // Spending pattern: overspend bands (percent of remaining balance).
    pub const MINOR_OVERSPEND_PCT: f64 = 5.0;
    pub const MODERATE_OVERSPEND_PCT: f64 = 10.0;
    pub const WITHIN_BUDGET_POINTS: u32 = 10;
    pub const MINOR_OVERSPEND_POINTS: u32 = 7;
    pub const MODERATE_OVERSPEND_POINTS: u32 = 5;
}

/// Reliability score → rating cut-offs (inclusive lower bounds).
pub mod rating {
    pub const EXCELLENT: u32 = 90;
    pub const GOOD: u32 = 75;
    pub const FAIR: u32 = 60;
    pub const NEEDS_REVIEW: u32 = 40;
}
