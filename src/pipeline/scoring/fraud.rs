//! Additive fraud scoring.
//!
//! Four independent factors each add points and flags; the sum is clamped
//! to 100 and banded into a risk level.

use super::types::{
    AmountDetail, ExpenseSubmission, FraudAnalysisResult, FraudDetails, FraudFlag, GstDetail,
    OcrDetail, OverspendDetail, RiskLevel,
};
use super::weights::{fraud, MAX_SCORE};
use super::amount_difference_percent;

/// Running total for one scoring pass.
#[derive(Default)]
struct Tally {
    score: u32,
    flags: Vec<FraudFlag>,
    details: FraudDetails,
}

impl Tally {
    fn add(&mut self, points: u32, flag: FraudFlag) {
        self.score += points;
        self.flags.push(flag);
    }
}

pub fn calculate_fraud_score(submission: &ExpenseSubmission) -> FraudAnalysisResult {
    let mut tally = Tally::default();

    score_amount(submission, &mut tally);
    score_gst(submission, &mut tally);
    score_ocr(submission, &mut tally);
    score_overspend(submission, &mut tally);

    let score = tally.score.min(MAX_SCORE);
    let risk_level = RiskLevel::from_score(score);

    tracing::debug!(
        score,
        risk_level = %risk_level,
        flag_count = tally.flags.len(),
        "Fraud score calculated"
    );

    FraudAnalysisResult {
        score,
        risk_level,
        flags: tally.flags,
        details: tally.details,
        recommendation: risk_level.recommendation().to_string(),
    }
}

fn score_amount(submission: &ExpenseSubmission, tally: &mut Tally) {
    if submission.detected_amount.is_none() {
        tally.add(fraud::NO_AMOUNT_POINTS, FraudFlag::NoAmountDetected);
        return;
    }
    let Some((claimed, detected)) = submission.amounts() else {
        return;
    };

    let percent_diff = amount_difference_percent(claimed, detected);
    tally.details.amount_mismatch = Some(AmountDetail {
        claimed,
        detected,
        difference: (detected - claimed).abs(),
        percent_diff,
    });

    if percent_diff > fraud::SEVERE_MISMATCH_PCT {
        tally.add(fraud::SEVERE_MISMATCH_POINTS, FraudFlag::SevereAmountMismatch);
    } else if percent_diff > fraud::MODERATE_MISMATCH_PCT {
        tally.add(fraud::MODERATE_MISMATCH_POINTS, FraudFlag::ModerateAmountMismatch);
    } else if percent_diff > fraud::MINOR_MISMATCH_PCT {
        tally.add(fraud::MINOR_MISMATCH_POINTS, FraudFlag::MinorAmountMismatch);
    }
}

fn score_gst(submission: &ExpenseSubmission, tally: &mut Tally) {
    let Some(validation) = &submission.gst_validation else {
        tally.add(fraud::GST_NOT_CHECKED_POINTS, FraudFlag::GstNotChecked);
        return;
    };

    tally.details.gst = Some(GstDetail {
        gst_number: validation.gst_number.clone(),
        valid: validation.valid,
        api_verified: validation.api_verified,
        business_name: validation.business_name.clone(),
    });

    if !validation.found() {
        tally.add(fraud::NO_GST_POINTS, FraudFlag::NoGstNumber);
    } else if !validation.valid {
        tally.add(fraud::INVALID_GST_POINTS, FraudFlag::InvalidGst);
    } else if !validation.api_verified {
        tally.add(fraud::GST_NOT_VERIFIED_POINTS, FraudFlag::GstNotApiVerified);
    }
}

fn score_ocr(submission: &ExpenseSubmission, tally: &mut Tally) {
    let Some(text_length) = submission.ocr_text_len() else {
        tally.add(fraud::OCR_FAILED_POINTS, FraudFlag::OcrFailed);
        return;
    };

    tally.details.ocr = Some(OcrDetail { text_length });

    if text_length < fraud::LOW_OCR_LENGTH {
        tally.add(fraud::LOW_OCR_POINTS, FraudFlag::LowOcrQuality);
    } else if text_length < fraud::MODERATE_OCR_LENGTH {
        tally.add(fraud::MODERATE_OCR_POINTS, FraudFlag::ModerateOcrQuality);
    }
}

fn score_overspend(submission: &ExpenseSubmission, tally: &mut Tally) {
    let Some((claimed, remaining_balance)) = submission.overspend() else {
        return;
    };

    tally.details.overspend = Some(OverspendDetail {
        claimed,
        remaining_balance,
        overspend_amount: claimed - remaining_balance,
    });
    tally.add(fraud::OVERSPEND_POINTS, FraudFlag::Overspending);
}
