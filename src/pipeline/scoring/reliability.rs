//! Positive trust score, built from four capped sub-scores.
//!
//! Deliberately not `100 - fraud score`: a missing detected amount lowers
//! both document quality and amount accuracy here.

use super::amount_difference_percent;
use super::types::{
    ExpenseSubmission, ReliabilityBreakdown, ReliabilityFlag, ReliabilityRating,
    ReliabilityResult, SubScore,
};
use super::weights::{reliability as w, MAX_SCORE};

pub fn calculate_reliability_score(submission: &ExpenseSubmission) -> ReliabilityResult {
    let mut flags = Vec::new();

    let breakdown = ReliabilityBreakdown {
        document_quality: document_quality(submission, &mut flags),
        amount_accuracy: amount_accuracy(submission, &mut flags),
        compliance: compliance(submission, &mut flags),
        spending_pattern: spending_pattern(submission, &mut flags),
    };

    let score = breakdown.total().min(MAX_SCORE);
    let rating = ReliabilityRating::from_score(score);

    tracing::debug!(
        score,
        rating = %rating,
        flag_count = flags.len(),
        "Reliability score calculated"
    );

    ReliabilityResult {
        score,
        rating,
        color: rating.color().to_string(),
        breakdown,
        flags,
        recommendation: rating.recommendation().to_string(),
    }
}

fn document_quality(submission: &ExpenseSubmission, flags: &mut Vec<ReliabilityFlag>) -> SubScore {
    let mut notes = Vec::new();

    let text_points = match submission.ocr_text_len() {
        None => {
            flags.push(ReliabilityFlag::NoOcrText);
            notes.push("No text could be read from the receipt".to_string());
            0
        }
        Some(len) => {
            notes.push(format!("{len} characters of receipt text"));
            if len >= w::TEXT_RICH_LENGTH {
                w::TEXT_RICH_POINTS
            } else if len >= w::TEXT_GOOD_LENGTH {
                w::TEXT_GOOD_POINTS
            } else if len >= w::TEXT_FAIR_LENGTH {
                w::TEXT_FAIR_POINTS
            } else {
                w::TEXT_SPARSE_POINTS
            }
        }
    };

    let amount_points = if submission.detected_amount.is_some() {
        notes.push("Bill amount detected".to_string());
        w::AMOUNT_DETECTED_POINTS
    } else {
        flags.push(ReliabilityFlag::AmountNotDetected);
        notes.push("Bill amount not detected".to_string());
        w::AMOUNT_MISSING_POINTS
    };

    SubScore::new(text_points + amount_points, w::DOCUMENT_QUALITY_MAX, notes)
}

fn amount_accuracy(submission: &ExpenseSubmission, flags: &mut Vec<ReliabilityFlag>) -> SubScore {
    let Some((claimed, detected)) = submission.amounts() else {
        return SubScore::new(
            w::UNCOMPARED_POINTS,
            w::AMOUNT_ACCURACY_MAX,
            vec!["Amounts could not be compared".to_string()],
        );
    };

    let percent_diff = amount_difference_percent(claimed, detected);
    let points = if percent_diff <= w::EXACT_DIFF_PCT {
        w::EXACT_POINTS
    } else if percent_diff <= w::CLOSE_DIFF_PCT {
        w::CLOSE_POINTS
    } else if percent_diff <= w::NEAR_DIFF_PCT {
        w::NEAR_POINTS
    } else if percent_diff <= w::LOOSE_DIFF_PCT {
        w::LOOSE_POINTS
    } else {
        0
    };

    if percent_diff > w::LOOSE_DIFF_PCT {
        flags.push(ReliabilityFlag::MajorAmountDiscrepancy);
    } else if percent_diff > w::NEAR_DIFF_PCT {
        flags.push(ReliabilityFlag::AmountDiscrepancy);
    }

    let note = if percent_diff.is_finite() {
        format!("Claimed and detected amounts differ by {percent_diff:.1}%")
    } else {
        "Claimed amount is not positive".to_string()
    };
    SubScore::new(points, w::AMOUNT_ACCURACY_MAX, vec![note])
}

fn compliance(submission: &ExpenseSubmission, flags: &mut Vec<ReliabilityFlag>) -> SubScore {
    let mut notes = Vec::new();

    let gst_points = match &submission.gst_validation {
        None => {
            notes.push("GSTIN not checked".to_string());
            w::GST_UNCHECKED_POINTS
        }
        Some(v) if !v.found() => {
            flags.push(ReliabilityFlag::NoGstNumber);
            notes.push("No GSTIN on the bill".to_string());
            w::GST_MISSING_POINTS
        }
        Some(v) if !v.api_verified => {
            notes.push("GSTIN found, not verified with the registry".to_string());
            w::GST_UNVERIFIED_POINTS
        }
        Some(v) if v.valid => {
            notes.push("GSTIN verified with the registry".to_string());
            w::GST_VERIFIED_POINTS
        }
        Some(_) => {
            flags.push(ReliabilityFlag::InvalidGst);
            notes.push("GSTIN rejected by the registry".to_string());
            w::GST_REJECTED_POINTS
        }
    };

    let detail_points = match submission.ocr_text_len() {
        Some(len) if len > w::DETAILED_TEXT_LENGTH => w::DETAILED_TEXT_POINTS,
        _ => w::BRIEF_TEXT_POINTS,
    };

    SubScore::new(gst_points + detail_points, w::COMPLIANCE_MAX, notes)
}

fn spending_pattern(submission: &ExpenseSubmission, flags: &mut Vec<ReliabilityFlag>) -> SubScore {
    if submission.claimed_amount.is_none() || submission.remaining_balance.is_none() {
        return SubScore::new(
            w::WITHIN_BUDGET_POINTS,
            w::SPENDING_PATTERN_MAX,
            vec!["Budget information unavailable".to_string()],
        );
    }
    let Some((claimed, remaining)) = submission.overspend() else {
        return SubScore::new(
            w::WITHIN_BUDGET_POINTS,
            w::SPENDING_PATTERN_MAX,
            vec!["Within remaining budget".to_string()],
        );
    };

    let overspend_pct = amount_difference_percent(remaining, claimed);
    let (points, flag) = if overspend_pct <= w::MINOR_OVERSPEND_PCT {
        (w::MINOR_OVERSPEND_POINTS, ReliabilityFlag::MinorOverspend)
    } else if overspend_pct <= w::MODERATE_OVERSPEND_PCT {
        (w::MODERATE_OVERSPEND_POINTS, ReliabilityFlag::ModerateOverspend)
    } else {
        (0, ReliabilityFlag::SignificantOverspend)
    };
    flags.push(flag);

    SubScore::new(
        points,
        w::SPENDING_PATTERN_MAX,
        vec![format!("Claim exceeds remaining budget by {:.2}", claimed - remaining)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::gst_registry::{validate_gst_online, GstValidation, MockGstRegistry, OfflineRegistry};

    fn verified_submission() -> ExpenseSubmission {
        ExpenseSubmission {
            claimed_amount: Some(1000.0),
            detected_amount: Some(1000.0),
            ocr_extracted_text: Some("x".repeat(250)),
            gst_validation: Some(validate_gst_online(
                &MockGstRegistry::with_record(Default::default()),
                "29AAGCB7383J1Z4",
            )),
            remaining_balance: Some(5000.0),
        }
    }

    #[test]
    fn all_absent_golden() {
        let result = calculate_reliability_score(&ExpenseSubmission::default());
        assert_eq!(result.breakdown.document_quality.score, 5);
        assert_eq!(result.breakdown.amount_accuracy.score, 15);
        assert_eq!(result.breakdown.compliance.score, 7);
        assert_eq!(result.breakdown.spending_pattern.score, 10);
        assert_eq!(result.score, 37);
        assert_eq!(result.rating, ReliabilityRating::Poor);
        assert_eq!(result.color, "red");
        assert_eq!(
            result.flags,
            vec![ReliabilityFlag::NoOcrText, ReliabilityFlag::AmountNotDetected]
        );
    }

    #[test]
    fn perfect_submission_scores_100() {
        let result = calculate_reliability_score(&verified_submission());
        assert_eq!(result.score, 100);
        assert_eq!(result.rating, ReliabilityRating::Excellent);
        assert_eq!(result.color, "green");
        assert!(result.flags.is_empty());
    }

    #[test]
    fn text_length_bands() {
        let doc_score = |len: usize| {
            calculate_reliability_score(&ExpenseSubmission {
                ocr_extracted_text: Some("x".repeat(len)),
                ..verified_submission()
            })
            .breakdown
            .document_quality
            .score
        };
        assert_eq!(doc_score(200), 40);
        assert_eq!(doc_score(199), 35);
        assert_eq!(doc_score(100), 35);
        assert_eq!(doc_score(99), 30);
        assert_eq!(doc_score(50), 30);
        assert_eq!(doc_score(49), 25);
    }

    #[test]
    fn accuracy_bands() {
        let accuracy = |detected: f64| {
            let r = calculate_reliability_score(&ExpenseSubmission {
                claimed_amount: Some(100.0),
                detected_amount: Some(detected),
                ..verified_submission()
            });
            (r.breakdown.amount_accuracy.score, r.flags)
        };
        assert_eq!(accuracy(102.0), (30, vec![]));
        assert_eq!(accuracy(105.0), (25, vec![]));
        assert_eq!(accuracy(110.0), (20, vec![]));
        assert_eq!(accuracy(115.0), (10, vec![ReliabilityFlag::AmountDiscrepancy]));
        assert_eq!(accuracy(120.0), (10, vec![ReliabilityFlag::AmountDiscrepancy]));
        assert_eq!(accuracy(140.0), (0, vec![ReliabilityFlag::MajorAmountDiscrepancy]));
    }

    #[test]
    fn missing_detection_is_penalized_twice() {
        let result = calculate_reliability_score(&ExpenseSubmission {
            detected_amount: None,
            ..verified_submission()
        });
        assert_eq!(result.breakdown.document_quality.score, 25);
        assert_eq!(result.breakdown.amount_accuracy.score, 15);
        assert_eq!(result.flags, vec![ReliabilityFlag::AmountNotDetected]);
    }

    #[test]
    fn compliance_outcomes() {
        let compliance = |validation: Option<GstValidation>| {
            let r = calculate_reliability_score(&ExpenseSubmission {
                gst_validation: validation,
                ..verified_submission()
            });
            (r.breakdown.compliance.score, r.flags)
        };
        assert_eq!(
            compliance(Some(validate_gst_online(&OfflineRegistry, "29ABCDE1234F1Z5"))),
            (17, vec![])
        );
        assert_eq!(
            compliance(Some(GstValidation::not_found())),
            (10, vec![ReliabilityFlag::NoGstNumber])
        );
        assert_eq!(
            compliance(Some(validate_gst_online(&MockGstRegistry::unknown(), "29ABCDE1234F1Z5"))),
            (10, vec![ReliabilityFlag::InvalidGst])
        );
        assert_eq!(compliance(None), (10, vec![]));
    }

    #[test]
    fn malformed_gstin_counts_as_found_not_verified() {
        let result = calculate_reliability_score(&ExpenseSubmission {
            gst_validation: Some(validate_gst_online(&OfflineRegistry, "29ABCDE1234F1X5")),
            ..verified_submission()
        });
        assert_eq!(result.breakdown.compliance.score, 17);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn inactive_registration_gets_lowest_tier() {
        let record = crate::pipeline::gst_registry::RegistryRecord {
            status: Some("Cancelled".into()),
            ..Default::default()
        };
        let result = calculate_reliability_score(&ExpenseSubmission {
            gst_validation: Some(validate_gst_online(
                &MockGstRegistry::with_record(record),
                "29AAGCB7383J1Z4",
            )),
            ..verified_submission()
        });
        assert_eq!(result.breakdown.compliance.score, 10);
        assert_eq!(result.flags, vec![ReliabilityFlag::InvalidGst]);
    }

    #[test]
    fn brief_text_earns_less_compliance() {
        let result = calculate_reliability_score(&ExpenseSubmission {
            ocr_extracted_text: Some("x".repeat(100)),
            ..verified_submission()
        });
        assert_eq!(result.breakdown.compliance.score, 17);
    }

    #[test]
    fn overspend_bands() {
        let spending = |claimed: f64| {
            let r = calculate_reliability_score(&ExpenseSubmission {
                claimed_amount: Some(claimed),
                detected_amount: Some(claimed),
                remaining_balance: Some(100.0),
                ..verified_submission()
            });
            (r.breakdown.spending_pattern.score, r.flags)
        };
        assert_eq!(spending(100.0), (10, vec![]));
        assert_eq!(spending(105.0), (7, vec![ReliabilityFlag::MinorOverspend]));
        assert_eq!(spending(110.0), (5, vec![ReliabilityFlag::ModerateOverspend]));
        assert_eq!(spending(111.0), (0, vec![ReliabilityFlag::SignificantOverspend]));
    }

    #[test]
    fn exhausted_budget_is_significant_overspend() {
        let result = calculate_reliability_score(&ExpenseSubmission {
            remaining_balance: Some(0.0),
            ..verified_submission()
        });
        assert_eq!(result.breakdown.spending_pattern.score, 0);
        assert_eq!(result.flags, vec![ReliabilityFlag::SignificantOverspend]);
    }

    #[test]
    fn missing_budget_gets_full_credit_with_note() {
        let result = calculate_reliability_score(&ExpenseSubmission {
            remaining_balance: None,
            ..verified_submission()
        });
        let spending = &result.breakdown.spending_pattern;
        assert_eq!(spending.score, 10);
        assert_eq!(spending.notes, vec!["Budget information unavailable"]);
    }

    #[test]
    fn score_stays_in_range() {
        let worst = ExpenseSubmission {
            claimed_amount: Some(-50.0),
            detected_amount: Some(1e9),
            ocr_extracted_text: Some(" ".into()),
            gst_validation: Some(validate_gst_online(&MockGstRegistry::unknown(), "29ABCDE1234F1Z5")),
            remaining_balance: Some(-100.0),
        };
        let result = calculate_reliability_score(&worst);
        assert!(result.score <= 100);
        for (_, part) in result.breakdown.parts() {
            assert!(part.score <= part.max);
        }
    }

    #[test]
    fn scoring_is_idempotent() {
        let submission = ExpenseSubmission {
            detected_amount: Some(1180.0),
            ..verified_submission()
        };
        assert_eq!(
            calculate_reliability_score(&submission),
            calculate_reliability_score(&submission)
        );
    }

    #[test]
    fn serializes_rating_and_breakdown() {
        let json = serde_json::to_value(calculate_reliability_score(&ExpenseSubmission::default())).unwrap();
        assert_eq!(json["rating"], "POOR");
        assert_eq!(json["breakdown"]["documentQuality"]["max"], 40);
        assert_eq!(json["breakdown"]["spendingPattern"]["score"], 10);
    }
}
