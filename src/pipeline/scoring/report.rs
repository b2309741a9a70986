//! Plain-text reports for reviewers.

use super::types::{FraudAnalysisResult, ReliabilityResult};

const RULE: &str = "==================================================";

/// Flag code as shown to a reviewer: `NO_GST_NUMBER` → `NO GST NUMBER`.
fn display_flag(code: &str) -> String {
    code.replace('_', " ")
}

fn push_flags<'a>(out: &mut String, codes: impl ExactSizeIterator<Item = &'a str>) {
    out.push_str("Flags:\n");
    if codes.len() == 0 {
        out.push_str("  None\n");
        return;
    }
    for (i, code) in codes.enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, display_flag(code)));
    }
}

pub fn generate_fraud_report(result: &FraudAnalysisResult) -> String {
    let mut out = String::new();
    out.push_str("FRAUD ANALYSIS REPORT\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Fraud Score: {}/100\n", result.score));
    out.push_str(&format!("Risk Level: {}\n", result.risk_level));
    out.push('\n');

    push_flags(&mut out, result.flags.iter().map(|f| f.code()));

    if let Some(amount) = &result.details.amount_mismatch {
        out.push_str(&format!(
            "\nClaimed {:.2} vs detected {:.2} (difference {:.2})\n",
            amount.claimed, amount.detected, amount.difference
        ));
    }
    if let Some(overspend) = &result.details.overspend {
        out.push_str(&format!(
            "Claim exceeds remaining balance {:.2} by {:.2}\n",
            overspend.remaining_balance, overspend.overspend_amount
        ));
    }

    out.push('\n');
    out.push_str(&format!("Recommendation: {}\n", result.recommendation));
    out
}

pub fn generate_reliability_report(result: &ReliabilityResult) -> String {
    let mut out = String::new();
    out.push_str("RELIABILITY REPORT\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Reliability Score: {}/100\n", result.score));
    out.push_str(&format!("Rating: {} ({})\n", result.rating, result.color));
    out.push('\n');

    out.push_str("Breakdown:\n");
    for (name, part) in result.breakdown.parts() {
        out.push_str(&format!("  {name}: {}/{}\n", part.score, part.max));
        for note in &part.notes {
            out.push_str(&format!("    - {note}\n"));
        }
    }
    out.push('\n');

    push_flags(&mut out, result.flags.iter().map(|f| f.code()));

    out.push('\n');
    out.push_str(&format!("Recommendation: {}\n", result.recommendation));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::scoring::{calculate_fraud_score, calculate_reliability_score, ExpenseSubmission};

    #[test]
    fn fraud_report_lists_every_flag_readably() {
        let result = calculate_fraud_score(&ExpenseSubmission {
            claimed_amount: Some(900.0),
            remaining_balance: Some(500.0),
            ..Default::default()
        });
        let report = generate_fraud_report(&result);
        for flag in &result.flags {
            assert!(report.contains(&flag.code().replace('_', " ")), "{flag}");
        }
        assert!(report.contains("  1. NO AMOUNT DETECTED"));
        assert!(report.contains("  4. OVERSPENDING"));
        assert!(report.contains("Fraud Score: 75/100"));
        assert!(report.contains("Risk Level: HIGH"));
        assert!(report.contains("by 400.00"));
        assert!(report.contains(&format!("Recommendation: {}", result.recommendation)));
    }

    #[test]
    fn fraud_report_without_flags_says_none() {
        let result = FraudAnalysisResult {
            score: 0,
            risk_level: crate::pipeline::scoring::RiskLevel::Minimal,
            flags: vec![],
            details: Default::default(),
            recommendation: "APPROVE".into(),
        };
        let report = generate_fraud_report(&result);
        assert!(report.contains("Flags:\n  None\n"));
    }

    #[test]
    fn reliability_report_shows_breakdown() {
        let result = calculate_reliability_score(&ExpenseSubmission::default());
        let report = generate_reliability_report(&result);
        assert!(report.contains("Reliability Score: 37/100"));
        assert!(report.contains("Rating: POOR (red)"));
        assert!(report.contains("  Document Quality: 5/40"));
        assert!(report.contains("  Compliance: 7/20"));
        assert!(report.contains("  1. NO OCR TEXT"));
        assert!(report.contains("  2. AMOUNT NOT DETECTED"));
    }

    #[test]
    fn display_flag_replaces_every_underscore() {
        assert_eq!(display_flag("GST_NOT_API_VERIFIED"), "GST NOT API VERIFIED");
    }
}
