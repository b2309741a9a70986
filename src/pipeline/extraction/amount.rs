//! Bill total detection from OCR text.
//!
//! Three strategies run in order and the first one that finds a number wins:
//!
//! 1. **keyword** (`High`): a line naming the total ("grand total", "amount
//!    payable", ...) plus the two lines after it
//! 2. **largest** (`Medium`): the largest plausible number anywhere in the text
//! 3. **tail** (`Low`): the first plausible number in the last five lines
//!
//! Every strategy tries the same four patterns in the same order:
//! currency-prefixed, comma-grouped, two-decimal, plain integer.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{AmountCandidate, AmountConfidence};

/// Keywords marking the line that carries the bill total (matched lowercase).
const TOTAL_KEYWORDS: &[&str] = &[
    "grand total",
    "total amount",
    "amount payable",
    "net amount",
    "net payable",
    "total payable",
    "amount due",
    "balance due",
    "bill amount",
    "invoice total",
    "total due",
];

/// Lines after a keyword line that may hold the figure.
const KEYWORD_LOOKAHEAD: usize = 2;
const TAIL_LINES: usize = 5;

/// Upper bound for any believable bill total.
const MAX_AMOUNT: f64 = 10_000_000.0;
/// Floor for keyword-anchored figures (exclusive).
const KEYWORD_MIN_AMOUNT: f64 = 0.0;
/// Floor for unanchored figures (exclusive); filters out quantities and line numbers.
const UNANCHORED_MIN_AMOUNT: f64 = 10.0;

static AMOUNT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // ₹ 1,234.56 / Rs. 1234 / INR 1,23,456.00
        r"(?i)(?:₹|\brs\.?|\binr)\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)",
        // 1,234.56 / 1,23,456
        r"\b([0-9]{1,3}(?:,[0-9]{2,3})+(?:\.[0-9]{1,2})?)\b",
        // 1234.56
        r"\b([0-9]+\.[0-9]{2})\b",
        // 1234
        r"\b([0-9]+)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid amount regex pattern"))
    .collect()
});

type Strategy = fn(&[&str]) -> Option<AmountCandidate>;

/// Strategies in priority order.
const STRATEGIES: &[Strategy] = &[keyword_strategy, largest_strategy, tail_strategy];

/// Best-guess bill total, or `None` when no strategy finds one.
pub fn extract_amount_from_bill(text: &str) -> Option<f64> {
    detect_amount(text).map(|c| c.value)
}

/// Like [`extract_amount_from_bill`], keeping the confidence tier and source line.
pub fn detect_amount(text: &str) -> Option<AmountCandidate> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return None;
    }

    let candidate = STRATEGIES.iter().find_map(|strategy| strategy(&lines));
    match &candidate {
        Some(c) => tracing::debug!(
            value = c.value,
            confidence = ?c.confidence,
            "Bill amount detected"
        ),
        None => tracing::debug!(line_count = lines.len(), "No bill amount detected"),
    }
    candidate
}

fn keyword_strategy(lines: &[&str]) -> Option<AmountCandidate> {
    for (idx, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if !TOTAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
            continue;
        }

        let end = (idx + KEYWORD_LOOKAHEAD + 1).min(lines.len());
        for candidate_line in &lines[idx..end] {
            if let Some(value) = first_in_range(candidate_line, KEYWORD_MIN_AMOUNT) {
                return Some(AmountCandidate {
                    value,
                    confidence: AmountConfidence::High,
                    line: candidate_line.to_string(),
                });
            }
        }
    }
    None
}

fn largest_strategy(lines: &[&str]) -> Option<AmountCandidate> {
    let mut best: Option<(f64, &str)> = None;
    for line in lines {
        for pattern in AMOUNT_PATTERNS.iter() {
            for value in captured_numbers(pattern, line) {
                if !in_range(value, UNANCHORED_MIN_AMOUNT) {
                    continue;
                }
                if best.map_or(true, |(b, _)| value > b) {
                    best = Some((value, *line));
                }
            }
        }
    }

    best.map(|(value, line)| AmountCandidate {
        value,
        confidence: AmountConfidence::Medium,
        line: line.to_string(),
    })
}

fn tail_strategy(lines: &[&str]) -> Option<AmountCandidate> {
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].iter().find_map(|line| {
        first_in_range(line, UNANCHORED_MIN_AMOUNT).map(|value| AmountCandidate {
            value,
            confidence: AmountConfidence::Low,
            line: line.to_string(),
        })
    })
}

/// First number on the line inside `(min, MAX_AMOUNT)`, trying patterns in order.
fn first_in_range(line: &str, min: f64) -> Option<f64> {
    AMOUNT_PATTERNS.iter().find_map(|pattern| {
        captured_numbers(pattern, line).find(|v| in_range(*v, min))
    })
}

fn captured_numbers<'a>(pattern: &'a Regex, line: &'a str) -> impl Iterator<Item = f64> + 'a {
    pattern
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| parse_amount(m.as_str()))
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim_end_matches('.');
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn in_range(value: f64, min: f64) -> bool {
    value > min && value < MAX_AMOUNT
}
