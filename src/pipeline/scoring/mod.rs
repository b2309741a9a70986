//! Fraud and reliability scoring.
//!
//! Both scorers are pure functions of an [`ExpenseSubmission`]: no I/O, no
//! shared state, identical input gives identical output.

pub mod fraud;
pub mod reliability;
pub mod report;
pub mod types;
pub mod weights;

pub use fraud::*;
pub use reliability::*;
pub use report::*;
pub use types::*;

/// `|observed - reference|` as a percentage of `reference`.
///
/// A non-positive reference with any difference is infinitely far off.
pub(crate) fn amount_difference_percent(reference: f64, observed: f64) -> f64 {
    let diff = (observed - reference).abs();
    if reference > 0.0 {
        diff * 100.0 / reference
    } else if diff == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}
