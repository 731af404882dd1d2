//! # Metrics Calculator
//!
//! Derives total, percentage and GPA from a marks mapping.
//!
//! This is the only module of the CORE that performs floating-point
//! arithmetic. Everything upstream of it works on integer scores.
//!
//! ## Rounding
//!
//! GPA is `percentage / 10` rounded to two decimals with
//! round-half-away-from-zero. Scores are non-negative, so this is
//! round-half-up: a percentage of `84.5` gives `8.45` and `84.375` gives
//! `8.44`. Ties are not rounded to even.

#![allow(clippy::float_arithmetic)]

use crate::{Marks, RecordError};
use serde::{Deserialize, Serialize};

/// Academic metrics derived from a marks mapping.
///
/// Values of this type are only produced by [`compute`], so the three fields
/// are always consistent with each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Sum of all scores.
    pub total: u64,
    /// `total / subject count`.
    pub percentage: f64,
    /// `percentage / 10`, rounded to two decimals.
    pub gpa: f64,
}

/// Compute metrics for a marks mapping.
///
/// Fails with `InvalidInput` on an empty mapping instead of dividing by zero.
pub fn compute(marks: &Marks) -> Result<Metrics, RecordError> {
    if marks.is_empty() {
        return Err(RecordError::invalid("marks must contain at least one subject"));
    }

    let total: u64 = marks.values().map(|&score| u64::from(score)).sum();
    let percentage = total as f64 / marks.len() as f64;

    Ok(Metrics {
        total,
        percentage,
        gpa: round_gpa(percentage),
    })
}

/// `round(percentage / 10, 2)`, folded into a single rounding step.
fn round_gpa(percentage: f64) -> f64 {
    (percentage * 10.0).round() / 100.0
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn marks(pairs: &[(&str, u32)]) -> Marks {
        pairs.iter().map(|(s, m)| ((*s).to_string(), *m)).collect()
    }

    #[test]
    fn two_subjects_example() {
        let metrics = compute(&marks(&[("Math", 80), ("Physics", 90)])).expect("compute");
        assert_eq!(metrics.total, 170);
        assert_eq!(metrics.percentage, 85.0);
        assert_eq!(metrics.gpa, 8.5);
    }

    #[test]
    fn empty_marks_rejected() {
        let result = compute(&Marks::new());
        assert!(matches!(result, Err(RecordError::InvalidInput(_))));
    }

    #[test]
    fn gpa_rounds_to_two_decimals() {
        // 250 / 3 = 83.333.. -> 8.33
        let metrics = compute(&marks(&[("A", 80), ("B", 85), ("C", 85)])).expect("compute");
        assert_eq!(metrics.total, 250);
        assert_eq!(metrics.gpa, 8.33);

        // 200 / 3 = 66.666.. -> 6.67
        let metrics = compute(&marks(&[("A", 60), ("B", 70), ("C", 70)])).expect("compute");
        assert_eq!(metrics.gpa, 6.67);
    }

    #[test]
    fn half_rounds_up() {
        // 169 / 2 = 84.5 -> 845.0 -> 8.45
        let metrics = compute(&marks(&[("A", 84), ("B", 85)])).expect("compute");
        assert_eq!(metrics.percentage, 84.5);
        assert_eq!(metrics.gpa, 8.45);

        // 4 subjects, 338 / 4 = 84.5 as well
        let metrics =
            compute(&marks(&[("A", 84), ("B", 85), ("C", 84), ("D", 85)])).expect("compute");
        assert_eq!(metrics.gpa, 8.45);

        // 8 subjects summing to 675 -> 84.375 -> 843.75 rounds to 844 -> 8.44
        let metrics = compute(&marks(&[
            ("A", 84),
            ("B", 84),
            ("C", 84),
            ("D", 84),
            ("E", 84),
            ("F", 85),
            ("G", 85),
            ("H", 85),
        ]))
        .expect("compute");
        assert_eq!(metrics.total, 675);
        assert_eq!(metrics.gpa, 8.44);
    }

    #[test]
    fn compute_is_deterministic() {
        let m = marks(&[("Chemistry", 71), ("Biology", 64)]);
        assert_eq!(compute(&m).expect("first"), compute(&m).expect("second"));
    }

    #[test]
    fn large_scores_do_not_overflow() {
        let m = marks(&[("A", u32::MAX), ("B", u32::MAX)]);
        let metrics = compute(&m).expect("compute");
        assert_eq!(metrics.total, 2 * u64::from(u32::MAX));
    }
}
