//! Tolerance classification of declared/metered volume pairs
//!
//! Stateless percentage-variance evaluation against a threshold. The
//! zero-expected policy: a metered volume against a zero declaration is
//! a 100% variance (and never within tolerance); zero against zero is a
//! clean 0%.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default tolerance threshold (percent)
pub const DEFAULT_TOLERANCE_PCT: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Target threshold (percent) the business wants to tighten to; named
/// here for reference, never applied automatically.
pub const TARGET_TOLERANCE_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Outcome of classifying one declared/metered pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Declared volume (m³)
    pub expected_m3: Decimal,

    /// Metered volume (m³)
    pub actual_m3: Decimal,

    /// Signed variance, actual − expected (m³)
    pub variance_m3: Decimal,

    /// |variance| / |expected| × 100
    pub variance_pct: Decimal,

    /// Whether the variance is acceptable at `threshold_pct`
    pub within_tolerance: bool,

    /// Threshold the pair was judged against (percent)
    pub threshold_pct: Decimal,
}

/// Classify a declared/metered pair against a percent threshold
pub fn classify(expected_m3: Decimal, actual_m3: Decimal, threshold_pct: Decimal) -> Classification {
    let variance_m3 = actual_m3 - expected_m3;

    let (variance_pct, within_tolerance) = if expected_m3.is_zero() {
        if actual_m3.is_zero() {
            (Decimal::ZERO, true)
        } else {
            (Decimal::ONE_HUNDRED, false)
        }
    } else {
        let variance_pct = variance_m3.abs() / expected_m3.abs() * Decimal::ONE_HUNDRED;
        (variance_pct, variance_pct <= threshold_pct)
    };

    Classification {
        expected_m3,
        actual_m3,
        variance_m3,
        variance_pct,
        within_tolerance,
        threshold_pct,
    }
}

/// Classify a batch of pairs with identical per-pair semantics
pub fn batch_classify(pairs: &[(Decimal, Decimal)], threshold_pct: Decimal) -> Vec<Classification> {
    pairs
        .iter()
        .map(|&(expected, actual)| classify(expected, actual, threshold_pct))
        .collect()
}

/// Classify a batch and keep only the out-of-tolerance results
pub fn exceptions_only(pairs: &[(Decimal, Decimal)], threshold_pct: Decimal) -> Vec<Classification> {
    pairs
        .iter()
        .map(|&(expected, actual)| classify(expected, actual, threshold_pct))
        .filter(|c| !c.within_tolerance)
        .collect()
}
