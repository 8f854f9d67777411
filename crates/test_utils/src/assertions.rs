//! Custom Test Assertions
//!
//! Assertion helpers that print the numbers involved when a rate check fails.

use domain_portfolio::ReturnMetrics;
use rust_decimal::Decimal;

/// Asserts that a computed rate is present and within `tolerance` of `expected`
///
/// # Panics
///
/// Panics if the rate is absent or off by more than `tolerance`
pub fn assert_rate_approx_eq(actual: Option<f64>, expected: f64, tolerance: f64) {
    let rate = match actual {
        Some(rate) => rate,
        None => panic!("Expected a rate near {}, got none", expected),
    };
    let diff = (rate - expected).abs();
    assert!(
        diff <= tolerance,
        "Rates differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        rate,
        expected,
        diff,
        tolerance
    );
}

/// Asserts that none of xirr, apy or apr were computed
pub fn assert_no_rates(metrics: &ReturnMetrics) {
    assert!(
        metrics.xirr.is_none() && metrics.apy.is_none() && metrics.apr.is_none(),
        "Expected no rates, got xirr={:?} apy={:?} apr={:?}",
        metrics.xirr,
        metrics.apy,
        metrics.apr
    );
}

/// Asserts the profit figure
pub fn assert_profit_eq(metrics: &ReturnMetrics, expected: Decimal) {
    assert_eq!(
        metrics.profit, expected,
        "Profit mismatch: actual={}, expected={}",
        metrics.profit, expected
    );
}
