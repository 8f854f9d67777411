//! Property-Based Test Generators
//!
//! Proptest strategies that respect the domain's rules: amounts are positive
//! magnitudes and rates stay well inside `r > -1`.

use chrono::{DateTime, Duration, Utc};
use core_kernel::AssetId;
use domain_portfolio::{CashFlow, Transaction, TransactionKind};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::fixtures::DateFixtures;

/// Strategy for kinds that can be recorded
pub fn recordable_kind_strategy() -> impl Strategy<Value = TransactionKind> {
    proptest::sample::select(TransactionKind::RECORDABLE.to_vec())
}

/// Strategy for amounts between 1.00 and 1,000,000.00, in cents
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (100i64..=100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for annual rates in [-0.5, 1.0]
pub fn rate_strategy() -> impl Strategy<Value = f64> {
    -0.5f64..=1.0f64
}

/// Strategy for horizons in [0.25, 10] years
pub fn years_strategy() -> impl Strategy<Value = f64> {
    0.25f64..=10.0f64
}

/// Strategy for a day offset within ten years of day zero
pub fn day_offset_strategy() -> impl Strategy<Value = i64> {
    0i64..3650i64
}

/// Strategy for a date within ten years of day zero
pub fn date_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    day_offset_strategy().prop_map(DateFixtures::days_after)
}

/// Strategy for a recordable transaction against `asset_id`
pub fn transaction_strategy(asset_id: AssetId) -> impl Strategy<Value = Transaction> {
    (recordable_kind_strategy(), amount_strategy(), day_offset_strategy()).prop_map(
        move |(kind, amount, day)| {
            Transaction::new(asset_id, kind, amount, "generated")
                .with_timestamp(DateFixtures::days_after(day))
        },
    )
}

/// Strategy for an asset history of up to `max_len` transactions
pub fn history_strategy(asset_id: AssetId, max_len: usize) -> impl Strategy<Value = Vec<Transaction>> {
    proptest::collection::vec(transaction_strategy(asset_id), 0..=max_len)
}

/// Strategy for flows that all share one sign
pub fn same_sign_flows_strategy() -> impl Strategy<Value = Vec<CashFlow>> {
    (
        any::<bool>(),
        proptest::collection::vec((day_offset_strategy(), 1.0f64..1_000_000.0f64), 2..12),
    )
        .prop_map(|(negative, points)| {
            let sign = if negative { -1.0 } else { 1.0 };
            points
                .into_iter()
                .map(|(day, amount)| CashFlow::new(DateFixtures::days_after(day), sign * amount))
                .collect()
        })
}

/// A two-flow series whose XIRR is exactly `rate`: invest `amount` at day
/// zero, receive `amount * (1 + rate)^years` after `years`
pub fn growth_flows(amount: f64, rate: f64, years: f64) -> Vec<CashFlow> {
    let start = DateFixtures::day_zero();
    let end = start + Duration::seconds((years * 365.0 * 86_400.0).round() as i64);
    let exact_years = (end - start).num_seconds() as f64 / 86_400.0 / 365.0;
    vec![
        CashFlow::new(start, -amount),
        CashFlow::new(end, amount * (1.0 + rate).powf(exact_years)),
    ]
}
