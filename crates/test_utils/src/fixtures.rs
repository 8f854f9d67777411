//! Pre-built Test Fixtures
//!
//! Ready-to-use dates and transaction histories with known answers. All
//! dates are midnight UTC so day counts come out exact.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{AssetId, UserId};
use domain_portfolio::{Asset, Transaction, TransactionKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    /// Day zero used by the fixtures (Jan 1, 2023; a 365-day year)
    pub fn day_zero() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
    }

    /// `days` after day zero
    pub fn days_after(days: i64) -> DateTime<Utc> {
        Self::day_zero() + Duration::days(days)
    }

    /// Fractional `years` after day zero, on a 365-day basis
    pub fn years_after(years: f64) -> DateTime<Utc> {
        Self::day_zero() + Duration::seconds((years * 365.0 * 86_400.0).round() as i64)
    }
}

/// Fixture for assets
pub struct AssetFixtures;

impl AssetFixtures {
    /// A brokerage account with the given balance
    pub fn brokerage(owner: UserId, balance: Decimal) -> Asset {
        Asset::new(owner, "Brokerage", "brokerage").with_balance(balance)
    }

    /// An empty savings account
    pub fn savings(owner: UserId) -> Asset {
        Asset::new(owner, "Savings", "savings")
    }
}

/// Fixture for transaction histories with known returns
pub struct HistoryFixtures;

impl HistoryFixtures {
    fn at(asset_id: AssetId, kind: TransactionKind, amount: Decimal, day: i64) -> Transaction {
        Transaction::new(asset_id, kind, amount, format!("{} on day {}", kind, day))
            .with_timestamp(DateFixtures::days_after(day))
    }

    /// Deposit 100, withdraw 110 a year later: XIRR 10%
    pub fn ten_percent_year(asset_id: AssetId) -> Vec<Transaction> {
        vec![
            Self::at(asset_id, TransactionKind::Deposit, dec!(100), 0),
            Self::at(asset_id, TransactionKind::Withdrawal, dec!(110), 365),
        ]
    }

    /// Deposit 1000, a zero deposit mid-year, withdraw 1200 after a year:
    /// XIRR 20%
    pub fn twenty_percent_with_zero_flow(asset_id: AssetId) -> Vec<Transaction> {
        vec![
            Self::at(asset_id, TransactionKind::Deposit, dec!(1000), 0),
            Self::at(asset_id, TransactionKind::Deposit, dec!(0), 182),
            Self::at(asset_id, TransactionKind::Withdrawal, dec!(1200), 365),
        ]
    }

    /// Deposit 1000, a -900 revaluation, withdraw 100 at year end: a rate
    /// close to -1
    pub fn heavy_loss(asset_id: AssetId) -> Vec<Transaction> {
        vec![
            Self::at(asset_id, TransactionKind::Deposit, dec!(1000), 0),
            Self::at(asset_id, TransactionKind::Revaluation, dec!(-900), 200),
            Self::at(asset_id, TransactionKind::Withdrawal, dec!(100), 365),
        ]
    }

    /// Deposits only; the solver has nothing to balance them against
    pub fn deposits_only(asset_id: AssetId) -> Vec<Transaction> {
        vec![
            Self::at(asset_id, TransactionKind::Deposit, dec!(500), 0),
            Self::at(asset_id, TransactionKind::Deposit, dec!(250), 90),
            Self::at(asset_id, TransactionKind::Deposit, dec!(250), 180),
        ]
    }

    /// One of every recordable kind plus a row with an unknown stored tag
    pub fn mixed(asset_id: AssetId) -> Vec<Transaction> {
        vec![
            Self::at(asset_id, TransactionKind::Deposit, dec!(1000), 0),
            Self::at(asset_id, TransactionKind::Buy, dec!(600), 1),
            Self::at(asset_id, TransactionKind::Dividend, dec!(12), 90),
            Self::at(asset_id, TransactionKind::Revaluation, dec!(45), 180),
            Self::at(asset_id, TransactionKind::Sell, dec!(300), 270),
            Self::at(asset_id, TransactionKind::Withdrawal, dec!(200), 300),
            Self::at(asset_id, TransactionKind::from_tag("expense"), dec!(75), 310),
        ]
    }
}
