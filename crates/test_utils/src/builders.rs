//! Test Data Builders
//!
//! Builders let a test name only the fields it cares about and take
//! defaults for everything else.

use chrono::{DateTime, Utc};
use core_kernel::{AssetId, UserId};
use domain_portfolio::{Asset, NewTransaction, Transaction, TransactionKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::DateFixtures;

/// Builder for transactions
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    asset_id: AssetId,
    kind: TransactionKind,
    amount: Decimal,
    timestamp: DateTime<Utc>,
    description: String,
}

impl TransactionBuilder {
    /// A 100.00 deposit on day zero
    pub fn new(asset_id: AssetId) -> Self {
        Self {
            asset_id,
            kind: TransactionKind::Deposit,
            amount: dec!(100),
            timestamp: DateFixtures::day_zero(),
            description: "test transaction".to_string(),
        }
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    /// Places the transaction `days` after day zero
    pub fn on_day(mut self, days: i64) -> Self {
        self.timestamp = DateFixtures::days_after(days);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builds a stored transaction
    pub fn build(self) -> Transaction {
        Transaction::new(self.asset_id, self.kind, self.amount, self.description)
            .with_timestamp(self.timestamp)
    }

    /// Builds the request a caller would submit
    pub fn build_request(self) -> NewTransaction {
        NewTransaction::new(self.kind, self.amount, self.description).at(self.timestamp)
    }
}

/// Builder for assets
#[derive(Debug, Clone)]
pub struct AssetBuilder {
    owner: UserId,
    name: String,
    asset_type: String,
    balance: Decimal,
}

impl AssetBuilder {
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            name: "Test Asset".to_string(),
            asset_type: "brokerage".to_string(),
            balance: Decimal::ZERO,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn asset_type(mut self, asset_type: impl Into<String>) -> Self {
        self.asset_type = asset_type.into();
        self
    }

    pub fn balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    pub fn build(self) -> Asset {
        Asset::new(self.owner, self.name, self.asset_type).with_balance(self.balance)
    }
}
