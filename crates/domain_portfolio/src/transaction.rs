//! Transactions recorded against an asset
//!
//! A transaction is immutable once stored. Its [`TransactionKind`] decides
//! both how it shows up in the cash-flow series used for XIRR and how it
//! moves the asset's running balance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use core_kernel::{AssetId, TransactionId};

use crate::cashflow::{FlowRule, FlowSign, TotalsBucket};
use crate::error::PortfolioError;

/// Kinds of transactions an asset can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money put into the asset from outside
    Deposit,
    /// Money taken out of the asset
    Withdrawal,
    /// Purchase of a holding inside the asset
    Buy,
    /// Sale of a holding inside the asset
    Sell,
    /// Income paid out by the asset
    Dividend,
    /// Mark-to-market adjustment; the stored amount carries its own sign
    Revaluation,
    /// A stored tag this build does not know about
    #[serde(other)]
    Unrecognized,
}

impl TransactionKind {
    /// All kinds that can be recorded
    pub const RECORDABLE: [TransactionKind; 6] = [
        TransactionKind::Deposit,
        TransactionKind::Withdrawal,
        TransactionKind::Buy,
        TransactionKind::Sell,
        TransactionKind::Dividend,
        TransactionKind::Revaluation,
    ];

    /// Lenient conversion for tags read back from storage.
    ///
    /// Unknown tags map to [`TransactionKind::Unrecognized`] instead of failing,
    /// so one odd row never hides the rest of an asset's history.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or(TransactionKind::Unrecognized)
    }

    /// Returns the storage tag
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Buy => "buy",
            TransactionKind::Sell => "sell",
            TransactionKind::Dividend => "dividend",
            TransactionKind::Revaluation => "revaluation",
            TransactionKind::Unrecognized => "unrecognized",
        }
    }

    /// Cash-flow sign and totals bucket for this kind.
    ///
    /// | kind        | flow      | bucket      |
    /// |-------------|-----------|-------------|
    /// | deposit     | −amount   | deposits    |
    /// | withdrawal  | +amount   | withdrawals |
    /// | buy         | −amount   |             |
    /// | sell        | +amount   |             |
    /// | dividend    | +amount   | dividends   |
    /// | revaluation | as stored |             |
    ///
    /// `Unrecognized` yields `None`: no flow and no contribution to any total.
    pub const fn flow_rule(self) -> Option<FlowRule> {
        let rule = match self {
            TransactionKind::Deposit => FlowRule::new(FlowSign::Outflow, Some(TotalsBucket::Deposits)),
            TransactionKind::Withdrawal => FlowRule::new(FlowSign::Inflow, Some(TotalsBucket::Withdrawals)),
            TransactionKind::Buy => FlowRule::new(FlowSign::Outflow, None),
            TransactionKind::Sell => FlowRule::new(FlowSign::Inflow, None),
            TransactionKind::Dividend => FlowRule::new(FlowSign::Inflow, Some(TotalsBucket::Dividends)),
            TransactionKind::Revaluation => FlowRule::new(FlowSign::AsStored, None),
            TransactionKind::Unrecognized => return None,
        };
        Some(rule)
    }

    /// Change to the asset balance when a transaction of this kind is recorded.
    ///
    /// Buys and sells swap cash for holdings inside the asset, so its value
    /// does not move. Dividends are paid out of the asset and leave the
    /// balance alone too; the profit formula adds them back separately.
    pub fn balance_delta(self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Deposit | TransactionKind::Revaluation => amount,
            TransactionKind::Withdrawal => -amount,
            TransactionKind::Buy
            | TransactionKind::Sell
            | TransactionKind::Dividend
            | TransactionKind::Unrecognized => Decimal::ZERO,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            "buy" => Ok(TransactionKind::Buy),
            "sell" => Ok(TransactionKind::Sell),
            "dividend" => Ok(TransactionKind::Dividend),
            "revaluation" => Ok(TransactionKind::Revaluation),
            other => Err(PortfolioError::Validation(format!(
                "unknown transaction type: {}",
                other
            ))),
        }
    }
}

/// A transaction stored against an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,
    /// Owning asset
    pub asset_id: AssetId,
    /// Magnitude of the transaction (signed only for revaluations)
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Transaction kind
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// When the money moved
    pub timestamp: DateTime<Utc>,
    /// Free-form note
    pub description: String,
}

impl Transaction {
    /// Creates a transaction timestamped now
    pub fn new(
        asset_id: AssetId,
        kind: TransactionKind,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: TransactionId::new_v7(),
            asset_id,
            amount,
            kind,
            timestamp: Utc::now(),
            description: description.into(),
        }
    }

    /// Sets the timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Change this transaction applied to its asset's balance
    pub fn balance_delta(&self) -> Decimal {
        self.kind.balance_delta(self.amount)
    }
}

/// Request to record a new transaction
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_amount_for_kind"))]
pub struct NewTransaction {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    /// Defaults to the time of recording
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn new(kind: TransactionKind, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            amount,
            kind,
            description: description.into(),
            timestamp: None,
        }
    }

    /// Back-dates the transaction
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Runs field and schema validation, mapping failures into the domain error
    pub fn check(&self) -> Result<(), PortfolioError> {
        self.validate()
            .map_err(|e| PortfolioError::Validation(e.to_string()))
    }

    /// Builds the stored transaction for `asset_id`
    pub fn into_transaction(self, asset_id: AssetId) -> Transaction {
        let transaction = Transaction::new(asset_id, self.kind, self.amount, self.description);
        match self.timestamp {
            Some(ts) => transaction.with_timestamp(ts),
            None => transaction,
        }
    }
}

fn validate_amount_for_kind(request: &NewTransaction) -> Result<(), ValidationError> {
    if request.kind == TransactionKind::Unrecognized {
        return Err(ValidationError::new("unrecognized_transaction_type"));
    }
    if request.kind != TransactionKind::Revaluation && request.amount < Decimal::ZERO {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}
