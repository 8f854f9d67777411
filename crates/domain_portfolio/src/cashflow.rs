//! Cash-flow builder
//!
//! Turns the transaction history of one asset into the signed, dated series
//! consumed by the XIRR solver, plus running totals of deposits, withdrawals
//! and dividends consumed by the profit formula.
//!
//! Signs follow the investor's pocket: money leaving it is negative, money
//! coming back is positive.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::transaction::Transaction;

/// How a transaction amount is signed in the cash-flow series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowSign {
    /// Money leaves the investor: `-amount`
    Outflow,
    /// Money returns to the investor: `+amount`
    Inflow,
    /// The stored amount is already signed
    AsStored,
}

/// Running total a transaction contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsBucket {
    Deposits,
    Withdrawals,
    Dividends,
}

/// Cash-flow treatment of one transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowRule {
    pub sign: FlowSign,
    pub bucket: Option<TotalsBucket>,
}

impl FlowRule {
    pub const fn new(sign: FlowSign, bucket: Option<TotalsBucket>) -> Self {
        Self { sign, bucket }
    }

    /// Applies the sign to a stored amount
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self.sign {
            FlowSign::Outflow => -amount,
            FlowSign::Inflow | FlowSign::AsStored => amount,
        }
    }
}

/// A single dated, signed cash flow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: DateTime<Utc>,
    pub amount: f64,
}

impl CashFlow {
    pub fn new(date: DateTime<Utc>, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Running sums collected while building the series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashflowTotals {
    pub deposits: Decimal,
    pub withdrawals: Decimal,
    pub dividends: Decimal,
}

impl CashflowTotals {
    fn add(&mut self, bucket: TotalsBucket, amount: Decimal) {
        match bucket {
            TotalsBucket::Deposits => self.deposits += amount,
            TotalsBucket::Withdrawals => self.withdrawals += amount,
            TotalsBucket::Dividends => self.dividends += amount,
        }
    }
}

/// Output of the builder for one asset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CashflowSeries {
    /// Flows ordered by date
    pub flows: Vec<CashFlow>,
    pub totals: CashflowTotals,
    /// Transactions left out because their kind is unrecognized
    pub skipped: usize,
    /// Transactions left out because their amount has no `f64` equivalent
    pub unrepresentable: usize,
}

impl CashflowSeries {
    /// Builds the series from an asset's transactions in any order
    pub fn build(transactions: &[Transaction]) -> Self {
        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        ordered.sort_by_key(|t| t.timestamp);

        let mut series = CashflowSeries {
            flows: Vec::with_capacity(ordered.len()),
            ..Default::default()
        };

        for transaction in ordered {
            let Some(rule) = transaction.kind.flow_rule() else {
                debug!(
                    transaction_id = %transaction.id,
                    asset_id = %transaction.asset_id,
                    "skipping transaction with unrecognized type"
                );
                series.skipped += 1;
                continue;
            };

            let Some(amount) = rule.signed(transaction.amount).to_f64() else {
                warn!(
                    transaction_id = %transaction.id,
                    asset_id = %transaction.asset_id,
                    amount = %transaction.amount,
                    "dropping transaction whose amount is not representable as f64"
                );
                series.unrepresentable += 1;
                continue;
            };

            series.flows.push(CashFlow::new(transaction.timestamp, amount));
            if let Some(bucket) = rule.bucket {
                series.totals.add(bucket, transaction.amount);
            }
        }

        series
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
