//! Yield deriver
//!
//! Combines an asset's balance, the totals from the cash-flow builder and the
//! solved XIRR into the metrics shown next to the asset. Rates that cannot be
//! computed are `None` and are omitted from serialized output, so "unknown"
//! never reads as zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cashflow::{CashflowSeries, CashflowTotals};
use crate::config::SolverConfig;
use crate::transaction::Transaction;
use crate::xirr;

/// Derived performance figures for one asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnMetrics {
    /// `balance - deposits + withdrawals + dividends`
    #[serde(with = "rust_decimal::serde::float")]
    pub profit: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xirr: Option<f64>,
    /// Effective annual yield; equal to `xirr` on a 365-day basis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apy: Option<f64>,
    /// Continuous-compounding equivalent, `ln(1 + xirr)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apr: Option<f64>,
}

impl ReturnMetrics {
    /// Builds the metrics from their inputs.
    ///
    /// `apr` is absent when `xirr <= -1`, where the logarithm is undefined.
    pub fn derive(balance: Decimal, totals: &CashflowTotals, xirr: Option<f64>) -> Self {
        let profit = balance - totals.deposits + totals.withdrawals + totals.dividends;
        let apr = xirr.filter(|rate| *rate > -1.0).map(f64::ln_1p);

        Self {
            profit,
            xirr,
            apy: xirr,
            apr,
        }
    }

    /// True when the rate fields were computed
    pub fn has_rates(&self) -> bool {
        self.xirr.is_some()
    }
}

/// Computes the metrics for an asset from its balance and full transaction
/// history. Pure: the same inputs always produce the same output.
pub fn compute(balance: Decimal, transactions: &[Transaction], config: &SolverConfig) -> ReturnMetrics {
    let series = CashflowSeries::build(transactions);

    let rate = match xirr::solve(&series.flows, config) {
        Ok(rate) => Some(rate),
        Err(reason) => {
            debug!(%reason, flows = series.len(), "xirr not available");
            None
        }
    };

    ReturnMetrics::derive(balance, &series.totals, rate)
}
