//! Portfolio Domain
//!
//! Users own assets and record transactions against them. This crate keeps
//! each asset's balance in step with its transactions and derives the
//! asset's performance figures on every read:
//!
//! - **Cash-flow builder** (`cashflow`): transactions to a signed, dated
//!   series plus deposit, withdrawal and dividend totals
//! - **XIRR solver** (`xirr`): the annual rate zeroing the series' NPV
//! - **Yield deriver** (`returns`): profit, XIRR, APY and APR
//!
//! # Examples
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use core_kernel::AssetId;
//! use domain_portfolio::{returns, SolverConfig, Transaction, TransactionKind};
//! use rust_decimal_macros::dec;
//!
//! let asset_id = AssetId::new();
//! let history = vec![
//!     Transaction::new(asset_id, TransactionKind::Deposit, dec!(1000), "opening deposit")
//!         .with_timestamp(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
//!     Transaction::new(asset_id, TransactionKind::Withdrawal, dec!(1100), "closed out")
//!         .with_timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
//! ];
//!
//! let metrics = returns::compute(dec!(0), &history, &SolverConfig::default());
//! assert_eq!(metrics.profit, dec!(100));
//! assert!((metrics.xirr.unwrap() - 0.10).abs() < 1e-6);
//! ```

pub mod asset;
pub mod transaction;
pub mod cashflow;
pub mod xirr;
pub mod returns;
pub mod config;
pub mod error;
pub mod ports;
pub mod services;

pub use asset::{Asset, AssetPerformance, NewAsset, UpdateAsset};
pub use transaction::{NewTransaction, Transaction, TransactionKind};
pub use cashflow::{CashFlow, CashflowSeries, CashflowTotals, FlowRule, FlowSign, TotalsBucket};
pub use returns::ReturnMetrics;
pub use crate::config::SolverConfig;
pub use error::{PortfolioError, ReturnsError};
pub use ports::PortfolioPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockPortfolioPort;
pub use services::PortfolioService;
