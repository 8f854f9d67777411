//! Portfolio domain errors

use thiserror::Error;

use core_kernel::PortError;

/// Reasons a return rate could not be computed for an asset.
///
/// None of these fail a request; they only leave the rate fields absent.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ReturnsError {
    #[error("Insufficient data: {flows} cash flow(s), at least 2 required")]
    InsufficientData { flows: usize },

    #[error("Cash flows never change sign")]
    NoSignChange,

    #[error("Solver did not converge after {iterations} iterations")]
    NonConvergence { iterations: u32 },
}

/// Errors that can occur in portfolio operations
#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Port(#[from] PortError),
}
