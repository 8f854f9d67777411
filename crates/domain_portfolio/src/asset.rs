//! Assets owned by a user
//!
//! An asset is an account or holding whose balance is kept up to date as
//! transactions are recorded and removed. Performance figures are never
//! stored; they are attached per read as an [`AssetPerformance`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{AssetId, UserId};

use crate::error::PortfolioError;
use crate::returns::ReturnMetrics;

/// A financial asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier
    pub id: AssetId,
    /// Owning user
    #[serde(rename = "user_id")]
    pub owner: UserId,
    /// Display name
    pub name: String,
    /// Free-form category (e.g. "brokerage", "savings")
    #[serde(rename = "type")]
    pub asset_type: String,
    /// Current value, maintained incrementally
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Creates an asset with a zero balance
    pub fn new(owner: UserId, name: impl Into<String>, asset_type: impl Into<String>) -> Self {
        Self {
            id: AssetId::new_v7(),
            owner,
            name: name.into(),
            asset_type: asset_type.into(),
            balance: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Sets the balance
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    /// Returns true if `user` owns this asset
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Applies an update request; absent fields are left alone
    pub fn apply(&mut self, update: UpdateAsset) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(asset_type) = update.asset_type {
            self.asset_type = asset_type;
        }
        if let Some(balance) = update.balance {
            self.balance = balance;
        }
    }
}

/// Request to create an asset
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAsset {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub asset_type: String,
}

impl NewAsset {
    pub fn new(name: impl Into<String>, asset_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset_type: asset_type.into(),
        }
    }

    /// Validates the request and builds the asset for `owner`
    pub fn into_asset(self, owner: UserId) -> Result<Asset, PortfolioError> {
        self.validate()
            .map_err(|e| PortfolioError::Validation(e.to_string()))?;
        Ok(Asset::new(owner, self.name, self.asset_type))
    }
}

/// Partial update of an asset
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAsset {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub asset_type: Option<String>,
    /// Overrides the running balance, e.g. after reconciling with a statement
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub balance: Option<Decimal>,
}

/// An asset together with its performance figures.
///
/// `metrics` is `None` when the transaction history could not be read; the
/// asset is still listed, just without `profit`, `xirr`, `apy` and `apr`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetPerformance {
    #[serde(flatten)]
    pub asset: Asset,
    #[serde(flatten)]
    pub metrics: Option<ReturnMetrics>,
}

impl AssetPerformance {
    pub fn new(asset: Asset, metrics: Option<ReturnMetrics>) -> Self {
        Self { asset, metrics }
    }

    /// Asset listed without metrics
    pub fn without_metrics(asset: Asset) -> Self {
        Self::new(asset, None)
    }
}
