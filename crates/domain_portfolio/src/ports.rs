//! Portfolio Domain Ports
//!
//! The `PortfolioPort` trait is everything the portfolio domain needs from
//! storage: the asset records of a user and the transaction feed of an asset.
//! How those are persisted is up to the adapter.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_portfolio::{PortfolioPort, PortfolioService};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn PortfolioPort> = Arc::new(PostgresPortfolioAdapter::new(pool));
//! let service = PortfolioService::new(port);
//! ```
//!
//! Inserting or removing a transaction must update the owning asset's balance
//! in the same storage transaction; adapters receive the balance delta to
//! apply alongside the row.

use async_trait::async_trait;
use rust_decimal::Decimal;

use core_kernel::{AssetId, DomainPort, PortError, TransactionId, UserId};

use crate::asset::Asset;
use crate::transaction::Transaction;

/// Storage operations required by the portfolio domain
///
/// All methods return `PortError` so services can tell a missing record
/// apart from an unavailable backend.
#[async_trait]
pub trait PortfolioPort: DomainPort {
    // ========================================================================
    // Assets
    // ========================================================================

    /// Lists the assets owned by `owner`, in listing order
    async fn assets_by_owner(&self, owner: UserId) -> Result<Vec<Asset>, PortError>;

    /// Retrieves an asset by ID
    async fn get_asset(&self, id: AssetId) -> Result<Asset, PortError>;

    /// Inserts or replaces an asset
    async fn save_asset(&self, asset: &Asset) -> Result<(), PortError>;

    /// Deletes an asset together with all of its transactions
    async fn delete_asset(&self, id: AssetId) -> Result<(), PortError>;

    /// Returns true if `id` exists and belongs to `owner`
    async fn is_asset_owned_by(&self, id: AssetId, owner: UserId) -> Result<bool, PortError>;

    // ========================================================================
    // Transactions
    // ========================================================================

    /// All transactions belonging to an asset, in any order
    async fn transactions_by_asset(&self, asset_id: AssetId) -> Result<Vec<Transaction>, PortError>;

    /// Retrieves a transaction by ID
    async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, PortError>;

    /// Returns true if the transaction's asset belongs to `owner`
    async fn is_transaction_owned_by(
        &self,
        id: TransactionId,
        owner: UserId,
    ) -> Result<bool, PortError>;

    /// Stores `transaction` and adds `balance_delta` to its asset's balance,
    /// atomically. Returns the updated asset.
    async fn insert_transaction(
        &self,
        transaction: &Transaction,
        balance_delta: Decimal,
    ) -> Result<Asset, PortError>;

    /// Deletes a transaction and adds `balance_delta` to its asset's balance,
    /// atomically. Returns the updated asset.
    async fn remove_transaction(
        &self,
        id: TransactionId,
        balance_delta: Decimal,
    ) -> Result<Asset, PortError>;
}

/// Mock implementation for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Counts a transaction fetch as in flight until dropped
    struct InFlight(Arc<AtomicUsize>);

    impl InFlight {
        fn enter(counter: &Arc<AtomicUsize>) -> Self {
            counter.fetch_add(1, Ordering::SeqCst);
            Self(Arc::clone(counter))
        }
    }

    impl Drop for InFlight {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// In-memory mock implementation of PortfolioPort
    ///
    /// Assets are listed in insertion order. Fetching the transactions of an
    /// asset registered with [`MockPortfolioPort::fail_transactions_for`]
    /// returns a connection error; one registered with
    /// [`MockPortfolioPort::stall_transactions_for`] never completes.
    ///
    /// Writes that touch both maps lock `transactions` before `assets`.
    #[derive(Debug, Default)]
    pub struct MockPortfolioPort {
        assets: Arc<RwLock<Vec<Asset>>>,
        transactions: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
        failing: Arc<RwLock<HashSet<AssetId>>>,
        stalled: Arc<RwLock<HashSet<AssetId>>>,
        in_flight: Arc<AtomicUsize>,
    }

    impl MockPortfolioPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with assets for testing
        pub async fn with_assets(assets: Vec<Asset>) -> Self {
            let port = Self::new();
            port.assets.write().await.extend(assets);
            port
        }

        /// Adds transactions without touching any balance
        pub async fn with_transactions(self, transactions: Vec<Transaction>) -> Self {
            {
                let mut stored = self.transactions.write().await;
                for transaction in transactions {
                    stored.insert(transaction.id, transaction);
                }
            }
            self
        }

        /// Makes `transactions_by_asset` fail for `asset_id`
        pub async fn fail_transactions_for(&self, asset_id: AssetId) {
            self.failing.write().await.insert(asset_id);
        }

        /// Makes `transactions_by_asset` hang for `asset_id`
        pub async fn stall_transactions_for(&self, asset_id: AssetId) {
            self.stalled.write().await.insert(asset_id);
        }

        /// Transaction fetches started and not yet finished or dropped
        pub fn fetches_in_flight(&self) -> usize {
            self.in_flight.load(Ordering::SeqCst)
        }

        /// Number of stored transactions across all assets
        pub async fn transaction_count(&self) -> usize {
            self.transactions.read().await.len()
        }

        async fn adjust_balance(&self, asset_id: AssetId, delta: Decimal) -> Result<Asset, PortError> {
            let mut assets = self.assets.write().await;
            let asset = assets
                .iter_mut()
                .find(|a| a.id == asset_id)
                .ok_or_else(|| PortError::not_found("Asset", asset_id))?;
            asset.balance += delta;
            Ok(asset.clone())
        }
    }

    impl DomainPort for MockPortfolioPort {}

    #[async_trait]
    impl PortfolioPort for MockPortfolioPort {
        async fn assets_by_owner(&self, owner: UserId) -> Result<Vec<Asset>, PortError> {
            let assets = self.assets.read().await;
            Ok(assets.iter().filter(|a| a.owner == owner).cloned().collect())
        }

        async fn get_asset(&self, id: AssetId) -> Result<Asset, PortError> {
            self.assets
                .read()
                .await
                .iter()
                .find(|a| a.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Asset", id))
        }

        async fn save_asset(&self, asset: &Asset) -> Result<(), PortError> {
            let mut assets = self.assets.write().await;
            match assets.iter_mut().find(|a| a.id == asset.id) {
                Some(existing) => *existing = asset.clone(),
                None => assets.push(asset.clone()),
            }
            Ok(())
        }

        async fn delete_asset(&self, id: AssetId) -> Result<(), PortError> {
            let mut transactions = self.transactions.write().await;
            let mut assets = self.assets.write().await;
            let before = assets.len();
            assets.retain(|a| a.id != id);
            if assets.len() == before {
                return Err(PortError::not_found("Asset", id));
            }
            transactions.retain(|_, t| t.asset_id != id);
            Ok(())
        }

        async fn is_asset_owned_by(&self, id: AssetId, owner: UserId) -> Result<bool, PortError> {
            let assets = self.assets.read().await;
            Ok(assets.iter().any(|a| a.id == id && a.owner == owner))
        }

        async fn transactions_by_asset(&self, asset_id: AssetId) -> Result<Vec<Transaction>, PortError> {
            let _in_flight = InFlight::enter(&self.in_flight);

            if self.stalled.read().await.contains(&asset_id) {
                std::future::pending::<()>().await;
            }
            if self.failing.read().await.contains(&asset_id) {
                return Err(PortError::connection(format!(
                    "transaction feed unavailable for asset {}",
                    asset_id
                )));
            }

            let transactions = self.transactions.read().await;
            Ok(transactions
                .values()
                .filter(|t| t.asset_id == asset_id)
                .cloned()
                .collect())
        }

        async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, PortError> {
            self.transactions
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Transaction", id))
        }

        async fn is_transaction_owned_by(
            &self,
            id: TransactionId,
            owner: UserId,
        ) -> Result<bool, PortError> {
            let asset_id = match self.transactions.read().await.get(&id) {
                Some(transaction) => transaction.asset_id,
                None => return Ok(false),
            };
            self.is_asset_owned_by(asset_id, owner).await
        }

        async fn insert_transaction(
            &self,
            transaction: &Transaction,
            balance_delta: Decimal,
        ) -> Result<Asset, PortError> {
            let mut transactions = self.transactions.write().await;
            if transactions.contains_key(&transaction.id) {
                return Err(PortError::conflict(format!(
                    "transaction {} already exists",
                    transaction.id
                )));
            }

            let asset = self.adjust_balance(transaction.asset_id, balance_delta).await?;
            transactions.insert(transaction.id, transaction.clone());
            Ok(asset)
        }

        async fn remove_transaction(
            &self,
            id: TransactionId,
            balance_delta: Decimal,
        ) -> Result<Asset, PortError> {
            let mut transactions = self.transactions.write().await;
            let asset_id = transactions
                .get(&id)
                .map(|t| t.asset_id)
                .ok_or_else(|| PortError::not_found("Transaction", id))?;

            let asset = self.adjust_balance(asset_id, balance_delta).await?;
            transactions.remove(&id);
            Ok(asset)
        }
    }
}
