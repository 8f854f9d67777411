//! Portfolio domain services
//!
//! `PortfolioService` orchestrates the port and the pure returns calculation.
//! Reads attach freshly computed metrics to each asset; writes keep the asset
//! balance in step with its transactions.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use validator::Validate;

use core_kernel::{AssetId, PortError, TransactionId, UserId};

use crate::asset::{Asset, AssetPerformance, NewAsset, UpdateAsset};
use crate::config::SolverConfig;
use crate::error::PortfolioError;
use crate::ports::PortfolioPort;
use crate::returns::{self, ReturnMetrics};
use crate::transaction::{NewTransaction, Transaction};

/// Service for assets, their transactions and their performance figures
#[derive(Clone)]
pub struct PortfolioService {
    port: Arc<dyn PortfolioPort>,
    solver: SolverConfig,
}

impl PortfolioService {
    /// Creates a service using the process-wide solver configuration
    pub fn new(port: Arc<dyn PortfolioPort>) -> Self {
        Self {
            port,
            solver: *SolverConfig::global(),
        }
    }

    /// Overrides the solver configuration
    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Solver configuration in use
    pub fn solver_config(&self) -> &SolverConfig {
        &self.solver
    }

    /// Lists the owner's assets with their metrics.
    ///
    /// Each asset's transactions are fetched and evaluated in its own task.
    /// Results come back in listing order. Dropping the returned future
    /// cancels the tasks still in flight. If an asset's feed cannot be read,
    /// that asset is still listed, without metrics; the listing only fails
    /// when the asset list itself cannot be read.
    pub async fn list_with_metrics(&self, owner: UserId) -> Result<Vec<AssetPerformance>, PortfolioError> {
        let assets = self.port.assets_by_owner(owner).await?;
        debug!(owner = %owner, assets = assets.len(), "computing asset metrics");

        // Dropping the set aborts every task still running.
        let mut tasks = JoinSet::new();
        for (index, asset) in assets.iter().enumerate() {
            let port = Arc::clone(&self.port);
            let solver = self.solver;
            let asset_id = asset.id;
            let balance = asset.balance;
            tasks.spawn(async move {
                let outcome = port
                    .transactions_by_asset(asset_id)
                    .await
                    .map(|transactions| returns::compute(balance, &transactions, &solver));
                (index, outcome)
            });
        }

        let mut outcomes: Vec<Option<Result<ReturnMetrics, PortError>>> =
            assets.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(error) => warn!(error = %error, "metrics task failed"),
            }
        }

        let listing = assets
            .into_iter()
            .zip(outcomes)
            .map(|(asset, outcome)| match outcome {
                Some(Ok(metrics)) => AssetPerformance::new(asset, Some(metrics)),
                Some(Err(error)) => {
                    warn!(asset_id = %asset.id, error = %error, "failed to fetch transactions, listing asset without metrics");
                    AssetPerformance::without_metrics(asset)
                }
                None => {
                    warn!(asset_id = %asset.id, "no metrics computed, listing asset without metrics");
                    AssetPerformance::without_metrics(asset)
                }
            })
            .collect();

        Ok(listing)
    }

    /// Single asset with its metrics; fails if the feed cannot be read
    pub async fn asset_with_metrics(
        &self,
        owner: UserId,
        asset_id: AssetId,
    ) -> Result<AssetPerformance, PortfolioError> {
        let asset = self.owned_asset(owner, asset_id).await?;
        let metrics = self.metrics_for(&asset).await?;
        Ok(AssetPerformance::new(asset, Some(metrics)))
    }

    /// Creates an asset with a zero balance
    pub async fn create_asset(&self, owner: UserId, request: NewAsset) -> Result<Asset, PortfolioError> {
        let asset = request.into_asset(owner)?;
        self.port.save_asset(&asset).await?;

        info!(asset_id = %asset.id, owner = %owner, "asset created");
        Ok(asset)
    }

    /// Applies the present fields of `request` to an owned asset
    pub async fn update_asset(
        &self,
        owner: UserId,
        asset_id: AssetId,
        request: UpdateAsset,
    ) -> Result<Asset, PortfolioError> {
        request
            .validate()
            .map_err(|e| PortfolioError::Validation(e.to_string()))?;

        let mut asset = self.owned_asset(owner, asset_id).await?;
        asset.apply(request);
        self.port.save_asset(&asset).await?;

        info!(asset_id = %asset.id, "asset updated");
        Ok(asset)
    }

    /// Deletes an owned asset and all of its transactions
    pub async fn delete_asset(&self, owner: UserId, asset_id: AssetId) -> Result<(), PortfolioError> {
        self.ensure_asset_owner(owner, asset_id).await?;
        self.port.delete_asset(asset_id).await?;

        info!(asset_id = %asset_id, "asset deleted");
        Ok(())
    }

    /// Transactions of an owned asset, oldest first
    pub async fn list_transactions(
        &self,
        owner: UserId,
        asset_id: AssetId,
    ) -> Result<Vec<Transaction>, PortfolioError> {
        self.ensure_asset_owner(owner, asset_id).await?;

        let mut transactions = self.port.transactions_by_asset(asset_id).await?;
        transactions.sort_by_key(|t| t.timestamp);
        Ok(transactions)
    }

    /// Records a transaction and moves the asset balance by its delta.
    ///
    /// Returns the stored transaction and the asset as updated.
    pub async fn record_transaction(
        &self,
        owner: UserId,
        asset_id: AssetId,
        request: NewTransaction,
    ) -> Result<(Transaction, Asset), PortfolioError> {
        request.check()?;
        self.ensure_asset_owner(owner, asset_id).await?;

        let transaction = request.into_transaction(asset_id);
        let asset = self
            .port
            .insert_transaction(&transaction, transaction.balance_delta())
            .await?;

        info!(
            transaction_id = %transaction.id,
            asset_id = %asset_id,
            kind = %transaction.kind,
            balance = %asset.balance,
            "transaction recorded"
        );
        Ok((transaction, asset))
    }

    /// Removes a transaction and reverses its effect on the asset balance
    pub async fn remove_transaction(
        &self,
        owner: UserId,
        transaction_id: TransactionId,
    ) -> Result<Asset, PortfolioError> {
        if !self.port.is_transaction_owned_by(transaction_id, owner).await? {
            return Err(PortfolioError::TransactionNotFound(transaction_id.to_string()));
        }

        let transaction = self
            .port
            .get_transaction(transaction_id)
            .await
            .map_err(|e| transaction_lookup_error(e, transaction_id))?;
        let asset = self
            .port
            .remove_transaction(transaction_id, -transaction.balance_delta())
            .await?;

        info!(
            transaction_id = %transaction_id,
            asset_id = %asset.id,
            balance = %asset.balance,
            "transaction removed"
        );
        Ok(asset)
    }

    async fn metrics_for(&self, asset: &Asset) -> Result<ReturnMetrics, PortfolioError> {
        let transactions = self.port.transactions_by_asset(asset.id).await?;
        Ok(returns::compute(asset.balance, &transactions, &self.solver))
    }

    async fn ensure_asset_owner(&self, owner: UserId, asset_id: AssetId) -> Result<(), PortfolioError> {
        if self.port.is_asset_owned_by(asset_id, owner).await? {
            Ok(())
        } else {
            Err(PortfolioError::AssetNotFound(asset_id.to_string()))
        }
    }

    async fn owned_asset(&self, owner: UserId, asset_id: AssetId) -> Result<Asset, PortfolioError> {
        let asset = self.port.get_asset(asset_id).await.map_err(|e| {
            if e.is_not_found() {
                PortfolioError::AssetNotFound(asset_id.to_string())
            } else {
                PortfolioError::Port(e)
            }
        })?;

        // Someone else's asset is reported as missing.
        if !asset.is_owned_by(owner) {
            return Err(PortfolioError::AssetNotFound(asset_id.to_string()));
        }
        Ok(asset)
    }
}

fn transaction_lookup_error(error: PortError, id: TransactionId) -> PortfolioError {
    if error.is_not_found() {
        PortfolioError::TransactionNotFound(id.to_string())
    } else {
        PortfolioError::Port(error)
    }
}
