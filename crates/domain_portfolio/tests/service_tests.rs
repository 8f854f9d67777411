//! Portfolio Service Tests
//!
//! Runs `PortfolioService` against the in-memory `MockPortfolioPort`.
//!
//! # Test Organization
//!
//! - `listing` - Metrics attached to every asset, order and degradation
//! - `asset_management` - Create, update and delete with ownership checks
//! - `ledger` - Recording and removing transactions moves the balance
//! - `wire_format` - JSON shape of a listed asset

use std::sync::Arc;
use std::time::Duration;

use core_kernel::{AssetId, TransactionId, UserId};
use domain_portfolio::{
    Asset, MockPortfolioPort, NewAsset, PortfolioError, PortfolioPort, PortfolioService,
    SolverConfig, TransactionKind, UpdateAsset,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use test_utils::{
    assert_profit_eq, assert_rate_approx_eq, init_test_tracing, AssetBuilder, AssetFixtures,
    HistoryFixtures, TransactionBuilder,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

async fn setup(assets: Vec<Asset>) -> (PortfolioService, Arc<MockPortfolioPort>) {
    init_test_tracing();
    let port = Arc::new(MockPortfolioPort::with_assets(assets).await);
    let service = PortfolioService::new(port.clone()).with_solver_config(SolverConfig::default());
    (service, port)
}

// ============================================================================
// LISTING
// ============================================================================

mod listing {
    use super::*;

    #[tokio::test]
    async fn test_metrics_attached_in_listing_order() {
        let owner = UserId::new();
        let first = AssetBuilder::new(owner).name("First").build();
        let second = AssetBuilder::new(owner).name("Second").balance(dec!(50)).build();
        let third = AssetBuilder::new(owner).name("Third").build();

        let port = MockPortfolioPort::with_assets(vec![first.clone(), second.clone(), third.clone()])
            .await
            .with_transactions(HistoryFixtures::ten_percent_year(first.id))
            .await;
        let service = PortfolioService::new(Arc::new(port)).with_solver_config(SolverConfig::default());

        let listing = service.list_with_metrics(owner).await.unwrap();

        let names: Vec<&str> = listing.iter().map(|p| p.asset.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);

        let first_metrics = listing[0].metrics.unwrap();
        assert_profit_eq(&first_metrics, dec!(10));
        assert_rate_approx_eq(first_metrics.xirr, 0.10, 1e-6);

        let second_metrics = listing[1].metrics.unwrap();
        assert_profit_eq(&second_metrics, dec!(50));
        assert!(second_metrics.xirr.is_none());
    }

    #[tokio::test]
    async fn test_only_owner_assets_listed() {
        let owner = UserId::new();
        let mine = AssetFixtures::savings(owner);
        let theirs = AssetFixtures::savings(UserId::new());

        let (service, _) = setup(vec![mine.clone(), theirs]).await;

        let listing = service.list_with_metrics(owner).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].asset.id, mine.id);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_one_asset() {
        let owner = UserId::new();
        let healthy = AssetFixtures::brokerage(owner, dec!(0));
        let flaky = AssetFixtures::brokerage(owner, dec!(700));

        let port = MockPortfolioPort::with_assets(vec![flaky.clone(), healthy.clone()])
            .await
            .with_transactions(HistoryFixtures::ten_percent_year(healthy.id))
            .await;
        port.fail_transactions_for(flaky.id).await;
        init_test_tracing();
        let service = PortfolioService::new(Arc::new(port)).with_solver_config(SolverConfig::default());

        let listing = service.list_with_metrics(owner).await.unwrap();

        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].asset.id, flaky.id);
        assert!(listing[0].metrics.is_none());
        assert_eq!(listing[0].asset.balance, dec!(700));
        assert!(listing[1].metrics.is_some());
    }

    #[tokio::test]
    async fn test_dropped_listing_cancels_pending_fetches() {
        let owner = UserId::new();
        let stuck = AssetFixtures::savings(owner);
        let quick = AssetFixtures::brokerage(owner, dec!(0));
        let (service, port) = setup(vec![stuck.clone(), quick]).await;
        port.stall_transactions_for(stuck.id).await;

        let listing = tokio::time::timeout(Duration::from_millis(50), service.list_with_metrics(owner)).await;
        assert!(listing.is_err());

        for _ in 0..100 {
            if port.fetches_in_flight() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(port.fetches_in_flight(), 0);
    }

    #[tokio::test]
    async fn test_single_asset_fetch_failure_is_an_error() {
        let owner = UserId::new();
        let flaky = AssetFixtures::savings(owner);
        let (service, port) = setup(vec![flaky.clone()]).await;
        port.fail_transactions_for(flaky.id).await;

        let result = service.asset_with_metrics(owner, flaky.id).await;

        match result {
            Err(PortfolioError::Port(error)) => assert!(error.is_transient()),
            other => panic!("Expected port error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let (service, _) = setup(vec![]).await;
        assert!(service.list_with_metrics(UserId::new()).await.unwrap().is_empty());
    }
}

// ============================================================================
// ASSET MANAGEMENT
// ============================================================================

mod asset_management {
    use super::*;

    #[tokio::test]
    async fn test_create_asset_validates_name() {
        let (service, _) = setup(vec![]).await;

        let result = service.create_asset(UserId::new(), NewAsset::new("", "savings")).await;

        assert!(matches!(result, Err(PortfolioError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_asset_applies_present_fields() {
        let owner = UserId::new();
        let asset = AssetBuilder::new(owner).name("Old name").balance(dec!(10)).build();
        let (service, port) = setup(vec![asset.clone()]).await;

        let updated = service
            .update_asset(
                owner,
                asset.id,
                UpdateAsset {
                    name: Some("New name".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "New name");
        assert_eq!(updated.balance, dec!(10));
        assert_eq!(port.get_asset(asset.id).await.unwrap().name, "New name");
    }

    #[tokio::test]
    async fn test_update_asset_balance_override() {
        let owner = UserId::new();
        let asset = AssetFixtures::brokerage(owner, dec!(100));
        let (service, _) = setup(vec![asset.clone()]).await;

        let updated = service
            .update_asset(
                owner,
                asset.id,
                UpdateAsset {
                    balance: Some(dec!(1234.56)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.balance, dec!(1234.56));
    }

    #[tokio::test]
    async fn test_update_foreign_asset_rejected() {
        let asset = AssetFixtures::savings(UserId::new());
        let (service, _) = setup(vec![asset.clone()]).await;

        let result = service
            .update_asset(UserId::new(), asset.id, UpdateAsset::default())
            .await;

        assert!(matches!(result, Err(PortfolioError::AssetNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_empty_name() {
        let owner = UserId::new();
        let asset = AssetFixtures::savings(owner);
        let (service, _) = setup(vec![asset.clone()]).await;

        let result = service
            .update_asset(
                owner,
                asset.id,
                UpdateAsset {
                    name: Some(String::new()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(PortfolioError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_asset_removes_transactions() {
        let owner = UserId::new();
        let asset = AssetFixtures::savings(owner);
        let (service, port) = setup(vec![asset.clone()]).await;
        service
            .record_transaction(
                owner,
                asset.id,
                TransactionBuilder::new(asset.id).build_request(),
            )
            .await
            .unwrap();

        service.delete_asset(owner, asset.id).await.unwrap();

        assert_eq!(port.transaction_count().await, 0);
        assert!(service.list_with_metrics(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_foreign_asset_rejected() {
        let asset = AssetFixtures::savings(UserId::new());
        let (service, port) = setup(vec![asset.clone()]).await;

        let result = service.delete_asset(UserId::new(), asset.id).await;

        assert!(matches!(result, Err(PortfolioError::AssetNotFound(_))));
        assert!(port.get_asset(asset.id).await.is_ok());
    }
}

// ============================================================================
// LEDGER
// ============================================================================

mod ledger {
    use super::*;

    async fn record(
        service: &PortfolioService,
        owner: UserId,
        asset_id: AssetId,
        kind: TransactionKind,
        amount: Decimal,
        day: i64,
    ) -> Result<Asset, PortfolioError> {
        let request = TransactionBuilder::new(asset_id)
            .kind(kind)
            .amount(amount)
            .on_day(day)
            .build_request();
        service
            .record_transaction(owner, asset_id, request)
            .await
            .map(|(_, asset)| asset)
    }

    #[tokio::test]
    async fn test_balance_follows_each_kind() {
        let owner = UserId::new();
        let asset = AssetFixtures::brokerage(owner, dec!(0));
        let (service, _) = setup(vec![asset.clone()]).await;

        let cases = [
            (TransactionKind::Deposit, dec!(1000), dec!(1000)),
            (TransactionKind::Buy, dec!(200), dec!(1000)),
            (TransactionKind::Sell, dec!(50), dec!(1000)),
            (TransactionKind::Dividend, dec!(30), dec!(1000)),
            (TransactionKind::Revaluation, dec!(-75), dec!(925)),
            (TransactionKind::Withdrawal, dec!(25), dec!(900)),
        ];

        for (day, (kind, amount, expected)) in cases.into_iter().enumerate() {
            let updated = record(&service, owner, asset.id, kind, amount, day as i64).await.unwrap();
            assert_eq!(updated.balance, expected, "after {}", kind);
        }
    }

    #[tokio::test]
    async fn test_buying_with_deposited_cash_makes_no_profit() {
        let owner = UserId::new();
        let asset = AssetFixtures::brokerage(owner, dec!(0));
        let (service, _) = setup(vec![asset.clone()]).await;

        record(&service, owner, asset.id, TransactionKind::Deposit, dec!(1000), 0).await.unwrap();
        let after_buy = record(&service, owner, asset.id, TransactionKind::Buy, dec!(1000), 1)
            .await
            .unwrap();
        assert_eq!(after_buy.balance, dec!(1000));

        let performance = service.asset_with_metrics(owner, asset.id).await.unwrap();
        assert_profit_eq(&performance.metrics.unwrap(), dec!(0));
    }

    #[tokio::test]
    async fn test_removing_a_sell_leaves_balance() {
        let owner = UserId::new();
        let asset = AssetFixtures::brokerage(owner, dec!(400));
        let (service, _) = setup(vec![asset.clone()]).await;

        let (sell, after_sell) = service
            .record_transaction(
                owner,
                asset.id,
                TransactionBuilder::new(asset.id)
                    .kind(TransactionKind::Sell)
                    .amount(dec!(150))
                    .build_request(),
            )
            .await
            .unwrap();
        assert_eq!(after_sell.balance, dec!(400));

        let after_remove = service.remove_transaction(owner, sell.id).await.unwrap();
        assert_eq!(after_remove.balance, dec!(400));
    }

    #[tokio::test]
    async fn test_remove_reverses_delta() {
        let owner = UserId::new();
        let asset = AssetFixtures::brokerage(owner, dec!(500));
        let (service, _) = setup(vec![asset.clone()]).await;

        let (withdrawal, after_record) = service
            .record_transaction(
                owner,
                asset.id,
                TransactionBuilder::new(asset.id)
                    .kind(TransactionKind::Withdrawal)
                    .amount(dec!(120))
                    .build_request(),
            )
            .await
            .unwrap();
        assert_eq!(after_record.balance, dec!(380));

        let after_remove = service.remove_transaction(owner, withdrawal.id).await.unwrap();
        assert_eq!(after_remove.balance, dec!(500));
        assert!(service.list_transactions(owner, asset.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negative_deposit_rejected_without_side_effects() {
        let owner = UserId::new();
        let asset = AssetFixtures::brokerage(owner, dec!(10));
        let (service, port) = setup(vec![asset.clone()]).await;

        let result = record(&service, owner, asset.id, TransactionKind::Deposit, dec!(-5), 0).await;

        assert!(matches!(result, Err(PortfolioError::Validation(_))));
        assert_eq!(port.get_asset(asset.id).await.unwrap().balance, dec!(10));
        assert_eq!(port.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn test_record_on_foreign_asset_rejected() {
        let asset = AssetFixtures::savings(UserId::new());
        let (service, port) = setup(vec![asset.clone()]).await;

        let result = record(&service, UserId::new(), asset.id, TransactionKind::Deposit, dec!(5), 0).await;

        assert!(matches!(result, Err(PortfolioError::AssetNotFound(_))));
        assert_eq!(port.transaction_count().await, 0);
    }

    #[tokio::test]
    async fn test_remove_foreign_transaction_rejected() {
        let owner = UserId::new();
        let asset = AssetFixtures::savings(owner);
        let (service, _) = setup(vec![asset.clone()]).await;
        let (transaction, _) = service
            .record_transaction(owner, asset.id, TransactionBuilder::new(asset.id).build_request())
            .await
            .unwrap();

        let result = service.remove_transaction(UserId::new(), transaction.id).await;

        assert!(matches!(result, Err(PortfolioError::TransactionNotFound(_))));
        assert_eq!(service.list_transactions(owner, asset.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_transaction() {
        let (service, _) = setup(vec![]).await;

        let result = service.remove_transaction(UserId::new(), TransactionId::new()).await;

        assert!(matches!(result, Err(PortfolioError::TransactionNotFound(_))));
    }

    #[tokio::test]
    async fn test_transactions_listed_oldest_first() {
        let owner = UserId::new();
        let asset = AssetFixtures::brokerage(owner, dec!(0));
        let (service, _) = setup(vec![asset.clone()]).await;

        for day in [30, 0, 15] {
            record(&service, owner, asset.id, TransactionKind::Deposit, dec!(1), day)
                .await
                .unwrap();
        }

        let transactions = service.list_transactions(owner, asset.id).await.unwrap();
        let timestamps: Vec<_> = transactions.iter().map(|t| t.timestamp).collect();
        let mut sorted = timestamps.clone();
        sorted.sort();
        assert_eq!(timestamps, sorted);
    }

    #[tokio::test]
    async fn test_recorded_history_feeds_metrics() {
        let owner = UserId::new();
        let asset = AssetFixtures::brokerage(owner, dec!(0));
        let (service, _) = setup(vec![asset.clone()]).await;

        record(&service, owner, asset.id, TransactionKind::Deposit, dec!(100), 0).await.unwrap();
        record(&service, owner, asset.id, TransactionKind::Revaluation, dec!(10), 365)
            .await
            .unwrap();

        let performance = service.asset_with_metrics(owner, asset.id).await.unwrap();
        let metrics = performance.metrics.unwrap();

        // balance 110 - deposits 100
        assert_profit_eq(&metrics, dec!(10));
        assert_eq!(performance.asset.balance, dec!(110));
    }
}

// ============================================================================
// WIRE FORMAT
// ============================================================================

mod wire_format {
    use super::*;

    #[tokio::test]
    async fn test_listed_asset_json_shape() {
        let owner = UserId::new();
        let solved = AssetFixtures::brokerage(owner, dec!(0));
        let unsolved = AssetFixtures::savings(owner);

        let port = MockPortfolioPort::with_assets(vec![solved.clone(), unsolved.clone()])
            .await
            .with_transactions(HistoryFixtures::ten_percent_year(solved.id))
            .await;
        let service = PortfolioService::new(Arc::new(port)).with_solver_config(SolverConfig::default());

        let listing = service.list_with_metrics(owner).await.unwrap();
        let json = serde_json::to_value(&listing).unwrap();

        let first = &json[0];
        assert_eq!(first["name"], "Brokerage");
        assert_eq!(first["type"], "brokerage");
        assert_eq!(first["profit"], serde_json::json!(10.0));
        assert!(first["xirr"].as_f64().is_some());
        assert!(first["apy"].as_f64().is_some());
        assert!(first["apr"].as_f64().is_some());

        let second = &json[1];
        assert_eq!(second["profit"], serde_json::json!(0.0));
        assert!(second.get("xirr").is_none());
        assert!(second.get("apy").is_none());
        assert!(second.get("apr").is_none());
    }

    #[tokio::test]
    async fn test_degraded_asset_has_no_metric_fields() {
        let owner = UserId::new();
        let asset = AssetFixtures::savings(owner);
        let (service, port) = setup(vec![asset.clone()]).await;
        port.fail_transactions_for(asset.id).await;

        let listing = service.list_with_metrics(owner).await.unwrap();
        let json = serde_json::to_value(&listing[0]).unwrap();

        assert!(json.get("profit").is_none());
        assert!(json.get("xirr").is_none());
        assert_eq!(json["balance"], serde_json::json!(0.0));
    }
}
