//! Feature gates and payload limits, enforced before any decoding.

use super::{encode, executor, executor_with, seeded_store, transfer_kind};
use crate::{Command, Error, Executor, Output, ServiceConfig};
use chainql_engine::Feature;
use chainql_simulator::TransactionMetadata;

fn dry_run(tx_bytes: String) -> Command {
    Command::DryRun {
        tx_bytes,
        tx_meta: Some(TransactionMetadata::default()),
        skip_checks: false,
        selection: vec![],
    }
}

#[tokio::test]
async fn test_disabled_feature_wins_over_garbage_payload() {
    let mut config = ServiceConfig::default();
    config.enabled_features.remove(&Feature::DryRun);
    let (executor, _) = executor_with(config);

    let err = executor.execute(dry_run("not base64 at all".into())).await.unwrap_err();
    assert_eq!(
        err,
        Error::FeatureDisabled {
            feature: "dry-run".into()
        }
    );
}

#[tokio::test]
async fn test_payload_limit_checked_before_decoding() {
    let mut config = ServiceConfig::default();
    config.limits.max_transaction_payload_size = 8;
    let (executor, _) = executor_with(config);

    let err = executor.execute(dry_run("!".repeat(9))).await.unwrap_err();
    assert_eq!(err, Error::PayloadTooLarge { size: 9, max: 8 });
    assert_eq!(err.code(), "BAD_USER_INPUT");
}

#[tokio::test]
async fn test_malformed_payloads() {
    let (executor, _) = executor();
    let err = executor.execute(dry_run("%%%".into())).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }));

    let err = executor.execute(dry_run(encode(&[0xff; 3]))).await.unwrap_err();
    match err {
        Error::InvalidInput { reason } => assert!(reason.contains("malformed binary payload")),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_engine_is_internal() {
    let (store, coin) = seeded_store();
    let executor = Executor::new(store, ServiceConfig::default());
    let err = executor
        .execute(dry_run(encode(&transfer_kind(&coin).to_bytes())))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ExecutionUnavailable { .. }));
    assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
}

#[tokio::test]
async fn test_service_config_is_reported() {
    let mut config = ServiceConfig::default();
    config.limits.max_page_size = 7;
    config.limits.default_page_size = 5;
    let (executor, _) = executor_with(config.clone());

    match executor.execute(Command::ServiceConfig).await.unwrap() {
        Output::ServiceConfig(reported) => assert_eq!(reported, config),
        other => panic!("Expected ServiceConfig, got {:?}", other),
    }
}
