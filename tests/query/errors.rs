//! Whole-request rejection versus field-level errors

use crate::common::*;
use chainql_core::{ChainqlError, ChainqlResult};
use chainql_engine::{EngineConfig, Feature, PathSegment, Query, QueryResponse, Resolver};
use serde_json::{json, Value as JsonValue};

async fn attempt(resolver: &Resolver, query: JsonValue, checkpoint: Option<u64>) -> ChainqlResult<QueryResponse> {
    resolver.execute(&Query::from_json(query)?, checkpoint).await
}

#[tokio::test]
async fn test_schema_violations_are_bad_input() {
    let chain = chain();
    let resolver = chain.resolver();
    let cases = [
        json!([ { "name": "teleport" } ]),
        json!([ { "name": "object", "args": { "address": "0x31", "colour": "red" }, "selection": [ { "name": "version" } ] } ]),
        json!([ { "name": "object", "args": { "address": "0x31" } } ]),
        json!([ { "name": "object", "args": { "address": "not-hex" }, "selection": [ { "name": "version" } ] } ]),
        json!([ { "name": "objects", "args": { "first": 1, "last": 1 }, "selection": [ { "name": "nodes", "selection": [ { "name": "version" } ] } ] } ]),
        json!([ { "name": "objects", "args": { "filter": { "colour": "red" } }, "selection": [ { "name": "nodes", "selection": [ { "name": "version" } ] } ] } ]),
    ];
    for query in cases {
        let err = attempt(&resolver, query.clone(), None).await.unwrap_err();
        assert_eq!(err.code(), "BAD_USER_INPUT", "{} gave {}", query, err);
    }
}

#[tokio::test]
async fn test_limits_reject_before_resolution() {
    let chain = chain();
    let mut config = EngineConfig::default();
    config.limits.max_query_depth = 2;
    let resolver = chain.resolver_with(config);

    let deep = json!([
        { "name": "object", "args": { "address": "0x31" }, "selection": [
            { "name": "owner", "selection": [ { "name": "kind" } ] }
        ] }
    ]);
    let err = attempt(&resolver, deep, None).await.unwrap_err();
    assert!(matches!(err, ChainqlError::QueryTooComplex { .. }), "{}", err);

    let wide_page = json!([
        { "name": "objects", "args": { "first": 51 }, "selection": [
            { "name": "pageInfo", "selection": [ { "name": "hasNextPage" } ] }
        ] }
    ]);
    let err = attempt(&chain.resolver(), wide_page, None).await.unwrap_err();
    assert_eq!(err.code(), "QUERY_TOO_COMPLEX");
}

#[tokio::test]
async fn test_disabled_feature_rejects_query() {
    let chain = chain();
    let mut config = EngineConfig::default();
    config.features.remove(&Feature::Coins);
    let resolver = chain.resolver_with(config);

    let err = attempt(
        &resolver,
        json!([
            { "name": "address", "args": { "address": alice().to_string() }, "selection": [
                { "name": "balance", "selection": [ { "name": "totalBalance" } ] }
            ] }
        ]),
        None,
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ChainqlError::FeatureDisabled {
            feature: "coins".into()
        }
    );

    let response = run(
        &resolver,
        json!([
            { "name": "serviceConfig", "selection": [
                { "name": "isEnabled", "args": { "feature": "coins" } },
                { "name": "isEnabled", "alias": "dryRun", "args": { "feature": "dry-run" } }
            ] }
        ]),
    )
    .await;
    assert_eq!(response.data["serviceConfig"]["isEnabled"], json!(false));
    assert_eq!(response.data["serviceConfig"]["dryRun"], json!(true));
}

#[tokio::test]
async fn test_unknown_type_argument() {
    let chain = chain();
    let err = attempt(
        &chain.resolver(),
        json!([
            { "name": "type", "args": { "type": format!("{}::geo::Line", geo_package()) }, "selection": [
                { "name": "layout" }
            ] }
        ]),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ChainqlError::UnknownType { .. }), "{}", err);
}

#[tokio::test]
async fn test_pruned_data_is_a_field_error() {
    let chain = chain();
    chain.store.prune_checkpoints(2);
    let resolver = chain.resolver();

    let response = run(
        &resolver,
        json!([
            { "name": "checkpoint", "alias": "old", "args": { "sequenceNumber": 1 }, "selection": [ { "name": "digest" } ] },
            { "name": "checkpoint", "alias": "latest", "selection": [ { "name": "sequenceNumber" } ] }
        ]),
    )
    .await;
    assert_eq!(response.data["old"], json!(null));
    assert_eq!(response.data["latest"]["sequenceNumber"], json!("3"));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].code, "DATA_UNAVAILABLE");
    assert_eq!(response.errors[0].path, vec![PathSegment::Key("old".into())]);

    // Pinning below the retained range fails the whole request
    let err = attempt(
        &resolver,
        json!([ { "name": "checkpoint", "selection": [ { "name": "digest" } ] } ]),
        Some(1),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "DATA_UNAVAILABLE");
}

#[tokio::test]
async fn test_pruned_transactions_are_field_errors() {
    let chain = chain();
    chain.store.prune_checkpoints(2);
    let resolver = chain.resolver();
    let digest = |i: usize| chain.transactions[i].to_string();
    let digests = json!([ { "name": "nodes", "selection": [ { "name": "digest" } ] } ]);

    let response = run(
        &resolver,
        json!([
            { "name": "transactionBlock", "args": { "digest": digest(0) }, "selection": [ { "name": "digest" } ] },
            { "name": "transactionBlock", "alias": "kept", "args": { "digest": digest(1) }, "selection": [ { "name": "digest" } ] },
            { "name": "transactionBlocks", "alias": "recent", "args": { "last": 1 }, "selection": digests },
            { "name": "transactionBlocks", "alias": "oldest", "args": { "first": 1 }, "selection": digests },
            { "name": "checkpoints", "args": { "last": 5 }, "selection": [
                { "name": "nodes", "selection": [ { "name": "sequenceNumber" } ] }
            ] }
        ]),
    )
    .await;

    assert_eq!(response.data["transactionBlock"], json!(null));
    assert_eq!(response.data["kept"]["digest"], json!(digest(1)));
    assert_eq!(response.data["recent"]["nodes"], json!([ { "digest": digest(2) } ]));
    assert_eq!(response.data["oldest"], json!(null));
    assert_eq!(response.data["checkpoints"], json!(null));

    let mut paths: Vec<Vec<PathSegment>> = response.errors.iter().map(|e| e.path.clone()).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            vec![PathSegment::Key("checkpoints".into())],
            vec![PathSegment::Key("oldest".into())],
            vec![PathSegment::Key("transactionBlock".into())],
        ]
    );
    assert!(response.errors.iter().all(|e| e.code == "DATA_UNAVAILABLE"));
}
