//! Checkpoints, epochs and transactions

use crate::common::*;
use chainql_core::Digest;
use serde_json::{json, Value as JsonValue};

fn digests(nodes: &JsonValue) -> Vec<String> {
    nodes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["digest"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_latest_checkpoint() {
    let chain = chain();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "checkpoint", "selection": [
                { "name": "sequenceNumber" },
                { "name": "timestamp" },
                { "name": "previousCheckpointDigest" },
                { "name": "networkTotalTransactions" },
                { "name": "epoch", "selection": [ { "name": "epochId" } ] }
            ] }
        ]),
    )
    .await;

    let cp = &response.data["checkpoint"];
    assert_eq!(cp["sequenceNumber"], json!("3"));
    assert_eq!(cp["timestamp"], json!("2023-11-14T22:13:23.000Z"));
    assert_eq!(
        cp["previousCheckpointDigest"],
        json!(Digest::of(b"checkpoint-2").to_string())
    );
    assert_eq!(cp["networkTotalTransactions"], json!("3"));
    assert_eq!(cp["epoch"]["epochId"], json!("1"));
}

#[tokio::test]
async fn test_epochs_bound_their_checkpoints() {
    let chain = chain();
    let checkpoints = json!([
        { "name": "epochId" },
        { "name": "referenceGasPrice" },
        { "name": "checkpoints", "selection": [
            { "name": "nodes", "selection": [ { "name": "sequenceNumber" } ] }
        ] }
    ]);
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "epoch", "alias": "first", "args": { "id": 0 }, "selection": checkpoints },
            { "name": "epoch", "alias": "current", "selection": checkpoints }
        ]),
    )
    .await;

    let first = &response.data["first"];
    assert_eq!(first["referenceGasPrice"], json!("5"));
    assert_eq!(
        first["checkpoints"]["nodes"],
        json!([ { "sequenceNumber": "0" }, { "sequenceNumber": "1" } ])
    );
    let current = &response.data["current"];
    assert_eq!(current["epochId"], json!("1"));
    assert_eq!(
        current["checkpoints"]["nodes"],
        json!([ { "sequenceNumber": "2" }, { "sequenceNumber": "3" } ])
    );
}

#[tokio::test]
async fn test_transaction_block_by_digest() {
    let chain = chain();
    let digest = chain.transactions[0].to_string();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "transactionBlock", "args": { "digest": digest }, "selection": [
                { "name": "digest" },
                { "name": "kind" },
                { "name": "sender", "selection": [ { "name": "address" } ] },
                { "name": "gasInput", "selection": [
                    { "name": "gasBudget" },
                    { "name": "gasPayment", "selection": [ { "name": "address" } ] }
                ] },
                { "name": "effects", "selection": [
                    { "name": "status" },
                    { "name": "errors" },
                    { "name": "lamportVersion" },
                    { "name": "gasSummary", "selection": [ { "name": "computationCost" } ] },
                    { "name": "checkpoint", "selection": [ { "name": "sequenceNumber" } ] }
                ] }
            ] }
        ]),
    )
    .await;

    let tx = &response.data["transactionBlock"];
    assert_eq!(tx["digest"], json!(digest));
    assert_eq!(tx["kind"], json!("PROGRAMMABLE_TX"));
    assert_eq!(tx["sender"]["address"], json!(alice().to_string()));
    assert_eq!(tx["gasInput"]["gasBudget"], json!("5000"));
    assert_eq!(tx["gasInput"]["gasPayment"].as_array().unwrap().len(), 1);
    let effects = &tx["effects"];
    assert_eq!(effects["status"], json!("SUCCESS"));
    assert_eq!(effects["errors"], json!(null));
    assert_eq!(effects["lamportVersion"], json!("2"));
    assert_eq!(effects["gasSummary"]["computationCost"], json!("1000"));
    assert_eq!(effects["checkpoint"]["sequenceNumber"], json!("1"));
}

#[tokio::test]
async fn test_transaction_scopes() {
    let chain = chain();
    let nodes = json!([ { "name": "nodes", "selection": [ { "name": "digest" } ] } ]);
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "transactionBlocks", "alias": "all", "selection": nodes },
            { "name": "transactionBlocks", "alias": "fromBob", "args": { "filter": { "sentAddress": bob().to_string() } }, "selection": nodes },
            { "name": "checkpoint", "args": { "sequenceNumber": 2 }, "selection": [
                { "name": "transactionBlocks", "selection": nodes }
            ] },
            { "name": "address", "args": { "address": alice().to_string() }, "selection": [
                { "name": "transactionBlocks", "args": { "filter": { "afterCheckpoint": 1 } }, "selection": nodes }
            ] }
        ]),
    )
    .await;

    let all: Vec<String> = chain.transactions.iter().map(|d| d.to_string()).collect();
    assert_eq!(digests(&response.data["all"]["nodes"]), all);
    assert_eq!(digests(&response.data["fromBob"]["nodes"]), vec![all[2].clone()]);
    assert_eq!(
        digests(&response.data["checkpoint"]["transactionBlocks"]["nodes"]),
        vec![all[1].clone()]
    );
    assert_eq!(
        digests(&response.data["address"]["transactionBlocks"]["nodes"]),
        vec![all[1].clone()]
    );
}

#[tokio::test]
async fn test_pinned_checkpoint_hides_later_transactions() {
    let chain = chain();
    let digest = chain.transactions[2].to_string();
    let response = run_at(
        &chain.resolver(),
        json!([
            { "name": "transactionBlock", "args": { "digest": digest }, "selection": [ { "name": "digest" } ] },
            { "name": "checkpoint", "selection": [ { "name": "sequenceNumber" } ] }
        ]),
        Some(1),
    )
    .await;
    assert_eq!(response.data["transactionBlock"], json!(null));
    assert_eq!(response.data["checkpoint"]["sequenceNumber"], json!("1"));
}
