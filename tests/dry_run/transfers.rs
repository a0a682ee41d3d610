//! Simulated transfers of the `geo::Point` object

use crate::common::*;
use crate::{dry_run, executor, latest, selection, sent_by, transfer_kind};
use serde_json::json;

#[tokio::test]
async fn test_transfer_is_simulated_not_committed() {
    let chain = chain();
    let point = latest(&chain, POINT).await;
    let kind = transfer_kind(&point, bob());

    let result = dry_run(
        &executor(&chain),
        &kind.to_bytes(),
        sent_by(alice()),
        false,
        selection(json!([
            { "name": "digest" },
            { "name": "sender", "selection": [ { "name": "address" } ] },
            { "name": "gasInput", "selection": [ { "name": "gasPrice" } ] },
            { "name": "effects", "selection": [
                { "name": "status" },
                { "name": "lamportVersion" },
                { "name": "checkpoint", "selection": [ { "name": "sequenceNumber" } ] },
                { "name": "objectChanges", "selection": [
                    { "name": "nodes", "selection": [
                        { "name": "address" },
                        { "name": "inputState", "selection": [ { "name": "version" } ] },
                        { "name": "outputState", "selection": [
                            { "name": "version" },
                            { "name": "owner", "selection": [
                                { "name": "owner", "selection": [ { "name": "address" } ] }
                            ] }
                        ] }
                    ] }
                ] }
            ] }
        ])),
    )
    .await;

    assert_eq!(result.error, None);
    let tx = result.transaction.unwrap().data;
    assert_eq!(tx["digest"], json!(result.digest));
    assert_eq!(tx["sender"]["address"], json!(alice().to_string()));
    // Reference price of the current epoch
    assert_eq!(tx["gasInput"]["gasPrice"], json!("7"));

    let effects = &tx["effects"];
    assert_eq!(effects["status"], json!("SUCCESS"));
    assert_eq!(effects["lamportVersion"], json!("3"));
    assert_eq!(effects["checkpoint"], json!(null));

    let changes = effects["objectChanges"]["nodes"].as_array().unwrap();
    let moved = changes
        .iter()
        .find(|c| c["address"] == json!(point.id.to_string()))
        .unwrap();
    assert_eq!(moved["inputState"]["version"], json!("2"));
    assert_eq!(moved["outputState"]["version"], json!("3"));
    assert_eq!(
        moved["outputState"]["owner"]["owner"]["address"],
        json!(bob().to_string())
    );

    let response = run(
        &chain.resolver(),
        json!([
            { "name": "object", "args": { "address": point.id.to_string() }, "selection": [
                { "name": "version" },
                { "name": "owner", "selection": [
                    { "name": "owner", "selection": [ { "name": "address" } ] }
                ] }
            ] }
        ]),
    )
    .await;
    let stored = &response.data["object"];
    assert_eq!(stored["version"], json!("2"));
    assert_eq!(stored["owner"]["owner"]["address"], json!(alice().to_string()));
}

#[tokio::test]
async fn test_same_kind_gives_same_digest() {
    let chain = chain();
    let executor = executor(&chain);
    let point = latest(&chain, POINT).await;
    let payload = transfer_kind(&point, bob()).to_bytes();

    let first = dry_run(&executor, &payload, sent_by(alice()), false, vec![]).await;
    let second = dry_run(&executor, &payload, sent_by(alice()), false, vec![]).await;
    assert_eq!(first.digest, second.digest);
    assert!(first.transaction.is_none());
}

#[tokio::test]
async fn test_simulated_objects_resolve_through_selection() {
    let chain = chain();
    let point = latest(&chain, POINT).await;

    let result = dry_run(
        &executor(&chain),
        &transfer_kind(&point, bob()).to_bytes(),
        sent_by(alice()),
        false,
        selection(json!([
            { "name": "effects", "selection": [
                { "name": "objectChanges", "selection": [
                    { "name": "nodes", "selection": [
                        { "name": "address" },
                        { "name": "outputState", "selection": [
                            { "name": "asMoveObject", "selection": [
                                { "name": "contents", "selection": [ { "name": "json" } ] }
                            ] }
                        ] }
                    ] }
                ] }
            ] }
        ])),
    )
    .await;

    let tx = result.transaction.unwrap().data;
    let changes = tx["effects"]["objectChanges"]["nodes"].as_array().unwrap();
    let moved = changes
        .iter()
        .find(|c| c["address"] == json!(point.id.to_string()))
        .unwrap();
    assert_eq!(
        moved["outputState"]["asMoveObject"]["contents"]["json"],
        json!({ "id": point.id.to_string(), "x": "2", "y": "1" })
    );
}
