//! Cursors only resume the connection that issued them

use crate::common::*;
use crate::{args, objects_page};
use chainql_core::ChainqlError;
use chainql_engine::Query;
use serde_json::{json, Value as JsonValue};

async fn rejection(chain: &Chain, query: JsonValue) -> ChainqlError {
    let query = Query::from_json(query).unwrap();
    chain.resolver().execute(&query, None).await.unwrap_err()
}

fn owned_objects(filter: JsonValue, after: JsonValue) -> JsonValue {
    json!([
        { "name": "address", "args": { "address": alice().to_string() }, "selection": [
            { "name": "objects", "args": { "filter": filter, "after": after }, "selection": [
                { "name": "nodes", "selection": [ { "name": "address" } ] }
            ] }
        ] }
    ])
}

#[tokio::test]
async fn test_cursor_from_another_connection_is_rejected() {
    let chain = chain();
    let (_, info) = objects_page(&chain.resolver(), args(&[("first", json!(2))])).await;
    let cursor = info["endCursor"].clone();

    let err = rejection(&chain, owned_objects(json!({}), cursor)).await;
    assert!(matches!(err, ChainqlError::InvalidCursor(_)), "{}", err);
    assert_eq!(err.code(), "INVALID_CURSOR");
}

#[tokio::test]
async fn test_cursor_from_another_filter_is_rejected() {
    let chain = chain();
    let resolver = chain.resolver();
    let coins = json!({ "type": "0x2::coin::Coin" });

    let response = run(
        &resolver,
        json!([
            { "name": "address", "args": { "address": alice().to_string() }, "selection": [
                { "name": "objects", "args": { "filter": coins.clone(), "first": 1 }, "selection": [
                    { "name": "pageInfo", "selection": [ { "name": "endCursor" } ] }
                ] }
            ] }
        ]),
    )
    .await;
    let cursor = response.data["address"]["objects"]["pageInfo"]["endCursor"].clone();

    // Same filter resumes
    let resumed = run(&resolver, owned_objects(coins, cursor.clone())).await;
    assert_eq!(
        resumed.data["address"]["objects"]["nodes"].as_array().unwrap().len(),
        ALICE_COINS.len() - 1
    );

    let err = rejection(&chain, owned_objects(json!({ "type": "0x2::coin" }), cursor)).await;
    assert_eq!(err.code(), "INVALID_CURSOR");
}

#[tokio::test]
async fn test_page_size_is_not_part_of_the_cursor() {
    let chain = chain();
    let resolver = chain.resolver();
    let (_, info) = objects_page(&resolver, args(&[("first", json!(1))])).await;

    let (rest, _) = objects_page(
        &resolver,
        args(&[("first", json!(4)), ("after", info["endCursor"].clone())]),
    )
    .await;
    assert_eq!(rest.len(), 4);
}

#[tokio::test]
async fn test_malformed_cursors() {
    let chain = chain();
    for cursor in ["", "@@@", "AAAA"] {
        let query = json!([
            { "name": "objects", "args": { "after": cursor }, "selection": [
                { "name": "nodes", "selection": [ { "name": "address" } ] }
            ] }
        ]);
        let err = rejection(&chain, query).await;
        assert_eq!(err.code(), "INVALID_CURSOR", "cursor {:?} gave {}", cursor, err);
    }
}

#[tokio::test]
async fn test_nested_connections_paginate_independently() {
    let chain = chain();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "checkpoints", "args": { "first": 1 }, "selection": [
                { "name": "nodes", "selection": [
                    { "name": "sequenceNumber" },
                    { "name": "transactionBlocks", "args": { "first": 1 }, "selection": [
                        { "name": "pageInfo", "selection": [ { "name": "hasNextPage" } ] }
                    ] }
                ] },
                { "name": "pageInfo", "selection": [ { "name": "hasNextPage" } ] }
            ] }
        ]),
    )
    .await;
    let connection = &response.data["checkpoints"];
    assert_eq!(connection["nodes"][0]["sequenceNumber"], json!("0"));
    assert_eq!(
        connection["nodes"][0]["transactionBlocks"]["pageInfo"]["hasNextPage"],
        json!(false)
    );
    assert_eq!(connection["pageInfo"]["hasNextPage"], json!(true));
}
