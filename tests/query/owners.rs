//! Owned objects, coins, balances and object filters

use crate::common::*;
use chainql_core::Address;
use serde_json::{json, Value as JsonValue};

fn addresses(nodes: &JsonValue) -> Vec<String> {
    nodes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["address"].as_str().unwrap().to_string())
        .collect()
}

fn ids(bytes: &[u8]) -> Vec<String> {
    bytes.iter().map(|b| Address::from_low_byte(*b).to_string()).collect()
}

#[tokio::test]
async fn test_owned_objects_in_address_order() {
    let chain = chain();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "address", "args": { "address": alice().to_string() }, "selection": [
                { "name": "objects", "selection": [
                    { "name": "nodes", "selection": [ { "name": "address" } ] }
                ] }
            ] }
        ]),
    )
    .await;
    assert_eq!(
        addresses(&response.data["address"]["objects"]["nodes"]),
        ids(&[0x11, 0x12, 0x13, POINT])
    );
}

#[tokio::test]
async fn test_object_filters_narrow_owned_objects() {
    let chain = chain();
    let resolver = chain.resolver();
    let owned = |filter: JsonValue| {
        json!([
            { "name": "address", "args": { "address": alice().to_string() }, "selection": [
                { "name": "objects", "args": { "filter": filter }, "selection": [
                    { "name": "nodes", "selection": [ { "name": "address" } ] }
                ] }
            ] }
        ])
    };

    let coins = run(&resolver, owned(json!({ "type": "0x2::coin::Coin" }))).await;
    assert_eq!(
        addresses(&coins.data["address"]["objects"]["nodes"]),
        ids(&[0x11, 0x12, 0x13])
    );

    let not_coins = run(&resolver, owned(json!({ "not": { "type": "0x2::coin::Coin" } }))).await;
    assert_eq!(addresses(&not_coins.data["address"]["objects"]["nodes"]), ids(&[POINT]));

    let either = run(
        &resolver,
        owned(json!({ "any": [
            { "objectIds": [Address::from_low_byte(0x12).to_string()] },
            { "type": geo_package().to_string() }
        ] })),
    )
    .await;
    assert_eq!(
        addresses(&either.data["address"]["objects"]["nodes"]),
        ids(&[0x12, POINT])
    );
}

#[tokio::test]
async fn test_root_objects_by_type() {
    let chain = chain();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "objects", "args": { "filter": { "type": "0x2::coin::Coin<0x2::sui::SUI>" } }, "selection": [
                { "name": "nodes", "selection": [
                    { "name": "address" },
                    { "name": "owner", "selection": [
                        { "name": "owner", "selection": [ { "name": "address" } ] }
                    ] }
                ] }
            ] }
        ]),
    )
    .await;
    let nodes = &response.data["objects"]["nodes"];
    assert_eq!(addresses(nodes), ids(&[0x11, 0x12, 0x13, BOB_COIN.0]));
    assert_eq!(nodes[3]["owner"]["owner"]["address"], json!(bob().to_string()));
}

#[tokio::test]
async fn test_balance_and_coins() {
    let chain = chain();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "address", "args": { "address": alice().to_string() }, "selection": [
                { "name": "balance", "selection": [
                    { "name": "coinObjectCount" },
                    { "name": "totalBalance" }
                ] },
                { "name": "balances", "selection": [
                    { "name": "nodes", "selection": [
                        { "name": "coinType", "selection": [ { "name": "repr" } ] },
                        { "name": "totalBalance" }
                    ] }
                ] },
                { "name": "coins", "args": { "first": 2 }, "selection": [
                    { "name": "nodes", "selection": [ { "name": "coinBalance" } ] },
                    { "name": "pageInfo", "selection": [ { "name": "hasNextPage" } ] }
                ] }
            ] }
        ]),
    )
    .await;

    let total: u64 = ALICE_COINS.iter().map(|(_, b)| b).sum();
    let address = &response.data["address"];
    assert_eq!(address["balance"]["coinObjectCount"], json!("3"));
    assert_eq!(address["balance"]["totalBalance"], json!(total.to_string()));

    let balances = address["balances"]["nodes"].as_array().unwrap();
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0]["totalBalance"], json!(total.to_string()));

    assert_eq!(
        address["coins"]["nodes"],
        json!([ { "coinBalance": "100" }, { "coinBalance": "250" } ])
    );
    assert_eq!(address["coins"]["pageInfo"]["hasNextPage"], json!(true));
}

#[tokio::test]
async fn test_balance_of_unknown_address_is_zero() {
    let chain = chain();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "address", "args": { "address": "0xdead" }, "selection": [
                { "name": "balance", "selection": [
                    { "name": "coinObjectCount" },
                    { "name": "totalBalance" }
                ] }
            ] }
        ]),
    )
    .await;
    assert_eq!(
        response.data["address"]["balance"],
        json!({ "coinObjectCount": "0", "totalBalance": "0" })
    );
}

#[tokio::test]
async fn test_owner_as_object() {
    let chain = chain();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "owner", "alias": "account", "args": { "address": alice().to_string() }, "selection": [
                { "name": "asObject", "selection": [ { "name": "version" } ] },
                { "name": "asAddress", "selection": [ { "name": "address" } ] }
            ] },
            { "name": "owner", "alias": "point", "args": { "address": Address::from_low_byte(POINT).to_string() }, "selection": [
                { "name": "asObject", "selection": [ { "name": "version" } ] }
            ] }
        ]),
    )
    .await;
    assert_eq!(response.data["account"]["asObject"], json!(null));
    assert_eq!(
        response.data["account"]["asAddress"]["address"],
        json!(alice().to_string())
    );
    assert_eq!(response.data["point"]["asObject"]["version"], json!("2"));
}
