//! Forward and backward traversal

use crate::common::*;
use crate::{args, objects_page};
use chainql_core::Address;
use serde_json::{json, Value as JsonValue};

/// Every live object of the fixture chain, in address order
pub fn all_objects() -> Vec<String> {
    [0x02, 0x11, 0x12, 0x13, BOB_COIN.0, POINT, 0xc0]
        .iter()
        .map(|b| Address::from_low_byte(*b).to_string())
        .collect()
}

#[tokio::test]
async fn test_forward_walk() {
    let chain = chain();
    let resolver = chain.resolver();
    let all = all_objects();

    let (first, info) = objects_page(&resolver, args(&[("first", json!(3))])).await;
    assert_eq!(first, all[0..3]);
    assert_eq!(info["hasNextPage"], json!(true));
    assert_eq!(info["hasPreviousPage"], json!(false));

    let (second, info) = objects_page(
        &resolver,
        args(&[("first", json!(3)), ("after", info["endCursor"].clone())]),
    )
    .await;
    assert_eq!(second, all[3..6]);
    assert_eq!(info["hasNextPage"], json!(true));
    assert_eq!(info["hasPreviousPage"], json!(true));

    let (third, info) = objects_page(
        &resolver,
        args(&[("first", json!(3)), ("after", info["endCursor"].clone())]),
    )
    .await;
    assert_eq!(third, all[6..]);
    assert_eq!(info["hasNextPage"], json!(false));
}

#[tokio::test]
async fn test_backward_walk_keeps_natural_order() {
    let chain = chain();
    let resolver = chain.resolver();
    let all = all_objects();

    let (last, info) = objects_page(&resolver, args(&[("last", json!(3))])).await;
    assert_eq!(last, all[4..]);
    assert_eq!(info["hasPreviousPage"], json!(true));
    assert_eq!(info["hasNextPage"], json!(false));

    let (before, info) = objects_page(
        &resolver,
        args(&[("last", json!(3)), ("before", info["startCursor"].clone())]),
    )
    .await;
    assert_eq!(before, all[1..4]);
    assert_eq!(info["hasPreviousPage"], json!(true));
    assert_eq!(info["hasNextPage"], json!(true));

    let (head, info) = objects_page(
        &resolver,
        args(&[("last", json!(3)), ("before", info["startCursor"].clone())]),
    )
    .await;
    assert_eq!(head, all[0..1]);
    assert_eq!(info["hasPreviousPage"], json!(false));
}

#[tokio::test]
async fn test_window_between_cursors() {
    let chain = chain();
    let resolver = chain.resolver();
    let all = all_objects();

    let (_, info) = objects_page(&resolver, args(&[("first", json!(2))])).await;
    let after = info["endCursor"].clone();
    let (_, info) = objects_page(&resolver, args(&[("first", json!(6))])).await;
    let before = info["endCursor"].clone();

    // Strictly between the second and sixth objects
    let (window, info) = objects_page(
        &resolver,
        args(&[("after", after), ("before", before)]),
    )
    .await;
    assert_eq!(window, all[2..5]);
    assert_eq!(info["hasPreviousPage"], json!(true));
    assert_eq!(info["hasNextPage"], json!(true));
}

#[tokio::test]
async fn test_empty_page_has_no_cursors() {
    let chain = chain();
    let resolver = chain.resolver();

    let (_, info) = objects_page(&resolver, args(&[("last", json!(1))])).await;
    let (items, info) = objects_page(
        &resolver,
        args(&[("after", info["endCursor"].clone())]),
    )
    .await;
    assert!(items.is_empty());
    assert_eq!(info["startCursor"], JsonValue::Null);
    assert_eq!(info["endCursor"], JsonValue::Null);
    assert_eq!(info["hasNextPage"], json!(false));
    assert_eq!(info["hasPreviousPage"], json!(true));
}

#[tokio::test]
async fn test_edges_carry_page_cursors() {
    let chain = chain();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "checkpoints", "args": { "last": 2 }, "selection": [
                { "name": "edges", "selection": [
                    { "name": "cursor" },
                    { "name": "node", "selection": [ { "name": "sequenceNumber" } ] }
                ] },
                { "name": "pageInfo", "selection": [ { "name": "startCursor" }, { "name": "endCursor" } ] }
            ] }
        ]),
    )
    .await;
    let connection = &response.data["checkpoints"];
    let edges = connection["edges"].as_array().unwrap();
    assert_eq!(edges[0]["node"]["sequenceNumber"], json!("2"));
    assert_eq!(edges[1]["node"]["sequenceNumber"], json!("3"));
    assert_eq!(connection["pageInfo"]["startCursor"], edges[0]["cursor"]);
    assert_eq!(connection["pageInfo"]["endCursor"], edges[1]["cursor"]);
}

#[tokio::test]
async fn test_declarations_page_by_name() {
    let chain = chain();
    let resolver = chain.resolver();
    let modules = |page_args: JsonValue| {
        json!([
            { "name": "package", "args": { "address": "0x2" }, "selection": [
                { "name": "modules", "args": page_args, "selection": [
                    { "name": "nodes", "selection": [ { "name": "name" } ] },
                    { "name": "pageInfo", "selection": [ { "name": "hasNextPage" }, { "name": "endCursor" } ] }
                ] }
            ] }
        ])
    };

    let first = run(&resolver, modules(json!({ "first": 2 }))).await;
    let connection = &first.data["package"]["modules"];
    assert_eq!(
        connection["nodes"],
        json!([ { "name": "balance" }, { "name": "coin" } ])
    );
    assert_eq!(connection["pageInfo"]["hasNextPage"], json!(true));

    let after = connection["pageInfo"]["endCursor"].clone();
    let rest = run(&resolver, modules(json!({ "first": 2, "after": after }))).await;
    let connection = &rest.data["package"]["modules"];
    assert_eq!(
        connection["nodes"],
        json!([ { "name": "object" }, { "name": "sui" } ])
    );
    assert_eq!(connection["pageInfo"]["hasNextPage"], json!(false));
}
