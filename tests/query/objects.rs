//! Point lookups, versions, typed projections and decoded contents

use crate::common::*;
use chainql_core::{Address, TypeSignature};
use serde_json::json;

fn point_id() -> String {
    Address::from_low_byte(POINT).to_string()
}

#[tokio::test]
async fn test_latest_object_decodes_contents() {
    let chain = chain();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "object", "args": { "address": point_id() }, "selection": [
                { "name": "version" },
                { "name": "owner", "selection": [
                    { "name": "kind" },
                    { "name": "owner", "selection": [ { "name": "address" } ] }
                ] },
                { "name": "asMoveObject", "selection": [
                    { "name": "hasPublicTransfer" },
                    { "name": "contents", "selection": [
                        { "name": "type", "selection": [ { "name": "repr" } ] },
                        { "name": "json" }
                    ] }
                ] }
            ] }
        ]),
    )
    .await;

    let object = &response.data["object"];
    assert_eq!(object["version"], json!("2"));
    assert_eq!(object["owner"]["kind"], json!("ADDRESS"));
    assert_eq!(object["owner"]["owner"]["address"], json!(alice().to_string()));
    let contents = &object["asMoveObject"]["contents"];
    assert_eq!(contents["type"]["repr"], json!(point_type().repr()));
    assert_eq!(contents["json"], json!({ "id": point_id(), "x": "2", "y": "1" }));
    assert!(response.errors.is_empty());
}

#[tokio::test]
async fn test_explicit_version_and_pinned_checkpoint() {
    let chain = chain();
    let resolver = chain.resolver();
    let selection = json!([
        { "name": "asMoveObject", "selection": [
            { "name": "contents", "selection": [ { "name": "json" } ] }
        ] }
    ]);

    let by_version = run(
        &resolver,
        json!([
            { "name": "object", "args": { "address": point_id(), "version": 1 }, "selection": selection }
        ]),
    )
    .await;
    assert_eq!(by_version.data["object"]["asMoveObject"]["contents"]["json"]["x"], json!("1"));

    let at_one = run_at(
        &resolver,
        json!([ { "name": "object", "args": { "address": point_id() }, "selection": selection } ]),
        Some(1),
    )
    .await;
    assert_eq!(at_one.data["object"]["asMoveObject"]["contents"]["json"]["x"], json!("1"));

    // Created at checkpoint 1, so not visible from genesis
    let at_genesis = run_at(
        &resolver,
        json!([ { "name": "object", "args": { "address": point_id() }, "selection": [ { "name": "version" } ] } ]),
        Some(0),
    )
    .await;
    assert_eq!(at_genesis.data["object"], json!(null));
    assert!(at_genesis.errors.is_empty());
}

#[tokio::test]
async fn test_coin_projection() {
    let chain = chain();
    let (id, balance) = ALICE_COINS[1];
    let coin_id = Address::from_low_byte(id).to_string();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "object", "args": { "address": coin_id }, "selection": [
                { "name": "asMovePackage", "selection": [ { "name": "__typename" } ] },
                { "name": "asMoveObject", "selection": [
                    { "name": "asCoin", "selection": [ { "name": "coinBalance" } ] },
                    { "name": "contents", "selection": [ { "name": "json" } ] }
                ] }
            ] }
        ]),
    )
    .await;

    let object = &response.data["object"];
    assert_eq!(object["asMovePackage"], json!(null));
    assert_eq!(object["asMoveObject"]["asCoin"]["coinBalance"], json!(balance.to_string()));
    assert_eq!(
        object["asMoveObject"]["contents"]["json"],
        json!({ "id": coin_id, "balance": { "value": balance.to_string() } })
    );
}

#[tokio::test]
async fn test_non_coin_has_no_coin_projection() {
    let chain = chain();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "object", "args": { "address": point_id() }, "selection": [
                { "name": "asMoveObject", "selection": [
                    { "name": "asCoin", "selection": [ { "name": "coinBalance" } ] }
                ] }
            ] }
        ]),
    )
    .await;
    assert_eq!(response.data["object"]["asMoveObject"]["asCoin"], json!(null));
}

#[tokio::test]
async fn test_package_declarations() {
    let chain = chain();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "package", "args": { "address": geo_package().to_string() }, "selection": [
                { "name": "version" },
                { "name": "module", "args": { "name": "geo" }, "selection": [
                    { "name": "struct", "args": { "name": "Point" }, "selection": [
                        { "name": "abilities" },
                        { "name": "fields", "selection": [
                            { "name": "name" },
                            { "name": "type", "selection": [ { "name": "repr" } ] }
                        ] }
                    ] },
                    { "name": "struct", "alias": "missing", "args": { "name": "Line" }, "selection": [ { "name": "name" } ] }
                ] },
                { "name": "typeOrigins", "selection": [ { "name": "struct" }, { "name": "definingId" } ] }
            ] }
        ]),
    )
    .await;

    let package = &response.data["package"];
    let point = &package["module"]["struct"];
    assert_eq!(point["abilities"], json!(["STORE", "KEY"]));
    let fields = point["fields"].as_array().unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["id", "x", "y"]);
    assert_eq!(fields[1]["type"]["repr"], json!("u64"));
    assert_eq!(package["module"]["missing"], json!(null));
    assert_eq!(
        package["typeOrigins"],
        json!([ { "struct": "Point", "definingId": geo_package().to_string() } ])
    );
}

#[tokio::test]
async fn test_type_layout_and_abilities() {
    let chain = chain();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "type", "args": { "type": "0x2::coin::Coin<0x2::sui::SUI>" }, "selection": [
                { "name": "repr" },
                { "name": "abilities" },
                { "name": "layout" }
            ] }
        ]),
    )
    .await;

    let ty = &response.data["type"];
    assert_eq!(ty["repr"], json!(TypeSignature::gas_coin().repr()));
    assert_eq!(ty["abilities"], json!(["STORE", "KEY"]));
    let fields = ty["layout"]["struct"]["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1]["name"], json!("balance"));
}
