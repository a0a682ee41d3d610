//! Coin splits and gas accounting

use crate::common::*;
use crate::{dry_run, executor, latest, selection, sent_by};
use chainql_core::transaction::{Argument, CallArg, ObjectArg, ProgrammableTransaction, TransactionCommand};
use chainql_core::TransactionKind;
use chainql_simulator::testing::UNITS_PER_COMMAND;
use serde_json::{json, Value as JsonValue};

const SPLIT: u64 = 150;

fn amount_for(changes: &JsonValue, owner: &str) -> String {
    changes
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["owner"]["address"] == json!(owner))
        .map(|c| c["amount"].as_str().unwrap().to_string())
        .unwrap()
}

#[tokio::test]
async fn test_split_and_send() {
    let chain = chain();
    let (coin_id, coin_balance) = ALICE_COINS[2];
    let coin = latest(&chain, coin_id).await;
    let kind = TransactionKind::Programmable(ProgrammableTransaction {
        inputs: vec![
            CallArg::Object(ObjectArg::ImmOrOwned(coin.object_ref())),
            CallArg::Pure(SPLIT.to_le_bytes().to_vec()),
            CallArg::Pure(bob().as_bytes().to_vec()),
        ],
        commands: vec![
            TransactionCommand::SplitCoins(Argument::Input(0), vec![Argument::Input(1)]),
            TransactionCommand::TransferObjects(vec![Argument::NestedResult(0, 0)], Argument::Input(2)),
        ],
    });

    let result = dry_run(
        &executor(&chain),
        &kind.to_bytes(),
        sent_by(alice()),
        false,
        selection(json!([
            { "name": "effects", "selection": [
                { "name": "status" },
                { "name": "gasSummary", "selection": [ { "name": "computationCost" } ] },
                { "name": "objectChanges", "selection": [
                    { "name": "nodes", "selection": [
                        { "name": "address" },
                        { "name": "idCreated" },
                        { "name": "outputState", "selection": [
                            { "name": "asMoveObject", "selection": [
                                { "name": "asCoin", "selection": [ { "name": "coinBalance" } ] }
                            ] }
                        ] }
                    ] }
                ] },
                { "name": "balanceChanges", "selection": [
                    { "name": "nodes", "selection": [
                        { "name": "owner", "selection": [ { "name": "address" } ] },
                        { "name": "amount" }
                    ] }
                ] }
            ] }
        ])),
    )
    .await;
    assert_eq!(result.error, None);
    let effects = &result.transaction.unwrap().data["effects"];
    assert_eq!(effects["status"], json!("SUCCESS"));

    // Two commands at the epoch's reference price
    let gas_cost = 7 * 2 * UNITS_PER_COMMAND;
    assert_eq!(effects["gasSummary"]["computationCost"], json!(gas_cost.to_string()));

    let changes = effects["objectChanges"]["nodes"].as_array().unwrap();
    let created: Vec<&JsonValue> = changes.iter().filter(|c| c["idCreated"] == json!(true)).collect();
    assert_eq!(created.len(), 1);
    assert_eq!(
        created[0]["outputState"]["asMoveObject"]["asCoin"]["coinBalance"],
        json!(SPLIT.to_string())
    );
    let source = changes
        .iter()
        .find(|c| c["address"] == json!(coin.id.to_string()))
        .unwrap();
    assert_eq!(
        source["outputState"]["asMoveObject"]["asCoin"]["coinBalance"],
        json!((coin_balance - SPLIT).to_string())
    );

    // Alice pays the split and the gas from her synthetic coin
    let balances = &effects["balanceChanges"]["nodes"];
    assert_eq!(amount_for(balances, &bob().to_string()), SPLIT.to_string());
    assert_eq!(
        amount_for(balances, &alice().to_string()),
        format!("-{}", SPLIT + gas_cost)
    );
}

#[tokio::test]
async fn test_explicit_gas_price_and_sponsor() {
    let chain = chain();
    let point = latest(&chain, POINT).await;
    let kind = crate::transfer_kind(&point, bob());
    let meta = chainql_executor::TransactionMetadata {
        sender: Some(alice()),
        gas_price: Some(9),
        gas_sponsor: Some(bob()),
        ..Default::default()
    };

    let result = dry_run(
        &executor(&chain),
        &kind.to_bytes(),
        Some(meta),
        false,
        selection(json!([
            { "name": "gasInput", "selection": [
                { "name": "gasPrice" },
                { "name": "gasSponsor", "selection": [ { "name": "address" } ] }
            ] },
            { "name": "effects", "selection": [
                { "name": "gasSummary", "selection": [ { "name": "computationCost" } ] }
            ] }
        ])),
    )
    .await;
    assert_eq!(result.error, None);
    let tx = result.transaction.unwrap().data;
    assert_eq!(tx["gasInput"]["gasPrice"], json!("9"));
    assert_eq!(tx["gasInput"]["gasSponsor"]["address"], json!(bob().to_string()));
    assert_eq!(
        tx["effects"]["gasSummary"]["computationCost"],
        json!((9 * UNITS_PER_COMMAND).to_string())
    );
}

#[tokio::test]
async fn test_balances_unchanged_after_dry_run() {
    let chain = chain();
    let (coin_id, _) = ALICE_COINS[0];
    let coin = latest(&chain, coin_id).await;
    let kind = crate::transfer_kind(&coin, bob());
    let result = dry_run(&executor(&chain), &kind.to_bytes(), sent_by(alice()), false, vec![]).await;
    assert_eq!(result.error, None);

    let total: u64 = ALICE_COINS.iter().map(|(_, b)| b).sum();
    let response = run(
        &chain.resolver(),
        json!([
            { "name": "address", "args": { "address": alice().to_string() }, "selection": [
                { "name": "balance", "selection": [ { "name": "totalBalance" }, { "name": "coinObjectCount" } ] }
            ] }
        ]),
    )
    .await;
    let balance = &response.data["address"]["balance"];
    assert_eq!(balance["totalBalance"], json!(total.to_string()));
    assert_eq!(balance["coinObjectCount"], json!(ALICE_COINS.len().to_string()));
}
