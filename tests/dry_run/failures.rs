//! Transactions that would fail still produce a result

use crate::common::*;
use crate::{dry_run, executor, latest, selection, sent_by, transfer_kind};
use chainql_core::transaction::{GasData, MoveCall, ProgrammableTransaction, TransactionCommand};
use chainql_core::{Address, TransactionData, TransactionKind};
use serde_json::json;

fn status_selection() -> Vec<chainql_engine::QueryNode> {
    selection(json!([
        { "name": "effects", "selection": [ { "name": "status" }, { "name": "errors" } ] }
    ]))
}

#[tokio::test]
async fn test_ownership_check_and_skip() {
    let chain = chain();
    let executor = executor(&chain);
    let point = latest(&chain, POINT).await;
    let payload = transfer_kind(&point, bob()).to_bytes();

    let result = dry_run(&executor, &payload, sent_by(bob()), false, status_selection()).await;
    let reason = result.error.unwrap();
    assert!(reason.contains("not owned by the sender"), "{}", reason);
    let effects = &result.transaction.unwrap().data["effects"];
    assert_eq!(effects["status"], json!("FAILURE"));
    assert_eq!(effects["errors"], json!(reason));

    let result = dry_run(&executor, &payload, sent_by(bob()), true, status_selection()).await;
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn test_missing_input_is_a_failure() {
    let chain = chain();
    let mut ghost = latest(&chain, POINT).await;
    ghost.id = Address::from_low_byte(0x99);

    let result = dry_run(
        &executor(&chain),
        &transfer_kind(&ghost, bob()).to_bytes(),
        sent_by(alice()),
        false,
        status_selection(),
    )
    .await;
    assert!(result.error.unwrap().contains("not found"));
    assert_eq!(
        result.transaction.unwrap().data["effects"]["status"],
        json!("FAILURE")
    );
}

#[tokio::test]
async fn test_abort_reports_the_command() {
    let chain = chain();
    let call = MoveCall {
        package: geo_package(),
        module: "geo".into(),
        function: "abort".into(),
        type_arguments: vec![],
        arguments: vec![],
    };
    let kind = TransactionKind::Programmable(ProgrammableTransaction {
        inputs: vec![],
        commands: vec![TransactionCommand::MoveCall(Box::new(call))],
    });

    let result = dry_run(
        &executor(&chain),
        &kind.to_bytes(),
        sent_by(alice()),
        false,
        selection(json!([
            { "name": "effects", "selection": [
                { "name": "status" },
                { "name": "objectChanges", "selection": [
                    { "name": "nodes", "selection": [ { "name": "idCreated" } ] }
                ] }
            ] }
        ])),
    )
    .await;
    assert_eq!(result.error.as_deref(), Some("MoveAbort in geo::abort"));
    let effects = &result.transaction.unwrap().data["effects"];
    assert_eq!(effects["status"], json!("FAILURE"));
    // Only the gas coin is charged
    assert_eq!(effects["objectChanges"]["nodes"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_gas_exhaustion_charges_the_budget() {
    let chain = chain();
    let point = latest(&chain, POINT).await;
    let (gas_id, gas_balance) = ALICE_COINS[2];
    let gas = latest(&chain, gas_id).await;
    let budget = 300;
    let data = TransactionData {
        kind: transfer_kind(&point, bob()),
        sender: alice(),
        gas_data: GasData {
            payment: vec![gas.object_ref()],
            owner: alice(),
            price: 7,
            budget,
        },
        expiration: None,
    };

    let result = dry_run(
        &executor(&chain),
        &data.to_bytes(),
        None,
        false,
        selection(json!([
            { "name": "effects", "selection": [
                { "name": "status" },
                { "name": "gasSummary", "selection": [ { "name": "computationCost" } ] },
                { "name": "gasObject", "selection": [
                    { "name": "version" },
                    { "name": "asMoveObject", "selection": [
                        { "name": "asCoin", "selection": [ { "name": "coinBalance" } ] }
                    ] }
                ] },
                { "name": "objectChanges", "selection": [
                    { "name": "nodes", "selection": [ { "name": "address" } ] }
                ] }
            ] }
        ])),
    )
    .await;

    assert_eq!(result.digest, data.digest().to_string());
    assert!(result.error.unwrap().contains("insufficient gas"));
    let effects = &result.transaction.unwrap().data["effects"];
    assert_eq!(effects["status"], json!("FAILURE"));
    assert_eq!(effects["gasSummary"]["computationCost"], json!(budget.to_string()));

    let gas_object = &effects["gasObject"];
    assert_eq!(gas_object["version"], json!("3"));
    assert_eq!(
        gas_object["asMoveObject"]["asCoin"]["coinBalance"],
        json!((gas_balance - budget).to_string())
    );
    // The point stays where it was
    assert_eq!(
        effects["objectChanges"]["nodes"],
        json!([ { "address": gas.id.to_string() } ])
    );
}
