//! Dry runs through the executor against the fixture chain
//!
//! - transfers: simulated state is visible to the selection, never to the store
//! - coins: coin splits, balance changes and gas accounting
//! - failures: pre-check, abort and gas failures come back as data

#[path = "../common/mod.rs"]
mod common;

mod coins;
mod failures;
mod transfers;

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chainql_core::transaction::{Argument, CallArg, ObjectArg, ProgrammableTransaction, TransactionCommand};
use chainql_core::{Address, Object, TransactionKind};
use chainql_engine::{Query, QueryNode};
use chainql_executor::{Command, DryRunOutput, Executor, Output, ServiceConfig, TransactionMetadata};
use chainql_simulator::testing::ScriptedEngine;
use chainql_storage::StoreSnapshot;
use serde_json::Value as JsonValue;

use common::Chain;

pub fn executor(chain: &Chain) -> Executor {
    Executor::new(chain.store.clone(), ServiceConfig::default()).with_engine(Arc::new(ScriptedEngine::new()))
}

/// Selection on the simulated block, written as query JSON
pub fn selection(json: JsonValue) -> Vec<QueryNode> {
    Query::from_json(json).unwrap().selection
}

/// Latest version of `id` in the real store
pub async fn latest(chain: &Chain, id: u8) -> Object {
    let snapshot = StoreSnapshot::pin(chain.store.clone(), None).await.unwrap();
    let object = snapshot
        .object(&Address::from_low_byte(id), None)
        .await
        .unwrap()
        .unwrap();
    object.as_ref().clone()
}

/// Kind moving `object` to `recipient`
pub fn transfer_kind(object: &Object, recipient: Address) -> TransactionKind {
    TransactionKind::Programmable(ProgrammableTransaction {
        inputs: vec![
            CallArg::Object(ObjectArg::ImmOrOwned(object.object_ref())),
            CallArg::Pure(recipient.as_bytes().to_vec()),
        ],
        commands: vec![TransactionCommand::TransferObjects(
            vec![Argument::Input(0)],
            Argument::Input(1),
        )],
    })
}

pub fn sent_by(sender: Address) -> Option<TransactionMetadata> {
    Some(TransactionMetadata {
        sender: Some(sender),
        ..Default::default()
    })
}

pub async fn dry_run(
    executor: &Executor,
    payload: &[u8],
    tx_meta: Option<TransactionMetadata>,
    skip_checks: bool,
    selection: Vec<QueryNode>,
) -> DryRunOutput {
    let output = executor
        .execute(Command::DryRun {
            tx_bytes: BASE64.encode(payload),
            tx_meta,
            skip_checks,
            selection,
        })
        .await
        .unwrap();
    match output {
        Output::DryRun(result) => result,
        other => panic!("Expected DryRun output, got {:?}", other),
    }
}
