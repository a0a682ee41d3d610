//! Test modules for the executor crate.

pub mod gates;

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chainql_core::decode::coin_contents;
use chainql_core::transaction::{Argument, CallArg, ObjectArg, ProgrammableTransaction, TransactionCommand};
use chainql_core::{
    Address, Checkpoint, Digest, Epoch, Object, Owner, SequenceNumber, TransactionKind,
    TypeSignature,
};
use chainql_simulator::testing::ScriptedEngine;
use chainql_storage::InMemoryStore;

use crate::{Executor, ServiceConfig};

pub fn sender() -> Address {
    Address::from_low_byte(0xa0)
}

pub fn recipient() -> Address {
    Address::from_low_byte(0xb0)
}

/// Store with one checkpoint, one epoch and one coin owned by [`sender`]
pub fn seeded_store() -> (Arc<InMemoryStore>, Object) {
    let store = Arc::new(InMemoryStore::new());
    let id = Address::from_low_byte(0x51);
    let coin = Object::new_move(
        id,
        SequenceNumber(4),
        Owner::AddressOwner(sender()),
        TypeSignature::gas_coin(),
        coin_contents(&id, 2_500),
        Digest::of(b"mint"),
    );
    store.insert_object(coin.clone(), 0).unwrap();
    store
        .insert_checkpoint(Checkpoint {
            sequence_number: 0,
            digest: Digest::of(b"checkpoint-0"),
            epoch: 1,
            timestamp_ms: 1_700_000_000_000,
            previous_digest: None,
            network_total_transactions: 0,
            transactions: vec![],
        })
        .unwrap();
    store.insert_epoch(Epoch {
        epoch_id: 1,
        reference_gas_price: 3,
        protocol_version: 1,
        start_timestamp_ms: 1_700_000_000_000,
        end_timestamp_ms: None,
        first_checkpoint: 0,
        last_checkpoint: None,
    });
    (store, coin)
}

pub fn executor_with(config: ServiceConfig) -> (Executor, Object) {
    let (store, coin) = seeded_store();
    let executor = Executor::new(store, config).with_engine(Arc::new(ScriptedEngine::new()));
    (executor, coin)
}

pub fn executor() -> (Executor, Object) {
    executor_with(ServiceConfig::default())
}

/// Kind transferring `coin` to [`recipient`]
pub fn transfer_kind(coin: &Object) -> TransactionKind {
    TransactionKind::Programmable(ProgrammableTransaction {
        inputs: vec![
            CallArg::Object(ObjectArg::ImmOrOwned(coin.object_ref())),
            CallArg::Pure(recipient().as_bytes().to_vec()),
        ],
        commands: vec![TransactionCommand::TransferObjects(
            vec![Argument::Input(0)],
            Argument::Input(1),
        )],
    })
}

pub fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}
