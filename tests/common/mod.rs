//! Shared fixture chain for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.
//!
//! The chain spans two epochs and four checkpoints:
//!
//! | checkpoint | epoch | contents                                          |
//! |------------|-------|---------------------------------------------------|
//! | 0          | 0     | framework and `geo` packages, genesis coins       |
//! | 1          | 0     | point 0x31 created by alice                       |
//! | 2          | 1     | point 0x31 moved (x = 2)                          |
//! | 3          | 1     | bob pays alice                                    |

#![allow(dead_code)]

use std::sync::{Arc, Once};

use chainql_core::transaction::{
    Argument, CallArg, GasData, ObjectArg, ProgrammableTransaction, TransactionCommand,
};
use chainql_core::{
    decode::coin_contents, Ability, AbilitySet, Address, Checkpoint, Digest, Epoch,
    ExecutionStatus, FieldDecl, GasCostSummary, ModuleDecl, Object, OpenSignature,
    OpenSignatureBody, Owner, PackageDecl, SequenceNumber, StructDecl, StructTypeParameter,
    TransactionBlock, TransactionData, TransactionEffects, TransactionKind, TypeSignature,
};
use chainql_core::signature::FRAMEWORK_ADDRESS;
use chainql_engine::{EngineConfig, Query, QueryResponse, Resolver};
use chainql_storage::InMemoryStore;
use serde_json::Value as JsonValue;

static INIT_TRACING: Once = Once::new();

/// Route `chainql::*` events to the test writer once per binary
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Addresses
// ============================================================================

pub fn alice() -> Address {
    Address::from_low_byte(0xa1)
}

pub fn bob() -> Address {
    Address::from_low_byte(0xb2)
}

pub fn geo_package() -> Address {
    Address::from_low_byte(0xc0)
}

/// Alice's gas coins, in id order, with their balances
pub const ALICE_COINS: [(u8, u64); 3] = [(0x11, 100), (0x12, 250), (0x13, 400)];

/// Bob's only gas coin
pub const BOB_COIN: (u8, u64) = (0x21, 1_000);

/// The `geo::Point` object alice owns
pub const POINT: u8 = 0x31;

pub const GENESIS_TIMESTAMP_MS: u64 = 1_700_000_000_000;

// ============================================================================
// Packages
// ============================================================================

fn field(name: &str, body: OpenSignatureBody) -> FieldDecl {
    FieldDecl {
        name: name.into(),
        signature: OpenSignature::value(body),
    }
}

fn uid_body() -> OpenSignatureBody {
    OpenSignatureBody::datatype(FRAMEWORK_ADDRESS, "object", "UID", vec![])
}

/// `object::UID`, `balance::Balance<T>`, `coin::Coin<T>` and `sui::SUI`
pub fn framework_package() -> PackageDecl {
    let phantom = StructTypeParameter {
        constraints: AbilitySet::default(),
        is_phantom: true,
    };
    let uid = StructDecl {
        name: "UID".into(),
        abilities: AbilitySet::from_abilities(&[Ability::Store]),
        type_parameters: vec![],
        fields: vec![field("id", OpenSignatureBody::Address)],
    };
    let balance = StructDecl {
        name: "Balance".into(),
        abilities: AbilitySet::from_abilities(&[Ability::Store]),
        type_parameters: vec![phantom],
        fields: vec![field("value", OpenSignatureBody::U64)],
    };
    let coin = StructDecl {
        name: "Coin".into(),
        abilities: AbilitySet::from_abilities(&[Ability::Key, Ability::Store]),
        type_parameters: vec![phantom],
        fields: vec![
            field("id", uid_body()),
            field(
                "balance",
                OpenSignatureBody::datatype(
                    FRAMEWORK_ADDRESS,
                    "balance",
                    "Balance",
                    vec![OpenSignatureBody::TypeParameter(0)],
                ),
            ),
        ],
    };
    let sui = StructDecl {
        name: "SUI".into(),
        abilities: AbilitySet::from_abilities(&[Ability::Drop]),
        type_parameters: vec![],
        fields: vec![field("dummy_field", OpenSignatureBody::Bool)],
    };
    PackageDecl::genesis(
        FRAMEWORK_ADDRESS,
        vec![
            ModuleDecl::new("object").with_struct(uid),
            ModuleDecl::new("balance").with_struct(balance),
            ModuleDecl::new("coin").with_struct(coin),
            ModuleDecl::new("sui").with_struct(sui),
        ],
    )
}

/// `geo::Point { id, x, y }`
pub fn geo() -> PackageDecl {
    let point = StructDecl {
        name: "Point".into(),
        abilities: AbilitySet::from_abilities(&[Ability::Key, Ability::Store]),
        type_parameters: vec![],
        fields: vec![
            field("id", uid_body()),
            field("x", OpenSignatureBody::U64),
            field("y", OpenSignatureBody::U64),
        ],
    };
    PackageDecl::genesis(geo_package(), vec![ModuleDecl::new("geo").with_struct(point)])
}

pub fn point_type() -> TypeSignature {
    TypeSignature::datatype(geo_package(), "geo", "Point", vec![])
}

// ============================================================================
// Objects
// ============================================================================

pub fn gas_coin(id: u8, owner: Address, balance: u64) -> Object {
    let id = Address::from_low_byte(id);
    Object::new_move(
        id,
        SequenceNumber(1),
        Owner::AddressOwner(owner),
        TypeSignature::gas_coin(),
        coin_contents(&id, balance),
        Digest::of(b"genesis"),
    )
}

pub fn point_contents(x: u64, y: u64) -> Vec<u8> {
    let mut out = Address::from_low_byte(POINT).as_bytes().to_vec();
    out.extend_from_slice(&x.to_le_bytes());
    out.extend_from_slice(&y.to_le_bytes());
    out
}

// ============================================================================
// Transactions
// ============================================================================

fn transfer(sender: Address, recipient: Address, object: &Object, gas: &Object) -> TransactionData {
    TransactionData {
        kind: TransactionKind::Programmable(ProgrammableTransaction {
            inputs: vec![
                CallArg::Object(ObjectArg::ImmOrOwned(object.object_ref())),
                CallArg::Pure(recipient.as_bytes().to_vec()),
            ],
            commands: vec![TransactionCommand::TransferObjects(
                vec![Argument::Input(0)],
                Argument::Input(1),
            )],
        }),
        sender,
        gas_data: GasData {
            payment: vec![gas.object_ref()],
            owner: sender,
            price: 1,
            budget: 5_000,
        },
        expiration: None,
    }
}

fn finalized(data: TransactionData, checkpoint: u64, lamport: u64) -> TransactionBlock {
    let digest = data.digest();
    TransactionBlock {
        digest,
        effects: TransactionEffects {
            transaction_digest: digest,
            status: ExecutionStatus::Success,
            executed_epoch: if checkpoint < 2 { 0 } else { 1 },
            gas_used: GasCostSummary {
                computation_cost: 1_000,
                ..Default::default()
            },
            gas_object: None,
            lamport_version: SequenceNumber(lamport),
            object_changes: vec![],
            balance_changes: vec![],
            events: vec![],
            dependencies: vec![],
        },
        data,
        signatures: vec![b"fixture-signature".to_vec()],
        checkpoint: Some(checkpoint),
        tx_sequence: None,
        timestamp_ms: Some(checkpoint_timestamp(checkpoint)),
    }
}

pub fn checkpoint_timestamp(seq: u64) -> u64 {
    GENESIS_TIMESTAMP_MS + seq * 1_000
}

// ============================================================================
// Chain
// ============================================================================

/// The fixture chain, plus the digests of its transactions in order
pub struct Chain {
    pub store: Arc<InMemoryStore>,
    pub transactions: Vec<Digest>,
}

impl Chain {
    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.store.clone(), EngineConfig::default())
    }

    pub fn resolver_with(&self, config: EngineConfig) -> Resolver {
        Resolver::new(self.store.clone(), config)
    }
}

/// Build the chain described in the module docs
pub fn chain() -> Chain {
    init_tracing();
    let store = Arc::new(InMemoryStore::new());

    store.insert_package(framework_package(), 0).unwrap();
    store.insert_package(geo(), 0).unwrap();
    for (id, balance) in ALICE_COINS {
        store.insert_object(gas_coin(id, alice(), balance), 0).unwrap();
    }
    let bob_coin = gas_coin(BOB_COIN.0, bob(), BOB_COIN.1);
    store.insert_object(bob_coin.clone(), 0).unwrap();

    let point_v1 = Object::new_move(
        Address::from_low_byte(POINT),
        SequenceNumber(1),
        Owner::AddressOwner(alice()),
        point_type(),
        point_contents(1, 1),
        Digest::of(b"create-point"),
    );
    store.insert_object(point_v1.clone(), 1).unwrap();
    let point_v2 = point_v1.mutated(
        SequenceNumber(2),
        Owner::AddressOwner(alice()),
        Some(point_contents(2, 1)),
        Digest::of(b"move-point"),
    );
    store.insert_object(point_v2, 2).unwrap();

    let mut transactions = Vec::new();
    let alice_gas = gas_coin(ALICE_COINS[0].0, alice(), ALICE_COINS[0].1);
    let alice_spare = gas_coin(ALICE_COINS[1].0, alice(), ALICE_COINS[1].1);
    let steps = [
        (transfer(alice(), alice(), &point_v1, &alice_gas), 1, 2),
        (transfer(alice(), alice(), &point_v1, &alice_spare), 2, 3),
        (transfer(bob(), alice(), &bob_coin, &bob_coin), 3, 2),
    ];
    for (data, checkpoint, lamport) in steps {
        let block = finalized(data, checkpoint, lamport);
        transactions.push(block.digest);
        store.insert_transaction(block).unwrap();
    }

    let mut previous = None;
    for seq in 0..4u64 {
        let digest = Digest::of(format!("checkpoint-{}", seq).as_bytes());
        store
            .insert_checkpoint(Checkpoint {
                sequence_number: seq,
                digest,
                epoch: if seq < 2 { 0 } else { 1 },
                timestamp_ms: checkpoint_timestamp(seq),
                previous_digest: previous,
                network_total_transactions: seq,
                transactions: seq
                    .checked_sub(1)
                    .and_then(|i| transactions.get(i as usize))
                    .copied()
                    .into_iter()
                    .collect(),
            })
            .unwrap();
        previous = Some(digest);
    }

    store.insert_epoch(Epoch {
        epoch_id: 0,
        reference_gas_price: 5,
        protocol_version: 1,
        start_timestamp_ms: GENESIS_TIMESTAMP_MS,
        end_timestamp_ms: Some(checkpoint_timestamp(1)),
        first_checkpoint: 0,
        last_checkpoint: Some(1),
    });
    store.insert_epoch(Epoch {
        epoch_id: 1,
        reference_gas_price: 7,
        protocol_version: 2,
        start_timestamp_ms: checkpoint_timestamp(2),
        end_timestamp_ms: None,
        first_checkpoint: 2,
        last_checkpoint: None,
    });

    Chain { store, transactions }
}

/// Run a JSON query, failing the test on a request error
pub async fn run(resolver: &Resolver, query: JsonValue) -> QueryResponse {
    run_at(resolver, query, None).await
}

pub async fn run_at(resolver: &Resolver, query: JsonValue, checkpoint: Option<u64>) -> QueryResponse {
    let query = Query::from_json(query).expect("query should parse");
    resolver
        .execute(&query, checkpoint)
        .await
        .expect("query should resolve")
}
