//! Transaction data, effects and events
//!
//! A transaction either commits all of its effects or none; there is no
//! partial-success status. Failed transactions still charge gas and still
//! have effects (the gas coin is mutated).

use crate::address::{Address, Digest, ObjectId};
use crate::error::ChainqlResult;
use crate::package::ModuleDecl;
use crate::signature::TypeSignature;
use crate::types::{ObjectRef, Owner, SequenceNumber};
use serde::{Deserialize, Serialize};

// =============================================================================
// Inputs and commands
// =============================================================================

/// Object input to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectArg {
    /// Owned or immutable object at an exact version
    ImmOrOwned(ObjectRef),
    /// Shared object, sequenced by consensus
    Shared {
        /// Object id
        id: ObjectId,
        /// Version at which it became shared
        initial_shared_version: SequenceNumber,
        /// Whether the transaction may mutate it
        mutable: bool,
    },
    /// Object sent to another object, being received by its parent
    Receiving(ObjectRef),
}

impl ObjectArg {
    /// Object id of this input
    pub fn id(&self) -> ObjectId {
        match self {
            ObjectArg::ImmOrOwned(r) | ObjectArg::Receiving(r) => r.object_id,
            ObjectArg::Shared { id, .. } => *id,
        }
    }
}

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    /// Canonically encoded pure value
    Pure(Vec<u8>),
    /// Object reference
    Object(ObjectArg),
}

/// Reference to a value available to a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    /// The gas coin
    GasCoin,
    /// Transaction input by index
    Input(u16),
    /// Single result of an earlier command
    Result(u16),
    /// One of several results of an earlier command
    NestedResult(u16, u16),
}

/// Call to a Move function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    /// Package containing the function
    pub package: Address,
    /// Module name
    pub module: String,
    /// Function name
    pub function: String,
    /// Type arguments
    pub type_arguments: Vec<TypeSignature>,
    /// Value arguments
    pub arguments: Vec<Argument>,
}

/// One step of a programmable transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionCommand {
    /// Call a Move function
    MoveCall(Box<MoveCall>),
    /// Send objects to an address
    TransferObjects(Vec<Argument>, Argument),
    /// Split amounts off a coin
    SplitCoins(Argument, Vec<Argument>),
    /// Merge coins into the first
    MergeCoins(Argument, Vec<Argument>),
    /// Publish a new package
    Publish(Vec<ModuleDecl>, Vec<ObjectId>),
    /// Upgrade an existing package
    Upgrade {
        /// New module set
        modules: Vec<ModuleDecl>,
        /// Dependencies
        dependencies: Vec<ObjectId>,
        /// Package being upgraded
        package: ObjectId,
        /// Upgrade ticket
        ticket: Argument,
    },
    /// Build a vector from arguments
    MakeMoveVec(Option<TypeSignature>, Vec<Argument>),
}

impl TransactionCommand {
    /// Label used at the query surface
    pub fn name(&self) -> &'static str {
        match self {
            TransactionCommand::MoveCall(_) => "MoveCall",
            TransactionCommand::TransferObjects(..) => "TransferObjects",
            TransactionCommand::SplitCoins(..) => "SplitCoins",
            TransactionCommand::MergeCoins(..) => "MergeCoins",
            TransactionCommand::Publish(..) => "Publish",
            TransactionCommand::Upgrade { .. } => "Upgrade",
            TransactionCommand::MakeMoveVec(..) => "MakeMoveVec",
        }
    }
}

/// Inputs plus an ordered command list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgrammableTransaction {
    /// Inputs referenced by `Argument::Input`
    pub inputs: Vec<CallArg>,
    /// Commands, executed in order
    pub commands: Vec<TransactionCommand>,
}

/// What a transaction does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// User transaction
    Programmable(ProgrammableTransaction),
    /// System transaction recording a consensus commit
    ConsensusCommitPrologue {
        /// Epoch
        epoch: u64,
        /// Consensus round
        round: u64,
        /// Commit time (ms since Unix epoch)
        commit_timestamp_ms: u64,
    },
}

impl TransactionKind {
    /// Decode from the canonical binary encoding
    pub fn from_bytes(bytes: &[u8]) -> ChainqlResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Canonical binary encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    /// True for system transactions
    pub fn is_system(&self) -> bool {
        !matches!(self, TransactionKind::Programmable(_))
    }

    /// Label used at the query surface and in filters
    pub fn label(&self) -> &'static str {
        if self.is_system() {
            "SYSTEM_TX"
        } else {
            "PROGRAMMABLE_TX"
        }
    }

    /// Object inputs
    pub fn input_objects(&self) -> Vec<&ObjectArg> {
        match self {
            TransactionKind::Programmable(pt) => pt
                .inputs
                .iter()
                .filter_map(|i| match i {
                    CallArg::Object(o) => Some(o),
                    CallArg::Pure(_) => None,
                })
                .collect(),
            TransactionKind::ConsensusCommitPrologue { .. } => Vec::new(),
        }
    }

    /// Move calls made by this transaction
    pub fn move_calls(&self) -> Vec<&MoveCall> {
        match self {
            TransactionKind::Programmable(pt) => pt
                .commands
                .iter()
                .filter_map(|c| match c {
                    TransactionCommand::MoveCall(call) => Some(call.as_ref()),
                    _ => None,
                })
                .collect(),
            TransactionKind::ConsensusCommitPrologue { .. } => Vec::new(),
        }
    }
}

/// Gas payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasData {
    /// Coins paying for gas
    pub payment: Vec<ObjectRef>,
    /// Address paying (sender, or sponsor)
    pub owner: Address,
    /// Price per gas unit
    pub price: u64,
    /// Maximum gas units
    pub budget: u64,
}

/// Unsigned transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    /// What the transaction does
    pub kind: TransactionKind,
    /// Sender
    pub sender: Address,
    /// Gas payment
    pub gas_data: GasData,
    /// Epoch after which the transaction is invalid
    pub expiration: Option<u64>,
}

impl TransactionData {
    /// Decode from the canonical binary encoding
    pub fn from_bytes(bytes: &[u8]) -> ChainqlResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Canonical binary encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    /// Digest of the canonical encoding
    pub fn digest(&self) -> Digest {
        Digest::of(&self.to_bytes())
    }

    /// Object inputs, including gas payment
    pub fn input_object_ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.kind.input_objects().iter().map(|o| o.id()).collect();
        ids.extend(self.gas_data.payment.iter().map(|r| r.object_id));
        ids
    }
}

// =============================================================================
// Effects
// =============================================================================

/// Outcome of execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// All effects committed
    Success,
    /// No effects committed apart from gas
    Failure {
        /// Abort reason
        error: String,
        /// Failing command index, if attributable
        command: Option<u16>,
    },
}

impl ExecutionStatus {
    /// True on success
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }

    /// Failure reason
    pub fn error(&self) -> Option<&str> {
        match self {
            ExecutionStatus::Success => None,
            ExecutionStatus::Failure { error, .. } => Some(error),
        }
    }
}

/// Gas charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GasCostSummary {
    /// Computation cost
    pub computation_cost: u64,
    /// Storage cost
    pub storage_cost: u64,
    /// Storage rebate
    pub storage_rebate: u64,
    /// Non-refundable storage fee
    pub non_refundable_storage_fee: u64,
}

impl GasCostSummary {
    /// Net amount debited from the gas coin (negative means refund)
    pub fn net_gas_usage(&self) -> i128 {
        self.computation_cost as i128 + self.storage_cost as i128 - self.storage_rebate as i128
    }
}

/// Lifecycle of an object id within one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdOperation {
    /// Id existed before and after
    None,
    /// Id was created
    Created,
    /// Id was deleted
    Deleted,
}

/// Change to one object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectChange {
    /// Object id
    pub object_id: ObjectId,
    /// Version before the transaction
    pub input_state: Option<ObjectRef>,
    /// Version after the transaction
    pub output_state: Option<ObjectRef>,
    /// Owner after the transaction
    pub output_owner: Option<Owner>,
    /// Owner before the transaction
    pub input_owner: Option<Owner>,
    /// Created/deleted
    pub id_operation: IdOperation,
}

/// Change in one owner's balance of one coin type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    /// Owner whose balance changed
    pub owner: Owner,
    /// Coin type (the `T` in `Coin<T>`)
    pub coin_type: TypeSignature,
    /// Signed change
    pub amount: i128,
}

/// Event emitted by a Move call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Package of the emitting module
    pub package_id: Address,
    /// Emitting module
    pub transaction_module: String,
    /// Transaction sender
    pub sender: Address,
    /// Event type
    pub type_: TypeSignature,
    /// Canonically encoded event value
    pub contents: Vec<u8>,
}

/// Event with its position in the global event order
///
/// Events are ordered by `(tx_sequence, event_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEvent {
    /// Sequence number of the emitting transaction
    pub tx_sequence: u64,
    /// Index within that transaction's events
    pub event_index: u32,
    /// Digest of the emitting transaction
    pub transaction_digest: Digest,
    /// Checkpoint timestamp
    pub timestamp_ms: Option<u64>,
    /// The event
    pub event: Event,
}

/// Everything a transaction did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEffects {
    /// Transaction digest
    pub transaction_digest: Digest,
    /// Outcome
    pub status: ExecutionStatus,
    /// Epoch of execution
    pub executed_epoch: u64,
    /// Gas charged
    pub gas_used: GasCostSummary,
    /// Gas coin after the transaction
    pub gas_object: Option<ObjectRef>,
    /// Version assigned to every written object
    pub lamport_version: SequenceNumber,
    /// Changed objects, ordered by id
    pub object_changes: Vec<ObjectChange>,
    /// Balance changes, ordered by owner then coin type
    pub balance_changes: Vec<BalanceChange>,
    /// Events in emission order
    pub events: Vec<Event>,
    /// Transactions whose outputs this one read
    pub dependencies: Vec<Digest>,
}

impl TransactionEffects {
    /// Ids of every object this transaction touched
    pub fn affected_objects(&self) -> impl Iterator<Item = &ObjectId> {
        self.object_changes.iter().map(|c| &c.object_id)
    }
}

/// A transaction with its effects and (once finalized) position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBlock {
    /// Digest of `data`
    pub digest: Digest,
    /// Transaction data
    pub data: TransactionData,
    /// Signatures over `data`
    pub signatures: Vec<Vec<u8>>,
    /// Effects
    pub effects: TransactionEffects,
    /// Finalizing checkpoint; `None` for simulated transactions
    pub checkpoint: Option<u64>,
    /// Global execution sequence number; `None` for simulated transactions
    pub tx_sequence: Option<u64>,
    /// Checkpoint timestamp
    pub timestamp_ms: Option<u64>,
}
