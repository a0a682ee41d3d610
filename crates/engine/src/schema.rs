//! Static schema
//!
//! Field names drive dispatch only once: the registry maps
//! `(NodeType, name)` to a [`Field`] when the query is validated, and the
//! resolver matches exhaustively on `Field` from then on.
//!
//! Connections are not node types of their own. A field with
//! [`Shape::Connection`] accepts the children `edges { cursor node }`,
//! `nodes` and `pageInfo { hasNextPage hasPreviousPage startCursor endCursor }`.

use crate::limits::Feature;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Schema object types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Root
    Query,
    /// Any object
    Object,
    /// Object holding a Move value
    MoveObject,
    /// `Coin<T>` object
    Coin,
    /// Published package
    MovePackage,
    /// Module of a package
    MoveModule,
    /// Struct declaration
    MoveStruct,
    /// Function declaration
    MoveFunction,
    /// Struct field declaration
    MoveField,
    /// Declaration-site type
    OpenMoveType,
    /// Typed Move value
    MoveValue,
    /// Concrete type
    MoveType,
    /// Account address
    Address,
    /// Address that may also be an object
    Owner,
    /// Ownership of an object
    ObjectOwner,
    /// Aggregate balance of one coin type
    Balance,
    /// Checkpoint
    Checkpoint,
    /// Epoch
    Epoch,
    /// Transaction
    TransactionBlock,
    /// Gas payment of a transaction
    GasInput,
    /// Effects of a transaction
    TransactionEffects,
    /// Gas charged
    GasCostSummary,
    /// Change to one object
    ObjectChange,
    /// Change to one balance
    BalanceChange,
    /// Emitted event
    Event,
    /// Dependency linkage entry
    Linkage,
    /// Struct origin entry
    TypeOrigin,
    /// Service configuration
    ServiceConfig,
}

impl NodeType {
    /// Schema name
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Query => "Query",
            NodeType::Object => "Object",
            NodeType::MoveObject => "MoveObject",
            NodeType::Coin => "Coin",
            NodeType::MovePackage => "MovePackage",
            NodeType::MoveModule => "MoveModule",
            NodeType::MoveStruct => "MoveStruct",
            NodeType::MoveFunction => "MoveFunction",
            NodeType::MoveField => "MoveField",
            NodeType::OpenMoveType => "OpenMoveType",
            NodeType::MoveValue => "MoveValue",
            NodeType::MoveType => "MoveType",
            NodeType::Address => "Address",
            NodeType::Owner => "Owner",
            NodeType::ObjectOwner => "ObjectOwner",
            NodeType::Balance => "Balance",
            NodeType::Checkpoint => "Checkpoint",
            NodeType::Epoch => "Epoch",
            NodeType::TransactionBlock => "TransactionBlock",
            NodeType::GasInput => "GasInput",
            NodeType::TransactionEffects => "TransactionEffects",
            NodeType::GasCostSummary => "GasCostSummary",
            NodeType::ObjectChange => "ObjectChange",
            NodeType::BalanceChange => "BalanceChange",
            NodeType::Event => "Event",
            NodeType::Linkage => "Linkage",
            NodeType::TypeOrigin => "TypeOrigin",
            NodeType::ServiceConfig => "ServiceConfig",
        }
    }

    const ALL: [NodeType; 28] = [
        NodeType::Query,
        NodeType::Object,
        NodeType::MoveObject,
        NodeType::Coin,
        NodeType::MovePackage,
        NodeType::MoveModule,
        NodeType::MoveStruct,
        NodeType::MoveFunction,
        NodeType::MoveField,
        NodeType::OpenMoveType,
        NodeType::MoveValue,
        NodeType::MoveType,
        NodeType::Address,
        NodeType::Owner,
        NodeType::ObjectOwner,
        NodeType::Balance,
        NodeType::Checkpoint,
        NodeType::Epoch,
        NodeType::TransactionBlock,
        NodeType::GasInput,
        NodeType::TransactionEffects,
        NodeType::GasCostSummary,
        NodeType::ObjectChange,
        NodeType::BalanceChange,
        NodeType::Event,
        NodeType::Linkage,
        NodeType::TypeOrigin,
        NodeType::ServiceConfig,
    ];
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a field returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// JSON scalar (or scalar list); no selection allowed
    Scalar,
    /// One node, or `null`
    Node(NodeType),
    /// Unpaginated list of nodes
    List(NodeType),
    /// Paginated connection of nodes
    Connection(NodeType),
}

/// Resolver selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    // Root
    /// `Query.object`
    QueryObject,
    /// `Query.objects`
    QueryObjects,
    /// `Query.address`
    QueryAddress,
    /// `Query.owner`
    QueryOwner,
    /// `Query.checkpoint`
    QueryCheckpoint,
    /// `Query.checkpoints`
    QueryCheckpoints,
    /// `Query.transactionBlock`
    QueryTransactionBlock,
    /// `Query.transactionBlocks`
    QueryTransactionBlocks,
    /// `Query.events`
    QueryEvents,
    /// `Query.epoch`
    QueryEpoch,
    /// `Query.type`
    QueryType,
    /// `Query.package`
    QueryPackage,
    /// `Query.serviceConfig`
    QueryServiceConfig,

    // Shared
    /// Schema type name of the node
    Typename,
    /// Address of an object, owner, or object change
    Address,
    /// Object version, or linked package version
    Version,
    /// Object, checkpoint, or transaction digest
    Digest,
    /// Declaration or module name
    Name,
    /// Canonical type string
    Repr,
    /// Structured type signature
    Signature,
    /// Ability set
    Abilities,
    /// Type parameter constraints
    TypeParameters,
    /// Canonical bytes of a value or transaction, Base64
    Bcs,
    /// Timestamp (RFC 3339)
    Timestamp,
    /// Transaction sender
    Sender,
    /// Storage rebate
    StorageRebate,

    // Objects
    /// `Object.owner`
    ObjectOwner,
    /// `Object.previousTransactionBlock`
    PreviousTransaction,
    /// `Object.asMoveObject`
    AsMoveObject,
    /// `Object.asMovePackage`
    AsMovePackage,
    /// Objects owned by this object
    DynamicFields,
    /// Move value held by an object or event
    Contents,
    /// `MoveObject.hasPublicTransfer`
    HasPublicTransfer,
    /// `MoveObject.asCoin`
    AsCoin,
    /// `Coin.coinBalance`
    CoinBalance,

    // Ownership
    /// `ObjectOwner.kind`
    OwnerKind,
    /// `ObjectOwner.owner`
    OwnerOf,
    /// `ObjectOwner.initialSharedVersion`
    InitialSharedVersion,
    /// Objects owned by an address
    OwnedObjects,
    /// Balance of one coin type
    Balance,
    /// Balances of every coin type
    Balances,
    /// Coin objects owned by an address
    Coins,
    /// Transactions sent by an address
    SentTransactions,
    /// `Owner.asAddress`
    AsAddress,
    /// `Owner.asObject`
    AsObject,
    /// Coin type of a balance or balance change
    CoinType,
    /// `Balance.coinObjectCount`
    CoinObjectCount,
    /// `Balance.totalBalance`
    TotalBalance,

    // Packages
    /// `MovePackage.module`
    PackageModule,
    /// `MovePackage.modules`
    PackageModules,
    /// `MovePackage.linkage`
    Linkage,
    /// `MovePackage.typeOrigins`
    TypeOrigins,
    /// `MoveModule.package`
    ModulePackage,
    /// `MoveModule.struct`
    ModuleStruct,
    /// `MoveModule.structs`
    ModuleStructs,
    /// `MoveModule.function`
    ModuleFunction,
    /// `MoveModule.functions`
    ModuleFunctions,
    /// Module declaring a struct or function
    ParentModule,
    /// `MoveStruct.fields`
    StructFields,
    /// `MoveField.type`
    FieldType,
    /// `MoveFunction.visibility`
    Visibility,
    /// `MoveFunction.isEntry`
    IsEntry,
    /// `MoveFunction.parameters`
    Parameters,
    /// `MoveFunction.return`
    Return,
    /// `MoveValue.type` / `Event.type`
    ValueType,
    /// `MoveValue.json`
    Json,
    /// `MoveType.layout`
    Layout,
    /// `Linkage.originalId`
    OriginalId,
    /// `Linkage.upgradedId`
    UpgradedId,
    /// `TypeOrigin.module`
    OriginModule,
    /// `TypeOrigin.struct`
    OriginStruct,
    /// `TypeOrigin.definingId`
    DefiningId,

    // Checkpoints and epochs
    /// `Checkpoint.sequenceNumber`
    SequenceNumber,
    /// `Checkpoint.epoch`
    CheckpointEpoch,
    /// `Checkpoint.previousCheckpointDigest`
    PreviousCheckpointDigest,
    /// `Checkpoint.networkTotalTransactions`
    NetworkTotalTransactions,
    /// `Checkpoint.transactionBlocks`
    CheckpointTransactions,
    /// `Epoch.epochId`
    EpochId,
    /// `Epoch.referenceGasPrice`
    ReferenceGasPrice,
    /// `Epoch.protocolVersion`
    ProtocolVersion,
    /// `Epoch.startTimestamp`
    StartTimestamp,
    /// `Epoch.endTimestamp`
    EndTimestamp,
    /// `Epoch.checkpoints`
    EpochCheckpoints,

    // Transactions
    /// `TransactionBlock.gasInput`
    GasInput,
    /// `TransactionBlock.kind`
    TransactionKind,
    /// `TransactionBlock.signatures`
    Signatures,
    /// `TransactionBlock.effects`
    Effects,
    /// `TransactionBlock.expiration`
    Expiration,
    /// `GasInput.gasSponsor`
    GasSponsor,
    /// `GasInput.gasPayment`
    GasPayment,
    /// `GasInput.gasPrice`
    GasPrice,
    /// `GasInput.gasBudget`
    GasBudget,
    /// `TransactionEffects.status`
    Status,
    /// `TransactionEffects.errors`
    ExecutionError,
    /// `TransactionEffects.lamportVersion`
    LamportVersion,
    /// `TransactionEffects.gasSummary`
    GasSummary,
    /// `TransactionEffects.gasObject`
    GasObject,
    /// `TransactionEffects.objectChanges`
    ObjectChanges,
    /// `TransactionEffects.balanceChanges`
    BalanceChanges,
    /// `TransactionEffects.events`
    EffectsEvents,
    /// `TransactionEffects.checkpoint`
    EffectsCheckpoint,
    /// `TransactionEffects.dependencies`
    Dependencies,
    /// Transaction owning effects or an event
    TransactionOf,
    /// `GasCostSummary.computationCost`
    ComputationCost,
    /// `GasCostSummary.storageCost`
    StorageCost,
    /// `GasCostSummary.nonRefundableStorageFee`
    NonRefundableStorageFee,
    /// `ObjectChange.idCreated`
    IdCreated,
    /// `ObjectChange.idDeleted`
    IdDeleted,
    /// `ObjectChange.inputState`
    InputState,
    /// `ObjectChange.outputState`
    OutputState,
    /// `BalanceChange.owner`
    BalanceOwner,
    /// `BalanceChange.amount`
    Amount,
    /// `Event.sendingModule`
    SendingModule,

    // Service configuration
    /// `ServiceConfig.maxQueryDepth`
    MaxQueryDepth,
    /// `ServiceConfig.maxQueryNodes`
    MaxQueryNodes,
    /// `ServiceConfig.defaultPageSize`
    DefaultPageSize,
    /// `ServiceConfig.maxPageSize`
    MaxPageSize,
    /// `ServiceConfig.requestTimeoutMs`
    RequestTimeoutMs,
    /// `ServiceConfig.maxTransactionPayloadSize`
    MaxTransactionPayloadSize,
    /// `ServiceConfig.maxTypeArgumentDepth`
    MaxTypeArgumentDepth,
    /// `ServiceConfig.maxTypeNodes`
    MaxTypeNodes,
    /// `ServiceConfig.enabledFeatures`
    EnabledFeatures,
    /// `ServiceConfig.isEnabled`
    IsEnabled,
}

/// Registry entry
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Resolver selector
    pub field: Field,
    /// Return shape
    pub shape: Shape,
    /// Accepted arguments (pagination arguments are implied for connections)
    pub args: &'static [&'static str],
    /// Feature the field requires
    pub feature: Option<Feature>,
}

/// Arguments every connection accepts
pub const PAGE_ARGS: [&str; 4] = ["first", "after", "last", "before"];

/// Children of a connection field
pub const CONNECTION_FIELDS: [&str; 3] = ["edges", "nodes", "pageInfo"];

/// Children of `edges`
pub const EDGE_FIELDS: [&str; 2] = ["cursor", "node"];

/// Children of `pageInfo`
pub const PAGE_INFO_FIELDS: [&str; 4] = ["hasNextPage", "hasPreviousPage", "startCursor", "endCursor"];

const NO_ARGS: &[&str] = &[];

type Registry = HashMap<NodeType, HashMap<&'static str, FieldSpec>>;

struct Builder(Registry);

impl Builder {
    fn field(
        &mut self,
        on: &[NodeType],
        name: &'static str,
        field: Field,
        shape: Shape,
        args: &'static [&'static str],
    ) -> &mut Self {
        self.gated(on, name, field, shape, args, None)
    }

    fn gated(
        &mut self,
        on: &[NodeType],
        name: &'static str,
        field: Field,
        shape: Shape,
        args: &'static [&'static str],
        feature: Option<Feature>,
    ) -> &mut Self {
        for node in on {
            self.0.entry(*node).or_default().insert(
                name,
                FieldSpec {
                    field,
                    shape,
                    args,
                    feature,
                },
            );
        }
        self
    }
}

static REGISTRY: Lazy<Registry> = Lazy::new(build_registry);

/// Look up a field
pub fn lookup(node: NodeType, name: &str) -> Option<&'static FieldSpec> {
    REGISTRY.get(&node)?.get(name)
}

/// Every field registered on `node`, sorted by name
pub fn fields_of(node: NodeType) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = REGISTRY
        .get(&node)
        .map(|fields| fields.keys().copied().collect())
        .unwrap_or_default();
    names.sort_unstable();
    names
}

fn build_registry() -> Registry {
    use NodeType as N;
    use Shape::{Connection, List, Node, Scalar};

    const OBJECTS: &[NodeType] = &[N::Object, N::MoveObject, N::Coin, N::MovePackage];
    const MOVE_OBJECTS: &[NodeType] = &[N::MoveObject, N::Coin];
    const OWNERS: &[NodeType] = &[N::Address, N::Owner];

    let mut b = Builder(HashMap::new());

    for node in NodeType::ALL {
        b.field(&[node], "__typename", Field::Typename, Scalar, NO_ARGS);
    }

    // Root
    b.field(&[N::Query], "object", Field::QueryObject, Node(N::Object), &["address", "version"])
        .field(&[N::Query], "objects", Field::QueryObjects, Connection(N::Object), &["filter"])
        .field(&[N::Query], "address", Field::QueryAddress, Node(N::Address), &["address"])
        .field(&[N::Query], "owner", Field::QueryOwner, Node(N::Owner), &["address"])
        .field(&[N::Query], "checkpoint", Field::QueryCheckpoint, Node(N::Checkpoint), &["sequenceNumber"])
        .field(&[N::Query], "checkpoints", Field::QueryCheckpoints, Connection(N::Checkpoint), NO_ARGS)
        .field(&[N::Query], "transactionBlock", Field::QueryTransactionBlock, Node(N::TransactionBlock), &["digest"])
        .field(&[N::Query], "transactionBlocks", Field::QueryTransactionBlocks, Connection(N::TransactionBlock), &["filter"])
        .field(&[N::Query], "events", Field::QueryEvents, Connection(N::Event), &["filter"])
        .field(&[N::Query], "epoch", Field::QueryEpoch, Node(N::Epoch), &["id"])
        .field(&[N::Query], "type", Field::QueryType, Node(N::MoveType), &["type"])
        .field(&[N::Query], "package", Field::QueryPackage, Node(N::MovePackage), &["address"])
        .field(&[N::Query], "serviceConfig", Field::QueryServiceConfig, Node(N::ServiceConfig), NO_ARGS);

    // Objects
    b.field(OBJECTS, "address", Field::Address, Scalar, NO_ARGS)
        .field(OBJECTS, "version", Field::Version, Scalar, NO_ARGS)
        .field(OBJECTS, "digest", Field::Digest, Scalar, NO_ARGS)
        .field(OBJECTS, "owner", Field::ObjectOwner, Node(N::ObjectOwner), NO_ARGS)
        .field(OBJECTS, "previousTransactionBlock", Field::PreviousTransaction, Node(N::TransactionBlock), NO_ARGS)
        .field(OBJECTS, "storageRebate", Field::StorageRebate, Scalar, NO_ARGS)
        .field(&[N::Object], "asMoveObject", Field::AsMoveObject, Node(N::MoveObject), NO_ARGS)
        .field(&[N::Object], "asMovePackage", Field::AsMovePackage, Node(N::MovePackage), NO_ARGS)
        .gated(
            &[N::Object, N::MoveObject, N::Coin],
            "dynamicFields",
            Field::DynamicFields,
            Connection(N::Object),
            NO_ARGS,
            Some(Feature::DynamicFields),
        )
        .field(MOVE_OBJECTS, "contents", Field::Contents, Node(N::MoveValue), NO_ARGS)
        .field(MOVE_OBJECTS, "hasPublicTransfer", Field::HasPublicTransfer, Scalar, NO_ARGS)
        .gated(&[N::MoveObject], "asCoin", Field::AsCoin, Node(N::Coin), NO_ARGS, Some(Feature::Coins))
        .field(&[N::Coin], "coinBalance", Field::CoinBalance, Scalar, NO_ARGS);

    // Ownership
    b.field(&[N::ObjectOwner], "kind", Field::OwnerKind, Scalar, NO_ARGS)
        .field(&[N::ObjectOwner], "owner", Field::OwnerOf, Node(N::Owner), NO_ARGS)
        .field(&[N::ObjectOwner], "initialSharedVersion", Field::InitialSharedVersion, Scalar, NO_ARGS)
        .field(OWNERS, "address", Field::Address, Scalar, NO_ARGS)
        .field(OWNERS, "objects", Field::OwnedObjects, Connection(N::Object), &["filter"])
        .gated(OWNERS, "balance", Field::Balance, Node(N::Balance), &["type"], Some(Feature::Coins))
        .gated(OWNERS, "balances", Field::Balances, Connection(N::Balance), NO_ARGS, Some(Feature::Coins))
        .gated(OWNERS, "coins", Field::Coins, Connection(N::Coin), &["type"], Some(Feature::Coins))
        .field(OWNERS, "transactionBlocks", Field::SentTransactions, Connection(N::TransactionBlock), &["filter"])
        .field(&[N::Owner], "asAddress", Field::AsAddress, Node(N::Address), NO_ARGS)
        .field(&[N::Owner], "asObject", Field::AsObject, Node(N::Object), NO_ARGS)
        .gated(
            &[N::Owner],
            "dynamicFields",
            Field::DynamicFields,
            Connection(N::Object),
            NO_ARGS,
            Some(Feature::DynamicFields),
        )
        .field(&[N::Balance], "coinType", Field::CoinType, Node(N::MoveType), NO_ARGS)
        .field(&[N::Balance], "coinObjectCount", Field::CoinObjectCount, Scalar, NO_ARGS)
        .field(&[N::Balance], "totalBalance", Field::TotalBalance, Scalar, NO_ARGS);

    // Packages and declarations
    b.field(&[N::MovePackage], "module", Field::PackageModule, Node(N::MoveModule), &["name"])
        .field(&[N::MovePackage], "modules", Field::PackageModules, Connection(N::MoveModule), NO_ARGS)
        .field(&[N::MovePackage], "linkage", Field::Linkage, List(N::Linkage), NO_ARGS)
        .field(&[N::MovePackage], "typeOrigins", Field::TypeOrigins, List(N::TypeOrigin), NO_ARGS)
        .field(&[N::MoveModule], "package", Field::ModulePackage, Node(N::MovePackage), NO_ARGS)
        .field(&[N::MoveModule, N::MoveStruct, N::MoveFunction, N::MoveField], "name", Field::Name, Scalar, NO_ARGS)
        .field(&[N::MoveModule], "struct", Field::ModuleStruct, Node(N::MoveStruct), &["name"])
        .field(&[N::MoveModule], "structs", Field::ModuleStructs, Connection(N::MoveStruct), NO_ARGS)
        .field(&[N::MoveModule], "function", Field::ModuleFunction, Node(N::MoveFunction), &["name"])
        .field(&[N::MoveModule], "functions", Field::ModuleFunctions, Connection(N::MoveFunction), NO_ARGS)
        .field(&[N::MoveStruct, N::MoveFunction], "module", Field::ParentModule, Node(N::MoveModule), NO_ARGS)
        .field(&[N::MoveStruct, N::MoveType], "abilities", Field::Abilities, Scalar, NO_ARGS)
        .field(&[N::MoveStruct, N::MoveFunction], "typeParameters", Field::TypeParameters, Scalar, NO_ARGS)
        .field(&[N::MoveStruct], "fields", Field::StructFields, List(N::MoveField), NO_ARGS)
        .field(&[N::MoveField], "type", Field::FieldType, Node(N::OpenMoveType), NO_ARGS)
        .field(&[N::MoveFunction], "visibility", Field::Visibility, Scalar, NO_ARGS)
        .field(&[N::MoveFunction], "isEntry", Field::IsEntry, Scalar, NO_ARGS)
        .field(&[N::MoveFunction], "parameters", Field::Parameters, List(N::OpenMoveType), NO_ARGS)
        .field(&[N::MoveFunction], "return", Field::Return, List(N::OpenMoveType), NO_ARGS)
        .field(&[N::OpenMoveType, N::MoveType], "repr", Field::Repr, Scalar, NO_ARGS)
        .field(&[N::OpenMoveType, N::MoveType], "signature", Field::Signature, Scalar, NO_ARGS)
        .field(&[N::MoveType], "layout", Field::Layout, Scalar, NO_ARGS)
        .field(&[N::MoveValue, N::Event], "type", Field::ValueType, Node(N::MoveType), NO_ARGS)
        .field(&[N::MoveValue], "bcs", Field::Bcs, Scalar, NO_ARGS)
        .field(&[N::MoveValue], "json", Field::Json, Scalar, NO_ARGS)
        .field(&[N::Linkage], "originalId", Field::OriginalId, Scalar, NO_ARGS)
        .field(&[N::Linkage], "upgradedId", Field::UpgradedId, Scalar, NO_ARGS)
        .field(&[N::Linkage], "version", Field::Version, Scalar, NO_ARGS)
        .field(&[N::TypeOrigin], "module", Field::OriginModule, Scalar, NO_ARGS)
        .field(&[N::TypeOrigin], "struct", Field::OriginStruct, Scalar, NO_ARGS)
        .field(&[N::TypeOrigin], "definingId", Field::DefiningId, Scalar, NO_ARGS);

    // Checkpoints and epochs
    b.field(&[N::Checkpoint], "sequenceNumber", Field::SequenceNumber, Scalar, NO_ARGS)
        .field(&[N::Checkpoint, N::TransactionBlock], "digest", Field::Digest, Scalar, NO_ARGS)
        .field(&[N::Checkpoint, N::TransactionEffects, N::Event], "timestamp", Field::Timestamp, Scalar, NO_ARGS)
        .field(&[N::Checkpoint], "epoch", Field::CheckpointEpoch, Node(N::Epoch), NO_ARGS)
        .field(&[N::Checkpoint], "previousCheckpointDigest", Field::PreviousCheckpointDigest, Scalar, NO_ARGS)
        .field(&[N::Checkpoint], "networkTotalTransactions", Field::NetworkTotalTransactions, Scalar, NO_ARGS)
        .field(&[N::Checkpoint], "transactionBlocks", Field::CheckpointTransactions, Connection(N::TransactionBlock), &["filter"])
        .field(&[N::Epoch], "epochId", Field::EpochId, Scalar, NO_ARGS)
        .field(&[N::Epoch], "referenceGasPrice", Field::ReferenceGasPrice, Scalar, NO_ARGS)
        .field(&[N::Epoch], "protocolVersion", Field::ProtocolVersion, Scalar, NO_ARGS)
        .field(&[N::Epoch], "startTimestamp", Field::StartTimestamp, Scalar, NO_ARGS)
        .field(&[N::Epoch], "endTimestamp", Field::EndTimestamp, Scalar, NO_ARGS)
        .field(&[N::Epoch], "checkpoints", Field::EpochCheckpoints, Connection(N::Checkpoint), NO_ARGS);

    // Transactions
    b.field(&[N::TransactionBlock, N::Event], "sender", Field::Sender, Node(N::Address), NO_ARGS)
        .field(&[N::TransactionBlock], "gasInput", Field::GasInput, Node(N::GasInput), NO_ARGS)
        .field(&[N::TransactionBlock], "kind", Field::TransactionKind, Scalar, NO_ARGS)
        .field(&[N::TransactionBlock], "bcs", Field::Bcs, Scalar, NO_ARGS)
        .field(&[N::TransactionBlock], "signatures", Field::Signatures, Scalar, NO_ARGS)
        .field(&[N::TransactionBlock], "effects", Field::Effects, Node(N::TransactionEffects), NO_ARGS)
        .field(&[N::TransactionBlock], "expiration", Field::Expiration, Node(N::Epoch), NO_ARGS)
        .field(&[N::GasInput], "gasSponsor", Field::GasSponsor, Node(N::Address), NO_ARGS)
        .field(&[N::GasInput], "gasPayment", Field::GasPayment, List(N::Object), NO_ARGS)
        .field(&[N::GasInput], "gasPrice", Field::GasPrice, Scalar, NO_ARGS)
        .field(&[N::GasInput], "gasBudget", Field::GasBudget, Scalar, NO_ARGS)
        .field(&[N::TransactionEffects], "status", Field::Status, Scalar, NO_ARGS)
        .field(&[N::TransactionEffects], "errors", Field::ExecutionError, Scalar, NO_ARGS)
        .field(&[N::TransactionEffects], "lamportVersion", Field::LamportVersion, Scalar, NO_ARGS)
        .field(&[N::TransactionEffects], "gasSummary", Field::GasSummary, Node(N::GasCostSummary), NO_ARGS)
        .field(&[N::TransactionEffects], "gasObject", Field::GasObject, Node(N::Object), NO_ARGS)
        .field(&[N::TransactionEffects], "objectChanges", Field::ObjectChanges, Connection(N::ObjectChange), NO_ARGS)
        .field(&[N::TransactionEffects], "balanceChanges", Field::BalanceChanges, Connection(N::BalanceChange), NO_ARGS)
        .field(&[N::TransactionEffects], "events", Field::EffectsEvents, Connection(N::Event), NO_ARGS)
        .field(&[N::TransactionEffects], "checkpoint", Field::EffectsCheckpoint, Node(N::Checkpoint), NO_ARGS)
        .field(&[N::TransactionEffects], "dependencies", Field::Dependencies, Scalar, NO_ARGS)
        .field(&[N::TransactionEffects, N::Event], "transactionBlock", Field::TransactionOf, Node(N::TransactionBlock), NO_ARGS)
        .field(&[N::GasCostSummary], "computationCost", Field::ComputationCost, Scalar, NO_ARGS)
        .field(&[N::GasCostSummary], "storageCost", Field::StorageCost, Scalar, NO_ARGS)
        .field(&[N::GasCostSummary], "storageRebate", Field::StorageRebate, Scalar, NO_ARGS)
        .field(&[N::GasCostSummary], "nonRefundableStorageFee", Field::NonRefundableStorageFee, Scalar, NO_ARGS)
        .field(&[N::ObjectChange], "address", Field::Address, Scalar, NO_ARGS)
        .field(&[N::ObjectChange], "idCreated", Field::IdCreated, Scalar, NO_ARGS)
        .field(&[N::ObjectChange], "idDeleted", Field::IdDeleted, Scalar, NO_ARGS)
        .field(&[N::ObjectChange], "inputState", Field::InputState, Node(N::Object), NO_ARGS)
        .field(&[N::ObjectChange], "outputState", Field::OutputState, Node(N::Object), NO_ARGS)
        .field(&[N::BalanceChange], "owner", Field::BalanceOwner, Node(N::Owner), NO_ARGS)
        .field(&[N::BalanceChange], "coinType", Field::CoinType, Node(N::MoveType), NO_ARGS)
        .field(&[N::BalanceChange], "amount", Field::Amount, Scalar, NO_ARGS)
        .field(&[N::Event], "sendingModule", Field::SendingModule, Node(N::MoveModule), NO_ARGS)
        .field(&[N::Event], "contents", Field::Contents, Node(N::MoveValue), NO_ARGS);

    // Service configuration
    const SC: &[NodeType] = &[N::ServiceConfig];
    b.field(SC, "maxQueryDepth", Field::MaxQueryDepth, Scalar, NO_ARGS)
        .field(SC, "maxQueryNodes", Field::MaxQueryNodes, Scalar, NO_ARGS)
        .field(SC, "defaultPageSize", Field::DefaultPageSize, Scalar, NO_ARGS)
        .field(SC, "maxPageSize", Field::MaxPageSize, Scalar, NO_ARGS)
        .field(SC, "requestTimeoutMs", Field::RequestTimeoutMs, Scalar, NO_ARGS)
        .field(SC, "maxTransactionPayloadSize", Field::MaxTransactionPayloadSize, Scalar, NO_ARGS)
        .field(SC, "maxTypeArgumentDepth", Field::MaxTypeArgumentDepth, Scalar, NO_ARGS)
        .field(SC, "maxTypeNodes", Field::MaxTypeNodes, Scalar, NO_ARGS)
        .field(SC, "enabledFeatures", Field::EnabledFeatures, Scalar, NO_ARGS)
        .field(SC, "isEnabled", Field::IsEnabled, Scalar, &["feature"]);

    b.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_shared_field() {
        let on_object = lookup(NodeType::Object, "address").unwrap();
        let on_owner = lookup(NodeType::Owner, "address").unwrap();
        assert_eq!(on_object.field, Field::Address);
        assert_eq!(on_owner.field, Field::Address);
        assert!(lookup(NodeType::Checkpoint, "address").is_none());
    }

    #[test]
    fn test_connection_shapes() {
        let spec = lookup(NodeType::MoveModule, "structs").unwrap();
        assert_eq!(spec.shape, Shape::Connection(NodeType::MoveStruct));
        let spec = lookup(NodeType::Query, "objects").unwrap();
        assert_eq!(spec.args, &["filter"]);
    }

    #[test]
    fn test_feature_gates() {
        assert_eq!(
            lookup(NodeType::Address, "coins").unwrap().feature,
            Some(Feature::Coins)
        );
        assert_eq!(lookup(NodeType::Address, "objects").unwrap().feature, None);
    }

    #[test]
    fn test_every_node_has_typename() {
        for node in NodeType::ALL {
            assert!(fields_of(node).contains(&"__typename"), "{}", node);
        }
    }
}
