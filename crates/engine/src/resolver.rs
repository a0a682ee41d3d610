//! Query resolution
//!
//! [`Resolver::execute`] validates a query, pins one checkpoint, and walks the
//! selection tree. Sibling fields and list items resolve concurrently; every
//! adapter call first takes a permit from a per-request semaphore, so the
//! number of reads in flight never exceeds `max_concurrent_nodes`.
//!
//! ## Field errors
//!
//! | Class | Effect |
//! |-------|--------|
//! | `NotFound` | field is `null` |
//! | `DataUnavailable` | field is `null`, error recorded with its path |
//! | `Client`, `Internal` | the whole request fails |

use crate::capability::{
    CoinView, HasMoveContents, MoveObjectView, ObjectView, Ownable, PackageView, VersionedObject,
};
use crate::limits::{EngineConfig, Feature};
use crate::pagination::{Connection, Page, PageArgs, PageInfo};
use crate::query::{Query, QueryNode};
use crate::schema::{self, Field, NodeType, Shape};
use crate::typing::TypeResolver;
use crate::validate::{validate, validate_rooted};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chainql_core::filter::{ObjectFields, TransactionFields};
use chainql_core::signature::FRAMEWORK_ADDRESS;
use chainql_core::{
    Address, BalanceChange, ChainqlError, ChainqlResult, Checkpoint, Digest, Epoch, ErrorClass,
    EventFilter, Filter, FingerprintBuilder, IdOperation, IndexedEvent, Object, ObjectChange,
    ObjectFilter, ObjectKey, ObjectRef, OpenSignature, Owner, SequenceNumber, TransactionBlock,
    TransactionFilter, TypeFilter, TypeOrigin, TypeSignature, UpgradeInfo,
};
use chainql_storage::{ObjectStore, ScanDirection, ScanRange, StoreSnapshot};
use chrono::{SecondsFormat, TimeZone, Utc};
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Coins read per adapter call when aggregating balances
const BALANCE_SCAN_BATCH: usize = 256;

// ============================================================================
// Response
// ============================================================================

/// One step of a response path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Response key
    Key(String),
    /// List position
    Index(usize),
}

type Path = Vec<PathSegment>;

/// Error attached to one field of an otherwise successful response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Description
    pub message: String,
    /// Machine-readable code
    pub code: String,
    /// Where in the response the field sits
    pub path: Vec<PathSegment>,
}

/// Resolved data plus field-level errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Response tree
    pub data: JsonValue,
    /// Fields that resolved to `null` because data was unavailable
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves queries against one object store
pub struct Resolver {
    store: Arc<dyn ObjectStore>,
    config: Arc<EngineConfig>,
    types: Arc<TypeResolver>,
}

impl Resolver {
    /// Resolver over `store`
    pub fn new(store: Arc<dyn ObjectStore>, config: EngineConfig) -> Self {
        let types = Arc::new(TypeResolver::new(&config.limits));
        Resolver {
            store,
            config: Arc::new(config),
            types,
        }
    }

    /// Configuration in force
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Resolver over another store with the same configuration
    ///
    /// The type cache is not shared: declarations visible through `store`
    /// (a simulated publish, say) must not leak into this resolver's cache.
    pub fn with_store(&self, store: Arc<dyn ObjectStore>) -> Self {
        Resolver {
            store,
            config: Arc::clone(&self.config),
            types: Arc::new(TypeResolver::new(&self.config.limits)),
        }
    }

    /// Validate and resolve `query` at `checkpoint` (latest if `None`)
    pub async fn execute(&self, query: &Query, checkpoint: Option<u64>) -> ChainqlResult<QueryResponse> {
        if let Err(e) = validate(query, &self.config) {
            info!(target: "chainql::engine", code = e.code(), error = %e, "Rejected query");
            return Err(e);
        }
        let nodes = query.node_count();
        self.bounded(async move {
            let snapshot = StoreSnapshot::pin(Arc::clone(&self.store), checkpoint).await?;
            debug!(target: "chainql::engine", checkpoint = snapshot.checkpoint(), nodes, "Resolving query");
            let request = Request::new(self, snapshot);
            let data = request
                .resolve_selection(NodeType::Query, &Value::Root, &query.selection, Vec::new())
                .await?;
            Ok(request.finish(data))
        })
        .await
    }

    /// Resolve `selection` against one transaction block
    ///
    /// Used for simulated transactions, which are not reachable from the
    /// query root.
    pub async fn resolve_transaction(
        &self,
        transaction: Arc<TransactionBlock>,
        selection: &[QueryNode],
    ) -> ChainqlResult<QueryResponse> {
        if let Err(e) = validate_rooted(NodeType::TransactionBlock, selection, &self.config) {
            info!(target: "chainql::engine", code = e.code(), error = %e, "Rejected selection");
            return Err(e);
        }
        self.bounded(async move {
            let snapshot = StoreSnapshot::pin(Arc::clone(&self.store), None).await?;
            debug!(target: "chainql::engine", checkpoint = snapshot.checkpoint(), digest = %transaction.digest, "Resolving transaction selection");
            let request = Request::new(self, snapshot);
            let root = Value::Transaction(transaction);
            let data = request
                .resolve_selection(NodeType::TransactionBlock, &root, selection, Vec::new())
                .await?;
            Ok(request.finish(data))
        })
        .await
    }

    async fn bounded<F>(&self, work: F) -> ChainqlResult<QueryResponse>
    where
        F: Future<Output = ChainqlResult<QueryResponse>>,
    {
        let timeout_ms = self.config.limits.request_timeout_ms;
        match tokio::time::timeout(Duration::from_millis(timeout_ms), work).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => {
                if e.class() == ErrorClass::Internal {
                    error!(target: "chainql::engine", error = %e, "Query failed");
                } else {
                    info!(target: "chainql::engine", code = e.code(), error = %e, "Query aborted");
                }
                Err(e)
            }
            Err(_) => {
                warn!(target: "chainql::engine", timeout_ms, "Query timed out");
                Err(ChainqlError::Timeout { timeout_ms })
            }
        }
    }
}

// ============================================================================
// Values
// ============================================================================

/// Module of a package
#[derive(Debug, Clone)]
struct ModuleRef {
    package: PackageView,
    module: String,
}

impl ModuleRef {
    fn decl(&self) -> ChainqlResult<&chainql_core::ModuleDecl> {
        self.package.package().module(&self.module).ok_or_else(|| {
            ChainqlError::internal(format!("module {} vanished from package", self.module))
        })
    }
}

/// Struct or function of a module
#[derive(Debug, Clone)]
struct MemberRef {
    module: ModuleRef,
    name: String,
}

impl MemberRef {
    fn struct_decl(&self) -> ChainqlResult<&chainql_core::StructDecl> {
        self.module
            .decl()?
            .structs
            .get(&self.name)
            .ok_or_else(|| ChainqlError::internal(format!("struct {} vanished", self.name)))
    }

    fn function_decl(&self) -> ChainqlResult<&chainql_core::FunctionDecl> {
        self.module
            .decl()?
            .functions
            .get(&self.name)
            .ok_or_else(|| ChainqlError::internal(format!("function {} vanished", self.name)))
    }
}

/// Parent value a field is resolved against
#[derive(Debug, Clone)]
enum Value {
    Root,
    Object(ObjectView),
    MoveObject(MoveObjectView),
    Coin(CoinView),
    Package(PackageView),
    Module(ModuleRef),
    Struct(MemberRef),
    Function(MemberRef),
    MoveField { name: String, signature: OpenSignature },
    OpenType(OpenSignature),
    MoveValue { type_: TypeSignature, bcs: Arc<[u8]> },
    MoveType(TypeSignature),
    Address(Address),
    Owner(Address),
    ObjectOwner(Owner),
    Balance { coin_type: TypeSignature, count: u64, total: u128 },
    Checkpoint(Arc<Checkpoint>),
    Epoch(Arc<Epoch>),
    Transaction(Arc<TransactionBlock>),
    GasInput(Arc<TransactionBlock>),
    Effects(Arc<TransactionBlock>),
    GasSummary(chainql_core::GasCostSummary),
    ObjectChange(ObjectChange),
    BalanceChange(BalanceChange),
    Event(Arc<IndexedEvent>),
    Linkage(Address, UpgradeInfo),
    TypeOrigin(TypeOrigin),
    ServiceConfig,
}

/// What a field produced, before its selection is applied
enum Resolved {
    Json(JsonValue),
    Node(Option<Value>),
    List(Vec<Value>),
    Connection(Connection<Value>),
}

impl Resolved {
    fn json(value: impl Into<JsonValue>) -> Self {
        Resolved::Json(value.into())
    }

    /// Wide integers travel as decimal strings
    fn number(value: impl ToString) -> Self {
        Resolved::Json(JsonValue::String(value.to_string()))
    }

    fn opt<T: Into<JsonValue>>(value: Option<T>) -> Self {
        Resolved::Json(value.map_or(JsonValue::Null, Into::into))
    }

    fn serialized<T: Serialize>(value: &T) -> ChainqlResult<Self> {
        serde_json::to_value(value)
            .map(Resolved::Json)
            .map_err(|e| ChainqlError::internal(format!("failed to render value: {}", e)))
    }
}

fn address_json(a: &Address) -> JsonValue {
    JsonValue::String(a.to_string())
}

fn timestamp(ms: u64) -> JsonValue {
    i64::try_from(ms)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map_or(JsonValue::Null, |t| {
            JsonValue::String(t.to_rfc3339_opts(SecondsFormat::Millis, true))
        })
}

/// Narrow a caller's object filter to one owner or parent
fn owned_filter(user: ObjectFilter, owner: Option<Address>, parent: Option<Address>) -> ObjectFilter {
    match user {
        Filter::Fields(mut f) if f.owner.is_none() && f.parent.is_none() => {
            f.owner = owner;
            f.parent = parent;
            Filter::Fields(f)
        }
        other => Filter::All(vec![
            Filter::Fields(ObjectFields {
                owner,
                parent,
                ..Default::default()
            }),
            other,
        ]),
    }
}

/// Narrow a caller's transaction filter by `scope`
fn scoped_transactions(user: TransactionFilter, scope: TransactionFields) -> TransactionFilter {
    match user {
        Filter::Fields(f) if f == TransactionFields::default() => Filter::Fields(scope),
        other => Filter::All(vec![Filter::Fields(scope), other]),
    }
}

fn parse_address(node: &QueryNode, key: &str) -> ChainqlResult<Address> {
    Ok(Address::from_hex(node.str_arg(key)?)?)
}

// ============================================================================
// Request
// ============================================================================

/// State of one request
struct Request<'r> {
    resolver: &'r Resolver,
    snapshot: StoreSnapshot,
    permits: Semaphore,
    errors: Mutex<Vec<FieldError>>,
}

impl<'r> Request<'r> {
    fn new(resolver: &'r Resolver, snapshot: StoreSnapshot) -> Self {
        Request {
            resolver,
            snapshot,
            permits: Semaphore::new(resolver.config.limits.max_concurrent_nodes.max(1)),
            errors: Mutex::new(Vec::new()),
        }
    }

    fn config(&self) -> &EngineConfig {
        &self.resolver.config
    }

    fn types(&self) -> &TypeResolver {
        &self.resolver.types
    }

    fn finish(self, data: JsonValue) -> QueryResponse {
        let mut errors = self.errors.into_inner();
        errors.sort_by(|a, b| a.path.cmp(&b.path));
        QueryResponse { data, errors }
    }

    /// Run one adapter call under a concurrency permit
    async fn io<T>(&self, read: impl Future<Output = ChainqlResult<T>>) -> ChainqlResult<T> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ChainqlError::internal("resolver semaphore closed"))?;
        read.await
    }

    /// Apply the field error policy
    fn absorb(&self, result: ChainqlResult<JsonValue>, path: &Path) -> ChainqlResult<JsonValue> {
        let e = match result {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        match e.class() {
            ErrorClass::NotFound => Ok(JsonValue::Null),
            ErrorClass::DataUnavailable => {
                self.errors.lock().push(FieldError {
                    message: e.to_string(),
                    code: e.code().to_string(),
                    path: path.clone(),
                });
                Ok(JsonValue::Null)
            }
            ErrorClass::Client | ErrorClass::Internal => Err(e),
        }
    }

    // ------------------------------------------------------------------------
    // Tree walk
    // ------------------------------------------------------------------------

    fn resolve_selection<'a>(
        &'a self,
        ty: NodeType,
        parent: &'a Value,
        selection: &'a [QueryNode],
        path: Path,
    ) -> BoxFuture<'a, ChainqlResult<JsonValue>> {
        async move {
            let fields = selection
                .iter()
                .map(|node| self.resolve_child(ty, parent, node, path.clone()));
            let resolved = try_join_all(fields).await?;
            Ok(JsonValue::Object(resolved.into_iter().collect::<Map<_, _>>()))
        }
        .boxed()
    }

    async fn resolve_child(
        &self,
        ty: NodeType,
        parent: &Value,
        node: &QueryNode,
        mut path: Path,
    ) -> ChainqlResult<(String, JsonValue)> {
        let key = node.response_key().to_string();
        path.push(PathSegment::Key(key.clone()));
        let spec = schema::lookup(ty, &node.name).ok_or_else(|| {
            ChainqlError::internal(format!("unvalidated field {}.{}", ty, node.name))
        })?;

        let result = match self.fetch(ty, parent, node, spec.field).await {
            Ok(resolved) => self.render(spec.shape, resolved, node, &path).await,
            Err(e) => Err(e),
        };
        Ok((key, self.absorb(result, &path)?))
    }

    async fn render(
        &self,
        shape: Shape,
        resolved: Resolved,
        node: &QueryNode,
        path: &Path,
    ) -> ChainqlResult<JsonValue> {
        match (shape, resolved) {
            (Shape::Scalar, Resolved::Json(v)) => Ok(v),
            (Shape::Node(_), Resolved::Node(None)) => Ok(JsonValue::Null),
            (Shape::Node(ty), Resolved::Node(Some(value))) => {
                self.resolve_selection(ty, &value, &node.selection, path.clone())
                    .await
            }
            (Shape::List(ty), Resolved::List(items)) => {
                let rendered = items.iter().enumerate().map(|(i, item)| {
                    let mut p = path.clone();
                    p.push(PathSegment::Index(i));
                    self.resolve_selection(ty, item, &node.selection, p)
                });
                Ok(JsonValue::Array(try_join_all(rendered).await?))
            }
            (Shape::Connection(ty), Resolved::Connection(connection)) => {
                self.render_connection(ty, connection, node, path).await
            }
            (shape, _) => Err(ChainqlError::internal(format!(
                "field '{}' resolved to the wrong shape ({:?})",
                node.name, shape
            ))),
        }
    }

    async fn render_connection(
        &self,
        ty: NodeType,
        connection: Connection<Value>,
        node: &QueryNode,
        path: &Path,
    ) -> ChainqlResult<JsonValue> {
        let mut out = Map::new();
        for part in &node.selection {
            let mut part_path = path.clone();
            part_path.push(PathSegment::Key(part.response_key().to_string()));

            let value = match part.name.as_str() {
                "nodes" => {
                    let items = connection.edges.iter().enumerate().map(|(i, edge)| {
                        let mut p = part_path.clone();
                        p.push(PathSegment::Index(i));
                        self.resolve_selection(ty, &edge.node, &part.selection, p)
                    });
                    JsonValue::Array(try_join_all(items).await?)
                }
                "edges" => {
                    let items = connection.edges.iter().enumerate().map(|(i, edge)| {
                        let mut edge_path = part_path.clone();
                        edge_path.push(PathSegment::Index(i));
                        async move {
                            let mut obj = Map::new();
                            for f in &part.selection {
                                let value = match f.name.as_str() {
                                    "cursor" => JsonValue::String(edge.cursor.as_str().to_string()),
                                    _ => {
                                        let mut p = edge_path.clone();
                                        p.push(PathSegment::Key(f.response_key().to_string()));
                                        self.resolve_selection(ty, &edge.node, &f.selection, p)
                                            .await?
                                    }
                                };
                                obj.insert(f.response_key().to_string(), value);
                            }
                            Ok::<_, ChainqlError>(JsonValue::Object(obj))
                        }
                    });
                    JsonValue::Array(try_join_all(items).await?)
                }
                _ => page_info_json(&connection.page_info, &part.selection),
            };
            out.insert(part.response_key().to_string(), value);
        }
        Ok(JsonValue::Object(out))
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    async fn fetch(&self, ty: NodeType, parent: &Value, node: &QueryNode, field: Field) -> ChainqlResult<Resolved> {
        if field == Field::Typename {
            return Ok(Resolved::json(ty.name()));
        }
        let resolved = match parent {
            Value::Root => self.fetch_root(node, field).await?,
            Value::Object(v) => match self.fetch_versioned(v, node, field).await? {
                Some(r) => Some(r),
                None => match field {
                    Field::AsMoveObject => Some(Resolved::Node(v.as_move_object().map(Value::MoveObject))),
                    Field::AsMovePackage => Some(Resolved::Node(v.as_package().map(Value::Package))),
                    _ => None,
                },
            },
            Value::MoveObject(v) => match self.fetch_versioned(v, node, field).await? {
                Some(r) => Some(r),
                None => match field {
                    Field::AsCoin => Some(Resolved::Node(v.as_coin().map(Value::Coin))),
                    _ => contents_field(v, field),
                },
            },
            Value::Coin(v) => match self.fetch_versioned(v, node, field).await? {
                Some(r) => Some(r),
                None => match field {
                    Field::CoinBalance => Some(Resolved::number(v.balance()?)),
                    _ => contents_field(v, field),
                },
            },
            Value::Package(v) => match self.fetch_versioned(v, node, field).await? {
                Some(r) => Some(r),
                None => self.fetch_package(v, node, field)?,
            },
            Value::Module(m) => self.fetch_module(m, node, field)?,
            Value::Struct(s) => fetch_struct(s, field)?,
            Value::Function(f) => fetch_function(f, field)?,
            Value::MoveField { name, signature } => match field {
                Field::Name => Some(Resolved::json(name.as_str())),
                Field::FieldType => Some(Resolved::Node(Some(Value::OpenType(signature.clone())))),
                _ => None,
            },
            Value::OpenType(sig) => match field {
                Field::Repr => Some(Resolved::json(sig.repr())),
                Field::Signature => Some(Resolved::serialized(sig)?),
                _ => None,
            },
            Value::MoveValue { type_, bcs } => self.fetch_move_value(type_, bcs, field).await?,
            Value::MoveType(sig) => self.fetch_move_type(sig, field).await?,
            Value::Address(a) | Value::Owner(a) => self.fetch_owner(ty, *a, node, field).await?,
            Value::ObjectOwner(owner) => match field {
                Field::OwnerKind => Some(Resolved::json(owner.kind())),
                Field::OwnerOf => Some(Resolved::Node(owner.owner_address().map(Value::Owner))),
                Field::InitialSharedVersion => Some(Resolved::opt(match owner {
                    Owner::Shared {
                        initial_shared_version,
                    } => Some(initial_shared_version.value().to_string()),
                    _ => None,
                })),
                _ => None,
            },
            Value::Balance {
                coin_type,
                count,
                total,
            } => match field {
                Field::CoinType => Some(Resolved::Node(Some(Value::MoveType(coin_type.clone())))),
                Field::CoinObjectCount => Some(Resolved::number(count)),
                Field::TotalBalance => Some(Resolved::number(total)),
                _ => None,
            },
            Value::Checkpoint(cp) => self.fetch_checkpoint(cp, node, field).await?,
            Value::Epoch(epoch) => self.fetch_epoch(epoch, node, field).await?,
            Value::Transaction(tx) => self.fetch_transaction(tx, field).await?,
            Value::GasInput(tx) => self.fetch_gas_input(tx, field).await?,
            Value::Effects(tx) => self.fetch_effects(tx, node, field).await?,
            Value::GasSummary(gas) => match field {
                Field::ComputationCost => Some(Resolved::number(gas.computation_cost)),
                Field::StorageCost => Some(Resolved::number(gas.storage_cost)),
                Field::StorageRebate => Some(Resolved::number(gas.storage_rebate)),
                Field::NonRefundableStorageFee => Some(Resolved::number(gas.non_refundable_storage_fee)),
                _ => None,
            },
            Value::ObjectChange(change) => self.fetch_object_change(change, field).await?,
            Value::BalanceChange(change) => match field {
                Field::BalanceOwner => Some(Resolved::Node(change.owner.owner_address().map(Value::Owner))),
                Field::CoinType => Some(Resolved::Node(Some(Value::MoveType(change.coin_type.clone())))),
                Field::Amount => Some(Resolved::number(change.amount)),
                _ => None,
            },
            Value::Event(event) => self.fetch_event(event, field).await?,
            Value::Linkage(original, info) => match field {
                Field::OriginalId => Some(Resolved::Json(address_json(original))),
                Field::UpgradedId => Some(Resolved::Json(address_json(&info.upgraded_id))),
                Field::Version => Some(Resolved::number(info.upgraded_version.value())),
                _ => None,
            },
            Value::TypeOrigin(origin) => match field {
                Field::OriginModule => Some(Resolved::json(origin.module.as_str())),
                Field::OriginStruct => Some(Resolved::json(origin.struct_name.as_str())),
                Field::DefiningId => Some(Resolved::Json(address_json(&origin.defining_id))),
                _ => None,
            },
            Value::ServiceConfig => self.fetch_service_config(node, field)?,
        };
        resolved.ok_or_else(|| {
            ChainqlError::internal(format!("no resolver for {}.{} ({:?})", ty, node.name, field))
        })
    }

    // ------------------------------------------------------------------------
    // Root
    // ------------------------------------------------------------------------

    async fn fetch_root(&self, node: &QueryNode, field: Field) -> ChainqlResult<Option<Resolved>> {
        let snapshot = &self.snapshot;
        Ok(Some(match field {
            Field::QueryObject => {
                let id = parse_address(node, "address")?;
                let version = node.u64_arg("version")?.map(SequenceNumber);
                let object = self.io(snapshot.object(&id, version)).await?;
                Resolved::Node(object.map(|o| Value::Object(ObjectView(o))))
            }
            Field::QueryObjects => {
                let filter = object_filter_arg(node)?;
                self.object_connection("objects", filter, node, |o| Some(Value::Object(ObjectView(o))))
                    .await?
            }
            Field::QueryAddress => Resolved::Node(Some(Value::Address(parse_address(node, "address")?))),
            Field::QueryOwner => Resolved::Node(Some(Value::Owner(parse_address(node, "address")?))),
            Field::QueryCheckpoint => {
                let seq = node.u64_arg("sequenceNumber")?;
                let cp = self.io(snapshot.checkpoint_at(seq)).await?;
                Resolved::Node(cp.map(|c| Value::Checkpoint(Arc::new(c))))
            }
            Field::QueryCheckpoints => self.checkpoint_connection("checkpoints", None, node).await?,
            Field::QueryTransactionBlock => {
                let digest: Digest = node.str_arg("digest")?.parse()?;
                let tx = self.io(snapshot.transaction(&digest)).await?;
                Resolved::Node(tx.map(Value::Transaction))
            }
            Field::QueryTransactionBlocks => {
                let filter = transaction_filter_arg(node)?;
                self.transaction_connection("transactionBlocks", filter, node).await?
            }
            Field::QueryEvents => {
                let filter = match node.argument("filter") {
                    Some(v) => EventFilter::from_json(v)?,
                    None => EventFilter::default(),
                };
                self.event_connection(filter, node).await?
            }
            Field::QueryEpoch => {
                let id = node.u64_arg("id")?;
                let epoch = self.io(snapshot.epoch(id)).await?;
                Resolved::Node(epoch.map(|e| Value::Epoch(Arc::new(e))))
            }
            Field::QueryType => {
                let sig = self.types().parse(node.str_arg("type")?)?;
                Resolved::Node(Some(Value::MoveType(sig)))
            }
            Field::QueryPackage => {
                let id = parse_address(node, "address")?;
                let object = self.io(snapshot.object(&id, None)).await?;
                Resolved::Node(object.and_then(PackageView::new).map(Value::Package))
            }
            Field::QueryServiceConfig => Resolved::Node(Some(Value::ServiceConfig)),
            _ => return Ok(None),
        }))
    }

    // ------------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------------

    async fn fetch_versioned<V>(&self, v: &V, node: &QueryNode, field: Field) -> ChainqlResult<Option<Resolved>>
    where
        V: VersionedObject + Ownable + Sync,
    {
        Ok(Some(match field {
            Field::Address => Resolved::Json(address_json(&v.address())),
            Field::Version => Resolved::number(v.version().value()),
            Field::Digest => Resolved::json(v.digest().to_string()),
            Field::ObjectOwner => Resolved::Node(Some(Value::ObjectOwner(v.owner()))),
            Field::StorageRebate => Resolved::number(v.storage_rebate()),
            Field::PreviousTransaction => {
                let tx = self.io(self.snapshot.transaction(&v.previous_transaction())).await?;
                Resolved::Node(tx.map(Value::Transaction))
            }
            Field::DynamicFields => {
                let filter = owned_filter(ObjectFilter::default(), None, Some(v.address()));
                self.object_connection("dynamicFields", filter, node, |o| Some(Value::Object(ObjectView(o))))
                    .await?
            }
            _ => return Ok(None),
        }))
    }

    fn fetch_package(&self, v: &PackageView, node: &QueryNode, field: Field) -> ChainqlResult<Option<Resolved>> {
        let package = v.package();
        let module_ref = |name: &str| ModuleRef {
            package: v.clone(),
            module: name.to_string(),
        };
        Ok(Some(match field {
            Field::PackageModule => {
                let name = node.str_arg("name")?;
                Resolved::Node(package.module(name).map(|_| Value::Module(module_ref(name))))
            }
            Field::PackageModules => {
                let items = package
                    .modules
                    .keys()
                    .map(|name| (name.clone(), Value::Module(module_ref(name))))
                    .collect();
                self.declaration_connection("modules", &package.id.to_string(), node, items)?
            }
            Field::Linkage => Resolved::List(
                package
                    .linkage
                    .iter()
                    .map(|(original, info)| Value::Linkage(*original, *info))
                    .collect(),
            ),
            Field::TypeOrigins => Resolved::List(
                package
                    .type_origins
                    .iter()
                    .cloned()
                    .map(Value::TypeOrigin)
                    .collect(),
            ),
            _ => return Ok(None),
        }))
    }

    fn fetch_module(&self, m: &ModuleRef, node: &QueryNode, field: Field) -> ChainqlResult<Option<Resolved>> {
        let decl = m.decl()?;
        let member = |name: &str| MemberRef {
            module: m.clone(),
            name: name.to_string(),
        };
        let scope = format!("{}::{}", m.package.address(), m.module);
        Ok(Some(match field {
            Field::Name => Resolved::json(m.module.as_str()),
            Field::ModulePackage => Resolved::Node(Some(Value::Package(m.package.clone()))),
            Field::ModuleStruct => {
                let name = node.str_arg("name")?;
                Resolved::Node(decl.structs.get(name).map(|_| Value::Struct(member(name))))
            }
            Field::ModuleStructs => {
                let items = decl
                    .structs
                    .keys()
                    .map(|name| (name.clone(), Value::Struct(member(name))))
                    .collect();
                self.declaration_connection("structs", &scope, node, items)?
            }
            Field::ModuleFunction => {
                let name = node.str_arg("name")?;
                Resolved::Node(decl.functions.get(name).map(|_| Value::Function(member(name))))
            }
            Field::ModuleFunctions => {
                let items = decl
                    .functions
                    .keys()
                    .map(|name| (name.clone(), Value::Function(member(name))))
                    .collect();
                self.declaration_connection("functions", &scope, node, items)?
            }
            _ => return Ok(None),
        }))
    }

    async fn fetch_move_value(&self, type_: &TypeSignature, bcs: &[u8], field: Field) -> ChainqlResult<Option<Resolved>> {
        Ok(Some(match field {
            Field::ValueType => Resolved::Node(Some(Value::MoveType(type_.clone()))),
            Field::Bcs => Resolved::json(BASE64.encode(bcs)),
            Field::Json => {
                let layout = self.types().layout(type_, &self.snapshot).await?;
                let value = chainql_core::decode::decode(bcs, &layout)?;
                Resolved::Json(value.to_json())
            }
            _ => return Ok(None),
        }))
    }

    async fn fetch_move_type(&self, sig: &TypeSignature, field: Field) -> ChainqlResult<Option<Resolved>> {
        Ok(Some(match field {
            Field::Repr => Resolved::json(sig.repr()),
            Field::Signature => Resolved::serialized(sig)?,
            Field::Layout => {
                let layout = self.types().layout(sig, &self.snapshot).await?;
                Resolved::serialized(layout.as_ref())?
            }
            Field::Abilities => {
                let abilities = self.types().abilities(sig, &self.snapshot).await?;
                Resolved::serialized(&abilities)?
            }
            _ => return Ok(None),
        }))
    }

    // ------------------------------------------------------------------------
    // Addresses and balances
    // ------------------------------------------------------------------------

    async fn fetch_owner(&self, ty: NodeType, a: Address, node: &QueryNode, field: Field) -> ChainqlResult<Option<Resolved>> {
        Ok(Some(match field {
            Field::Address => Resolved::Json(address_json(&a)),
            Field::OwnedObjects => {
                let filter = owned_filter(object_filter_arg(node)?, Some(a), None);
                self.object_connection("ownedObjects", filter, node, |o| Some(Value::Object(ObjectView(o))))
                    .await?
            }
            Field::DynamicFields => {
                let filter = owned_filter(ObjectFilter::default(), None, Some(a));
                self.object_connection("dynamicFields", filter, node, |o| Some(Value::Object(ObjectView(o))))
                    .await?
            }
            Field::Balance => {
                let coin_type = self.coin_type_arg(node)?;
                let coins = self
                    .coins_of(a, TypeFilter::Exact(TypeSignature::coin(coin_type.clone())))
                    .await?;
                let mut total: u128 = 0;
                for coin in &coins {
                    if let Some(balance) = coin.coin_balance() {
                        total += u128::from(balance?);
                    }
                }
                Resolved::Node(Some(Value::Balance {
                    coin_type,
                    count: coins.len() as u64,
                    total,
                }))
            }
            Field::Balances => {
                let coins = self
                    .coins_of(a, TypeFilter::Struct(FRAMEWORK_ADDRESS, "coin".into(), "Coin".into()))
                    .await?;
                let mut by_type: BTreeMap<String, (TypeSignature, u64, u128)> = BTreeMap::new();
                for coin in &coins {
                    let (Some(coin_type), Some(balance)) = (
                        coin.type_().and_then(TypeSignature::coin_type_argument),
                        coin.coin_balance(),
                    ) else {
                        continue;
                    };
                    let entry = by_type
                        .entry(coin_type.repr())
                        .or_insert_with(|| (coin_type.clone(), 0, 0));
                    entry.1 += 1;
                    entry.2 += u128::from(balance?);
                }
                let items = by_type
                    .into_iter()
                    .map(|(repr, (coin_type, count, total))| {
                        (
                            repr,
                            Value::Balance {
                                coin_type,
                                count,
                                total,
                            },
                        )
                    })
                    .collect();
                self.declaration_connection("balances", &a.to_string(), node, items)?
            }
            Field::Coins => {
                let coin_type = self.coin_type_arg(node)?;
                let filter = owned_filter(
                    Filter::Fields(ObjectFields {
                        type_: Some(TypeFilter::Exact(TypeSignature::coin(coin_type))),
                        ..Default::default()
                    }),
                    Some(a),
                    None,
                );
                self.object_connection("coins", filter, node, |o| CoinView::new(o).map(Value::Coin))
                    .await?
            }
            Field::SentTransactions => {
                let filter = scoped_transactions(
                    transaction_filter_arg(node)?,
                    TransactionFields {
                        sent_address: Some(a),
                        ..Default::default()
                    },
                );
                self.transaction_connection("sentTransactions", filter, node).await?
            }
            Field::AsAddress if ty == NodeType::Owner => Resolved::Node(Some(Value::Address(a))),
            Field::AsObject if ty == NodeType::Owner => {
                let object = self.io(self.snapshot.object(&a, None)).await?;
                Resolved::Node(object.map(|o| Value::Object(ObjectView(o))))
            }
            _ => return Ok(None),
        }))
    }

    fn coin_type_arg(&self, node: &QueryNode) -> ChainqlResult<TypeSignature> {
        match node.optional_str_arg("type")? {
            Some(t) => self.types().parse(t),
            None => Ok(TypeSignature::gas_currency()),
        }
    }

    /// Every live coin of `owner` matching `type_`
    async fn coins_of(&self, owner: Address, type_: TypeFilter) -> ChainqlResult<Vec<Arc<Object>>> {
        let filter = Filter::Fields(ObjectFields {
            owner: Some(owner),
            type_: Some(type_),
            ..Default::default()
        });
        let mut coins = Vec::new();
        let mut after: Option<ObjectKey> = None;
        loop {
            let range = ScanRange {
                after,
                before: None,
                direction: ScanDirection::Ascending,
                limit: BALANCE_SCAN_BATCH,
            };
            let batch = self.io(self.snapshot.objects(&filter, range)).await?;
            let full = batch.len() == BALANCE_SCAN_BATCH;
            after = batch.last().map(|o| o.key());
            coins.extend(batch);
            if !full {
                return Ok(coins);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Checkpoints and epochs
    // ------------------------------------------------------------------------

    async fn fetch_checkpoint(&self, cp: &Checkpoint, node: &QueryNode, field: Field) -> ChainqlResult<Option<Resolved>> {
        Ok(Some(match field {
            Field::SequenceNumber => Resolved::number(cp.sequence_number),
            Field::Digest => Resolved::json(cp.digest.to_string()),
            Field::Timestamp => Resolved::Json(timestamp(cp.timestamp_ms)),
            Field::PreviousCheckpointDigest => Resolved::opt(cp.previous_digest.map(|d| d.to_string())),
            Field::NetworkTotalTransactions => Resolved::number(cp.network_total_transactions),
            Field::CheckpointEpoch => {
                let epoch = self.io(self.snapshot.epoch(Some(cp.epoch))).await?;
                Resolved::Node(epoch.map(|e| Value::Epoch(Arc::new(e))))
            }
            Field::CheckpointTransactions => {
                let filter = scoped_transactions(
                    transaction_filter_arg(node)?,
                    TransactionFields {
                        at_checkpoint: Some(cp.sequence_number),
                        ..Default::default()
                    },
                );
                self.transaction_connection("checkpointTransactions", filter, node)
                    .await?
            }
            _ => return Ok(None),
        }))
    }

    async fn fetch_epoch(&self, epoch: &Epoch, node: &QueryNode, field: Field) -> ChainqlResult<Option<Resolved>> {
        Ok(Some(match field {
            Field::EpochId => Resolved::number(epoch.epoch_id),
            Field::ReferenceGasPrice => Resolved::number(epoch.reference_gas_price),
            Field::ProtocolVersion => Resolved::number(epoch.protocol_version),
            Field::StartTimestamp => Resolved::Json(timestamp(epoch.start_timestamp_ms)),
            Field::EndTimestamp => Resolved::Json(epoch.end_timestamp_ms.map_or(JsonValue::Null, timestamp)),
            Field::EpochCheckpoints => self.checkpoint_connection("epochCheckpoints", Some(epoch), node).await?,
            _ => return Ok(None),
        }))
    }

    // ------------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------------

    async fn fetch_transaction(&self, tx: &Arc<TransactionBlock>, field: Field) -> ChainqlResult<Option<Resolved>> {
        Ok(Some(match field {
            Field::Digest => Resolved::json(tx.digest.to_string()),
            Field::Sender => Resolved::Node(Some(Value::Address(tx.data.sender))),
            Field::GasInput => Resolved::Node(Some(Value::GasInput(Arc::clone(tx)))),
            Field::TransactionKind => Resolved::json(tx.data.kind.label()),
            Field::Bcs => Resolved::json(BASE64.encode(tx.data.to_bytes())),
            Field::Signatures => Resolved::Json(JsonValue::Array(
                tx.signatures
                    .iter()
                    .map(|s| JsonValue::String(BASE64.encode(s)))
                    .collect(),
            )),
            Field::Effects => Resolved::Node(Some(Value::Effects(Arc::clone(tx)))),
            Field::Expiration => match tx.data.expiration {
                Some(epoch_id) => {
                    let epoch = self.io(self.snapshot.epoch(Some(epoch_id))).await?;
                    Resolved::Node(epoch.map(|e| Value::Epoch(Arc::new(e))))
                }
                None => Resolved::Node(None),
            },
            _ => return Ok(None),
        }))
    }

    async fn fetch_gas_input(&self, tx: &TransactionBlock, field: Field) -> ChainqlResult<Option<Resolved>> {
        let gas = &tx.data.gas_data;
        Ok(Some(match field {
            Field::GasSponsor => Resolved::Node(Some(Value::Address(gas.owner))),
            Field::GasPrice => Resolved::number(gas.price),
            Field::GasBudget => Resolved::number(gas.budget),
            Field::GasPayment => {
                let objects = try_join_all(gas.payment.iter().map(|r| self.object_at(r))).await?;
                Resolved::List(
                    objects
                        .into_iter()
                        .flatten()
                        .map(|o| Value::Object(ObjectView(o)))
                        .collect(),
                )
            }
            _ => return Ok(None),
        }))
    }

    async fn fetch_effects(&self, tx: &Arc<TransactionBlock>, node: &QueryNode, field: Field) -> ChainqlResult<Option<Resolved>> {
        let effects = &tx.effects;
        let scope = tx.digest.to_string();
        Ok(Some(match field {
            Field::Status => Resolved::json(if effects.status.is_success() {
                "SUCCESS"
            } else {
                "FAILURE"
            }),
            Field::ExecutionError => Resolved::opt(effects.status.error()),
            Field::LamportVersion => Resolved::number(effects.lamport_version.value()),
            Field::GasSummary => Resolved::Node(Some(Value::GasSummary(effects.gas_used))),
            Field::GasObject => match &effects.gas_object {
                Some(r) => Resolved::Node(self.object_at(r).await?.map(|o| Value::Object(ObjectView(o)))),
                None => Resolved::Node(None),
            },
            Field::ObjectChanges => {
                let items = effects
                    .object_changes
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (i as u64, Value::ObjectChange(c.clone())))
                    .collect();
                self.indexed_connection("objectChanges", &scope, node, items)?
            }
            Field::BalanceChanges => {
                let items = effects
                    .balance_changes
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (i as u64, Value::BalanceChange(c.clone())))
                    .collect();
                self.indexed_connection("balanceChanges", &scope, node, items)?
            }
            Field::EffectsEvents => {
                let items = effects
                    .events
                    .iter()
                    .enumerate()
                    .map(|(i, event)| {
                        let indexed = IndexedEvent {
                            tx_sequence: tx.tx_sequence.unwrap_or_default(),
                            event_index: i as u32,
                            transaction_digest: tx.digest,
                            timestamp_ms: tx.timestamp_ms,
                            event: event.clone(),
                        };
                        (i as u64, Value::Event(Arc::new(indexed)))
                    })
                    .collect();
                self.indexed_connection("effectsEvents", &scope, node, items)?
            }
            Field::EffectsCheckpoint => match tx.checkpoint {
                Some(seq) => {
                    let cp = self.io(self.snapshot.checkpoint_at(Some(seq))).await?;
                    Resolved::Node(cp.map(|c| Value::Checkpoint(Arc::new(c))))
                }
                None => Resolved::Node(None),
            },
            Field::Timestamp => Resolved::Json(tx.timestamp_ms.map_or(JsonValue::Null, timestamp)),
            Field::Dependencies => Resolved::Json(JsonValue::Array(
                effects
                    .dependencies
                    .iter()
                    .map(|d| JsonValue::String(d.to_string()))
                    .collect(),
            )),
            Field::TransactionOf => Resolved::Node(Some(Value::Transaction(Arc::clone(tx)))),
            _ => return Ok(None),
        }))
    }

    async fn fetch_object_change(&self, change: &ObjectChange, field: Field) -> ChainqlResult<Option<Resolved>> {
        Ok(Some(match field {
            Field::Address => Resolved::Json(address_json(&change.object_id)),
            Field::IdCreated => Resolved::json(change.id_operation == IdOperation::Created),
            Field::IdDeleted => Resolved::json(change.id_operation == IdOperation::Deleted),
            Field::InputState | Field::OutputState => {
                let state = if field == Field::InputState {
                    &change.input_state
                } else {
                    &change.output_state
                };
                match state {
                    Some(r) => Resolved::Node(self.object_at(r).await?.map(|o| Value::Object(ObjectView(o)))),
                    None => Resolved::Node(None),
                }
            }
            _ => return Ok(None),
        }))
    }

    async fn fetch_event(&self, event: &IndexedEvent, field: Field) -> ChainqlResult<Option<Resolved>> {
        let e = &event.event;
        Ok(Some(match field {
            Field::Sender => Resolved::Node(Some(Value::Address(e.sender))),
            Field::Timestamp => Resolved::Json(event.timestamp_ms.map_or(JsonValue::Null, timestamp)),
            Field::ValueType => Resolved::Node(Some(Value::MoveType(e.type_.clone()))),
            Field::Contents => Resolved::Node(Some(Value::MoveValue {
                type_: e.type_.clone(),
                bcs: Arc::from(e.contents.as_slice()),
            })),
            Field::SendingModule => {
                let package = self.io(self.snapshot.object(&e.package_id, None)).await?;
                Resolved::Node(package.and_then(PackageView::new).and_then(|p| {
                    p.package().module(&e.transaction_module)?;
                    Some(Value::Module(ModuleRef {
                        package: p,
                        module: e.transaction_module.clone(),
                    }))
                }))
            }
            Field::TransactionOf => {
                let tx = self.io(self.snapshot.transaction(&event.transaction_digest)).await?;
                Resolved::Node(tx.map(Value::Transaction))
            }
            _ => return Ok(None),
        }))
    }

    fn fetch_service_config(&self, node: &QueryNode, field: Field) -> ChainqlResult<Option<Resolved>> {
        let config = self.config();
        let limits = &config.limits;
        Ok(Some(match field {
            Field::MaxQueryDepth => Resolved::json(limits.max_query_depth),
            Field::MaxQueryNodes => Resolved::json(limits.max_query_nodes),
            Field::DefaultPageSize => Resolved::json(limits.default_page_size),
            Field::MaxPageSize => Resolved::json(limits.max_page_size),
            Field::RequestTimeoutMs => Resolved::json(limits.request_timeout_ms),
            Field::MaxTransactionPayloadSize => Resolved::json(limits.max_transaction_payload_size),
            Field::MaxTypeArgumentDepth => Resolved::json(limits.max_type_argument_depth),
            Field::MaxTypeNodes => Resolved::json(limits.max_type_nodes),
            Field::EnabledFeatures => Resolved::Json(JsonValue::Array(
                config
                    .features
                    .iter()
                    .map(|f| JsonValue::String(f.to_string()))
                    .collect(),
            )),
            Field::IsEnabled => {
                let feature: Feature = node
                    .str_arg("feature")?
                    .parse()
                    .map_err(ChainqlError::invalid_input)?;
                Resolved::json(config.is_enabled(feature))
            }
            _ => return Ok(None),
        }))
    }

    /// Object at the exact version named by `r`
    async fn object_at(&self, r: &ObjectRef) -> ChainqlResult<Option<Arc<Object>>> {
        self.io(self.snapshot.object(&r.object_id, Some(r.version))).await
    }

    // ------------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------------

    async fn object_connection(
        &self,
        name: &str,
        filter: ObjectFilter,
        node: &QueryNode,
        wrap: fn(Arc<Object>) -> Option<Value>,
    ) -> ChainqlResult<Resolved> {
        let mut fp = FingerprintBuilder::new(name);
        filter.fingerprint_into(&mut fp);
        let mut page = Page::<ObjectKey>::new(&self.page_args(node)?, fp.finish(), &self.config().limits)?;

        let range = page.begin()?;
        let objects = match self.io(self.snapshot.objects(&filter, range)).await {
            Ok(objects) => objects,
            Err(e) => {
                page.fail(e.to_string());
                return Err(e);
            }
        };
        let items = objects
            .into_iter()
            .filter_map(|o| {
                let key = o.key();
                wrap(o).map(|v| (key, v))
            })
            .collect();
        Ok(Resolved::Connection(page.finish(items)?))
    }

    async fn transaction_connection(&self, name: &str, filter: TransactionFilter, node: &QueryNode) -> ChainqlResult<Resolved> {
        let mut fp = FingerprintBuilder::new(name);
        filter.fingerprint_into(&mut fp);
        let mut page = Page::<u64>::new(&self.page_args(node)?, fp.finish(), &self.config().limits)?;

        let range = page.begin()?;
        let txs = match self.io(self.snapshot.transactions(&filter, range)).await {
            Ok(txs) => txs,
            Err(e) => {
                page.fail(e.to_string());
                return Err(e);
            }
        };
        let items = txs
            .into_iter()
            .map(|tx| (tx.tx_sequence.unwrap_or_default(), Value::Transaction(tx)))
            .collect();
        Ok(Resolved::Connection(page.finish(items)?))
    }

    async fn event_connection(&self, filter: EventFilter, node: &QueryNode) -> ChainqlResult<Resolved> {
        let mut fp = FingerprintBuilder::new("events");
        filter.fingerprint_into(&mut fp);
        let mut page = Page::<(u64, u32)>::new(&self.page_args(node)?, fp.finish(), &self.config().limits)?;

        let range = page.begin()?;
        let events = match self.io(self.snapshot.events(&filter, range)).await {
            Ok(events) => events,
            Err(e) => {
                page.fail(e.to_string());
                return Err(e);
            }
        };
        let items = events
            .into_iter()
            .map(|e| ((e.tx_sequence, e.event_index), Value::Event(Arc::new(e))))
            .collect();
        Ok(Resolved::Connection(page.finish(items)?))
    }

    async fn checkpoint_connection(&self, name: &str, epoch: Option<&Epoch>, node: &QueryNode) -> ChainqlResult<Resolved> {
        let mut fp = FingerprintBuilder::new(name);
        if let Some(e) = epoch {
            fp.write_u64(e.epoch_id);
        }
        let mut page = Page::<u64>::new(&self.page_args(node)?, fp.finish(), &self.config().limits)?;

        let mut range = page.begin()?;
        if let Some(e) = epoch {
            if let Some(lower) = e.first_checkpoint.checked_sub(1) {
                range.after = Some(range.after.map_or(lower, |a| a.max(lower)));
            }
            if let Some(upper) = e.last_checkpoint.and_then(|l| l.checked_add(1)) {
                range.before = Some(range.before.map_or(upper, |b| b.min(upper)));
            }
        }
        let checkpoints = match self.io(self.snapshot.checkpoints(range)).await {
            Ok(cps) => cps,
            Err(e) => {
                page.fail(e.to_string());
                return Err(e);
            }
        };
        let items = checkpoints
            .into_iter()
            .map(|cp| (cp.sequence_number, Value::Checkpoint(Arc::new(cp))))
            .collect();
        Ok(Resolved::Connection(page.finish(items)?))
    }

    /// Connection over items keyed by name
    fn declaration_connection(
        &self,
        name: &str,
        scope: &str,
        node: &QueryNode,
        items: Vec<(String, Value)>,
    ) -> ChainqlResult<Resolved> {
        let mut fp = FingerprintBuilder::new(name);
        fp.write_str(scope);
        let mut page = Page::<String>::new(&self.page_args(node)?, fp.finish(), &self.config().limits)?;
        Ok(Resolved::Connection(page.paginate(items)?))
    }

    /// Connection over a list held by its parent, keyed by position
    fn indexed_connection(
        &self,
        name: &str,
        scope: &str,
        node: &QueryNode,
        items: Vec<(u64, Value)>,
    ) -> ChainqlResult<Resolved> {
        let mut fp = FingerprintBuilder::new(name);
        fp.write_str(scope);
        let mut page = Page::<u64>::new(&self.page_args(node)?, fp.finish(), &self.config().limits)?;
        Ok(Resolved::Connection(page.paginate(items)?))
    }

    fn page_args(&self, node: &QueryNode) -> ChainqlResult<PageArgs> {
        PageArgs::from_node(node, &self.config().limits)
    }
}

fn contents_field<V: HasMoveContents>(v: &V, field: Field) -> Option<Resolved> {
    match field {
        Field::Contents => Some(Resolved::Node(Some(Value::MoveValue {
            type_: v.contents_type().clone(),
            bcs: Arc::from(v.contents()),
        }))),
        Field::HasPublicTransfer => Some(Resolved::json(v.has_public_transfer())),
        _ => None,
    }
}

fn fetch_struct(s: &MemberRef, field: Field) -> ChainqlResult<Option<Resolved>> {
    let decl = s.struct_decl()?;
    Ok(Some(match field {
        Field::Name => Resolved::json(decl.name.as_str()),
        Field::ParentModule => Resolved::Node(Some(Value::Module(s.module.clone()))),
        Field::Abilities => Resolved::serialized(&decl.abilities)?,
        Field::TypeParameters => Resolved::serialized(&decl.type_parameters)?,
        Field::StructFields => Resolved::List(
            decl.fields
                .iter()
                .map(|f| Value::MoveField {
                    name: f.name.clone(),
                    signature: f.signature.clone(),
                })
                .collect(),
        ),
        _ => return Ok(None),
    }))
}

fn fetch_function(f: &MemberRef, field: Field) -> ChainqlResult<Option<Resolved>> {
    let decl = f.function_decl()?;
    let open_types = |sigs: &[OpenSignature]| {
        Resolved::List(sigs.iter().cloned().map(Value::OpenType).collect())
    };
    Ok(Some(match field {
        Field::Name => Resolved::json(decl.name.as_str()),
        Field::ParentModule => Resolved::Node(Some(Value::Module(f.module.clone()))),
        Field::Visibility => Resolved::serialized(&decl.visibility)?,
        Field::IsEntry => Resolved::json(decl.is_entry),
        Field::TypeParameters => Resolved::serialized(&decl.type_parameters)?,
        Field::Parameters => open_types(&decl.parameters),
        Field::Return => open_types(&decl.returns),
        _ => return Ok(None),
    }))
}

fn object_filter_arg(node: &QueryNode) -> ChainqlResult<ObjectFilter> {
    Ok(match node.argument("filter") {
        Some(v) => ObjectFilter::from_json(v)?,
        None => ObjectFilter::default(),
    })
}

fn transaction_filter_arg(node: &QueryNode) -> ChainqlResult<TransactionFilter> {
    Ok(match node.argument("filter") {
        Some(v) => TransactionFilter::from_json(v)?,
        None => TransactionFilter::default(),
    })
}

fn page_info_json(info: &PageInfo, selection: &[QueryNode]) -> JsonValue {
    let cursor = |c: &Option<chainql_core::Cursor>| {
        c.as_ref()
            .map_or(JsonValue::Null, |c| JsonValue::String(c.as_str().to_string()))
    };
    let mut out = Map::new();
    for f in selection {
        let value = match f.name.as_str() {
            "hasNextPage" => JsonValue::Bool(info.has_next_page),
            "hasPreviousPage" => JsonValue::Bool(info.has_previous_page),
            "startCursor" => cursor(&info.start_cursor),
            _ => cursor(&info.end_cursor),
        };
        out.insert(f.response_key().to_string(), value);
    }
    JsonValue::Object(out)
}
