//! InMemoryStore: MVCC reference implementation of [`ObjectStore`]
//!
//! Objects live in per-address version chains stored newest-first. Each
//! version records the checkpoint that finalized it, so any read can be
//! bounded by a pinned checkpoint.
//!
//! # Pruning
//!
//! - `prune_object_versions(id, below)` drops versions older than `below`
//!   (the latest version is always retained). Lookups under the watermark
//!   return [`ObjectLookup::Pruned`], never `NotFound`.
//! - `prune_checkpoints(below)` drops checkpoints and their transactions and
//!   moves the start of the available range. Dropped digests are remembered,
//!   so a lookup by digest returns [`TransactionLookup::Pruned`].
//!
//! # Ingest
//!
//! The write-side methods (`insert_*`, `delete_object`, `prune_*`) exist for
//! fixtures and for the external writer path. Nothing in the query core calls
//! them.

use crate::traits::{
    AvailableRange, ObjectExistence, ObjectLookup, ObjectStore, ScanDirection, ScanRange,
    TransactionLookup,
};
use async_trait::async_trait;
use chainql_core::{
    Address, ChainqlError, ChainqlResult, Checkpoint, Digest, Epoch, EventFilter, IndexedEvent,
    Object, ObjectFilter, ObjectId, ObjectKey, PackageDecl, SequenceNumber, TransactionBlock,
    TransactionFilter,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ops::Bound;
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// Version chains
// =============================================================================

/// One stored version; `object` is `None` for a deletion tombstone
#[derive(Debug, Clone)]
struct StoredVersion {
    version: SequenceNumber,
    checkpoint: u64,
    object: Option<Arc<Object>>,
}

/// Versions of one address, newest first
#[derive(Debug, Default)]
struct VersionChain {
    versions: VecDeque<StoredVersion>,
    /// Versions below this have been pruned
    pruned_below: Option<SequenceNumber>,
}

impl VersionChain {
    fn newest(&self) -> Option<&StoredVersion> {
        self.versions.front()
    }

    fn oldest_retained(&self) -> Option<SequenceNumber> {
        self.versions.back().map(|v| v.version)
    }

    fn push(&mut self, entry: StoredVersion) -> ChainqlResult<()> {
        if let Some(newest) = self.newest() {
            if entry.version <= newest.version {
                return Err(ChainqlError::storage(format!(
                    "version regression: {} written after {}",
                    entry.version, newest.version
                )));
            }
        }
        self.versions.push_front(entry);
        Ok(())
    }

    fn at_version(&self, version: SequenceNumber) -> Option<&StoredVersion> {
        self.versions.iter().find(|v| v.version == version)
    }

    /// Newest version finalized at or before `checkpoint`
    fn latest_at(&self, checkpoint: u64) -> Option<&StoredVersion> {
        self.versions.iter().find(|v| v.checkpoint <= checkpoint)
    }

    /// Live object at `checkpoint`
    fn live_at(&self, checkpoint: u64) -> Option<&Arc<Object>> {
        self.latest_at(checkpoint).and_then(|v| v.object.as_ref())
    }

    /// Drop versions older than `below`, keeping at least the newest
    fn prune(&mut self, below: SequenceNumber) {
        while self.versions.len() > 1 {
            match self.versions.back() {
                Some(oldest) if oldest.version < below => {
                    self.versions.pop_back();
                }
                _ => break,
            }
        }
        self.pruned_below = Some(self.pruned_below.map_or(below, |p| p.max(below)));
    }

    fn lookup(&self, version: Option<SequenceNumber>, checkpoint: u64) -> ObjectLookup {
        let earliest = self.oldest_retained().unwrap_or(SequenceNumber::MIN);
        match version {
            Some(v) => {
                if self.pruned_below.map_or(false, |p| v < p) {
                    return ObjectLookup::Pruned {
                        requested: Some(v),
                        earliest,
                    };
                }
                match self.at_version(v) {
                    Some(StoredVersion {
                        checkpoint: cp,
                        object: Some(object),
                        ..
                    }) if *cp <= checkpoint => ObjectLookup::Found(Arc::clone(object)),
                    _ => ObjectLookup::NotFound,
                }
            }
            None => match self.latest_at(checkpoint) {
                Some(StoredVersion {
                    object: Some(object), ..
                }) => ObjectLookup::Found(Arc::clone(object)),
                Some(_) => ObjectLookup::NotFound,
                None if self.pruned_below.is_some() => ObjectLookup::Pruned {
                    requested: None,
                    earliest,
                },
                None => ObjectLookup::NotFound,
            },
        }
    }
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<ObjectId, VersionChain>,
    /// Every object ever owned by an address or parent object
    owner_index: FxHashMap<Address, BTreeSet<ObjectId>>,
    checkpoints: BTreeMap<u64, Checkpoint>,
    /// Checkpoints below this have been pruned
    checkpoint_watermark: u64,
    transactions: BTreeMap<u64, Arc<TransactionBlock>>,
    tx_by_digest: FxHashMap<Digest, u64>,
    /// Digest to checkpoint of every pruned transaction
    pruned_tx: FxHashMap<Digest, u64>,
    /// Transactions with a `tx_sequence` below this have been pruned
    tx_watermark: u64,
    epochs: BTreeMap<u64, Epoch>,
    next_tx_sequence: u64,
}

/// In-memory MVCC store
///
/// Thread-safe: reads take a shared lock, ingest takes an exclusive one.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

/// Exclusive-bound pair for `BTreeMap::range`, or `None` if the range is empty
fn key_bounds<K: Ord + Copy>(range: &ScanRange<K>) -> Option<(Bound<K>, Bound<K>)> {
    if let (Some(a), Some(b)) = (&range.after, &range.before) {
        if a >= b {
            return None;
        }
    }
    Some((
        range.after.map_or(Bound::Unbounded, Bound::Excluded),
        range.before.map_or(Bound::Unbounded, Bound::Excluded),
    ))
}

/// Collect up to `limit` items from an ordered iterator, honoring direction
fn take_directed<T, I>(iter: I, direction: ScanDirection, limit: usize) -> Vec<T>
where
    I: DoubleEndedIterator<Item = T>,
{
    match direction {
        ScanDirection::Ascending => iter.take(limit).collect(),
        ScanDirection::Descending => iter.rev().take(limit).collect(),
    }
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Ingest
    // ========================================================================

    /// Write a new object version finalized at `checkpoint`
    ///
    /// Versions of one address must be written in increasing order.
    pub fn insert_object(&self, object: Object, checkpoint: u64) -> ChainqlResult<()> {
        let mut inner = self.inner.write();
        let id = object.id;
        let version = object.version;
        if let Some(owner) = object.owner.owner_address() {
            inner.owner_index.entry(owner).or_default().insert(id);
        }
        inner.objects.entry(id).or_default().push(StoredVersion {
            version,
            checkpoint,
            object: Some(Arc::new(object)),
        })?;
        debug!(target: "chainql::storage", object_id = %id, %version, checkpoint, "Inserted object version");
        Ok(())
    }

    /// Publish a package object
    pub fn insert_package(&self, package: PackageDecl, checkpoint: u64) -> ChainqlResult<()> {
        let publish = Digest::of(package.id.as_bytes());
        self.insert_object(Object::new_package(package, publish), checkpoint)
    }

    /// Record that `id` was deleted (or wrapped) at `version`
    pub fn delete_object(&self, id: ObjectId, version: SequenceNumber, checkpoint: u64) -> ChainqlResult<()> {
        let mut inner = self.inner.write();
        let chain = inner
            .objects
            .get_mut(&id)
            .ok_or_else(|| ChainqlError::storage(format!("cannot delete unknown object {}", id)))?;
        chain.push(StoredVersion {
            version,
            checkpoint,
            object: None,
        })?;
        debug!(target: "chainql::storage", object_id = %id, %version, checkpoint, "Deleted object");
        Ok(())
    }

    /// Append a finalized checkpoint
    pub fn insert_checkpoint(&self, checkpoint: Checkpoint) -> ChainqlResult<()> {
        let mut inner = self.inner.write();
        if let Some((&last, _)) = inner.checkpoints.last_key_value() {
            if checkpoint.sequence_number <= last {
                return Err(ChainqlError::storage(format!(
                    "checkpoint {} does not follow {}",
                    checkpoint.sequence_number, last
                )));
            }
        }
        debug!(target: "chainql::storage", sequence_number = checkpoint.sequence_number, "Inserted checkpoint");
        inner.checkpoints.insert(checkpoint.sequence_number, checkpoint);
        Ok(())
    }

    /// Record a finalized transaction, assigning its `tx_sequence` if unset
    pub fn insert_transaction(&self, mut transaction: TransactionBlock) -> ChainqlResult<u64> {
        if transaction.checkpoint.is_none() {
            return Err(ChainqlError::storage(format!(
                "transaction {} has no checkpoint",
                transaction.digest
            )));
        }
        let mut inner = self.inner.write();
        let sequence = match transaction.tx_sequence {
            Some(seq) if inner.transactions.contains_key(&seq) => {
                return Err(ChainqlError::storage(format!("duplicate tx_sequence {}", seq)));
            }
            Some(seq) => seq,
            None => inner.next_tx_sequence,
        };
        transaction.tx_sequence = Some(sequence);
        inner.next_tx_sequence = inner.next_tx_sequence.max(sequence + 1);
        inner.tx_by_digest.insert(transaction.digest, sequence);
        inner.transactions.insert(sequence, Arc::new(transaction));
        Ok(sequence)
    }

    /// Insert or replace an epoch
    pub fn insert_epoch(&self, epoch: Epoch) {
        self.inner.write().epochs.insert(epoch.epoch_id, epoch);
    }

    /// Drop versions of `id` older than `below`
    pub fn prune_object_versions(&self, id: &ObjectId, below: SequenceNumber) {
        if let Some(chain) = self.inner.write().objects.get_mut(id) {
            chain.prune(below);
            debug!(target: "chainql::storage", object_id = %id, %below, "Pruned object versions");
        }
    }

    /// Drop checkpoints (and their transactions) below `below`
    pub fn prune_checkpoints(&self, below: u64) {
        let mut inner = self.inner.write();
        inner.checkpoint_watermark = inner.checkpoint_watermark.max(below);
        inner.checkpoints = inner.checkpoints.split_off(&below);

        let pruned: Vec<u64> = inner
            .transactions
            .iter()
            .filter(|(_, tx)| tx.checkpoint.map_or(false, |c| c < below))
            .map(|(seq, _)| *seq)
            .collect();
        for seq in &pruned {
            if let Some(tx) = inner.transactions.remove(seq) {
                inner.tx_by_digest.remove(&tx.digest);
                inner.pruned_tx.insert(tx.digest, tx.checkpoint.unwrap_or_default());
                inner.tx_watermark = inner.tx_watermark.max(seq + 1);
            }
        }
        debug!(target: "chainql::storage", below, transactions = pruned.len(), "Pruned checkpoints");
    }

    // ========================================================================
    // Reads
    // ========================================================================

    fn scan_objects_sync(
        &self,
        filter: &ObjectFilter,
        range: &ScanRange<ObjectKey>,
        checkpoint: u64,
    ) -> Vec<Arc<Object>> {
        let inner = self.inner.read();
        let fields = filter.fields();
        let Some((lower, upper)) = key_bounds(range) else {
            return Vec::new();
        };

        if let Some(keys) = fields.and_then(|f| f.object_keys.as_ref()) {
            let keys: BTreeSet<ObjectKey> = keys.iter().copied().collect();
            let hits = keys.range((lower, upper)).filter_map(|key| {
                let chain = inner.objects.get(&key.object_id)?;
                match chain.lookup(Some(key.version), checkpoint) {
                    ObjectLookup::Found(object) if filter.matches(&*object) => Some(object),
                    _ => None,
                }
            });
            return take_directed(hits, range.direction, range.limit);
        }

        // Addresses only; the live version decides the key
        let id_lower = match lower {
            Bound::Excluded(k) => Bound::Included(k.object_id),
            _ => Bound::Unbounded,
        };
        let id_upper = match upper {
            Bound::Excluded(k) => Bound::Included(k.object_id),
            _ => Bound::Unbounded,
        };
        let live = |id: &ObjectId| -> Option<Arc<Object>> {
            let object = inner.objects.get(id)?.live_at(checkpoint)?;
            (range.contains(&object.key()) && filter.matches(&**object)).then(|| Arc::clone(object))
        };

        let indexed = fields.and_then(|f| f.owner.or(f.parent));
        match indexed {
            Some(owner) => match inner.owner_index.get(&owner) {
                Some(ids) => take_directed(
                    ids.range((id_lower, id_upper)).filter_map(|id| live(id)),
                    range.direction,
                    range.limit,
                ),
                None => Vec::new(),
            },
            None => take_directed(
                inner
                    .objects
                    .range((id_lower, id_upper))
                    .filter_map(|(id, _)| live(id)),
                range.direction,
                range.limit,
            ),
        }
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn available_range(&self) -> ChainqlResult<AvailableRange> {
        let inner = self.inner.read();
        match (inner.checkpoints.first_key_value(), inner.checkpoints.last_key_value()) {
            (Some((&first, _)), Some((&last, _))) => Ok(AvailableRange {
                first: first.max(inner.checkpoint_watermark),
                last,
            }),
            _ => Err(ChainqlError::unavailable("no checkpoints have been finalized")),
        }
    }

    async fn get_object(
        &self,
        id: &ObjectId,
        version: Option<SequenceNumber>,
        checkpoint: u64,
    ) -> ChainqlResult<ObjectLookup> {
        let inner = self.inner.read();
        Ok(match inner.objects.get(id) {
            Some(chain) => chain.lookup(version, checkpoint),
            None => ObjectLookup::NotFound,
        })
    }

    async fn object_existence(&self, id: &ObjectId, checkpoint: u64) -> ChainqlResult<ObjectExistence> {
        let inner = self.inner.read();
        let Some(chain) = inner.objects.get(id) else {
            return Ok(ObjectExistence::NeverExisted);
        };
        Ok(match chain.latest_at(checkpoint) {
            Some(v) if v.object.is_some() => ObjectExistence::Exists(v.version),
            Some(v) => ObjectExistence::Deleted(v.version),
            None if chain.pruned_below.is_some() => ObjectExistence::Pruned,
            None => ObjectExistence::NeverExisted,
        })
    }

    async fn scan_objects(
        &self,
        filter: &ObjectFilter,
        range: ScanRange<ObjectKey>,
        checkpoint: u64,
    ) -> ChainqlResult<Vec<Arc<Object>>> {
        Ok(self.scan_objects_sync(filter, &range, checkpoint))
    }

    async fn get_checkpoint(&self, sequence_number: u64, checkpoint: u64) -> ChainqlResult<Option<Checkpoint>> {
        if sequence_number > checkpoint {
            return Ok(None);
        }
        Ok(self.inner.read().checkpoints.get(&sequence_number).cloned())
    }

    async fn scan_checkpoints(&self, range: ScanRange<u64>, checkpoint: u64) -> ChainqlResult<Vec<Checkpoint>> {
        let inner = self.inner.read();
        let Some(bounds) = key_bounds(&range) else {
            return Ok(Vec::new());
        };
        let visible = inner
            .checkpoints
            .range(bounds)
            .filter(|(seq, _)| **seq <= checkpoint)
            .map(|(_, cp)| cp.clone());
        Ok(take_directed(visible, range.direction, range.limit))
    }

    async fn get_transaction(&self, digest: &Digest, checkpoint: u64) -> ChainqlResult<TransactionLookup> {
        let inner = self.inner.read();
        if let Some(&finalized) = inner.pruned_tx.get(digest) {
            return Ok(TransactionLookup::Pruned { checkpoint: finalized });
        }
        Ok(inner
            .tx_by_digest
            .get(digest)
            .and_then(|seq| inner.transactions.get(seq))
            .filter(|tx| tx.checkpoint.map_or(false, |c| c <= checkpoint))
            .map_or(TransactionLookup::NotFound, |tx| TransactionLookup::Found(Arc::clone(tx))))
    }

    async fn transaction_watermark(&self) -> ChainqlResult<u64> {
        Ok(self.inner.read().tx_watermark)
    }

    async fn scan_transactions(
        &self,
        filter: &TransactionFilter,
        range: ScanRange<u64>,
        checkpoint: u64,
    ) -> ChainqlResult<Vec<Arc<TransactionBlock>>> {
        let inner = self.inner.read();
        let Some(bounds) = key_bounds(&range) else {
            return Ok(Vec::new());
        };
        let hits = inner
            .transactions
            .range(bounds)
            .map(|(_, tx)| tx)
            .filter(|tx| tx.checkpoint.map_or(false, |c| c <= checkpoint) && filter.matches(&***tx))
            .cloned();
        Ok(take_directed(hits, range.direction, range.limit))
    }

    async fn scan_events(
        &self,
        filter: &EventFilter,
        range: ScanRange<(u64, u32)>,
        checkpoint: u64,
    ) -> ChainqlResult<Vec<IndexedEvent>> {
        let inner = self.inner.read();
        let tx_lower = range.after.map_or(Bound::Unbounded, |(seq, _)| Bound::Included(seq));
        let tx_upper = range.before.map_or(Bound::Unbounded, |(seq, _)| Bound::Included(seq));
        if let (Bound::Included(a), Bound::Included(b)) = (tx_lower, tx_upper) {
            if a > b {
                return Ok(Vec::new());
            }
        }

        let indexed = inner
            .transactions
            .range((tx_lower, tx_upper))
            .filter(|(_, tx)| tx.checkpoint.map_or(false, |c| c <= checkpoint))
            .flat_map(|(seq, tx)| {
                tx.effects.events.iter().enumerate().map(move |(i, event)| IndexedEvent {
                    tx_sequence: *seq,
                    event_index: i as u32,
                    transaction_digest: tx.digest,
                    timestamp_ms: tx.timestamp_ms,
                    event: event.clone(),
                })
            })
            .filter(|e| range.contains(&(e.tx_sequence, e.event_index)) && filter.matches(e));

        // flat_map over a BTreeMap range is not double-ended, so reverse eagerly
        Ok(match range.direction {
            ScanDirection::Ascending => indexed.take(range.limit).collect(),
            ScanDirection::Descending => {
                let mut all: Vec<IndexedEvent> = indexed.collect();
                all.reverse();
                all.truncate(range.limit);
                all
            }
        })
    }

    async fn get_epoch(&self, epoch_id: Option<u64>, checkpoint: u64) -> ChainqlResult<Option<Epoch>> {
        let inner = self.inner.read();
        let epoch = match epoch_id {
            Some(id) => inner.epochs.get(&id),
            None => inner
                .epochs
                .values()
                .rev()
                .find(|e| e.first_checkpoint <= checkpoint),
        };
        Ok(epoch
            .filter(|e| e.first_checkpoint <= checkpoint)
            .map(|e| {
                let mut e = e.clone();
                // Closed after the pinned checkpoint: still open from this view
                if e.last_checkpoint.map_or(false, |last| last > checkpoint) {
                    e.last_checkpoint = None;
                    e.end_timestamp_ms = None;
                }
                e
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainql_core::decode::coin_contents;
    use chainql_core::transaction::{
        ExecutionStatus, GasCostSummary, GasData, ProgrammableTransaction, TransactionEffects,
    };
    use chainql_core::{Owner, TransactionData, TransactionKind, TypeSignature};
    use serde_json::json;

    fn coin(id: ObjectId, version: u64, owner: Address, balance: u64) -> Object {
        Object::new_move(
            id,
            SequenceNumber(version),
            Owner::AddressOwner(owner),
            TypeSignature::gas_coin(),
            coin_contents(&id, balance),
            Digest::of(&version.to_le_bytes()),
        )
    }

    fn checkpoint(seq: u64) -> Checkpoint {
        Checkpoint {
            sequence_number: seq,
            digest: Digest::of(&seq.to_le_bytes()),
            epoch: 0,
            timestamp_ms: 1_000 * seq,
            previous_digest: None,
            network_total_transactions: 0,
            transactions: vec![],
        }
    }

    fn finalized(checkpoint: u64) -> TransactionBlock {
        let sender = Address::from_low_byte(1);
        let data = TransactionData {
            kind: TransactionKind::Programmable(ProgrammableTransaction::default()),
            sender,
            gas_data: GasData {
                payment: vec![],
                owner: sender,
                price: 1,
                budget: checkpoint + 1,
            },
            expiration: None,
        };
        let digest = data.digest();
        TransactionBlock {
            digest,
            data,
            signatures: vec![],
            effects: TransactionEffects {
                transaction_digest: digest,
                status: ExecutionStatus::Success,
                executed_epoch: 0,
                gas_used: GasCostSummary::default(),
                gas_object: None,
                lamport_version: SequenceNumber(1),
                object_changes: vec![],
                balance_changes: vec![],
                events: vec![],
                dependencies: vec![],
            },
            checkpoint: Some(checkpoint),
            tx_sequence: None,
            timestamp_ms: Some(1_000 * checkpoint),
        }
    }

    fn owned_by(owner: &str) -> ObjectFilter {
        ObjectFilter::from_json(&json!({ "owner": owner })).unwrap()
    }

    #[tokio::test]
    async fn test_pruned_versus_not_found() {
        let store = InMemoryStore::new();
        let id = Address::from_low_byte(0x10);
        let owner = Address::from_low_byte(1);
        for v in 1..=5 {
            store.insert_object(coin(id, v, owner, v * 10), v).unwrap();
        }
        store.prune_object_versions(&id, SequenceNumber(3));

        let at = |v: u64| store.get_object(&id, Some(SequenceNumber(v)), 100);
        assert_eq!(
            at(2).await.unwrap(),
            ObjectLookup::Pruned {
                requested: Some(SequenceNumber(2)),
                earliest: SequenceNumber(3),
            }
        );
        assert_eq!(at(10).await.unwrap(), ObjectLookup::NotFound);
        match at(5).await.unwrap() {
            ObjectLookup::Found(object) => assert_eq!(object.coin_balance(), Some(Ok(50))),
            other => panic!("expected version 5, got {:?}", other),
        }
        assert_eq!(
            store
                .get_object(&Address::from_low_byte(0x99), None, 100)
                .await
                .unwrap(),
            ObjectLookup::NotFound
        );
    }

    #[tokio::test]
    async fn test_checkpoint_bounds_visibility() {
        let store = InMemoryStore::new();
        let id = Address::from_low_byte(0x10);
        let owner = Address::from_low_byte(1);
        store.insert_object(coin(id, 1, owner, 1), 1).unwrap();
        store.insert_object(coin(id, 4, owner, 4), 3).unwrap();

        let latest = |cp| store.get_object(&id, None, cp);
        assert!(matches!(latest(0).await.unwrap(), ObjectLookup::NotFound));
        assert!(matches!(latest(2).await.unwrap(), ObjectLookup::Found(o) if o.version == SequenceNumber(1)));
        assert!(matches!(latest(3).await.unwrap(), ObjectLookup::Found(o) if o.version == SequenceNumber(4)));
        // Exact version not yet finalized at the pinned checkpoint
        assert_eq!(
            store.get_object(&id, Some(SequenceNumber(4)), 2).await.unwrap(),
            ObjectLookup::NotFound
        );
    }

    #[tokio::test]
    async fn test_version_regression_rejected() {
        let store = InMemoryStore::new();
        let id = Address::from_low_byte(0x10);
        store.insert_object(coin(id, 5, Address::ZERO, 1), 1).unwrap();
        let err = store.insert_object(coin(id, 5, Address::ZERO, 1), 2).unwrap_err();
        assert!(matches!(err, ChainqlError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_deletion_and_existence() {
        let store = InMemoryStore::new();
        let id = Address::from_low_byte(0x10);
        store.insert_object(coin(id, 1, Address::ZERO, 1), 1).unwrap();
        store.delete_object(id, SequenceNumber(2), 2).unwrap();

        assert_eq!(
            store.object_existence(&id, 1).await.unwrap(),
            ObjectExistence::Exists(SequenceNumber(1))
        );
        assert_eq!(
            store.object_existence(&id, 2).await.unwrap(),
            ObjectExistence::Deleted(SequenceNumber(2))
        );
        assert_eq!(
            store
                .object_existence(&Address::from_low_byte(0x55), 2)
                .await
                .unwrap(),
            ObjectExistence::NeverExisted
        );
        assert_eq!(store.get_object(&id, None, 2).await.unwrap(), ObjectLookup::NotFound);
    }

    #[tokio::test]
    async fn test_scan_by_owner_pages_in_address_order() {
        let store = InMemoryStore::new();
        let alice = Address::from_low_byte(1);
        let bob = Address::from_low_byte(2);
        for i in 0..6u8 {
            let owner = if i % 2 == 0 { alice } else { bob };
            store
                .insert_object(coin(Address::from_low_byte(0x20 + i), 1, owner, 1), 1)
                .unwrap();
        }

        let first = store
            .scan_objects(&owned_by("0x1"), ScanRange::ascending(2), 1)
            .await
            .unwrap();
        let ids: Vec<_> = first.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![Address::from_low_byte(0x20), Address::from_low_byte(0x22)]);

        let rest = store
            .scan_objects(
                &owned_by("0x1"),
                ScanRange {
                    after: Some(first[1].key()),
                    ..ScanRange::ascending(10)
                },
                1,
            )
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, Address::from_low_byte(0x24));

        let backwards = store
            .scan_objects(&ObjectFilter::default(), ScanRange::descending(2), 1)
            .await
            .unwrap();
        assert_eq!(backwards[0].id, Address::from_low_byte(0x25));
        assert_eq!(backwards[1].id, Address::from_low_byte(0x24));
    }

    #[tokio::test]
    async fn test_scan_follows_current_owner() {
        let store = InMemoryStore::new();
        let id = Address::from_low_byte(0x30);
        store.insert_object(coin(id, 1, Address::from_low_byte(1), 1), 1).unwrap();
        store.insert_object(coin(id, 2, Address::from_low_byte(2), 1), 2).unwrap();

        let scan = |owner: &str, cp| {
            let filter = owned_by(owner);
            let store = &store;
            async move { store.scan_objects(&filter, ScanRange::ascending(10), cp).await.unwrap().len() }
        };
        assert_eq!(scan("0x1", 1).await, 1);
        assert_eq!(scan("0x1", 2).await, 0);
        assert_eq!(scan("0x2", 2).await, 1);
    }

    #[tokio::test]
    async fn test_checkpoint_pruning_moves_range() {
        let store = InMemoryStore::new();
        assert!(store.available_range().await.is_err());
        for seq in 0..5 {
            store.insert_checkpoint(checkpoint(seq)).unwrap();
        }
        assert!(store.insert_checkpoint(checkpoint(2)).is_err());
        store.prune_checkpoints(2);

        assert_eq!(
            store.available_range().await.unwrap(),
            AvailableRange { first: 2, last: 4 }
        );
        assert_eq!(store.get_checkpoint(1, 4).await.unwrap(), None);
        assert!(store.get_checkpoint(3, 4).await.unwrap().is_some());
        assert_eq!(store.get_checkpoint(4, 3).await.unwrap(), None);

        let desc = store.scan_checkpoints(ScanRange::descending(2), 4).await.unwrap();
        let seqs: Vec<u64> = desc.iter().map(|c| c.sequence_number).collect();
        assert_eq!(seqs, vec![4, 3]);
    }

    #[tokio::test]
    async fn test_checkpoint_pruning_remembers_transactions() {
        let store = InMemoryStore::new();
        let mut digests = Vec::new();
        for seq in 0..4 {
            store.insert_checkpoint(checkpoint(seq)).unwrap();
            let tx = finalized(seq);
            digests.push(tx.digest);
            store.insert_transaction(tx).unwrap();
        }
        assert_eq!(store.transaction_watermark().await.unwrap(), 0);
        store.prune_checkpoints(2);

        assert_eq!(store.transaction_watermark().await.unwrap(), 2);
        assert_eq!(
            store.get_transaction(&digests[1], 3).await.unwrap(),
            TransactionLookup::Pruned { checkpoint: 1 }
        );
        assert!(matches!(
            store.get_transaction(&digests[2], 3).await.unwrap(),
            TransactionLookup::Found(tx) if tx.tx_sequence == Some(2)
        ));
        assert_eq!(
            store.get_transaction(&digests[3], 2).await.unwrap(),
            TransactionLookup::NotFound
        );
        assert_eq!(
            store.get_transaction(&Digest::of(b"never"), 3).await.unwrap(),
            TransactionLookup::NotFound
        );
    }
}
