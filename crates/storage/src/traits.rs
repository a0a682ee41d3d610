//! Object store adapter contract
//!
//! The query core never writes. Everything it needs from the durable store is
//! captured by [`ObjectStore`]: versioned point lookups, ordered range scans
//! bounded by a checkpoint, and existence checks that tell "never existed"
//! apart from "pruned".
//!
//! All scans return entries in a stable total order so callers can page over
//! them with cursors:
//!
//! | Entity | Order key |
//! |--------|-----------|
//! | objects | `(address, version)` |
//! | checkpoints | sequence number |
//! | transactions | `tx_sequence` |
//! | events | `(tx_sequence, event_index)` |

use async_trait::async_trait;
use chainql_core::{
    ChainqlError, Checkpoint, ChainqlResult, Digest, Epoch, EventFilter, IndexedEvent, Object, ObjectFilter,
    ObjectId, ObjectKey, PackageDecl, SequenceNumber, TransactionBlock, TransactionFilter,
};
use std::sync::Arc;

/// Scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanDirection {
    /// Smallest key first
    #[default]
    Ascending,
    /// Largest key first
    Descending,
}

/// Bounded, exclusive key range with a result limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRange<K> {
    /// Only keys strictly greater than this
    pub after: Option<K>,
    /// Only keys strictly less than this
    pub before: Option<K>,
    /// Which end to start from
    pub direction: ScanDirection,
    /// Maximum entries to return
    pub limit: usize,
}

impl<K: Ord> ScanRange<K> {
    /// Unbounded ascending scan
    pub fn ascending(limit: usize) -> Self {
        ScanRange {
            after: None,
            before: None,
            direction: ScanDirection::Ascending,
            limit,
        }
    }

    /// Unbounded descending scan
    pub fn descending(limit: usize) -> Self {
        ScanRange {
            direction: ScanDirection::Descending,
            ..Self::ascending(limit)
        }
    }

    /// True if `key` lies strictly between the bounds
    pub fn contains(&self, key: &K) -> bool {
        self.after.as_ref().map_or(true, |a| key > a) && self.before.as_ref().map_or(true, |b| key < b)
    }
}

/// Checkpoints the store can currently answer for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailableRange {
    /// Earliest unpruned checkpoint
    pub first: u64,
    /// Latest finalized checkpoint
    pub last: u64,
}

impl AvailableRange {
    /// True if `checkpoint` lies inside the range
    pub fn contains(&self, checkpoint: u64) -> bool {
        checkpoint >= self.first && checkpoint <= self.last
    }
}

/// Result of a versioned point lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectLookup {
    /// The requested version
    Found(Arc<Object>),
    /// Never existed at this version, or not yet written at the checkpoint
    NotFound,
    /// Existed, but the version is below the prune watermark
    Pruned {
        /// Version asked for; `None` for a latest-version lookup
        requested: Option<SequenceNumber>,
        /// Earliest version still retained
        earliest: SequenceNumber,
    },
}

/// Result of a transaction lookup by digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionLookup {
    /// Finalized at or before the pinned checkpoint
    Found(Arc<TransactionBlock>),
    /// Unknown digest, or finalized after the pinned checkpoint
    NotFound,
    /// Finalized in a checkpoint that has since been pruned
    Pruned {
        /// Checkpoint the transaction was finalized in
        checkpoint: u64,
    },
}

/// Whether an object has ever existed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectExistence {
    /// A live version exists
    Exists(SequenceNumber),
    /// Was deleted or wrapped at this version
    Deleted(SequenceNumber),
    /// Only versions below the watermark ever existed
    Pruned,
    /// No record at all
    NeverExisted,
}

/// Read-only access to versioned chain state
///
/// Every read takes the checkpoint the caller has pinned; nothing written
/// after that checkpoint is visible.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Checkpoints this store can serve
    async fn available_range(&self) -> ChainqlResult<AvailableRange>;

    /// Object at `version`, or the latest version live at `checkpoint`
    async fn get_object(
        &self,
        id: &ObjectId,
        version: Option<SequenceNumber>,
        checkpoint: u64,
    ) -> ChainqlResult<ObjectLookup>;

    /// Existence of an object as of `checkpoint`
    async fn object_existence(&self, id: &ObjectId, checkpoint: u64) -> ChainqlResult<ObjectExistence>;

    /// Objects matching `filter`, ordered by `(address, version)`
    ///
    /// Without explicit `objectKeys`, only the latest version of each object
    /// live at `checkpoint` is considered.
    async fn scan_objects(
        &self,
        filter: &ObjectFilter,
        range: ScanRange<ObjectKey>,
        checkpoint: u64,
    ) -> ChainqlResult<Vec<Arc<Object>>>;

    /// Checkpoint by sequence number, if at or before `checkpoint`
    async fn get_checkpoint(&self, sequence_number: u64, checkpoint: u64) -> ChainqlResult<Option<Checkpoint>>;

    /// Checkpoints up to `checkpoint`, ordered by sequence number
    async fn scan_checkpoints(&self, range: ScanRange<u64>, checkpoint: u64) -> ChainqlResult<Vec<Checkpoint>>;

    /// Transaction by digest, if finalized at or before `checkpoint`
    async fn get_transaction(&self, digest: &Digest, checkpoint: u64) -> ChainqlResult<TransactionLookup>;

    /// Transactions with a `tx_sequence` below this have been pruned
    async fn transaction_watermark(&self) -> ChainqlResult<u64> {
        Ok(0)
    }

    /// Transactions matching `filter`, ordered by `tx_sequence`
    async fn scan_transactions(
        &self,
        filter: &TransactionFilter,
        range: ScanRange<u64>,
        checkpoint: u64,
    ) -> ChainqlResult<Vec<Arc<TransactionBlock>>>;

    /// Events matching `filter`, ordered by `(tx_sequence, event_index)`
    async fn scan_events(
        &self,
        filter: &EventFilter,
        range: ScanRange<(u64, u32)>,
        checkpoint: u64,
    ) -> ChainqlResult<Vec<IndexedEvent>>;

    /// Epoch by id, or the one containing `checkpoint`
    async fn get_epoch(&self, epoch_id: Option<u64>, checkpoint: u64) -> ChainqlResult<Option<Epoch>>;

    /// Latest version of a package object
    ///
    /// A package whose versions were all pruned is `DataUnavailable`, not
    /// `None`.
    async fn get_package(&self, id: &ObjectId, checkpoint: u64) -> ChainqlResult<Option<Arc<PackageDecl>>> {
        match self.get_object(id, None, checkpoint).await? {
            ObjectLookup::Found(object) => Ok(object.as_package().cloned().map(Arc::new)),
            ObjectLookup::NotFound => Ok(None),
            ObjectLookup::Pruned { earliest, .. } => Err(ChainqlError::unavailable(format!(
                "package {} at checkpoint {} has been pruned; earliest available version is {}",
                id, checkpoint, earliest
            ))),
        }
    }
}
