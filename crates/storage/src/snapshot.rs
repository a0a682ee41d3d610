//! StoreSnapshot: one consistent checkpoint view per request
//!
//! A request pins a checkpoint once, at the start of resolution. Every nested
//! field then reads through the same snapshot, so concurrent sibling
//! resolution never observes two different chain states.
//!
//! The snapshot also turns adapter-level lookups into the query core's error
//! classes: a pruned version becomes `DataUnavailable`, a missing one `None`.
//! A scan that walks below the prune floor before filling its limit is
//! `DataUnavailable` as well, since its result would be silently short.

use crate::traits::{
    AvailableRange, ObjectExistence, ObjectLookup, ObjectStore, ScanDirection, ScanRange,
    TransactionLookup,
};
use chainql_core::{
    ChainqlError, ChainqlResult, Checkpoint, Digest, Epoch, EventFilter, IndexedEvent, Object,
    ObjectFilter, ObjectId, ObjectKey, PackageDecl, SequenceNumber, TransactionBlock,
    TransactionFilter,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read view pinned to one checkpoint
#[derive(Clone)]
pub struct StoreSnapshot {
    store: Arc<dyn ObjectStore>,
    checkpoint: u64,
    range: AvailableRange,
}

impl fmt::Debug for StoreSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSnapshot")
            .field("checkpoint", &self.checkpoint)
            .field("range", &self.range)
            .finish()
    }
}

fn out_of_range(checkpoint: u64, range: &AvailableRange) -> ChainqlError {
    ChainqlError::unavailable(format!(
        "checkpoint {} is outside the available range [{}, {}]",
        checkpoint, range.first, range.last
    ))
}

/// True if a scan whose lowest key is `lower` visited keys below `floor`
///
/// Ascending scans start at `lower`; descending ones only get there when
/// they run out of entries before `limit`.
fn crosses_floor(lower: u64, floor: u64, direction: ScanDirection, limit: usize, returned: usize) -> bool {
    lower < floor
        && match direction {
            ScanDirection::Ascending => true,
            ScanDirection::Descending => returned < limit,
        }
}

fn pruned_scan(what: &str, lower: u64, floor: u64) -> ChainqlError {
    warn!(target: "chainql::storage", what, lower, floor, "Scan reached pruned range");
    ChainqlError::unavailable(format!(
        "{} scan from {} reaches below the pruned boundary {}",
        what, lower, floor
    ))
}

impl StoreSnapshot {
    /// Pin `requested`, or the latest checkpoint if `None`
    pub async fn pin(store: Arc<dyn ObjectStore>, requested: Option<u64>) -> ChainqlResult<Self> {
        let range = store.available_range().await?;
        let checkpoint = requested.unwrap_or(range.last);
        if !range.contains(checkpoint) {
            warn!(target: "chainql::storage", checkpoint, first = range.first, last = range.last, "Checkpoint outside available range");
            return Err(out_of_range(checkpoint, &range));
        }
        debug!(target: "chainql::storage", checkpoint, "Pinned snapshot");
        Ok(StoreSnapshot {
            store,
            checkpoint,
            range,
        })
    }

    /// Same store, re-pinned at an earlier checkpoint
    pub fn at_checkpoint(&self, checkpoint: u64) -> ChainqlResult<Self> {
        if !self.range.contains(checkpoint) || checkpoint > self.checkpoint {
            return Err(out_of_range(checkpoint, &self.range));
        }
        Ok(StoreSnapshot {
            checkpoint,
            ..self.clone()
        })
    }

    /// Pinned checkpoint
    pub fn checkpoint(&self) -> u64 {
        self.checkpoint
    }

    /// Range observed when the snapshot was pinned
    pub fn available_range(&self) -> AvailableRange {
        self.range
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Object at `version` (or latest); `None` if it does not exist
    pub async fn object(
        &self,
        id: &ObjectId,
        version: Option<SequenceNumber>,
    ) -> ChainqlResult<Option<Arc<Object>>> {
        match self.store.get_object(id, version, self.checkpoint).await? {
            ObjectLookup::Found(object) => Ok(Some(object)),
            ObjectLookup::NotFound => Ok(None),
            ObjectLookup::Pruned { requested, earliest } => {
                warn!(target: "chainql::storage", object_id = %id, ?requested, %earliest, "Object version pruned");
                Err(ChainqlError::unavailable(match requested {
                    Some(v) => format!(
                        "object {} version {} has been pruned; earliest available is {}",
                        id, v, earliest
                    ),
                    None => format!(
                        "object {} at checkpoint {} has been pruned; earliest available version is {}",
                        id, self.checkpoint, earliest
                    ),
                }))
            }
        }
    }

    /// Existence of an object
    pub async fn existence(&self, id: &ObjectId) -> ChainqlResult<ObjectExistence> {
        self.store.object_existence(id, self.checkpoint).await
    }

    /// Objects matching `filter`
    pub async fn objects(
        &self,
        filter: &ObjectFilter,
        range: ScanRange<ObjectKey>,
    ) -> ChainqlResult<Vec<Arc<Object>>> {
        self.store.scan_objects(filter, range, self.checkpoint).await
    }

    /// Package declaration
    pub async fn package(&self, id: &ObjectId) -> ChainqlResult<Option<Arc<PackageDecl>>> {
        self.store.get_package(id, self.checkpoint).await
    }

    /// Checkpoint by sequence number, or the pinned one
    pub async fn checkpoint_at(&self, sequence_number: Option<u64>) -> ChainqlResult<Option<Checkpoint>> {
        let seq = sequence_number.unwrap_or(self.checkpoint);
        if seq < self.range.first {
            return Err(out_of_range(seq, &self.range));
        }
        self.store.get_checkpoint(seq, self.checkpoint).await
    }

    /// Checkpoints in `range`
    pub async fn checkpoints(&self, range: ScanRange<u64>) -> ChainqlResult<Vec<Checkpoint>> {
        let lower = range.after.map_or(0, |a| a.saturating_add(1));
        let (direction, limit) = (range.direction, range.limit);
        let checkpoints = self.store.scan_checkpoints(range, self.checkpoint).await?;
        if crosses_floor(lower, self.range.first, direction, limit, checkpoints.len()) {
            return Err(pruned_scan("checkpoint", lower, self.range.first));
        }
        Ok(checkpoints)
    }

    /// Transaction by digest
    pub async fn transaction(&self, digest: &Digest) -> ChainqlResult<Option<Arc<TransactionBlock>>> {
        match self.store.get_transaction(digest, self.checkpoint).await? {
            TransactionLookup::Found(tx) => Ok(Some(tx)),
            TransactionLookup::NotFound => Ok(None),
            TransactionLookup::Pruned { checkpoint } => {
                warn!(target: "chainql::storage", %digest, checkpoint, "Transaction pruned");
                Err(ChainqlError::unavailable(format!(
                    "transaction {} was finalized in checkpoint {}, which has been pruned; earliest available is {}",
                    digest, checkpoint, self.range.first
                )))
            }
        }
    }

    /// Transactions matching `filter`
    pub async fn transactions(
        &self,
        filter: &TransactionFilter,
        range: ScanRange<u64>,
    ) -> ChainqlResult<Vec<Arc<TransactionBlock>>> {
        let floor = self.store.transaction_watermark().await?;
        let lower = range.after.map_or(0, |a| a.saturating_add(1));
        let (direction, limit) = (range.direction, range.limit);
        let txs = self.store.scan_transactions(filter, range, self.checkpoint).await?;
        if crosses_floor(lower, floor, direction, limit, txs.len()) {
            return Err(pruned_scan("transaction", lower, floor));
        }
        Ok(txs)
    }

    /// Events matching `filter`
    pub async fn events(
        &self,
        filter: &EventFilter,
        range: ScanRange<(u64, u32)>,
    ) -> ChainqlResult<Vec<IndexedEvent>> {
        let floor = self.store.transaction_watermark().await?;
        let lower = range.after.map_or(0, |(seq, _)| seq);
        let (direction, limit) = (range.direction, range.limit);
        let events = self.store.scan_events(filter, range, self.checkpoint).await?;
        if crosses_floor(lower, floor, direction, limit, events.len()) {
            return Err(pruned_scan("event", lower, floor));
        }
        Ok(events)
    }

    /// Epoch by id, or the current one
    pub async fn epoch(&self, epoch_id: Option<u64>) -> ChainqlResult<Option<Epoch>> {
        self.store.get_epoch(epoch_id, self.checkpoint).await
    }
}
