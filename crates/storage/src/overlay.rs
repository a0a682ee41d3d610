//! OverlayStore: simulated writes layered over a base store
//!
//! A dry run produces new object versions, deletions and one transaction
//! block that must be queryable with the same resolvers as committed state,
//! without touching the base store. Reads check the overlay first and fall
//! through to the base. Writes go only to the overlay, and only at
//! construction time.
//!
//! Overlay entries are visible at every checkpoint: they describe the state
//! immediately after the latest one.

use crate::traits::{
    AvailableRange, ObjectExistence, ObjectLookup, ObjectStore, ScanDirection, ScanRange,
    TransactionLookup,
};
use async_trait::async_trait;
use chainql_core::{
    ChainqlResult, Checkpoint, Digest, Epoch, EventFilter, IndexedEvent, Object, ObjectFilter,
    ObjectId, ObjectKey, SequenceNumber, TransactionBlock, TransactionFilter,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Copy-on-write view over a base [`ObjectStore`]
pub struct OverlayStore {
    base: Arc<dyn ObjectStore>,
    /// `None` marks a deletion
    writes: BTreeMap<ObjectId, Option<Arc<Object>>>,
    transaction: Option<Arc<TransactionBlock>>,
}

impl OverlayStore {
    /// Empty overlay
    pub fn new(base: Arc<dyn ObjectStore>) -> Self {
        OverlayStore {
            base,
            writes: BTreeMap::new(),
            transaction: None,
        }
    }

    /// Add written object versions
    pub fn with_objects(mut self, objects: impl IntoIterator<Item = Object>) -> Self {
        for object in objects {
            self.writes.insert(object.id, Some(Arc::new(object)));
        }
        self
    }

    /// Mark objects deleted
    pub fn with_deleted(mut self, ids: impl IntoIterator<Item = ObjectId>) -> Self {
        for id in ids {
            self.writes.insert(id, None);
        }
        self
    }

    /// Make the simulated transaction resolvable by digest
    pub fn with_transaction(mut self, transaction: TransactionBlock) -> Self {
        self.transaction = Some(Arc::new(transaction));
        self
    }

    /// Number of overlaid ids (writes and deletions)
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// True if nothing is overlaid
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.transaction.is_none()
    }
}

#[async_trait]
impl ObjectStore for OverlayStore {
    async fn available_range(&self) -> ChainqlResult<AvailableRange> {
        self.base.available_range().await
    }

    async fn get_object(
        &self,
        id: &ObjectId,
        version: Option<SequenceNumber>,
        checkpoint: u64,
    ) -> ChainqlResult<ObjectLookup> {
        match (self.writes.get(id), version) {
            (Some(Some(object)), None) => Ok(ObjectLookup::Found(Arc::clone(object))),
            (Some(Some(object)), Some(v)) if object.version == v => {
                Ok(ObjectLookup::Found(Arc::clone(object)))
            }
            (Some(None), None) => Ok(ObjectLookup::NotFound),
            _ => self.base.get_object(id, version, checkpoint).await,
        }
    }

    async fn object_existence(&self, id: &ObjectId, checkpoint: u64) -> ChainqlResult<ObjectExistence> {
        match self.writes.get(id) {
            Some(Some(object)) => Ok(ObjectExistence::Exists(object.version)),
            Some(None) => Ok(ObjectExistence::Deleted(
                self.transaction
                    .as_ref()
                    .map_or(SequenceNumber::MIN, |tx| tx.effects.lamport_version),
            )),
            None => self.base.object_existence(id, checkpoint).await,
        }
    }

    async fn scan_objects(
        &self,
        filter: &ObjectFilter,
        range: ScanRange<ObjectKey>,
        checkpoint: u64,
    ) -> ChainqlResult<Vec<Arc<Object>>> {
        let limit = range.limit;
        let direction = range.direction;
        let mut widened = range.clone();
        // Every overlaid id may knock one base entry out
        widened.limit = limit.saturating_add(self.writes.len());

        let mut merged: BTreeMap<ObjectKey, Arc<Object>> = self
            .base
            .scan_objects(filter, widened, checkpoint)
            .await?
            .into_iter()
            .filter(|o| !self.writes.contains_key(&o.id))
            .map(|o| (o.key(), o))
            .collect();
        for object in self.writes.values().flatten() {
            if range.contains(&object.key()) && filter.matches(&**object) {
                merged.insert(object.key(), Arc::clone(object));
            }
        }

        let ordered = merged.into_values();
        Ok(match direction {
            ScanDirection::Ascending => ordered.take(limit).collect(),
            ScanDirection::Descending => ordered.rev().take(limit).collect(),
        })
    }

    async fn get_checkpoint(&self, sequence_number: u64, checkpoint: u64) -> ChainqlResult<Option<Checkpoint>> {
        self.base.get_checkpoint(sequence_number, checkpoint).await
    }

    async fn scan_checkpoints(&self, range: ScanRange<u64>, checkpoint: u64) -> ChainqlResult<Vec<Checkpoint>> {
        self.base.scan_checkpoints(range, checkpoint).await
    }

    async fn get_transaction(&self, digest: &Digest, checkpoint: u64) -> ChainqlResult<TransactionLookup> {
        match &self.transaction {
            Some(tx) if tx.digest == *digest => Ok(TransactionLookup::Found(Arc::clone(tx))),
            _ => self.base.get_transaction(digest, checkpoint).await,
        }
    }

    async fn transaction_watermark(&self) -> ChainqlResult<u64> {
        self.base.transaction_watermark().await
    }

    async fn scan_transactions(
        &self,
        filter: &TransactionFilter,
        range: ScanRange<u64>,
        checkpoint: u64,
    ) -> ChainqlResult<Vec<Arc<TransactionBlock>>> {
        self.base.scan_transactions(filter, range, checkpoint).await
    }

    async fn scan_events(
        &self,
        filter: &EventFilter,
        range: ScanRange<(u64, u32)>,
        checkpoint: u64,
    ) -> ChainqlResult<Vec<IndexedEvent>> {
        self.base.scan_events(filter, range, checkpoint).await
    }

    async fn get_epoch(&self, epoch_id: Option<u64>, checkpoint: u64) -> ChainqlResult<Option<Epoch>> {
        self.base.get_epoch(epoch_id, checkpoint).await
    }
}
