//! Storage layer for chainql
//!
//! This crate defines what the query core needs from chain storage and
//! provides reference implementations:
//! - ObjectStore: async adapter contract (versioned lookups, ordered scans)
//! - StoreSnapshot: one pinned checkpoint per request
//! - InMemoryStore: MVCC version chains with prune watermarks
//! - OverlayStore: copy-on-write view for simulated writes

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod overlay;
pub mod snapshot;
pub mod traits;

pub use memory::InMemoryStore;
pub use overlay::OverlayStore;
pub use snapshot::StoreSnapshot;
pub use traits::{
    AvailableRange, ObjectExistence, ObjectLookup, ObjectStore, ScanDirection, ScanRange,
    TransactionLookup,
};
