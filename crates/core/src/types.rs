//! Version, reference and ownership types
//!
//! - `SequenceNumber`: per-object Lamport version
//! - `ObjectRef` / `ObjectKey`: versioned object references
//! - `Owner`: closed ownership variant

use crate::address::{Address, Digest, ObjectId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-object version, advanced by every mutating transaction
///
/// Serialized as a decimal string at JSON boundaries (64-bit values must not
/// lose precision on clients with 53-bit-safe numbers).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SequenceNumber(pub u64);

impl SequenceNumber {
    /// Lowest version an object can hold
    pub const MIN: SequenceNumber = SequenceNumber(0);

    /// Highest representable version
    pub const MAX: SequenceNumber = SequenceNumber(u64::MAX);

    /// Raw value
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    /// The version after this one
    pub fn next(self) -> SequenceNumber {
        SequenceNumber(self.0.saturating_add(1))
    }

    /// Lamport version assigned to every object written by a transaction:
    /// one past the highest input version
    pub fn lamport<I: IntoIterator<Item = SequenceNumber>>(inputs: I) -> SequenceNumber {
        inputs
            .into_iter()
            .max()
            .unwrap_or(SequenceNumber::MIN)
            .next()
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SequenceNumber {
    fn from(v: u64) -> Self {
        SequenceNumber(v)
    }
}

/// Reference to one exact object version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Object address
    pub object_id: ObjectId,
    /// Object version
    pub version: SequenceNumber,
    /// Digest of that version's contents
    pub digest: Digest,
}

impl ObjectRef {
    /// Build a reference
    pub fn new(object_id: ObjectId, version: SequenceNumber, digest: Digest) -> Self {
        ObjectRef {
            object_id,
            version,
            digest,
        }
    }

    /// Drop the digest, keeping the ordering key
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.object_id, self.version)
    }
}

/// `(address, version)` pair; the stable total order used for object scans
///
/// Ordered by address first, then version.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ObjectKey {
    /// Object address
    pub object_id: ObjectId,
    /// Object version
    pub version: SequenceNumber,
}

impl ObjectKey {
    /// Build a key
    pub fn new(object_id: ObjectId, version: SequenceNumber) -> Self {
        ObjectKey { object_id, version }
    }
}

/// Who may use an object as a transaction input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Owned by an address (account or, transitively, another object)
    AddressOwner(Address),

    /// Owned by a parent object; used for dynamic fields, never by an account
    ObjectOwner(ObjectId),

    /// Shared by consensus since `initial_shared_version`
    Shared {
        /// Version at which the object became shared
        initial_shared_version: SequenceNumber,
    },

    /// Frozen; cannot be mutated or transferred
    Immutable,
}

impl Owner {
    /// Direct owning address, for address- and object-owned objects
    pub fn owner_address(&self) -> Option<Address> {
        match self {
            Owner::AddressOwner(a) | Owner::ObjectOwner(a) => Some(*a),
            Owner::Shared { .. } | Owner::Immutable => None,
        }
    }

    /// True if `address` directly owns this object
    pub fn is_owned_by(&self, address: &Address) -> bool {
        matches!(self, Owner::AddressOwner(a) if a == address)
    }

    /// True if this object's parent is the object `parent`
    pub fn is_child_of(&self, parent: &ObjectId) -> bool {
        matches!(self, Owner::ObjectOwner(p) if p == parent)
    }

    /// Kind label used at the query surface
    pub fn kind(&self) -> &'static str {
        match self {
            Owner::AddressOwner(_) => "ADDRESS",
            Owner::ObjectOwner(_) => "PARENT",
            Owner::Shared { .. } => "SHARED",
            Owner::Immutable => "IMMUTABLE",
        }
    }
}
