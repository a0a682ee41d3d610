//! Versioned objects
//!
//! An object is identified by `(id, version)`. Each version is written by
//! exactly one transaction and never changes afterwards. Packages are
//! objects too; their data is the package declaration.

use crate::address::{Address, Digest, ObjectId};
use crate::decode::{coin_balance, DecodeError};
use crate::package::PackageDecl;
use crate::signature::TypeSignature;
use crate::types::{ObjectKey, ObjectRef, Owner, SequenceNumber};
use serde::{Deserialize, Serialize};

/// Contents of a Move object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveObject {
    /// Concrete type of the contents
    pub type_: TypeSignature,
    /// Has `store`, so anyone holding it may transfer it
    pub has_public_transfer: bool,
    /// Canonical encoding of the value; begins with the object's UID
    pub contents: Vec<u8>,
}

/// What an object holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectData {
    /// A Move value
    Move(MoveObject),
    /// A published package
    Package(PackageDecl),
}

/// One version of an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    /// Object address
    pub id: ObjectId,
    /// Version
    pub version: SequenceNumber,
    /// Digest of this version
    pub digest: Digest,
    /// Current owner
    pub owner: Owner,
    /// Transaction that wrote this version
    pub previous_transaction: Digest,
    /// Rebate refunded when the object is deleted
    pub storage_rebate: u64,
    /// Payload
    pub data: ObjectData,
}

#[derive(Serialize)]
struct DigestInput<'a> {
    id: &'a ObjectId,
    version: SequenceNumber,
    owner: &'a Owner,
    data: &'a ObjectData,
}

impl Object {
    /// Build a Move object version, computing its digest
    pub fn new_move(
        id: ObjectId,
        version: SequenceNumber,
        owner: Owner,
        type_: TypeSignature,
        contents: Vec<u8>,
        previous_transaction: Digest,
    ) -> Self {
        let has_public_transfer = type_.is_coin();
        let mut object = Object {
            id,
            version,
            digest: Digest::default(),
            owner,
            previous_transaction,
            storage_rebate: 0,
            data: ObjectData::Move(MoveObject {
                type_,
                has_public_transfer,
                contents,
            }),
        };
        object.digest = object.compute_digest();
        object
    }

    /// Wrap a published package; packages are immutable
    pub fn new_package(package: PackageDecl, previous_transaction: Digest) -> Self {
        let mut object = Object {
            id: package.id,
            version: package.version,
            digest: Digest::default(),
            owner: Owner::Immutable,
            previous_transaction,
            storage_rebate: 0,
            data: ObjectData::Package(package),
        };
        object.digest = object.compute_digest();
        object
    }

    /// Digest over identity, owner and payload
    pub fn compute_digest(&self) -> Digest {
        let input = DigestInput {
            id: &self.id,
            version: self.version,
            owner: &self.owner,
            data: &self.data,
        };
        Digest::of(&bincode::serialize(&input).unwrap_or_default())
    }

    /// New version of this object with different contents and owner
    ///
    /// Recomputes the digest; used by execution engines to write outputs.
    pub fn mutated(
        &self,
        version: SequenceNumber,
        owner: Owner,
        contents: Option<Vec<u8>>,
        previous_transaction: Digest,
    ) -> Object {
        let mut next = self.clone();
        next.version = version;
        next.owner = owner;
        next.previous_transaction = previous_transaction;
        if let (ObjectData::Move(m), Some(bytes)) = (&mut next.data, contents) {
            m.contents = bytes;
        }
        next.digest = next.compute_digest();
        next
    }

    /// `(id, version, digest)`
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.id, self.version, self.digest)
    }

    /// `(id, version)`
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.id, self.version)
    }

    /// Move contents, if this is not a package
    pub fn as_move(&self) -> Option<&MoveObject> {
        match &self.data {
            ObjectData::Move(m) => Some(m),
            ObjectData::Package(_) => None,
        }
    }

    /// Package declaration, if this is a package
    pub fn as_package(&self) -> Option<&PackageDecl> {
        match &self.data {
            ObjectData::Package(p) => Some(p),
            ObjectData::Move(_) => None,
        }
    }

    /// Type of a Move object
    pub fn type_(&self) -> Option<&TypeSignature> {
        self.as_move().map(|m| &m.type_)
    }

    /// True for `Coin<T>` objects
    pub fn is_coin(&self) -> bool {
        self.type_().map_or(false, TypeSignature::is_coin)
    }

    /// Balance of a coin object; `None` for anything else
    pub fn coin_balance(&self) -> Option<Result<u64, DecodeError>> {
        let m = self.as_move()?;
        if !m.type_.is_coin() {
            return None;
        }
        Some(coin_balance(&m.contents))
    }

    /// Owning address for address-owned objects
    pub fn owner_address(&self) -> Option<Address> {
        match self.owner {
            Owner::AddressOwner(a) => Some(a),
            _ => None,
        }
    }
}
