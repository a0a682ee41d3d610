//! Object capabilities
//!
//! Objects show up at the query surface under several types (`Object`,
//! `MoveObject`, `Coin`, `MovePackage`) that share groups of fields. Each
//! group is one capability trait; the resolver resolves the group's fields
//! against the trait, never against a concrete view.

use chainql_core::decode::DecodeError;
use chainql_core::{
    Address, Digest, MoveObject, Object, ObjectData, Owner, PackageDecl, SequenceNumber,
    TypeSignature,
};
use std::sync::Arc;

// ============================================================================
// Capabilities
// ============================================================================

/// Has an identity and a version history
pub trait VersionedObject {
    /// Underlying object
    fn object(&self) -> &Arc<Object>;

    /// Object address
    fn address(&self) -> Address {
        self.object().id
    }

    /// Object version
    fn version(&self) -> SequenceNumber {
        self.object().version
    }

    /// Digest of this version
    fn digest(&self) -> Digest {
        self.object().digest
    }

    /// Transaction that wrote this version
    fn previous_transaction(&self) -> Digest {
        self.object().previous_transaction
    }

    /// Rebate paid back when this version is deleted
    fn storage_rebate(&self) -> u64 {
        self.object().storage_rebate
    }
}

/// Has an owner
pub trait Ownable {
    /// Current owner
    fn owner(&self) -> Owner;
}

/// Holds a typed Move value
pub trait HasMoveContents {
    /// Move object payload
    fn move_object(&self) -> &MoveObject;

    /// Type of the value
    fn contents_type(&self) -> &TypeSignature {
        &self.move_object().type_
    }

    /// Canonical bytes of the value
    fn contents(&self) -> &[u8] {
        &self.move_object().contents
    }

    /// Transferable with the unrestricted transfer functions
    fn has_public_transfer(&self) -> bool {
        self.move_object().has_public_transfer
    }
}

// ============================================================================
// Views
// ============================================================================

/// Any object
#[derive(Debug, Clone)]
pub struct ObjectView(pub Arc<Object>);

/// Object holding a Move value
#[derive(Debug, Clone)]
pub struct MoveObjectView(Arc<Object>);

/// `Coin<T>` object
#[derive(Debug, Clone)]
pub struct CoinView(Arc<Object>);

/// Published package
#[derive(Debug, Clone)]
pub struct PackageView(Arc<Object>);

impl ObjectView {
    /// Project to a Move object; `None` for packages
    pub fn as_move_object(&self) -> Option<MoveObjectView> {
        MoveObjectView::new(Arc::clone(&self.0))
    }

    /// Project to a package; `None` for Move objects
    pub fn as_package(&self) -> Option<PackageView> {
        PackageView::new(Arc::clone(&self.0))
    }
}

impl MoveObjectView {
    /// View `object` as a Move object
    pub fn new(object: Arc<Object>) -> Option<Self> {
        object.as_move().is_some().then(|| MoveObjectView(object))
    }

    /// Project to a coin; `None` unless the type is `Coin<T>`
    pub fn as_coin(&self) -> Option<CoinView> {
        CoinView::new(Arc::clone(&self.0))
    }
}

impl CoinView {
    /// View `object` as a coin
    pub fn new(object: Arc<Object>) -> Option<Self> {
        object.is_coin().then(|| CoinView(object))
    }

    /// Coin balance, read from the contents
    pub fn balance(&self) -> Result<u64, DecodeError> {
        chainql_core::decode::coin_balance(self.contents())
    }

    /// The `T` in `Coin<T>`
    pub fn coin_type(&self) -> Option<&TypeSignature> {
        self.contents_type().coin_type_argument()
    }
}

impl PackageView {
    /// View `object` as a package
    pub fn new(object: Arc<Object>) -> Option<Self> {
        object.as_package().is_some().then(|| PackageView(object))
    }

    /// Package declaration
    pub fn package(&self) -> &PackageDecl {
        match &self.0.data {
            ObjectData::Package(p) => p,
            ObjectData::Move(_) => unreachable!("PackageView over a Move object"),
        }
    }
}

macro_rules! versioned_view {
    ($($view:ty),*) => {$(
        impl VersionedObject for $view {
            fn object(&self) -> &Arc<Object> {
                &self.0
            }
        }

        impl Ownable for $view {
            fn owner(&self) -> Owner {
                self.0.owner
            }
        }
    )*};
}

versioned_view!(ObjectView, MoveObjectView, CoinView, PackageView);

fn move_payload(object: &Object) -> &MoveObject {
    match &object.data {
        ObjectData::Move(m) => m,
        ObjectData::Package(_) => unreachable!("Move view over a package"),
    }
}

impl HasMoveContents for MoveObjectView {
    fn move_object(&self) -> &MoveObject {
        move_payload(&self.0)
    }
}

impl HasMoveContents for CoinView {
    fn move_object(&self) -> &MoveObject {
        move_payload(&self.0)
    }
}
