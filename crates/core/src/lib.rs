//! Core types for chainql
//!
//! This crate defines the foundational types used throughout the query core:
//! - Address, Digest: 32-byte identifiers for objects, accounts and transactions
//! - SequenceNumber, ObjectRef, ObjectKey, Owner: versioned object identity
//! - TypeSignature, OpenSignature: the Move type signature model
//! - TypeLayout, PackageDecl: declarations and the byte shapes they imply
//! - MoveValue, decode/encode: the Move value decoder
//! - Cursor, QueryFingerprint: opaque pagination tokens
//! - ObjectFilter, TransactionFilter, EventFilter: connection filters
//! - Object, TransactionBlock, Checkpoint, Epoch: chain entities
//! - ChainqlError: error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod checkpoint;
pub mod cursor;
pub mod decode;
pub mod error;
pub mod filter;
pub mod layout;
pub mod object;
pub mod package;
pub mod signature;
pub mod transaction;
pub mod types;
pub mod value;

pub use address::{Address, AddressParseError, Digest, DigestParseError, ObjectId};
pub use checkpoint::{Checkpoint, Epoch};
pub use cursor::{Cursor, CursorError, FingerprintBuilder, QueryFingerprint};
pub use decode::{DecodeError, EncodeError};
pub use error::{ChainqlError, ChainqlResult, ErrorClass};
pub use filter::{EventFilter, Filter, FilterError, FilterFields, ObjectFilter, TransactionFilter, TypeFilter};
pub use layout::{build_layout, LayoutError, StructLayout, StructSource, TypeLayout};
pub use object::{MoveObject, Object, ObjectData};
pub use package::{
    Ability, AbilitySet, FieldDecl, FunctionDecl, ModuleDecl, PackageDecl, StructDecl,
    StructTypeParameter, TypeOrigin, UpgradeInfo, Visibility,
};
pub use signature::{
    DatatypeRef, OpenSignature, OpenSignatureBody, RefKind, SignatureError, SignatureParseError,
    TypeSignature,
};
pub use transaction::{
    BalanceChange, Event, ExecutionStatus, GasCostSummary, IdOperation, IndexedEvent,
    ObjectChange, TransactionBlock, TransactionData, TransactionEffects, TransactionKind,
};
pub use types::{ObjectKey, ObjectRef, Owner, SequenceNumber};
pub use value::{MoveNumber, MoveStruct, MoveValue};
