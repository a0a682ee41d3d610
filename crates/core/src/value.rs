//! Structured Move values
//!
//! `MoveValue` is the decoded form of stored bytes. The variant set is
//! closed; every consumer matches exhaustively.
//!
//! The JSON projection is display-oriented. Integer widths are dropped and
//! every integer renders as a decimal string, so clients limited to 53-bit
//! safe numbers never lose precision.

use crate::address::Address;
use crate::signature::DatatypeRef;
use num_bigint::BigUint;
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Fixed-width unsigned integer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MoveNumber {
    /// 8-bit
    U8(u8),
    /// 16-bit
    U16(u16),
    /// 32-bit
    U32(u32),
    /// 64-bit
    U64(u64),
    /// 128-bit
    U128(u128),
    /// 256-bit; always fits in 32 bytes
    U256(BigUint),
}

impl MoveNumber {
    /// Value as u64, if it fits
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            MoveNumber::U8(v) => Some(*v as u64),
            MoveNumber::U16(v) => Some(*v as u64),
            MoveNumber::U32(v) => Some(*v as u64),
            MoveNumber::U64(v) => Some(*v),
            MoveNumber::U128(v) => u64::try_from(*v).ok(),
            MoveNumber::U256(v) => u64::try_from(v).ok(),
        }
    }
}

impl fmt::Display for MoveNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveNumber::U8(v) => write!(f, "{}", v),
            MoveNumber::U16(v) => write!(f, "{}", v),
            MoveNumber::U32(v) => write!(f, "{}", v),
            MoveNumber::U64(v) => write!(f, "{}", v),
            MoveNumber::U128(v) => write!(f, "{}", v),
            MoveNumber::U256(v) => write!(f, "{}", v),
        }
    }
}

/// Struct value: type plus ordered fields
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoveStruct {
    /// Struct type
    pub type_: DatatypeRef,
    /// Field name → value, in declaration order
    pub fields: Vec<(String, MoveValue)>,
}

impl MoveStruct {
    /// Field by name
    pub fn field(&self, name: &str) -> Option<&MoveValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Decoded Move value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MoveValue {
    /// Any unsigned integer
    Number(MoveNumber),
    /// `bool`
    Bool(bool),
    /// `address`
    Address(Address),
    /// `0x2::object::UID` / `ID`, flattened to the wrapped address
    Uid(Address),
    /// UTF-8 or ASCII string
    String(String),
    /// `vector<T>`
    Vector(Vec<MoveValue>),
    /// `0x1::option::Option<T>`
    Option(Option<Box<MoveValue>>),
    /// Any other struct
    Struct(MoveStruct),
}

impl MoveValue {
    /// Display-oriented JSON projection
    pub fn to_json(&self) -> JsonValue {
        match self {
            MoveValue::Number(n) => JsonValue::String(n.to_string()),
            MoveValue::Bool(b) => JsonValue::Bool(*b),
            MoveValue::Address(a) | MoveValue::Uid(a) => JsonValue::String(a.to_string()),
            MoveValue::String(s) => JsonValue::String(s.clone()),
            MoveValue::Vector(items) => {
                JsonValue::Array(items.iter().map(MoveValue::to_json).collect())
            }
            MoveValue::Option(None) => JsonValue::Null,
            MoveValue::Option(Some(inner)) => inner.to_json(),
            MoveValue::Struct(s) => {
                let mut map = Map::with_capacity(s.fields.len());
                for (name, value) in &s.fields {
                    map.insert(name.clone(), value.to_json());
                }
                JsonValue::Object(map)
            }
        }
    }

    /// Struct payload, if this is a plain struct
    pub fn as_struct(&self) -> Option<&MoveStruct> {
        match self {
            MoveValue::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value as u64, if this is a number that fits
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            MoveValue::Number(n) => n.as_u64(),
            _ => None,
        }
    }
}
