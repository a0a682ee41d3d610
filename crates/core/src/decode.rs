//! Move value decoder
//!
//! Converts stored bytes into a [`MoveValue`] given a [`TypeLayout`], and
//! back. Decoding is a pure function of bytes and layout.
//!
//! ## Wire format
//!
//! | Layout | Encoding |
//! |--------|----------|
//! | `bool` | 1 byte, `0x00` or `0x01` |
//! | `u8`..`u256` | fixed width, little-endian |
//! | `address` | 32 raw bytes |
//! | `vector<T>` | ULEB128 length, then each element |
//! | struct | each field in declaration order, no framing |
//!
//! `String` is its `vector<u8>` bytes, `UID`/`ID` is its 32-byte address and
//! `Option<T>` is a vector of length 0 or 1.
//!
//! ## Trailing bytes
//!
//! [`decode`] treats unread bytes as an error. [`decode_prefix`] is for
//! values embedded in a larger buffer and reports how much it consumed.

use crate::address::{Address, ADDRESS_LENGTH};
use crate::layout::{StructLayout, TypeLayout, WellKnownStruct};
use crate::value::{MoveNumber, MoveStruct, MoveValue};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use num_bigint::BigUint;
use thiserror::Error;

/// Largest vector length the wire format can carry
pub const MAX_SEQUENCE_LENGTH: u64 = u32::MAX as u64;

/// Failure to decode bytes against a layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before the layout was satisfied
    #[error("truncated data: needed {needed} more bytes, {remaining} remaining")]
    TruncatedData {
        /// Bytes required by the next read
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// Bytes remained after a top-level value
    #[error("trailing data: {remaining} unread bytes")]
    TrailingData {
        /// Bytes left over
        remaining: usize,
    },

    /// A bool byte other than 0 or 1
    #[error("invalid bool byte: {0:#04x}")]
    InvalidBool(u8),

    /// String bytes are not valid UTF-8
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// Malformed or non-canonical ULEB128 length
    #[error("invalid ULEB128 length prefix")]
    InvalidUleb128,

    /// Option encoded with more than one element
    #[error("option has {0} elements")]
    InvalidOption(u64),
}

/// Failure to encode a value against a layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Value variant does not fit the layout
    #[error("value does not match layout: expected {expected}")]
    Mismatch {
        /// Layout being encoded
        expected: String,
    },

    /// Struct value has a different field set than its layout
    #[error("struct {type_name} has {found} fields, layout has {expected}")]
    FieldCount {
        /// Struct being encoded
        type_name: String,
        /// Fields in the layout
        expected: usize,
        /// Fields in the value
        found: usize,
    },

    /// u256 value wider than 32 bytes
    #[error("u256 value out of range")]
    NumberOutOfRange,
}

// =============================================================================
// Decoding
// =============================================================================

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::TruncatedData {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn uleb128(&mut self) -> Result<u64, DecodeError> {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.take(1)?[0];
            let digit = (byte & 0x7f) as u64;
            if shift >= 32 {
                return Err(DecodeError::InvalidUleb128);
            }
            value |= digit << shift;
            if byte & 0x80 == 0 {
                // a zero final byte after the first is non-canonical
                if shift > 0 && byte == 0 {
                    return Err(DecodeError::InvalidUleb128);
                }
                break;
            }
            shift += 7;
        }
        if value > MAX_SEQUENCE_LENGTH {
            return Err(DecodeError::InvalidUleb128);
        }
        Ok(value)
    }

    fn length(&mut self) -> Result<usize, DecodeError> {
        let len = self.uleb128()?;
        // Every element occupies at least one byte.
        if len as usize > self.remaining() {
            return Err(DecodeError::TruncatedData {
                needed: len as usize,
                remaining: self.remaining(),
            });
        }
        Ok(len as usize)
    }

    fn address(&mut self) -> Result<Address, DecodeError> {
        let bytes = self.take(ADDRESS_LENGTH)?;
        let mut array = [0u8; ADDRESS_LENGTH];
        array.copy_from_slice(bytes);
        Ok(Address::new(array))
    }
}

/// Decode a complete buffer; unread bytes are an error
pub fn decode(bytes: &[u8], layout: &TypeLayout) -> Result<MoveValue, DecodeError> {
    let (value, consumed) = decode_prefix(bytes, layout)?;
    if consumed != bytes.len() {
        return Err(DecodeError::TrailingData {
            remaining: bytes.len() - consumed,
        });
    }
    Ok(value)
}

/// Decode one value from the front of `bytes`
///
/// Returns the value and the number of bytes consumed.
pub fn decode_prefix(bytes: &[u8], layout: &TypeLayout) -> Result<(MoveValue, usize), DecodeError> {
    let mut reader = Reader::new(bytes);
    let value = read_value(&mut reader, layout)?;
    Ok((value, reader.pos))
}

fn read_value(r: &mut Reader<'_>, layout: &TypeLayout) -> Result<MoveValue, DecodeError> {
    Ok(match layout {
        TypeLayout::Bool => match r.take(1)?[0] {
            0 => MoveValue::Bool(false),
            1 => MoveValue::Bool(true),
            other => return Err(DecodeError::InvalidBool(other)),
        },
        TypeLayout::U8 => MoveValue::Number(MoveNumber::U8(r.take(1)?[0])),
        TypeLayout::U16 => MoveValue::Number(MoveNumber::U16(LittleEndian::read_u16(r.take(2)?))),
        TypeLayout::U32 => MoveValue::Number(MoveNumber::U32(LittleEndian::read_u32(r.take(4)?))),
        TypeLayout::U64 => MoveValue::Number(MoveNumber::U64(LittleEndian::read_u64(r.take(8)?))),
        TypeLayout::U128 => {
            MoveValue::Number(MoveNumber::U128(LittleEndian::read_u128(r.take(16)?)))
        }
        TypeLayout::U256 => {
            MoveValue::Number(MoveNumber::U256(BigUint::from_bytes_le(r.take(32)?)))
        }
        TypeLayout::Address => MoveValue::Address(r.address()?),
        TypeLayout::Vector(inner) => {
            let len = r.length()?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(read_value(r, inner)?);
            }
            MoveValue::Vector(items)
        }
        TypeLayout::Struct(s) => read_struct(r, s)?,
    })
}

fn read_struct(r: &mut Reader<'_>, layout: &StructLayout) -> Result<MoveValue, DecodeError> {
    match layout.well_known() {
        Some(WellKnownStruct::String) => {
            let len = r.length()?;
            let bytes = r.take(len)?;
            let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
            return Ok(MoveValue::String(s.to_string()));
        }
        Some(WellKnownStruct::Uid) => return Ok(MoveValue::Uid(r.address()?)),
        Some(WellKnownStruct::Option) => {
            if let Some(element) = option_element(layout) {
                let len = r.uleb128()?;
                return match len {
                    0 => Ok(MoveValue::Option(None)),
                    1 => Ok(MoveValue::Option(Some(Box::new(read_value(r, element)?)))),
                    n => Err(DecodeError::InvalidOption(n)),
                };
            }
        }
        None => {}
    }

    let mut fields = Vec::with_capacity(layout.fields.len());
    for field in &layout.fields {
        fields.push((field.name.clone(), read_value(r, &field.layout)?));
    }
    Ok(MoveValue::Struct(MoveStruct {
        type_: layout.type_.clone(),
        fields,
    }))
}

/// Element layout of an `Option<T>` struct (`{ vec: vector<T> }`)
fn option_element(layout: &StructLayout) -> Option<&TypeLayout> {
    match layout.fields.as_slice() {
        [only] => match &only.layout {
            TypeLayout::Vector(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value with the same layout it was decoded from
pub fn encode(value: &MoveValue, layout: &TypeLayout) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    write_value(&mut out, value, layout)?;
    Ok(out)
}

fn write_uleb128(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn mismatch(layout: &TypeLayout) -> EncodeError {
    EncodeError::Mismatch {
        expected: layout.signature().repr(),
    }
}

fn write_value(out: &mut Vec<u8>, value: &MoveValue, layout: &TypeLayout) -> Result<(), EncodeError> {
    // Writes into a Vec<u8> cannot fail.
    match (layout, value) {
        (TypeLayout::Bool, MoveValue::Bool(b)) => out.push(u8::from(*b)),
        (TypeLayout::U8, MoveValue::Number(MoveNumber::U8(v))) => out.push(*v),
        (TypeLayout::U16, MoveValue::Number(MoveNumber::U16(v))) => {
            let _ = out.write_u16::<LittleEndian>(*v);
        }
        (TypeLayout::U32, MoveValue::Number(MoveNumber::U32(v))) => {
            let _ = out.write_u32::<LittleEndian>(*v);
        }
        (TypeLayout::U64, MoveValue::Number(MoveNumber::U64(v))) => {
            let _ = out.write_u64::<LittleEndian>(*v);
        }
        (TypeLayout::U128, MoveValue::Number(MoveNumber::U128(v))) => {
            let _ = out.write_u128::<LittleEndian>(*v);
        }
        (TypeLayout::U256, MoveValue::Number(MoveNumber::U256(v))) => {
            let mut bytes = v.to_bytes_le();
            if bytes.len() > 32 {
                return Err(EncodeError::NumberOutOfRange);
            }
            bytes.resize(32, 0);
            out.extend_from_slice(&bytes);
        }
        (TypeLayout::Address, MoveValue::Address(a)) => out.extend_from_slice(a.as_bytes()),
        (TypeLayout::Vector(inner), MoveValue::Vector(items)) => {
            write_uleb128(out, items.len() as u64);
            for item in items {
                write_value(out, item, inner)?;
            }
        }
        (TypeLayout::Struct(s), value) => write_struct(out, value, s, layout)?,
        _ => return Err(mismatch(layout)),
    }
    Ok(())
}

fn write_struct(
    out: &mut Vec<u8>,
    value: &MoveValue,
    s: &StructLayout,
    layout: &TypeLayout,
) -> Result<(), EncodeError> {
    match (s.well_known(), value) {
        (Some(WellKnownStruct::String), MoveValue::String(text)) => {
            write_uleb128(out, text.len() as u64);
            out.extend_from_slice(text.as_bytes());
        }
        (Some(WellKnownStruct::Uid), MoveValue::Uid(a)) => out.extend_from_slice(a.as_bytes()),
        (Some(WellKnownStruct::Option), MoveValue::Option(inner)) => {
            let element = option_element(s).ok_or_else(|| mismatch(layout))?;
            match inner {
                None => write_uleb128(out, 0),
                Some(v) => {
                    write_uleb128(out, 1);
                    write_value(out, v, element)?;
                }
            }
        }
        (_, MoveValue::Struct(st)) => {
            if st.fields.len() != s.fields.len() {
                return Err(EncodeError::FieldCount {
                    type_name: s.type_.base_repr(),
                    expected: s.fields.len(),
                    found: st.fields.len(),
                });
            }
            for (field, (_, v)) in s.fields.iter().zip(&st.fields) {
                write_value(out, v, &field.layout)?;
            }
        }
        _ => return Err(mismatch(layout)),
    }
    Ok(())
}

// =============================================================================
// Object helpers
// =============================================================================

/// Object id stored in the leading `UID` of an object's contents
pub fn object_uid(contents: &[u8]) -> Result<Address, DecodeError> {
    Reader::new(contents).address()
}

/// Balance of a `Coin<T>` (`{ id: UID, balance: Balance<T> { value: u64 } }`)
pub fn coin_balance(contents: &[u8]) -> Result<u64, DecodeError> {
    let mut r = Reader::new(contents);
    r.take(ADDRESS_LENGTH)?;
    Ok(LittleEndian::read_u64(r.take(8)?))
}

/// Contents of a `Coin<T>` with the given id and balance
pub fn coin_contents(id: &Address, balance: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(ADDRESS_LENGTH + 8);
    out.extend_from_slice(id.as_bytes());
    let _ = out.write_u64::<LittleEndian>(balance);
    out
}
