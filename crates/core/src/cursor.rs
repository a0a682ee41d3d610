//! Cursor codec
//!
//! Cursors are opaque pagination tokens. Each one carries a position in a
//! connection's natural ordering plus the fingerprint of the query
//! configuration (connection, filter, ordering key) that produced it.
//! Decoding under any other fingerprint fails; an old cursor is never
//! silently reinterpreted against a changed filter.
//!
//! ## Wire format
//!
//! ```text
//! base64url_nopad( msgpack( { v: u8, fp: [u8; 32], pos: msgpack(P) } ) )
//! ```
//!
//! Page size is deliberately not part of the fingerprint: the same cursor is
//! valid with any `first`/`last`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use thiserror::Error;

/// Current wire version
pub const CURSOR_VERSION: u8 = 1;

/// Upper bound on the encoded cursor length
pub const MAX_CURSOR_LENGTH: usize = 4 * 1024;

/// Cursor decode/encode failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// Cursor string is empty
    #[error("cursor is empty")]
    Empty,

    /// Cursor string exceeds the maximum length
    #[error("cursor too long: {len} bytes (max {max})")]
    TooLong {
        /// Encoded length
        len: usize,
        /// Maximum accepted
        max: usize,
    },

    /// Not URL-safe Base64
    #[error("cursor is not valid base64")]
    InvalidEncoding,

    /// Base64 decoded but the payload is malformed
    #[error("malformed cursor payload: {0}")]
    MalformedPayload(String),

    /// Payload written by an incompatible codec version
    #[error("unsupported cursor version {0}")]
    UnsupportedVersion(u8),

    /// Cursor was produced by a different query configuration
    #[error("cursor does not belong to this query (filter or ordering changed)")]
    FingerprintMismatch,

    /// Position could not be serialized
    #[error("failed to encode cursor: {0}")]
    Encode(String),
}

// =============================================================================
// Fingerprints
// =============================================================================

/// SHA-256 of a connection's ordering-relevant configuration
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryFingerprint([u8; 32]);

impl QueryFingerprint {
    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for QueryFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueryFingerprint({})", hex::encode(&self.0[..8]))
    }
}

/// Builds a [`QueryFingerprint`] from a tagged, length-prefixed byte stream
///
/// Every write is self-delimiting, so distinct configurations never collide
/// through concatenation.
pub struct FingerprintBuilder {
    hasher: Sha256,
}

impl FingerprintBuilder {
    /// Start a fingerprint for the named connection (e.g. `Query.objects`)
    pub fn new(connection: &str) -> Self {
        let mut builder = FingerprintBuilder {
            hasher: Sha256::new(),
        };
        builder.write_tag(0x01);
        builder.write_str(connection);
        builder
    }

    /// One-byte discriminant
    pub fn write_tag(&mut self, tag: u8) -> &mut Self {
        self.hasher.update([tag]);
        self
    }

    /// Length-prefixed UTF-8 string
    pub fn write_str(&mut self, value: &str) -> &mut Self {
        self.write_bytes(value.as_bytes())
    }

    /// Length-prefixed bytes
    pub fn write_bytes(&mut self, value: &[u8]) -> &mut Self {
        self.write_len(value.len());
        self.hasher.update(value);
        self
    }

    /// Fixed-width integer
    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(value.to_be_bytes());
        self
    }

    /// Collection length
    pub fn write_len(&mut self, len: usize) -> &mut Self {
        let len = u32::try_from(len).unwrap_or(u32::MAX);
        self.hasher.update(len.to_be_bytes());
        self
    }

    /// Optional value marker followed by the value
    pub fn write_opt_str(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            None => self.write_tag(0x00),
            Some(v) => self.write_tag(0x01).write_str(v),
        }
    }

    /// Finish hashing
    pub fn finish(self) -> QueryFingerprint {
        QueryFingerprint(self.hasher.finalize().into())
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// Opaque pagination token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a client-supplied cursor string
    pub fn new(value: impl Into<String>) -> Self {
        Cursor(value.into())
    }

    /// Encoded string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the encoded string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize)]
struct CursorWire {
    v: u8,
    fp: [u8; 32],
    pos: Vec<u8>,
}

/// Encode `position` as a cursor bound to `fingerprint`
pub fn encode<P: Serialize>(position: &P, fingerprint: &QueryFingerprint) -> Result<Cursor, CursorError> {
    let pos = rmp_serde::to_vec(position).map_err(|e| CursorError::Encode(e.to_string()))?;
    let wire = CursorWire {
        v: CURSOR_VERSION,
        fp: fingerprint.0,
        pos,
    };
    let bytes = rmp_serde::to_vec(&wire).map_err(|e| CursorError::Encode(e.to_string()))?;
    Ok(Cursor(URL_SAFE_NO_PAD.encode(bytes)))
}

/// Decode a cursor, requiring it to carry `fingerprint`
pub fn decode<P: DeserializeOwned>(
    cursor: &Cursor,
    fingerprint: &QueryFingerprint,
) -> Result<P, CursorError> {
    let text = cursor.as_str();
    if text.is_empty() {
        return Err(CursorError::Empty);
    }
    if text.len() > MAX_CURSOR_LENGTH {
        return Err(CursorError::TooLong {
            len: text.len(),
            max: MAX_CURSOR_LENGTH,
        });
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(text)
        .map_err(|_| CursorError::InvalidEncoding)?;
    let wire: CursorWire =
        rmp_serde::from_slice(&bytes).map_err(|e| CursorError::MalformedPayload(e.to_string()))?;

    // Version first, so future formats fail as unsupported rather than malformed.
    if wire.v != CURSOR_VERSION {
        return Err(CursorError::UnsupportedVersion(wire.v));
    }
    if wire.fp != fingerprint.0 {
        return Err(CursorError::FingerprintMismatch);
    }

    rmp_serde::from_slice(&wire.pos).map_err(|e| CursorError::MalformedPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fp(connection: &str, filter: &str) -> QueryFingerprint {
        let mut b = FingerprintBuilder::new(connection);
        b.write_str(filter);
        b.finish()
    }

    #[test]
    fn test_round_trip() {
        let f = fp("Query.objects", "owner=0x1");
        let cursor = encode(&(7u64, "name".to_string()), &f).unwrap();
        let back: (u64, String) = decode(&cursor, &f).unwrap();
        assert_eq!(back, (7, "name".to_string()));
        assert!(!cursor.as_str().contains('='));
    }

    #[test]
    fn test_rejects_other_fingerprint() {
        let cursor = encode(&1u64, &fp("Query.objects", "a")).unwrap();
        assert_eq!(
            decode::<u64>(&cursor, &fp("Query.objects", "b")),
            Err(CursorError::FingerprintMismatch)
        );
        assert_eq!(
            decode::<u64>(&cursor, &fp("Query.events", "a")),
            Err(CursorError::FingerprintMismatch)
        );
    }

    #[test]
    fn test_rejects_garbage() {
        let f = fp("c", "");
        assert_eq!(decode::<u64>(&Cursor::new(""), &f), Err(CursorError::Empty));
        assert_eq!(
            decode::<u64>(&Cursor::new("not base64!"), &f),
            Err(CursorError::InvalidEncoding)
        );
        let junk = URL_SAFE_NO_PAD.encode([0xc1, 0x00, 0x13]);
        assert!(matches!(
            decode::<u64>(&Cursor::new(junk), &f),
            Err(CursorError::MalformedPayload(_))
        ));
        let long = "A".repeat(MAX_CURSOR_LENGTH + 1);
        assert!(matches!(
            decode::<u64>(&Cursor::new(long), &f),
            Err(CursorError::TooLong { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let f = fp("c", "");
        let wire = CursorWire {
            v: 9,
            fp: *f.as_bytes(),
            pos: rmp_serde::to_vec(&1u64).unwrap(),
        };
        let cursor = Cursor::new(URL_SAFE_NO_PAD.encode(rmp_serde::to_vec(&wire).unwrap()));
        assert_eq!(decode::<u64>(&cursor, &f), Err(CursorError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_position_type_mismatch_is_malformed() {
        let f = fp("c", "");
        let cursor = encode(&"text", &f).unwrap();
        assert!(matches!(
            decode::<u64>(&cursor, &f),
            Err(CursorError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_fingerprint_is_self_delimiting() {
        let mut a = FingerprintBuilder::new("c");
        a.write_str("ab").write_str("c");
        let mut b = FingerprintBuilder::new("c");
        b.write_str("a").write_str("bc");
        assert_ne!(a.finish(), b.finish());
    }

    proptest! {
        #[test]
        fn prop_cursor_round_trips(pos in any::<(u64, u64)>(), filter in ".{0,16}") {
            let f = fp("Query.objects", &filter);
            let cursor = encode(&pos, &f).unwrap();
            prop_assert_eq!(decode::<(u64, u64)>(&cursor, &f).unwrap(), pos);
        }

        #[test]
        fn prop_cross_fingerprint_rejected(
            pos in any::<u64>(),
            a in "[a-z]{0,8}",
            b in "[a-z]{0,8}",
        ) {
            prop_assume!(a != b);
            let cursor = encode(&pos, &fp("Query.objects", &a)).unwrap();
            prop_assert_eq!(
                decode::<u64>(&cursor, &fp("Query.objects", &b)),
                Err(CursorError::FingerprintMismatch)
            );
        }
    }
}
