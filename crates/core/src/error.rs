//! Error types for chainql
//!
//! [`ChainqlError`] is the single internal error type. Every variant belongs
//! to exactly one [`ErrorClass`], which decides how the query engine
//! propagates it:
//!
//! | Class | Propagation |
//! |-------|-------------|
//! | `Client` | abort the request, report with a description |
//! | `DataUnavailable` | field becomes `null`, error recorded with its path |
//! | `NotFound` | field becomes `null`, nothing recorded |
//! | `Internal` | abort the request, no partial data |
//!
//! A simulated transaction that would abort is not an error at all; it is
//! reported as `ExecutionStatus::Failure` data.

use crate::address::{AddressParseError, DigestParseError};
use crate::cursor::CursorError;
use crate::decode::{DecodeError, EncodeError};
use crate::filter::FilterError;
use crate::layout::LayoutError;
use crate::signature::{SignatureError, SignatureParseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for chainql operations
pub type ChainqlResult<T> = std::result::Result<T, ChainqlError>;

/// Propagation class of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Malformed or disallowed request; never retried automatically
    Client,
    /// Data exists but is outside the available range; retry elsewhere may work
    DataUnavailable,
    /// Well-formed reference to something that does not exist
    NotFound,
    /// Storage or execution engine failure; aborts the request
    Internal,
}

/// Internal error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainqlError {
    // =========================================================================
    // Client errors
    // =========================================================================
    /// Malformed argument, payload or identifier
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What was wrong
        message: String,
    },

    /// Query exceeds configured depth, node-count or page-size limits
    #[error("query too complex: {message}")]
    QueryTooComplex {
        /// Which limit was exceeded
        message: String,
    },

    /// Cursor is malformed or belongs to another query configuration
    #[error("invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    /// Filter arity or compound-filter misuse
    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    /// Referenced package, module or struct does not exist
    #[error("unknown type: {type_name}")]
    UnknownType {
        /// Type that failed to resolve
        type_name: String,
    },

    /// Signature is structurally invalid (arity, open parameters, limits)
    #[error("malformed type signature: {message}")]
    MalformedSignature {
        /// What was wrong
        message: String,
    },

    /// Request uses a feature that is disabled in this service
    #[error("feature '{feature}' is disabled")]
    FeatureDisabled {
        /// Feature name
        feature: String,
    },

    /// Request did not finish within the configured timeout
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout
        timeout_ms: u64,
    },

    // =========================================================================
    // Data availability
    // =========================================================================
    /// Requested version or checkpoint has been pruned or is not yet available
    #[error("data unavailable: {message}")]
    DataUnavailable {
        /// What was requested and what range is available
        message: String,
    },

    /// Well-formed reference to a nonexistent entity
    #[error("not found: {what}")]
    NotFound {
        /// Entity description
        what: String,
    },

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// Stored bytes do not match their layout
    #[error("corrupt stored data: {0}")]
    Decode(#[from] DecodeError),

    /// Storage adapter failure
    #[error("storage error: {message}")]
    Storage {
        /// Adapter message
        message: String,
    },

    /// Execution engine unavailable or violated its contract
    #[error("execution engine error: {message}")]
    Execution {
        /// Engine message
        message: String,
    },

    /// Any other invariant violation
    #[error("internal error: {message}")]
    Internal {
        /// What went wrong
        message: String,
    },
}

impl ChainqlError {
    /// Shorthand for [`ChainqlError::InvalidInput`]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ChainqlError::InvalidInput {
            message: message.into(),
        }
    }

    /// Shorthand for [`ChainqlError::QueryTooComplex`]
    pub fn too_complex(message: impl Into<String>) -> Self {
        ChainqlError::QueryTooComplex {
            message: message.into(),
        }
    }

    /// Shorthand for [`ChainqlError::DataUnavailable`]
    pub fn unavailable(message: impl Into<String>) -> Self {
        ChainqlError::DataUnavailable {
            message: message.into(),
        }
    }

    /// Shorthand for [`ChainqlError::NotFound`]
    pub fn not_found(what: impl Into<String>) -> Self {
        ChainqlError::NotFound { what: what.into() }
    }

    /// Shorthand for [`ChainqlError::Storage`]
    pub fn storage(message: impl Into<String>) -> Self {
        ChainqlError::Storage {
            message: message.into(),
        }
    }

    /// Shorthand for [`ChainqlError::Internal`]
    pub fn internal(message: impl Into<String>) -> Self {
        ChainqlError::Internal {
            message: message.into(),
        }
    }

    /// Propagation class
    pub fn class(&self) -> ErrorClass {
        match self {
            ChainqlError::InvalidInput { .. }
            | ChainqlError::QueryTooComplex { .. }
            | ChainqlError::InvalidCursor(_)
            | ChainqlError::InvalidFilter(_)
            | ChainqlError::UnknownType { .. }
            | ChainqlError::MalformedSignature { .. }
            | ChainqlError::FeatureDisabled { .. }
            | ChainqlError::Timeout { .. } => ErrorClass::Client,
            ChainqlError::DataUnavailable { .. } => ErrorClass::DataUnavailable,
            ChainqlError::NotFound { .. } => ErrorClass::NotFound,
            ChainqlError::Decode(_)
            | ChainqlError::Storage { .. }
            | ChainqlError::Execution { .. }
            | ChainqlError::Internal { .. } => ErrorClass::Internal,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ChainqlError::QueryTooComplex { .. } => "QUERY_TOO_COMPLEX",
            ChainqlError::InvalidCursor(_) => "INVALID_CURSOR",
            ChainqlError::Timeout { .. } => "REQUEST_TIMEOUT",
            ChainqlError::DataUnavailable { .. } => "DATA_UNAVAILABLE",
            ChainqlError::NotFound { .. } => "NOT_FOUND",
            e => match e.class() {
                ErrorClass::Client => "BAD_USER_INPUT",
                _ => "INTERNAL_SERVER_ERROR",
            },
        }
    }

    /// True if the whole request must abort
    pub fn is_fatal(&self) -> bool {
        matches!(self.class(), ErrorClass::Client | ErrorClass::Internal)
    }
}

// =============================================================================
// Leaf error conversions
// =============================================================================

impl From<AddressParseError> for ChainqlError {
    fn from(e: AddressParseError) -> Self {
        ChainqlError::invalid_input(e.to_string())
    }
}

impl From<DigestParseError> for ChainqlError {
    fn from(e: DigestParseError) -> Self {
        ChainqlError::invalid_input(e.to_string())
    }
}

impl From<SignatureParseError> for ChainqlError {
    fn from(e: SignatureParseError) -> Self {
        ChainqlError::invalid_input(e.to_string())
    }
}

impl From<SignatureError> for ChainqlError {
    fn from(e: SignatureError) -> Self {
        ChainqlError::MalformedSignature {
            message: e.to_string(),
        }
    }
}

impl From<LayoutError> for ChainqlError {
    fn from(e: LayoutError) -> Self {
        match e {
            LayoutError::UnknownType { type_name } => ChainqlError::UnknownType { type_name },
            other => ChainqlError::MalformedSignature {
                message: other.to_string(),
            },
        }
    }
}

impl From<EncodeError> for ChainqlError {
    fn from(e: EncodeError) -> Self {
        ChainqlError::internal(e.to_string())
    }
}

impl From<bincode::Error> for ChainqlError {
    fn from(e: bincode::Error) -> Self {
        ChainqlError::invalid_input(format!("malformed binary payload: {}", e))
    }
}
