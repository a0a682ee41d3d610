//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON
//! - **Classified**: Each variant carries the stable code clients switch on

use serde::{Deserialize, Serialize};

/// Command execution errors.
///
/// Field-level data unavailability inside a query is not an error: it shows
/// up in [`QueryResponse::errors`](chainql_engine::QueryResponse) next to
/// partial data. Errors here abort the whole command.
///
/// # Categories
///
/// | Category | Variants | Retry |
/// |----------|----------|-------|
/// | Client | `InvalidInput`, `QueryTooComplex`, `InvalidCursor`, `UnknownType`, `FeatureDisabled`, `PayloadTooLarge`, `Timeout` | never |
/// | Availability | `DataUnavailable` | against another range or node |
/// | Lookup | `NotFound` | never |
/// | System | `ExecutionUnavailable`, `Internal` | later |
///
/// # Example
///
/// ```ignore
/// use chainql_executor::{Command, Error};
///
/// match executor.execute(cmd).await {
///     Ok(output) => { /* handle success */ }
///     Err(Error::FeatureDisabled { feature }) => {
///         println!("'{}' is switched off", feature);
///     }
///     Err(e) => println!("{} ({})", e, e.code()),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Client Errors ====================
    /// Malformed argument, payload or identifier
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong
        reason: String,
    },

    /// Query exceeds configured limits
    #[error("query too complex: {reason}")]
    QueryTooComplex {
        /// Which limit was exceeded
        reason: String,
    },

    /// Cursor is malformed or belongs to another query
    #[error("invalid cursor: {reason}")]
    InvalidCursor {
        /// Why decoding failed
        reason: String,
    },

    /// Referenced type does not exist
    #[error("unknown type: {type_name}")]
    UnknownType {
        /// Type that failed to resolve
        type_name: String,
    },

    /// Feature switched off in the service configuration
    #[error("feature '{feature}' is disabled")]
    FeatureDisabled {
        /// Feature name
        feature: String,
    },

    /// Transaction payload larger than configured maximum
    #[error("payload too large: {size} bytes, maximum is {max}")]
    PayloadTooLarge {
        /// Payload size (Base64 characters)
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Request did not finish in time
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout
        timeout_ms: u64,
    },

    // ==================== Availability ====================
    /// Requested version or checkpoint outside the available range
    #[error("data unavailable: {reason}")]
    DataUnavailable {
        /// What was requested and what is available
        reason: String,
    },

    /// Well-formed reference to something that does not exist
    #[error("not found: {what}")]
    NotFound {
        /// Entity description
        what: String,
    },

    // ==================== System Errors ====================
    /// Execution engine or transaction submitter failed
    #[error("execution unavailable: {reason}")]
    ExecutionUnavailable {
        /// Engine message
        reason: String,
    },

    /// Internal error (storage failure or invariant violation)
    #[error("internal error: {reason}")]
    Internal {
        /// What went wrong
        reason: String,
    },
}

impl Error {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput { .. }
            | Error::UnknownType { .. }
            | Error::FeatureDisabled { .. }
            | Error::PayloadTooLarge { .. } => "BAD_USER_INPUT",
            Error::QueryTooComplex { .. } => "QUERY_TOO_COMPLEX",
            Error::InvalidCursor { .. } => "INVALID_CURSOR",
            Error::Timeout { .. } => "REQUEST_TIMEOUT",
            Error::DataUnavailable { .. } => "DATA_UNAVAILABLE",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::ExecutionUnavailable { .. } | Error::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    /// True for errors caused by the request itself
    pub fn is_client_error(&self) -> bool {
        self.code() != "INTERNAL_SERVER_ERROR"
            && !matches!(self, Error::DataUnavailable { .. } | Error::NotFound { .. })
    }
}
