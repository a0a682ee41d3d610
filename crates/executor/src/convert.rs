//! Error conversion from internal error types.
//!
//! This module provides conversions from [`ChainqlError`] to the executor's
//! client-facing [`Error`] type. Messages are carried over unchanged; only
//! the shape is flattened.

use crate::Error;
use chainql_core::ChainqlError;

impl From<ChainqlError> for Error {
    fn from(err: ChainqlError) -> Self {
        match err {
            // Client errors
            ChainqlError::InvalidInput { message } => Error::InvalidInput { reason: message },

            ChainqlError::QueryTooComplex { message } => Error::QueryTooComplex { reason: message },

            ChainqlError::InvalidCursor(e) => Error::InvalidCursor {
                reason: e.to_string(),
            },

            ChainqlError::InvalidFilter(e) => Error::InvalidInput {
                reason: format!("invalid filter: {}", e),
            },

            ChainqlError::UnknownType { type_name } => Error::UnknownType { type_name },

            ChainqlError::MalformedSignature { message } => Error::InvalidInput {
                reason: format!("malformed type signature: {}", message),
            },

            ChainqlError::FeatureDisabled { feature } => Error::FeatureDisabled { feature },

            ChainqlError::Timeout { timeout_ms } => Error::Timeout { timeout_ms },

            // Availability
            ChainqlError::DataUnavailable { message } => Error::DataUnavailable { reason: message },

            ChainqlError::NotFound { what } => Error::NotFound { what },

            // System errors
            ChainqlError::Execution { message } => Error::ExecutionUnavailable { reason: message },

            ChainqlError::Decode(e) => Error::Internal {
                reason: format!("corrupt stored data: {}", e),
            },

            ChainqlError::Storage { message } => Error::Internal {
                reason: format!("storage: {}", message),
            },

            ChainqlError::Internal { message } => Error::Internal { reason: message },
        }
    }
}

/// Convert a [`ChainqlResult`](chainql_core::ChainqlResult) to an executor Result.
pub fn convert_result<T>(result: chainql_core::ChainqlResult<T>) -> crate::Result<T> {
    result.map_err(Error::from)
}
