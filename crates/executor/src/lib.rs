//! # chainql Executor
//!
//! The service surface of chainql: a read-and-simulate query layer over
//! blockchain object state.
//!
//! This is the only crate users need to import. It provides:
//! - [`Executor`] - The dispatcher every transport binding calls
//! - [`Command`]/[`Output`] - The serializable instruction set
//! - [`Error`] - Serializable, classified errors
//! - [`ServiceConfig`] - Limits, feature flags and dry-run defaults
//!
//! ## Quick Start
//!
//! ```text
//! use chainql_executor::{Command, Executor, ServiceConfig};
//!
//! let executor = Executor::new(store, ServiceConfig::load(path)?);
//! let output = executor.execute(Command::Query { query, checkpoint: None }).await?;
//! ```
//!
//! ## Commands
//!
//! | Command | Output | Gate |
//! |---------|--------|------|
//! | `Ping` | `Pong` | |
//! | `ServiceConfig` | `ServiceConfig` | |
//! | `Query` | `Data` | per-field features |
//! | `DryRun` | `DryRun` | `dry-run` |
//! | `ExecuteTransaction` | `Executed` | `transaction-execution` |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod command;
pub mod config;
mod convert;
mod error;
mod executor;
mod output;
mod submit;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use command::Command;
pub use config::ServiceConfig;
pub use convert::convert_result;
pub use error::Error;
pub use executor::Executor;
pub use output::{DryRunOutput, ExecutedOutput, Output};
pub use submit::TransactionSubmitter;

// Re-export the building blocks so users don't need the member crates directly
pub use chainql_core::{
    Address, ChainqlError, ChainqlResult, Digest, ErrorClass, Object, ObjectId, Owner,
    SequenceNumber, TransactionBlock, TransactionData, TransactionKind, TypeSignature,
};
pub use chainql_engine::{Feature, Limits, Query, QueryNode, QueryResponse};
pub use chainql_simulator::{DryRunConfig, ExecutionEngine, TransactionMetadata};
pub use chainql_storage::{InMemoryStore, ObjectStore};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
