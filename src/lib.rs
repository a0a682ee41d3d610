//! chainql - read-and-simulate query core for object-centric chain state
//!
//! chainql answers structured queries over versioned on-chain objects,
//! packages, checkpoints and transactions, and simulates transactions
//! against the latest checkpoint without committing them.
//!
//! # Quick Start
//!
//! ```ignore
//! use chainql::{Command, Executor, InMemoryStore, Query, QueryNode, ServiceConfig};
//!
//! let executor = Executor::new(Arc::new(InMemoryStore::new()), ServiceConfig::default());
//! let query = Query::new([QueryNode::new("epoch").select([QueryNode::new("epochId")])]);
//! let output = executor.execute(Command::Query { query, checkpoint: None }).await?;
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`], which dispatches
//! [`Command`]s to the query engine, the dry-run simulator or the external
//! commit path. Storage, resolution and simulation live in their own
//! crates; only the executor API is re-exported here.

// Re-export the public API from chainql-executor
pub use chainql_executor::*;
