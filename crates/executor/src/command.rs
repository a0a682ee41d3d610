//! Command enum defining every chainql service operation.
//!
//! Commands are the "instruction set" of the service. Transport bindings
//! deserialize a request into a `Command`, hand it to the
//! [`Executor`](crate::Executor) and serialize the resulting
//! [`Output`](crate::Output) or [`Error`](crate::Error).
//!
//! Commands are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Can be converted to/from JSON for any transport
//! - **Pure data**: Binary payloads travel as Base64 strings

use chainql_engine::{Query, QueryNode};
use chainql_simulator::TransactionMetadata;
use serde::{Deserialize, Serialize};

/// A command is a self-contained, serializable operation.
///
/// # Example
///
/// ```ignore
/// use chainql_executor::Command;
/// use chainql_engine::{Query, QueryNode};
///
/// let cmd = Command::Query {
///     query: Query::new([QueryNode::new("serviceConfig").select([QueryNode::new("maxPageSize")])]),
///     checkpoint: None,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    /// Liveness check.
    /// Returns: `Output::Pong`
    Ping,

    /// Read the resolved service configuration.
    /// Returns: `Output::ServiceConfig`
    ServiceConfig,

    /// Resolve a query graph.
    /// Returns: `Output::Data`
    Query {
        /// Selection to resolve
        query: Query,
        /// Checkpoint to resolve at; latest if absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checkpoint: Option<u64>,
    },

    /// Simulate a transaction without committing it.
    /// Returns: `Output::DryRun`
    DryRun {
        /// Base64 transaction data, or a Base64 transaction kind when
        /// `tx_meta` is present
        tx_bytes: String,
        /// Sender and gas context for a bare kind
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tx_meta: Option<TransactionMetadata>,
        /// Bypass ownership and gas checks
        #[serde(default)]
        skip_checks: bool,
        /// Fields to resolve on the simulated transaction block
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        selection: Vec<QueryNode>,
    },

    /// Submit a signed transaction and wait for finality.
    /// Returns: `Output::Executed`
    ExecuteTransaction {
        /// Base64 transaction data
        tx_bytes: String,
        /// Base64 signatures
        signatures: Vec<String>,
        /// Fields to resolve on the finalized transaction block
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        selection: Vec<QueryNode>,
    },
}

impl Command {
    /// Variant name, used to label request spans
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "Ping",
            Command::ServiceConfig => "ServiceConfig",
            Command::Query { .. } => "Query",
            Command::DryRun { .. } => "DryRun",
            Command::ExecuteTransaction { .. } => "ExecuteTransaction",
        }
    }
}
