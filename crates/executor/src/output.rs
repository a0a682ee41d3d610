//! Output enum for command execution results.
//!
//! Every command produces exactly one output variant. A simulated or
//! submitted transaction that fails is still a successful command: the
//! failure travels as data inside the output.

use chainql_engine::QueryResponse;
use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;

/// Result of a dry run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DryRunOutput {
    /// Digest the transaction would have (Base58)
    pub digest: String,
    /// Why the transaction would fail; `None` if it would succeed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Requested fields of the simulated transaction block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<QueryResponse>,
}

/// Result of a submitted transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedOutput {
    /// Digest of the finalized transaction (Base58)
    pub digest: String,
    /// Execution errors; empty if the transaction succeeded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Requested fields of the finalized transaction block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<QueryResponse>,
}

/// Successful command execution results.
///
/// Each [`Command`](crate::Command) variant maps to exactly one `Output` variant.
///
/// # Example
///
/// ```text
/// use chainql_executor::{Command, Output};
///
/// match executor.execute(Command::Query { query, checkpoint: None }).await? {
///     Output::Data(response) => println!("{}", response.data),
///     _ => unreachable!("Query always returns Data"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// Liveness reply
    Pong {
        /// Service version
        version: String,
    },

    /// Resolved service configuration
    ServiceConfig(ServiceConfig),

    /// Query result, possibly with field-level errors
    Data(QueryResponse),

    /// Dry-run result
    DryRun(DryRunOutput),

    /// Submitted transaction result
    Executed(ExecutedOutput),
}
