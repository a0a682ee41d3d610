//! Execution engine contract
//!
//! The engine that runs Move code lives outside this crate. The simulator
//! hands it a fully loaded request and receives raw writes back; turning
//! those into effects is the simulator's job.

use async_trait::async_trait;
use chainql_core::{
    ChainqlError, Digest, Event, ExecutionStatus, GasCostSummary, Object, ObjectId,
    SequenceNumber, TransactionData,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Failure of the engine itself, as opposed to the transaction it ran
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Engine cannot be reached or refused the request
    #[error("execution engine unavailable: {0}")]
    Unavailable(String),

    /// Engine returned output that violates its contract
    #[error("execution engine invariant violated: {0}")]
    Invariant(String),
}

impl From<EngineError> for ChainqlError {
    fn from(e: EngineError) -> Self {
        ChainqlError::Execution {
            message: e.to_string(),
        }
    }
}

/// Everything the engine needs to run one transaction
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Transaction being run
    pub transaction: TransactionData,
    /// Digest of `transaction`
    pub digest: Digest,
    /// Input objects (including gas coins) at their input versions
    pub inputs: BTreeMap<ObjectId, Arc<Object>>,
    /// Gas coins, first one is charged
    pub gas_coins: Vec<ObjectId>,
    /// Version every written object must carry
    pub lamport_version: SequenceNumber,
    /// Epoch the transaction executes in
    pub epoch: u64,
    /// Ownership and visibility checks were bypassed
    pub skip_checks: bool,
}

impl ExecutionRequest {
    /// Input object by id
    pub fn input(&self, id: &ObjectId) -> Option<&Arc<Object>> {
        self.inputs.get(id)
    }
}

/// Writes produced by the engine
///
/// On failure only gas-coin writes may appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEffects {
    /// Outcome
    pub status: ExecutionStatus,
    /// Gas charged
    pub gas_used: GasCostSummary,
    /// New versions of mutated and created objects
    pub written: Vec<Object>,
    /// Objects removed by the transaction
    pub deleted: Vec<ObjectId>,
    /// Events, in emission order
    pub events: Vec<Event>,
}

/// External engine that runs transactions against provided inputs
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Run `request`; never persists anything
    async fn execute(&self, request: ExecutionRequest) -> Result<RawEffects, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainql_core::ErrorClass;

    #[test]
    fn test_engine_errors_are_internal() {
        let err: ChainqlError = EngineError::Unavailable("connection refused".into()).into();
        assert_eq!(err.class(), ErrorClass::Internal);
        assert!(err.to_string().contains("connection refused"));
    }
}
