//! Dry-run transaction simulation for chainql
//!
//! Runs a transaction against the latest checkpoint without committing it:
//!
//! - **request**: dry-run inputs, defaults and results
//! - **checks**: ownership and gas checks run before execution
//! - **engine**: the contract with the external execution engine
//! - **effects**: effects derived from the engine's raw writes
//! - **simulator**: the driver tying these together
//!
//! With the `testing` feature, [`testing::ScriptedEngine`] provides an
//! in-memory engine for coin and object movement.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checks;
pub mod effects;
pub mod engine;
pub mod request;
pub mod simulator;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use checks::CheckFailure;
pub use engine::{EngineError, ExecutionEngine, ExecutionRequest, RawEffects};
pub use request::{DryRunConfig, DryRunRequest, DryRunResult, TransactionMetadata};
pub use simulator::Simulator;
