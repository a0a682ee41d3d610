//! Query resolution against the fixture chain
//!
//! - objects: point lookups, historical versions, typed projections, decoded contents
//! - owners: owned objects, coins, balances and object filters
//! - chain: checkpoints, epochs and transactions
//! - errors: request rejection versus field-level errors

#[path = "../common/mod.rs"]
mod common;

mod chain;
mod errors;
mod objects;
mod owners;
