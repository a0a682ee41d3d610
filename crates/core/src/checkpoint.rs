//! Checkpoints and epochs

use crate::address::Digest;
use serde::{Deserialize, Serialize};

/// A finalized, sequenced batch of transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Position in the checkpoint sequence
    pub sequence_number: u64,
    /// Checkpoint digest
    pub digest: Digest,
    /// Epoch this checkpoint belongs to
    pub epoch: u64,
    /// Wall-clock time the checkpoint was finalized (ms since Unix epoch)
    pub timestamp_ms: u64,
    /// Digest of the preceding checkpoint
    pub previous_digest: Option<Digest>,
    /// Transactions executed up to and including this checkpoint
    pub network_total_transactions: u64,
    /// Transactions in this checkpoint, in execution order
    pub transactions: Vec<Digest>,
}

/// A period with a fixed validator set and reference gas price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    /// Epoch number
    pub epoch_id: u64,
    /// Gas price used when a transaction does not set one
    pub reference_gas_price: u64,
    /// Protocol version in force
    pub protocol_version: u64,
    /// Start time (ms since Unix epoch)
    pub start_timestamp_ms: u64,
    /// End time, once the epoch has closed
    pub end_timestamp_ms: Option<u64>,
    /// First checkpoint of the epoch
    pub first_checkpoint: u64,
    /// Last checkpoint, once the epoch has closed
    pub last_checkpoint: Option<u64>,
}

impl Epoch {
    /// True if `checkpoint` falls inside this epoch
    pub fn contains_checkpoint(&self, checkpoint: u64) -> bool {
        checkpoint >= self.first_checkpoint
            && self.last_checkpoint.map_or(true, |last| checkpoint <= last)
    }
}
