//! Dry-run requests and results

use chainql_core::{
    Address, Object, ObjectId, ObjectRef, TransactionBlock, TransactionData, TransactionKind,
};
use serde::{Deserialize, Serialize};

fn default_reference_gas_price_fallback() -> u64 {
    1_000
}

fn default_max_gas_budget() -> u64 {
    50_000_000_000
}

fn default_synthetic_gas_balance() -> u64 {
    50_000_000_000
}

/// Dry-run defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DryRunConfig {
    /// Gas price used when no epoch is known
    #[serde(default = "default_reference_gas_price_fallback")]
    pub reference_gas_price_fallback: u64,

    /// Largest accepted gas budget, and the budget used when none is given
    #[serde(default = "default_max_gas_budget")]
    pub max_gas_budget: u64,

    /// Balance of the gas coin synthesized when none is supplied
    #[serde(default = "default_synthetic_gas_balance")]
    pub synthetic_gas_balance: u64,
}

impl Default for DryRunConfig {
    fn default() -> Self {
        DryRunConfig {
            reference_gas_price_fallback: default_reference_gas_price_fallback(),
            max_gas_budget: default_max_gas_budget(),
            synthetic_gas_balance: default_synthetic_gas_balance(),
        }
    }
}

/// Optional context for a bare transaction kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMetadata {
    /// Sender; zero address if absent
    #[serde(default)]
    pub sender: Option<Address>,
    /// Gas price; the epoch's reference price if absent
    #[serde(default)]
    pub gas_price: Option<u64>,
    /// Gas coins; one synthetic coin if absent
    #[serde(default)]
    pub gas_objects: Option<Vec<ObjectRef>>,
    /// Gas budget; the configured maximum if absent
    #[serde(default)]
    pub gas_budget: Option<u64>,
    /// Gas payer; the sender if absent
    #[serde(default)]
    pub gas_sponsor: Option<Address>,
}

/// What to simulate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DryRunRequest {
    /// Complete transaction data
    Full(TransactionData),
    /// Transaction kind, completed from metadata and defaults
    Kind {
        /// What the transaction does
        kind: TransactionKind,
        /// Caller-supplied context
        meta: TransactionMetadata,
    },
}

impl DryRunRequest {
    /// Canonical bytes identifying the request, used to derive synthetic ids
    pub fn seed(&self) -> Vec<u8> {
        match self {
            DryRunRequest::Full(data) => data.to_bytes(),
            DryRunRequest::Kind { kind, .. } => kind.to_bytes(),
        }
    }
}

/// Outcome of a dry run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunResult {
    /// Simulated block; never persisted
    pub transaction: TransactionBlock,
    /// Object versions the transaction would write
    pub written: Vec<Object>,
    /// Objects the transaction would delete
    pub deleted: Vec<ObjectId>,
    /// Why the transaction would fail, if it would
    pub error: Option<String>,
}

impl DryRunResult {
    /// True if the transaction would succeed
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
