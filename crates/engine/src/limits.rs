//! Query limits and optional features
//!
//! Every limit is enforced before resolution touches storage, so a rejected
//! query never returns partial data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Optional service capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    /// Coin and balance fields
    Coins,
    /// Objects owned by other objects
    DynamicFields,
    /// Transaction simulation
    DryRun,
    /// Submitting signed transactions
    TransactionExecution,
    /// Push notifications (recognized, not served)
    Subscriptions,
}

impl Feature {
    /// Every feature, in canonical order
    pub const ALL: [Feature; 5] = [
        Feature::Coins,
        Feature::DynamicFields,
        Feature::DryRun,
        Feature::TransactionExecution,
        Feature::Subscriptions,
    ];

    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Coins => "coins",
            Feature::DynamicFields => "dynamic-fields",
            Feature::DryRun => "dry-run",
            Feature::TransactionExecution => "transaction-execution",
            Feature::Subscriptions => "subscriptions",
        }
    }

    /// Features enabled when nothing is configured
    pub fn defaults() -> BTreeSet<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| *f != Feature::Subscriptions)
            .collect()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s) || format!("{:?}", f).eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown feature '{}'", s))
    }
}

fn default_max_query_depth() -> usize {
    20
}

fn default_max_query_nodes() -> usize {
    300
}

fn default_page_size() -> usize {
    20
}

fn default_max_page_size() -> usize {
    50
}

fn default_max_concurrent_nodes() -> usize {
    32
}

fn default_request_timeout_ms() -> u64 {
    40_000
}

fn default_max_transaction_payload_size() -> usize {
    174_763
}

fn default_max_type_argument_depth() -> usize {
    16
}

fn default_max_type_nodes() -> usize {
    256
}

/// Query and resource limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Deepest allowed selection nesting
    #[serde(default = "default_max_query_depth")]
    pub max_query_depth: usize,
    /// Most selection nodes in one query
    #[serde(default = "default_max_query_nodes")]
    pub max_query_nodes: usize,
    /// Page size when neither `first` nor `last` is given
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// Largest allowed `first`/`last`
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    /// Concurrent storage reads per request
    #[serde(default = "default_max_concurrent_nodes")]
    pub max_concurrent_nodes: usize,
    /// Wall-clock budget per request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Largest Base64 transaction payload accepted
    #[serde(default = "default_max_transaction_payload_size")]
    pub max_transaction_payload_size: usize,
    /// Deepest type-argument nesting in a type signature
    #[serde(default = "default_max_type_argument_depth")]
    pub max_type_argument_depth: usize,
    /// Most nodes in one type signature
    #[serde(default = "default_max_type_nodes")]
    pub max_type_nodes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_query_depth: default_max_query_depth(),
            max_query_nodes: default_max_query_nodes(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_concurrent_nodes: default_max_concurrent_nodes(),
            request_timeout_ms: default_request_timeout_ms(),
            max_transaction_payload_size: default_max_transaction_payload_size(),
            max_type_argument_depth: default_max_type_argument_depth(),
            max_type_nodes: default_max_type_nodes(),
        }
    }
}

/// Everything the resolver needs to know about the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Limits
    pub limits: Limits,
    /// Enabled features
    pub features: BTreeSet<Feature>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            limits: Limits::default(),
            features: Feature::defaults(),
        }
    }
}

impl EngineConfig {
    /// True if `feature` is enabled
    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }
}
