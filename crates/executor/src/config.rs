//! Service configuration via `chainql.toml`
//!
//! Every field has a default, so an empty or missing file yields a working
//! service. The resolved configuration is readable by clients through the
//! `serviceConfig` field and [`Command::ServiceConfig`](crate::Command).

use chainql_core::{ChainqlError, ChainqlResult};
use chainql_engine::{EngineConfig, Feature, Limits};
use chainql_simulator::DryRunConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Conventional config file name
pub const CONFIG_FILE_NAME: &str = "chainql.toml";

/// Service configuration loaded from `chainql.toml`.
///
/// # Example
///
/// ```toml
/// enabled_features = ["coins", "dry-run"]
///
/// [limits]
/// max_query_depth = 10
/// max_page_size = 100
///
/// [dry_run]
/// max_gas_budget = 1000000000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Optional features switched on
    #[serde(default = "Feature::defaults")]
    pub enabled_features: BTreeSet<Feature>,
    /// Query and resource limits
    #[serde(default)]
    pub limits: Limits,
    /// Dry-run defaults
    #[serde(default)]
    pub dry_run: DryRunConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            enabled_features: Feature::defaults(),
            limits: Limits::default(),
            dry_run: DryRunConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> ChainqlResult<Self> {
        let config: ServiceConfig = toml::from_str(content)
            .map_err(|e| ChainqlError::invalid_input(format!("Failed to parse service config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read config from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> ChainqlResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChainqlError::internal(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ChainqlError::InvalidInput { message } => {
                ChainqlError::invalid_input(format!("{} ({})", message, path.display()))
            }
            other => other,
        })
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> ChainqlResult<()> {
        let limits = &self.limits;
        if limits.default_page_size == 0 || limits.max_page_size == 0 {
            return Err(ChainqlError::invalid_input("page sizes must be greater than zero"));
        }
        if limits.default_page_size > limits.max_page_size {
            return Err(ChainqlError::invalid_input(format!(
                "default_page_size {} exceeds max_page_size {}",
                limits.default_page_size, limits.max_page_size
            )));
        }
        if limits.max_concurrent_nodes == 0 {
            return Err(ChainqlError::invalid_input("max_concurrent_nodes must be greater than zero"));
        }
        if limits.request_timeout_ms == 0 {
            return Err(ChainqlError::invalid_input("request_timeout_ms must be greater than zero"));
        }
        Ok(())
    }

    /// The part of the configuration the query engine sees
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            limits: self.limits.clone(),
            features: self.enabled_features.clone(),
        }
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> ChainqlResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ChainqlError::internal(format!("Failed to serialize config: {}", e)))
    }
}
