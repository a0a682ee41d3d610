//! The Executor - single entry point to the chainql service.
//!
//! The Executor is a stateless dispatcher: it checks feature gates and
//! payload limits, decodes Base64 payloads, and routes each command to the
//! query resolver, the dry-run simulator or the transaction submitter.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chainql_core::{TransactionBlock, TransactionData, TransactionKind};
use chainql_engine::{validate_rooted, Feature, NodeType, QueryNode, QueryResponse, Resolver};
use chainql_simulator::{
    DryRunRequest, DryRunResult, ExecutionEngine, Simulator, TransactionMetadata,
};
use chainql_storage::{ObjectStore, OverlayStore};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::output::{DryRunOutput, ExecutedOutput};
use crate::submit::TransactionSubmitter;
use crate::{Command, Error, Output, Result};

/// The command executor - single entry point to the chainql service.
///
/// The Executor holds the store, the resolved configuration and the optional
/// external collaborators. It keeps no per-request state: every command pins
/// its own snapshot.
///
/// # Example
///
/// ```ignore
/// use chainql_executor::{Command, Executor, ServiceConfig};
///
/// let executor = Executor::new(store, ServiceConfig::default())
///     .with_engine(engine)
///     .with_submitter(submitter);
///
/// let output = executor.execute(Command::Ping).await?;
/// ```
pub struct Executor {
    store: Arc<dyn ObjectStore>,
    config: Arc<ServiceConfig>,
    resolver: Resolver,
    simulator: Option<Simulator>,
    submitter: Option<Arc<dyn TransactionSubmitter>>,
}

impl Executor {
    /// Create an executor over `store`.
    ///
    /// Without an engine or submitter, `DryRun` and `ExecuteTransaction`
    /// fail with [`Error::ExecutionUnavailable`].
    pub fn new(store: Arc<dyn ObjectStore>, config: ServiceConfig) -> Self {
        let resolver = Resolver::new(Arc::clone(&store), config.engine_config());
        Self {
            store,
            config: Arc::new(config),
            resolver,
            simulator: None,
            submitter: None,
        }
    }

    /// Attach the execution engine used for dry runs.
    pub fn with_engine(mut self, engine: Arc<dyn ExecutionEngine>) -> Self {
        let simulator = Simulator::new(Arc::clone(&self.store), engine, self.config.dry_run.clone())
            .with_timeout(self.request_timeout());
        self.simulator = Some(simulator);
        self
    }

    /// Attach the commit path used by `ExecuteTransaction`.
    pub fn with_submitter(mut self, submitter: Arc<dyn TransactionSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// Resolved configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Query resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Execute a single command.
    ///
    /// Each call runs inside its own `request` span carrying a fresh id.
    pub async fn execute(&self, cmd: Command) -> Result<Output> {
        let kind = cmd.name();
        let span = info_span!(target: "chainql::executor", "request", request_id = %Uuid::new_v4(), kind);
        async move {
            let result = self.dispatch(cmd).await;
            match &result {
                Ok(_) => debug!(target: "chainql::executor", "Command complete"),
                Err(e) if e.code() == "INTERNAL_SERVER_ERROR" => {
                    error!(target: "chainql::executor", error = %e, "Command failed")
                }
                Err(e) => info!(target: "chainql::executor", code = e.code(), error = %e, "Command rejected"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Execute multiple commands sequentially.
    ///
    /// Returns all results in the same order as the input commands.
    /// Execution continues even if some commands fail.
    pub async fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        let mut results = Vec::with_capacity(cmds.len());
        for cmd in cmds {
            results.push(self.execute(cmd).await);
        }
        results
    }

    async fn dispatch(&self, cmd: Command) -> Result<Output> {
        match cmd {
            Command::Ping => Ok(Output::Pong {
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
            Command::ServiceConfig => Ok(Output::ServiceConfig(self.config.as_ref().clone())),
            Command::Query { query, checkpoint } => {
                Ok(Output::Data(self.resolver.execute(&query, checkpoint).await?))
            }
            Command::DryRun {
                tx_bytes,
                tx_meta,
                skip_checks,
                selection,
            } => self.dry_run(&tx_bytes, tx_meta, skip_checks, &selection).await,
            Command::ExecuteTransaction {
                tx_bytes,
                signatures,
                selection,
            } => self.execute_transaction(&tx_bytes, &signatures, &selection).await,
        }
    }

    async fn dry_run(
        &self,
        tx_bytes: &str,
        tx_meta: Option<TransactionMetadata>,
        skip_checks: bool,
        selection: &[QueryNode],
    ) -> Result<Output> {
        self.require(Feature::DryRun)?;
        let bytes = self.decode_payload(tx_bytes)?;
        let request = match tx_meta {
            Some(meta) => DryRunRequest::Kind {
                kind: TransactionKind::from_bytes(&bytes)?,
                meta,
            },
            None => DryRunRequest::Full(TransactionData::from_bytes(&bytes)?),
        };
        self.check_selection(selection)?;
        let simulator = self.simulator.as_ref().ok_or_else(|| Error::ExecutionUnavailable {
            reason: "no execution engine configured".into(),
        })?;

        let DryRunResult {
            transaction,
            written,
            deleted,
            error,
        } = simulator.dry_run(request, skip_checks).await?;
        let digest = transaction.digest.to_string();

        let transaction = if selection.is_empty() {
            None
        } else {
            let overlay = OverlayStore::new(Arc::clone(&self.store))
                .with_objects(written)
                .with_deleted(deleted)
                .with_transaction(transaction.clone());
            Some(self.resolve_on(overlay, transaction, selection).await?)
        };
        Ok(Output::DryRun(DryRunOutput {
            digest,
            error,
            transaction,
        }))
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &str,
        signatures: &[String],
        selection: &[QueryNode],
    ) -> Result<Output> {
        self.require(Feature::TransactionExecution)?;
        let bytes = self.decode_payload(tx_bytes)?;
        let data = TransactionData::from_bytes(&bytes)?;
        if signatures.is_empty() {
            return Err(Error::InvalidInput {
                reason: "at least one signature is required".into(),
            });
        }
        let signatures = signatures
            .iter()
            .map(|s| {
                BASE64.decode(s).map_err(|e| Error::InvalidInput {
                    reason: format!("signature is not valid Base64: {}", e),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.check_selection(selection)?;
        let submitter = self.submitter.as_ref().ok_or_else(|| Error::ExecutionUnavailable {
            reason: "no transaction submitter configured".into(),
        })?;

        let timeout = self.request_timeout();
        let block = match tokio::time::timeout(timeout, submitter.submit(data, signatures)).await {
            Ok(result) => result?,
            Err(_) => {
                let timeout_ms = self.config.limits.request_timeout_ms;
                warn!(target: "chainql::executor", timeout_ms, "Transaction submission timed out");
                return Err(Error::Timeout { timeout_ms });
            }
        };

        let digest = block.digest.to_string();
        let errors: Vec<String> = block.effects.status.error().map(str::to_string).into_iter().collect();
        info!(target: "chainql::executor", %digest, success = errors.is_empty(), "Transaction finalized");

        let transaction = if selection.is_empty() {
            None
        } else {
            let overlay = OverlayStore::new(Arc::clone(&self.store)).with_transaction(block.clone());
            Some(self.resolve_on(overlay, block, selection).await?)
        };
        Ok(Output::Executed(ExecutedOutput {
            digest,
            errors,
            transaction,
        }))
    }

    /// Resolve `selection` on `block` as seen through `overlay`
    async fn resolve_on(
        &self,
        overlay: OverlayStore,
        block: TransactionBlock,
        selection: &[QueryNode],
    ) -> Result<QueryResponse> {
        let resolver = self.resolver.with_store(Arc::new(overlay));
        Ok(resolver.resolve_transaction(Arc::new(block), selection).await?)
    }

    fn require(&self, feature: Feature) -> Result<()> {
        if !self.config.enabled_features.contains(&feature) {
            return Err(Error::FeatureDisabled {
                feature: feature.to_string(),
            });
        }
        Ok(())
    }

    /// Size-check then Base64-decode a transaction payload
    fn decode_payload(&self, encoded: &str) -> Result<Vec<u8>> {
        let max = self.config.limits.max_transaction_payload_size;
        if encoded.len() > max {
            return Err(Error::PayloadTooLarge {
                size: encoded.len(),
                max,
            });
        }
        BASE64.decode(encoded).map_err(|e| Error::InvalidInput {
            reason: format!("transaction bytes are not valid Base64: {}", e),
        })
    }

    /// Reject a bad selection before doing any execution work
    fn check_selection(&self, selection: &[QueryNode]) -> Result<()> {
        if selection.is_empty() {
            return Ok(());
        }
        Ok(validate_rooted(NodeType::TransactionBlock, selection, self.resolver.config())?)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.config.limits.request_timeout_ms)
    }
}
