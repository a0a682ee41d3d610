//! Dry-run driver
//!
//! Pins the latest checkpoint, completes the transaction, loads its inputs,
//! runs the pre-checks and hands the result to the execution engine. Nothing
//! is ever written back to the store.

use crate::checks::{check_budget, check_inputs};
use crate::effects::derive_effects;
use crate::engine::{ExecutionEngine, ExecutionRequest};
use crate::request::{DryRunConfig, DryRunRequest, DryRunResult, TransactionMetadata};
use chainql_core::decode::coin_contents;
use chainql_core::transaction::{GasData, ObjectArg};
use chainql_core::{
    Address, ChainqlError, ChainqlResult, Digest, ExecutionStatus, GasCostSummary, Object,
    ObjectId, Owner, SequenceNumber, TransactionBlock, TransactionData, TransactionEffects,
    TypeSignature,
};
use chainql_storage::{ObjectStore, StoreSnapshot};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Runs transactions without committing them
pub struct Simulator {
    store: Arc<dyn ObjectStore>,
    engine: Arc<dyn ExecutionEngine>,
    config: DryRunConfig,
    timeout: Option<Duration>,
}

impl Simulator {
    /// Simulator over `store`, executing with `engine`
    pub fn new(store: Arc<dyn ObjectStore>, engine: Arc<dyn ExecutionEngine>, config: DryRunConfig) -> Self {
        Simulator {
            store,
            engine,
            config,
            timeout: None,
        }
    }

    /// Bound each engine call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Dry-run defaults in force
    pub fn config(&self) -> &DryRunConfig {
        &self.config
    }

    /// Simulate `request` against the latest checkpoint
    ///
    /// Transaction-level problems (bad ownership, missing inputs, aborts)
    /// come back as a failed block. Errors are reserved for the service:
    /// pruned data, an unreachable engine, or a timeout.
    pub async fn dry_run(&self, request: DryRunRequest, skip_checks: bool) -> ChainqlResult<DryRunResult> {
        let snapshot = StoreSnapshot::pin(self.store.clone(), None).await?;
        let epoch = snapshot.epoch(None).await?;
        let reference_gas_price = epoch
            .as_ref()
            .map(|e| e.reference_gas_price)
            .unwrap_or(self.config.reference_gas_price_fallback);
        let epoch_id = epoch.map(|e| e.epoch_id).unwrap_or(0);

        let seed = request.seed();
        let (data, synthetic_gas) = self.complete(request, reference_gas_price, &seed);
        let digest = data.digest();
        debug!(
            target: "chainql::simulator",
            %digest,
            kind = data.kind.label(),
            checkpoint = snapshot.checkpoint(),
            "Dry run started"
        );

        if let Err(failure) = check_budget(data.gas_data.budget, self.config.max_gas_budget) {
            return Ok(rejected(data, digest, epoch_id, failure.to_string()));
        }

        let synthetic_id = synthetic_gas.as_ref().map(|gas| gas.id);
        let mut inputs = match load_inputs(&snapshot, &data, synthetic_id).await? {
            Ok(inputs) => inputs,
            Err(message) => return Ok(rejected(data, digest, epoch_id, message)),
        };
        if let Some(gas) = synthetic_gas {
            inputs.insert(gas.id, Arc::new(gas));
        }

        let lamport_version = SequenceNumber::lamport(inputs.values().map(|o| o.version));
        let execution = ExecutionRequest {
            gas_coins: data.gas_data.payment.iter().map(|r| r.object_id).collect(),
            transaction: data,
            digest,
            inputs,
            lamport_version,
            epoch: epoch_id,
            skip_checks,
        };

        if !skip_checks {
            if let Err(failure) = check_inputs(&execution) {
                debug!(target: "chainql::simulator", %digest, %failure, "Pre-check failed");
                return Ok(rejected(execution.transaction, digest, epoch_id, failure.to_string()));
            }
        }

        let run = self.engine.execute(execution.clone());
        let raw = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(target: "chainql::simulator", %digest, timeout_ms = limit.as_millis() as u64, "Dry run timed out");
                    return Err(ChainqlError::Timeout {
                        timeout_ms: limit.as_millis() as u64,
                    });
                }
            },
            None => run.await,
        }?;
        let effects = derive_effects(&execution, &raw)?;

        let error = effects.status.error().map(str::to_string);
        info!(
            target: "chainql::simulator",
            %digest,
            success = error.is_none(),
            written = raw.written.len(),
            deleted = raw.deleted.len(),
            "Dry run complete"
        );
        Ok(DryRunResult {
            transaction: block(execution.transaction, digest, effects),
            written: raw.written,
            deleted: raw.deleted,
            error,
        })
    }

    /// Fill in sender and gas for a bare kind
    fn complete(&self, request: DryRunRequest, reference_gas_price: u64, seed: &[u8]) -> (TransactionData, Option<Object>) {
        let (kind, meta) = match request {
            DryRunRequest::Full(data) => return (data, None),
            DryRunRequest::Kind { kind, meta } => (kind, meta),
        };
        let TransactionMetadata {
            sender,
            gas_price,
            gas_objects,
            gas_budget,
            gas_sponsor,
        } = meta;
        let sender = sender.unwrap_or(Address::ZERO);
        let owner = gas_sponsor.unwrap_or(sender);

        let (payment, synthetic) = match gas_objects {
            Some(refs) => (refs, None),
            None => {
                let id = Address::derive(seed, 0);
                let coin = Object::new_move(
                    id,
                    SequenceNumber::MIN,
                    Owner::AddressOwner(owner),
                    TypeSignature::gas_coin(),
                    coin_contents(&id, self.config.synthetic_gas_balance),
                    Digest::default(),
                );
                (vec![coin.object_ref()], Some(coin))
            }
        };

        let data = TransactionData {
            kind,
            sender,
            gas_data: GasData {
                payment,
                owner,
                price: gas_price.unwrap_or(reference_gas_price),
                budget: gas_budget.unwrap_or(self.config.max_gas_budget),
            },
            expiration: None,
        };
        (data, synthetic)
    }
}

/// Load every object input except `synthetic`; the inner error names the
/// first missing one
async fn load_inputs(
    snapshot: &StoreSnapshot,
    data: &TransactionData,
    synthetic: Option<ObjectId>,
) -> ChainqlResult<Result<BTreeMap<ObjectId, Arc<Object>>, String>> {
    let mut requested: Vec<(ObjectId, Option<SequenceNumber>)> = Vec::new();
    for arg in data.kind.input_objects() {
        match arg {
            ObjectArg::ImmOrOwned(r) | ObjectArg::Receiving(r) => requested.push((r.object_id, Some(r.version))),
            ObjectArg::Shared { id, .. } => requested.push((*id, None)),
        }
    }
    for payment in &data.gas_data.payment {
        requested.push((payment.object_id, Some(payment.version)));
    }

    let mut inputs = BTreeMap::new();
    for (id, version) in requested {
        if inputs.contains_key(&id) || synthetic == Some(id) {
            continue;
        }
        match snapshot.object(&id, version).await? {
            Some(object) => {
                inputs.insert(id, object);
            }
            None => {
                let message = match version {
                    Some(v) => format!("input object {} version {} not found", id, v),
                    None => format!("input object {} not found", id),
                };
                return Ok(Err(message));
            }
        }
    }
    Ok(Ok(inputs))
}

/// Failed block for a transaction rejected before execution
fn rejected(data: TransactionData, digest: Digest, epoch: u64, error: String) -> DryRunResult {
    let lamport_version = SequenceNumber::lamport(data.gas_data.payment.iter().map(|r| r.version));
    let effects = TransactionEffects {
        transaction_digest: digest,
        status: ExecutionStatus::Failure {
            error: error.clone(),
            command: None,
        },
        executed_epoch: epoch,
        gas_used: GasCostSummary::default(),
        gas_object: None,
        lamport_version,
        object_changes: Vec::new(),
        balance_changes: Vec::new(),
        events: Vec::new(),
        dependencies: Vec::new(),
    };
    DryRunResult {
        transaction: block(data, digest, effects),
        written: Vec::new(),
        deleted: Vec::new(),
        error: Some(error),
    }
}

fn block(data: TransactionData, digest: Digest, effects: TransactionEffects) -> TransactionBlock {
    TransactionBlock {
        digest,
        data,
        signatures: Vec::new(),
        effects,
        checkpoint: None,
        tx_sequence: None,
        timestamp_ms: None,
    }
}
