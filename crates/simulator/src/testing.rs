//! Scripted reference engine
//!
//! Understands coin and object movement (`TransferObjects`, `SplitCoins`,
//! `MergeCoins`) and treats Move calls as no-ops, except a call to a function
//! named `abort`, which fails the transaction at that command. Enough to
//! drive the simulator and the service surface without a Move VM.

use crate::engine::{EngineError, ExecutionEngine, ExecutionRequest, RawEffects};
use async_trait::async_trait;
use chainql_core::decode::{coin_balance, coin_contents};
use chainql_core::transaction::{Argument, CallArg, TransactionCommand};
use chainql_core::{
    Address, ExecutionStatus, GasCostSummary, Object, ObjectId, Owner, TransactionKind,
};
use std::collections::BTreeMap;
use std::time::Duration;

/// Computation units charged per command
pub const UNITS_PER_COMMAND: u64 = 1_000;

/// How the engine behaves apart from executing
#[derive(Debug, Clone, Default)]
enum Mode {
    #[default]
    Execute,
    Unavailable,
    Delay(Duration),
}

/// Engine that interprets a small command subset in memory
#[derive(Debug, Clone, Default)]
pub struct ScriptedEngine {
    mode: Mode,
}

impl ScriptedEngine {
    /// Engine that executes
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that always reports itself unavailable
    pub fn unavailable() -> Self {
        ScriptedEngine {
            mode: Mode::Unavailable,
        }
    }

    /// Engine that sleeps before executing
    pub fn delayed(delay: Duration) -> Self {
        ScriptedEngine {
            mode: Mode::Delay(delay),
        }
    }
}

#[async_trait]
impl ExecutionEngine for ScriptedEngine {
    async fn execute(&self, request: ExecutionRequest) -> Result<RawEffects, EngineError> {
        match &self.mode {
            Mode::Unavailable => return Err(EngineError::Unavailable("scripted engine offline".into())),
            Mode::Delay(d) => tokio::time::sleep(*d).await,
            Mode::Execute => {}
        }
        Ok(Run::new(&request).execute())
    }
}

/// A value produced or referenced by a command
#[derive(Debug, Clone)]
enum Slot {
    Objects(Vec<ObjectId>),
    Pure(Vec<u8>),
}

/// One execution in progress
struct Run<'a> {
    request: &'a ExecutionRequest,
    /// Current state of every live object the transaction can see
    objects: BTreeMap<ObjectId, Object>,
    deleted: Vec<ObjectId>,
    results: Vec<Vec<Slot>>,
    created: u64,
}

impl<'a> Run<'a> {
    fn new(request: &'a ExecutionRequest) -> Self {
        Run {
            request,
            objects: request
                .inputs
                .iter()
                .map(|(id, o)| (*id, o.as_ref().clone()))
                .collect(),
            deleted: Vec::new(),
            results: Vec::new(),
            created: 0,
        }
    }

    fn execute(mut self) -> RawEffects {
        let data = &self.request.transaction;
        let (status, commands) = match &data.kind {
            TransactionKind::Programmable(pt) => {
                let status = self.run_commands(&pt.inputs, &pt.commands);
                (status, pt.commands.len() as u64)
            }
            TransactionKind::ConsensusCommitPrologue { .. } => (
                ExecutionStatus::Failure {
                    error: "system transactions cannot be simulated".into(),
                    command: None,
                },
                0,
            ),
        };

        let computation_cost = data.gas_data.price.saturating_mul(UNITS_PER_COMMAND * commands.max(1));
        let (status, gas_used) = if computation_cost > data.gas_data.budget {
            (
                ExecutionStatus::Failure {
                    error: format!(
                        "insufficient gas: cost {} exceeds budget {}",
                        computation_cost, data.gas_data.budget
                    ),
                    command: None,
                },
                GasCostSummary {
                    computation_cost: data.gas_data.budget,
                    ..Default::default()
                },
            )
        } else {
            (
                status,
                GasCostSummary {
                    computation_cost,
                    ..Default::default()
                },
            )
        };

        self.finish(status, gas_used)
    }

    fn finish(mut self, status: ExecutionStatus, gas_used: GasCostSummary) -> RawEffects {
        let request = self.request;
        let lamport = request.lamport_version;
        let digest = request.digest;

        if !status.is_success() {
            // Only gas is charged on failure
            self.objects = request
                .inputs
                .iter()
                .map(|(id, o)| (*id, o.as_ref().clone()))
                .collect();
            self.deleted.clear();
        }
        if let Some(gas_id) = request.gas_coins.first() {
            if let Some(gas) = self.objects.get_mut(gas_id) {
                let balance = gas
                    .as_move()
                    .and_then(|m| coin_balance(&m.contents).ok())
                    .unwrap_or(0);
                let charged = balance.saturating_sub(gas_used.net_gas_usage().max(0) as u64);
                set_balance(gas, charged);
            }
        }

        let mut written = Vec::new();
        for (id, object) in self.objects {
            let changed = match request.input(&id) {
                Some(input) => input.as_ref() != &object || request.gas_coins.first() == Some(&id),
                None => true,
            };
            if changed {
                written.push(object.mutated(lamport, object.owner, None, digest));
            }
        }

        RawEffects {
            status,
            gas_used,
            written,
            deleted: self.deleted,
            events: Vec::new(),
        }
    }

    fn run_commands(&mut self, inputs: &[CallArg], commands: &[TransactionCommand]) -> ExecutionStatus {
        for (index, command) in commands.iter().enumerate() {
            match self.run_command(inputs, command) {
                Ok(result) => self.results.push(result),
                Err(error) => {
                    return ExecutionStatus::Failure {
                        error,
                        command: Some(index as u16),
                    }
                }
            }
        }
        ExecutionStatus::Success
    }

    fn run_command(&mut self, inputs: &[CallArg], command: &TransactionCommand) -> Result<Vec<Slot>, String> {
        match command {
            TransactionCommand::TransferObjects(objects, recipient) => {
                let recipient = self.address(inputs, recipient)?;
                for arg in objects {
                    for id in self.objects_of(inputs, arg)? {
                        let object = self.live(&id)?;
                        if matches!(object.owner, Owner::Shared { .. } | Owner::Immutable) {
                            return Err(format!("object {} cannot be transferred", id));
                        }
                        object.owner = Owner::AddressOwner(recipient);
                    }
                }
                Ok(vec![])
            }
            TransactionCommand::SplitCoins(coin, amounts) => {
                let source = self.single_object(inputs, coin)?;
                let mut split = Vec::with_capacity(amounts.len());
                for amount in amounts {
                    let amount = self.u64(inputs, amount)?;
                    let coin = self.live(&source)?;
                    let balance = read_balance(coin)?;
                    let remaining = balance
                        .checked_sub(amount)
                        .ok_or_else(|| format!("coin {} balance {} is below {}", source, balance, amount))?;
                    set_balance(coin, remaining);
                    let template = coin.clone();
                    split.push(self.create_coin(&template, amount));
                }
                Ok(split.into_iter().map(|id| Slot::Objects(vec![id])).collect())
            }
            TransactionCommand::MergeCoins(target, sources) => {
                let target = self.single_object(inputs, target)?;
                let mut total = read_balance(self.live(&target)?)?;
                for arg in sources {
                    for id in self.objects_of(inputs, arg)? {
                        if id == target {
                            return Err(format!("coin {} merged into itself", id));
                        }
                        let balance = read_balance(self.live(&id)?)?;
                        total = total
                            .checked_add(balance)
                            .ok_or_else(|| "coin balance overflow".to_string())?;
                        self.objects.remove(&id);
                        if self.request.input(&id).is_some() {
                            self.deleted.push(id);
                        }
                    }
                }
                set_balance(self.live(&target)?, total);
                Ok(vec![])
            }
            TransactionCommand::MoveCall(call) => {
                if call.function == "abort" {
                    return Err(format!("MoveAbort in {}::{}", call.module, call.function));
                }
                Ok(vec![])
            }
            other => Err(format!("{} is not supported by the scripted engine", other.name())),
        }
    }

    fn slots(&self, inputs: &[CallArg], arg: &Argument) -> Result<Vec<Slot>, String> {
        match arg {
            Argument::GasCoin => {
                let gas = self
                    .request
                    .gas_coins
                    .first()
                    .ok_or_else(|| "transaction has no gas coin".to_string())?;
                Ok(vec![Slot::Objects(vec![*gas])])
            }
            Argument::Input(i) => match inputs.get(*i as usize) {
                Some(CallArg::Pure(bytes)) => Ok(vec![Slot::Pure(bytes.clone())]),
                Some(CallArg::Object(o)) => Ok(vec![Slot::Objects(vec![o.id()])]),
                None => Err(format!("input {} out of range", i)),
            },
            Argument::Result(c) => self
                .results
                .get(*c as usize)
                .cloned()
                .ok_or_else(|| format!("result {} not yet available", c)),
            Argument::NestedResult(c, n) => self
                .results
                .get(*c as usize)
                .and_then(|r| r.get(*n as usize))
                .map(|slot| vec![slot.clone()])
                .ok_or_else(|| format!("result {}.{} not available", c, n)),
        }
    }

    fn objects_of(&self, inputs: &[CallArg], arg: &Argument) -> Result<Vec<ObjectId>, String> {
        let mut ids = Vec::new();
        for slot in self.slots(inputs, arg)? {
            match slot {
                Slot::Objects(found) => ids.extend(found),
                Slot::Pure(_) => return Err("expected an object, found a pure value".into()),
            }
        }
        Ok(ids)
    }

    fn single_object(&self, inputs: &[CallArg], arg: &Argument) -> Result<ObjectId, String> {
        match self.objects_of(inputs, arg)?.as_slice() {
            [id] => Ok(*id),
            _ => Err("expected exactly one object".into()),
        }
    }

    fn pure(&self, inputs: &[CallArg], arg: &Argument) -> Result<Vec<u8>, String> {
        match self.slots(inputs, arg)?.as_slice() {
            [Slot::Pure(bytes)] => Ok(bytes.clone()),
            _ => Err("expected a pure value".into()),
        }
    }

    fn address(&self, inputs: &[CallArg], arg: &Argument) -> Result<Address, String> {
        let bytes = self.pure(inputs, arg)?;
        Address::from_bytes(&bytes).ok_or_else(|| "malformed address argument".to_string())
    }

    fn u64(&self, inputs: &[CallArg], arg: &Argument) -> Result<u64, String> {
        let bytes = self.pure(inputs, arg)?;
        let array: [u8; 8] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| "malformed u64 argument".to_string())?;
        Ok(u64::from_le_bytes(array))
    }

    fn live(&mut self, id: &ObjectId) -> Result<&mut Object, String> {
        self.objects
            .get_mut(id)
            .ok_or_else(|| format!("object {} is not available", id))
    }

    fn create_coin(&mut self, template: &Object, balance: u64) -> ObjectId {
        let id = Address::derive(self.request.digest.as_bytes(), self.created);
        self.created += 1;
        let type_ = template.type_().cloned().unwrap_or_else(chainql_core::TypeSignature::gas_coin);
        let coin = Object::new_move(
            id,
            self.request.lamport_version,
            Owner::AddressOwner(self.request.transaction.sender),
            type_,
            coin_contents(&id, balance),
            self.request.digest,
        );
        self.objects.insert(id, coin);
        id
    }
}

fn read_balance(object: &Object) -> Result<u64, String> {
    match object.coin_balance() {
        Some(Ok(balance)) => Ok(balance),
        Some(Err(e)) => Err(e.to_string()),
        None => Err(format!("object {} is not a coin", object.id)),
    }
}

fn set_balance(object: &mut Object, balance: u64) {
    let id = object.id;
    if let chainql_core::ObjectData::Move(m) = &mut object.data {
        m.contents = coin_contents(&id, balance);
    }
}
