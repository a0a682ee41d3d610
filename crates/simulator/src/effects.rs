//! Effects derivation
//!
//! Translates raw engine writes into the object-change, balance-change and
//! event shapes committed transactions carry.

use crate::engine::{EngineError, ExecutionRequest, RawEffects};
use chainql_core::{
    Address, BalanceChange, Digest, IdOperation, Object, ObjectChange, ObjectId, Owner,
    TransactionEffects, TypeSignature,
};
use std::collections::{BTreeMap, BTreeSet};

/// Build effects for `raw`, checking it against the request
pub fn derive_effects(request: &ExecutionRequest, raw: &RawEffects) -> Result<TransactionEffects, EngineError> {
    let written: BTreeMap<ObjectId, &Object> = raw.written.iter().map(|o| (o.id, o)).collect();
    if written.len() != raw.written.len() {
        return Err(EngineError::Invariant("object written twice".into()));
    }
    for object in &raw.written {
        if object.version != request.lamport_version {
            return Err(EngineError::Invariant(format!(
                "object {} written at version {}, expected {}",
                object.id, object.version, request.lamport_version
            )));
        }
    }
    for id in &raw.deleted {
        if written.contains_key(id) {
            return Err(EngineError::Invariant(format!("object {} both written and deleted", id)));
        }
        if request.input(id).is_none() {
            return Err(EngineError::Invariant(format!("deleted object {} was not an input", id)));
        }
    }

    let mut object_changes = Vec::new();
    let touched: BTreeSet<ObjectId> = written.keys().chain(raw.deleted.iter()).copied().collect();
    for id in touched {
        let input = request.input(&id);
        let output = written.get(&id).copied();
        let id_operation = match (input, output) {
            (None, Some(_)) => IdOperation::Created,
            (Some(_), None) => IdOperation::Deleted,
            _ => IdOperation::None,
        };
        object_changes.push(ObjectChange {
            object_id: id,
            input_state: input.map(|o| o.object_ref()),
            output_state: output.map(Object::object_ref),
            input_owner: input.map(|o| o.owner),
            output_owner: output.map(|o| o.owner),
            id_operation,
        });
    }

    let gas_object = request
        .gas_coins
        .first()
        .and_then(|id| written.get(id))
        .map(|o| o.object_ref());

    let dependencies: BTreeSet<Digest> = request
        .inputs
        .values()
        .map(|o| o.previous_transaction)
        .filter(|d| *d != Digest::default())
        .collect();

    Ok(TransactionEffects {
        transaction_digest: request.digest,
        status: raw.status.clone(),
        executed_epoch: request.epoch,
        gas_used: raw.gas_used,
        gas_object,
        lamport_version: request.lamport_version,
        object_changes,
        balance_changes: balance_changes(request, raw),
        events: raw.events.clone(),
        dependencies: dependencies.into_iter().collect(),
    })
}

/// Net coin movement per (owner, coin type), zero entries omitted
fn balance_changes(request: &ExecutionRequest, raw: &RawEffects) -> Vec<BalanceChange> {
    let mut net: BTreeMap<(Address, String), (TypeSignature, i128)> = BTreeMap::new();
    let mut add = |object: &Object, sign: i128| {
        let (Owner::AddressOwner(owner), Some(coin_type), Some(Ok(balance))) = (
            object.owner,
            object.type_().and_then(TypeSignature::coin_type_argument),
            object.coin_balance(),
        ) else {
            return;
        };
        let entry = net
            .entry((owner, coin_type.repr()))
            .or_insert_with(|| (coin_type.clone(), 0));
        entry.1 += sign * i128::from(balance);
    };

    for object in &raw.written {
        if let Some(input) = request.input(&object.id) {
            add(input, -1);
        }
        add(object, 1);
    }
    for id in &raw.deleted {
        if let Some(input) = request.input(id) {
            add(input, -1);
        }
    }

    net.into_iter()
        .filter(|(_, (_, amount))| *amount != 0)
        .map(|((owner, _), (coin_type, amount))| BalanceChange {
            owner: Owner::AddressOwner(owner),
            coin_type,
            amount,
        })
        .collect()
}
