//! Input checks run before execution
//!
//! A failed check is a property of the transaction, not of the service: the
//! dry run still returns a block, with the reason in its failure status.

use crate::engine::ExecutionRequest;
use chainql_core::transaction::ObjectArg;
use chainql_core::{Digest, Owner};
use std::fmt;

/// Why a transaction would be rejected before execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckFailure {
    /// Owned input is not owned by the sender
    NotOwnedBySender {
        /// Offending object
        object: String,
    },
    /// Input passed with the wrong ownership kind
    WrongOwnershipKind {
        /// Offending object
        object: String,
        /// How it is actually owned
        actual: &'static str,
    },
    /// Supplied digest does not match the input version
    DigestMismatch {
        /// Offending object
        object: String,
    },
    /// Gas coin is not a gas coin, or not owned by the payer
    InvalidGasCoin {
        /// Offending object
        object: String,
    },
    /// Gas coins cannot cover the budget
    InsufficientGas {
        /// Sum of gas coin balances
        balance: u64,
        /// Requested budget
        budget: u64,
    },
    /// Budget exceeds the configured maximum
    BudgetTooHigh {
        /// Requested budget
        budget: u64,
        /// Configured maximum
        max: u64,
    },
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckFailure::NotOwnedBySender { object } => {
                write!(f, "object {} is not owned by the sender", object)
            }
            CheckFailure::WrongOwnershipKind { object, actual } => {
                write!(f, "object {} cannot be used this way: it is {}", object, actual)
            }
            CheckFailure::DigestMismatch { object } => {
                write!(f, "object {} digest does not match its version", object)
            }
            CheckFailure::InvalidGasCoin { object } => {
                write!(f, "object {} is not a gas coin owned by the gas payer", object)
            }
            CheckFailure::InsufficientGas { balance, budget } => {
                write!(f, "gas balance {} is below the budget {}", balance, budget)
            }
            CheckFailure::BudgetTooHigh { budget, max } => {
                write!(f, "gas budget {} exceeds the maximum {}", budget, max)
            }
        }
    }
}

/// Budget bound; enforced even when other checks are skipped
pub fn check_budget(budget: u64, max: u64) -> Result<(), CheckFailure> {
    if budget > max {
        return Err(CheckFailure::BudgetTooHigh { budget, max });
    }
    Ok(())
}

/// Ownership of object inputs and gas payment
pub fn check_inputs(request: &ExecutionRequest) -> Result<(), CheckFailure> {
    let data = &request.transaction;
    for arg in data.kind.input_objects() {
        let Some(object) = request.input(&arg.id()) else {
            continue;
        };
        let name = object.id.to_string();
        match arg {
            ObjectArg::ImmOrOwned(r) => {
                if r.digest != Digest::default() && r.digest != object.digest {
                    return Err(CheckFailure::DigestMismatch { object: name });
                }
                match object.owner {
                    Owner::AddressOwner(a) if a == data.sender => {}
                    Owner::Immutable => {}
                    Owner::AddressOwner(_) => return Err(CheckFailure::NotOwnedBySender { object: name }),
                    other => {
                        return Err(CheckFailure::WrongOwnershipKind {
                            object: name,
                            actual: other.kind(),
                        })
                    }
                }
            }
            ObjectArg::Shared {
                initial_shared_version,
                ..
            } => match object.owner {
                Owner::Shared {
                    initial_shared_version: actual,
                } if actual == *initial_shared_version => {}
                other => {
                    return Err(CheckFailure::WrongOwnershipKind {
                        object: name,
                        actual: other.kind(),
                    })
                }
            },
            ObjectArg::Receiving(_) => {
                if matches!(object.owner, Owner::Shared { .. } | Owner::Immutable) {
                    return Err(CheckFailure::WrongOwnershipKind {
                        object: name,
                        actual: object.owner.kind(),
                    });
                }
            }
        }
    }

    let payer = data.gas_data.owner;
    let mut balance: u64 = 0;
    for id in &request.gas_coins {
        let Some(coin) = request.input(id) else {
            continue;
        };
        let is_gas = coin.type_().map_or(false, |t| t.is_gas_coin());
        if !is_gas || !coin.owner.is_owned_by(&payer) {
            return Err(CheckFailure::InvalidGasCoin {
                object: coin.id.to_string(),
            });
        }
        if let Some(Ok(b)) = coin.coin_balance() {
            balance = balance.saturating_add(b);
        }
    }
    if balance < data.gas_data.budget {
        return Err(CheckFailure::InsufficientGas {
            balance,
            budget: data.gas_data.budget,
        });
    }
    Ok(())
}
