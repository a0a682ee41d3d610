//! Connection filters
//!
//! Every filter is either a set of scalar constraints combined with AND, or
//! exactly one compound key:
//!
//! ```json
//! { "owner": "0x1", "type": "0x2::coin::Coin" }
//! { "any": [ { "owner": "0x1" }, { "owner": "0x2" } ] }
//! { "not": { "type": "0x2::coin" } }
//! ```
//!
//! Mixing a compound key with anything else at the same level is rejected.
//!
//! Filters are pure predicates. They never change a connection's ordering:
//! each connection pages over one natural key, so `not` (or any other shape)
//! simply skips entries and cursors stay valid for the same filter.

use crate::address::{Address, Digest, ObjectId};
use crate::cursor::FingerprintBuilder;
use crate::object::Object;
use crate::signature::TypeSignature;
use crate::transaction::{IndexedEvent, TransactionBlock};
use crate::types::{ObjectKey, SequenceNumber};
use serde_json::{Map, Value as JsonValue};
use std::fmt::Debug;
use thiserror::Error;

/// Deepest allowed nesting of compound filters
pub const MAX_FILTER_DEPTH: usize = 8;

const COMPOUND_KEYS: [&str; 3] = ["any", "all", "not"];

/// Filter parse failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Filter (or sub-filter) is not a JSON object
    #[error("filter must be an object")]
    NotAnObject,

    /// Compound key shares a level with other keys
    #[error("compound filter '{compound}' must be the only key at its level, found: {keys}")]
    CompoundMixedWithScalar {
        /// The compound key found
        compound: String,
        /// All keys at that level
        keys: String,
    },

    /// Compound key has the wrong number or shape of operands
    #[error("'{op}' expects {expected}")]
    Arity {
        /// Compound operator
        op: &'static str,
        /// What it expects
        expected: &'static str,
    },

    /// Key not supported by this connection
    #[error("unknown filter key '{0}'")]
    UnknownKey(String),

    /// Value for a key failed to parse
    #[error("invalid value for filter key '{key}': {message}")]
    InvalidValue {
        /// Filter key
        key: String,
        /// Why it is invalid
        message: String,
    },

    /// Compound filters nest too deeply
    #[error("filter nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// Scalar constraints for one connection kind
pub trait FilterFields: Sized + Clone + Debug + PartialEq + Default {
    /// Entries this filter applies to
    type Item: ?Sized;

    /// Parse scalar keys from a JSON object level
    fn parse(map: &Map<String, JsonValue>) -> Result<Self, FilterError>;

    /// AND of every present constraint
    fn matches(&self, item: &Self::Item) -> bool;

    /// Hash present constraints in a fixed order
    fn fingerprint_into(&self, builder: &mut FingerprintBuilder);
}

/// Scalar constraints, or one compound combinator
#[derive(Debug, Clone, PartialEq)]
pub enum Filter<F> {
    /// AND of scalar constraints
    Fields(F),
    /// Matches if any child matches
    Any(Vec<Filter<F>>),
    /// Matches if every child matches
    All(Vec<Filter<F>>),
    /// Matches if the child does not
    Not(Box<Filter<F>>),
}

/// Filter over objects
pub type ObjectFilter = Filter<ObjectFields>;
/// Filter over transaction blocks
pub type TransactionFilter = Filter<TransactionFields>;
/// Filter over events
pub type EventFilter = Filter<EventFields>;

impl<F: FilterFields> Default for Filter<F> {
    fn default() -> Self {
        Filter::Fields(F::default())
    }
}

impl<F: FilterFields> Filter<F> {
    /// Parse from a JSON value
    pub fn from_json(value: &JsonValue) -> Result<Self, FilterError> {
        Self::parse_level(value, 0)
    }

    fn parse_level(value: &JsonValue, depth: usize) -> Result<Self, FilterError> {
        if depth > MAX_FILTER_DEPTH {
            return Err(FilterError::TooDeep(MAX_FILTER_DEPTH));
        }
        let map = value.as_object().ok_or(FilterError::NotAnObject)?;

        let compound = map.keys().find(|k| COMPOUND_KEYS.contains(&k.as_str()));
        let Some(op) = compound else {
            return Ok(Filter::Fields(F::parse(map)?));
        };
        if map.len() > 1 {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            return Err(FilterError::CompoundMixedWithScalar {
                compound: op.clone(),
                keys: keys.join(", "),
            });
        }

        let operand = &map[op];
        match op.as_str() {
            "not" => {
                if !operand.is_object() {
                    return Err(FilterError::Arity {
                        op: "not",
                        expected: "exactly one filter object",
                    });
                }
                Ok(Filter::Not(Box::new(Self::parse_level(operand, depth + 1)?)))
            }
            name => {
                let op_name = if name == "any" { "any" } else { "all" };
                let children = operand
                    .as_array()
                    .filter(|items| !items.is_empty())
                    .ok_or(FilterError::Arity {
                        op: op_name,
                        expected: "a non-empty array of filter objects",
                    })?
                    .iter()
                    .map(|child| Self::parse_level(child, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if op_name == "any" {
                    Filter::Any(children)
                } else {
                    Filter::All(children)
                })
            }
        }
    }

    /// Pure predicate
    pub fn matches(&self, item: &F::Item) -> bool {
        match self {
            Filter::Fields(f) => f.matches(item),
            Filter::Any(children) => children.iter().any(|c| c.matches(item)),
            Filter::All(children) => children.iter().all(|c| c.matches(item)),
            Filter::Not(inner) => !inner.matches(item),
        }
    }

    /// Canonical hash of the filter structure
    pub fn fingerprint_into(&self, builder: &mut FingerprintBuilder) {
        match self {
            Filter::Fields(f) => {
                builder.write_tag(0x10);
                f.fingerprint_into(builder);
            }
            Filter::Any(children) | Filter::All(children) => {
                builder.write_tag(if matches!(self, Filter::Any(_)) { 0x11 } else { 0x12 });
                builder.write_len(children.len());
                for child in children {
                    child.fingerprint_into(builder);
                }
            }
            Filter::Not(inner) => {
                builder.write_tag(0x13);
                inner.fingerprint_into(builder);
            }
        }
    }

    /// Top-level scalar constraints, if the filter is not compound
    pub fn fields(&self) -> Option<&F> {
        match self {
            Filter::Fields(f) => Some(f),
            _ => None,
        }
    }
}

// =============================================================================
// Value parsing helpers
// =============================================================================

fn invalid(key: &str, message: impl ToString) -> FilterError {
    FilterError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn as_str<'a>(key: &str, value: &'a JsonValue) -> Result<&'a str, FilterError> {
    value.as_str().ok_or_else(|| invalid(key, "expected a string"))
}

fn parse_address(key: &str, value: &JsonValue) -> Result<Address, FilterError> {
    Address::from_hex(as_str(key, value)?).map_err(|e| invalid(key, e))
}

/// 64-bit values arrive as decimal strings; small ones may be JSON numbers
fn parse_u64(key: &str, value: &JsonValue) -> Result<u64, FilterError> {
    match value {
        JsonValue::Number(n) => n.as_u64().ok_or_else(|| invalid(key, "expected an unsigned integer")),
        JsonValue::String(s) => s.parse().map_err(|_| invalid(key, "expected an unsigned integer")),
        _ => Err(invalid(key, "expected an unsigned integer")),
    }
}

fn parse_list<T>(
    key: &str,
    value: &JsonValue,
    item: impl Fn(&JsonValue) -> Result<T, FilterError>,
) -> Result<Vec<T>, FilterError> {
    value
        .as_array()
        .ok_or_else(|| invalid(key, "expected an array"))?
        .iter()
        .map(item)
        .collect()
}

fn write_opt<T>(builder: &mut FingerprintBuilder, value: Option<&T>, write: impl Fn(&mut FingerprintBuilder, &T)) {
    match value {
        None => {
            builder.write_tag(0);
        }
        Some(v) => {
            builder.write_tag(1);
            write(builder, v);
        }
    }
}

// =============================================================================
// Type filter
// =============================================================================

/// Type constraint at package, module, struct or exact-instantiation level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeFilter {
    /// Any type defined in the package
    Package(Address),
    /// Any type defined in the module
    Module(Address, String),
    /// Any instantiation of the struct
    Struct(Address, String, String),
    /// Exactly this type
    Exact(TypeSignature),
}

impl TypeFilter {
    /// Parse `0x2`, `0x2::coin`, `0x2::coin::Coin` or `0x2::coin::Coin<0x2::sui::SUI>`
    pub fn parse(key: &str, input: &str) -> Result<Self, FilterError> {
        if input.contains('<') {
            let sig: TypeSignature = input.parse().map_err(|e| invalid(key, e))?;
            return Ok(TypeFilter::Exact(sig));
        }
        let parts: Vec<&str> = input.split("::").map(str::trim).collect();
        let package = Address::from_hex(parts[0]).map_err(|e| invalid(key, e))?;
        match parts.as_slice() {
            [_] => Ok(TypeFilter::Package(package)),
            [_, module] if !module.is_empty() => Ok(TypeFilter::Module(package, module.to_string())),
            [_, module, name] if !module.is_empty() && !name.is_empty() => Ok(TypeFilter::Struct(
                package,
                module.to_string(),
                name.to_string(),
            )),
            _ => Err(invalid(key, "expected package[::module[::type]]")),
        }
    }

    /// Does `sig` satisfy this constraint?
    pub fn matches(&self, sig: &TypeSignature) -> bool {
        if let TypeFilter::Exact(exact) = self {
            return exact == sig;
        }
        let Some(d) = sig.as_datatype() else {
            return false;
        };
        match self {
            TypeFilter::Package(p) => d.package == *p,
            TypeFilter::Module(p, m) => d.package == *p && d.module == *m,
            TypeFilter::Struct(p, m, n) => d.is(p, m, n),
            TypeFilter::Exact(_) => false,
        }
    }

    fn fingerprint_into(&self, builder: &mut FingerprintBuilder) {
        match self {
            TypeFilter::Package(p) => {
                builder.write_tag(1).write_bytes(p.as_bytes());
            }
            TypeFilter::Module(p, m) => {
                builder.write_tag(2).write_bytes(p.as_bytes()).write_str(m);
            }
            TypeFilter::Struct(p, m, n) => {
                builder
                    .write_tag(3)
                    .write_bytes(p.as_bytes())
                    .write_str(m)
                    .write_str(n);
            }
            TypeFilter::Exact(sig) => {
                builder.write_tag(4).write_str(&sig.repr());
            }
        }
    }
}

// =============================================================================
// Object filter
// =============================================================================

/// Scalar object constraints
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectFields {
    /// Owned by this address
    pub owner: Option<Address>,
    /// Child of this object
    pub parent: Option<ObjectId>,
    /// Type constraint
    pub type_: Option<TypeFilter>,
    /// Latest versions of these ids
    pub object_ids: Option<Vec<ObjectId>>,
    /// Exactly these versions
    pub object_keys: Option<Vec<ObjectKey>>,
}

impl FilterFields for ObjectFields {
    type Item = Object;

    fn parse(map: &Map<String, JsonValue>) -> Result<Self, FilterError> {
        let mut out = ObjectFields::default();
        for (key, value) in map {
            match key.as_str() {
                "owner" => out.owner = Some(parse_address(key, value)?),
                "parent" => out.parent = Some(parse_address(key, value)?),
                "type" => out.type_ = Some(TypeFilter::parse(key, as_str(key, value)?)?),
                "objectIds" => {
                    out.object_ids = Some(parse_list(key, value, |v| parse_address(key, v))?)
                }
                "objectKeys" => {
                    out.object_keys = Some(parse_list(key, value, |v| {
                        let id = v
                            .get("objectId")
                            .ok_or_else(|| invalid(key, "objectKeys entry missing objectId"))?;
                        let version = v
                            .get("version")
                            .ok_or_else(|| invalid(key, "objectKeys entry missing version"))?;
                        Ok(ObjectKey::new(
                            parse_address(key, id)?,
                            SequenceNumber(parse_u64(key, version)?),
                        ))
                    })?)
                }
                other => return Err(FilterError::UnknownKey(other.to_string())),
            }
        }
        Ok(out)
    }

    fn matches(&self, object: &Object) -> bool {
        if let Some(owner) = &self.owner {
            if !object.owner.is_owned_by(owner) {
                return false;
            }
        }
        if let Some(parent) = &self.parent {
            if !object.owner.is_child_of(parent) {
                return false;
            }
        }
        if let Some(t) = &self.type_ {
            match object.type_() {
                Some(sig) if t.matches(sig) => {}
                _ => return false,
            }
        }
        if let Some(ids) = &self.object_ids {
            if !ids.contains(&object.id) {
                return false;
            }
        }
        if let Some(keys) = &self.object_keys {
            if !keys.contains(&object.key()) {
                return false;
            }
        }
        true
    }

    fn fingerprint_into(&self, b: &mut FingerprintBuilder) {
        write_opt(b, self.owner.as_ref(), |b, a| {
            b.write_bytes(a.as_bytes());
        });
        write_opt(b, self.parent.as_ref(), |b, a| {
            b.write_bytes(a.as_bytes());
        });
        write_opt(b, self.type_.as_ref(), |b, t| t.fingerprint_into(b));
        write_opt(b, self.object_ids.as_ref(), |b, ids| {
            b.write_len(ids.len());
            for id in ids {
                b.write_bytes(id.as_bytes());
            }
        });
        write_opt(b, self.object_keys.as_ref(), |b, keys| {
            b.write_len(keys.len());
            for k in keys {
                b.write_bytes(k.object_id.as_bytes()).write_u64(k.version.value());
            }
        });
    }
}

// =============================================================================
// Transaction filter
// =============================================================================

/// Function constraint: package, module, or exact function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionFilter {
    /// Package
    pub package: Address,
    /// Module, if constrained
    pub module: Option<String>,
    /// Function, if constrained (requires module)
    pub function: Option<String>,
}

impl FunctionFilter {
    fn parse(key: &str, input: &str) -> Result<Self, FilterError> {
        let parts: Vec<&str> = input.split("::").map(str::trim).collect();
        let package = Address::from_hex(parts[0]).map_err(|e| invalid(key, e))?;
        match parts.as_slice() {
            [_] => Ok(FunctionFilter {
                package,
                module: None,
                function: None,
            }),
            [_, m] => Ok(FunctionFilter {
                package,
                module: Some(m.to_string()),
                function: None,
            }),
            [_, m, f] => Ok(FunctionFilter {
                package,
                module: Some(m.to_string()),
                function: Some(f.to_string()),
            }),
            _ => Err(invalid(key, "expected package[::module[::function]]")),
        }
    }
}

/// Scalar transaction constraints
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionFields {
    /// Sent by this address
    pub sent_address: Option<Address>,
    /// Touched this object
    pub affected_object: Option<ObjectId>,
    /// Called this package/module/function
    pub function: Option<FunctionFilter>,
    /// `true` for system transactions, `false` for programmable ones
    pub system_kind: Option<bool>,
    /// Finalized in exactly this checkpoint
    pub at_checkpoint: Option<u64>,
    /// Finalized strictly after this checkpoint
    pub after_checkpoint: Option<u64>,
    /// Finalized strictly before this checkpoint
    pub before_checkpoint: Option<u64>,
}

impl FilterFields for TransactionFields {
    type Item = TransactionBlock;

    fn parse(map: &Map<String, JsonValue>) -> Result<Self, FilterError> {
        let mut out = TransactionFields::default();
        for (key, value) in map {
            match key.as_str() {
                "sentAddress" => out.sent_address = Some(parse_address(key, value)?),
                "affectedObject" => out.affected_object = Some(parse_address(key, value)?),
                "function" => out.function = Some(FunctionFilter::parse(key, as_str(key, value)?)?),
                "kind" => {
                    out.system_kind = Some(match as_str(key, value)? {
                        "SYSTEM_TX" => true,
                        "PROGRAMMABLE_TX" => false,
                        _ => return Err(invalid(key, "expected SYSTEM_TX or PROGRAMMABLE_TX")),
                    })
                }
                "atCheckpoint" => out.at_checkpoint = Some(parse_u64(key, value)?),
                "afterCheckpoint" => out.after_checkpoint = Some(parse_u64(key, value)?),
                "beforeCheckpoint" => out.before_checkpoint = Some(parse_u64(key, value)?),
                other => return Err(FilterError::UnknownKey(other.to_string())),
            }
        }
        Ok(out)
    }

    fn matches(&self, tx: &TransactionBlock) -> bool {
        if let Some(sender) = &self.sent_address {
            if tx.data.sender != *sender {
                return false;
            }
        }
        if let Some(id) = &self.affected_object {
            if !tx.effects.affected_objects().any(|o| o == id) {
                return false;
            }
        }
        if let Some(f) = &self.function {
            let hit = tx.data.kind.move_calls().iter().any(|call| {
                call.package == f.package
                    && f.module.as_ref().map_or(true, |m| *m == call.module)
                    && f.function.as_ref().map_or(true, |n| *n == call.function)
            });
            if !hit {
                return false;
            }
        }
        if let Some(system) = self.system_kind {
            if tx.data.kind.is_system() != system {
                return false;
            }
        }
        let checkpoint_bounds = [
            self.at_checkpoint.map(|c| (c, 0i8)),
            self.after_checkpoint.map(|c| (c, 1)),
            self.before_checkpoint.map(|c| (c, -1)),
        ];
        for (bound, side) in checkpoint_bounds.into_iter().flatten() {
            let Some(cp) = tx.checkpoint else {
                return false;
            };
            let ok = match side {
                0 => cp == bound,
                1 => cp > bound,
                _ => cp < bound,
            };
            if !ok {
                return false;
            }
        }
        true
    }

    fn fingerprint_into(&self, b: &mut FingerprintBuilder) {
        write_opt(b, self.sent_address.as_ref(), |b, a| {
            b.write_bytes(a.as_bytes());
        });
        write_opt(b, self.affected_object.as_ref(), |b, a| {
            b.write_bytes(a.as_bytes());
        });
        write_opt(b, self.function.as_ref(), |b, f| {
            b.write_bytes(f.package.as_bytes())
                .write_opt_str(f.module.as_deref())
                .write_opt_str(f.function.as_deref());
        });
        write_opt(b, self.system_kind.as_ref(), |b, s| {
            b.write_tag(u8::from(*s));
        });
        for bound in [self.at_checkpoint, self.after_checkpoint, self.before_checkpoint] {
            write_opt(b, bound.as_ref(), |b, c| {
                b.write_u64(*c);
            });
        }
    }
}

// =============================================================================
// Event filter
// =============================================================================

/// Scalar event constraints
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventFields {
    /// Emitted by a transaction from this sender
    pub sender: Option<Address>,
    /// Emitted by this transaction
    pub transaction_digest: Option<Digest>,
    /// Emitted from this package (and module, if given)
    pub emitting_module: Option<(Address, Option<String>)>,
    /// Event type constraint
    pub event_type: Option<TypeFilter>,
}

impl FilterFields for EventFields {
    type Item = IndexedEvent;

    fn parse(map: &Map<String, JsonValue>) -> Result<Self, FilterError> {
        let mut out = EventFields::default();
        for (key, value) in map {
            match key.as_str() {
                "sender" => out.sender = Some(parse_address(key, value)?),
                "transactionDigest" => {
                    out.transaction_digest =
                        Some(as_str(key, value)?.parse().map_err(|e| invalid(key, e))?)
                }
                "emittingModule" => {
                    let text = as_str(key, value)?;
                    let (pkg, module) = match text.split_once("::") {
                        Some((p, m)) => (p, Some(m.trim().to_string())),
                        None => (text, None),
                    };
                    let pkg = Address::from_hex(pkg).map_err(|e| invalid(key, e))?;
                    out.emitting_module = Some((pkg, module));
                }
                "eventType" => {
                    out.event_type = Some(TypeFilter::parse(key, as_str(key, value)?)?)
                }
                other => return Err(FilterError::UnknownKey(other.to_string())),
            }
        }
        Ok(out)
    }

    fn matches(&self, e: &IndexedEvent) -> bool {
        if let Some(sender) = &self.sender {
            if e.event.sender != *sender {
                return false;
            }
        }
        if let Some(digest) = &self.transaction_digest {
            if e.transaction_digest != *digest {
                return false;
            }
        }
        if let Some((pkg, module)) = &self.emitting_module {
            if e.event.package_id != *pkg {
                return false;
            }
            if let Some(m) = module {
                if e.event.transaction_module != *m {
                    return false;
                }
            }
        }
        if let Some(t) = &self.event_type {
            if !t.matches(&e.event.type_) {
                return false;
            }
        }
        true
    }

    fn fingerprint_into(&self, b: &mut FingerprintBuilder) {
        write_opt(b, self.sender.as_ref(), |b, a| {
            b.write_bytes(a.as_bytes());
        });
        write_opt(b, self.transaction_digest.as_ref(), |b, d| {
            b.write_bytes(d.as_bytes());
        });
        write_opt(b, self.emitting_module.as_ref(), |b, (p, m)| {
            b.write_bytes(p.as_bytes()).write_opt_str(m.as_deref());
        });
        write_opt(b, self.event_type.as_ref(), |b, t| t.fingerprint_into(b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::coin_contents;
    use crate::types::Owner;
    use serde_json::json;

    fn fingerprint(filter: &ObjectFilter) -> crate::cursor::QueryFingerprint {
        let mut b = FingerprintBuilder::new("Query.objects");
        filter.fingerprint_into(&mut b);
        b.finish()
    }

    fn coin_owned_by(owner: u8) -> Object {
        let id = Address::from_low_byte(0x40 + owner);
        Object::new_move(
            id,
            SequenceNumber(1),
            Owner::AddressOwner(Address::from_low_byte(owner)),
            TypeSignature::gas_coin(),
            coin_contents(&id, 1),
            Digest::default(),
        )
    }

    #[test]
    fn test_scalar_keys_and() {
        let f = ObjectFilter::from_json(&json!({ "owner": "0x1", "type": "0x2::coin::Coin" })).unwrap();
        assert!(f.matches(&coin_owned_by(1)));
        assert!(!f.matches(&coin_owned_by(2)));

        let f = ObjectFilter::from_json(&json!({ "owner": "0x1", "type": "0x3" })).unwrap();
        assert!(!f.matches(&coin_owned_by(1)));
    }

    #[test]
    fn test_compound_filters() {
        let any = ObjectFilter::from_json(&json!({
            "any": [ { "owner": "0x1" }, { "owner": "0x2" } ]
        }))
        .unwrap();
        assert!(any.matches(&coin_owned_by(2)));
        assert!(!any.matches(&coin_owned_by(3)));

        let not = ObjectFilter::from_json(&json!({ "not": { "owner": "0x1" } })).unwrap();
        assert!(!not.matches(&coin_owned_by(1)));
        assert!(not.matches(&coin_owned_by(3)));

        let all = ObjectFilter::from_json(&json!({
            "all": [ { "type": "0x2::coin" }, { "not": { "owner": "0x2" } } ]
        }))
        .unwrap();
        assert!(all.matches(&coin_owned_by(1)));
        assert!(!all.matches(&coin_owned_by(2)));
    }

    #[test]
    fn test_compound_must_be_exclusive() {
        let err = ObjectFilter::from_json(&json!({
            "any": [ { "owner": "0x1" } ],
            "owner": "0x2"
        }))
        .unwrap_err();
        assert!(matches!(err, FilterError::CompoundMixedWithScalar { .. }));

        let err = ObjectFilter::from_json(&json!({ "any": [{}], "all": [{}] })).unwrap_err();
        assert!(matches!(err, FilterError::CompoundMixedWithScalar { .. }));
    }

    #[test]
    fn test_compound_arity() {
        assert!(matches!(
            ObjectFilter::from_json(&json!({ "any": [] })),
            Err(FilterError::Arity { op: "any", .. })
        ));
        assert!(matches!(
            ObjectFilter::from_json(&json!({ "not": [ {}, {} ] })),
            Err(FilterError::Arity { op: "not", .. })
        ));
        assert!(matches!(
            ObjectFilter::from_json(&json!({ "all": {} })),
            Err(FilterError::Arity { op: "all", .. })
        ));
    }

    #[test]
    fn test_unknown_key_and_bad_values() {
        assert_eq!(
            ObjectFilter::from_json(&json!({ "colour": "red" })),
            Err(FilterError::UnknownKey("colour".into()))
        );
        assert!(matches!(
            ObjectFilter::from_json(&json!({ "owner": 7 })),
            Err(FilterError::InvalidValue { .. })
        ));
        assert_eq!(
            ObjectFilter::from_json(&json!("owner")),
            Err(FilterError::NotAnObject)
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut value = json!({ "owner": "0x1" });
        for _ in 0..=MAX_FILTER_DEPTH {
            value = json!({ "not": value });
        }
        assert_eq!(
            ObjectFilter::from_json(&value),
            Err(FilterError::TooDeep(MAX_FILTER_DEPTH))
        );
    }

    #[test]
    fn test_object_keys_accept_string_versions() {
        let f = ObjectFilter::from_json(&json!({
            "objectKeys": [ { "objectId": "0x41", "version": "1" } ]
        }))
        .unwrap();
        assert!(f.matches(&coin_owned_by(1)));
    }

    #[test]
    fn test_fingerprint_distinguishes_shapes() {
        let a = ObjectFilter::from_json(&json!({ "owner": "0x1" })).unwrap();
        let not_a = ObjectFilter::from_json(&json!({ "not": { "owner": "0x1" } })).unwrap();
        let b = ObjectFilter::from_json(&json!({ "parent": "0x1" })).unwrap();
        assert_ne!(fingerprint(&a), fingerprint(&not_a));
        assert_ne!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a), fingerprint(&a.clone()));
    }

    #[test]
    fn test_type_filter_levels() {
        let coin = TypeSignature::gas_coin();
        let parse = |s: &str| TypeFilter::parse("type", s).unwrap();
        assert!(parse("0x2").matches(&coin));
        assert!(parse("0x2::coin").matches(&coin));
        assert!(parse("0x2::coin::Coin").matches(&coin));
        assert!(parse("0x2::coin::Coin<0x2::sui::SUI>").matches(&coin));
        assert!(!parse("0x2::coin::Coin<0x3::x::Y>").matches(&coin));
        assert!(!parse("0x2::balance").matches(&coin));
        assert!(!parse("0x2").matches(&TypeSignature::U64));
    }
}
