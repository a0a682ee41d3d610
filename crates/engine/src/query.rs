//! Query model
//!
//! A query is a tree of named fields. Each node may carry an alias (the key
//! it is returned under), arguments, and a child selection:
//!
//! ```json
//! [
//!   { "name": "object", "args": { "address": "0x5" }, "selection": [
//!       { "name": "version" },
//!       { "name": "owner", "alias": "who", "selection": [ { "name": "kind" } ] }
//!   ] }
//! ]
//! ```

use chainql_core::{ChainqlError, ChainqlResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One requested field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryNode {
    /// Schema field name
    pub name: String,
    /// Response key, if different from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Arguments
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub args: Map<String, JsonValue>,
    /// Child fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection: Vec<QueryNode>,
}

impl QueryNode {
    /// Leaf field
    pub fn new(name: impl Into<String>) -> Self {
        QueryNode {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the response key
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Add an argument
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Set the child selection
    pub fn select(mut self, children: impl IntoIterator<Item = QueryNode>) -> Self {
        self.selection = children.into_iter().collect();
        self
    }

    /// Key this field is returned under
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Argument by name, treating JSON `null` as absent
    pub fn argument(&self, key: &str) -> Option<&JsonValue> {
        self.args.get(key).filter(|v| !v.is_null())
    }

    /// Required string argument
    pub fn str_arg(&self, key: &str) -> ChainqlResult<&str> {
        self.optional_str_arg(key)?.ok_or_else(|| {
            ChainqlError::invalid_input(format!("field '{}' requires argument '{}'", self.name, key))
        })
    }

    /// Optional string argument
    pub fn optional_str_arg(&self, key: &str) -> ChainqlResult<Option<&str>> {
        match self.argument(key) {
            None => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s)),
            Some(_) => Err(ChainqlError::invalid_input(format!(
                "argument '{}' of '{}' must be a string",
                key, self.name
            ))),
        }
    }

    /// Optional unsigned argument; accepts a JSON number or decimal string
    pub fn u64_arg(&self, key: &str) -> ChainqlResult<Option<u64>> {
        let invalid = || {
            ChainqlError::invalid_input(format!(
                "argument '{}' of '{}' must be an unsigned integer",
                key, self.name
            ))
        };
        match self.argument(key) {
            None => Ok(None),
            Some(JsonValue::Number(n)) => n.as_u64().map(Some).ok_or_else(invalid),
            Some(JsonValue::String(s)) => s.parse().map(Some).map_err(|_| invalid()),
            Some(_) => Err(invalid()),
        }
    }

    /// Depth of this subtree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.selection.iter().map(QueryNode::depth).max().unwrap_or(0)
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.selection.iter().map(QueryNode::node_count).sum::<usize>()
    }
}

/// Root selection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    /// Root fields
    pub selection: Vec<QueryNode>,
}

impl Query {
    /// Query over `selection`
    pub fn new(selection: impl IntoIterator<Item = QueryNode>) -> Self {
        Query {
            selection: selection.into_iter().collect(),
        }
    }

    /// Parse from JSON
    pub fn from_json(value: JsonValue) -> ChainqlResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| ChainqlError::invalid_input(format!("malformed query: {}", e)))
    }

    /// Deepest root field
    pub fn depth(&self) -> usize {
        self.selection.iter().map(QueryNode::depth).max().unwrap_or(0)
    }

    /// Total selection nodes
    pub fn node_count(&self) -> usize {
        self.selection.iter().map(QueryNode::node_count).sum()
    }
}
