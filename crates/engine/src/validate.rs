//! Static query validation
//!
//! Runs before the resolver touches storage. A query that fails here is
//! rejected whole; nothing is partially resolved.

use crate::limits::EngineConfig;
use crate::pagination::PageArgs;
use crate::query::{Query, QueryNode};
use crate::schema::{
    self, NodeType, Shape, CONNECTION_FIELDS, EDGE_FIELDS, PAGE_ARGS, PAGE_INFO_FIELDS,
};
use chainql_core::{ChainqlError, ChainqlResult};
use std::collections::HashSet;

/// Check `query` against the schema, limits and enabled features
pub fn validate(query: &Query, config: &EngineConfig) -> ChainqlResult<()> {
    validate_rooted(NodeType::Query, &query.selection, config)
}

/// Check a selection rooted at `root` rather than at the query root
pub fn validate_rooted(root: NodeType, selection: &[QueryNode], config: &EngineConfig) -> ChainqlResult<()> {
    let limits = &config.limits;
    let depth = selection.iter().map(QueryNode::depth).max().unwrap_or(0);
    if depth > limits.max_query_depth {
        return Err(ChainqlError::too_complex(format!(
            "query depth {} exceeds the maximum {}",
            depth, limits.max_query_depth
        )));
    }
    let nodes: usize = selection.iter().map(QueryNode::node_count).sum();
    if nodes > limits.max_query_nodes {
        return Err(ChainqlError::too_complex(format!(
            "query has {} nodes, above the maximum {}",
            nodes, limits.max_query_nodes
        )));
    }
    if selection.is_empty() {
        return Err(ChainqlError::invalid_input("query selects nothing"));
    }
    validate_selection(root, selection, config)
}

fn validate_selection(parent: NodeType, selection: &[QueryNode], config: &EngineConfig) -> ChainqlResult<()> {
    check_unique_keys(selection)?;
    for node in selection {
        validate_field(parent, node, config)?;
    }
    Ok(())
}

fn validate_field(parent: NodeType, node: &QueryNode, config: &EngineConfig) -> ChainqlResult<()> {
    let spec = schema::lookup(parent, &node.name).ok_or_else(|| {
        ChainqlError::invalid_input(format!("unknown field '{}' on type '{}'", node.name, parent))
    })?;

    if let Some(feature) = spec.feature {
        if !config.is_enabled(feature) {
            return Err(ChainqlError::FeatureDisabled {
                feature: feature.to_string(),
            });
        }
    }

    let is_connection = matches!(spec.shape, Shape::Connection(_));
    for key in node.args.keys() {
        let known = spec.args.contains(&key.as_str()) || (is_connection && PAGE_ARGS.contains(&key.as_str()));
        if !known {
            return Err(ChainqlError::invalid_input(format!(
                "unknown argument '{}' on field '{}.{}'",
                key, parent, node.name
            )));
        }
    }

    match spec.shape {
        Shape::Scalar => no_selection(node),
        Shape::Node(child) | Shape::List(child) => {
            needs_selection(node)?;
            validate_selection(child, &node.selection, config)
        }
        Shape::Connection(child) => {
            PageArgs::from_node(node, &config.limits)?;
            needs_selection(node)?;
            validate_connection(child, node, config)
        }
    }
}

fn validate_connection(child: NodeType, node: &QueryNode, config: &EngineConfig) -> ChainqlResult<()> {
    check_unique_keys(&node.selection)?;
    for part in &node.selection {
        if !part.args.is_empty() {
            return Err(ChainqlError::invalid_input(format!(
                "'{}' takes no arguments",
                part.name
            )));
        }
        match part.name.as_str() {
            "nodes" => {
                needs_selection(part)?;
                validate_selection(child, &part.selection, config)?;
            }
            "edges" => {
                needs_selection(part)?;
                check_unique_keys(&part.selection)?;
                for edge_field in &part.selection {
                    match edge_field.name.as_str() {
                        "cursor" => no_selection(edge_field)?,
                        "node" => {
                            needs_selection(edge_field)?;
                            validate_selection(child, &edge_field.selection, config)?;
                        }
                        other => return Err(unknown_in("edges", other, &EDGE_FIELDS)),
                    }
                }
            }
            "pageInfo" => {
                needs_selection(part)?;
                check_unique_keys(&part.selection)?;
                for info in &part.selection {
                    if !PAGE_INFO_FIELDS.contains(&info.name.as_str()) {
                        return Err(unknown_in("pageInfo", &info.name, &PAGE_INFO_FIELDS));
                    }
                    no_selection(info)?;
                }
            }
            other => return Err(unknown_in(&node.name, other, &CONNECTION_FIELDS)),
        }
    }
    Ok(())
}

fn unknown_in(parent: &str, name: &str, allowed: &[&str]) -> ChainqlError {
    ChainqlError::invalid_input(format!(
        "unknown field '{}' in '{}' (expected one of: {})",
        name,
        parent,
        allowed.join(", ")
    ))
}

fn no_selection(node: &QueryNode) -> ChainqlResult<()> {
    if node.selection.is_empty() {
        Ok(())
    } else {
        Err(ChainqlError::invalid_input(format!(
            "field '{}' is a scalar and takes no selection",
            node.name
        )))
    }
}

fn needs_selection(node: &QueryNode) -> ChainqlResult<()> {
    if node.selection.is_empty() {
        Err(ChainqlError::invalid_input(format!(
            "field '{}' requires a selection",
            node.name
        )))
    } else {
        Ok(())
    }
}

fn check_unique_keys(selection: &[QueryNode]) -> ChainqlResult<()> {
    let mut seen = HashSet::with_capacity(selection.len());
    for node in selection {
        if !seen.insert(node.response_key()) {
            return Err(ChainqlError::invalid_input(format!(
                "response key '{}' is selected more than once; use an alias",
                node.response_key()
            )));
        }
    }
    Ok(())
}
