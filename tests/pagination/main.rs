//! Cursor pagination over every kind of connection
//!
//! - walks: forward and backward traversal, windows, page info
//! - cursors: cursors are bound to the connection that issued them
//! - properties: any page size visits every item exactly once

#[path = "../common/mod.rs"]
mod common;

mod cursors;
mod properties;
mod walks;

use chainql_engine::Resolver;
use serde_json::{json, Map, Value as JsonValue};

/// One page of root `objects`: the addresses on it and its page info
pub async fn objects_page(resolver: &Resolver, args: JsonValue) -> (Vec<String>, JsonValue) {
    let response = common::run(
        resolver,
        json!([
            { "name": "objects", "args": args, "selection": [
                { "name": "nodes", "selection": [ { "name": "address" } ] },
                { "name": "pageInfo", "selection": [
                    { "name": "hasNextPage" },
                    { "name": "hasPreviousPage" },
                    { "name": "startCursor" },
                    { "name": "endCursor" }
                ] }
            ] }
        ]),
    )
    .await;
    let connection = &response.data["objects"];
    let addresses = connection["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["address"].as_str().unwrap().to_string())
        .collect();
    (addresses, connection["pageInfo"].clone())
}

/// Page arguments with only the given keys set
pub fn args(pairs: &[(&str, JsonValue)]) -> JsonValue {
    let map: Map<String, JsonValue> = pairs
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    JsonValue::Object(map)
}
