//! Whole traversals at arbitrary page sizes

use crate::common::*;
use crate::walks::all_objects;
use crate::{args, objects_page};
use chainql_engine::Resolver;
use proptest::prelude::*;
use serde_json::{json, Value as JsonValue};

async fn walk(resolver: &Resolver, size: usize, backward: bool) -> Vec<String> {
    let (size_key, cursor_key, next_cursor, more) = if backward {
        ("last", "before", "startCursor", "hasPreviousPage")
    } else {
        ("first", "after", "endCursor", "hasNextPage")
    };
    let mut seen: Vec<Vec<String>> = Vec::new();
    let mut cursor = JsonValue::Null;
    loop {
        let (items, info) = objects_page(
            resolver,
            args(&[(size_key, json!(size)), (cursor_key, cursor.clone())]),
        )
        .await;
        assert!(items.len() <= size);
        seen.push(items);
        if info[more] != json!(true) {
            break;
        }
        cursor = info[next_cursor].clone();
    }
    if backward {
        seen.reverse();
    }
    seen.into_iter().flatten().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_every_page_size_visits_each_object_once(size in 1usize..=8, backward in any::<bool>()) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let chain = chain();
        let resolver = chain.resolver();
        let visited = runtime.block_on(walk(&resolver, size, backward));
        prop_assert_eq!(visited, all_objects());
    }
}
