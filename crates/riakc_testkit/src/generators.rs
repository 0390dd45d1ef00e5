//! Property-based test generators using proptest.

use proptest::prelude::*;
use serde_json::{Map, Value as Json};

/// Strategy for bucket names.
pub fn bucket_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for keys, including characters that need percent-encoding.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 _./?&%é-]{1,24}").expect("Invalid regex")
}

/// Strategy for JSON scalars.
pub fn json_scalar_strategy() -> impl Strategy<Value = Json> {
    prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        any::<i32>().prop_map(Json::from),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Json::String),
    ]
}

/// Strategy for flat JSON documents.
pub fn json_document_strategy() -> impl Strategy<Value = Json> {
    prop::collection::btree_map("[a-z]{1,8}", json_scalar_strategy(), 0..6).prop_map(|fields| {
        let map: Map<String, Json> = fields.into_iter().collect();
        Json::Object(map)
    })
}

/// Strategy for lists of distinct JSON strings.
pub fn json_string_list_strategy() -> impl Strategy<Value = Vec<Json>> {
    prop::collection::btree_set("[a-z]{1,6}", 0..8)
        .prop_map(|items| items.into_iter().map(Json::String).collect())
}
