//! Property-based tests.
//!
//! - Canonical RSON output parses back to the value it came from
//! - On documents that are plain JSON, RSON and serde_json agree

use librson::{encode, parse, Format, Key, Value};
use proptest::prelude::*;

/// Printable text without control characters.
const TEXT: &str = "\\PC{0,12}";

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        TEXT.prop_map(Value::String),
    ]
}

fn key_strategy() -> impl Strategy<Value = Key> {
    prop_oneof![
        4 => TEXT.prop_map(Key::String),
        1 => scalar_strategy().prop_map(|v| Key::from_value(&v)),
        1 => prop::collection::vec(scalar_strategy(), 0..4)
            .prop_map(|items| Key::from_value(&Value::Array(items))),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((key_strategy(), inner), 0..6)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
        ]
    })
}

fn json_strategy() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(serde_json::Value::from),
        (-1.0e9f64..1.0e9).prop_map(serde_json::Value::from),
        TEXT.prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::btree_map(TEXT, inner, 0..6)
                .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn canonical_rson_reparses_to_same_value(value in value_strategy()) {
        let text = encode(&value, Format::Rson);
        let reparsed = parse(&text);
        prop_assert!(reparsed.is_ok(), "failed to parse {}: {:?}", text, reparsed);
        prop_assert_eq!(reparsed.unwrap(), value);
    }

    #[test]
    fn json_documents_parse_like_serde_json(json in json_strategy()) {
        let source = serde_json::to_string(&json).unwrap();
        let value = parse(&source);
        prop_assert!(value.is_ok(), "failed to parse {}: {:?}", source, value);

        let reencoded = encode(&value.unwrap(), Format::Json);
        let roundtrip: serde_json::Value = serde_json::from_str(&reencoded).unwrap();
        prop_assert_eq!(roundtrip, json);
    }

    #[test]
    fn pretty_json_parses_too(json in json_strategy()) {
        let compact = parse(&serde_json::to_string(&json).unwrap()).unwrap();
        let pretty = parse(&serde_json::to_string_pretty(&json).unwrap()).unwrap();
        prop_assert_eq!(pretty, compact);
    }
}
