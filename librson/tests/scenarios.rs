//! End-to-end parsing scenarios and parse options.

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use librson::{
    parse, parse_with_options, ErrorCategory, Key, Object, ParseError, ParseOptions, Value,
};

fn s(text: &str) -> Value {
    Value::from(text)
}

fn strings(items: &[&str]) -> Value {
    Value::Array(items.iter().map(|t| s(t)).collect())
}

fn obj(pairs: Vec<(Key, Value)>) -> Value {
    Value::Object(pairs.into_iter().collect::<Object>())
}

fn tuple(keys: Vec<Key>) -> Key {
    Key::Tuple(keys)
}

#[test]
fn test_empty_array_completed_by_block() {
    assert_eq!(
        parse("a:[]\n x").unwrap(),
        obj(vec![(Key::from("a"), strings(&["x"]))])
    );
}

#[test]
fn test_array_as_key() {
    assert_eq!(
        parse("[a,b]:[c,d]").unwrap(),
        obj(vec![(
            tuple(vec![Key::from("a"), Key::from("b")]),
            strings(&["c", "d"])
        )])
    );
}

#[test]
fn test_object_as_key() {
    let key = tuple(vec![
        tuple(vec![Key::from(0), Key::from(1)]),
        tuple(vec![
            tuple(vec![Key::from("a"), Key::from("b")]),
            tuple(vec![Key::from(1), Key::from(2), Key::from(3)]),
        ]),
    ]);
    assert_eq!(
        parse("{[a,b]:[1,2,3], 0:1}:[c,d]").unwrap(),
        obj(vec![(key, strings(&["c", "d"]))])
    );
}

#[test]
fn test_two_level_block_dict() {
    assert_eq!(
        parse("a:b\n c").unwrap(),
        obj(vec![(Key::from("a"), obj(vec![(Key::from("b"), s("c"))]))])
    );
}

#[test]
fn test_dict_value_opens_block_array() {
    assert_eq!(
        parse("a:b\n c\n d").unwrap(),
        obj(vec![(
            Key::from("a"),
            obj(vec![(Key::from("b"), strings(&["c", "d"]))])
        )])
    );
}

#[test]
fn test_trailing_comma_policy() {
    let source = "[a, b,]";
    assert_eq!(parse(source).unwrap(), strings(&["a", "b"]));

    let strict = ParseOptions::new().allow_trailing_commas(false);
    let err = parse_with_options(source, &strict).unwrap_err();
    assert!(matches!(err, ParseError::TrailingComma(_)));
    assert_eq!(err.category(), ErrorCategory::Policy);
    assert_eq!(err.to_string(), "Unexpected trailing comma at 1:7");

    // Without a trailing comma the strict parser is unaffected.
    assert_eq!(
        parse_with_options("[a, b]", &strict).unwrap(),
        strings(&["a", "b"])
    );
}

#[test]
fn test_use_decimal() {
    let options = ParseOptions::new().use_decimal(true);
    let value = parse_with_options("price: 19.99\nqty: 3\nrate: 1e-2", &options).unwrap();
    let exact = |text: &str| BigDecimal::from_str(text).unwrap();
    assert_eq!(
        value.get("price").and_then(Value::as_decimal),
        Some(&exact("19.99"))
    );
    assert_eq!(value.get("qty"), Some(&Value::from(3)));
    assert_eq!(
        value.get("rate").and_then(Value::as_decimal),
        Some(&exact("0.01"))
    );

    let native = parse("price: 19.99").unwrap();
    assert_eq!(native.get("price").and_then(Value::as_float), Some(19.99));
}

#[test]
fn test_use_decimal_beyond_machine_precision() {
    let options = ParseOptions::new().use_decimal(true);
    let source = "huge: 1e100\ntiny: 1e-30\nlong: 123456789012345678901234567890.5\n\
                  digits: 0.1234567890123456789012345678901234";
    let value = parse_with_options(source, &options).unwrap();
    for (key, text) in [
        ("huge", "1e100"),
        ("tiny", "1e-30"),
        ("long", "123456789012345678901234567890.5"),
        ("digits", "0.1234567890123456789012345678901234"),
    ] {
        assert_eq!(
            value.get(key).and_then(Value::as_decimal),
            Some(&BigDecimal::from_str(text).unwrap()),
            "{}",
            key
        );
    }

    // Canonical output keeps every digit and reads back unchanged.
    let text = librson::encode(&value, librson::Format::Rson);
    assert!(text.contains("0.1234567890123456789012345678901234"), "{}", text);
    assert_eq!(parse_with_options(&text, &options).unwrap(), value);
}

#[test]
fn test_object_hook_wraps_every_object() {
    let options = ParseOptions::new().with_object_hook(|obj| {
        obj.into_iter()
            .find(|(k, _)| k.as_str() == Some("id"))
            .map(|(_, v)| v)
            .unwrap_or(Value::Null)
    });
    let value = parse_with_options("- : {id: 7, name: x}\nother:\n    id: 8", &options).unwrap();
    // The top-level object has no "id", so the hook turns it into null.
    assert_eq!(value, Value::Null);

    let value = parse_with_options("[{id: 7}, {id: 8}]", &options).unwrap();
    assert_eq!(value, Value::Array(vec![Value::from(7), Value::from(8)]));
}

#[test]
fn test_pairs_hook_keeps_order_and_duplicates() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let options = ParseOptions::new()
        .with_object_hook(|_| Value::from("unused"))
        .with_object_pairs_hook(move |pairs| {
            log.borrow_mut().push(pairs.len());
            Value::Array(pairs.into_iter().map(|(k, _)| k).collect())
        });
    let value = parse_with_options("b: 1\na: 2\nb: 3\n", &options).unwrap();
    assert_eq!(value, strings(&["b", "a", "b"]));
    assert_eq!(*seen.borrow(), vec![3]);
}

#[test]
fn test_duplicate_keys_last_wins() {
    let value = parse("a: 1\nb: 2\na: 3").unwrap();
    assert_eq!(value.get("a"), Some(&Value::from(3)));
    assert_eq!(value.as_object().map(|o| o.len()), Some(2));
}

#[test]
fn test_bracketed_matches_json() {
    let source = r#"{"a": [1, 2.5, "x", null, true], "b": {"c": {}}}"#;
    let value = parse(source).unwrap();
    let expected: serde_json::Value = serde_json::from_str(source).unwrap();
    let actual: serde_json::Value =
        serde_json::from_str(&librson::encode(&value, librson::Format::Json)).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn test_indentation_errors_never_succeed() {
    for source in [
        "a:\n    b: 1\n  c: 2",
        "a\n  b",
        "a\n b\n  c",
        "k:\n  x\n   y",
        "[]\n   x\n  y",
    ] {
        let err = parse(source).unwrap_err();
        assert_eq!(
            err.category(),
            ErrorCategory::Indentation,
            "{:?} gave {}",
            source,
            err
        );
    }
}

#[test]
fn test_error_reports_filename() {
    let err = librson::parse_with_filename("[1", Some("conf.rson")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unterminated list (no matching \"]\") at 1:1 of <conf.rson>"
    );
    assert_eq!(err.location().filename.as_deref(), Some("conf.rson"));
}
