use super::*;
use serde_json::json;

#[test]
fn test_check_matches_decoded_shape() {
    assert_eq!(Value::new(json!(null)).check(), ValueType::Null);
    assert_eq!(Value::new(json!(false)).check(), ValueType::Boolean);
    assert_eq!(Value::new(json!(1.5)).check(), ValueType::Number);
    assert_eq!(Value::new(json!("x")).check(), ValueType::String);
    assert_eq!(Value::new(json!([1])).check(), ValueType::Array);
    assert_eq!(Value::new(json!({"a": 1})).check(), ValueType::Object);
}

#[test]
fn test_check_bytes_rejects_malformed_input() {
    assert_eq!(
        Value::check_bytes(br#"{"a": [1, 2]}"#).unwrap(),
        ValueType::Object
    );
    let err = Value::check_bytes(b"{not json").unwrap_err();
    assert!(matches!(err, EngineError::Decode { .. }));
    assert!(err.to_string().contains("[M001]"));
}

#[test]
fn test_string_as_json_is_canonical() {
    let value = Value::new(json!({"b": 2, "a": [true, null]}));
    assert_eq!(value.string_as_json().unwrap(), r#"{"a":[true,null],"b":2}"#);
    assert_eq!(
        value.bytes_as_json().unwrap(),
        br#"{"a":[true,null],"b":2}"#.to_vec()
    );
}

#[test]
fn test_array_each_yields_index_value_and_type() {
    let value = Value::new(json!(["x", 2, {"k": "v"}]));
    let items: Vec<(usize, ValueType)> = value
        .array_each()
        .unwrap()
        .map(|(index, _, kind)| (index, kind))
        .collect();
    assert_eq!(
        items,
        vec![
            (0, ValueType::String),
            (1, ValueType::Number),
            (2, ValueType::Object)
        ]
    );
}

#[test]
fn test_array_each_on_object_is_type_error() {
    let value = Value::at("/spec", json!({"a": 1}));
    match value.array_each() {
        Err(EngineError::Type {
            branch,
            expected,
            found,
        }) => {
            assert_eq!(branch, "/spec");
            assert_eq!(expected, "Array");
            assert_eq!(found, "Object");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected a type error"),
    }
}

#[test]
fn test_text_keeps_strings_verbatim() {
    assert_eq!(Value::new(json!("a\"b")).text(), "a\"b");
    assert_eq!(Value::new(json!(42)).text(), "42");
    assert_eq!(Value::new(json!(null)).text(), "null");
}

#[test]
fn test_value_type_names_round_trip() {
    for kind in [
        ValueType::Null,
        ValueType::Boolean,
        ValueType::Number,
        ValueType::String,
        ValueType::Array,
        ValueType::Object,
    ] {
        assert_eq!(ValueType::from_name(kind.as_str()), Some(kind));
    }
    assert_eq!(ValueType::from_name("Map"), None);
}
