use super::*;
use crate::MemoryImports;
use kg_core::EngineConfig;
use serde_json::json;

fn converter(doc: Json) -> Converter {
    Converter::new(doc, EngineConfig::default()).unwrap()
}

fn run(c: &mut Converter, pointer: &str, return_type: ValueType, data: &str) -> EngineResult<()> {
    let branch = BranchLocator::from_pointer(pointer).unwrap();
    c.atomically(|c| load_json(c, &branch, return_type, data.as_bytes()))
}

#[test]
fn test_root_object_replaced() {
    let mut c = converter(json!({"kubegen.Object.LoadJSON": true}));
    run(&mut c, "/kubegen.Object.LoadJSON", ValueType::Object, r#"{"b":1}"#).unwrap();
    assert_eq!(c.document(), &json!({"b": 1}));
}

#[test]
fn test_root_object_merge_keeps_other_keys() {
    let mut c = converter(json!({"x": 1, "kubegen.Object.LoadJSON": true}));
    run(&mut c, "/kubegen.Object.LoadJSON", ValueType::Object, r#"{"x":2,"y":3}"#).unwrap();
    assert_eq!(c.document(), &json!({"x": 1, "y": 3}));
}

#[test]
fn test_nested_merge_does_not_overwrite() {
    let mut c = converter(json!({"t": {"a": 1, "kubegen.Object.LoadJSON": true}}));
    run(&mut c, "/t/kubegen.Object.LoadJSON", ValueType::Object, r#"{"a":2,"c":3}"#).unwrap();
    assert_eq!(c.document(), &json!({"t": {"a": 1, "c": 3}}));
}

#[test]
fn test_merge_recurses_into_nested_objects() {
    let mut c = converter(json!({
        "t": {"meta": {"name": "keep"}, "kubegen.Object.LoadJSON": true}
    }));
    run(
        &mut c,
        "/t/kubegen.Object.LoadJSON",
        ValueType::Object,
        r#"{"meta":{"name":"drop","labels":{"app":"x"}}}"#,
    )
    .unwrap();
    assert_eq!(
        c.document(),
        &json!({"t": {"meta": {"name": "keep", "labels": {"app": "x"}}}})
    );
}

#[test]
fn test_overwrite_policy() {
    let mut dst = json!({"a": 1, "n": {"x": 1, "y": 1}});
    let src = json!({"a": 2, "n": {"y": 2, "z": 2}});
    let (Json::Object(dst_map), Json::Object(src_map)) = (&mut dst, src) else {
        unreachable!()
    };
    merge_objects(dst_map, src_map, MergePolicy::Overwrite);
    assert_eq!(dst, json!({"a": 2, "n": {"x": 1, "y": 2, "z": 2}}));
}

#[test]
fn test_keep_existing_policy_preserves_every_old_key() {
    let old = json!({"a": 1, "b": [1, 2], "c": "s"});
    let mut dst = old.clone();
    let src = json!({"a": 9, "b": [], "c": null, "d": true});
    let (Json::Object(dst_map), Json::Object(src_map)) = (&mut dst, src) else {
        unreachable!()
    };
    merge_objects(dst_map, src_map, MergePolicy::KeepExisting);
    for (key, value) in old.as_object().unwrap() {
        assert_eq!(&dst[key], value);
    }
    assert_eq!(dst["d"], json!(true));
}

#[test]
fn test_array_replaces_placeholder() {
    let mut c = converter(json!({"items": {"kubegen.Array.LoadJSON": true}}));
    run(&mut c, "/items/kubegen.Array.LoadJSON", ValueType::Array, "[1,2]").unwrap();
    assert_eq!(c.document(), &json!({"items": [1, 2]}));
}

#[test]
fn test_array_with_residual_keys_fails_and_rolls_back() {
    let doc = json!({"items": {"extra": 1, "kubegen.Array.LoadJSON": true}});
    let mut c = converter(doc.clone());
    let err = run(&mut c, "/items/kubegen.Array.LoadJSON", ValueType::Array, "[1]").unwrap_err();
    match err {
        EngineError::Merge { message } => {
            assert!(message.contains("unexpected keys"));
            assert!(message.contains("extra"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(c.document(), &doc);
}

#[test]
fn test_array_at_root_is_rejected() {
    let doc = json!({"kubegen.Array.LoadJSON": true});
    let mut c = converter(doc.clone());
    let err = run(&mut c, "/kubegen.Array.LoadJSON", ValueType::Array, "[]").unwrap_err();
    assert!(err
        .to_string()
        .contains("cannot insert array in place of root object"));
    assert_eq!(c.document(), &doc);
}

#[test]
fn test_missing_target_is_empty_old_data() {
    let mut c = converter(json!({"other": 1}));
    let err = run(&mut c, "/gone/kubegen.Object.LoadJSON", ValueType::Object, "{}").unwrap_err();
    assert!(err.to_string().contains("old data is empty"));
}

#[test]
fn test_non_object_target() {
    let mut c = converter(json!({"list": [{"kubegen.Object.LoadJSON": true}]}));
    let err = run(&mut c, "/list/0/kubegen.Object.LoadJSON/x", ValueType::Object, "{}")
        .unwrap_err();
    assert!(matches!(err, EngineError::Merge { .. }));
}

#[test]
fn test_malformed_import_is_decode_error() {
    let doc = json!({"t": {"kubegen.Object.LoadJSON": true}});
    let mut c = converter(doc.clone());
    let err = run(&mut c, "/t/kubegen.Object.LoadJSON", ValueType::Object, "{oops").unwrap_err();
    assert!(matches!(err, EngineError::Decode { .. }));
    assert_eq!(c.document(), &doc);
}

#[test]
fn test_object_import_of_array_payload_fails() {
    let mut c = converter(json!({"t": {"kubegen.Object.LoadJSON": true}}));
    let err = run(&mut c, "/t/kubegen.Object.LoadJSON", ValueType::Object, "[1]").unwrap_err();
    assert!(err.to_string().contains("not an object"));
}

#[test]
fn test_load_json_through_expand_with_named_import() {
    let imports = MemoryImports::new()
        .with("base.json", r#"{"replicas":1,"image":"nginx"}"#)
        .with("ports.json", "[80,443]");
    let mut c = converter(json!({
        "spec": {"replicas": 3, "kubegen.Object.LoadJSON": "base.json"},
        "ports": {"kubegen.Array.LoadJSON": "ports.json"}
    }))
    .with_imports(imports);
    c.expand().unwrap();
    assert_eq!(
        c.document(),
        &json!({"spec": {"replicas": 3, "image": "nginx"}, "ports": [80, 443]})
    );
}

#[test]
fn test_missing_payload_fails_at_execution() {
    let mut c = converter(json!({"spec": {"kubegen.Object.LoadJSON": "absent.json"}}));
    let err = c.expand().unwrap_err();
    assert!(matches!(
        err.root_cause(),
        EngineError::ImportNotFound { branch } if branch == "/spec"
    ));
}
