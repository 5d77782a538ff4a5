use super::*;
use std::collections::HashSet;

#[test]
fn test_identifier_format() {
    assert_eq!(STRING_JOIN.to_string(), "kubegen.String.Join");
    assert_eq!(NULL_IF.to_string(), "kubegen.Null.If");
    assert_eq!(LOAD_ARRAY_JSON.identifier("acme"), "acme.Array.LoadJSON");
}

#[test]
fn test_identifiers_are_unique() {
    let ids: HashSet<String> = MACROS.iter().map(|m| m.to_string()).collect();
    assert_eq!(ids.len(), MACROS.len());
}

#[test]
fn test_lookup_exists_once_per_return_type() {
    let lookups: Vec<ValueType> = MACROS
        .iter()
        .filter(|m| m.verb == Verb::Lookup)
        .map(|m| m.return_type)
        .collect();
    assert_eq!(
        lookups,
        vec![
            ValueType::Boolean,
            ValueType::String,
            ValueType::Number,
            ValueType::Array,
            ValueType::Object
        ]
    );
    assert_ne!(STRING_LOOKUP, NUMBER_LOOKUP);
}

#[test]
fn test_parse_round_trips_every_macro() {
    for m in MACROS {
        assert_eq!(Macro::parse(&m.identifier("kubegen"), "kubegen"), Some(m));
    }
}

#[test]
fn test_parse_rejects_unknown_combinations() {
    assert_eq!(Macro::parse("kubegen.Number.Join", "kubegen"), None);
    assert_eq!(Macro::parse("kubegen.String.Nope", "kubegen"), None);
    assert_eq!(Macro::parse("kubegen.String", "kubegen"), None);
    assert_eq!(Macro::parse("other.String.Join", "kubegen"), None);
    assert_eq!(Macro::parse("kubegenx.String.Join", "kubegen"), None);
}

#[test]
fn test_is_macro_shaped() {
    assert!(is_macro_shaped("kubegen.String.Frobnicate", "kubegen"));
    assert!(is_macro_shaped("kubegen.Object.LoadJSON", "kubegen"));
    assert!(!is_macro_shaped("kubegen.io/app", "kubegen"));
    assert!(!is_macro_shaped("kubegen.Whatever", "kubegen"));
    assert!(!is_macro_shaped("kubegen.String.join-all", "kubegen"));
    assert!(!is_macro_shaped("kubegen.Text.Join", "kubegen"));
    assert!(!is_macro_shaped("kubegen.String.Join.extra", "kubegen"));
    assert!(!is_macro_shaped("kubegenerate", "kubegen"));
    assert!(!is_macro_shaped("name", "kubegen"));
}

#[test]
fn test_phase_assignment() {
    assert_eq!(NULL_IF.eval_phase, EvalPhase::A);
    assert!(MACROS
        .iter()
        .filter(|m| m.verb == Verb::Lookup)
        .all(|m| m.eval_phase == EvalPhase::B));
    assert_eq!(LOAD_OBJECT_JSON.eval_phase, EvalPhase::C);
    assert_eq!(STRING_AS_BASE64.eval_phase, EvalPhase::D);
    assert!(MACROS.iter().all(|m| m.eval_phase != EvalPhase::E));
    assert!(EvalPhase::A < EvalPhase::E);
    assert_eq!(EvalPhase::ALL.len(), 5);
}
