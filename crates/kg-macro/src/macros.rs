//! Macro registry.
//!
//! The catalog is closed and fixed at build time. Each entry pairs a
//! produced-value type with a verb and an evaluation phase; the identifier
//! `<domain>.<ReturnType>.<VerbName>` is derived from those fields, so
//! `(ReturnType, Verb)` is the identity of a macro.

use kg_core::{ValueType, DEFAULT_DOMAIN};

/// Coarse precedence bucket among macros at the same depth.
///
/// Branching resolves before lookups, lookups and imports before string
/// post-processing. `E` has no macros yet; new verbs go there rather than
/// renumbering existing phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EvalPhase {
    A,
    B,
    C,
    D,
    E,
}

impl EvalPhase {
    pub const ALL: [EvalPhase; 5] = [
        EvalPhase::A,
        EvalPhase::B,
        EvalPhase::C,
        EvalPhase::D,
        EvalPhase::E,
    ];
}

/// Operation performed by a macro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    If,
    Lookup,
    LoadJson,
    Join,
    AsJson,
    AsYaml,
    AsBase64,
}

impl Verb {
    /// Name as written in macro identifiers
    pub fn name(&self) -> &'static str {
        match self {
            Verb::If => "If",
            Verb::Lookup => "Lookup",
            Verb::LoadJson => "LoadJSON",
            Verb::Join => "Join",
            Verb::AsJson => "AsJSON",
            Verb::AsYaml => "AsYAML",
            Verb::AsBase64 => "AsBASE64",
        }
    }
}

/// Immutable macro descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Macro {
    pub return_type: ValueType,
    pub eval_phase: EvalPhase,
    pub verb: Verb,
}

const fn def(return_type: ValueType, eval_phase: EvalPhase, verb: Verb) -> Macro {
    Macro {
        return_type,
        eval_phase,
        verb,
    }
}

// Phase A: branching
pub const NULL_IF: Macro = def(ValueType::Null, EvalPhase::A, Verb::If);

// Phase B: lookups
pub const BOOLEAN_LOOKUP: Macro = def(ValueType::Boolean, EvalPhase::B, Verb::Lookup);
pub const STRING_LOOKUP: Macro = def(ValueType::String, EvalPhase::B, Verb::Lookup);
pub const NUMBER_LOOKUP: Macro = def(ValueType::Number, EvalPhase::B, Verb::Lookup);
pub const ARRAY_LOOKUP: Macro = def(ValueType::Array, EvalPhase::B, Verb::Lookup);
pub const OBJECT_LOOKUP: Macro = def(ValueType::Object, EvalPhase::B, Verb::Lookup);

// Phase C: importers
pub const LOAD_OBJECT_JSON: Macro = def(ValueType::Object, EvalPhase::C, Verb::LoadJson);
pub const LOAD_ARRAY_JSON: Macro = def(ValueType::Array, EvalPhase::C, Verb::LoadJson);

// Phase D: string functions
pub const STRING_JOIN: Macro = def(ValueType::String, EvalPhase::D, Verb::Join);
pub const STRING_AS_JSON: Macro = def(ValueType::String, EvalPhase::D, Verb::AsJson);
pub const STRING_AS_YAML: Macro = def(ValueType::String, EvalPhase::D, Verb::AsYaml);
pub const STRING_AS_BASE64: Macro = def(ValueType::String, EvalPhase::D, Verb::AsBase64);

/// Every registered macro
pub const MACROS: [Macro; 12] = [
    NULL_IF,
    BOOLEAN_LOOKUP,
    STRING_LOOKUP,
    NUMBER_LOOKUP,
    ARRAY_LOOKUP,
    OBJECT_LOOKUP,
    LOAD_OBJECT_JSON,
    LOAD_ARRAY_JSON,
    STRING_JOIN,
    STRING_AS_JSON,
    STRING_AS_YAML,
    STRING_AS_BASE64,
];

impl Macro {
    /// Canonical identifier under `domain`, e.g. `kubegen.String.Join`
    pub fn identifier(&self, domain: &str) -> String {
        format!("{}.{}.{}", domain, self.return_type, self.verb.name())
    }

    /// Find the registered macro whose identifier under `domain` is `key`
    pub fn parse(key: &str, domain: &str) -> Option<Macro> {
        let rest = key.strip_prefix(domain)?.strip_prefix('.')?;
        let (type_name, verb_name) = rest.split_once('.')?;
        let return_type = ValueType::from_name(type_name)?;
        MACROS
            .iter()
            .copied()
            .find(|m| m.return_type == return_type && m.verb.name() == verb_name)
    }
}

/// Returns true when `key` has the full `<domain>.<Type>.<Verb>` shape,
/// whether or not it names a registered macro. Other keys under the
/// domain (`kubegen.io/app`) are plain data.
pub fn is_macro_shaped(key: &str, domain: &str) -> bool {
    let Some(rest) = key.strip_prefix(domain).and_then(|r| r.strip_prefix('.')) else {
        return false;
    };
    let Some((type_name, verb_name)) = rest.split_once('.') else {
        return false;
    };
    ValueType::from_name(type_name).is_some()
        && verb_name.starts_with(|ch: char| ch.is_ascii_uppercase())
        && verb_name.chars().all(|ch| ch.is_ascii_alphanumeric())
}

impl std::fmt::Display for Macro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identifier(DEFAULT_DOMAIN))
    }
}

#[cfg(test)]
#[path = "macros_test.rs"]
mod tests;
