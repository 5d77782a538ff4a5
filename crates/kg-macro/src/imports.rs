//! Sources of LoadJSON payloads.
//!
//! The engine performs no I/O; callers hand over already-fetched bytes.

use kg_core::BranchLocator;
use serde_json::Value as Json;
use std::collections::HashMap;

/// Supplies the raw JSON bytes a LoadJSON invocation imports
pub trait ImportResolver {
    /// `host` is the object holding the invocation and `argument` is the
    /// invocation member's value.
    fn resolve(&self, host: &BranchLocator, argument: &Json) -> Option<Vec<u8>>;
}

impl<F> ImportResolver for F
where
    F: Fn(&BranchLocator, &Json) -> Option<Vec<u8>>,
{
    fn resolve(&self, host: &BranchLocator, argument: &Json) -> Option<Vec<u8>> {
        self(host, argument)
    }
}

/// Resolver that never supplies anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImports;

impl ImportResolver for NoImports {
    fn resolve(&self, _host: &BranchLocator, _argument: &Json) -> Option<Vec<u8>> {
        None
    }
}

/// In-memory payloads keyed by name.
///
/// A String argument is looked up by its value. Any other argument (the
/// usual `true` flag) is looked up by the host's JSON Pointer, `""` being
/// the document root.
#[derive(Debug, Clone, Default)]
pub struct MemoryImports {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryImports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), bytes.into());
    }

    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ImportResolver for MemoryImports {
    fn resolve(&self, host: &BranchLocator, argument: &Json) -> Option<Vec<u8>> {
        let key = match argument.as_str() {
            Some(name) => name.to_string(),
            None => host.pointer(),
        };
        self.entries.get(&key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_imports_by_name() {
        let imports = MemoryImports::new().with("base.json", r#"{"a":1}"#);
        let host = BranchLocator::root().child_key("spec");
        assert_eq!(
            imports.resolve(&host, &json!("base.json")),
            Some(br#"{"a":1}"#.to_vec())
        );
        assert_eq!(imports.resolve(&host, &json!("other.json")), None);
    }

    #[test]
    fn test_memory_imports_by_host_pointer() {
        let imports = MemoryImports::new()
            .with("", "[]")
            .with("/spec/template", "{}");
        assert_eq!(
            imports.resolve(&BranchLocator::root(), &json!(true)),
            Some(b"[]".to_vec())
        );
        let host = BranchLocator::root().child_key("spec").child_key("template");
        assert_eq!(imports.resolve(&host, &json!(true)), Some(b"{}".to_vec()));
        assert_eq!(imports.len(), 2);
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |_: &BranchLocator, arg: &Json| arg.as_str().map(|s| s.as_bytes().to_vec());
        assert_eq!(
            resolver.resolve(&BranchLocator::root(), &json!("[1]")),
            Some(b"[1]".to_vec())
        );
        assert_eq!(NoImports.resolve(&BranchLocator::root(), &json!("x")), None);
    }
}
