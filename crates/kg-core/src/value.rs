//! Runtime view of a document node.
//!
//! A [`Value`] holds a node's materialized content together with its type
//! tag. The tag is computed once at construction and always agrees with the
//! decoded shape.

use crate::error::{EngineError, EngineResult};
use serde_json::Value as Json;

/// Runtime type tag of a document node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueType {
    /// Type tag of a decoded JSON node
    pub fn of(json: &Json) -> Self {
        match json {
            Json::Null => ValueType::Null,
            Json::Bool(_) => ValueType::Boolean,
            Json::Number(_) => ValueType::Number,
            Json::String(_) => ValueType::String,
            Json::Array(_) => ValueType::Array,
            Json::Object(_) => ValueType::Object,
        }
    }

    /// Name used in macro identifiers (`kubegen.<Name>.Verb`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Null => "Null",
            ValueType::Boolean => "Boolean",
            ValueType::Number => "Number",
            ValueType::String => "String",
            ValueType::Array => "Array",
            ValueType::Object => "Object",
        }
    }

    /// Inverse of [`as_str`](Self::as_str)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Null" => Some(ValueType::Null),
            "Boolean" => Some(ValueType::Boolean),
            "Number" => Some(ValueType::Number),
            "String" => Some(ValueType::String),
            "Array" => Some(ValueType::Array),
            "Object" => Some(ValueType::Object),
            _ => None,
        }
    }

    /// Returns true for the two types allowed at the document root
    pub fn is_container(&self) -> bool {
        matches!(self, ValueType::Array | ValueType::Object)
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node's content paired with its type tag
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    content: Json,
    kind: ValueType,
    /// JSON Pointer of the node this value was read from, for diagnostics
    origin: String,
}

impl Value {
    /// Wrap already-decoded content
    pub fn new(content: Json) -> Self {
        let kind = ValueType::of(&content);
        Self {
            content,
            kind,
            origin: String::new(),
        }
    }

    /// Wrap content read from the node at `origin`
    pub fn at(origin: impl Into<String>, content: Json) -> Self {
        Self {
            origin: origin.into(),
            ..Self::new(content)
        }
    }

    /// Decode raw node bytes
    pub fn from_bytes(bytes: &[u8]) -> EngineResult<Self> {
        let content: Json = serde_json::from_slice(bytes)?;
        Ok(Self::new(content))
    }

    /// Type of raw node bytes, failing when they are not valid JSON
    pub fn check_bytes(bytes: &[u8]) -> EngineResult<ValueType> {
        Self::from_bytes(bytes).map(|v| v.check())
    }

    /// Runtime type of this node
    pub fn check(&self) -> ValueType {
        self.kind
    }

    pub fn content(&self) -> &Json {
        &self.content
    }

    pub fn into_content(self) -> Json {
        self.content
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Borrow the string content, if this is a String node
    pub fn as_str(&self) -> Option<&str> {
        self.content.as_str()
    }

    /// Canonical JSON encoding as bytes
    pub fn bytes_as_json(&self) -> EngineResult<Vec<u8>> {
        serde_json::to_vec(&self.content).map_err(|e| EngineError::Encode {
            message: format!("cannot encode {} as JSON: {}", self.kind, e),
        })
    }

    /// Canonical JSON encoding as a string
    pub fn string_as_json(&self) -> EngineResult<String> {
        serde_json::to_string(&self.content).map_err(|e| EngineError::Encode {
            message: format!("cannot encode {} as JSON: {}", self.kind, e),
        })
    }

    /// Textual form used when concatenating: strings verbatim, anything else
    /// as its canonical JSON.
    pub fn text(&self) -> String {
        Self::text_of(&self.content)
    }

    /// [`text`](Self::text) for a bare JSON node
    pub fn text_of(json: &Json) -> String {
        match json {
            Json::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Iterate over the direct children of an Array node.
    ///
    /// Fails with [`EngineError::Type`] for any other node type.
    pub fn array_each(&self) -> EngineResult<ArrayEach<'_>> {
        match &self.content {
            Json::Array(items) => Ok(ArrayEach {
                inner: items.iter().enumerate(),
            }),
            _ => Err(EngineError::Type {
                branch: self.origin.clone(),
                expected: ValueType::Array.to_string(),
                found: self.kind.to_string(),
            }),
        }
    }
}

/// Traversal over array elements as `(index, element, type)`
pub struct ArrayEach<'a> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, Json>>,
}

impl<'a> Iterator for ArrayEach<'a> {
    type Item = (usize, &'a Json, ValueType);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(index, item)| (index, item, ValueType::of(item)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
