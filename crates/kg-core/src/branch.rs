//! Path-based addressing of document nodes.
//!
//! A [`BranchLocator`] is a coordinate, not a handle: it owns no data and is
//! resolved against the live document on every access. Pointer rendering
//! follows RFC 6901 escaping.

use serde_json::Value as Json;

/// One step from a node to one of its children
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object member key
    Key(String),
    /// Array element index
    Index(usize),
}

impl Segment {
    fn escaped(&self) -> String {
        match self {
            Segment::Key(key) => key.replace('~', "~0").replace('/', "~1"),
            Segment::Index(index) => index.to_string(),
        }
    }

    /// The object key for this segment, if it is one
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(key) => Some(key.as_str()),
            Segment::Index(_) => None,
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Address of a node as the sequence of segments from the document root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BranchLocator {
    path: Vec<Segment>,
}

impl BranchLocator {
    /// The root locator (empty path)
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(path: Vec<Segment>) -> Self {
        Self { path }
    }

    /// Parse an RFC 6901 pointer. Every token becomes a [`Segment::Key`];
    /// numeric keys still address array elements when resolved.
    pub fn from_pointer(pointer: &str) -> Option<Self> {
        if pointer.is_empty() {
            return Some(Self::root());
        }
        let rest = pointer.strip_prefix('/')?;
        let path = rest
            .split('/')
            .map(|token| Segment::Key(token.replace("~1", "/").replace("~0", "~")))
            .collect();
        Some(Self { path })
    }

    /// Locator of the member `key` under this node
    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(Segment::Key(key.into()));
        Self { path }
    }

    /// Locator of element `index` under this node
    pub fn child_index(&self, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(Segment::Index(index));
        Self { path }
    }

    /// Path minus its last segment; `None` for the root
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.path.split_last()?;
        Some(Self {
            path: head.to_vec(),
        })
    }

    /// Number of segments from the root
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.path
    }

    pub fn last(&self) -> Option<&Segment> {
        self.path.last()
    }

    /// True when this locator is `prefix` or lies beneath it
    pub fn starts_with(&self, prefix: &BranchLocator) -> bool {
        self.path.starts_with(&prefix.path)
    }

    /// RFC 6901 rendering (`""` for the root)
    pub fn pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            out.push('/');
            out.push_str(&segment.escaped());
        }
        out
    }

    /// Resolve against a document
    pub fn resolve<'a>(&self, doc: &'a Json) -> Option<&'a Json> {
        self.path
            .iter()
            .try_fold(doc, |node, segment| step(node, segment))
    }

    /// Resolve mutably against a document
    pub fn resolve_mut<'a>(&self, doc: &'a mut Json) -> Option<&'a mut Json> {
        let mut node = doc;
        for segment in &self.path {
            node = step_mut(node, segment)?;
        }
        Some(node)
    }
}

impl std::fmt::Display for BranchLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.pointer())
        }
    }
}

fn array_index(segment: &Segment) -> Option<usize> {
    match segment {
        Segment::Index(index) => Some(*index),
        Segment::Key(key) => key.parse().ok(),
    }
}

fn step<'a>(node: &'a Json, segment: &Segment) -> Option<&'a Json> {
    match node {
        Json::Object(map) => match segment {
            Segment::Key(key) => map.get(key),
            Segment::Index(index) => map.get(&index.to_string()),
        },
        Json::Array(items) => items.get(array_index(segment)?),
        _ => None,
    }
}

fn step_mut<'a>(node: &'a mut Json, segment: &Segment) -> Option<&'a mut Json> {
    match node {
        Json::Object(map) => match segment {
            Segment::Key(key) => map.get_mut(key),
            Segment::Index(index) => map.get_mut(&index.to_string()),
        },
        Json::Array(items) => items.get_mut(array_index(segment)?),
        _ => None,
    }
}
