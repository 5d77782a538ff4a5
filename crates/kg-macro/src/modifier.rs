//! Discovered macro invocations and their callbacks

use crate::converter::Converter;
use crate::macros::Macro;
use kg_core::{BranchLocator, EngineResult};

/// A unit of work bound to one Modifier.
///
/// Running it is the only point where the document is mutated on that
/// Modifier's behalf. It runs at most once.
pub type ModifierCallback = Box<dyn FnOnce(&mut Converter) -> EngineResult<()>>;

/// One macro invocation bound to a location in the document
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub macro_def: Macro,
    /// Locator of the invocation member itself (`.../host/<macro key>`)
    pub branch: BranchLocator,
    /// Node the callback consumes: the invocation member, or its
    /// `<key><args_suffix>` sibling when the member is a `true` flag
    pub input: BranchLocator,
    /// Pre-fetched import bytes for LoadJSON
    pub payload: Option<Vec<u8>>,
}

impl Modifier {
    /// Invocation consuming its own member value
    pub fn new(macro_def: Macro, branch: BranchLocator) -> Self {
        Self {
            macro_def,
            input: branch.clone(),
            branch,
            payload: None,
        }
    }

    pub fn with_input(mut self, input: BranchLocator) -> Self {
        self.input = input;
        self
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// The `<key><args_suffix>` sibling this Modifier reads, if any
    pub fn argument_sibling(&self) -> Option<&BranchLocator> {
        Some(&self.input).filter(|input| **input != self.branch)
    }

    pub fn depth(&self) -> usize {
        self.branch.depth()
    }

    /// The object holding the invocation member; results are written here
    pub fn host(&self) -> BranchLocator {
        self.branch.parent().unwrap_or_default()
    }
}
