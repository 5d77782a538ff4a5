//! Document owner and macro scheduler.
//!
//! The [`Converter`] holds the current document and is the only thing that
//! mutates it. One pass is Scan → Schedule → Execute; [`Converter::expand`]
//! repeats passes until a scan finds nothing left to do.
//!
//! Ordering is deepest branch first, then by [`EvalPhase`](crate::EvalPhase).
//! Descendants are rewritten before their ancestors, so no pending
//! Modifier's path can be invalidated by an earlier one in the same pass.

use crate::imports::{ImportResolver, NoImports};
use crate::macros::{is_macro_shaped, Macro, Verb};
use crate::modifier::{Modifier, ModifierCallback};
use crate::modifiers;
use kg_core::{BranchLocator, EngineConfig, EngineError, EngineResult, Segment, Value, ValueType};
use serde_json::Value as Json;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Content written by [`Converter::set`]
#[derive(Debug, Clone, PartialEq)]
pub enum NewValue {
    /// Plain string, stored as a JSON string
    Text(String),
    /// Pre-encoded JSON bytes
    Encoded(Vec<u8>),
    /// Already-decoded tree
    Tree(Json),
}

impl From<String> for NewValue {
    fn from(s: String) -> Self {
        NewValue::Text(s)
    }
}

impl From<&str> for NewValue {
    fn from(s: &str) -> Self {
        NewValue::Text(s.to_string())
    }
}

impl From<Json> for NewValue {
    fn from(json: Json) -> Self {
        NewValue::Tree(json)
    }
}

impl NewValue {
    fn into_json(self) -> EngineResult<Json> {
        match self {
            NewValue::Text(s) => Ok(Json::String(s)),
            NewValue::Tree(json) => Ok(json),
            NewValue::Encoded(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| EngineError::Integrity {
                    message: format!("written value is not valid JSON: {}", e),
                })
            }
        }
    }
}

/// Macro engine bound to one document
pub struct Converter {
    data: Json,
    config: EngineConfig,
    parameters: HashMap<String, Json>,
    imports: Box<dyn ImportResolver>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("data", &self.data)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Converter {
    /// Take ownership of a decoded document. The root must be an object or
    /// an array.
    pub fn new(document: Json, config: EngineConfig) -> EngineResult<Self> {
        let parameters = config.json_parameters();
        let converter = Self {
            data: document,
            config,
            parameters,
            imports: Box::new(NoImports),
        };
        converter.ensure_document()?;
        Ok(converter)
    }

    /// Decode document bytes and take ownership of the result
    pub fn from_slice(bytes: &[u8], config: EngineConfig) -> EngineResult<Self> {
        let document: Json = serde_json::from_slice(bytes)?;
        Self::new(document, config)
    }

    /// Use `resolver` to supply LoadJSON payloads during scans
    pub fn with_imports(mut self, resolver: impl ImportResolver + 'static) -> Self {
        self.imports = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn document(&self) -> &Json {
        &self.data
    }

    pub fn into_document(self) -> Json {
        self.data
    }

    /// Compact JSON encoding of the current document
    pub fn to_json_bytes(&self) -> EngineResult<Vec<u8>> {
        serde_json::to_vec(&self.data).map_err(|e| EngineError::Encode {
            message: format!("cannot encode document as JSON: {}", e),
        })
    }

    /// YAML rendering of the current document
    pub fn to_yaml_string(&self) -> EngineResult<String> {
        serde_yaml::to_string(&self.data).map_err(|e| EngineError::Encode {
            message: format!("cannot encode document as YAML: {}", e),
        })
    }

    /// Parameter visible to Lookup macros
    pub fn parameter(&self, name: &str) -> Option<&Json> {
        self.parameters.get(name)
    }

    /// Current value at `branch`
    pub fn value(&self, branch: &BranchLocator) -> EngineResult<Value> {
        branch
            .resolve(&self.data)
            .map(|node| Value::at(branch.to_string(), node.clone()))
            .ok_or_else(|| EngineError::BranchNotFound {
                branch: branch.to_string(),
            })
    }

    // ===== Scan =====

    /// Find every macro invocation in the current document.
    ///
    /// Read-only. Members `then`/`else` of an `If` host are not descended
    /// into; whichever arm survives is picked up by the next pass.
    pub fn scan(&self) -> EngineResult<Vec<Modifier>> {
        let mut found = Vec::new();
        self.scan_node(&self.data, &BranchLocator::root(), &mut found)?;
        Ok(found)
    }

    fn scan_node(
        &self,
        node: &Json,
        at: &BranchLocator,
        found: &mut Vec<Modifier>,
    ) -> EngineResult<()> {
        match node {
            Json::Object(map) => {
                let mut invocation: Option<(&str, Macro)> = None;
                for key in map.keys() {
                    if !is_macro_shaped(key, &self.config.domain) {
                        continue;
                    }
                    let macro_def = Macro::parse(key, &self.config.domain).ok_or_else(|| {
                        EngineError::UnknownMacro {
                            key: key.clone(),
                            branch: at.to_string(),
                        }
                    })?;
                    if let Some((first, _)) = invocation {
                        return Err(EngineError::DuplicateMacro {
                            branch: at.to_string(),
                            first: first.to_string(),
                            second: key.clone(),
                        });
                    }
                    invocation = Some((key.as_str(), macro_def));
                }

                let is_if = matches!(invocation, Some((_, m)) if m.verb == Verb::If);
                if let Some((key, macro_def)) = invocation {
                    found.push(self.bind(macro_def, at, key, &map[key]));
                }

                for (key, child) in map {
                    if is_if && (key == "then" || key == "else") {
                        continue;
                    }
                    self.scan_node(child, &at.child_key(key.as_str()), found)?;
                }
            }
            Json::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.scan_node(child, &at.child_index(index), found)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Build the Modifier for invocation `key` inside the host at `host`
    fn bind(&self, macro_def: Macro, host: &BranchLocator, key: &str, argument: &Json) -> Modifier {
        let branch = host.child_key(key);
        let mut modifier = Modifier::new(macro_def, branch);

        if argument == &Json::Bool(true) {
            if let Some(sibling) = self.args_sibling(host) {
                modifier = modifier.with_input(sibling);
            }
        }

        if macro_def.verb == Verb::LoadJson {
            if let Some(payload) = self.imports.resolve(host, argument) {
                modifier = modifier.with_payload(payload);
            }
        }

        modifier
    }

    /// `<name><args_suffix>` next to the host, when the host is an object
    /// member and that sibling exists
    fn args_sibling(&self, host: &BranchLocator) -> Option<BranchLocator> {
        let name = host.last()?.as_key()?;
        let sibling = host
            .parent()?
            .child_key(format!("{}{}", name, self.config.args_suffix));
        sibling.resolve(&self.data).map(|_| sibling)
    }

    // ===== Schedule =====

    /// Order Modifiers deepest first, then by phase. Ties keep scan order.
    ///
    /// A Modifier reading an argument sibling sits at the same depth as the
    /// invocations inside that sibling, so it is moved behind the last of
    /// them.
    pub fn schedule(mut modifiers: Vec<Modifier>) -> Vec<Modifier> {
        modifiers.sort_by_key(|m| (Reverse(m.depth()), m.macro_def.eval_phase));
        while let Some((from, to)) = Self::misplaced_consumer(&modifiers) {
            let consumer = modifiers.remove(from);
            modifiers.insert(to, consumer);
        }
        modifiers
    }

    /// First Modifier that runs before an invocation inside its argument
    /// sibling, with the position it has to move to.
    fn misplaced_consumer(modifiers: &[Modifier]) -> Option<(usize, usize)> {
        modifiers.iter().enumerate().find_map(|(index, consumer)| {
            let args = consumer.argument_sibling()?;
            modifiers
                .iter()
                .rposition(|m| m.branch.starts_with(args))
                .filter(|&last| last > index)
                .map(|last| (index, last))
        })
    }

    // ===== Execute =====

    /// Run already-ordered Modifiers one at a time.
    ///
    /// Each Modifier is all-or-nothing: a failing callback leaves the
    /// document as it was before that Modifier started, and the remaining
    /// Modifiers are not run.
    pub fn execute(&mut self, ordered: Vec<Modifier>) -> EngineResult<()> {
        for modifier in ordered {
            self.apply(&modifier)?;
        }
        Ok(())
    }

    /// Build and run the callback for a single Modifier
    pub fn apply(&mut self, modifier: &Modifier) -> EngineResult<()> {
        log::debug!(
            "Applying {} at {}",
            modifier.macro_def.identifier(&self.config.domain),
            modifier.branch
        );
        let args = modifier.argument_sibling().cloned();
        let result = Self::callback_for(modifier).and_then(|callback| {
            self.atomically(|c| {
                callback(c)?;
                // The argument sibling is consumed along with the invocation
                match args {
                    Some(args) if args.resolve(&c.data).is_some() => c.delete(&args),
                    _ => Ok(()),
                }
            })
        });
        result.map_err(|e| EngineError::Modifier {
            macro_id: modifier.macro_def.identifier(&self.config.domain),
            branch: modifier.branch.to_string(),
            source: Box::new(e),
        })
    }

    fn callback_for(modifier: &Modifier) -> EngineResult<ModifierCallback> {
        match modifier.macro_def.verb {
            Verb::If => modifiers::control::make_if(modifier),
            Verb::Lookup => modifiers::control::make_lookup(modifier),
            Verb::LoadJson => modifiers::load_json::make_load_json(modifier),
            Verb::Join => modifiers::strings::make_join(modifier),
            Verb::AsJson => modifiers::strings::make_as_json(modifier),
            Verb::AsYaml => modifiers::strings::make_as_yaml(modifier),
            Verb::AsBase64 => modifiers::strings::make_as_base64(modifier),
        }
    }

    /// Wrap `callback` so it only runs when the node at `branch` currently
    /// has type `expected`; otherwise it fails with [`EngineError::Type`].
    pub fn type_check_modifier(
        branch: BranchLocator,
        expected: ValueType,
        callback: ModifierCallback,
    ) -> ModifierCallback {
        Box::new(move |c: &mut Converter| {
            let found = c.value(&branch)?.check();
            if found != expected {
                return Err(EngineError::Type {
                    branch: branch.to_string(),
                    expected: expected.to_string(),
                    found: found.to_string(),
                });
            }
            callback(c)
        })
    }

    /// Run `f`; on failure restore the document as it was before
    pub fn atomically<F>(&mut self, f: F) -> EngineResult<()>
    where
        F: FnOnce(&mut Converter) -> EngineResult<()>,
    {
        let snapshot = self.data.clone();
        let result = f(self);
        if result.is_err() {
            self.data = snapshot;
        }
        result
    }

    // ===== Mutation primitives =====

    /// Replace the node at `branch` (or add it, for a missing object
    /// member). The document is re-validated and rolled back on failure.
    pub fn set(&mut self, branch: &BranchLocator, value: impl Into<NewValue>) -> EngineResult<()> {
        log::trace!("Set {}", branch);
        let node = value.into().into_json()?;
        self.atomically(|c| {
            c.write(branch, node)?;
            c.ensure_document()
        })
    }

    /// Remove the node at `branch`, including its key when it is an
    /// object member. Same validation discipline as [`set`](Self::set).
    pub fn delete(&mut self, branch: &BranchLocator) -> EngineResult<()> {
        log::trace!("Delete {}", branch);
        self.atomically(|c| {
            c.remove(branch)?;
            c.ensure_document()
        })
    }

    /// Swap in a whole new document
    pub fn replace_document(&mut self, document: Json) -> EngineResult<()> {
        self.set(&BranchLocator::root(), document)
    }

    fn write(&mut self, branch: &BranchLocator, node: Json) -> EngineResult<()> {
        let (Some(parent), Some(last)) = (branch.parent(), branch.last()) else {
            self.data = node;
            return Ok(());
        };
        let not_found = || EngineError::BranchNotFound {
            branch: branch.to_string(),
        };
        match parent.resolve_mut(&mut self.data).ok_or_else(not_found)? {
            Json::Object(map) => {
                map.insert(last.to_string(), node);
                Ok(())
            }
            Json::Array(items) => {
                let slot = segment_index(last)
                    .and_then(|index| items.get_mut(index))
                    .ok_or_else(not_found)?;
                *slot = node;
                Ok(())
            }
            _ => Err(not_found()),
        }
    }

    fn remove(&mut self, branch: &BranchLocator) -> EngineResult<()> {
        let (Some(parent), Some(last)) = (branch.parent(), branch.last()) else {
            return Err(EngineError::Integrity {
                message: "cannot delete the document root".to_string(),
            });
        };
        let not_found = || EngineError::BranchNotFound {
            branch: branch.to_string(),
        };
        match parent.resolve_mut(&mut self.data).ok_or_else(not_found)? {
            Json::Object(map) => map
                .remove(&last.to_string())
                .map(|_| ())
                .ok_or_else(not_found),
            Json::Array(items) => match segment_index(last) {
                Some(index) if index < items.len() => {
                    items.remove(index);
                    Ok(())
                }
                _ => Err(not_found()),
            },
            _ => Err(not_found()),
        }
    }

    /// Well-formedness check run after every write: the root is a container
    /// and the whole tree survives a JSON encode/decode round trip.
    fn ensure_document(&self) -> EngineResult<()> {
        let root = ValueType::of(&self.data);
        if !root.is_container() {
            return Err(EngineError::Integrity {
                message: format!("document root must be an Object or Array, found {}", root),
            });
        }
        let bytes = serde_json::to_vec(&self.data).map_err(|e| EngineError::Integrity {
            message: format!("document cannot be encoded: {}", e),
        })?;
        serde_json::from_slice::<Json>(&bytes).map_err(|e| EngineError::Integrity {
            message: format!("document does not decode: {}", e),
        })?;
        Ok(())
    }

    // ===== Driver =====

    /// One Scan → Schedule → Execute pass. Returns how many Modifiers ran.
    pub fn run_pass(&mut self) -> EngineResult<usize> {
        let ordered = Self::schedule(self.scan()?);
        let count = ordered.len();
        self.execute(ordered)?;
        Ok(count)
    }

    /// Run passes until a scan finds no invocations.
    ///
    /// Returns the number of passes that did work. Fails with
    /// [`EngineError::PassLimitExceeded`] when invocations remain after
    /// `max_passes` such passes.
    pub fn expand(&mut self) -> EngineResult<usize> {
        let limit = self.config.max_passes;
        for pass in 0..limit {
            let count = self.run_pass()?;
            log::debug!("Pass {} applied {} modifiers", pass + 1, count);
            if count == 0 {
                return Ok(pass);
            }
        }
        if self.scan()?.is_empty() {
            Ok(limit)
        } else {
            Err(EngineError::PassLimitExceeded { limit })
        }
    }
}

fn segment_index(segment: &Segment) -> Option<usize> {
    match segment {
        Segment::Index(index) => Some(*index),
        Segment::Key(key) => key.parse().ok(),
    }
}

#[cfg(test)]
#[path = "converter_test.rs"]
mod tests;
