//! Phase C importer: LoadJSON.
//!
//! Imports caller-supplied JSON and combines it with the object holding the
//! invocation. A root-level invocation (branch depth 1) targets the whole
//! document; anything deeper targets the invocation's host object.

use crate::converter::Converter;
use crate::modifier::{Modifier, ModifierCallback};
use kg_core::{BranchLocator, EngineError, EngineResult, MergePolicy, ValueType};
use serde_json::map::Entry;
use serde_json::{Map, Value as Json};

pub fn make_load_json(modifier: &Modifier) -> EngineResult<ModifierCallback> {
    let payload = modifier
        .payload
        .clone()
        .ok_or_else(|| EngineError::ImportNotFound {
            branch: modifier.host().to_string(),
        })?;
    let branch = modifier.branch.clone();
    let return_type = modifier.macro_def.return_type;
    Ok(Box::new(move |c: &mut Converter| {
        c.atomically(|c| load_json(c, &branch, return_type, &payload))
    }))
}

/// Merge or replace the target of the invocation at `branch` with `new_data`.
///
/// Callers must run this inside [`Converter::atomically`]: the invocation is
/// deleted before the combined value is written.
pub fn load_json(
    c: &mut Converter,
    branch: &BranchLocator,
    return_type: ValueType,
    new_data: &[u8],
) -> EngineResult<()> {
    let is_root = branch.depth() == 1;
    let target = if is_root {
        BranchLocator::root()
    } else {
        branch.parent().unwrap_or_default()
    };

    if return_type == ValueType::Array && is_root {
        return Err(merge_error("cannot insert array in place of root object"));
    }

    let old_data = target
        .resolve(c.document())
        .cloned()
        .ok_or_else(|| merge_error("old data is empty"))?;
    let old_type = ValueType::of(&old_data);
    let Json::Object(mut old_obj) = old_data else {
        return Err(merge_error(format!(
            "old data at '{}' is {}, not an object",
            target, old_type
        )));
    };

    if let Some(key) = branch.last().and_then(|segment| segment.as_key()) {
        old_obj.remove(key);
    }

    let new_value: Json = serde_json::from_slice(new_data).map_err(|e| EngineError::Decode {
        message: format!("cannot decode imported data: {}", e),
    })?;

    let new_type = ValueType::of(&new_value);
    let combined = match return_type {
        ValueType::Object => {
            let Json::Object(new_obj) = new_value else {
                return Err(merge_error(format!(
                    "imported data is {}, not an object",
                    new_type
                )));
            };
            merge_objects(&mut old_obj, new_obj, c.config().merge_policy);
            Json::Object(old_obj)
        }
        ValueType::Array => {
            if !old_obj.is_empty() {
                let keys: Vec<&str> = old_obj.keys().map(String::as_str).collect();
                return Err(merge_error(format!(
                    "unexpected keys, cannot replace with array: {}",
                    keys.join(", ")
                )));
            }
            if new_type != ValueType::Array {
                return Err(merge_error(format!(
                    "imported data is {}, not an array",
                    new_type
                )));
            }
            new_value
        }
        other => {
            return Err(merge_error(format!("LoadJSON cannot produce {}", other)));
        }
    };

    c.delete(branch)?;
    if is_root {
        c.replace_document(combined)
    } else {
        c.set(&target, combined)
    }
}

/// Deep-merge `src` into `dst`. Nested objects are merged key by key; other
/// collisions are settled by `policy`.
pub fn merge_objects(dst: &mut Map<String, Json>, src: Map<String, Json>, policy: MergePolicy) {
    for (key, incoming) in src {
        match dst.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(incoming);
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), incoming) {
                (Json::Object(existing), Json::Object(incoming)) => {
                    merge_objects(existing, incoming, policy)
                }
                (existing, incoming) => {
                    if policy == MergePolicy::Overwrite {
                        *existing = incoming;
                    }
                }
            },
        }
    }
}

fn merge_error(message: impl Into<String>) -> EngineError {
    EngineError::Merge {
        message: message.into(),
    }
}

#[cfg(test)]
#[path = "load_json_test.rs"]
mod tests;
