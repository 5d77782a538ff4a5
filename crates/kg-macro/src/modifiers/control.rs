//! Phase A and B: If and Lookup

use crate::converter::Converter;
use crate::modifier::{Modifier, ModifierCallback};
use kg_core::{EngineError, EngineResult, Segment, ValueType};
use serde_json::Value as Json;

/// Replace the host with the named parameter.
///
/// The input must be a String naming the parameter, and the parameter's
/// type must match the macro's return type.
pub fn make_lookup(modifier: &Modifier) -> EngineResult<ModifierCallback> {
    let input = modifier.input.clone();
    let host = modifier.host();
    let expected = modifier.macro_def.return_type;
    let callback: ModifierCallback = Box::new(move |c: &mut Converter| {
        let value = c.value(&input)?;
        let name = value.as_str().unwrap_or_default();
        let found = c
            .parameter(name)
            .cloned()
            .ok_or_else(|| EngineError::UndefinedParameter {
                name: name.to_string(),
            })?;
        let found_type = ValueType::of(&found);
        if found_type != expected {
            return Err(EngineError::Type {
                branch: host.to_string(),
                expected: expected.to_string(),
                found: found_type.to_string(),
            });
        }
        c.set(&host, found)
    });
    Ok(Converter::type_check_modifier(
        modifier.input.clone(),
        ValueType::String,
        callback,
    ))
}

/// Replace the host with its `then` or `else` member, chosen by a Boolean
/// input.
///
/// With no matching member the host is removed from its parent object, or
/// nulled when it is an array element so sibling indices stay put.
pub fn make_if(modifier: &Modifier) -> EngineResult<ModifierCallback> {
    let input = modifier.input.clone();
    let host = modifier.host();
    let callback: ModifierCallback = Box::new(move |c: &mut Converter| {
        let condition = c.value(&input)?.content().as_bool().unwrap_or(false);
        let arm = host.child_key(if condition { "then" } else { "else" });
        match arm.resolve(c.document()).cloned() {
            Some(chosen) => c.set(&host, chosen),
            None => match host.last() {
                Some(Segment::Key(_)) => c.delete(&host),
                Some(Segment::Index(_)) => c.set(&host, Json::Null),
                None => Err(EngineError::Integrity {
                    message: format!(
                        "root-level If has no '{}' branch to replace the document with",
                        if condition { "then" } else { "else" }
                    ),
                }),
            },
        }
    });
    Ok(Converter::type_check_modifier(
        modifier.input.clone(),
        ValueType::Boolean,
        callback,
    ))
}

#[cfg(test)]
#[path = "control_test.rs"]
mod tests;
