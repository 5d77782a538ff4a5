//! Phase D string functions: Join, AsJSON, AsYAML, AsBASE64

use crate::converter::Converter;
use crate::modifier::{Modifier, ModifierCallback};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use kg_core::{EngineError, EngineResult, ValueType};
use serde_json::Value as Json;

/// Concatenate the elements of an Array input, no separator
pub fn make_join(modifier: &Modifier) -> EngineResult<ModifierCallback> {
    let input = modifier.input.clone();
    let host = modifier.host();
    let callback: ModifierCallback = Box::new(move |c: &mut Converter| {
        let value = c.value(&input)?;
        let joined: String = value
            .array_each()?
            .map(|(_, item, _)| kg_core::Value::text_of(item))
            .collect();
        c.set(&host, joined)
    });
    Ok(Converter::type_check_modifier(
        modifier.input.clone(),
        ValueType::Array,
        callback,
    ))
}

/// Canonical JSON text of any input
pub fn make_as_json(modifier: &Modifier) -> EngineResult<ModifierCallback> {
    let input = modifier.input.clone();
    let host = modifier.host();
    Ok(Box::new(move |c: &mut Converter| {
        let js = c.value(&input)?.string_as_json()?;
        c.set(&host, js)
    }))
}

/// YAML text of any input
pub fn make_as_yaml(modifier: &Modifier) -> EngineResult<ModifierCallback> {
    let input = modifier.input.clone();
    let host = modifier.host();
    Ok(Box::new(move |c: &mut Converter| {
        let js = c.value(&input)?.bytes_as_json()?;
        let generic: Json = serde_json::from_slice(&js).map_err(|e| EngineError::Encode {
            message: format!("cannot decode JSON for YAML conversion: {}", e),
        })?;
        let yaml = serde_yaml::to_string(&generic).map_err(|e| EngineError::Encode {
            message: format!("cannot encode YAML: {}", e),
        })?;
        c.set(&host, yaml)
    }))
}

/// Base64 of a String input's raw bytes, or of any other input's canonical
/// JSON
pub fn make_as_base64(modifier: &Modifier) -> EngineResult<ModifierCallback> {
    let input = modifier.input.clone();
    let host = modifier.host();
    Ok(Box::new(move |c: &mut Converter| {
        let value = c.value(&input)?;
        let data = match value.as_str() {
            Some(s) => s.as_bytes().to_vec(),
            None => value.bytes_as_json()?,
        };
        c.set(&host, STANDARD.encode(data))
    }))
}

#[cfg(test)]
#[path = "strings_test.rs"]
mod tests;
