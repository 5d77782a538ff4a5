//! Engine configuration, usually read from a YAML file

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Default macro identifier prefix
pub const DEFAULT_DOMAIN: &str = "kubegen";

/// How an imported object is combined with the object it lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Keys already present are kept; imported values only fill gaps
    #[default]
    KeepExisting,
    /// Imported values replace existing scalars and arrays
    Overwrite,
}

impl std::fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergePolicy::KeepExisting => write!(f, "keep_existing"),
            MergePolicy::Overwrite => write!(f, "overwrite"),
        }
    }
}

/// Macro engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Prefix of every macro identifier (`<domain>.<Type>.<Verb>`)
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Merge policy for object-returning LoadJSON
    #[serde(default)]
    pub merge_policy: MergePolicy,

    /// Upper bound on scan/schedule/execute passes during expansion
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,

    /// Suffix of the sibling key that carries arguments for a `true` flag
    #[serde(default = "default_args_suffix")]
    pub args_suffix: String,

    /// Values available to Lookup macros
    #[serde(default)]
    pub parameters: HashMap<String, serde_yaml::Value>,
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_max_passes() -> usize {
    32
}

fn default_args_suffix() -> String {
    "_args".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            merge_policy: MergePolicy::default(),
            max_passes: default_max_passes(),
            args_suffix: default_args_suffix(),
            parameters: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            return Err(EngineError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| EngineError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> EngineResult<()> {
        if self.domain.is_empty() || self.domain.contains('.') {
            return Err(EngineError::ConfigInvalid {
                message: format!(
                    "domain '{}' must be non-empty and must not contain '.'",
                    self.domain
                ),
            });
        }

        if self.max_passes == 0 {
            return Err(EngineError::ConfigInvalid {
                message: "max_passes must be at least 1".to_string(),
            });
        }

        if self.args_suffix.is_empty() {
            return Err(EngineError::ConfigInvalid {
                message: "args_suffix cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Builder-style parameter insertion, mostly for embedding callers
    pub fn with_parameter(mut self, name: impl Into<String>, value: serde_yaml::Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Parameters converted to JSON for use inside the document
    pub fn json_parameters(&self) -> HashMap<String, serde_json::Value> {
        self.parameters
            .iter()
            .map(|(k, v)| (k.clone(), yaml_to_json(v)))
            .collect()
    }
}

/// Convert a YAML parameter into the JSON node Lookup writes into a
/// document. Tags are dropped. Mapping keys that are not strings have no
/// JSON spelling and are skipped with a warning.
pub fn yaml_to_json(yaml: &serde_yaml::Value) -> serde_json::Value {
    use serde_json::Value as Json;
    use serde_yaml::Value as Yaml;

    match yaml {
        Yaml::Null => Json::Null,
        Yaml::Bool(b) => Json::Bool(*b),
        Yaml::Number(n) => convert_yaml_number(n),
        Yaml::String(s) => Json::String(s.clone()),
        Yaml::Sequence(items) => Json::Array(items.iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => {
            let mut members = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                match key.as_str() {
                    Some(name) => {
                        members.insert(name.to_string(), yaml_to_json(value));
                    }
                    None => log::warn!("Skipping parameter member with non-string key {:?}", key),
                }
            }
            Json::Object(members)
        }
        Yaml::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

/// JSON has no NaN or Infinity, so those become null
fn convert_yaml_number(n: &serde_yaml::Number) -> serde_json::Value {
    let number = if let Some(i) = n.as_i64() {
        Some(i.into())
    } else if let Some(u) = n.as_u64() {
        Some(u.into())
    } else {
        n.as_f64().and_then(serde_json::Number::from_f64)
    };
    match number {
        Some(number) => serde_json::Value::Number(number),
        None => {
            log::warn!("Parameter number {} has no JSON form; using null", n);
            serde_json::Value::Null
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
