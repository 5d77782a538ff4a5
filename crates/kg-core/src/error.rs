//! Error types for kg-core

use thiserror::Error;

/// Macro engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    /// M001: Content is not valid structured data
    #[error("[M001] Decode error: {message}")]
    Decode { message: String },

    /// M002: Node type does not match what the macro consumes or produces
    #[error("[M002] Type error at '{branch}': expected {expected}, found {found}")]
    Type {
        branch: String,
        expected: String,
        found: String,
    },

    /// M003: Import/merge precondition violated
    #[error("[M003] Merge error: {message}")]
    Merge { message: String },

    /// M004: Failed to produce JSON, YAML or base64 output
    #[error("[M004] Encode error: {message}")]
    Encode { message: String },

    /// M005: Document is no longer well-formed after a write
    #[error("[M005] Integrity error: {message}")]
    Integrity { message: String },

    /// M006: Key carries the macro domain prefix but names no known macro
    #[error("[M006] Unknown macro '{key}' at '{branch}'")]
    UnknownMacro { key: String, branch: String },

    /// M007: More than one macro invocation inside a single object
    #[error("[M007] Object at '{branch}' holds more than one macro: {first}, {second}")]
    DuplicateMacro {
        branch: String,
        first: String,
        second: String,
    },

    /// M008: Branch does not resolve against the current document
    #[error("[M008] Branch '{branch}' not found in document")]
    BranchNotFound { branch: String },

    /// M009: No import payload was supplied for a LoadJSON invocation
    #[error("[M009] No import payload for '{branch}'")]
    ImportNotFound { branch: String },

    /// M010: Lookup names a parameter that is not defined
    #[error("[M010] Undefined parameter '{name}'. Define it in the parameters: section of the engine config")]
    UndefinedParameter { name: String },

    /// M011: Expansion kept discovering macros after the configured pass limit
    #[error("[M011] Macro expansion did not settle after {limit} passes")]
    PassLimitExceeded { limit: usize },

    /// M012: A modifier failed; wraps the underlying error with its identity
    #[error("[M012] {macro_id} at '{branch}' failed: {source}")]
    Modifier {
        macro_id: String,
        branch: String,
        #[source]
        source: Box<EngineError>,
    },

    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: IO error with file path context
    #[error("[C003] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Strip any [`EngineError::Modifier`] context and return the innermost error
    pub fn root_cause(&self) -> &EngineError {
        match self {
            EngineError::Modifier { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Decode {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for EngineError {
    fn from(err: serde_yaml::Error) -> Self {
        EngineError::ConfigInvalid {
            message: err.to_string(),
        }
    }
}
