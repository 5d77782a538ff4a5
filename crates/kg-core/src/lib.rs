//! kg-core - Core types for kubegen
//!
//! This crate provides the pieces shared by the macro engine: the error
//! type, engine configuration, the runtime [`Value`] view of a document
//! node, and [`BranchLocator`] addressing.

pub mod branch;
pub mod config;
pub mod error;
pub mod value;

pub use branch::{BranchLocator, Segment};
pub use config::{EngineConfig, MergePolicy, DEFAULT_DOMAIN};
pub use error::{EngineError, EngineResult};
pub use value::{ArrayEach, Value, ValueType};
