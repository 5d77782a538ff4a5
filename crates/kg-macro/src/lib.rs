//! kg-macro - Macro expansion engine for kubegen
//!
//! Documents may embed macro invocations as object members keyed by
//! `<domain>.<ReturnType>.<VerbName>`, e.g. `kubegen.String.Join`. The
//! [`Converter`] discovers them, orders them deepest-first then by
//! [`EvalPhase`], and rewrites the document one invocation at a time until
//! only literal values remain.
//!
//! ```
//! use kg_core::EngineConfig;
//! use kg_macro::Converter;
//! use serde_json::json;
//!
//! let doc = json!({"name": {"kubegen.String.Join": ["web", "-", "1"]}});
//! let mut converter = Converter::new(doc, EngineConfig::default()).unwrap();
//! converter.expand().unwrap();
//! assert_eq!(converter.document(), &json!({"name": "web-1"}));
//! ```

pub mod converter;
pub mod imports;
pub mod macros;
pub mod modifier;
pub mod modifiers;

pub use converter::{Converter, NewValue};
pub use imports::{ImportResolver, MemoryImports, NoImports};
pub use macros::{EvalPhase, Macro, Verb, MACROS};
pub use modifier::{Modifier, ModifierCallback};
