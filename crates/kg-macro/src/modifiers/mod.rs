//! Per-macro callback builders.
//!
//! Each `make_*` function turns a [`Modifier`](crate::Modifier) into the
//! [`ModifierCallback`](crate::ModifierCallback) that performs it. Input type
//! requirements are enforced with
//! [`Converter::type_check_modifier`](crate::Converter::type_check_modifier)
//! rather than inside the callbacks.

pub mod control;
pub mod load_json;
pub mod strings;
