//! L standard library surface

pub mod builtins;

pub use builtins::{takes_string_params, BuiltinFunc, BuiltinRegistry, STRING_PARAM_NAMES};
