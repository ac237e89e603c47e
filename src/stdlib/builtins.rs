//! Built-in Functions Registry
//!
//! The frozen catalogue of callables every L program starts with. Entries
//! are installed into the symbol table before analysis and never removed.

use std::collections::HashMap;

use crate::types::Type;

/// User-defined functions whose name collides with one of these built-ins
/// take String parameters; everything else takes Double. This is a language
/// feature of L's informal type system, not a lookup shortcut.
pub const STRING_PARAM_NAMES: &[&str] = &[
    "concat",
    "reverse",
    "uppercase",
    "lowercase",
    "is_empty",
    "is_numeric",
    "create_file",
    "delete_file",
    "copy_file",
    "move_file",
    "get_wd",
    "get_username",
    "get_user_home_dir",
    "change_dir",
    "get_env",
    "contains",
    "index_of",
    "repeat_string",
    "capitalize",
];

/// Check the name-based parameter heuristic
pub fn takes_string_params(name: &str) -> bool {
    STRING_PARAM_NAMES.contains(&name)
}

/// Built-in function signature
#[derive(Debug, Clone)]
pub struct BuiltinFunc {
    pub name: &'static str,
    pub params: Vec<Type>,
    pub ret_type: Type,
    /// `print` accepts any number of String/Double arguments
    pub variadic: bool,
}

/// Registry of all built-in functions
pub struct BuiltinRegistry {
    functions: HashMap<&'static str, BuiltinFunc>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };
        registry.register_all();
        registry
    }

    fn register_all(&mut self) {
        use Type::{Boolean, Double, String, Void};

        // I/O
        self.register_variadic("print", Void);

        // String manipulation
        self.register("length", &[String], Double);
        self.register("capitalize", &[String], String);
        self.register("uppercase", &[String], String);
        self.register("lowercase", &[String], String);
        self.register("is_empty", &[String], Boolean);
        self.register("is_numeric", &[String], Boolean);
        self.register("concat", &[String, String], String);
        self.register("contains", &[String, String], Boolean);
        self.register("index_of", &[String, String], Double);
        self.register("repeat_string", &[String, Double], String);
        self.register("reverse", &[String], String);
        self.register("is_palindrome", &[String], Boolean);

        // Arithmetic
        self.register("add", &[Double, Double], Double);
        self.register("subtract", &[Double, Double], Double);
        self.register("multiply", &[Double, Double], Double);
        self.register("divide", &[Double, Double], Double);
        self.register("max", &[Double, Double], Double);
        self.register("min", &[Double, Double], Double);
        self.register("abs", &[Double], Double);
        self.register("compare", &[Double, Double], Double);
        self.register("factorial", &[Double], Double);
        self.register("is_prime", &[Double], Boolean);
        self.register("average", &[Double, Double], Double);
        self.register("round", &[Double], Double);
        self.register("floor", &[Double], Double);
        self.register("ceil", &[Double], Double);
        self.register("is_even", &[Double], Boolean);
        self.register("is_odd", &[Double], Boolean);
        self.register("digit_sum", &[Double], Double);
        self.register("is_divisible", &[Double, Double], Boolean);
        self.register("modulus", &[Double, Double], Double);
        self.register("in_range", &[Double, Double, Double], Boolean);
        self.register("random_num", &[Double, Double], Double);
        self.register("square", &[Double], Double);
        self.register("cube", &[Double], Double);
        self.register("percent_of", &[Double, Double], Double);
        self.register("roll_dice", &[], Double);
        self.register("distance", &[Double, Double, Double, Double], Double);
        self.register("is_positive", &[Double], Boolean);
        self.register("is_greater", &[Double, Double], Boolean);

        // Filesystem
        self.register("create_file", &[String], Boolean);
        self.register("delete_file", &[String], Boolean);
        self.register("copy_file", &[String, String], Boolean);
        self.register("move_file", &[String, String], Boolean);

        // Process and environment
        self.register("exec", &[String], String);
        self.register("get_wd", &[], String);
        self.register("get_username", &[], String);
        self.register("get_user_home_dir", &[], String);
        self.register("change_dir", &[String], Boolean);
        self.register("get_env", &[String], String);
    }

    fn register(&mut self, name: &'static str, params: &[Type], ret_type: Type) {
        self.functions.insert(
            name,
            BuiltinFunc {
                name,
                params: params.to_vec(),
                ret_type,
                variadic: false,
            },
        );
    }

    fn register_variadic(&mut self, name: &'static str, ret_type: Type) {
        self.functions.insert(
            name,
            BuiltinFunc {
                name,
                params: Vec::new(),
                ret_type,
                variadic: true,
            },
        );
    }

    /// Check if a function is a built-in
    pub fn is_builtin(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Get a built-in function by name
    pub fn get(&self, name: &str) -> Option<&BuiltinFunc> {
        self.functions.get(name)
    }

    /// Iterate over all built-in functions
    pub fn all(&self) -> impl Iterator<Item = &BuiltinFunc> {
        self.functions.values()
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_size() {
        let registry = BuiltinRegistry::new();
        assert_eq!(registry.all().count(), 51);
    }

    #[test]
    fn test_signatures() {
        let registry = BuiltinRegistry::new();
        let concat = registry.get("concat").unwrap();
        assert_eq!(concat.params, vec![Type::String, Type::String]);
        assert_eq!(concat.ret_type, Type::String);

        let in_range = registry.get("in_range").unwrap();
        assert_eq!(in_range.params.len(), 3);
        assert_eq!(in_range.ret_type, Type::Boolean);

        assert!(registry.get("print").unwrap().variadic);
        assert!(!registry.is_builtin("mystery"));
    }

    #[test]
    fn test_string_param_heuristic() {
        assert!(takes_string_params("concat"));
        assert!(takes_string_params("get_env"));
        assert!(!takes_string_params("add"));
        assert!(!takes_string_params("is_prime"));
    }
}
