//! Conform - declarative structural validation of JSON-like values
//!
//! A rule specification is compiled once into an immutable validator tree,
//! which can then check any number of values. A rejected value is reported
//! with a single [`ValidatorError`] whose path points at the offending
//! sub-value.
//!
//! ## Rule kinds
//!
//! - **Typed**: `{"type": "number"}` compares the value's type tag;
//!   `{"type": {"class": "Integer"}}` checks structural class membership
//! - **String**: `{"type": "string", "match": "^[a-z]+$"}`
//! - **Object**: `mandatory`, `optional`, `any` and `inclusive` options
//! - **Array**: `pattern` with `?`, `+`, `*` quantifiers, `minLength`,
//!   `maxLength`, `repeat`, `align_end`, `all`
//! - **Wildcard**: `{}` accepts anything
//! - **Union**: a list of rules; the first alternative that accepts wins
//!
//! Any rule can carry a custom predicate, run after its structural check.
//!
//! ## Quick Start
//!
//! ```rust
//! use conform::compile_json;
//! use serde_json::json;
//!
//! let validator = compile_json(&json!({
//!     "type": "object",
//!     "mandatory": {"id": {"type": "number"}},
//!     "optional": {"age": {"type": "number"}}
//! }))
//! .unwrap();
//!
//! assert!(validator.validate(&json!({"id": 1, "age": 30})).is_ok());
//!
//! let err = validator.validate(&json!({"id": 1, "age": "x"})).unwrap_err();
//! assert_eq!(err.as_invalid().unwrap().path, ".age");
//! ```
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod compiler;
pub mod error;
pub mod loader;
pub mod predicate;
pub mod rule;
pub mod validator;

// Re-export commonly used types for convenience
pub use compiler::{Compiler, CompilerConfig};
pub use error::{
    CompileError, CompileResult, Context, Error, PathSegment, ValidationErrors, ValidationResult,
    ValidatorError,
};
pub use loader::{load_rule_file, Format, LoaderError, LoaderResult, RuleLoader};
pub use predicate::{Predicate, Verdict};
pub use rule::{Class, PatternItem, RuleInput, RuleOption, RuleSpec, TypeRef};
pub use validator::{type_tag, BatchConfig, Validator};

use serde_json::Value;

/// Compile a rule with the default configuration
pub fn compile<R: Into<RuleInput>>(rule: R) -> CompileResult<Validator> {
    Compiler::new().compile(rule)
}

/// Parse and compile a JSON rule document
///
/// # Examples
///
/// ```rust
/// use conform::compile_json;
/// use serde_json::json;
///
/// let validator = compile_json(&json!([{"type": "string"}, {"type": "number"}])).unwrap();
/// assert!(validator.validate(&json!(3)).is_ok());
/// assert!(validator.validate(&json!(true)).is_err());
/// ```
pub fn compile_json(document: &Value) -> CompileResult<Validator> {
    compile(RuleInput::from_json(document)?)
}
