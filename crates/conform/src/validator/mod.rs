//! Compiled validators and union resolution
//!
//! A [`Validator`] is an ordered set of alternatives. It accepts a value as
//! soon as one alternative does; when every alternative fails, the failure
//! with the deepest path is reported.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub(crate) mod array;
pub(crate) mod object;
pub(crate) mod primitive;
pub(crate) mod string;

use crate::compiler::Compiler;
use crate::error::{
    CompileResult, Error, PathSegment, ValidationErrors, ValidationResult, ValidatorError,
};
use crate::predicate::Predicate;
use crate::rule::RuleInput;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use array::ArrayValidator;
use object::ObjectValidator;
use primitive::PrimitiveValidator;
use string::StringValidator;

pub use primitive::type_tag;

/// The structural check of one alternative
#[derive(Debug, Clone)]
pub(crate) enum SchemaKind {
    Wildcard,
    Primitive(PrimitiveValidator),
    String(StringValidator),
    Object(ObjectValidator),
    Array(ArrayValidator),
    /// A nested union, or a reused compiled validator
    Union(Validator),
}

/// Predicate run once the structural check has passed
#[derive(Debug, Clone)]
pub(crate) struct CustomCheck {
    pub(crate) predicate: Predicate,
    /// Description truncated for failure context
    pub(crate) label: String,
}

/// One compiled alternative
#[derive(Debug, Clone)]
pub(crate) struct Schema {
    pub(crate) kind: SchemaKind,
    pub(crate) custom: Option<CustomCheck>,
}

impl Schema {
    pub(crate) fn new(kind: SchemaKind) -> Self {
        Self { kind, custom: None }
    }

    pub(crate) fn validate(&self, value: &Value) -> ValidationResult<()> {
        match &self.kind {
            SchemaKind::Wildcard => {}
            SchemaKind::Primitive(primitive) => primitive.validate(value)?,
            SchemaKind::String(string) => string.validate(value)?,
            SchemaKind::Object(object) => object.validate(value)?,
            SchemaKind::Array(array) => array.validate(value)?,
            SchemaKind::Union(union) => union.validate(value)?,
        }

        match &self.custom {
            Some(check) => check.predicate.apply(value, &check.label),
            None => Ok(()),
        }
    }

    fn describe(&self) -> String {
        match &self.kind {
            SchemaKind::Wildcard => "any".to_string(),
            SchemaKind::Primitive(primitive) => primitive.describe(),
            SchemaKind::String(string) => string.describe(),
            SchemaKind::Object(_) => "object".to_string(),
            SchemaKind::Array(array) => array.describe(),
            SchemaKind::Union(union) => union.describe(),
        }
    }
}

/// An immutable, compiled rule tree.
///
/// Cloning is cheap and the tree can be shared across threads; `validate`
/// never mutates it.
#[derive(Clone)]
pub struct Validator {
    alternatives: Arc<[Schema]>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({})", self.describe())
    }
}

impl Validator {
    /// Compile a rule with the default configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conform::{RuleSpec, Validator};
    /// use serde_json::json;
    ///
    /// let validator = Validator::new(RuleSpec::typed("number")).unwrap();
    /// assert!(validator.validate(&json!(42)).is_ok());
    /// assert!(validator.validate(&json!("42")).is_err());
    /// ```
    pub fn new<R: Into<RuleInput>>(rule: R) -> CompileResult<Self> {
        Compiler::new().compile(rule)
    }

    /// A validator with no alternatives, which accepts everything
    pub fn wildcard() -> Self {
        Self::from_schemas(Vec::new())
    }

    pub(crate) fn from_schemas(schemas: Vec<Schema>) -> Self {
        Self {
            alternatives: schemas.into(),
        }
    }

    /// Number of alternatives
    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Validate a value.
    ///
    /// `Err(Error::Invalid(_))` is an ordinary rejection;
    /// `Err(Error::PredicateContract { .. })` means a custom predicate broke
    /// its contract and validation was aborted.
    pub fn validate(&self, value: &Value) -> ValidationResult<()> {
        let alternatives = &self.alternatives[..];
        match alternatives {
            [] => Ok(()),
            [only] => only.validate(value),
            _ => {
                let mut best: Option<ValidatorError> = None;

                for (index, schema) in alternatives.iter().enumerate() {
                    let mut error = match schema.validate(value) {
                        Ok(()) => return Ok(()),
                        Err(Error::Invalid(error)) => error,
                        Err(fatal) => return Err(fatal),
                    };

                    error.add_path(PathSegment::alternative(index));
                    error.alternative = Some(index);
                    trace!(alternative = index, path = %error.path, "union alternative rejected value");

                    let deeper = best
                        .as_ref()
                        .map_or(true, |current| path_depth(current) < path_depth(&error));
                    if deeper {
                        best = Some(error);
                    }
                }

                match best {
                    Some(error) => Err(Error::Invalid(error)),
                    None => Ok(()),
                }
            }
        }
    }

    /// Whether the value is accepted; contract violations still propagate
    pub fn accepts(&self, value: &Value) -> ValidationResult<bool> {
        match self.validate(value) {
            Ok(()) => Ok(true),
            Err(Error::Invalid(_)) => Ok(false),
            Err(fatal) => Err(fatal),
        }
    }

    /// Validate several documents, collecting one failure per document.
    ///
    /// Each failure's path is prefixed with the document's index. A
    /// predicate contract violation aborts the whole batch.
    pub fn validate_batch(&self, values: &[Value], config: &BatchConfig) -> ValidationResult<ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for (index, value) in values.iter().enumerate() {
            match self.validate(value) {
                Ok(()) => continue,
                Err(Error::Invalid(error)) => {
                    errors.add(error.with_path(index));

                    if config.fail_fast {
                        break;
                    }

                    if config.max_errors > 0 && errors.len() >= config.max_errors {
                        break;
                    }
                }
                Err(fatal) => return Err(fatal),
            }
        }

        Ok(errors)
    }

    /// Short human-readable rendering of the rule tree
    pub fn describe(&self) -> String {
        match &self.alternatives[..] {
            [] => "any".to_string(),
            [only] => only.describe(),
            alternatives => alternatives
                .iter()
                .map(Schema::describe)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

fn path_depth(error: &ValidatorError) -> usize {
    error.path.chars().count()
}

/// Configuration for batch validation
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Whether to stop on the first failing document
    pub fail_fast: bool,
    /// Maximum number of failures to collect (0 = unlimited)
    pub max_errors: usize,
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fail-fast mode
    pub fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Set maximum number of failures to collect
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleSpec;
    use serde_json::json;

    fn typed(name: &str) -> RuleSpec {
        RuleSpec::typed(name)
    }

    #[test]
    fn test_wildcard_accepts_everything() {
        let validator = Validator::wildcard();
        assert!(validator.is_empty());
        for value in [json!(null), json!(1), json!("s"), json!([]), json!({"a": 1})] {
            assert!(validator.validate(&value).is_ok());
        }
    }

    #[test]
    fn test_single_alternative_is_not_decorated() {
        let validator = Validator::new(vec![typed("number")]).unwrap();
        assert_eq!(validator.len(), 1);

        let err = validator.validate(&json!("x")).unwrap_err().into_invalid().unwrap();
        assert_eq!(err.path, "");
        assert_eq!(err.alternative, None);
    }

    #[test]
    fn test_first_success_wins() {
        let validator = Validator::new(vec![typed("string"), typed("number")]).unwrap();
        assert!(validator.validate(&json!("x")).is_ok());
        assert!(validator.validate(&json!(3)).is_ok());
    }

    #[test]
    fn test_tie_keeps_earliest_alternative() {
        let validator = Validator::new(vec![typed("string"), typed("number")]).unwrap();
        let err = validator.validate(&json!(true)).unwrap_err().into_invalid().unwrap();
        assert_eq!(err.path, "{validator[0]}");
        assert_eq!(err.alternative, Some(0));
        assert_eq!(err.msg, "Expected a string, but got a boolean instead");
    }

    #[test]
    fn test_deepest_failure_is_reported() {
        let validator = Validator::new(vec![
            typed("number"),
            typed("object").set(
                "mandatory",
                crate::rule::RuleOption::members([("name", typed("string"))]),
            ),
        ])
        .unwrap();

        let err = validator.validate(&json!({"name": 7})).unwrap_err().into_invalid().unwrap();
        assert_eq!(err.path, "{validator[1]}.name");
        assert_eq!(err.alternative, Some(1));
    }

    #[test]
    fn test_batch_collects_per_document_failures() {
        let validator = Validator::new(typed("number")).unwrap();
        let values = vec![json!(1), json!("two"), json!(3), json!(null)];

        let errors = validator.validate_batch(&values, &BatchConfig::new()).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.errors[0].path, "[1]");
        assert_eq!(errors.errors[1].path, "[3]");

        let errors = validator
            .validate_batch(&values, &BatchConfig::new().with_fail_fast())
            .unwrap();
        assert_eq!(errors.len(), 1);

        let errors = validator
            .validate_batch(&values, &BatchConfig::new().with_max_errors(1))
            .unwrap();
        assert_eq!(errors.len(), 1);

        let errors = validator.validate_batch(&[json!(5)], &BatchConfig::new()).unwrap();
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn test_describe() {
        let validator = Validator::new(vec![typed("string"), typed("number")]).unwrap();
        assert_eq!(validator.describe(), "string | number");
        assert_eq!(Validator::wildcard().describe(), "any");
    }
}
