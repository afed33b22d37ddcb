//! Custom predicates attachable to any rule
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::error::{Context, Error, ValidationResult, ValidatorError};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What a custom predicate concluded about a value
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Accept the value
    Pass,
    /// Reject with the generic "Custom validation failed" error
    Fail,
    /// Reject with a caller-built error, reported verbatim
    Reject(ValidatorError),
    /// An untyped answer; `true` accepts, falsy values reject, anything
    /// else breaks the predicate contract
    Value(Value),
}

impl From<bool> for Verdict {
    fn from(accepted: bool) -> Self {
        if accepted {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

impl From<ValidatorError> for Verdict {
    fn from(error: ValidatorError) -> Self {
        Verdict::Reject(error)
    }
}

impl From<Value> for Verdict {
    fn from(value: Value) -> Self {
        Verdict::Value(value)
    }
}

impl From<Result<(), ValidatorError>> for Verdict {
    fn from(result: Result<(), ValidatorError>) -> Self {
        match result {
            Ok(()) => Verdict::Pass,
            Err(error) => Verdict::Reject(error),
        }
    }
}

impl<T: Into<Verdict>> From<Option<T>> for Verdict {
    fn from(option: Option<T>) -> Self {
        match option {
            Some(inner) => inner.into(),
            None => Verdict::Fail,
        }
    }
}

type PredicateFn = dyn Fn(&Value) -> Verdict + Send + Sync;

/// A described, shareable check run after a rule's structural check passes
#[derive(Clone)]
pub struct Predicate {
    description: Arc<str>,
    func: Arc<PredicateFn>,
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Predicate {
    /// Wrap a closure; `description` shows up as the failure context
    pub fn new<D, F, R>(description: D, func: F) -> Self
    where
        D: Into<String>,
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        Self {
            description: Arc::from(description.into()),
            func: Arc::new(move |value: &Value| func(value).into()),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Evaluate against `value`, translating the verdict into a result.
    ///
    /// `label` is the (possibly truncated) description used as context for
    /// the generic failure.
    pub(crate) fn apply(&self, value: &Value, label: &str) -> ValidationResult<()> {
        match (self.func)(value) {
            Verdict::Pass => Ok(()),
            Verdict::Reject(error) => Err(Error::Invalid(error)),
            Verdict::Fail => Err(generic_failure(value, label)),
            Verdict::Value(Value::Bool(true)) => Ok(()),
            Verdict::Value(answer) if !is_truthy(&answer) => Err(generic_failure(value, label)),
            Verdict::Value(answer) => Err(Error::PredicateContract {
                predicate: self.description.to_string(),
                value: answer,
            }),
        }
    }
}

fn generic_failure(value: &Value, label: &str) -> Error {
    Error::Invalid(ValidatorError::new(
        "Custom validation failed",
        value,
        Context::Predicate(label.to_string()),
    ))
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_boolean_verdicts() {
        let positive = Predicate::new("n > 0", |v: &Value| v.as_i64().map_or(false, |n| n > 0));
        assert!(positive.apply(&json!(3), "n > 0").is_ok());

        let err = positive.apply(&json!(-3), "n > 0").unwrap_err();
        let err = err.into_invalid().unwrap();
        assert_eq!(err.msg, "Custom validation failed");
        assert_eq!(err.context, Context::Predicate("n > 0".to_string()));
        assert_eq!(err.target, json!(-3));
    }

    #[test]
    fn test_rejection_is_reported_verbatim() {
        let predicate = Predicate::new("even", |v: &Value| {
            if v.as_i64().map_or(false, |n| n % 2 == 0) {
                Ok(())
            } else {
                Err(ValidatorError::new("Expected an even number", v, Context::Custom(json!("even"))))
            }
        });

        let err = predicate.apply(&json!(5), "even").unwrap_err().into_invalid().unwrap();
        assert_eq!(err.msg, "Expected an even number");
        assert_eq!(err.context, Context::Custom(json!("even")));
    }

    #[test]
    fn test_falsy_values_fail_generically() {
        for falsy in [json!(null), json!(false), json!(0), json!(""), json!(0.0)] {
            let answer = falsy.clone();
            let predicate = Predicate::new("falsy", move |_: &Value| answer.clone());
            let err = predicate.apply(&json!(1), "falsy").unwrap_err();
            assert!(!err.is_fatal(), "{} should be an ordinary failure", falsy);
        }
    }

    #[test]
    fn test_truthy_non_boolean_breaks_the_contract() {
        for truthy in [json!(1), json!("yes"), json!([]), json!({})] {
            let answer = truthy.clone();
            let predicate = Predicate::new("sloppy", move |_: &Value| answer.clone());
            let err = predicate.apply(&json!(1), "sloppy").unwrap_err();
            assert!(err.is_fatal(), "{} should abort validation", truthy);
        }

        let predicate = Predicate::new("strict", |_: &Value| json!(true));
        assert!(predicate.apply(&json!(1), "strict").is_ok());
    }

    #[test]
    fn test_none_fails() {
        let predicate = Predicate::new("lookup", |v: &Value| v.as_str().map(|s| s == "ok"));
        assert!(predicate.apply(&json!("ok"), "lookup").is_ok());
        assert!(predicate.apply(&json!(3), "lookup").is_err());
    }
}
