//! Type tag and structural class checks
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::error::{Context, ValidatorError};
use crate::rule::Class;
use serde_json::Value;

/// Runtime type tag of a value
pub fn type_tag(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone)]
pub(crate) enum PrimitiveValidator {
    /// The value's type tag must equal the expected one
    TypeOf(String),
    /// The value must belong to the class
    InstanceOf(Class),
}

impl PrimitiveValidator {
    pub(crate) fn validate(&self, value: &Value) -> Result<(), ValidatorError> {
        match self {
            PrimitiveValidator::TypeOf(expected) => {
                let actual = type_tag(value);
                if actual == expected.as_str() {
                    return Ok(());
                }
                Err(ValidatorError::new(
                    format!("Expected type {}, but got {} instead", expected, actual),
                    value,
                    Context::Type(expected.clone()),
                ))
            }
            PrimitiveValidator::InstanceOf(class) => {
                if class.contains(value) {
                    return Ok(());
                }
                Err(ValidatorError::new(
                    format!(
                        "Expected {}, but got {} instead",
                        class.name(),
                        Class::name_of(value)
                    ),
                    value,
                    Context::Class(class.name().to_string()),
                ))
            }
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            PrimitiveValidator::TypeOf(expected) => expected.clone(),
            PrimitiveValidator::InstanceOf(class) => class.name().to_string(),
        }
    }
}
