//! String validator
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::primitive::type_tag;
use crate::error::{Context, ValidatorError};
use regex::Regex;
use serde_json::Value;

#[derive(Debug, Clone)]
pub(crate) struct StringValidator {
    /// `None` matches anything
    pattern: Option<Regex>,
}

impl StringValidator {
    pub(crate) fn new(pattern: Option<Regex>) -> Self {
        Self { pattern }
    }

    pub(crate) fn validate(&self, value: &Value) -> Result<(), ValidatorError> {
        let text = value.as_str().ok_or_else(|| {
            ValidatorError::new(
                format!("Expected a string, but got a {} instead", type_tag(value)),
                value,
                Context::Type("string".to_string()),
            )
        })?;

        match &self.pattern {
            Some(pattern) if !pattern.is_match(text) => Err(ValidatorError::new(
                "String does not match the pattern",
                value,
                Context::Pattern(pattern.as_str().to_string()),
            )),
            _ => Ok(()),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match &self.pattern {
            Some(pattern) => format!("string /{}/", pattern.as_str()),
            None => "string".to_string(),
        }
    }
}
