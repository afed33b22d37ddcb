//! Array validator with positional patterns and quantifiers
//!
//! The pattern is matched in a single committed pass: a greedy quantifier
//! never hands an element back to the entries that follow it.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::Validator;
use crate::error::{Context, ValidationResult, ValidatorError};
use serde_json::Value;

/// How many consecutive elements a pattern entry consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Quantifier {
    /// Exactly one
    One,
    /// `?`
    Optional,
    /// `+`
    OneOrMore,
    /// `*`
    ZeroOrMore,
}

impl Quantifier {
    pub(crate) fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "?" => Some(Quantifier::Optional),
            "+" => Some(Quantifier::OneOrMore),
            "*" => Some(Quantifier::ZeroOrMore),
            _ => None,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Quantifier::One => "",
            Quantifier::Optional => "?",
            Quantifier::OneOrMore => "+",
            Quantifier::ZeroOrMore => "*",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PatternEntry {
    pub(crate) validator: Validator,
    pub(crate) quantifier: Quantifier,
}

#[derive(Debug, Clone)]
pub(crate) struct ArrayValidator {
    pattern: Vec<PatternEntry>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    repeat: bool,
    align_end: bool,
    /// Rendered once for error context
    description: String,
}

impl ArrayValidator {
    pub(crate) fn new(
        pattern: Vec<PatternEntry>,
        min_length: Option<usize>,
        max_length: Option<usize>,
        repeat: bool,
        align_end: bool,
    ) -> Self {
        let description = describe_pattern(&pattern);
        Self {
            pattern,
            min_length,
            max_length,
            repeat,
            align_end,
            description,
        }
    }

    pub(crate) fn describe(&self) -> String {
        if self.pattern.is_empty() {
            "array".to_string()
        } else {
            format!("array {}", self.description)
        }
    }

    fn failure(&self, msg: &str, value: &Value) -> ValidatorError {
        ValidatorError::new(msg, value, Context::ArrayPattern(self.description.clone()))
    }

    pub(crate) fn validate(&self, value: &Value) -> ValidationResult<()> {
        let items = value.as_array().ok_or_else(|| {
            ValidatorError::new("Value not of type Array", value, Context::None)
        })?;

        if let Some(max) = self.max_length {
            if items.len() > max {
                return Err(ValidatorError::new(
                    format!("Value exceeds max length of {}", max),
                    value,
                    Context::Length(max),
                )
                .into());
            }
        }
        if let Some(min) = self.min_length {
            if items.len() < min {
                return Err(ValidatorError::new(
                    format!("Value is shorter than min length of {}", min),
                    value,
                    Context::Length(min),
                )
                .into());
            }
        }

        if self.pattern.is_empty() {
            return Ok(());
        }

        let mut i = 0;
        let mut p = 0;
        // Element index at the start of the current pass over the pattern
        let mut pass_start = 0;

        while i < items.len() {
            if p >= self.pattern.len() {
                if !self.repeat {
                    return Err(self.failure("Array contains more values than pattern", value).into());
                }
                if i == pass_start {
                    return Err(self
                        .failure("No pattern entry accepts the element", &items[i])
                        .with_path(i)
                        .into());
                }
                p = 0;
                pass_start = i;
            }

            let entry = &self.pattern[p];
            p += 1;

            match entry.quantifier {
                Quantifier::One => {
                    entry.validator.validate(&items[i]).map_err(|e| e.with_path(i))?;
                    i += 1;
                }
                Quantifier::Optional => {
                    if entry.validator.accepts(&items[i])? {
                        i += 1;
                    }
                }
                Quantifier::OneOrMore => {
                    entry.validator.validate(&items[i]).map_err(|e| e.with_path(i))?;
                    i = consume_while(&entry.validator, items, i + 1)?;
                }
                Quantifier::ZeroOrMore => {
                    i = consume_while(&entry.validator, items, i)?;
                }
            }
        }

        if self.align_end && p != self.pattern.len() {
            return Err(self.failure("Array pattern not exhausted", value).into());
        }

        Ok(())
    }
}

/// Advance past every element from `start` the validator accepts
fn consume_while(validator: &Validator, items: &[Value], start: usize) -> ValidationResult<usize> {
    let mut i = start;
    while i < items.len() && validator.accepts(&items[i])? {
        i += 1;
    }
    Ok(i)
}

fn describe_pattern(pattern: &[PatternEntry]) -> String {
    let entries: Vec<String> = pattern
        .iter()
        .map(|entry| format!("{}{}", entry.validator.describe(), entry.quantifier.suffix()))
        .collect();
    format!("[{}]", entries.join(", "))
}
