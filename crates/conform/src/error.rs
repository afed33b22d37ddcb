//! Error types for rule compilation and value validation
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Label prefixed to a failure reported by a union alternative
pub const ALTERNATIVE_LABEL: &str = "validator";

/// One step of the location trail carried by a [`ValidatorError`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Array element, rendered as `[i]`
    Index(usize),
    /// Object member, rendered as `.key` or `[key]`
    Key(String),
    /// Rendered verbatim
    Literal(String),
}

impl PathSegment {
    /// Segment identifying the `index`-th alternative of a union
    pub fn alternative(index: usize) -> Self {
        PathSegment::Literal(format!("{{{}[{}]}}", ALTERNATIVE_LABEL, index))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "[{}]", index),
            PathSegment::Key(key) if is_identifier(key) => write!(f, ".{}", key),
            PathSegment::Key(key) => write!(f, "[{}]", key),
            PathSegment::Literal(literal) => f.write_str(literal),
        }
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

/// Whether `key` matches `^[A-Za-z_][A-Za-z0-9_]*$`
pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Diagnostic detail attached to a failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Context {
    /// Nothing beyond the message
    None,
    /// Expected type tag
    Type(String),
    /// Expected structural class
    Class(String),
    /// Regular expression a string failed to match
    Pattern(String),
    /// Object member the failure is about
    Key(String),
    /// Length bound that was violated
    Length(usize),
    /// Rendered array pattern
    ArrayPattern(String),
    /// Description of a custom predicate
    Predicate(String),
    /// Caller-chosen detail from a custom predicate
    Custom(Value),
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::None => Ok(()),
            Context::Type(name) | Context::Class(name) => f.write_str(name),
            Context::Pattern(pattern) => write!(f, "/{}/", pattern),
            Context::Key(key) => f.write_str(key),
            Context::Length(length) => write!(f, "{}", length),
            Context::ArrayPattern(pattern) => f.write_str(pattern),
            Context::Predicate(description) => f.write_str(description),
            Context::Custom(value) => write!(f, "{}", value),
        }
    }
}

/// A single validation failure with its location and offending value
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub struct ValidatorError {
    /// Human-readable error message
    pub msg: String,
    /// Location of the offending value, outermost segment first
    pub path: String,
    /// The value that failed
    pub target: Value,
    /// Expected type, pattern, key or predicate description
    pub context: Context,
    /// Union alternative the failure was reported from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<usize>,
}

impl fmt::Display for ValidatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "$" } else { &self.path };
        write!(f, "Validation error at '{}': {}", path, self.msg)?;

        if self.context != Context::None {
            write!(f, " ({})", self.context)?;
        }

        Ok(())
    }
}

impl ValidatorError {
    /// Create a failure at the current location
    pub fn new<M>(msg: M, target: &Value, context: Context) -> Self
    where
        M: Into<String>,
    {
        Self {
            msg: msg.into(),
            path: String::new(),
            target: target.clone(),
            context,
            alternative: None,
        }
    }

    /// Prefix the path with one enclosing segment
    pub fn add_path<S: Into<PathSegment>>(&mut self, segment: S) {
        self.path = format!("{}{}", segment.into(), self.path);
    }

    /// Builder form of [`ValidatorError::add_path`]
    pub fn with_path<S: Into<PathSegment>>(mut self, segment: S) -> Self {
        self.add_path(segment);
        self
    }
}

/// Outcome of a failed `validate` call
#[derive(Debug, Error)]
pub enum Error {
    /// The value was rejected
    #[error(transparent)]
    Invalid(#[from] ValidatorError),

    /// A custom predicate returned something other than a verdict
    #[error("Unknown return value from custom predicate '{predicate}': {value}")]
    PredicateContract { predicate: String, value: Value },
}

impl Error {
    /// Prefix the path of an ordinary rejection; contract violations pass through
    pub fn with_path<S: Into<PathSegment>>(self, segment: S) -> Self {
        match self {
            Error::Invalid(error) => Error::Invalid(error.with_path(segment)),
            fatal => fatal,
        }
    }

    /// The rejection, if this is one
    pub fn as_invalid(&self) -> Option<&ValidatorError> {
        match self {
            Error::Invalid(error) => Some(error),
            Error::PredicateContract { .. } => None,
        }
    }

    /// Consume into the rejection, if this is one
    pub fn into_invalid(self) -> Option<ValidatorError> {
        match self {
            Error::Invalid(error) => Some(error),
            Error::PredicateContract { .. } => None,
        }
    }

    /// Whether this aborted validation rather than rejecting the value
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::PredicateContract { .. })
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, Error>;

/// Problems found while compiling a rule specification
#[derive(Debug, Error)]
pub enum CompileError {
    /// The rule is neither empty, typed, nor a bare predicate
    #[error("Invalid rule: {rule}")]
    InvalidRuleShape { rule: String },

    /// An option holds a value of the wrong shape
    #[error("Invalid value for option '{option}': expected {expected}")]
    InvalidOption {
        option: String,
        expected: &'static str,
    },

    /// An option the rule kind does not recognize (strict mode only)
    #[error("Unknown option '{option}' for rule of type {kind}")]
    UnknownOption { option: String, kind: String },

    /// A string in an array pattern that is not a quantifier
    #[error("Unknown pattern string '{marker}'")]
    UnknownMarker { marker: String },

    /// A quantifier that does not directly follow a validator
    #[error("Quantifier '{marker}' at pattern position {position} does not follow a validator")]
    DanglingQuantifier { marker: String, position: usize },

    /// A `match` option that is not a valid regular expression
    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A class reference not among the known classes
    #[error("Unknown class '{name}'")]
    UnknownClass { name: String },
}

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Multiple validation failures collected during batch validation
#[derive(Debug, Error, Serialize, Deserialize)]
pub struct ValidationErrors {
    /// List of failures
    pub errors: Vec<ValidatorError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiple validation errors occurred:")?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl ValidationErrors {
    /// Create an empty collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add a failure to the collection
    pub fn add(&mut self, error: ValidatorError) {
        self.errors.push(error);
    }

    /// Check if there are any failures
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of failures
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Ok if no failures were collected, Err otherwise
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ValidatorError> for ValidationErrors {
    fn from(error: ValidatorError) -> Self {
        let mut errors = Self::new();
        errors.add(error);
        errors
    }
}
