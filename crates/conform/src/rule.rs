//! Raw rule specifications, option aliases and JSON rule documents
//!
//! A rule is either a mapping of option names to option values
//! ([`RuleSpec`]), an ordered list of alternatives, or an already compiled
//! [`Validator`]. Nothing here is interpreted until compilation.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::error::{CompileError, CompileResult};
use crate::predicate::{Predicate, Verdict};
use crate::validator::Validator;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Canonical option names and the synonyms accepted for them
pub type AliasTable = &'static [(&'static str, &'static [&'static str])];

pub const OBJECT_ALIASES: AliasTable = &[
    ("any", &["others", "props_any"]),
    ("mandatory", &["required", "props_mandatory"]),
    ("optional", &["props", "props_optional"]),
];

pub const ARRAY_ALIASES: AliasTable = &[
    ("align_end", &["align"]),
    ("minLength", &["min_length"]),
    ("maxLength", &["max_length"]),
];

/// Built-in rule kinds; any other type name is a type tag
pub const OBJECT_KIND: &str = "object";
pub const ARRAY_KIND: &str = "array";
pub const STRING_KIND: &str = "string";

const NO_ALIASES: AliasTable = &[];

/// Options every rule kind accepts
pub const COMMON_OPTIONS: &[&str] = &["type", "custom"];
pub const OBJECT_OPTIONS: &[&str] = &["mandatory", "optional", "any", "inclusive"];
pub const ARRAY_OPTIONS: &[&str] = &["pattern", "minLength", "maxLength", "repeat", "align_end", "all"];
pub const STRING_OPTIONS: &[&str] = &["match"];

/// Canonical name for `key` in one alias table
pub fn canonical_name<'a>(key: &'a str, aliases: AliasTable) -> &'a str {
    aliases
        .iter()
        .find(|(_, synonyms)| synonyms.contains(&key))
        .map(|(canonical, _)| *canonical)
        .unwrap_or(key)
}

/// Alias table and kind-specific option names for a rule's `type`
pub fn kind_options(type_ref: Option<&TypeRef>) -> (AliasTable, &'static [&'static str]) {
    match type_ref {
        Some(TypeRef::Name(name)) => match name.as_str() {
            OBJECT_KIND => (OBJECT_ALIASES, OBJECT_OPTIONS),
            ARRAY_KIND => (ARRAY_ALIASES, ARRAY_OPTIONS),
            STRING_KIND => (NO_ALIASES, STRING_OPTIONS),
            _ => (NO_ALIASES, &[]),
        },
        _ => (NO_ALIASES, &[]),
    }
}

type ClassTest = dyn Fn(&Value) -> bool + Send + Sync;

/// A named structural class used for instance-of checks
#[derive(Clone)]
pub struct Class {
    name: Arc<str>,
    test: Arc<ClassTest>,
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class({})", self.name)
    }
}

impl Class {
    pub fn new<N, F>(name: N, test: F) -> Self
    where
        N: Into<String>,
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            test: Arc::new(test),
        }
    }

    /// Whole numbers, signed or unsigned
    pub fn integer() -> Self {
        Self::new("Integer", |v| v.is_i64() || v.is_u64())
    }

    /// Numbers stored as floating point
    pub fn float() -> Self {
        Self::new("Float", Value::is_f64)
    }

    pub fn array() -> Self {
        Self::new("Array", Value::is_array)
    }

    pub fn object() -> Self {
        Self::new("Object", Value::is_object)
    }

    /// Look up a built-in class by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "Integer" => Some(Self::integer()),
            "Float" => Some(Self::float()),
            "Array" => Some(Self::array()),
            "Object" => Some(Self::object()),
            _ => None,
        }
    }

    /// Most specific built-in class name describing `value`
    pub fn name_of(value: &Value) -> &'static str {
        match value {
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Number(n) if n.is_f64() => "Float",
            Value::Number(_) => "Integer",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, value: &Value) -> bool {
        (self.test)(value)
    }
}

/// The `type` discriminator of a rule
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// A built-in kind name or a type tag
    Name(String),
    /// A structural class
    Class(Class),
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::Name(name.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::Name(name)
    }
}

impl From<Class> for TypeRef {
    fn from(class: Class) -> Self {
        TypeRef::Class(class)
    }
}

/// One entry of an array pattern before compilation
#[derive(Debug, Clone)]
pub enum PatternItem {
    Rule(RuleInput),
    /// Expected to be one of `?`, `+`, `*`
    Marker(String),
}

impl From<&str> for PatternItem {
    fn from(marker: &str) -> Self {
        PatternItem::Marker(marker.to_string())
    }
}

impl From<RuleInput> for PatternItem {
    fn from(rule: RuleInput) -> Self {
        PatternItem::Rule(rule)
    }
}

impl From<RuleSpec> for PatternItem {
    fn from(spec: RuleSpec) -> Self {
        PatternItem::Rule(RuleInput::Spec(spec))
    }
}

impl From<Vec<RuleSpec>> for PatternItem {
    fn from(alternatives: Vec<RuleSpec>) -> Self {
        PatternItem::Rule(RuleInput::from(alternatives))
    }
}

impl From<Validator> for PatternItem {
    fn from(validator: Validator) -> Self {
        PatternItem::Rule(RuleInput::Compiled(validator))
    }
}

/// The value of a single rule option
#[derive(Debug, Clone)]
pub enum RuleOption {
    Type(TypeRef),
    Bool(bool),
    Length(usize),
    Regex(Regex),
    Rule(RuleInput),
    /// Named member rules, in declaration order
    Members(Vec<(String, RuleInput)>),
    Pattern(Vec<PatternItem>),
    Custom(Predicate),
    /// Anything else a rule document carried
    Raw(Value),
}

impl RuleOption {
    /// Named member rules from `(name, rule)` pairs
    pub fn members<I, K, R>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Into<RuleInput>,
    {
        RuleOption::Members(
            members
                .into_iter()
                .map(|(key, rule)| (key.into(), rule.into()))
                .collect(),
        )
    }

    /// An array pattern from rules and quantifier markers
    pub fn pattern<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PatternItem>,
    {
        RuleOption::Pattern(items.into_iter().map(Into::into).collect())
    }
}

impl From<TypeRef> for RuleOption {
    fn from(type_ref: TypeRef) -> Self {
        RuleOption::Type(type_ref)
    }
}

impl From<Class> for RuleOption {
    fn from(class: Class) -> Self {
        RuleOption::Type(TypeRef::Class(class))
    }
}

impl From<bool> for RuleOption {
    fn from(flag: bool) -> Self {
        RuleOption::Bool(flag)
    }
}

impl From<usize> for RuleOption {
    fn from(length: usize) -> Self {
        RuleOption::Length(length)
    }
}

impl From<Regex> for RuleOption {
    fn from(regex: Regex) -> Self {
        RuleOption::Regex(regex)
    }
}

impl From<RuleInput> for RuleOption {
    fn from(rule: RuleInput) -> Self {
        RuleOption::Rule(rule)
    }
}

impl From<RuleSpec> for RuleOption {
    fn from(spec: RuleSpec) -> Self {
        RuleOption::Rule(RuleInput::Spec(spec))
    }
}

impl From<Vec<RuleSpec>> for RuleOption {
    fn from(alternatives: Vec<RuleSpec>) -> Self {
        RuleOption::Rule(RuleInput::from(alternatives))
    }
}

impl From<Validator> for RuleOption {
    fn from(validator: Validator) -> Self {
        RuleOption::Rule(RuleInput::Compiled(validator))
    }
}

impl From<Predicate> for RuleOption {
    fn from(predicate: Predicate) -> Self {
        RuleOption::Custom(predicate)
    }
}

/// A raw rule: option names mapped to values, in insertion order
#[derive(Debug, Clone, Default)]
pub struct RuleSpec {
    options: Vec<(String, RuleOption)>,
}

impl RuleSpec {
    /// The empty rule, which accepts anything
    pub fn new() -> Self {
        Self::default()
    }

    /// A rule with its `type` set
    pub fn typed<T: Into<TypeRef>>(type_ref: T) -> Self {
        Self::new().set("type", RuleOption::Type(type_ref.into()))
    }

    /// Set an option, replacing an earlier value under the same name
    pub fn set<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<RuleOption>,
    {
        self.insert(key.into(), value.into());
        self
    }

    /// Attach a custom predicate
    pub fn custom<D, F, R>(self, description: D, func: F) -> Self
    where
        D: Into<String>,
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        self.set("custom", Predicate::new(description, func))
    }

    pub fn insert(&mut self, key: String, value: RuleOption) {
        match self.options.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.options.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RuleOption> {
        self.options
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|(key, _)| key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Copy synonyms onto their canonical names, in table order.
    ///
    /// A synonym that is present overrides the canonical value and any
    /// synonym listed before it.
    pub fn canonicalize(&self, aliases: AliasTable) -> RuleSpec {
        let mut canonical = RuleSpec {
            options: self
                .options
                .iter()
                .filter(|(key, _)| !aliases.iter().any(|(_, synonyms)| synonyms.contains(&key.as_str())))
                .cloned()
                .collect(),
        };

        for (name, synonyms) in aliases {
            for synonym in *synonyms {
                if let Some(value) = self.get(synonym) {
                    canonical.insert((*name).to_string(), value.clone());
                }
            }
        }

        canonical
    }

    /// Parse a rule document object.
    ///
    /// Option values are interpreted according to the rule's `type`; keys
    /// that are not options of that kind are kept as [`RuleOption::Raw`].
    pub fn from_json(value: &Value) -> CompileResult<Self> {
        let object = value.as_object().ok_or_else(|| CompileError::InvalidRuleShape {
            rule: value.to_string(),
        })?;

        let type_ref = match object.get("type") {
            Some(type_value) => match parse_option("type", "type", type_value)? {
                RuleOption::Type(type_ref) => Some(type_ref),
                _ => None,
            },
            None => None,
        };
        let (aliases, kind_specific) = kind_options(type_ref.as_ref());

        let mut spec = RuleSpec::new();
        for (key, option) in object {
            let canonical = canonical_name(key, aliases);
            let parsed = match (canonical, &type_ref) {
                ("type", Some(type_ref)) => RuleOption::Type(type_ref.clone()),
                _ if COMMON_OPTIONS.contains(&canonical) || kind_specific.contains(&canonical) => {
                    parse_option(key, canonical, option)?
                }
                _ => RuleOption::Raw(option.clone()),
            };
            spec.insert(key.clone(), parsed);
        }
        Ok(spec)
    }
}

/// Anything the compiler accepts
#[derive(Debug, Clone)]
pub enum RuleInput {
    Spec(RuleSpec),
    /// Alternatives, tried in order
    List(Vec<RuleInput>),
    /// Reused unchanged
    Compiled(Validator),
}

impl RuleInput {
    /// Parse a rule document: objects are rules, arrays are unions
    pub fn from_json(value: &Value) -> CompileResult<Self> {
        match value {
            Value::Object(_) => Ok(RuleInput::Spec(RuleSpec::from_json(value)?)),
            Value::Array(items) => Ok(RuleInput::List(
                items.iter().map(RuleInput::from_json).collect::<CompileResult<_>>()?,
            )),
            other => Err(CompileError::InvalidRuleShape {
                rule: other.to_string(),
            }),
        }
    }
}

impl TryFrom<&Value> for RuleInput {
    type Error = CompileError;

    fn try_from(value: &Value) -> CompileResult<Self> {
        RuleInput::from_json(value)
    }
}

impl From<RuleSpec> for RuleInput {
    fn from(spec: RuleSpec) -> Self {
        RuleInput::Spec(spec)
    }
}

impl From<Validator> for RuleInput {
    fn from(validator: Validator) -> Self {
        RuleInput::Compiled(validator)
    }
}

impl From<&Validator> for RuleInput {
    fn from(validator: &Validator) -> Self {
        RuleInput::Compiled(validator.clone())
    }
}

impl From<Vec<RuleInput>> for RuleInput {
    fn from(alternatives: Vec<RuleInput>) -> Self {
        RuleInput::List(alternatives)
    }
}

impl From<Vec<RuleSpec>> for RuleInput {
    fn from(alternatives: Vec<RuleSpec>) -> Self {
        RuleInput::List(alternatives.into_iter().map(RuleInput::Spec).collect())
    }
}

/// Parse the value of option `key`, interpreted as its canonical name
fn parse_option(key: &str, canonical: &str, value: &Value) -> CompileResult<RuleOption> {
    let invalid = |expected| CompileError::InvalidOption {
        option: key.to_string(),
        expected,
    };

    match canonical {
        "type" => match value {
            Value::String(name) => Ok(RuleOption::Type(TypeRef::Name(name.clone()))),
            Value::Object(map) => {
                let name = map
                    .get("class")
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid("a type name or {\"class\": name}"))?;
                Class::builtin(name)
                    .map(RuleOption::from)
                    .ok_or_else(|| CompileError::UnknownClass {
                        name: name.to_string(),
                    })
            }
            _ => Err(invalid("a type name or {\"class\": name}")),
        },
        "match" => {
            let source = value.as_str().ok_or_else(|| invalid("a regular expression string"))?;
            Regex::new(source)
                .map(RuleOption::Regex)
                .map_err(|source_err| CompileError::InvalidRegex {
                    pattern: source.to_string(),
                    source: source_err,
                })
        }
        "inclusive" | "repeat" | "align_end" => value
            .as_bool()
            .map(RuleOption::Bool)
            .ok_or_else(|| invalid("a boolean")),
        "minLength" | "maxLength" => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(RuleOption::Length)
            .ok_or_else(|| invalid("a non-negative integer")),
        "mandatory" | "optional" => {
            let map = value.as_object().ok_or_else(|| invalid("an object of member rules"))?;
            let members = map
                .iter()
                .map(|(key, rule)| -> CompileResult<(String, RuleInput)> {
                    Ok((key.clone(), RuleInput::from_json(rule)?))
                })
                .collect::<CompileResult<Vec<_>>>()?;
            Ok(RuleOption::Members(members))
        }
        "any" | "all" => Ok(RuleOption::Rule(RuleInput::from_json(value)?)),
        "pattern" => {
            let items = value.as_array().ok_or_else(|| invalid("an array of rules and quantifiers"))?;
            let pattern = items
                .iter()
                .map(|item| -> CompileResult<PatternItem> {
                    match item {
                        Value::String(marker) => Ok(PatternItem::Marker(marker.clone())),
                        rule => Ok(PatternItem::Rule(RuleInput::from_json(rule)?)),
                    }
                })
                .collect::<CompileResult<Vec<_>>>()?;
            Ok(RuleOption::Pattern(pattern))
        }
        "custom" => Err(invalid("a predicate, which a rule document cannot express")),
        _ => Ok(RuleOption::Raw(value.clone())),
    }
}
