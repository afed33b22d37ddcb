//! Rule compiler: raw rule specifications to validator trees
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::error::{CompileError, CompileResult};
use crate::rule::{
    PatternItem, RuleInput, RuleOption, RuleSpec, TypeRef, ARRAY_ALIASES, ARRAY_KIND,
    ARRAY_OPTIONS, COMMON_OPTIONS, OBJECT_ALIASES, OBJECT_KIND, OBJECT_OPTIONS, STRING_KIND,
    STRING_OPTIONS,
};
use crate::validator::array::{ArrayValidator, PatternEntry, Quantifier};
use crate::validator::object::ObjectValidator;
use crate::validator::primitive::PrimitiveValidator;
use crate::validator::string::StringValidator;
use crate::validator::{CustomCheck, Schema, SchemaKind, Validator};
use regex::Regex;
use tracing::debug;

/// Compiler configuration
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Reject options the rule kind does not recognize
    pub strict_options: bool,
    /// Maximum characters of a predicate description used as failure context
    pub description_limit: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            strict_options: false,
            description_limit: 50,
        }
    }
}

impl CompilerConfig {
    /// Configuration that rejects unrecognized options
    pub fn strict() -> Self {
        Self {
            strict_options: true,
            ..Self::default()
        }
    }

    /// Set the predicate description limit
    pub fn with_description_limit(mut self, limit: usize) -> Self {
        self.description_limit = limit;
        self
    }
}

/// Builds immutable [`Validator`] trees
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    /// Create a compiler with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a rule, a list of alternatives, or reuse a compiled validator
    pub fn compile<R: Into<RuleInput>>(&self, rule: R) -> CompileResult<Validator> {
        self.compile_input(&rule.into())
    }

    fn compile_input(&self, input: &RuleInput) -> CompileResult<Validator> {
        match input {
            RuleInput::Compiled(validator) => Ok(validator.clone()),
            RuleInput::Spec(spec) => Ok(Validator::from_schemas(vec![self.compile_spec(spec)?])),
            RuleInput::List(alternatives) => {
                let schemas = alternatives
                    .iter()
                    .map(|alternative| self.compile_alternative(alternative))
                    .collect::<CompileResult<Vec<_>>>()?;
                debug!(alternatives = schemas.len(), "compiled union");
                Ok(Validator::from_schemas(schemas))
            }
        }
    }

    fn compile_alternative(&self, input: &RuleInput) -> CompileResult<Schema> {
        match input {
            RuleInput::Spec(spec) => self.compile_spec(spec),
            RuleInput::Compiled(validator) => Ok(Schema::new(SchemaKind::Union(validator.clone()))),
            RuleInput::List(_) => Ok(Schema::new(SchemaKind::Union(self.compile_input(input)?))),
        }
    }

    fn compile_spec(&self, spec: &RuleSpec) -> CompileResult<Schema> {
        if spec.is_empty() {
            return Ok(Schema::new(SchemaKind::Wildcard));
        }

        let kind = match spec.get("type") {
            Some(RuleOption::Type(TypeRef::Name(name))) => match name.as_str() {
                OBJECT_KIND => self.compile_object(&spec.canonicalize(OBJECT_ALIASES))?,
                ARRAY_KIND => self.compile_array(&spec.canonicalize(ARRAY_ALIASES))?,
                STRING_KIND => {
                    self.check_options(spec, STRING_KIND, STRING_OPTIONS)?;
                    SchemaKind::String(StringValidator::new(regex_option(spec, "match")?))
                }
                tag => {
                    self.check_options(spec, tag, &[])?;
                    SchemaKind::Primitive(PrimitiveValidator::TypeOf(tag.to_string()))
                }
            },
            Some(RuleOption::Type(TypeRef::Class(class))) => {
                self.check_options(spec, class.name(), &[])?;
                SchemaKind::Primitive(PrimitiveValidator::InstanceOf(class.clone()))
            }
            Some(_) => {
                return Err(CompileError::InvalidOption {
                    option: "type".to_string(),
                    expected: "a type name or class",
                })
            }
            None if spec.contains("custom") => {
                self.check_options(spec, "custom", &[])?;
                SchemaKind::Wildcard
            }
            None => {
                return Err(CompileError::InvalidRuleShape {
                    rule: format!("{{{}}}", spec.keys().collect::<Vec<_>>().join(", ")),
                })
            }
        };

        let custom = match spec.get("custom") {
            Some(RuleOption::Custom(predicate)) => Some(CustomCheck {
                predicate: predicate.clone(),
                label: predicate
                    .description()
                    .chars()
                    .take(self.config.description_limit)
                    .collect(),
            }),
            Some(_) => {
                return Err(CompileError::InvalidOption {
                    option: "custom".to_string(),
                    expected: "a predicate",
                })
            }
            None => None,
        };

        Ok(Schema { kind, custom })
    }

    fn compile_object(&self, spec: &RuleSpec) -> CompileResult<SchemaKind> {
        self.check_options(spec, OBJECT_KIND, OBJECT_OPTIONS)?;

        let mandatory = self.members_option(spec, "mandatory")?;
        let optional = self.members_option(spec, "optional")?;
        let any = spec
            .get("any")
            .map(|option| self.rule_option(option, "any"))
            .transpose()?;
        let inclusive = bool_option(spec, "inclusive")?;

        debug!(
            mandatory = mandatory.len(),
            optional = optional.len(),
            catch_all = any.is_some(),
            "compiled object validator"
        );

        Ok(SchemaKind::Object(ObjectValidator::new(mandatory, optional, any, inclusive)))
    }

    fn compile_array(&self, spec: &RuleSpec) -> CompileResult<SchemaKind> {
        self.check_options(spec, ARRAY_KIND, ARRAY_OPTIONS)?;

        let min_length = length_option(spec, "minLength")?;
        let max_length = length_option(spec, "maxLength")?;
        let align_end = bool_option(spec, "align_end")?.unwrap_or(true);

        let (pattern, repeat) = match spec.get("all") {
            Some(all) => {
                let entry = PatternEntry {
                    validator: self.rule_option(all, "all")?,
                    quantifier: Quantifier::One,
                };
                (vec![entry], true)
            }
            None => {
                let pattern = match spec.get("pattern") {
                    Some(RuleOption::Pattern(items)) => self.compile_pattern(items)?,
                    Some(_) => {
                        return Err(CompileError::InvalidOption {
                            option: "pattern".to_string(),
                            expected: "a sequence of rules and quantifiers",
                        })
                    }
                    None => Vec::new(),
                };
                (pattern, bool_option(spec, "repeat")?.unwrap_or(false))
            }
        };

        debug!(entries = pattern.len(), repeat, align_end, "compiled array validator");

        Ok(SchemaKind::Array(ArrayValidator::new(
            pattern, min_length, max_length, repeat, align_end,
        )))
    }

    /// Pair each rule with the quantifier marker directly following it
    fn compile_pattern(&self, items: &[PatternItem]) -> CompileResult<Vec<PatternEntry>> {
        let mut entries: Vec<PatternEntry> = Vec::with_capacity(items.len());
        let mut quantified = true;

        for (position, item) in items.iter().enumerate() {
            match item {
                PatternItem::Rule(rule) => {
                    entries.push(PatternEntry {
                        validator: self.compile_input(rule)?,
                        quantifier: Quantifier::One,
                    });
                    quantified = false;
                }
                PatternItem::Marker(marker) => {
                    let quantifier = Quantifier::from_marker(marker).ok_or_else(|| {
                        CompileError::UnknownMarker {
                            marker: marker.clone(),
                        }
                    })?;
                    match entries.last_mut() {
                        Some(entry) if !quantified => entry.quantifier = quantifier,
                        _ => {
                            return Err(CompileError::DanglingQuantifier {
                                marker: marker.clone(),
                                position,
                            })
                        }
                    }
                    quantified = true;
                }
            }
        }

        Ok(entries)
    }

    fn rule_option(&self, option: &RuleOption, name: &str) -> CompileResult<Validator> {
        match option {
            RuleOption::Rule(rule) => self.compile_input(rule),
            _ => Err(CompileError::InvalidOption {
                option: name.to_string(),
                expected: "a rule",
            }),
        }
    }

    fn members_option(&self, spec: &RuleSpec, name: &str) -> CompileResult<Vec<(String, Validator)>> {
        match spec.get(name) {
            Some(RuleOption::Members(members)) => members
                .iter()
                .map(|(key, rule)| -> CompileResult<(String, Validator)> {
                    Ok((key.clone(), self.compile_input(rule)?))
                })
                .collect(),
            Some(_) => Err(CompileError::InvalidOption {
                option: name.to_string(),
                expected: "named member rules",
            }),
            None => Ok(Vec::new()),
        }
    }

    fn check_options(&self, spec: &RuleSpec, kind: &str, allowed: &[&str]) -> CompileResult<()> {
        if !self.config.strict_options {
            return Ok(());
        }

        match spec
            .keys()
            .find(|key| !COMMON_OPTIONS.contains(key) && !allowed.contains(key))
        {
            Some(unknown) => Err(CompileError::UnknownOption {
                option: unknown.to_string(),
                kind: kind.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn bool_option(spec: &RuleSpec, name: &str) -> CompileResult<Option<bool>> {
    match spec.get(name) {
        Some(RuleOption::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(CompileError::InvalidOption {
            option: name.to_string(),
            expected: "a boolean",
        }),
        None => Ok(None),
    }
}

fn length_option(spec: &RuleSpec, name: &str) -> CompileResult<Option<usize>> {
    match spec.get(name) {
        Some(RuleOption::Length(length)) => Ok(Some(*length)),
        Some(_) => Err(CompileError::InvalidOption {
            option: name.to_string(),
            expected: "a non-negative integer",
        }),
        None => Ok(None),
    }
}

fn regex_option(spec: &RuleSpec, name: &str) -> CompileResult<Option<Regex>> {
    match spec.get(name) {
        Some(RuleOption::Regex(regex)) => Ok(Some(regex.clone())),
        Some(_) => Err(CompileError::InvalidOption {
            option: name.to_string(),
            expected: "a regular expression",
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Class;
    use serde_json::json;

    #[test]
    fn test_compiled_validator_is_reused() {
        let inner = Compiler::new().compile(RuleSpec::typed("number")).unwrap();
        let outer = Compiler::new().compile(inner.clone()).unwrap();
        assert_eq!(outer.len(), inner.len());
        assert!(outer.validate(&json!(1)).is_ok());
    }

    #[test]
    fn test_dispatch_by_type() {
        let compiler = Compiler::new();
        assert!(compiler.compile(RuleSpec::typed("boolean")).unwrap().validate(&json!(true)).is_ok());
        assert!(compiler.compile(RuleSpec::typed(Class::integer())).unwrap().validate(&json!(2)).is_ok());
        assert!(compiler.compile(RuleSpec::new()).unwrap().validate(&json!([1])).is_ok());
    }

    #[test]
    fn test_predicate_only_rule_is_wildcard_with_check() {
        let validator = Compiler::new()
            .compile(RuleSpec::new().custom("non-null", |v: &serde_json::Value| !v.is_null()))
            .unwrap();
        assert!(validator.validate(&json!(0)).is_ok());
        assert!(validator.validate(&json!(null)).is_err());
    }

    #[test]
    fn test_invalid_rule_shape() {
        let err = Compiler::new()
            .compile(RuleSpec::new().set("mandatory", true))
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidRuleShape { .. }));
    }

    #[test]
    fn test_malformed_pattern_entries() {
        let compiler = Compiler::new();

        let unknown = RuleSpec::typed("array").set("pattern", RuleOption::pattern(vec![
            PatternItem::from(RuleSpec::typed("number")),
            PatternItem::from("{2}"),
        ]));
        assert!(matches!(compiler.compile(unknown).unwrap_err(), CompileError::UnknownMarker { .. }));

        let leading = RuleSpec::typed("array").set("pattern", RuleOption::pattern(vec!["+"]));
        assert!(matches!(
            compiler.compile(leading).unwrap_err(),
            CompileError::DanglingQuantifier { position: 0, .. }
        ));

        let doubled = RuleSpec::typed("array").set("pattern", RuleOption::pattern(vec![
            PatternItem::from(RuleSpec::typed("number")),
            PatternItem::from("+"),
            PatternItem::from("?"),
        ]));
        assert!(matches!(
            compiler.compile(doubled).unwrap_err(),
            CompileError::DanglingQuantifier { position: 2, .. }
        ));
    }

    #[test]
    fn test_wrongly_shaped_options() {
        let err = Compiler::new()
            .compile(RuleSpec::typed("array").set("repeat", 3usize))
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidOption { ref option, .. } if option == "repeat"));
    }

    #[test]
    fn test_strict_options() {
        let rule = RuleSpec::typed("string").set("minLength", 3usize);
        assert!(Compiler::new().compile(rule.clone()).is_ok());

        let err = Compiler::with_config(CompilerConfig::strict()).compile(rule).unwrap_err();
        assert!(matches!(err, CompileError::UnknownOption { ref option, .. } if option == "minLength"));

        // Synonyms are canonical by the time options are checked
        let aliased = RuleSpec::typed("object")
            .set("required", RuleOption::members([("id", RuleSpec::typed("number"))]));
        assert!(Compiler::with_config(CompilerConfig::strict()).compile(aliased).is_ok());
    }

    #[test]
    fn test_description_limit() {
        let compiler = Compiler::with_config(CompilerConfig::default().with_description_limit(5));
        let validator = compiler
            .compile(RuleSpec::typed("number").custom("value must be positive", |v: &serde_json::Value| {
                v.as_f64().map_or(false, |n| n > 0.0)
            }))
            .unwrap();

        let err = validator.validate(&json!(-1)).unwrap_err().into_invalid().unwrap();
        assert_eq!(err.context, crate::error::Context::Predicate("value".to_string()));
    }
}
