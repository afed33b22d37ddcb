//! Object validator: mandatory, optional and catch-all members
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::Validator;
use crate::error::{Context, ValidationResult, ValidatorError};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub(crate) struct ObjectValidator {
    /// Declaration order is the order members are checked in
    mandatory: Vec<(String, Validator)>,
    mandatory_keys: HashSet<String>,
    optional: HashMap<String, Validator>,
    any: Validator,
    inclusive: bool,
}

/// Whether undeclared members are accepted when `inclusive` is not given.
///
/// A catch-all rule always implies inclusive; declared members without one
/// imply exclusive; no constraints at all accept anything.
pub(crate) fn default_inclusiveness(has_any: bool, has_declared_members: bool) -> bool {
    has_any || !has_declared_members
}

impl ObjectValidator {
    pub(crate) fn new(
        mandatory: Vec<(String, Validator)>,
        optional: Vec<(String, Validator)>,
        any: Option<Validator>,
        inclusive: Option<bool>,
    ) -> Self {
        let has_declared_members = !mandatory.is_empty() || !optional.is_empty();
        let inclusive =
            inclusive.unwrap_or_else(|| default_inclusiveness(any.is_some(), has_declared_members));

        let mut ordered: Vec<(String, Validator)> = Vec::with_capacity(mandatory.len());
        for (key, validator) in mandatory {
            match ordered.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, slot)) => *slot = validator,
                None => ordered.push((key, validator)),
            }
        }
        let mandatory_keys = ordered.iter().map(|(key, _)| key.clone()).collect();

        Self {
            mandatory: ordered,
            mandatory_keys,
            optional: optional.into_iter().collect(),
            any: any.unwrap_or_else(Validator::wildcard),
            inclusive,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_inclusive(&self) -> bool {
        self.inclusive
    }

    pub(crate) fn validate(&self, value: &Value) -> ValidationResult<()> {
        let members = value.as_object().ok_or_else(|| {
            ValidatorError::new("Value not of type Object", value, Context::None)
        })?;

        for (key, validator) in &self.mandatory {
            let member = members.get(key).ok_or_else(|| {
                ValidatorError::new(
                    format!("Mandatory property {} absent", key),
                    value,
                    Context::Key(key.clone()),
                )
            })?;
            validator
                .validate(member)
                .map_err(|e| e.with_path(key.as_str()))?;
        }

        for (key, member) in members {
            if self.mandatory_keys.contains(key) {
                continue;
            }

            let validator = match self.optional.get(key) {
                Some(validator) => validator,
                None if !self.inclusive => {
                    return Err(ValidatorError::new(
                        format!("Unknown property {} in an exclusive context", key),
                        value,
                        Context::Key(key.clone()),
                    )
                    .into());
                }
                None => &self.any,
            };

            validator
                .validate(member)
                .map_err(|e| e.with_path(key.as_str()))?;
        }

        Ok(())
    }
}
