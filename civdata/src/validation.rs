//! Integrity checks run on demand against a finished ruleset.
//!
//! Loading never validates references; these checks are where dangling
//! names and malformed unique strings surface.

use crate::category::Category;
use crate::ruleset::Ruleset;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ErrorSeverity {
    Warning,
    Error,
}

/// One finding of a [`RulesetValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RulesetError {
    pub text: String,
    pub severity: ErrorSeverity,
}

impl RulesetError {
    pub fn error(text: impl Into<String>) -> RulesetError {
        RulesetError {
            text: text.into(),
            severity: ErrorSeverity::Error,
        }
    }

    pub fn warning(text: impl Into<String>) -> RulesetError {
        RulesetError {
            text: text.into(),
            severity: ErrorSeverity::Warning,
        }
    }
}

impl fmt::Display for RulesetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.severity, self.text)
    }
}

/// Checks a whole ruleset.
pub trait RulesetValidator {
    fn error_list(&self, ruleset: &Ruleset) -> Vec<RulesetError>;
}

/// Checks one unique string in the context of a ruleset.
pub trait UniqueValidator: Send + Sync {
    /// An empty result means the unique is acceptable.
    fn check_unique(&self, unique: &str, ruleset: &Ruleset) -> Vec<RulesetError>;
}

/// Rejects blank uniques and uniques with unbalanced `[]` or `<>` brackets.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicUniqueValidator;

impl UniqueValidator for BasicUniqueValidator {
    fn check_unique(&self, unique: &str, _ruleset: &Ruleset) -> Vec<RulesetError> {
        if unique.trim().is_empty() {
            return vec![RulesetError::warning("Blank unique")];
        }
        let mut errors = Vec::new();
        for (open, close) in [('[', ']'), ('<', '>')] {
            if !balanced(unique, open, close) {
                errors.push(RulesetError::warning(format!(
                    "Unique \"{unique}\" has unbalanced {open}{close} brackets"
                )));
            }
        }
        errors
    }
}

fn balanced(text: &str, open: char, close: char) -> bool {
    let mut depth = 0i32;
    for c in text.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        }
    }
    depth == 0
}

/// Finds names that point at nothing, plus malformed uniques.
pub struct ReferenceValidator<'a> {
    uniques: &'a dyn UniqueValidator,
}

impl<'a> ReferenceValidator<'a> {
    pub fn new(uniques: &'a dyn UniqueValidator) -> ReferenceValidator<'a> {
        ReferenceValidator { uniques }
    }
}

impl Default for ReferenceValidator<'static> {
    fn default() -> Self {
        ReferenceValidator::new(&BasicUniqueValidator)
    }
}

impl RulesetValidator for ReferenceValidator<'_> {
    fn error_list(&self, ruleset: &Ruleset) -> Vec<RulesetError> {
        let mut errors = Vec::new();
        let mut missing = |owner: String, kind: &str, target: &str| {
            errors.push(RulesetError::error(format!(
                "{owner} requires {kind} {target} which does not exist!"
            )));
        };

        for tech in ruleset.technologies.values() {
            for prerequisite in &tech.prerequisites {
                if !ruleset.technologies.contains_key(prerequisite) {
                    missing(tech.name.clone(), "tech", prerequisite);
                }
            }
        }

        for building in ruleset.buildings.values() {
            if let Some(tech) = &building.required_tech
                && !ruleset.technologies.contains_key(tech)
            {
                missing(building.name.clone(), "tech", tech);
            }
            if let Some(required) = &building.required_building
                && !ruleset.buildings.contains_key(required)
            {
                missing(building.name.clone(), "building", required);
            }
            if let Some(resource) = &building.required_resource
                && !ruleset.tile_resources.contains_key(resource)
            {
                missing(building.name.clone(), "resource", resource);
            }
        }

        for unit in ruleset.units.values() {
            if !ruleset.unit_types.contains_key(&unit.unit_type) {
                missing(unit.name.clone(), "unit type", &unit.unit_type);
            }
            if let Some(tech) = &unit.required_tech
                && !ruleset.technologies.contains_key(tech)
            {
                missing(unit.name.clone(), "tech", tech);
            }
            if let Some(upgrade) = &unit.upgrades_to
                && !ruleset.units.contains_key(upgrade)
            {
                missing(unit.name.clone(), "unit", upgrade);
            }
            for promotion in &unit.promotions {
                if !ruleset.unit_promotions.contains_key(promotion) {
                    missing(unit.name.clone(), "promotion", promotion);
                }
            }
        }

        for policy in ruleset.policies.values() {
            for required in policy.requires.iter().flatten() {
                if !ruleset.policies.contains_key(required) {
                    missing(policy.name.clone(), "policy", required);
                }
            }
        }

        for nation in ruleset.nations.values() {
            if let Some(religion) = &nation.favored_religion
                && !ruleset.religions.contains(religion)
            {
                missing(nation.name.clone(), "religion", religion);
            }
            if let Some(kind) = &nation.city_state_type
                && !ruleset.city_state_types.contains_key(kind)
            {
                missing(nation.name.clone(), "city-state type", kind);
            }
        }

        for category in Category::ALL {
            for unique in category.uniques(ruleset) {
                errors.extend(self.uniques.check_unique(unique, ruleset).into_iter().map(
                    |e| RulesetError {
                        text: format!("{category}: {}", e.text),
                        severity: e.severity,
                    },
                ));
            }
        }

        errors
    }
}
