//! Shared building blocks of ruleset objects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name-keyed table of one category, in insertion order.
pub type Table<T> = IndexMap<String, T>;

/// Amounts keyed by name: `{ "Great Scientist": 3 }`.
pub type Counter = IndexMap<String, i32>;

/// Behaviour every named ruleset entity shares.
pub trait RulesetObject {
    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    fn uniques(&self) -> &[String];

    /// Package that last (re)inserted this object.
    fn origin_ruleset(&self) -> &str;

    fn set_origin_ruleset(&mut self, origin: &str);

    /// True when `unique` appears without any `<conditional>` attached.
    fn has_unconditional_unique(&self, unique: &str) -> bool {
        self.uniques().iter().any(|u| u.trim() == unique)
    }

    /// `<tag>` style uniques, with the angle brackets removed.
    fn tags(&self) -> Vec<&str> {
        self.uniques()
            .iter()
            .filter_map(|u| u.trim().strip_prefix('<')?.strip_suffix('>'))
            .collect()
    }
}

/// Implements [`RulesetObject`] for types with `name`, `uniques` and
/// `origin_ruleset` fields.
macro_rules! impl_ruleset_object {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::objects::RulesetObject for $ty {
                fn name(&self) -> &str {
                    &self.name
                }

                fn set_name(&mut self, name: String) {
                    self.name = name;
                }

                fn uniques(&self) -> &[String] {
                    &self.uniques
                }

                fn origin_ruleset(&self) -> &str {
                    &self.origin_ruleset
                }

                fn set_origin_ruleset(&mut self, origin: &str) {
                    self.origin_ruleset = origin.to_string();
                }
            }
        )*
    };
}

pub(crate) use impl_ruleset_object;

/// The yield block carried by buildings, terrains, improvements and resources.
///
/// In data files the components sit directly on the owning object
/// (`"production": 2`), except for nested blocks such as `improvementStats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub production: f32,
    pub food: f32,
    pub gold: f32,
    pub science: f32,
    pub culture: f32,
    pub happiness: f32,
    pub faith: f32,
}

impl Stats {
    pub const KEYS: [&'static str; 7] = [
        "production",
        "food",
        "gold",
        "science",
        "culture",
        "happiness",
        "faith",
    ];

    pub fn get(&self, key: &str) -> Option<f32> {
        match key {
            "production" => Some(self.production),
            "food" => Some(self.food),
            "gold" => Some(self.gold),
            "science" => Some(self.science),
            "culture" => Some(self.culture),
            "happiness" => Some(self.happiness),
            "faith" => Some(self.faith),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut f32> {
        match key {
            "production" => Some(&mut self.production),
            "food" => Some(&mut self.food),
            "gold" => Some(&mut self.gold),
            "science" => Some(&mut self.science),
            "culture" => Some(&mut self.culture),
            "happiness" => Some(&mut self.happiness),
            "faith" => Some(&mut self.faith),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        Self::KEYS.iter().all(|k| self.get(k) == Some(0.0))
    }
}

/// How many units of a resource one deposit yields, by abundance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositAmount {
    pub sparse: i32,
    pub default: i32,
    pub abundant: i32,
}

impl Default for DepositAmount {
    fn default() -> Self {
        Self {
            sparse: 1,
            default: 2,
            abundant: 3,
        }
    }
}
