use crate::category::Category;
use crate::decode::decode_object;
use civdata_derive::LenientDeserialize;
use serde::Serialize;
use serde_json::{Map, Value};

/// Package metadata and merge directives from `ModOptions.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModOptions {
    #[serde(alias = "isBaseRuleSet")]
    pub is_base_ruleset: bool,

    pub author: String,

    pub mod_url: String,

    /// Mod-wide uniques; appended on merge.
    pub uniques: Vec<String>,

    /// Tuning constants; merged key by key.
    pub constants: Map<String, Value>,

    pub beliefs_to_remove: Vec<String>,
    pub buildings_to_remove: Vec<String>,
    pub nations_to_remove: Vec<String>,
    pub policy_branches_to_remove: Vec<String>,
    pub policies_to_remove: Vec<String>,
    pub techs_to_remove: Vec<String>,
    pub units_to_remove: Vec<String>,
    pub religions_to_remove: Vec<String>,
}

impl ModOptions {
    /// Parses `ModOptions.json`, falling back to defaults when it is malformed.
    pub fn parse(package: &str, text: &str) -> ModOptions {
        match decode_object(Category::ModOptions, text) {
            Ok(options) => options,
            Err(e) => {
                log::error!("Failed to read mod options of '{}': {}", package, e);
                ModOptions::default()
            }
        }
    }

    /// Merges the additive parts and records the applied removal directives.
    pub fn merge(&mut self, other: &ModOptions) {
        self.uniques.extend(other.uniques.iter().cloned());
        for (key, value) in &other.constants {
            self.constants.insert(key.clone(), value.clone());
        }

        append_new(&mut self.beliefs_to_remove, &other.beliefs_to_remove);
        append_new(&mut self.buildings_to_remove, &other.buildings_to_remove);
        append_new(&mut self.nations_to_remove, &other.nations_to_remove);
        append_new(
            &mut self.policy_branches_to_remove,
            &other.policy_branches_to_remove,
        );
        append_new(&mut self.policies_to_remove, &other.policies_to_remove);
        append_new(&mut self.techs_to_remove, &other.techs_to_remove);
        append_new(&mut self.units_to_remove, &other.units_to_remove);
        append_new(&mut self.religions_to_remove, &other.religions_to_remove);
    }
}

fn append_new(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deprecated_base_flag() {
        let options = ModOptions::parse("Old mod", r#"{ "isBaseRuleSet": true }"#);
        assert!(options.is_base_ruleset);

        let options = ModOptions::parse("New mod", r#"{ "isBaseRuleset": true, "author": 5 }"#);
        assert!(options.is_base_ruleset);
        assert!(options.author.is_empty());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        assert_eq!(ModOptions::parse("Broken", "{ nope"), ModOptions::default());
        assert_eq!(ModOptions::parse("Broken", "[1, 2]"), ModOptions::default());
    }

    #[test]
    fn test_merge() {
        let mut base = ModOptions::parse(
            "Vanilla",
            r#"{ "uniques": ["A"], "constants": { "maxXPfromBarbarians": 30, "cityStrengthBase": 8 } }"#,
        );
        let mod_options = ModOptions::parse(
            "X",
            r#"{
                "uniques": ["B"],
                "constants": { "cityStrengthBase": 10 },
                "buildingsToRemove": ["*Granary*", "*Granary*"]
            }"#,
        );
        base.merge(&mod_options);

        assert_eq!(base.uniques, vec!["A", "B"]);
        assert_eq!(base.constants["maxXPfromBarbarians"], 30);
        assert_eq!(base.constants["cityStrengthBase"], 10);
        assert_eq!(base.buildings_to_remove, vec!["*Granary*"]);
    }
}
