use crate::buildings::{Building, UNBUILDABLE, UNSET_COST};
use crate::category::Category;
use crate::content::{Event, GlobalUniques, Quest, RuinReward, Specialist, Tutorial, Victory};
use crate::context::LoadContext;
use crate::eras::{Era, Speed};
use crate::error::Result;
use crate::filter::{FilterMatcher, FilterTarget, StandardFilter};
use crate::loader::{CategoryLoader, into_table, technologies_of};
use crate::mod_options::ModOptions;
use crate::nations::{CityStateType, Difficulty, Nation, Personality};
use crate::objects::{RulesetObject, Table};
use crate::package::Package;
use crate::policies::{Policy, PolicyBranch};
use crate::religions::Belief;
use crate::technologies::{TechColumnInfo, Technology};
use crate::tiles::{Terrain, TileImprovement, TileResource};
use crate::units::{BaseUnit, Promotion, UnitNameGroup, UnitType};
use crate::validation::{RulesetError, RulesetValidator};
use indexmap::IndexSet;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

/// The merged rule tables of a base ruleset and its mods.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ruleset {
    pub name: String,

    /// Contributing packages in merge order.
    pub mods: IndexSet<String>,

    pub beliefs: Table<Belief>,
    pub buildings: Table<Building>,
    pub difficulties: Table<Difficulty>,
    pub eras: Table<Era>,
    pub speeds: Table<Speed>,
    pub global_uniques: GlobalUniques,
    pub nations: Table<Nation>,
    pub policies: Table<Policy>,
    pub policy_branches: Table<PolicyBranch>,
    pub religions: Vec<String>,
    pub ruin_rewards: Table<RuinReward>,
    pub quests: Table<Quest>,
    pub specialists: Table<Specialist>,
    pub technologies: Table<Technology>,
    pub tech_columns: Vec<TechColumnInfo>,
    pub terrains: Table<Terrain>,
    pub tile_improvements: Table<TileImprovement>,
    pub tile_resources: Table<TileResource>,
    pub tutorials: Table<Tutorial>,
    pub units: Table<BaseUnit>,
    pub unit_promotions: Table<Promotion>,
    pub unit_name_groups: Table<UnitNameGroup>,
    pub unit_types: Table<UnitType>,
    pub victories: Table<Victory>,
    pub city_state_types: Table<CityStateType>,
    pub personalities: Table<Personality>,
    pub events: Table<Event>,
    pub mod_options: ModOptions,

    #[serde(skip)]
    tile_removals: OnceLock<Vec<String>>,
    #[serde(skip)]
    great_general_units: OnceLock<Vec<String>>,
}

impl Ruleset {
    /// Loads every category a package provides.
    ///
    /// Base packages also receive the mandatory categories they leave out
    /// from the context's fallback ruleset.
    pub fn load(package: &Package, context: &LoadContext) -> Ruleset {
        let loader = CategoryLoader::new(package, context);
        let mut ruleset = Ruleset {
            name: package.name().to_string(),
            mod_options: package.mod_options().clone(),
            ..Ruleset::default()
        };
        ruleset.mods.insert(package.name().to_string());

        if let Some(columns) = loader.load_tech_columns() {
            ruleset.technologies = technologies_of(&columns);
            ruleset.tech_columns = columns
                .iter()
                .enumerate()
                .map(|(index, column)| column.info(index))
                .collect();
        }
        ruleset.buildings = loader.load_table(Category::Buildings);
        ruleset.terrains = loader.load_table(Category::Terrains);
        ruleset.tile_resources = loader.load_table(Category::TileResources);
        ruleset.tile_improvements = loader.load_table(Category::TileImprovements);
        ruleset.eras = loader.load_table(Category::Eras);
        for (number, era) in ruleset.eras.values_mut().enumerate() {
            era.era_number = number as i32;
        }
        ruleset.speeds = loader.load_table(Category::Speeds);
        ruleset.unit_types = loader.load_table(Category::UnitTypes);
        ruleset.units = loader.load_table(Category::Units);
        ruleset.unit_promotions = loader.load_table(Category::UnitPromotions);
        ruleset.unit_name_groups = loader.load_table(Category::UnitNameGroups);
        ruleset.quests = loader.load_table(Category::Quests);
        ruleset.specialists = loader.load_table(Category::Specialists);
        ruleset.victories = loader.load_table(Category::VictoryTypes);

        if let Some((branches, policies)) =
            loader.load_policies(ruleset.victories.keys().map(String::as_str))
        {
            ruleset.policy_branches = branches;
            ruleset.policies = policies;
        }

        ruleset.beliefs = loader.load_table(Category::Beliefs);
        if let Some(religions) = loader.load_strings(Category::Religions) {
            for religion in religions {
                if !ruleset.religions.contains(&religion) {
                    ruleset.religions.push(religion);
                }
            }
        }
        let ruins = loader.load_array::<RuinReward>(Category::Ruins);
        let has_ruins = ruins.is_some();
        if let Some(ruins) = ruins {
            ruleset.ruin_rewards = into_table(Category::Ruins, ruins, package.name());
        }
        ruleset.nations = loader.load_table(Category::Nations);
        ruleset.difficulties = loader.load_table(Category::Difficulties);
        let global_uniques = loader.load_object::<GlobalUniques>(Category::GlobalUniques);
        let has_global_uniques = global_uniques.is_some();
        if let Some(global_uniques) = global_uniques {
            ruleset.global_uniques = global_uniques;
        }
        ruleset.city_state_types = loader.load_table(Category::CityStateTypes);
        ruleset.personalities = loader.load_table(Category::Personalities);
        ruleset.events = loader.load_table(Category::Events);
        for event in ruleset.events.values_mut() {
            event.stamp_choices();
        }

        if let Some(global) = context.global_tutorials() {
            ruleset.tutorials = CategoryLoader::new(global, context).load_table(Category::Tutorials);
        }
        ruleset
            .tutorials
            .extend(loader.load_table::<Tutorial>(Category::Tutorials));

        if ruleset.mod_options.is_base_ruleset {
            let has_city_state_types = package.has(Category::CityStateTypes);
            ruleset.backfill(context, has_ruins, has_global_uniques, has_city_state_types);
        }

        log::info!("Loaded '{}': {}", ruleset.name, ruleset.summary());
        ruleset
    }

    /// Reads and loads a package folder.
    pub fn load_dir(path: &Path, context: &LoadContext) -> Result<Ruleset> {
        let package = Package::from_dir(path)?;
        Ok(Ruleset::load(&package, context))
    }

    /// Adds what a base package needs but did not provide.
    ///
    /// Ruin rewards, global uniques and city-state types are only backfilled
    /// when their file is absent; the rest whenever they are empty.
    fn backfill(
        &mut self,
        context: &LoadContext,
        has_ruins: bool,
        has_global_uniques: bool,
        has_city_state_types: bool,
    ) {
        let needed = self.unit_types.is_empty()
            || !has_ruins
            || !has_global_uniques
            || self.victories.is_empty()
            || self.speeds.is_empty()
            || self.difficulties.is_empty()
            || !has_city_state_types;
        if !needed {
            return;
        }
        let Some(fallback) = context.fallback() else {
            log::warn!(
                "No fallback ruleset; '{}' keeps its missing categories",
                self.name
            );
            return;
        };
        log::debug!("Backfilling '{}' from '{}'", self.name, fallback.name);

        if self.unit_types.is_empty() {
            self.unit_types.extend(clone_table(&fallback.unit_types));
        }
        if !has_ruins {
            self.ruin_rewards.extend(clone_table(&fallback.ruin_rewards));
        }
        if !has_global_uniques {
            self.global_uniques = fallback.global_uniques.clone();
        }
        if self.victories.is_empty() {
            self.victories.extend(clone_table(&fallback.victories));
        }
        if self.speeds.is_empty() {
            self.speeds.extend(clone_table(&fallback.speeds));
        }
        if self.difficulties.is_empty() {
            self.difficulties.extend(clone_table(&fallback.difficulties));
        }
        if !has_city_state_types {
            let validator = context.unique_validator();
            let valid = |uniques: &[String]| -> Vec<String> {
                uniques
                    .iter()
                    .filter(|u| validator.check_unique(u, self).is_empty())
                    .cloned()
                    .collect()
            };
            let types: Vec<CityStateType> = fallback
                .city_state_types
                .values()
                .map(|kind| CityStateType {
                    name: kind.name.clone(),
                    color: kind.color.clone(),
                    friend_bonus_uniques: valid(&kind.friend_bonus_uniques),
                    ally_bonus_uniques: valid(&kind.ally_bonus_uniques),
                    origin_ruleset: kind.origin_ruleset.clone(),
                })
                .collect();
            self.city_state_types
                .extend(types.into_iter().map(|kind| (kind.name.clone(), kind)));
        }
    }

    /// Folds another ruleset into this one with the standard removal filter.
    pub fn add(&mut self, other: &Ruleset) {
        self.add_with(other, &StandardFilter);
    }

    /// Folds another ruleset into this one.
    ///
    /// Per category, `other`'s removal directives are evaluated against the
    /// current tables and applied first, then `other`'s objects are inserted
    /// over same-named ones. Global uniques and mod options accumulate.
    pub fn add_with(&mut self, other: &Ruleset, filter: &dyn FilterMatcher) {
        let options = &other.mod_options;

        remove_matching(&mut self.beliefs, &options.beliefs_to_remove, filter);
        self.beliefs.extend(clone_table(&other.beliefs));

        remove_matching(&mut self.buildings, &options.buildings_to_remove, filter);
        self.buildings.extend(clone_table(&other.buildings));

        self.difficulties.extend(clone_table(&other.difficulties));
        self.eras.extend(clone_table(&other.eras));
        self.speeds.extend(clone_table(&other.speeds));
        self.global_uniques.combine(&other.global_uniques);

        remove_matching(&mut self.nations, &options.nations_to_remove, filter);
        self.nations.extend(clone_table(&other.nations));

        let removed: Vec<String> = matching_keys(
            &self.policy_branches,
            &options.policy_branches_to_remove,
            filter,
        )
        .into_iter()
        .chain(
            self.policy_branches
                .keys()
                .filter(|name| other.policy_branches.contains_key(*name))
                .cloned(),
        )
        .collect();
        for name in removed {
            self.remove_policy_branch(&name);
        }
        remove_matching(&mut self.policies, &options.policies_to_remove, filter);
        for policy_filter in &options.policies_to_remove {
            for branch in self.policy_branches.values_mut() {
                branch
                    .policies
                    .retain(|policy| !filter.matches(policy_filter, policy));
            }
        }
        self.policy_branches
            .extend(clone_table(&other.policy_branches));
        self.policies.extend(clone_table(&other.policies));

        self.quests.extend(clone_table(&other.quests));

        self.religions
            .retain(|religion| !options.religions_to_remove.contains(religion));
        for religion in &other.religions {
            if !self.religions.contains(religion) {
                self.religions.push(religion.clone());
            }
        }
        for nation in self.nations.values_mut() {
            if let Some(religion) = &nation.favored_religion
                && options.religions_to_remove.contains(religion)
                && !self.religions.contains(religion)
            {
                nation.favored_religion = None;
            }
        }

        self.ruin_rewards.extend(clone_table(&other.ruin_rewards));
        self.specialists.extend(clone_table(&other.specialists));

        remove_matching(&mut self.technologies, &options.techs_to_remove, filter);
        self.technologies.extend(clone_table(&other.technologies));
        self.tech_columns.extend(other.tech_columns.iter().cloned());

        self.terrains.extend(clone_table(&other.terrains));
        self.tile_improvements
            .extend(clone_table(&other.tile_improvements));
        self.tile_resources.extend(clone_table(&other.tile_resources));
        self.tutorials.extend(clone_table(&other.tutorials));
        self.unit_types.extend(clone_table(&other.unit_types));
        self.victories.extend(clone_table(&other.victories));
        self.city_state_types
            .extend(clone_table(&other.city_state_types));

        remove_matching(&mut self.units, &options.units_to_remove, filter);
        self.units.extend(clone_table(&other.units));

        self.personalities.extend(clone_table(&other.personalities));
        self.events.extend(clone_table(&other.events));
        self.mod_options.merge(options);
        self.unit_promotions
            .extend(clone_table(&other.unit_promotions));
        self.unit_name_groups
            .extend(clone_table(&other.unit_name_groups));

        self.mods.extend(other.mods.iter().cloned());
    }

    /// Removes a branch along with its own entry and its policies.
    fn remove_policy_branch(&mut self, name: &str) {
        let Some(branch) = self.policy_branches.shift_remove(name) else {
            return;
        };
        self.policies.shift_remove(&branch.name);
        for policy in &branch.policies {
            self.policies.shift_remove(&policy.name);
        }
    }

    /// Empties every table.
    pub fn clear(&mut self) {
        *self = Ruleset::default();
    }

    /// Resolves building costs left unset from the technology column each
    /// building is unlocked in.
    pub fn update_building_costs(&mut self) {
        for building in self.buildings.values_mut() {
            if building.cost != UNSET_COST || building.has_unconditional_unique(UNBUILDABLE) {
                continue;
            }
            let Some(column) = building
                .required_tech
                .as_ref()
                .and_then(|tech| self.technologies.get(tech))
                .and_then(|tech| tech.column.as_ref())
            else {
                continue;
            };
            building.cost = if building.is_any_wonder() {
                column.wonder_cost
            } else {
                column.building_cost
            };
        }
    }

    /// Improvements that remove a tile feature.
    pub fn tile_removals(&self) -> &[String] {
        self.tile_removals.get_or_init(|| {
            self.tile_improvements
                .values()
                .filter(|i| i.is_removal())
                .map(|i| i.name.clone())
                .collect()
        })
    }

    /// Units that appear as great generals.
    pub fn great_general_units(&self) -> &[String] {
        self.great_general_units.get_or_init(|| {
            self.units
                .values()
                .filter(|u| u.is_great_general())
                .map(|u| u.name.clone())
                .collect()
        })
    }

    pub fn all_ruleset_objects(&self) -> Vec<&dyn RulesetObject> {
        Category::ALL
            .iter()
            .flat_map(|category| category.objects(self))
            .collect()
    }

    pub fn all_uniques(&self) -> Vec<&str> {
        Category::ALL
            .iter()
            .flat_map(|category| category.uniques(self))
            .collect()
    }

    pub fn error_list(&self, validator: &dyn RulesetValidator) -> Vec<RulesetError> {
        validator.error_list(self)
    }

    /// One-line description of what the ruleset contains.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.mod_options.is_base_ruleset {
            parts.push("Base Ruleset".to_string());
        }
        let counts = [
            (self.technologies.len(), "Techs"),
            (self.nations.len(), "Nations"),
            (self.units.len(), "Units"),
            (self.buildings.len(), "Buildings"),
            (self.tile_resources.len(), "Resources"),
            (self.tile_improvements.len(), "Improvements"),
            (self.religions.len(), "Religions"),
            (self.beliefs.len(), "Beliefs"),
        ];
        for (count, label) in counts {
            if count > 0 {
                parts.push(format!("[{count}] {label}"));
            }
        }
        parts.join(", ")
    }
}

/// An independent copy made by folding this ruleset into an empty one.
impl Clone for Ruleset {
    fn clone(&self) -> Self {
        let mut copy = Ruleset::default();
        copy.add(self);
        copy.name.clone_from(&self.name);
        copy.mod_options.is_base_ruleset = self.mod_options.is_base_ruleset;
        copy
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            return f.write_str(&self.name);
        }
        if self.mods.len() == 1
            && self.mod_options.is_base_ruleset
            && let Some(name) = self.mods.first()
        {
            return f.write_str(name);
        }
        let mods: Vec<&str> = self.mods.iter().map(String::as_str).collect();
        write!(f, "Combined RuleSet ({})", mods.join(", "))
    }
}

fn clone_table<T: Clone>(table: &Table<T>) -> impl Iterator<Item = (String, T)> + '_ {
    table.iter().map(|(name, item)| (name.clone(), item.clone()))
}

fn matching_keys<T: FilterTarget>(
    table: &Table<T>,
    filters: &[String],
    filter: &dyn FilterMatcher,
) -> IndexSet<String> {
    filters
        .iter()
        .flat_map(|f| {
            table
                .iter()
                .filter(move |(_, item)| filter.matches(f, *item))
                .map(|(name, _)| name.clone())
        })
        .collect()
}

/// Removes every object matching one of `filters`; returns how many went.
fn remove_matching<T: FilterTarget>(
    table: &mut Table<T>,
    filters: &[String],
    filter: &dyn FilterMatcher,
) -> usize {
    let keys = matching_keys(table, filters, filter);
    for key in &keys {
        log::trace!("Removing '{}'", key);
        table.shift_remove(key);
    }
    keys.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::PlatformCapabilities;
    use crate::context::FallbackSource;

    fn context() -> LoadContext {
        LoadContext::new()
            .with_capabilities(PlatformCapabilities::default())
            .with_fallback(FallbackSource::Disabled)
    }

    fn ruleset(name: &str, documents: &[(Category, &str)]) -> Ruleset {
        let package = Package::from_documents(
            name,
            documents
                .iter()
                .map(|(category, text)| (*category, text.to_string())),
        );
        Ruleset::load(&package, &context())
    }

    #[test]
    fn test_remove_then_add_replaces() {
        let mut base = ruleset(
            "Vanilla",
            &[(
                Category::Units,
                r#"[{ "name": "Archer", "unitType": "Archery", "rangedStrength": 7 },
                    { "name": "Warrior", "unitType": "Melee", "strength": 8 }]"#,
            )],
        );
        let mod_ruleset = ruleset(
            "X",
            &[
                (Category::ModOptions, r#"{ "unitsToRemove": ["Archer"] }"#),
                (
                    Category::Units,
                    r#"[{ "name": "Archer", "unitType": "Archery", "rangedStrength": 9 }]"#,
                ),
            ],
        );
        base.add(&mod_ruleset);

        assert_eq!(base.units["Archer"].ranged_strength, 9);
        assert_eq!(base.units["Archer"].origin_ruleset, "X");
        assert!(base.units.contains_key("Warrior"));
        assert_eq!(base.mods.iter().collect::<Vec<_>>(), vec!["Vanilla", "X"]);
    }

    #[test]
    fn test_religion_removal_clears_favored_religion() {
        let mut base = ruleset(
            "Vanilla",
            &[
                (Category::Religions, r#"["Islam", "Buddhism", "Islam"]"#),
                (
                    Category::Nations,
                    r#"[{ "name": "Arabia", "favoredReligion": "Islam" },
                        { "name": "Siam", "favoredReligion": "Buddhism" }]"#,
                ),
            ],
        );
        assert_eq!(base.religions, vec!["Islam", "Buddhism"]);

        let mod_ruleset = ruleset(
            "X",
            &[(Category::ModOptions, r#"{ "religionsToRemove": ["Islam"] }"#)],
        );
        base.add(&mod_ruleset);

        assert_eq!(base.religions, vec!["Buddhism"]);
        assert_eq!(base.nations["Arabia"].favored_religion, None);
        assert_eq!(
            base.nations["Siam"].favored_religion.as_deref(),
            Some("Buddhism")
        );
    }

    #[test]
    fn test_policies_to_remove_strip_branches() {
        let policies = r#"[{
            "name": "Tradition",
            "policies": [
                { "name": "Aristocracy", "row": 1, "column": 1 },
                { "name": "Legalism", "row": 1, "column": 3 },
                { "name": "Finisher" }
            ]
        }]"#;
        let mut base = ruleset("Vanilla", &[(Category::Policies, policies)]);
        let mod_ruleset = ruleset(
            "X",
            &[(Category::ModOptions, r#"{ "policiesToRemove": ["Legalism"] }"#)],
        );
        base.add(&mod_ruleset);

        assert!(!base.policies.contains_key("Legalism"));
        let names: Vec<&str> = base.policy_branches["Tradition"]
            .policies
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Aristocracy", "TraditionComplete"]);
    }

    #[test]
    fn test_global_uniques_accumulate() {
        let mut base = ruleset(
            "Vanilla",
            &[(Category::GlobalUniques, r#"{ "uniques": ["A"] }"#)],
        );
        let mod_ruleset = ruleset(
            "X",
            &[(Category::GlobalUniques, r#"{ "uniques": ["B"] }"#)],
        );
        base.add(&mod_ruleset);
        assert_eq!(base.global_uniques.uniques, vec!["A", "B"]);
    }

    #[test]
    fn test_eras_are_numbered_in_file_order() {
        let base = ruleset(
            "Vanilla",
            &[(
                Category::Eras,
                r#"[{ "name": "Ancient era" }, { "name": "Classical era" }]"#,
            )],
        );
        assert_eq!(base.eras["Ancient era"].era_number, 0);
        assert_eq!(base.eras["Classical era"].era_number, 1);
    }

    #[test]
    fn test_derived_caches() {
        let base = ruleset(
            "Vanilla",
            &[
                (
                    Category::TileImprovements,
                    r#"[{ "name": "Farm" }, { "name": "Remove Forest" }]"#,
                ),
                (
                    Category::Units,
                    r#"[{ "name": "Great General", "unitType": "Civilian",
                          "uniques": ["Great Person - [War]"] },
                        { "name": "Warrior", "unitType": "Melee" }]"#,
                ),
            ],
        );
        assert_eq!(base.tile_removals(), ["Remove Forest"]);
        assert_eq!(base.great_general_units(), ["Great General"]);
    }

    #[test]
    fn test_summary_and_display() {
        let mut base = ruleset(
            "Vanilla",
            &[
                (Category::ModOptions, r#"{ "isBaseRuleset": true }"#),
                (Category::Buildings, r#"[{ "name": "Granary" }]"#),
                (Category::Religions, r#"["Islam"]"#),
            ],
        );
        assert_eq!(
            base.summary(),
            "Base Ruleset, [1] Buildings, [1] Religions"
        );
        assert_eq!(base.to_string(), "Vanilla");

        base.name.clear();
        assert_eq!(base.to_string(), "Vanilla");

        let mut combined = Ruleset::default();
        combined.mods.extend(["Vanilla".to_string(), "X".to_string()]);
        assert_eq!(combined.to_string(), "Combined RuleSet (Vanilla, X)");
    }

    #[test]
    fn test_clone_replays_fold() {
        let base = ruleset(
            "Vanilla",
            &[
                (Category::ModOptions, r#"{ "isBaseRuleset": true }"#),
                (Category::Buildings, r#"[{ "name": "Granary", "cost": 40 }]"#),
            ],
        );
        let _ = base.tile_removals();
        let copy = base.clone();

        assert_eq!(copy.name, "Vanilla");
        assert!(copy.mod_options.is_base_ruleset);
        assert_eq!(
            serde_json::to_string(&copy).unwrap(),
            serde_json::to_string(&base).unwrap()
        );
    }

    #[test]
    fn test_clear() {
        let mut base = ruleset("Vanilla", &[(Category::Religions, r#"["Islam"]"#)]);
        base.clear();
        assert!(base.religions.is_empty());
        assert!(base.mods.is_empty());
        assert!(base.name.is_empty());
    }
}
