use crate::objects::{RulesetObject, Table};
use crate::ruleset::Ruleset;
use std::fmt;

/// One kind of content, backed by one file in a package folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Beliefs,
    Buildings,
    Eras,
    Religions,
    Nations,
    Policies,
    Techs,
    Terrains,
    Tutorials,
    TileImprovements,
    TileResources,
    Specialists,
    Units,
    UnitPromotions,
    UnitNameGroups,
    UnitTypes,
    VictoryTypes,
    CityStateTypes,
    Personalities,
    Events,
    GlobalUniques,
    ModOptions,
    Speeds,
    Difficulties,
    Quests,
    Ruins,
}

impl Category {
    pub const ALL: [Category; 26] = [
        Category::Beliefs,
        Category::Buildings,
        Category::Eras,
        Category::Religions,
        Category::Nations,
        Category::Policies,
        Category::Techs,
        Category::Terrains,
        Category::Tutorials,
        Category::TileImprovements,
        Category::TileResources,
        Category::Specialists,
        Category::Units,
        Category::UnitPromotions,
        Category::UnitNameGroups,
        Category::UnitTypes,
        Category::VictoryTypes,
        Category::CityStateTypes,
        Category::Personalities,
        Category::Events,
        Category::GlobalUniques,
        Category::ModOptions,
        Category::Speeds,
        Category::Difficulties,
        Category::Quests,
        Category::Ruins,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Category::Beliefs => "Beliefs.json",
            Category::Buildings => "Buildings.json",
            Category::Eras => "Eras.json",
            Category::Religions => "Religions.json",
            Category::Nations => "Nations.json",
            Category::Policies => "Policies.json",
            Category::Techs => "Techs.json",
            Category::Terrains => "Terrains.json",
            Category::Tutorials => "Tutorials.json",
            Category::TileImprovements => "TileImprovements.json",
            Category::TileResources => "TileResources.json",
            Category::Specialists => "Specialists.json",
            Category::Units => "Units.json",
            Category::UnitPromotions => "UnitPromotions.json",
            Category::UnitNameGroups => "UnitNameGroups.json",
            Category::UnitTypes => "UnitTypes.json",
            Category::VictoryTypes => "VictoryTypes.json",
            Category::CityStateTypes => "CityStateTypes.json",
            Category::Personalities => "Personalities.json",
            Category::Events => "Events.json",
            Category::GlobalUniques => "GlobalUniques.json",
            Category::ModOptions => "ModOptions.json",
            Category::Speeds => "Speeds.json",
            Category::Difficulties => "Difficulties.json",
            Category::Quests => "Quests.json",
            Category::Ruins => "Ruins.json",
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.file_name() == file_name)
    }

    /// Files holding one JSON object rather than an array.
    pub fn is_single_object(&self) -> bool {
        matches!(self, Category::GlobalUniques | Category::ModOptions)
    }

    /// The category's objects, for queries across the whole ruleset.
    ///
    /// Religions, specialists, victory types, city-state types, difficulties,
    /// quests and mod options list nothing here.
    pub fn objects<'a>(&self, ruleset: &'a Ruleset) -> Vec<&'a dyn RulesetObject> {
        match self {
            Category::Beliefs => values(&ruleset.beliefs),
            Category::Buildings => values(&ruleset.buildings),
            Category::Eras => values(&ruleset.eras),
            Category::Nations => values(&ruleset.nations),
            Category::Policies => values(&ruleset.policies),
            Category::Techs => values(&ruleset.technologies),
            Category::Terrains => values(&ruleset.terrains),
            Category::Tutorials => values(&ruleset.tutorials),
            Category::TileImprovements => values(&ruleset.tile_improvements),
            Category::TileResources => values(&ruleset.tile_resources),
            Category::Units => values(&ruleset.units),
            Category::UnitPromotions => values(&ruleset.unit_promotions),
            Category::UnitNameGroups => values(&ruleset.unit_name_groups),
            Category::UnitTypes => values(&ruleset.unit_types),
            Category::Personalities => values(&ruleset.personalities),
            Category::Events => {
                let mut objects = values(&ruleset.events);
                for event in ruleset.events.values() {
                    objects.extend(event.choices.iter().map(|c| c as &dyn RulesetObject));
                }
                objects
            }
            Category::GlobalUniques => vec![&ruleset.global_uniques as &dyn RulesetObject],
            Category::Speeds => values(&ruleset.speeds),
            Category::Ruins => values(&ruleset.ruin_rewards),
            Category::Religions
            | Category::Specialists
            | Category::VictoryTypes
            | Category::CityStateTypes
            | Category::ModOptions
            | Category::Difficulties
            | Category::Quests => Vec::new(),
        }
    }

    /// Every unique string contributed by this category.
    pub fn uniques<'a>(&self, ruleset: &'a Ruleset) -> Vec<&'a str> {
        match self {
            Category::CityStateTypes => ruleset
                .city_state_types
                .values()
                .flat_map(|c| c.all_bonus_uniques())
                .map(String::as_str)
                .collect(),
            Category::ModOptions => ruleset
                .mod_options
                .uniques
                .iter()
                .map(String::as_str)
                .collect(),
            _ => self
                .objects(ruleset)
                .into_iter()
                .flat_map(|o| o.uniques().iter().map(String::as_str))
                .collect(),
        }
    }
}

fn values<T: RulesetObject>(table: &Table<T>) -> Vec<&dyn RulesetObject> {
    table.values().map(|v| v as &dyn RulesetObject).collect()
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_file_name(category.file_name()), Some(category));
        }
        assert_eq!(Category::from_file_name("Readme.md"), None);
    }

    #[test]
    fn test_single_object_files() {
        let singles: Vec<_> = Category::ALL
            .into_iter()
            .filter(Category::is_single_object)
            .collect();
        assert_eq!(singles, vec![Category::GlobalUniques, Category::ModOptions]);
    }

    #[test]
    fn test_display_is_file_name() {
        assert_eq!(Category::UnitNameGroups.to_string(), "UnitNameGroups.json");
    }
}
