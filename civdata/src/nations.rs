use crate::filter::FilterTarget;
use crate::objects::{RulesetObject, Stats, impl_ruleset_object};
use civdata_derive::{LenientDeserialize, Reconcile};
use serde::Serialize;

/// A major civilization or a city-state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Nation {
    pub name: String,

    #[reconcile]
    pub leader_name: String,

    /// Set for city-states only.
    #[reconcile]
    pub city_state_type: Option<String>,

    #[reconcile]
    pub preferred_victory_type: String,

    #[reconcile]
    pub personality: Option<String>,

    #[reconcile]
    pub favored_religion: Option<String>,

    #[reconcile]
    pub unique_name: String,

    #[reconcile]
    pub unique_text: String,

    #[reconcile]
    pub start_intro_part1: String,

    #[reconcile]
    pub start_intro_part2: String,

    #[reconcile]
    pub declaring_war: String,

    #[reconcile]
    pub attacked: String,

    #[reconcile]
    pub defeated: String,

    #[reconcile]
    pub denounced: String,

    #[reconcile]
    pub declaring_friendship: String,

    #[reconcile]
    pub introduction: String,

    #[reconcile]
    pub trade_request: String,

    #[reconcile]
    pub neutral_hello: String,

    #[reconcile]
    pub hate_hello: String,

    #[reconcile]
    pub outer_color: Vec<i32>,

    #[reconcile]
    pub inner_color: Vec<i32>,

    #[reconcile]
    pub start_bias: Vec<String>,

    #[reconcile]
    pub spy_names: Vec<String>,

    #[reconcile]
    pub cities: Vec<String>,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Nation {
    pub fn is_city_state(&self) -> bool {
        self.city_state_type.is_some()
    }
}

impl FilterTarget for Nation {
    fn keywords(&self) -> Vec<&str> {
        if self.is_city_state() {
            vec!["City-State", "City-States"]
        } else {
            vec!["Major"]
        }
    }
}

/// Bonuses granted by one kind of city-state to its friends and allies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct CityStateType {
    pub name: String,

    #[reconcile]
    pub friend_bonus_uniques: Vec<String>,

    #[reconcile]
    pub ally_bonus_uniques: Vec<String>,

    #[reconcile]
    pub color: Vec<i32>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl CityStateType {
    pub fn all_bonus_uniques(&self) -> impl Iterator<Item = &String> {
        self.ally_bonus_uniques
            .iter()
            .chain(self.friend_bonus_uniques.iter())
    }
}

impl RulesetObject for CityStateType {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn uniques(&self) -> &[String] {
        &[]
    }

    fn origin_ruleset(&self) -> &str {
        &self.origin_ruleset
    }

    fn set_origin_ruleset(&mut self, origin: &str) {
        self.origin_ruleset = origin.to_string();
    }
}

/// AI leanings; every weight is 5 when unspecified.
#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Personality {
    pub name: String,

    #[reconcile]
    pub preferred_victory_type: String,

    #[reconcile]
    pub is_neutral_personality: bool,

    #[reconcile(unset = 5.0)]
    pub military: f32,

    #[reconcile(unset = 5.0)]
    pub aggressive: f32,

    #[reconcile(unset = 5.0)]
    pub declare_war: f32,

    #[reconcile(unset = 5.0)]
    pub commerce: f32,

    #[reconcile(unset = 5.0)]
    pub diplomacy: f32,

    #[reconcile(unset = 5.0)]
    pub loyal: f32,

    #[reconcile(unset = 5.0)]
    pub expansion: f32,

    /// Yield focus.
    #[reconcile(flatten)]
    #[serde(flatten)]
    pub stats: Stats,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            name: String::new(),
            preferred_victory_type: String::new(),
            is_neutral_personality: false,
            military: 5.0,
            aggressive: 5.0,
            declare_war: 5.0,
            commerce: 5.0,
            diplomacy: 5.0,
            loyal: 5.0,
            expansion: 5.0,
            stats: Stats::default(),
            uniques: Vec::new(),
            origin_ruleset: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Difficulty {
    pub name: String,

    #[reconcile]
    pub base_happiness: i32,

    #[reconcile]
    pub extra_happiness_per_luxury: f32,

    #[reconcile(unset = 1.0)]
    pub research_cost_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub unit_cost_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub building_cost_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub policy_cost_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub unhappiness_modifier: f32,

    #[reconcile]
    pub barbarian_bonus: f32,

    #[reconcile]
    pub player_bonus_starting_units: Vec<String>,

    #[reconcile(unset = 1.0)]
    pub ai_city_growth_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub ai_unit_cost_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub ai_building_cost_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub ai_wonder_cost_modifier: f32,

    #[reconcile]
    pub ai_free_techs: Vec<String>,

    #[reconcile]
    pub ai_major_civ_bonus_starting_units: Vec<String>,

    #[reconcile]
    pub ai_city_state_bonus_starting_units: Vec<String>,

    #[reconcile]
    pub turn_barbarians_can_enter_player_tiles: i32,

    #[reconcile(unset = 25)]
    pub clear_barbarian_camp_reward: i32,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_happiness: 0,
            extra_happiness_per_luxury: 0.0,
            research_cost_modifier: 1.0,
            unit_cost_modifier: 1.0,
            building_cost_modifier: 1.0,
            policy_cost_modifier: 1.0,
            unhappiness_modifier: 1.0,
            barbarian_bonus: 0.0,
            player_bonus_starting_units: Vec::new(),
            ai_city_growth_modifier: 1.0,
            ai_unit_cost_modifier: 1.0,
            ai_building_cost_modifier: 1.0,
            ai_wonder_cost_modifier: 1.0,
            ai_free_techs: Vec::new(),
            ai_major_civ_bonus_starting_units: Vec::new(),
            ai_city_state_bonus_starting_units: Vec::new(),
            turn_barbarians_can_enter_player_tiles: 0,
            clear_barbarian_camp_reward: 25,
            uniques: Vec::new(),
            origin_ruleset: String::new(),
        }
    }
}

impl_ruleset_object!(Nation, Personality, Difficulty);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile_all;
    use civjson::RawDocumentIndex;

    #[test]
    fn test_nation_strings_and_colors() {
        let text = r#"[
            {
                "name": "Babylon",
                "leaderName": "Nebuchadnezzar II",
                "outerColor": [200, "40", 30],
                "innerColor": { "r": 1 },
                "cities": ["Babylon", "Ur", ""],
                "startIntroPart1": 7
            },
            { "name": "Geneva", "cityStateType": "Cultured", "favoredReligion": "" }
        ]"#;
        let mut nations: Vec<Nation> = serde_json::from_str(text).unwrap();
        assert!(nations[0].outer_color.is_empty());

        reconcile_all(&mut nations, &RawDocumentIndex::parse(text).unwrap());
        let babylon = &nations[0];
        assert_eq!(babylon.outer_color, vec![200, 40, 30]);
        assert!(babylon.inner_color.is_empty());
        assert_eq!(babylon.cities, vec!["Babylon", "Ur", ""]);
        assert_eq!(babylon.start_intro_part1, "7");
        assert_eq!(babylon.keywords(), vec!["Major"]);

        let geneva = &nations[1];
        assert!(geneva.is_city_state());
        assert_eq!(geneva.favored_religion.as_deref(), Some(""));
    }

    #[test]
    fn test_personality_unset_weights() {
        let text = r#"[ { "name": "Warlike", "military": "8", "loyal": 5, "production": 7 } ]"#;
        let mut personalities: Vec<Personality> = serde_json::from_str(text).unwrap();
        assert_eq!(personalities[0].military, 5.0);

        reconcile_all(&mut personalities, &RawDocumentIndex::parse(text).unwrap());
        assert_eq!(personalities[0].military, 8.0);
        assert_eq!(personalities[0].loyal, 5.0);
        assert_eq!(personalities[0].stats.production, 7.0);
        assert_eq!(personalities[0].diplomacy, 5.0);
    }

    #[test]
    fn test_city_state_bonus_uniques() {
        let cst = CityStateType {
            name: "Cultured".to_string(),
            friend_bonus_uniques: vec!["F".to_string()],
            ally_bonus_uniques: vec!["A".to_string()],
            ..CityStateType::default()
        };
        let all: Vec<_> = cst.all_bonus_uniques().collect();
        assert_eq!(all, vec!["A", "F"]);
        assert!(cst.uniques().is_empty());
    }
}
