use crate::objects::impl_ruleset_object;
use crate::reconcile::{RawEntry, RawField};
use civdata_derive::{LenientDeserialize, Reconcile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Era {
    pub name: String,

    /// Position of the era in its file.
    #[serde(skip_deserializing)]
    pub era_number: i32,

    #[reconcile(unset = 300)]
    pub research_agreement_cost: i32,

    #[reconcile(unset = 1)]
    pub starting_settler_count: i32,

    #[reconcile]
    pub starting_worker_count: i32,

    #[reconcile(unset = 1)]
    pub starting_military_unit_count: i32,

    #[reconcile(unset = "Warrior")]
    pub starting_military_unit: String,

    #[reconcile]
    pub starting_gold: i32,

    #[reconcile]
    pub starting_culture: i32,

    #[reconcile(unset = 1)]
    pub settler_population: i32,

    #[reconcile(unset = 200)]
    pub base_unit_buy_cost: i32,

    #[reconcile(unset = 3)]
    pub embark_defense: i32,

    #[reconcile]
    pub starting_obsolete_wonders: Vec<String>,

    #[reconcile]
    #[serde(rename = "iconRGB")]
    pub icon_rgb: Vec<i32>,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Default for Era {
    fn default() -> Self {
        Self {
            name: String::new(),
            era_number: -1,
            research_agreement_cost: 300,
            starting_settler_count: 1,
            starting_worker_count: 0,
            starting_military_unit_count: 1,
            starting_military_unit: "Warrior".to_string(),
            starting_gold: 0,
            starting_culture: 0,
            settler_population: 1,
            base_unit_buy_cost: 200,
            embark_defense: 3,
            starting_obsolete_wonders: Vec::new(),
            icon_rgb: Vec::new(),
            uniques: Vec::new(),
            origin_ruleset: String::new(),
        }
    }
}

/// One row of a speed's calendar: years per turn until a given turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRow {
    pub years_per_turn: f32,
    pub until_turn: f32,
}

impl RawField for Vec<TurnRow> {
    /// Rows missing either number are dropped.
    fn read_raw(raw: RawEntry<'_>, key: &str) -> Option<Self> {
        let rows = raw.child(key)?;
        Some(
            rows.elements()
                .filter_map(|row| {
                    Some(TurnRow {
                        years_per_turn: row.child("yearsPerTurn")?.as_float()?,
                        until_turn: row.child("untilTurn")?.as_float()?,
                    })
                })
                .collect(),
        )
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

/// Game pace: cost multipliers and the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Speed {
    pub name: String,

    #[reconcile(unset = 1.0)]
    pub modifier: f32,

    #[reconcile(unset = 1.0)]
    pub gold_cost_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub production_cost_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub science_cost_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub culture_cost_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub faith_cost_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub gold_gift_modifier: f32,

    #[reconcile(unset = 6.5)]
    pub city_state_tribute_scaling_interval: f32,

    #[reconcile(unset = 1.0)]
    pub barbarian_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub improvement_build_length_modifier: f32,

    #[reconcile(unset = 1.0)]
    pub golden_age_length_modifier: f32,

    #[reconcile(unset = 6)]
    pub religious_pressure_adjacent_city: i32,

    #[reconcile(unset = 10)]
    pub peace_deal_duration: i32,

    #[reconcile(unset = 30)]
    pub deal_duration: i32,

    #[reconcile(unset = -4000.0)]
    pub start_year: f32,

    #[reconcile]
    pub turns: Vec<TurnRow>,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Default for Speed {
    fn default() -> Self {
        Self {
            name: String::new(),
            modifier: 1.0,
            gold_cost_modifier: 1.0,
            production_cost_modifier: 1.0,
            science_cost_modifier: 1.0,
            culture_cost_modifier: 1.0,
            faith_cost_modifier: 1.0,
            gold_gift_modifier: 1.0,
            city_state_tribute_scaling_interval: 6.5,
            barbarian_modifier: 1.0,
            improvement_build_length_modifier: 1.0,
            golden_age_length_modifier: 1.0,
            religious_pressure_adjacent_city: 6,
            peace_deal_duration: 10,
            deal_duration: 30,
            start_year: -4000.0,
            turns: Vec::new(),
            uniques: Vec::new(),
            origin_ruleset: String::new(),
        }
    }
}

impl Speed {
    /// The last turn covered by the calendar.
    pub fn number_of_turns(&self) -> i32 {
        self.turns.last().map(|row| row.until_turn as i32).unwrap_or(0)
    }
}

impl_ruleset_object!(Era, Speed);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile_all;
    use civjson::RawDocumentIndex;

    #[test]
    fn test_speed_turn_rows() {
        let text = r#"[
            {
                "name": "Quick",
                "modifier": "0.67",
                "startYear": -4000,
                "turns": [
                    { "yearsPerTurn": 60, "untilTurn": "30" },
                    { "yearsPerTurn": 40 },
                    { "yearsPerTurn": 25, "untilTurn": 330 }
                ]
            }
        ]"#;
        let mut speeds: Vec<Speed> = serde_json::from_str(text).unwrap();
        assert!(speeds[0].turns.is_empty());
        assert_eq!(speeds[0].modifier, 1.0);

        reconcile_all(&mut speeds, &RawDocumentIndex::parse(text).unwrap());
        let quick = &speeds[0];
        assert_eq!(quick.modifier, 0.67);
        assert_eq!(quick.turns.len(), 2);
        assert_eq!(quick.turns[0].until_turn, 30.0);
        assert_eq!(quick.number_of_turns(), 330);
    }

    #[test]
    fn test_era_string_sentinel() {
        let text = r#"[ { "name": "Classical era", "startingMilitaryUnit": "Spearman" } ]"#;
        let mut eras: Vec<Era> = serde_json::from_str(text).unwrap();
        assert_eq!(eras[0].starting_military_unit, "Spearman");

        eras[0].starting_military_unit = "Warrior".to_string();
        reconcile_all(&mut eras, &RawDocumentIndex::parse(text).unwrap());
        assert_eq!(eras[0].starting_military_unit, "Spearman");
    }
}
