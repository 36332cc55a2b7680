use crate::filter::FilterTarget;
use crate::objects::impl_ruleset_object;
use crate::reconcile::raw_scalar_enum;
use civdata_derive::{LenientDeserialize, Reconcile};
use serde::{Deserialize, Serialize};

/// Unique marking units spawned as great generals from combat.
pub const GREAT_GENERAL_UNIQUE: &str = "Great Person - [War]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitMovementType {
    Land,
    Water,
    Air,
}

raw_scalar_enum!(UnitMovementType);

/// A trainable unit.
#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct BaseUnit {
    pub name: String,

    /// Name of a [`UnitType`].
    #[reconcile]
    pub unit_type: String,

    #[reconcile(unset = -1)]
    pub cost: i32,

    #[reconcile]
    pub hurry_cost_modifier: i32,

    #[reconcile]
    pub movement: i32,

    #[reconcile]
    pub strength: i32,

    #[reconcile]
    pub ranged_strength: i32,

    #[reconcile]
    pub religious_strength: i32,

    #[reconcile(unset = 2)]
    pub range: i32,

    #[reconcile]
    pub intercept_range: i32,

    #[reconcile]
    pub required_tech: Option<String>,

    #[reconcile]
    pub required_resource: Option<String>,

    #[reconcile]
    pub obsolete_tech: Option<String>,

    #[reconcile]
    pub upgrades_to: Option<String>,

    #[reconcile]
    pub replaces: Option<String>,

    #[reconcile]
    pub unique_to: Option<String>,

    #[reconcile]
    pub attack_sound: Option<String>,

    #[reconcile]
    pub replacement_text_for_uniques: String,

    #[reconcile]
    pub promotions: Vec<String>,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Default for BaseUnit {
    fn default() -> Self {
        Self {
            name: String::new(),
            unit_type: String::new(),
            cost: -1,
            hurry_cost_modifier: 0,
            movement: 0,
            strength: 0,
            ranged_strength: 0,
            religious_strength: 0,
            range: 2,
            intercept_range: 0,
            required_tech: None,
            required_resource: None,
            obsolete_tech: None,
            upgrades_to: None,
            replaces: None,
            unique_to: None,
            attack_sound: None,
            replacement_text_for_uniques: String::new(),
            promotions: Vec::new(),
            uniques: Vec::new(),
            origin_ruleset: String::new(),
        }
    }
}

impl BaseUnit {
    pub fn is_military(&self) -> bool {
        self.strength > 0 || self.ranged_strength > 0
    }

    pub fn is_great_general(&self) -> bool {
        self.uniques
            .iter()
            .any(|u| u.starts_with(GREAT_GENERAL_UNIQUE))
    }
}

impl FilterTarget for BaseUnit {
    fn keywords(&self) -> Vec<&str> {
        let mut keywords = vec![self.unit_type.as_str()];
        if self.is_military() {
            keywords.push("Military");
            keywords.push(if self.ranged_strength > 0 {
                "Ranged"
            } else {
                "Melee"
            });
        } else {
            keywords.push("Civilian");
        }
        if let Some(replaces) = &self.replaces {
            keywords.push(replaces);
        }
        keywords
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct UnitType {
    pub name: String,

    #[reconcile]
    pub movement_type: Option<UnitMovementType>,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub name: String,

    #[reconcile]
    pub prerequisites: Vec<String>,

    #[reconcile]
    pub unit_types: Vec<String>,

    /// Position in the picker; -1 places it automatically.
    #[reconcile(unset = -1)]
    pub row: i32,

    #[reconcile]
    pub column: i32,

    #[reconcile]
    pub inner_color: Vec<i32>,

    #[reconcile]
    pub outer_color: Vec<i32>,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl Default for Promotion {
    fn default() -> Self {
        Self {
            name: String::new(),
            prerequisites: Vec::new(),
            unit_types: Vec::new(),
            row: -1,
            column: 0,
            inner_color: Vec::new(),
            outer_color: Vec::new(),
            uniques: Vec::new(),
            origin_ruleset: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct UnitNameGroup {
    pub name: String,

    #[reconcile]
    pub unit_names: Vec<String>,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl_ruleset_object!(BaseUnit, UnitType, Promotion, UnitNameGroup);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile_all;
    use civjson::RawDocumentIndex;

    #[test]
    fn test_enum_field_recovered_from_raw() {
        let text = r#"[
            { "name": "Sword", "movementType": " Land " },
            { "name": "Boat", "movementType": "Water" },
            { "name": "Ghost", "movementType": "Ether" }
        ]"#;
        let mut types: Vec<UnitType> = serde_json::from_str(text).unwrap();
        assert_eq!(types[0].movement_type, None);
        assert_eq!(types[1].movement_type, Some(UnitMovementType::Water));

        reconcile_all(&mut types, &RawDocumentIndex::parse(text).unwrap());
        assert_eq!(types[0].movement_type, Some(UnitMovementType::Land));
        assert_eq!(types[2].movement_type, None);
    }

    #[test]
    fn test_combat_stats_and_promotions() {
        let text = r#"[
            {
                "name": "Archer",
                "unitType": "Archery",
                "cost": 40,
                "strength": "5",
                "rangedStrength": 7,
                "promotions": "Accuracy I",
                "uniques": ["Great Person - [War]"]
            }
        ]"#;
        let mut units: Vec<BaseUnit> = serde_json::from_str(text).unwrap();
        assert_eq!(units[0].strength, 0);

        reconcile_all(&mut units, &RawDocumentIndex::parse(text).unwrap());
        let archer = &units[0];
        assert_eq!(archer.strength, 5);
        assert_eq!(archer.ranged_strength, 7);
        assert_eq!(archer.range, 2);
        assert!(archer.promotions.is_empty());
        assert!(archer.is_great_general());
        assert_eq!(archer.keywords(), vec!["Archery", "Military", "Ranged"]);
    }
}
